//! # Raster Backend
//!
//! Draws sheets and labels into RGB bitmaps, for PNG previews and for the
//! pages of the exported PDF.
//!
//! ## Resolution
//!
//! The default is 192 dpi (twice the 96 dpi CSS pixel), giving an A4 page
//! of 1587 × 2245 pixels:
//!
//! ```text
//! px = mm × dpi / 25.4
//! ```
//!
//! Text uses the Spleen bitmap font at the layout's fixed advance. Images are
//! decoded from data URIs (or read from disk for plain paths) once per
//! rasterizer and cached.

use std::collections::HashMap;
use std::path::PathBuf;

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::error::PlancheError;
use crate::images::decode_data_uri;
use crate::theme::parse_hex_color;

use super::sheet::{CellContent, Sheet};
use super::symbols::{self, QUIET_MODULES};
use super::{
    Align, Content, Fit, LabelView, Node, Placement, Rect, TextStyle, font, logo, place_lines,
    place_price, pt_to_mm,
};

pub const DEFAULT_DPI: f32 = 192.0;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const PLACEHOLDER: [u8; 3] = [0xbb, 0xbb, 0xbb];
/// Dash and gap lengths of placeholder outlines, in millimeters.
const DASH_MM: (f32, f32) = (2.0, 1.5);
const PLACEHOLDER_STROKE_MM: f32 = 0.3;

/// Renders views to bitmaps at a fixed resolution.
pub struct Rasterizer {
    dpi: f32,
    /// Directory plain image paths are resolved against.
    image_root: Option<PathBuf>,
    /// Only `data:` URIs are drawn; plain paths are never opened.
    inline_only: bool,
    images: HashMap<String, Option<RgbaImage>>,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl Rasterizer {
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            image_root: None,
            inline_only: false,
            images: HashMap::new(),
        }
    }

    pub fn with_image_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.image_root = Some(root.into());
        self
    }

    /// Refuse every image that is not an inline `data:` URI.
    ///
    /// Used when item data comes from remote clients: their image cells must
    /// not name files on this machine.
    pub fn inline_only(mut self) -> Self {
        self.inline_only = true;
        self
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Rasterize a whole sheet at paper size.
    pub fn sheet(&mut self, sheet: &Sheet) -> Result<RgbImage, PlancheError> {
        let mut canvas = self.canvas(sheet.paper.width_mm, sheet.paper.height_mm)?;

        for cell in &sheet.cells {
            match &cell.content {
                CellContent::Label(view) => {
                    canvas.origin = (cell.rect.x, cell.rect.y);
                    self.draw_label(&mut canvas, view);
                }
                CellContent::Empty => {
                    canvas.origin = (0.0, 0.0);
                    canvas.dashed_rect(&cell.rect, PLACEHOLDER_STROKE_MM, PLACEHOLDER);
                }
            }
        }

        Ok(canvas.image)
    }

    /// Rasterize a single label at its own size.
    pub fn label(&mut self, view: &LabelView) -> Result<RgbImage, PlancheError> {
        let mut canvas = self.canvas(view.width_mm, view.height_mm)?;
        self.draw_label(&mut canvas, view);
        Ok(canvas.image)
    }

    fn canvas(&self, width_mm: f32, height_mm: f32) -> Result<Canvas, PlancheError> {
        let scale = self.dpi / 25.4;
        let width = (width_mm * scale).round();
        let height = (height_mm * scale).round();
        if !(width >= 1.0 && height >= 1.0) || width * height > 100_000_000.0 {
            return Err(PlancheError::Image(format!(
                "cannot rasterize {} x {} mm at {} dpi",
                width_mm, height_mm, self.dpi
            )));
        }
        Ok(Canvas {
            image: RgbImage::from_pixel(width as u32, height as u32, Rgb(WHITE)),
            scale,
            origin: (0.0, 0.0),
        })
    }

    fn draw_label(&mut self, canvas: &mut Canvas, view: &LabelView) {
        canvas.fill_rect(&view.bounds(), color(&view.background), 1.0);
        if view.border_mm > 0.0 {
            canvas.stroke_rect(&view.bounds(), view.border_mm, color(&view.border_color));
        }
        for node in &view.nodes {
            self.draw_node(canvas, node);
        }
    }

    fn draw_node(&mut self, canvas: &mut Canvas, node: &Node) {
        let r = &node.rect;
        match &node.content {
            Content::Logo { color: fill, opacity } => {
                canvas.logo(r, color(fill), *opacity);
            }
            Content::Text { lines, style } => canvas.text_lines(r, lines, style),
            Content::Price {
                amount,
                currency,
                size_pt,
                currency_pt,
                color: fill,
            } => {
                let (amount_at, currency_at) = place_price(r, amount, currency, *size_pt, *currency_pt);
                let fill = color(fill);
                canvas.text(&amount_at, amount, fill, true);
                canvas.text(&currency_at, currency, fill, true);
            }
            Content::Image { source, fit } => match self.image(source) {
                Some(image) => canvas.draw_image(r, image, *fit),
                None => canvas.dashed_rect(r, PLACEHOLDER_STROKE_MM, PLACEHOLDER),
            },
            Content::ImagePlaceholder { caption } => {
                canvas.dashed_rect(r, PLACEHOLDER_STROKE_MM, PLACEHOLDER);
                let style = TextStyle {
                    size_pt: 7.0_f32.min(r.h / pt_to_mm(1.0)),
                    color: String::new(),
                    bold: true,
                    align: Align::Center,
                };
                let size = pt_to_mm(style.size_pt);
                let line = Rect::new(r.x, r.y + (r.h - size) / 2.0, r.w, size);
                if let Some(at) = place_lines(&line, std::slice::from_ref(caption), &style).first() {
                    canvas.text(at, caption, PLACEHOLDER, true);
                }
            }
            Content::Barcode { data } => match symbols::code128(data) {
                Ok(modules) => {
                    let module = r.w / (modules.len() + 2 * QUIET_MODULES) as f32;
                    for (start, width) in symbols::bar_runs(&modules) {
                        let bar = Rect::new(
                            r.x + (start + QUIET_MODULES) as f32 * module,
                            r.y,
                            width as f32 * module,
                            r.h,
                        );
                        canvas.fill_rect(&bar, BLACK, 1.0);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "barcode skipped"),
            },
            Content::Qr { payload } => match symbols::qr(payload) {
                Ok(matrix) => {
                    let module = r.w.min(r.h) / matrix.width() as f32;
                    for y in 0..matrix.width() {
                        for x in 0..matrix.width() {
                            if matrix.is_dark(x, y) {
                                let cell = Rect::new(
                                    r.x + x as f32 * module,
                                    r.y + y as f32 * module,
                                    module,
                                    module,
                                );
                                canvas.fill_rect(&cell, BLACK, 1.0);
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "QR code skipped"),
            },
        }
    }

    /// Decoded image for `source`, cached. `None` when it cannot be loaded.
    fn image(&mut self, source: &str) -> Option<&RgbaImage> {
        if !self.images.contains_key(source) {
            let decoded = match self.load_image(source) {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(error = %e, "image skipped");
                    None
                }
            };
            self.images.insert(source.to_string(), decoded);
        }
        self.images.get(source).and_then(Option::as_ref)
    }

    fn load_image(&self, source: &str) -> Result<RgbaImage, PlancheError> {
        let bytes = if source.starts_with("data:") {
            decode_data_uri(source)
                .ok_or_else(|| PlancheError::Image("malformed data URI".to_string()))?
        } else if self.inline_only {
            return Err(PlancheError::Image(format!(
                "'{}' is not an inline image",
                source
            )));
        } else {
            let path = match &self.image_root {
                Some(root) => root.join(source),
                None => PathBuf::from(source),
            };
            std::fs::read(&path)?
        };
        let image = image::load_from_memory(&bytes)
            .map_err(|e| PlancheError::Image(e.to_string()))?;
        Ok(image.to_rgba8())
    }
}

/// Encode a bitmap as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PlancheError> {
    use image::ImageEncoder;

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e: image::ImageError| PlancheError::Image(e.to_string()))?;

    Ok(png_bytes)
}

fn color(hex: &str) -> [u8; 3] {
    parse_hex_color(hex).unwrap_or(BLACK)
}

/// Bitmap plus the millimeter-to-pixel mapping.
struct Canvas {
    image: RgbImage,
    /// Pixels per millimeter.
    scale: f32,
    /// Offset added to every coordinate, in millimeters.
    origin: (f32, f32),
}

impl Canvas {
    /// Pixel span `[start, end)` covered by `[a, b)` millimeters on one axis.
    fn span(&self, a: f32, b: f32, offset: f32, limit: u32) -> (u32, u32) {
        let start = ((a + offset) * self.scale).round().max(0.0) as u32;
        let end = ((b + offset) * self.scale).round().max(0.0) as u32;
        (start.min(limit), end.min(limit))
    }

    fn blend(&mut self, x: u32, y: u32, color: [u8; 3], alpha: f32) {
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let pixel = self.image.get_pixel_mut(x, y);
        if alpha >= 1.0 {
            *pixel = Rgb(color);
            return;
        }
        let alpha = alpha.max(0.0);
        for (channel, &target) in pixel.0.iter_mut().zip(color.iter()) {
            *channel = (*channel as f32 * (1.0 - alpha) + target as f32 * alpha).round() as u8;
        }
    }

    fn fill_rect(&mut self, r: &Rect, color: [u8; 3], alpha: f32) {
        let (x0, x1) = self.span(r.x, r.right(), self.origin.0, self.image.width());
        let (y0, y1) = self.span(r.y, r.bottom(), self.origin.1, self.image.height());
        // Hairlines still show up
        let x1 = if x1 == x0 && r.w > 0.0 { x0 + 1 } else { x1 };
        let y1 = if y1 == y0 && r.h > 0.0 { y0 + 1 } else { y1 };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, alpha);
            }
        }
    }

    /// Outline drawn inside `r`.
    fn stroke_rect(&mut self, r: &Rect, width: f32, color: [u8; 3]) {
        let edges = [
            Rect::new(r.x, r.y, r.w, width),
            Rect::new(r.x, r.bottom() - width, r.w, width),
            Rect::new(r.x, r.y, width, r.h),
            Rect::new(r.right() - width, r.y, width, r.h),
        ];
        for edge in edges {
            self.fill_rect(&edge, color, 1.0);
        }
    }

    fn dashed_rect(&mut self, r: &Rect, width: f32, color: [u8; 3]) {
        let (dash, gap) = DASH_MM;
        let period = dash + gap;

        let mut x = 0.0;
        while x < r.w {
            let len = dash.min(r.w - x);
            self.fill_rect(&Rect::new(r.x + x, r.y, len, width), color, 1.0);
            self.fill_rect(&Rect::new(r.x + x, r.bottom() - width, len, width), color, 1.0);
            x += period;
        }
        let mut y = 0.0;
        while y < r.h {
            let len = dash.min(r.h - y);
            self.fill_rect(&Rect::new(r.x, r.y + y, width, len), color, 1.0);
            self.fill_rect(&Rect::new(r.right() - width, r.y + y, width, len), color, 1.0);
            y += period;
        }
    }

    fn text_lines(&mut self, r: &Rect, lines: &[String], style: &TextStyle) {
        let fill = color(&style.color);
        for (line, at) in lines.iter().zip(place_lines(r, lines, style)) {
            self.text(&at, line, fill, style.bold);
        }
    }

    fn text(&mut self, at: &Placement, text: &str, color: [u8; 3], bold: bool) {
        let cell_w = at.size * super::CHAR_ADVANCE_EM * self.scale;
        let cell_h = at.size * self.scale;
        let top = ((at.top + self.origin.1) * self.scale).round() as i64;
        let left = (at.x + self.origin.0) * self.scale;

        for (idx, ch) in text.chars().enumerate() {
            let glyph = font::glyph(ch, cell_w.round() as usize, cell_h.round() as usize);
            let x0 = (left + idx as f32 * cell_w).round() as i64;
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    if !glyph.is_ink(gx, gy) {
                        continue;
                    }
                    let (px, py) = (x0 + gx as i64, top + gy as i64);
                    if px < 0 || py < 0 {
                        continue;
                    }
                    self.blend(px as u32, py as u32, color, 1.0);
                    if bold {
                        self.blend(px as u32 + 1, py as u32, color, 1.0);
                    }
                }
            }
        }
    }

    fn logo(&mut self, r: &Rect, color: [u8; 3], opacity: f32) {
        let side = r.w.min(r.h);
        let (x0, x1) = self.span(r.x, r.x + side, self.origin.0, self.image.width());
        let (y0, y1) = self.span(r.y, r.y + side, self.origin.1, self.image.height());
        let side_px = (side * self.scale).max(1.0);
        let left = (r.x + self.origin.0) * self.scale;
        let top = (r.y + self.origin.1) * self.scale;

        for y in y0..y1 {
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - left) / side_px;
                let v = (y as f32 + 0.5 - top) / side_px;
                if logo::covers(u, v) {
                    self.blend(x, y, color, opacity);
                }
            }
        }
    }

    fn draw_image(&mut self, r: &Rect, source: &RgbaImage, fit: Fit) {
        let box_w = (r.w * self.scale).round().max(1.0) as u32;
        let box_h = (r.h * self.scale).round().max(1.0) as u32;
        let dynamic = DynamicImage::ImageRgba8(source.clone());
        let fitted = match fit {
            Fit::Contain => dynamic.resize(box_w, box_h, FilterType::Triangle),
            Fit::Cover => dynamic.resize_to_fill(box_w, box_h, FilterType::Triangle),
        }
        .to_rgba8();

        let left = ((r.x + self.origin.0) * self.scale).round() as i64
            + (box_w as i64 - fitted.width() as i64) / 2;
        let top = ((r.y + self.origin.1) * self.scale).round() as i64
            + (box_h as i64 - fitted.height() as i64) / 2;

        for (x, y, pixel) in fitted.enumerate_pixels() {
            let (px, py) = (left + x as i64, top + y as i64);
            if px < 0 || py < 0 {
                continue;
            }
            let [red, green, blue, alpha] = pixel.0;
            self.blend(px as u32, py as u32, [red, green, blue], alpha as f32 / 255.0);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
