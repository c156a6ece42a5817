//! # Rendering Module
//!
//! Labels and sheets are rendered in two steps:
//!
//! ```text
//! LabelItem + Theme ──► label::render_label ──► LabelView (zones in mm)
//! pages of items    ──► sheet::render_sheets ──► Vec<Sheet> (A4 grid of cells)
//!                                                   │
//!                                  ┌────────────────┼──────────────┐
//!                                  ▼                ▼              ▼
//!                               svg (vector)    raster (RGB)   export (PDF)
//! ```
//!
//! The views are plain data: every zone carries its rectangle in
//! millimeters relative to its parent, so backends only draw and never make
//! layout decisions.
//!
//! ## Modules
//!
//! - [`label`]: One label from one item
//! - [`sheet`]: Fixed grid of labels and placeholders per page
//! - [`svg`]: SVG documents for previews
//! - [`raster`]: Bitmaps for PNG previews and PDF pages
//! - [`symbols`]: Code 128 and QR module matrices
//! - [`logo`]: The brand mark

pub mod font;
pub mod label;
pub mod logo;
pub mod raster;
pub mod sheet;
pub mod svg;
pub mod symbols;

pub use label::render_label;
pub use sheet::{Cell, CellContent, Sheet, layout_sheets, render_sheets};

use serde::Serialize;

/// Millimeters per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.15;

/// Average advance of one character, as a fraction of the font size.
///
/// Used for line breaking; every backend draws text at this advance so
/// wrapped lines fit the same way everywhere.
pub const CHAR_ADVANCE_EM: f32 = 0.6;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

/// Axis-aligned rectangle in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Shrink by `d` on every side.
    pub fn inset(&self, d: f32) -> Self {
        Self::new(self.x + d, self.y + d, self.w - 2.0 * d, self.h - 2.0 * d)
    }

    /// Whether `other` lies inside this rectangle (with a small tolerance).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// How an image fills its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    /// Whole image visible, letterboxed.
    Contain,
    /// Zone fully covered, image cropped.
    Cover,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub size_pt: f32,
    /// Hex color.
    pub color: String,
    pub bold: bool,
    pub align: Align,
}

/// What a zone draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    /// The brand mark, filled with `color`.
    Logo { color: String, opacity: f32 },
    /// Pre-broken lines, top to bottom.
    Text { lines: Vec<String>, style: TextStyle },
    /// Amount followed by a smaller currency glyph, baseline-aligned.
    Price {
        amount: String,
        currency: String,
        size_pt: f32,
        currency_pt: f32,
        color: String,
    },
    Image { source: String, fit: Fit },
    /// Shown when an item has no image.
    ImagePlaceholder { caption: String },
    /// Linear symbol, no caption.
    Barcode { data: String },
    Qr { payload: String },
}

/// Label zones, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Watermark,
    Logo,
    Title,
    Image,
    Price,
    Reference,
    Barcode,
    Qr,
    QrCaption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub zone: Zone,
    /// Relative to the label's top-left corner.
    pub rect: Rect,
    pub content: Content,
}

/// One rendered label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelView {
    pub width_mm: f32,
    pub height_mm: f32,
    pub border_mm: f32,
    pub border_color: String,
    pub background: String,
    pub font_family: String,
    pub nodes: Vec<Node>,
}

/// Fraction of the font size above the baseline.
pub const ASCENT_EM: f32 = 0.8;

/// Where a run of text starts, shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge, in millimeters.
    pub x: f32,
    /// Top of the em box, in millimeters.
    pub top: f32,
    /// Font size, in millimeters.
    pub size: f32,
}

impl Placement {
    pub fn baseline(&self) -> f32 {
        self.top + self.size * ASCENT_EM
    }
}

/// Width of `text` at `size_mm`, using the fixed advance.
pub fn text_width(text: &str, size_mm: f32) -> f32 {
    text.chars().count() as f32 * size_mm * CHAR_ADVANCE_EM
}

/// Placement of each line of a text zone.
pub fn place_lines(rect: &Rect, lines: &[String], style: &TextStyle) -> Vec<Placement> {
    let size = pt_to_mm(style.size_pt);
    let leading = size * (LINE_HEIGHT - 1.0) / 2.0;
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let width = text_width(line, size);
            let x = match style.align {
                Align::Left => rect.x,
                Align::Center => rect.x + (rect.w - width) / 2.0,
                Align::Right => rect.right() - width,
            };
            Placement {
                x,
                top: rect.y + leading + idx as f32 * size * LINE_HEIGHT,
                size,
            }
        })
        .collect()
}

/// Placement of a price amount and its currency glyph: centered in `rect`,
/// sharing one baseline, separated by a narrow space.
pub fn place_price(
    rect: &Rect,
    amount: &str,
    currency: &str,
    size_pt: f32,
    currency_pt: f32,
) -> (Placement, Placement) {
    let size = pt_to_mm(size_pt);
    let currency_size = pt_to_mm(currency_pt);
    let space = size * CHAR_ADVANCE_EM * 0.2;
    let total = text_width(amount, size) + space + text_width(currency, currency_size);

    let amount_at = Placement {
        x: rect.x + (rect.w - total) / 2.0,
        top: rect.y + (rect.h - size) / 2.0,
        size,
    };
    let currency_at = Placement {
        x: amount_at.x + text_width(amount, size) + space,
        top: amount_at.baseline() - currency_size * ASCENT_EM,
        size: currency_size,
    };
    (amount_at, currency_at)
}

impl LabelView {
    pub fn node(&self, zone: Zone) -> Option<&Node> {
        self.nodes.iter().find(|n| n.zone == zone)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_mm, self.height_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_helpers() {
        let r = Rect::new(1.0, 2.0, 10.0, 5.0);
        assert_eq!(r.right(), 11.0);
        assert_eq!(r.bottom(), 7.0);
        assert_eq!(r.inset(1.0), Rect::new(2.0, 3.0, 8.0, 3.0));
        assert!(r.contains(&r.inset(1.0)));
        assert!(!r.inset(1.0).contains(&r));
    }

    #[test]
    fn test_negative_sizes_clamp() {
        let r = Rect::new(0.0, 0.0, 2.0, 2.0).inset(3.0);
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 0.0);
    }

    #[test]
    fn test_pt_to_mm() {
        assert!((pt_to_mm(72.0) - 25.4).abs() < 1e-4);
    }

    #[test]
    fn test_place_lines_alignment() {
        let rect = Rect::new(10.0, 0.0, 20.0, 10.0);
        let lines = vec!["AB".to_string(), "ABCD".to_string()];
        let mut style = TextStyle {
            size_pt: 72.0 / 25.4 * 5.0,
            color: "#000000".to_string(),
            bold: false,
            align: Align::Left,
        };

        let left = place_lines(&rect, &lines, &style);
        assert!(left.iter().all(|p| p.x == 10.0));
        assert!(left[1].top > left[0].top);

        style.align = Align::Right;
        let right = place_lines(&rect, &lines, &style);
        // 4 chars * 5mm * 0.6
        assert!((right[1].x - 18.0).abs() < 1e-3);

        style.align = Align::Center;
        let center = place_lines(&rect, &lines, &style);
        assert!((center[0].x - 17.0).abs() < 1e-3);
    }

    #[test]
    fn test_place_price_shares_baseline() {
        let rect = Rect::new(0.0, 0.0, 30.0, 12.0);
        let (amount, currency) = place_price(&rect, "12,50", "€", 20.0, 8.0);
        assert!((amount.baseline() - currency.baseline()).abs() < 1e-4);
        assert!(currency.x > amount.x);
        assert!(currency.size < amount.size);
    }
}
