//! # Theme / Template Configuration
//!
//! A single value describing how labels and sheets look: font, colors, text
//! sizes, every dimension of the label and sheet grid in millimeters, and the
//! watermark.
//!
//! The serialized form is the human-readable JSON document users export,
//! edit and import:
//!
//! ```json
//! {
//!   "fontFamily": "Inter, Arial, sans-serif",
//!   "colors": { "price": "#f47c20", "text": "#000000", "border": "#000000", "bg": "#ffffff" },
//!   "sizes": { "titlePt": 9, "refPt": 8, "pricePt": 28, "eanPt": 7 },
//!   "layout": {
//!     "label": { "widthMm": 62, "heightMm": 37, "paddingMm": 2, "gapMm": 1, "borderMm": 0.2 },
//!     "barcode": { "widthMm": 38, "heightMm": 14 },
//!     "qr": { "sizeMm": 20 },
//!     "logo": { "heightMm": 8 },
//!     "sheet": { "columns": 3, "rows": 7, "pagePaddingMm": 5, "colGapMm": 4, "rowGapMm": 0 }
//!   },
//!   "watermark": { "enabled": false, "opacity": 0.08 }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`profile`]: Built-in sheet geometries (3×7, 3×8, ...)
//! - [`store`]: Persistence, presets, import/export

pub mod profile;
pub mod store;

pub use profile::GeometryProfile;
pub use store::{FileStore, KeyValueStore, MemoryStore, ThemeStore};

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    /// A field violates the theme invariants
    #[error("invalid theme: {0}")]
    Invalid(String),

    /// The document is not a complete theme
    #[error("unreadable theme document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The key/value store could not be read or written
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("unknown geometry profile '{0}'")]
    UnknownProfile(String),
}

/// Physical paper size of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Paper {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Paper {
    pub const A4: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub colors: Colors,
    pub sizes: Sizes,
    pub layout: Layout,
    pub watermark: Watermark,
}

/// Hex colors (`#rrggbb` or `#rgb`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colors {
    pub price: String,
    pub text: String,
    pub border: String,
    #[serde(rename = "bg", alias = "background")]
    pub background: String,
}

/// Text sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sizes {
    pub title_pt: f32,
    pub ref_pt: f32,
    pub price_pt: f32,
    /// Barcodes are drawn without a caption; kept for template compatibility.
    pub ean_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub label: LabelBox,
    pub barcode: BarcodeBox,
    pub qr: QrBox,
    pub logo: LogoBox,
    pub sheet: SheetGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelBox {
    pub width_mm: f32,
    pub height_mm: f32,
    pub padding_mm: f32,
    pub gap_mm: f32,
    pub border_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeBox {
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrBox {
    pub size_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoBox {
    pub height_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetGrid {
    pub columns: usize,
    pub rows: usize,
    pub page_padding_mm: f32,
    pub col_gap_mm: f32,
    pub row_gap_mm: f32,
}

impl SheetGrid {
    /// Labels per page.
    pub fn capacity(&self) -> NonZeroUsize {
        self.columns
            .checked_mul(self.rows)
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watermark {
    pub enabled: bool,
    pub opacity: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Inter, Arial, sans-serif".to_string(),
            colors: Colors {
                price: "#f47c20".to_string(),
                text: "#000000".to_string(),
                border: "#000000".to_string(),
                background: "#ffffff".to_string(),
            },
            sizes: Sizes {
                title_pt: 9.0,
                ref_pt: 8.0,
                price_pt: 28.0,
                ean_pt: 7.0,
            },
            layout: Layout {
                label: LabelBox {
                    width_mm: 62.0,
                    height_mm: 37.0,
                    padding_mm: 2.0,
                    gap_mm: 1.0,
                    border_mm: 0.2,
                },
                barcode: BarcodeBox {
                    width_mm: 38.0,
                    height_mm: 14.0,
                },
                qr: QrBox { size_mm: 20.0 },
                logo: LogoBox { height_mm: 8.0 },
                sheet: SheetGrid {
                    columns: 3,
                    rows: 7,
                    page_padding_mm: 5.0,
                    col_gap_mm: 4.0,
                    row_gap_mm: 0.0,
                },
            },
            watermark: Watermark {
                enabled: false,
                opacity: 0.08,
            },
        }
    }
}

impl Theme {
    /// Labels per page for this theme's sheet grid.
    pub fn capacity(&self) -> NonZeroUsize {
        self.layout.sheet.capacity()
    }

    /// Check the theme invariants.
    ///
    /// Sizes and box dimensions must be strictly positive; padding, gaps and
    /// border may be zero. The label grid must fit on an A4 page. Opacity
    /// must lie in `[0, 1]` and every color must be a hex color.
    pub fn validate(&self) -> Result<(), ThemeError> {
        let label = &self.layout.label;
        let sheet = &self.layout.sheet;

        let positive = [
            ("sizes.titlePt", self.sizes.title_pt),
            ("sizes.refPt", self.sizes.ref_pt),
            ("sizes.pricePt", self.sizes.price_pt),
            ("sizes.eanPt", self.sizes.ean_pt),
            ("layout.label.widthMm", label.width_mm),
            ("layout.label.heightMm", label.height_mm),
            ("layout.barcode.widthMm", self.layout.barcode.width_mm),
            ("layout.barcode.heightMm", self.layout.barcode.height_mm),
            ("layout.qr.sizeMm", self.layout.qr.size_mm),
            ("layout.logo.heightMm", self.layout.logo.height_mm),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ThemeError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("layout.label.paddingMm", label.padding_mm),
            ("layout.label.gapMm", label.gap_mm),
            ("layout.label.borderMm", label.border_mm),
            ("layout.sheet.pagePaddingMm", sheet.page_padding_mm),
            ("layout.sheet.colGapMm", sheet.col_gap_mm),
            ("layout.sheet.rowGapMm", sheet.row_gap_mm),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ThemeError::Invalid(format!("{} must not be negative, got {}", name, value)));
            }
        }

        if label.padding_mm * 2.0 >= label.width_mm.min(label.height_mm) {
            return Err(ThemeError::Invalid(
                "layout.label.paddingMm leaves no room inside the label".to_string(),
            ));
        }

        if sheet.columns == 0 || sheet.rows == 0 {
            return Err(ThemeError::Invalid(format!(
                "layout.sheet must have at least one column and row, got {}x{}",
                sheet.columns, sheet.rows
            )));
        }

        if sheet.columns.checked_mul(sheet.rows).is_none() {
            return Err(ThemeError::Invalid(format!(
                "layout.sheet grid {}x{} is too large",
                sheet.columns, sheet.rows
            )));
        }

        if !self.fits(Paper::A4) {
            let (width, height) = self.sheet_extent_mm();
            return Err(ThemeError::Invalid(format!(
                "layout.sheet needs {:.1} x {:.1} mm, more than the {} x {} mm page",
                width,
                height,
                Paper::A4.width_mm,
                Paper::A4.height_mm
            )));
        }

        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            return Err(ThemeError::Invalid(format!(
                "watermark.opacity must be within [0, 1], got {}",
                self.watermark.opacity
            )));
        }

        let colors = [
            ("colors.price", &self.colors.price),
            ("colors.text", &self.colors.text),
            ("colors.border", &self.colors.border),
            ("colors.bg", &self.colors.background),
        ];
        for (name, value) in colors {
            if parse_hex_color(value).is_none() {
                return Err(ThemeError::Invalid(format!("{} is not a hex color: '{}'", name, value)));
            }
        }

        Ok(())
    }

    /// Width and height of the label grid, in millimeters, including page padding.
    pub fn sheet_extent_mm(&self) -> (f32, f32) {
        let label = &self.layout.label;
        let sheet = &self.layout.sheet;
        let cols = sheet.columns as f32;
        let rows = sheet.rows as f32;
        let width = sheet.page_padding_mm * 2.0
            + cols * label.width_mm
            + (cols - 1.0).max(0.0) * sheet.col_gap_mm;
        let height = sheet.page_padding_mm * 2.0
            + rows * label.height_mm
            + (rows - 1.0).max(0.0) * sheet.row_gap_mm;
        (width, height)
    }

    /// Whether the grid fits on the given paper without clipping.
    pub fn fits(&self, paper: Paper) -> bool {
        let (width, height) = self.sheet_extent_mm();
        // Allow for float noise from user-entered decimals
        width <= paper.width_mm + 0.01 && height <= paper.height_mm + 0.01
    }
}

/// Parse `#rrggbb` or `#rgb` into RGB bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some([
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ]),
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 16 + v;
            }
            Some(rgb)
        }
        _ => None,
    }
}
