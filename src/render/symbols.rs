//! Machine-readable symbols: Code 128 bars and QR module matrices.
//!
//! Both encoders return plain module data so the SVG and raster backends draw
//! identical symbols. Failures surface as [`PlancheError::Symbol`]; the label
//! renderer decides whether that skips the zone.

use barcoders::sym::code128::Code128;
use qrcode::{EcLevel, QrCode};

use crate::error::PlancheError;

/// Quiet zone on each side of a linear symbol, in modules.
pub const QUIET_MODULES: usize = 10;

/// Encode `data` as Code 128 modules (`true` = bar), quiet zones excluded.
pub fn code128(data: &str) -> Result<Vec<bool>, PlancheError> {
    let data = data.trim();
    if data.is_empty() {
        return Err(PlancheError::Symbol("barcode data is empty".to_string()));
    }

    // Character set B covers upper and lower case, digits and punctuation
    let prefixed = format!("\u{0181}{}", data);
    let barcode = Code128::new(&prefixed)
        .map_err(|e| PlancheError::Symbol(format!("cannot encode '{}' as Code 128: {}", data, e)))?;

    Ok(barcode.encode().into_iter().map(|module| module == 1).collect())
}

/// Group consecutive bars into `(start, width)` runs, in modules.
pub fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (idx, &bar) in modules.iter().enumerate() {
        match (bar, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                runs.push((s, idx - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}

/// A square QR module matrix.
#[derive(Debug, Clone)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Modules per side, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }
}

/// Encode `payload` at error correction level M.
pub fn qr(payload: &str) -> Result<QrMatrix, PlancheError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(|e| PlancheError::Symbol(format!("QR code generation failed: {}", e)))?;

    let width = code.width();
    let mut dark = Vec::with_capacity(width * width);
    for y in 0..width {
        for x in 0..width {
            dark.push(code[(x, y)] == qrcode::Color::Dark);
        }
    }

    Ok(QrMatrix { width, dark })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code128_encoding() {
        let bars = code128("3760001234567").unwrap();
        assert!(!bars.is_empty());
        assert!(bars[0], "symbols start with a bar");
        assert!(bars.iter().any(|&b| !b));
    }

    #[test]
    fn test_code128_mixed_case() {
        assert!(code128("Ref-a1/b").is_ok());
    }

    #[test]
    fn test_code128_empty_is_error() {
        assert!(matches!(code128("  "), Err(PlancheError::Symbol(_))));
    }

    #[test]
    fn test_longer_data_gives_more_modules() {
        let short = code128("12").unwrap();
        let long = code128("1234567890").unwrap();
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_bar_runs() {
        let modules = [true, true, false, true, false, false, true];
        assert_eq!(bar_runs(&modules), vec![(0, 2), (3, 1), (6, 1)]);
        assert!(bar_runs(&[false, false]).is_empty());
    }

    #[test]
    fn test_qr_matrix() {
        let matrix = qr("https://example.com/p/A1").unwrap();
        assert!(matrix.width() >= 21);
        // Finder pattern corner
        assert!(matrix.is_dark(0, 0));
        assert!(!matrix.is_dark(matrix.width(), 0));
    }

    #[test]
    fn test_qr_too_long_is_error() {
        let payload = "x".repeat(5000);
        assert!(matches!(qr(&payload), Err(PlancheError::Symbol(_))));
    }
}
