//! Bitmap glyphs for the raster backend.
//!
//! Uses the Spleen bitmap font family. The source size closest to (and not
//! below) the target cell is scaled nearest-neighbour into a cell of
//! `CHAR_ADVANCE_EM × 1 em`, so the raster advance matches the advance the
//! label layout used for line breaking.

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

/// A glyph scaled to its target cell. `true` pixels are ink.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub width: usize,
    pub height: usize,
    pub ink: Vec<bool>,
}

impl Glyph {
    pub fn is_ink(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.ink[y * self.width + x]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// 6x12
    Small,
    /// 8x16
    Medium,
    /// 12x24
    Large,
}

impl Source {
    fn for_height(height: usize) -> Self {
        match height {
            0..=12 => Source::Small,
            13..=16 => Source::Medium,
            _ => Source::Large,
        }
    }

    fn dims(self) -> (usize, usize) {
        match self {
            Source::Small => (6, 12),
            Source::Medium => (8, 16),
            Source::Large => (12, 24),
        }
    }

    fn font_data(self) -> &'static [u8] {
        match self {
            Source::Small => FONT_6X12,
            Source::Medium => FONT_8X16,
            Source::Large => FONT_12X24,
        }
    }
}

/// Generate `ch` scaled into a `width × height` pixel cell.
///
/// Characters missing from the font render as a box outline.
pub fn glyph(ch: char, width: usize, height: usize) -> Glyph {
    let width = width.max(1);
    let height = height.max(1);
    let source = Source::for_height(height);
    let (src_w, src_h) = source.dims();

    let mut bitmap = vec![false; src_w * src_h];
    let found = match PSF2Font::new(source.font_data()).ok() {
        Some(mut font) => {
            let utf8 = ch.to_string();
            match font.glyph_for_utf8(utf8.as_bytes()) {
                Some(rows) => {
                    for (row_y, row) in rows.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if row_y < src_h && col_x < src_w {
                                bitmap[row_y * src_w + col_x] = on;
                            }
                        }
                    }
                    true
                }
                None => false,
            }
        }
        None => false,
    };

    if !found && !ch.is_whitespace() {
        draw_box(&mut bitmap, src_w, src_h);
    }

    Glyph {
        width,
        height,
        ink: scale_bitmap(&bitmap, src_w, src_h, width, height),
    }
}

/// Nearest-neighbour scaling.
fn scale_bitmap(src: &[bool], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<bool> {
    let mut dst = vec![false; dst_w * dst_h];
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx * src_w / dst_w;
            let sy = dy * src_h / dst_h;
            dst[dy * dst_w + dx] = src.get(sy * src_w + sx).copied().unwrap_or(false);
        }
    }
    dst
}

fn draw_box(bitmap: &mut [bool], width: usize, height: usize) {
    for x in 1..width - 1 {
        bitmap[2 * width + x] = true;
        bitmap[(height - 2) * width + x] = true;
    }
    for y in 2..height - 1 {
        bitmap[y * width + 1] = true;
        bitmap[y * width + width - 2] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink_count(g: &Glyph) -> usize {
        g.ink.iter().filter(|&&on| on).count()
    }

    #[test]
    fn test_source_selection() {
        assert_eq!(Source::for_height(10), Source::Small);
        assert_eq!(Source::for_height(16), Source::Medium);
        assert_eq!(Source::for_height(40), Source::Large);
    }

    #[test]
    fn test_glyph_has_ink_and_requested_size() {
        let g = glyph('A', 14, 24);
        assert_eq!((g.width, g.height), (14, 24));
        assert_eq!(g.ink.len(), 14 * 24);
        assert!(ink_count(&g) > 0);
    }

    #[test]
    fn test_space_is_blank() {
        assert_eq!(ink_count(&glyph(' ', 12, 24)), 0);
    }

    #[test]
    fn test_tiny_cells_do_not_panic() {
        let g = glyph('R', 1, 1);
        assert_eq!(g.ink.len(), 1);
        let g = glyph('R', 0, 0);
        assert_eq!((g.width, g.height), (1, 1));
    }

    #[test]
    fn test_is_ink_out_of_bounds() {
        let g = glyph('W', 6, 12);
        assert!(!g.is_ink(6, 0));
        assert!(!g.is_ink(0, 12));
    }
}
