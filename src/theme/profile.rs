//! # Geometry Profiles
//!
//! A geometry profile is a (columns, rows, label size) tuple for a given
//! paper format. It fixes the page capacity used by the paginator.
//!
//! ## Built-in profiles
//!
//! | Name | Grid | Label | Per page |
//! |------|------|-------|----------|
//! | `a4-3x7` | 3 × 7 | 62 × 37 mm | 21 |
//! | `a4-3x8` | 3 × 8 | 70 × 37 mm | 24 |
//! | `a4-3x7-70x42` | 3 × 7 | 70 × 42 mm | 21 |
//!
//! ## Page Layout
//!
//! ```text
//! ┌─────────────── 210mm ───────────────┐
//! │ pad                                 │
//! │  ┌──────┐ gap ┌──────┐ gap ┌──────┐ │
//! │  │label │     │label │     │label │ │
//! │  └──────┘     └──────┘     └──────┘ │
//! │   ... rows ...                      │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use planche::theme::{GeometryProfile, Theme};
//!
//! let profile = GeometryProfile::parse("a4-3x8").unwrap();
//! let theme = profile.apply(&Theme::default());
//! assert_eq!(theme.capacity().get(), 24);
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

use super::{Paper, Theme, ThemeError};

/// Physical label grid for one paper format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryProfile {
    /// Short identifier used on the command line and in the API.
    pub name: String,
    pub columns: usize,
    pub rows: usize,
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    pub page_padding_mm: f32,
    pub col_gap_mm: f32,
    pub row_gap_mm: f32,
}

impl GeometryProfile {
    /// 3 × 7 grid of 62 × 37 mm labels. Matches the default theme.
    pub fn a4_3x7() -> Self {
        Self {
            name: "a4-3x7".to_string(),
            columns: 3,
            rows: 7,
            label_width_mm: 62.0,
            label_height_mm: 37.0,
            page_padding_mm: 5.0,
            col_gap_mm: 4.0,
            row_gap_mm: 0.0,
        }
    }

    /// 3 × 8 grid of 70 × 37 mm labels, edge to edge.
    pub fn a4_3x8() -> Self {
        Self {
            name: "a4-3x8".to_string(),
            columns: 3,
            rows: 8,
            label_width_mm: 70.0,
            label_height_mm: 37.0,
            page_padding_mm: 0.0,
            col_gap_mm: 0.0,
            row_gap_mm: 0.0,
        }
    }

    /// 3 × 7 grid of larger 70 × 42 mm labels.
    pub fn a4_3x7_70x42() -> Self {
        Self {
            name: "a4-3x7-70x42".to_string(),
            columns: 3,
            rows: 7,
            label_width_mm: 70.0,
            label_height_mm: 42.0,
            page_padding_mm: 0.0,
            col_gap_mm: 0.0,
            row_gap_mm: 0.0,
        }
    }

    /// A grid sized to fill an A4 page with 5 mm padding and 2 mm gaps.
    pub fn grid(columns: usize, rows: usize) -> Result<Self, ThemeError> {
        if columns == 0 || rows == 0 {
            return Err(ThemeError::UnknownProfile(format!("grid:{}x{}", columns, rows)));
        }
        let padding = 5.0;
        let gap = 2.0;
        let paper = Paper::A4;
        let (cols, rows_f) = (columns as f32, rows as f32);
        let width = (paper.width_mm - padding * 2.0 - gap * (cols - 1.0)) / cols;
        let height = (paper.height_mm - padding * 2.0 - gap * (rows_f - 1.0)) / rows_f;
        if width <= 4.0 || height <= 4.0 {
            return Err(ThemeError::Invalid(format!(
                "grid {}x{} leaves labels too small ({:.1} x {:.1} mm)",
                columns, rows, width, height
            )));
        }

        Ok(Self {
            name: format!("grid:{}x{}", columns, rows),
            columns,
            rows,
            label_width_mm: (width * 10.0).floor() / 10.0,
            label_height_mm: (height * 10.0).floor() / 10.0,
            page_padding_mm: padding,
            col_gap_mm: gap,
            row_gap_mm: gap,
        })
    }

    /// Labels per page.
    pub fn capacity(&self) -> NonZeroUsize {
        self.columns
            .checked_mul(self.rows)
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Copy of `theme` with this profile's label box and sheet grid.
    ///
    /// Colors, sizes and the remaining layout fields are kept.
    pub fn apply(&self, theme: &Theme) -> Theme {
        let mut theme = theme.clone();
        theme.layout.label.width_mm = self.label_width_mm;
        theme.layout.label.height_mm = self.label_height_mm;
        let sheet = &mut theme.layout.sheet;
        sheet.columns = self.columns;
        sheet.rows = self.rows;
        sheet.page_padding_mm = self.page_padding_mm;
        sheet.col_gap_mm = self.col_gap_mm;
        sheet.row_gap_mm = self.row_gap_mm;
        theme
    }

    /// Parse a profile name.
    ///
    /// Formats:
    /// - a built-in name (`"a4-3x7"`, `"a4-3x8"`, `"a4-3x7-70x42"`)
    /// - `"grid:COLSxROWS"` → labels sized to fill A4 (e.g. `"grid:2x5"`)
    pub fn parse(s: &str) -> Result<Self, ThemeError> {
        let lower = s.trim().to_lowercase();

        if let Some(profile) = Self::built_in().into_iter().find(|p| p.name == lower) {
            return Ok(profile);
        }

        if let Some(dims) = lower.strip_prefix("grid:") {
            let (cols, rows) = dims
                .split_once('x')
                .ok_or_else(|| ThemeError::UnknownProfile(s.to_string()))?;
            let cols: usize = cols
                .parse()
                .map_err(|_| ThemeError::UnknownProfile(s.to_string()))?;
            let rows: usize = rows
                .parse()
                .map_err(|_| ThemeError::UnknownProfile(s.to_string()))?;
            return Self::grid(cols, rows);
        }

        Err(ThemeError::UnknownProfile(s.to_string()))
    }

    /// List all built-in profiles.
    pub fn built_in() -> Vec<Self> {
        vec![Self::a4_3x7(), Self::a4_3x8(), Self::a4_3x7_70x42()]
    }
}

// ============================================================================
// TESTS
// ============================================================================
