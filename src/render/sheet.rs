//! # Sheet Renderer
//!
//! Lays out pages of items on A4 sheets. Every sheet has exactly
//! `columns × rows` cells in row-major order: the page's items first, then
//! empty placeholders of the same size, so a partly filled sheet still shows
//! the full grid.

use serde::Serialize;

use crate::item::LabelItem;
use crate::paginate::paginate;
use crate::theme::{Paper, Theme};

use super::{LabelView, Rect, render_label};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellContent {
    Label(LabelView),
    /// Dashed outline, no content.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Position on the page, in millimeters.
    pub rect: Rect,
    pub content: CellContent,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }
}

/// One physical page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    /// 1-based page number.
    pub number: usize,
    pub page_count: usize,
    pub paper: Paper,
    pub cells: Vec<Cell>,
}

impl Sheet {
    pub fn labels(&self) -> impl Iterator<Item = &LabelView> {
        self.cells.iter().filter_map(|cell| match &cell.content {
            CellContent::Label(view) => Some(view),
            CellContent::Empty => None,
        })
    }

    pub fn placeholder_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }
}

/// Render one sheet per page.
///
/// `pages` is the paginator's output for this theme's capacity. A page
/// holding more items than the grid has cells is truncated to the grid.
pub fn render_sheets(pages: &[&[LabelItem]], theme: &Theme) -> Vec<Sheet> {
    let page_count = pages.len();
    pages
        .iter()
        .enumerate()
        .map(|(idx, page)| render_sheet(page, theme, idx + 1, page_count))
        .collect()
}

/// Paginate `items` for the theme's grid and render every page.
pub fn layout_sheets(items: &[LabelItem], theme: &Theme) -> Vec<Sheet> {
    let pages = paginate(items, theme.capacity());
    render_sheets(&pages, theme)
}

fn render_sheet(page: &[LabelItem], theme: &Theme, number: usize, page_count: usize) -> Sheet {
    let label = &theme.layout.label;
    let grid = &theme.layout.sheet;
    let capacity = theme.capacity().get();

    if page.len() > capacity {
        tracing::warn!(
            page = number,
            items = page.len(),
            capacity,
            "page holds more items than the grid, extra items are not drawn"
        );
    }

    let cells = (0..capacity)
        .map(|slot| {
            let col = slot % grid.columns.max(1);
            let row = slot / grid.columns.max(1);
            let rect = Rect::new(
                grid.page_padding_mm + col as f32 * (label.width_mm + grid.col_gap_mm),
                grid.page_padding_mm + row as f32 * (label.height_mm + grid.row_gap_mm),
                label.width_mm,
                label.height_mm,
            );
            let content = match page.get(slot) {
                Some(item) => CellContent::Label(render_label(item, theme)),
                None => CellContent::Empty,
            };
            Cell { rect, content }
        })
        .collect();

    Sheet {
        number,
        page_count,
        paper: Paper::A4,
        cells,
    }
}
