//! Sheet preview and export handlers.
//!
//! Sheets are laid out on demand from the selected items and the current
//! theme; nothing rendered is cached between requests.
//!
//! Item data arrives from clients, so bitmaps only draw inline `data:`
//! images. A plain path in an image column renders as an empty frame.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::export::{export_file_name, export_pdf};
use crate::item::LabelItem;
use crate::render::raster::{DEFAULT_DPI, Rasterizer, encode_png};
use crate::render::{Sheet, layout_sheets, svg::sheet_svg};

use super::super::state::AppState;
use super::internal_error;

/// Lowest and highest resolution accepted for PNG previews.
const DPI_RANGE: (f32, f32) = (24.0, 600.0);

#[derive(Debug, Serialize)]
pub struct SheetSummary {
    pub pages: usize,
    /// Labels per page.
    pub capacity: usize,
    /// Selected items.
    pub items: usize,
}

#[derive(Debug, Deserialize)]
pub struct PngQuery {
    pub dpi: Option<f32>,
}

/// Lay out the selected items with the current theme and uploaded photos.
async fn current_sheets(state: &AppState) -> (Vec<Sheet>, usize) {
    let theme = state.theme.read().await.current().clone();
    let images = state.image_lookup().await;
    let items: Vec<LabelItem> = {
        let catalog = state.catalog.read().await;
        catalog.selected_with_images(&images)
    };
    let sheets = layout_sheets(&items, &theme);
    (sheets, items.len())
}

/// Take page `page` (1-based) out of `sheets`.
fn take_page(mut sheets: Vec<Sheet>, page: usize) -> Result<Sheet, (StatusCode, String)> {
    let count = sheets.len();
    if page == 0 || page > count {
        return Err((
            StatusCode::NOT_FOUND,
            format!("page {} out of range (1-{})", page, count),
        ));
    }
    Ok(sheets.swap_remove(page - 1))
}

/// GET /api/sheets - Page count for the current selection.
pub async fn summary(State(state): State<Arc<AppState>>) -> Json<SheetSummary> {
    let capacity = state.theme.read().await.current().capacity().get();
    let (sheets, items) = current_sheets(&state).await;
    Json(SheetSummary {
        pages: sheets.len(),
        capacity,
        items,
    })
}

/// GET /api/sheets/:page/svg - One sheet as an SVG document.
pub async fn svg(
    State(state): State<Arc<AppState>>,
    Path(page): Path<usize>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (sheets, _) = current_sheets(&state).await;
    let sheet = take_page(sheets, page)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], sheet_svg(&sheet)))
}

/// GET /api/sheets/:page/png - One sheet as a PNG bitmap.
pub async fn png(
    State(state): State<Arc<AppState>>,
    Path(page): Path<usize>,
    Query(query): Query<PngQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let dpi = query.dpi.unwrap_or(DEFAULT_DPI).clamp(DPI_RANGE.0, DPI_RANGE.1);
    let (sheets, _) = current_sheets(&state).await;
    let sheet = take_page(sheets, page)?;

    let png = tokio::task::spawn_blocking(move || {
        let bitmap = Rasterizer::new(dpi).inline_only().sheet(&sheet)?;
        encode_png(&bitmap)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
    .map_err(internal_error)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// GET /api/export/pdf - Every sheet of the selection as one PDF.
///
/// Exports run one at a time; a second request waits for the first.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let _guard = state.export_lock.lock().await;
    let (sheets, items) = current_sheets(&state).await;
    tracing::info!(pages = sheets.len(), items, "export started");

    let pdf = tokio::task::spawn_blocking(move || {
        export_pdf(&sheets, &mut Rasterizer::default().inline_only())
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?
    .map_err(|e| {
        tracing::error!(error = %e, "export failed");
        internal_error(e)
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(chrono::Local::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}
