//! Item and selection API handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::{Catalog, Selection};
use crate::import::{Format, parse_records};
use crate::item::{LabelItem, normalize_all};

use super::super::state::AppState;

/// Items plus the current selection.
#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<LabelItem>,
    pub selection: Selection,
}

impl ItemsResponse {
    fn of(catalog: &Catalog) -> Self {
        Self {
            items: catalog.items().to_vec(),
            selection: catalog.selection().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// `csv`, `json` or `xlsx`; sniffed from the body when absent.
    pub format: Option<String>,
}

/// POST /api/items/import - Replace the catalog with an uploaded spreadsheet.
pub async fn import(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<ItemsResponse>, (StatusCode, String)> {
    let format = match query.format.as_deref() {
        Some(name) => Format::parse(name)
            .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown format '{}'", name)))?,
        None => sniff_format(&body),
    };

    let records = parse_records(&body, format).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let items = normalize_all(&records, None);

    let mut catalog = state.catalog.write().await;
    catalog.replace(items);
    tracing::info!(items = catalog.len(), "catalog replaced");
    Ok(Json(ItemsResponse::of(&catalog)))
}

/// GET /api/items - Current items and selection.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<ItemsResponse> {
    let catalog = state.catalog.read().await;
    Json(ItemsResponse::of(&catalog))
}

/// PUT /api/items/:index - Edit one item in place.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(item): Json<LabelItem>,
) -> Result<Json<LabelItem>, (StatusCode, String)> {
    let mut catalog = state.catalog.write().await;
    if !catalog.update(index, item) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no item at index {} ({} items)", index, catalog.len()),
        ));
    }
    Ok(Json(catalog.items()[index].clone()))
}

/// PUT /api/selection - Choose which items are exported.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<Selection>,
) -> Json<ItemsResponse> {
    let mut catalog = state.catalog.write().await;
    catalog.select(selection);
    Json(ItemsResponse::of(&catalog))
}

/// XLSX for a zip archive, JSON when the first non-blank byte opens an
/// array, CSV otherwise.
fn sniff_format(body: &[u8]) -> Format {
    if body.starts_with(b"PK\x03\x04") {
        return Format::Xlsx;
    }
    let body = body.strip_prefix("\u{feff}".as_bytes()).unwrap_or(body);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Format::Json,
        _ => Format::Csv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(b"  [{\"REF\":\"A\"}]"), Format::Json);
        assert_eq!(sniff_format("\u{feff}[]".as_bytes()), Format::Json);
        assert_eq!(sniff_format(b"REF;EAN\nA;1"), Format::Csv);
        assert_eq!(sniff_format(b""), Format::Csv);
        assert_eq!(sniff_format(b"PK\x03\x04\x14\x00"), Format::Xlsx);
    }
}
