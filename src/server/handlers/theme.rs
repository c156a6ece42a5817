//! Theme API handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::theme::Theme;

use super::super::state::AppState;
use super::theme_error;

/// GET /api/theme - Current theme.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<Theme> {
    let store = state.theme.read().await;
    Json(store.current().clone())
}

/// PUT /api/theme - Replace the whole theme.
pub async fn put(
    State(state): State<Arc<AppState>>,
    Json(theme): Json<Theme>,
) -> Result<Json<Theme>, (StatusCode, String)> {
    let mut store = state.theme.write().await;
    store.replace(theme).map_err(theme_error)?;
    Ok(Json(store.current().clone()))
}

/// POST /api/theme/reset - Back to the default theme.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<Theme>, (StatusCode, String)> {
    let mut store = state.theme.write().await;
    store.reset().map_err(theme_error)?;
    Ok(Json(store.current().clone()))
}

/// GET /api/theme/export - Theme document as a download.
pub async fn export(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, (StatusCode, String)> {
    let document = state.theme.read().await.export().map_err(theme_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"theme.json\""),
        ],
        document,
    ))
}

/// POST /api/theme/import - Replace the theme with an exported document.
///
/// The body is the raw document; a document missing any field is rejected
/// and the current theme is kept.
pub async fn import(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<Theme>, (StatusCode, String)> {
    let mut store = state.theme.write().await;
    store.import(&body).map_err(theme_error)?;
    tracing::info!("theme imported");
    Ok(Json(store.current().clone()))
}
