//! Preset API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use crate::theme::Theme;

use super::super::state::AppState;
use super::theme_error;

/// GET /api/presets - Saved preset names.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.theme.read().await.list_presets())
}

/// PUT /api/presets/:name - Save the current theme under `name`.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, (StatusCode, String)> {
    let mut store = state.theme.write().await;
    store.save_preset(&name).map_err(theme_error)?;
    Ok(Json(store.list_presets()))
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    /// False when no preset has that name; the theme is then unchanged.
    pub loaded: bool,
    pub theme: Theme,
}

/// POST /api/presets/:name/load - Switch to a saved preset.
pub async fn load(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<LoadResponse>, (StatusCode, String)> {
    let mut store = state.theme.write().await;
    let loaded = store.load_preset(&name).map_err(theme_error)?;
    if !loaded {
        tracing::debug!(preset = %name, "no such preset, theme unchanged");
    }
    Ok(Json(LoadResponse {
        loaded,
        theme: store.current().clone(),
    }))
}
