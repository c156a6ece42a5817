//! Profile API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::theme::{GeometryProfile, Theme};

use super::super::state::AppState;
use super::theme_error;

/// GET /api/profiles - List built-in profiles.
pub async fn list() -> Json<Vec<GeometryProfile>> {
    Json(GeometryProfile::built_in())
}

/// POST /api/profiles/:name/apply - Rewrite the theme geometry.
///
/// `name` is a built-in name or `grid:COLSxROWS`.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Theme>, (StatusCode, String)> {
    let profile = GeometryProfile::parse(&name).map_err(theme_error)?;

    let mut store = state.theme.write().await;
    let theme = profile.apply(store.current());
    store.replace(theme).map_err(theme_error)?;
    tracing::info!(profile = %profile.name, capacity = profile.capacity().get(), "profile applied");
    Ok(Json(store.current().clone()))
}
