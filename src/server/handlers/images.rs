//! Product photo upload handler.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use crate::images::ImageLookup;

use super::super::state::AppState;

/// Response from upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Files whose name matched an item reference.
    pub matched: usize,
    /// Files received.
    pub total: usize,
}

/// POST /api/images - Upload product photos.
///
/// Every file part is matched by base name against the current catalog. The
/// previous lookup is discarded; items with no match in this upload fall back
/// to their own image column.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e)))?;
        files.push((file_name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No files provided".to_string()));
    }

    let lookup = {
        let catalog = state.catalog.read().await;
        ImageLookup::from_files(
            files.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
            &catalog.references(),
        )
    };

    let matched = lookup.len();
    *state.images.write().await = Arc::new(lookup);

    Ok(Json(UploadResponse {
        matched,
        total: files.len(),
    }))
}
