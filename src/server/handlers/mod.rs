//! HTTP handlers for the server.

pub mod images;
pub mod items;
pub mod presets;
pub mod profiles;
pub mod sheets;
pub mod theme;

use axum::{http::StatusCode, response::Html};

use crate::error::PlancheError;
use crate::theme::ThemeError;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>planche</title></head>
<body>
<h1>planche</h1>
<p>Label sheets from product spreadsheets.</p>
<ul>
<li><code>GET /api/theme</code>, <code>PUT /api/theme</code></li>
<li><code>POST /api/theme/reset</code></li>
<li><code>GET /api/theme/export</code>, <code>POST /api/theme/import</code></li>
<li><code>GET /api/presets</code>, <code>PUT /api/presets/:name</code>, <code>POST /api/presets/:name/load</code></li>
<li><code>GET /api/profiles</code>, <code>POST /api/profiles/:name/apply</code></li>
<li><code>POST /api/items/import?format=csv|json</code></li>
<li><code>GET /api/items</code>, <code>PUT /api/items/:index</code>, <code>PUT /api/selection</code></li>
<li><code>POST /api/images</code> (multipart)</li>
<li><code>GET /api/sheets</code>, <code>GET /api/sheets/:page/svg</code>, <code>GET /api/sheets/:page/png</code></li>
<li><code>GET /api/export/pdf</code></li>
</ul>
</body>
</html>
"#;

/// GET / - Endpoint index.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Status code for a failed theme operation.
pub(crate) fn theme_error(e: ThemeError) -> (StatusCode, String) {
    let status = match e {
        ThemeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ThemeError::Invalid(_) | ThemeError::Parse(_) | ThemeError::UnknownProfile(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, e.to_string())
}

pub(crate) fn internal_error(e: PlancheError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
