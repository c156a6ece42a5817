//! # HTTP Server for Label Sheets
//!
//! JSON API over the theme store, the catalog and the renderers, plus SVG,
//! PNG and PDF downloads.
//!
//! ## Usage
//!
//! ```bash
//! planche serve --listen 127.0.0.1:8080
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/` | Endpoint index |
//! | GET, PUT | `/api/theme` | Current theme |
//! | POST | `/api/theme/reset` | Back to the default theme |
//! | GET | `/api/theme/export` | Theme document download |
//! | POST | `/api/theme/import` | Replace the theme with a document |
//! | GET | `/api/presets` | Preset names |
//! | PUT | `/api/presets/:name` | Save the current theme as a preset |
//! | POST | `/api/presets/:name/load` | Switch to a preset |
//! | GET | `/api/profiles` | Built-in geometry profiles |
//! | POST | `/api/profiles/:name/apply` | Apply a geometry profile |
//! | POST | `/api/items/import` | Import a CSV, JSON or XLSX spreadsheet |
//! | GET | `/api/items` | Items and selection |
//! | PUT | `/api/items/:index` | Edit one item |
//! | PUT | `/api/selection` | Change the selection |
//! | POST | `/api/images` | Upload product photos (multipart) |
//! | GET | `/api/sheets` | Page count summary |
//! | GET | `/api/sheets/:page/svg` | One sheet as SVG |
//! | GET | `/api/sheets/:page/png` | One sheet as PNG |
//! | GET | `/api/export/pdf` | Every sheet as one PDF |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::PlancheError;
use crate::theme::FileStore;

/// Build the application router around shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // Theme API
        .route("/api/theme", get(handlers::theme::get).put(handlers::theme::put))
        .route("/api/theme/reset", post(handlers::theme::reset))
        .route("/api/theme/export", get(handlers::theme::export))
        .route("/api/theme/import", post(handlers::theme::import))
        // Preset API
        .route("/api/presets", get(handlers::presets::list))
        .route("/api/presets/:name", put(handlers::presets::save))
        .route("/api/presets/:name/load", post(handlers::presets::load))
        // Profile API
        .route("/api/profiles", get(handlers::profiles::list))
        .route("/api/profiles/:name/apply", post(handlers::profiles::apply))
        // Item API
        .route("/api/items/import", post(handlers::items::import))
        .route("/api/items", get(handlers::items::list))
        .route("/api/items/:index", put(handlers::items::update))
        .route("/api/selection", put(handlers::items::select))
        // Image API (50MB limit for uploads)
        .route(
            "/api/images",
            post(handlers::images::upload).layer(DefaultBodyLimit::max(50 * 1024 * 1024)),
        )
        // Sheet API
        .route("/api/sheets", get(handlers::sheets::summary))
        .route("/api/sheets/:page/svg", get(handlers::sheets::svg))
        .route("/api/sheets/:page/png", get(handlers::sheets::png))
        .route("/api/export/pdf", get(handlers::sheets::pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use planche::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), planche::error::PlancheError> {
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:8080".to_string(),
///     store_dir: ".planche".into(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), PlancheError> {
    let storage = FileStore::open(&config.store_dir)?;
    let app = router(Arc::new(AppState::new(storage)));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            PlancheError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        store = %config.store_dir.display(),
        "planche HTTP server started"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| PlancheError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
