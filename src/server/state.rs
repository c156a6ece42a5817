//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::catalog::Catalog;
use crate::images::ImageLookup;
use crate::theme::{FileStore, ThemeStore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    pub listen_addr: String,
    /// Directory of the key/value store holding the theme and presets
    pub store_dir: PathBuf,
}

/// Application state shared across handlers.
pub struct AppState {
    /// Single owner of the current theme.
    pub theme: RwLock<ThemeStore<FileStore>>,
    pub catalog: RwLock<Catalog>,
    /// Replaced wholesale on every upload, never mutated in place.
    pub images: RwLock<Arc<ImageLookup>>,
    /// Held for the whole duration of a PDF export.
    pub export_lock: Mutex<()>,
}

impl AppState {
    pub fn new(storage: FileStore) -> Self {
        Self {
            theme: RwLock::new(ThemeStore::open(storage)),
            catalog: RwLock::new(Catalog::default()),
            images: RwLock::new(Arc::new(ImageLookup::new())),
            export_lock: Mutex::new(()),
        }
    }

    /// Snapshot of the current image lookup.
    pub async fn image_lookup(&self) -> Arc<ImageLookup> {
        self.images.read().await.clone()
    }
}
