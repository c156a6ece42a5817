//! # Theme Store
//!
//! Owns the current [`Theme`] and writes every change straight through to a
//! key/value store, so restarting restores the last configuration.
//!
//! Two keys are used:
//!
//! | Key | Content |
//! |-----|---------|
//! | [`THEME_KEY`] | the current theme document |
//! | [`PRESETS_KEY`] | `{ "preset name": theme, ... }` |
//!
//! Renderers never see the store: they receive `&Theme` from
//! [`ThemeStore::current`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::{Theme, ThemeError};

pub const THEME_KEY: &str = "label_theme";
pub const PRESETS_KEY: &str = "label_presets";

/// Untyped string storage, one value per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError>;
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ThemeError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ThemeError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file then rename, so a crash never leaves a
    /// half-written document behind.
    fn set(&mut self, key: &str, value: &str) -> Result<(), ThemeError> {
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// The single owner of the current theme.
pub struct ThemeStore<S: KeyValueStore> {
    storage: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Load the persisted theme, falling back to the default when it is
    /// missing, unreadable or invalid.
    pub fn open(storage: S) -> Self {
        let current = match storage.get(THEME_KEY) {
            Ok(Some(text)) => match parse_valid(&text) {
                Ok(theme) => theme,
                Err(e) => {
                    tracing::warn!(error = %e, "stored theme is unusable, using the default");
                    Theme::default()
                }
            },
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored theme, using the default");
                Theme::default()
            }
        };

        Self { storage, current }
    }

    pub fn current(&self) -> &Theme {
        &self.current
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the whole theme. Invalid themes are rejected and the current
    /// one is kept.
    pub fn replace(&mut self, theme: Theme) -> Result<(), ThemeError> {
        theme.validate()?;
        self.persist(&theme)?;
        self.current = theme;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), ThemeError> {
        self.replace(Theme::default())
    }

    /// Pretty-printed JSON document of the current theme.
    pub fn export(&self) -> Result<String, ThemeError> {
        Ok(serde_json::to_string_pretty(&self.current)?)
    }

    /// Replace the theme with a previously exported document.
    ///
    /// Full replace, never a merge: a document with missing fields is rejected.
    pub fn import(&mut self, document: &str) -> Result<(), ThemeError> {
        let theme = parse_valid(document)?;
        self.replace(theme)
    }

    /// Save the current theme under `name`, overwriting any preset of that name.
    pub fn save_preset(&mut self, name: &str) -> Result<(), ThemeError> {
        let mut presets = self.presets();
        presets.insert(name.to_string(), self.current.clone());
        let text = serde_json::to_string(&presets)?;
        self.storage.set(PRESETS_KEY, &text)?;
        tracing::info!(preset = name, "saved preset");
        Ok(())
    }

    /// Switch to the preset called `name`.
    ///
    /// Returns `Ok(false)` without touching the current theme when no such
    /// preset exists.
    pub fn load_preset(&mut self, name: &str) -> Result<bool, ThemeError> {
        match self.presets().remove(name) {
            Some(theme) => {
                self.replace(theme)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Preset names, sorted.
    pub fn list_presets(&self) -> Vec<String> {
        self.presets().into_keys().collect()
    }

    fn presets(&self) -> BTreeMap<String, Theme> {
        let text = match self.storage.get(PRESETS_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read presets");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored presets are unreadable, ignoring them");
            BTreeMap::new()
        })
    }

    fn persist(&mut self, theme: &Theme) -> Result<(), ThemeError> {
        let text = serde_json::to_string(theme)?;
        self.storage.set(THEME_KEY, &text)?;
        tracing::debug!("theme persisted");
        Ok(())
    }
}

fn parse_valid(text: &str) -> Result<Theme, ThemeError> {
    let theme: Theme = serde_json::from_str(text)?;
    theme.validate()?;
    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orange_theme() -> Theme {
        let mut theme = Theme::default();
        theme.colors.price = "#ff6600".to_string();
        theme
    }

    #[test]
    fn test_starts_with_default() {
        let store = ThemeStore::open(MemoryStore::new());
        assert_eq!(store.current(), &Theme::default());
    }

    #[test]
    fn test_replace_writes_through() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();

        let stored = store.storage().get(THEME_KEY).unwrap().unwrap();
        let reopened: Theme = serde_json::from_str(&stored).unwrap();
        assert_eq!(reopened, orange_theme());
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_default() {
        let mut storage = MemoryStore::new();
        storage.set(THEME_KEY, "{ not json").unwrap();
        let store = ThemeStore::open(storage);
        assert_eq!(store.current(), &Theme::default());
    }

    #[test]
    fn test_invalid_stored_theme_falls_back_to_default() {
        let mut bad = Theme::default();
        bad.watermark.opacity = 4.0;
        let mut storage = MemoryStore::new();
        storage.set(THEME_KEY, &serde_json::to_string(&bad).unwrap()).unwrap();
        assert_eq!(ThemeStore::open(storage).current(), &Theme::default());
    }

    #[test]
    fn test_grid_larger_than_page_is_never_stored() {
        let mut huge = Theme::default();
        huge.layout.sheet.columns = 100_000;
        huge.layout.sheet.rows = 100_000;

        let mut store = ThemeStore::open(MemoryStore::new());
        assert!(store.replace(huge.clone()).is_err());
        assert_eq!(store.current(), &Theme::default());
        assert_eq!(store.storage().get(THEME_KEY).unwrap(), None);

        let mut storage = MemoryStore::new();
        storage.set(THEME_KEY, &serde_json::to_string(&huge).unwrap()).unwrap();
        assert_eq!(ThemeStore::open(storage).current().capacity().get(), 21);
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();
        let document = store.export().unwrap();

        let mut other = ThemeStore::open(MemoryStore::new());
        other.import(&document).unwrap();
        assert_eq!(other.current(), store.current());
    }

    #[test]
    fn test_rejected_import_keeps_current() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();

        assert!(store.import(r#"{"fontFamily": "Arial"}"#).is_err());
        assert!(store.import("garbage").is_err());
        assert_eq!(store.current(), &orange_theme());
    }

    #[test]
    fn test_reset() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();
        store.reset().unwrap();
        assert_eq!(store.current(), &Theme::default());
    }

    #[test]
    fn test_presets() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();
        store.save_preset("orange").unwrap();
        store.reset().unwrap();
        store.save_preset("default").unwrap();

        assert_eq!(store.list_presets(), vec!["default", "orange"]);
        assert!(store.load_preset("orange").unwrap());
        assert_eq!(store.current(), &orange_theme());
    }

    #[test]
    fn test_preset_overwrite() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.save_preset("mine").unwrap();
        store.replace(orange_theme()).unwrap();
        store.save_preset("mine").unwrap();
        store.reset().unwrap();

        assert_eq!(store.list_presets().len(), 1);
        store.load_preset("mine").unwrap();
        assert_eq!(store.current(), &orange_theme());
    }

    #[test]
    fn test_unknown_preset_is_a_no_op() {
        let mut store = ThemeStore::open(MemoryStore::new());
        store.replace(orange_theme()).unwrap();
        assert!(!store.load_preset("missing").unwrap());
        assert_eq!(store.current(), &orange_theme());
    }

    #[test]
    fn test_corrupt_presets_read_as_empty() {
        let mut storage = MemoryStore::new();
        storage.set(PRESETS_KEY, "[1, 2").unwrap();
        let mut store = ThemeStore::open(storage);
        assert!(store.list_presets().is_empty());
        store.save_preset("fresh").unwrap();
        assert_eq!(store.list_presets(), vec!["fresh"]);
    }
}
