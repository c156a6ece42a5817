//! # Store Persistence Tests
//!
//! The theme store on a real directory: changes survive reopening, broken
//! files fall back to defaults.

use planche::theme::{FileStore, GeometryProfile, KeyValueStore, Theme, ThemeStore};
use pretty_assertions::assert_eq;
use std::fs;

fn reopen(dir: &std::path::Path) -> ThemeStore<FileStore> {
    ThemeStore::open(FileStore::open(dir).unwrap())
}

#[test]
fn test_fresh_directory_gives_default_theme() {
    let dir = tempfile::tempdir().unwrap();
    let store = reopen(&dir.path().join("nested").join("store"));
    assert_eq!(store.current(), &Theme::default());
}

#[test]
fn test_theme_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut theme = Theme::default();
    theme.colors.price = "#123456".to_string();
    theme.watermark.enabled = true;
    reopen(dir.path()).replace(theme.clone()).unwrap();

    assert_eq!(reopen(dir.path()).current(), &theme);
}

#[test]
fn test_profile_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = reopen(dir.path());
        let theme = GeometryProfile::a4_3x8().apply(store.current());
        store.replace(theme).unwrap();
    }
    assert_eq!(reopen(dir.path()).current().capacity().get(), 24);
}

#[test]
fn test_presets_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = reopen(dir.path());
        let mut theme = Theme::default();
        theme.sizes.price_pt = 30.0;
        store.replace(theme).unwrap();
        store.save_preset("gros prix").unwrap();
        store.reset().unwrap();
        store.save_preset("standard").unwrap();
    }

    let mut store = reopen(dir.path());
    assert_eq!(store.list_presets(), vec!["gros prix", "standard"]);
    assert_eq!(store.current(), &Theme::default());

    assert!(store.load_preset("gros prix").unwrap());
    assert_eq!(store.current().sizes.price_pt, 30.0);
    assert_eq!(reopen(dir.path()).current().sizes.price_pt, 30.0);
}

#[test]
fn test_corrupt_theme_file_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = FileStore::open(dir.path()).unwrap();
    raw.set("label_theme", "{ not json").unwrap();

    let store = reopen(dir.path());
    assert_eq!(store.current(), &Theme::default());
}

#[test]
fn test_exported_document_imports_elsewhere() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();

    let mut theme = Theme::default();
    theme.font_family = "Courier".to_string();
    let mut store = reopen(source.path());
    store.replace(theme.clone()).unwrap();

    let path = source.path().join("theme.json");
    fs::write(&path, store.export().unwrap()).unwrap();

    let mut other = reopen(target.path());
    other.import(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(other.current(), &theme);
}
