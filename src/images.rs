//! # Image Lookup
//!
//! Product photos are attached by file name: `A1.jpg` belongs to the item
//! whose reference is `A1`. Matching is case-insensitive and exact on the
//! base name (extension stripped); there is no fuzzy matching.
//!
//! Images are kept inline as `data:` URIs so every renderer can use them
//! without touching the filesystem again.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::path::Path;

use crate::error::PlancheError;

/// Reference (case-insensitive) → inline image.
///
/// Built once per upload; a new upload replaces the whole map.
#[derive(Debug, Clone, Default)]
pub struct ImageLookup {
    entries: HashMap<String, String>,
}

impl ImageLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the image for a reference.
    pub fn insert(&mut self, reference: &str, data_uri: impl Into<String>) {
        self.entries.insert(key(reference), data_uri.into());
    }

    pub fn get(&self, reference: &str) -> Option<&str> {
        if reference.is_empty() {
            return None;
        }
        self.entries.get(&key(reference)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match uploaded files against known references.
    ///
    /// `files` yields `(file name, bytes)`. Files whose base name matches no
    /// reference are skipped. When several files match the same reference the
    /// last one wins.
    pub fn from_files<'a, I>(files: I, references: &[&str]) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut lookup = Self::new();
        let mut total = 0usize;

        for (file_name, bytes) in files {
            total += 1;
            let stem = key(base_name(file_name));
            let matched = references
                .iter()
                .rev()
                .find(|reference| key(reference) == stem);

            if let Some(reference) = matched {
                lookup.insert(reference, data_uri(file_name, bytes));
            }
        }

        tracing::info!(matched = lookup.len(), total, "images matched to references");
        lookup
    }

    /// Read every file in `dir` and match it against `references`.
    pub fn from_dir(dir: &Path, references: &[&str]) -> Result<Self, PlancheError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let bytes = std::fs::read(entry.path())?;
            files.push((name, bytes));
        }
        // Directory order is platform-dependent
        files.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self::from_files(
            files.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
            references,
        ))
    }
}

fn key(reference: &str) -> String {
    reference.to_lowercase()
}

/// File name without its final extension (`photo.v2.png` → `photo.v2`).
pub fn base_name(file_name: &str) -> &str {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Encode bytes as a `data:` URI, guessing the MIME type from the file name.
pub fn data_uri(file_name: &str, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a `data:` URI produced by [`data_uri`]. Returns `None` for external
/// paths and anything that is not base64.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let rest = uri.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("A1.jpg"), "A1");
        assert_eq!(base_name("dir/sub/B-2.PNG"), "B-2");
        assert_eq!(base_name("photo.v2.png"), "photo.v2");
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_case_insensitive_match() {
        let files = [("a1.JPG", b"jpeg".as_slice()), ("unknown.png", b"png".as_slice())];
        let lookup = ImageLookup::from_files(files, &["A1", "B2"]);

        assert_eq!(lookup.len(), 1);
        let uri = lookup.get("A1").unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(lookup.get("a1"), Some(uri));
        assert_eq!(lookup.get("B2"), None);
    }

    #[test]
    fn test_no_partial_matches() {
        let files = [("A1-front.png", b"x".as_slice())];
        let lookup = ImageLookup::from_files(files, &["A1"]);
        assert!(lookup.is_empty());
    }

    #[test]
    fn test_last_file_wins() {
        let files = [("A1.png", b"first".as_slice()), ("a1.png", b"second".as_slice())];
        let lookup = ImageLookup::from_files(files, &["A1"]);
        let bytes = decode_data_uri(lookup.get("A1").unwrap()).unwrap();
        assert_eq!(bytes, b"second");
    }

    #[test]
    fn test_empty_reference_never_matches() {
        let mut lookup = ImageLookup::new();
        lookup.insert("", "data:image/png;base64,AA==");
        assert_eq!(lookup.get(""), None);
    }

    #[test]
    fn test_decode_rejects_paths() {
        assert_eq!(decode_data_uri("images/a1.png"), None);
        assert_eq!(decode_data_uri("data:text/plain,hello"), None);
        assert_eq!(decode_data_uri(&data_uri("x.png", b"hi")), Some(b"hi".to_vec()));
    }
}
