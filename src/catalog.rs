//! # Catalog
//!
//! The imported item list plus the user's selection.
//!
//! The selection is derived from the list: replacing the list (a re-import)
//! resets it to "everything". Row edits happen in place and keep the
//! selection, since indices and order are unchanged.
//!
//! References are expected to be unique within one import. When they are
//! not, keyed lookups resolve to the most recently imported or edited row.
//!
//! Uploaded photos never touch the rows. They are applied to a copy of the
//! selection when sheets are built, see [`Catalog::selected_with_images`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::images::ImageLookup;
use crate::item::LabelItem;

/// Which items are marked for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "values", rename_all = "snake_case")]
pub enum Selection {
    /// No explicit selection: every item is exported.
    #[default]
    All,
    /// Positions in the catalog.
    Indices(BTreeSet<usize>),
    /// Exact reference strings.
    References(BTreeSet<String>),
}

impl Selection {
    fn contains(&self, index: usize, item: &LabelItem) -> bool {
        match self {
            Selection::All => true,
            Selection::Indices(set) => set.contains(&index),
            Selection::References(set) => set.contains(&item.reference),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Indices(set) => set.is_empty(),
            Selection::References(set) => set.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<LabelItem>,
    selection: Selection,
    /// Per-item write stamp; higher means more recent.
    revisions: Vec<u64>,
    clock: u64,
}

impl Catalog {
    pub fn new(items: Vec<LabelItem>) -> Self {
        let mut catalog = Self::default();
        catalog.replace(items);
        catalog
    }

    pub fn items(&self) -> &[LabelItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace every item. The selection is invalidated.
    pub fn replace(&mut self, items: Vec<LabelItem>) {
        self.revisions = (0..items.len() as u64).collect();
        self.clock = items.len() as u64;
        self.items = items;
        self.selection = Selection::All;
    }

    /// Overwrite the item at `index`. Returns `false` when out of range.
    pub fn update(&mut self, index: usize, item: LabelItem) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                self.clock += 1;
                self.revisions[index] = self.clock;
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Selected items in catalog order. An empty selection means all items.
    pub fn selected(&self) -> Vec<&LabelItem> {
        if self.selection.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .enumerate()
            .filter(|(index, item)| self.selection.contains(*index, item))
            .map(|(_, item)| item)
            .collect()
    }

    /// The most recently imported or edited item carrying `reference`.
    pub fn find_by_reference(&self, reference: &str) -> Option<&LabelItem> {
        self.items
            .iter()
            .zip(&self.revisions)
            .filter(|(item, _)| item.reference == reference)
            .max_by_key(|(_, revision)| **revision)
            .map(|(item, _)| item)
    }

    /// References of every item, for image matching.
    pub fn references(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.reference.as_str()).collect()
    }

    /// Selected items with images resolved against `images`.
    ///
    /// The stored rows are not modified, so replacing the lookup never loses
    /// a row's own image column.
    pub fn selected_with_images(&self, images: &ImageLookup) -> Vec<LabelItem> {
        self.selected()
            .into_iter()
            .map(|item| item.with_image(images))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(reference: &str, title: &str) -> LabelItem {
        LabelItem {
            reference: reference.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![item("A", "one"), item("B", "two"), item("C", "three")])
    }

    #[test]
    fn test_default_selection_is_everything() {
        let catalog = catalog();
        assert_eq!(catalog.selected().len(), 3);
    }

    #[test]
    fn test_index_selection_keeps_catalog_order() {
        let mut catalog = catalog();
        catalog.select(Selection::Indices([2, 0].into_iter().collect()));
        let refs: Vec<&str> = catalog.selected().iter().map(|i| i.reference.as_str()).collect();
        assert_eq!(refs, ["A", "C"]);
    }

    #[test]
    fn test_reference_selection() {
        let mut catalog = catalog();
        catalog.select(Selection::References(["B".to_string()].into_iter().collect()));
        assert_eq!(catalog.selected()[0].title, "two");
    }

    #[test]
    fn test_empty_explicit_selection_means_all() {
        let mut catalog = catalog();
        catalog.select(Selection::Indices(BTreeSet::new()));
        assert_eq!(catalog.selected().len(), 3);
    }

    #[test]
    fn test_replace_invalidates_selection() {
        let mut catalog = catalog();
        catalog.select(Selection::Indices([1].into_iter().collect()));
        catalog.replace(vec![item("X", "new"), item("Y", "new")]);
        assert_eq!(catalog.selection(), &Selection::All);
        assert_eq!(catalog.selected().len(), 2);
    }

    #[test]
    fn test_update_in_place() {
        let mut catalog = catalog();
        catalog.select(Selection::Indices([1].into_iter().collect()));
        assert!(catalog.update(1, item("B", "edited")));
        assert!(!catalog.update(9, item("Z", "nope")));
        assert_eq!(catalog.selected()[0].title, "edited");
    }

    #[test]
    fn test_duplicate_reference_last_wins() {
        let mut catalog = Catalog::new(vec![item("A", "first"), item("A", "second")]);
        assert_eq!(catalog.find_by_reference("A").unwrap().title, "second");

        catalog.update(0, item("A", "edited"));
        assert_eq!(catalog.find_by_reference("A").unwrap().title, "edited");
        assert!(catalog.find_by_reference("missing").is_none());
    }

    #[test]
    fn test_selected_with_images_follows_current_lookup() {
        let mut catalog = catalog();
        catalog.update(
            0,
            LabelItem {
                image_ref: Some("a.png".to_string()),
                ..item("A", "one")
            },
        );

        let mut upload = ImageLookup::new();
        upload.insert("a", "data:image/png;base64,AA==");
        upload.insert("b", "data:image/png;base64,BB==");
        let resolved = catalog.selected_with_images(&upload);
        assert_eq!(resolved[0].image_ref.as_deref(), Some("data:image/png;base64,AA=="));
        assert_eq!(resolved[1].image_ref.as_deref(), Some("data:image/png;base64,BB=="));
        assert!(resolved[2].image_ref.is_none());

        // A second upload replaces the first one entirely
        let mut reupload = ImageLookup::new();
        reupload.insert("c", "data:image/png;base64,CC==");
        let resolved = catalog.selected_with_images(&reupload);
        assert_eq!(resolved[0].image_ref.as_deref(), Some("a.png"));
        assert!(resolved[1].image_ref.is_none());
        assert_eq!(resolved[2].image_ref.as_deref(), Some("data:image/png;base64,CC=="));
    }
}
