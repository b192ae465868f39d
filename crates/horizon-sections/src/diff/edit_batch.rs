//! The result of reconciling two data models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Identifier, IndexPath};

/// A section insert (new index) or delete (old index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionEdit {
    /// The section name.
    pub name: String,
    /// Old index for deletes, new index for inserts.
    pub index: usize,
}

/// A section that is present in both models at different indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionMove {
    /// The section name.
    pub name: String,
    /// Index in the old model.
    pub from: usize,
    /// Index in the new model.
    pub to: usize,
}

/// An item insert (new path), delete (old path) or modification (new path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemEdit {
    /// The item identifier.
    pub identifier: Identifier,
    /// Old path for deletes, new path for inserts and modifications.
    pub index_path: IndexPath,
}

/// An item that is present in both models at different positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMove {
    /// The item identifier.
    pub identifier: Identifier,
    /// Path in the old model.
    pub from: IndexPath,
    /// Path in the new model.
    pub to: IndexPath,
    /// Whether the item's content also changed.
    pub content_changed: bool,
}

/// The section and item edits that turn one data model into another.
///
/// Deletes reference old positions, inserts and modifications reference new
/// positions and moves carry both. An identifier or section name appears in
/// at most one list. Items inside an inserted or deleted section are covered
/// by the section edit and are not listed separately.
///
/// Lists are sorted: section edits by index, deletes by old path, inserts,
/// moves and modifications by new path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBatch {
    pub(crate) inserted_sections: Vec<SectionEdit>,
    pub(crate) deleted_sections: Vec<SectionEdit>,
    pub(crate) moved_sections: Vec<SectionMove>,
    pub(crate) inserted_items: Vec<ItemEdit>,
    pub(crate) deleted_items: Vec<ItemEdit>,
    pub(crate) moved_items: Vec<ItemMove>,
    pub(crate) modified_items: Vec<ItemEdit>,
}

impl EditBatch {
    /// An edit batch with no changes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sections only in the new model, at their new index.
    pub fn inserted_sections(&self) -> &[SectionEdit] {
        &self.inserted_sections
    }

    /// Sections only in the old model, at their old index.
    pub fn deleted_sections(&self) -> &[SectionEdit] {
        &self.deleted_sections
    }

    /// Sections in both models whose index changed.
    pub fn moved_sections(&self) -> &[SectionMove] {
        &self.moved_sections
    }

    /// Items only in the new model, at their new path.
    pub fn inserted_items(&self) -> &[ItemEdit] {
        &self.inserted_items
    }

    /// Items only in the old model, at their old path.
    pub fn deleted_items(&self) -> &[ItemEdit] {
        &self.deleted_items
    }

    /// Items in both models whose position changed.
    pub fn moved_items(&self) -> &[ItemMove] {
        &self.moved_items
    }

    /// Unmoved items whose content changed, at their new path.
    pub fn modified_items(&self) -> &[ItemEdit] {
        &self.modified_items
    }

    /// Returns `true` if any list is non-empty.
    pub fn has_changes(&self) -> bool {
        self.change_count() > 0
    }

    /// Total number of entries across all lists.
    pub fn change_count(&self) -> usize {
        self.inserted_sections.len()
            + self.deleted_sections.len()
            + self.moved_sections.len()
            + self.inserted_items.len()
            + self.deleted_items.len()
            + self.moved_items.len()
            + self.modified_items.len()
    }

    /// Every identifier mentioned by an item edit, in list order.
    pub fn item_identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.inserted_items
            .iter()
            .chain(&self.deleted_items)
            .chain(&self.modified_items)
            .map(|edit| &edit.identifier)
            .chain(self.moved_items.iter().map(|m| &m.identifier))
    }

    pub(crate) fn sort(&mut self) {
        self.inserted_sections.sort_by_key(|e| e.index);
        self.deleted_sections.sort_by_key(|e| e.index);
        self.moved_sections.sort_by_key(|m| m.to);
        self.inserted_items.sort_by_key(|e| e.index_path);
        self.deleted_items.sort_by_key(|e| e.index_path);
        self.moved_items.sort_by_key(|m| m.to);
        self.modified_items.sort_by_key(|e| e.index_path);
    }
}

impl fmt::Display for EditBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sections +{} -{} ~{}, items +{} -{} ~{} *{}",
            self.inserted_sections.len(),
            self.deleted_sections.len(),
            self.moved_sections.len(),
            self.inserted_items.len(),
            self.deleted_items.len(),
            self.moved_items.len(),
            self.modified_items.len()
        )
    }
}
