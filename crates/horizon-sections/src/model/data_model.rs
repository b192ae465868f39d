//! The immutable sectioned data model.
//!
//! A [`DataModel`] groups a flat collection of items into named, ordered
//! sections and precomputes lookup tables so that every query is a hash-map
//! or vector access. Models are never mutated: an update builds a new model
//! and diffs it against the previous one.
//!
//! # Construction
//!
//! - [`DataModel::new`] / [`DataModel::with_resolver`]: group a flat collection.
//!   Sections appear in order of first occurrence and items keep their input
//!   order within a section; nothing is sorted. Pre-sort if you need an order.
//! - [`DataModel::from_sections`]: explicit, ordered section descriptors.
//!   This is the only way to get empty sections.
//!
//! Duplicate identifiers are rejected at construction, since a collapsed
//! duplicate would break the identifier/index-path bijection the diff relies on.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_sections_core::PerfSpan;
use horizon_sections_core::logging::{span_names, targets};

use super::identifier::Identifier;
use super::index_path::IndexPath;
use super::item::Item;
use super::resolver::IdentityResolver;
use crate::error::{Error, Result};

/// An explicit section descriptor: a name and its items.
pub struct SectionInfo<T> {
    name: String,
    items: Vec<Arc<T>>,
}

impl<T> SectionInfo<T> {
    /// Creates a section descriptor.
    pub fn new(name: impl Into<String>, items: impl IntoIterator<Item = T>) -> Self {
        Self::from_shared(name, items.into_iter().map(Arc::new))
    }

    /// Creates a section descriptor from shared items.
    pub fn from_shared(name: impl Into<String>, items: impl IntoIterator<Item = Arc<T>>) -> Self {
        Self {
            name: name.into(),
            items: items.into_iter().collect(),
        }
    }

    /// Creates a section descriptor without items.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// The section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The section's items.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }
}

impl<T> Clone for SectionInfo<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }
}

/// One section of a built model.
pub struct Section<T> {
    name: String,
    items: Vec<Arc<T>>,
    identifiers: Vec<Identifier>,
}

impl<T> Section<T> {
    /// The unique section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The section title shown in headers. Currently the section name.
    pub fn title(&self) -> &str {
        &self.name
    }

    /// The items in row order.
    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    /// The identifiers in row order.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the section has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts back into a descriptor, e.g. to build a modified model.
    pub fn to_info(&self) -> SectionInfo<T> {
        SectionInfo {
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }
}

/// An immutable snapshot of items grouped into named, ordered sections.
///
/// # Example
///
/// ```
/// use horizon_sections::model::{DataModel, IndexPath, IdentityResolver};
///
/// let resolver = IdentityResolver::<String>::builder()
///     .section_name_fn(|s: &String| s.chars().next().map(|c| c.to_uppercase().to_string()))
///     .build()
///     .unwrap();
///
/// let model = DataModel::with_resolver(
///     ["apple", "avocado", "banana"].map(String::from),
///     resolver,
/// )
/// .unwrap();
///
/// assert_eq!(model.section_count(), 2);
/// assert_eq!(model.section_name(1), Some("B"));
/// assert_eq!(model.item_at(IndexPath::new(0, 1)).map(|s| s.as_str()), Some("avocado"));
/// ```
pub struct DataModel<T> {
    sections: Vec<Section<T>>,
    section_lookup: HashMap<String, usize>,
    identifier_lookup: HashMap<Identifier, IndexPath>,
    resolver: IdentityResolver<T>,
    item_count: usize,
}

static_assertions::assert_impl_all!(DataModel<String>: Send, Sync);

impl<T: Item> DataModel<T> {
    /// Creates a model with no sections.
    pub fn empty() -> Self {
        Self::empty_with_resolver(IdentityResolver::new())
    }

    /// Creates a model with no sections that keeps the given resolver.
    pub fn empty_with_resolver(resolver: IdentityResolver<T>) -> Self {
        Self {
            sections: Vec::new(),
            section_lookup: HashMap::new(),
            identifier_lookup: HashMap::new(),
            resolver,
            item_count: 0,
        }
    }

    /// Builds a model from a flat collection using the items' own hooks.
    pub fn new(items: impl IntoIterator<Item = T>) -> Result<Self> {
        Self::with_resolver(items, IdentityResolver::new())
    }

    /// Builds a model from a flat collection with a configured resolver.
    ///
    /// # Errors
    ///
    /// - [`Error::UnresolvedIdentifier`] if an item matches no identifier rule.
    /// - [`Error::DuplicateIdentifier`] if two items share an identifier.
    pub fn with_resolver(
        items: impl IntoIterator<Item = T>,
        resolver: IdentityResolver<T>,
    ) -> Result<Self> {
        Self::from_shared(items.into_iter().map(Arc::new), resolver)
    }

    /// Builds a model from shared items.
    ///
    /// Passing the same `Arc` that an earlier model holds lets identity
    /// content equality recognize the item as unchanged.
    pub fn from_shared(
        items: impl IntoIterator<Item = Arc<T>>,
        resolver: IdentityResolver<T>,
    ) -> Result<Self> {
        let mut groups: Vec<(String, Vec<(Arc<T>, Identifier)>)> = Vec::new();
        let mut group_lookup: HashMap<String, usize> = HashMap::new();

        for (position, item) in items.into_iter().enumerate() {
            let identifier = resolver
                .resolve_identifier(&item)
                .ok_or(Error::UnresolvedIdentifier { position })?;
            let name = resolver.resolve_section(&item);
            let slot = match group_lookup.get(&name) {
                Some(&slot) => slot,
                None => {
                    group_lookup.insert(name.clone(), groups.len());
                    groups.push((name, Vec::new()));
                    groups.len() - 1
                }
            };
            groups[slot].1.push((item, identifier));
        }

        Self::assemble(groups, resolver)
    }

    /// Builds a model from explicit, ordered section descriptors.
    ///
    /// Items are placed in the section of their descriptor regardless of what
    /// the resolver's section rules would say.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateSection`] if two descriptors share a name.
    /// - [`Error::UnresolvedIdentifier`] / [`Error::DuplicateIdentifier`] as for
    ///   [`with_resolver`](Self::with_resolver).
    pub fn from_sections(
        sections: impl IntoIterator<Item = SectionInfo<T>>,
        resolver: IdentityResolver<T>,
    ) -> Result<Self> {
        let mut position = 0;
        let mut groups = Vec::new();
        for info in sections {
            let mut entries = Vec::with_capacity(info.items.len());
            for item in info.items {
                let identifier = resolver
                    .resolve_identifier(&item)
                    .ok_or(Error::UnresolvedIdentifier { position })?;
                entries.push((item, identifier));
                position += 1;
            }
            groups.push((info.name, entries));
        }
        Self::assemble(groups, resolver)
    }

    /// Builds a new model from different items, keeping this model's resolver.
    pub fn with_items(&self, items: impl IntoIterator<Item = T>) -> Result<Self> {
        Self::with_resolver(items, self.resolver.clone())
    }

    /// Like [`with_items`](Self::with_items), for shared items.
    pub fn with_shared_items(&self, items: impl IntoIterator<Item = Arc<T>>) -> Result<Self> {
        Self::from_shared(items, self.resolver.clone())
    }

    fn assemble(
        groups: Vec<(String, Vec<(Arc<T>, Identifier)>)>,
        resolver: IdentityResolver<T>,
    ) -> Result<Self> {
        let _perf = PerfSpan::new(span_names::MODEL_BUILD);
        let mut sections = Vec::with_capacity(groups.len());
        let mut section_lookup = HashMap::with_capacity(groups.len());
        let mut identifier_lookup = HashMap::new();
        let mut item_count = 0;

        for (section_index, (name, entries)) in groups.into_iter().enumerate() {
            if section_lookup.insert(name.clone(), section_index).is_some() {
                return Err(Error::DuplicateSection { name });
            }

            let mut items = Vec::with_capacity(entries.len());
            let mut identifiers = Vec::with_capacity(entries.len());
            for (row, (item, identifier)) in entries.into_iter().enumerate() {
                let path = IndexPath::new(section_index, row);
                if let Some(first) = identifier_lookup.insert(identifier.clone(), path) {
                    return Err(Error::DuplicateIdentifier {
                        identifier,
                        first,
                        second: path,
                    });
                }
                items.push(item);
                identifiers.push(identifier);
            }
            item_count += items.len();
            sections.push(Section {
                name,
                items,
                identifiers,
            });
        }

        tracing::debug!(
            target: targets::MODEL,
            sections = sections.len(),
            items = item_count,
            "built data model"
        );

        Ok(Self {
            sections,
            section_lookup,
            identifier_lookup,
            resolver,
            item_count,
        })
    }

    /// Returns the identifier of an item if the model contains it.
    pub fn identifier_for_item(&self, item: &T) -> Option<Identifier> {
        let identifier = self.resolver.resolve_identifier(item)?;
        self.identifier_lookup
            .contains_key(&identifier)
            .then_some(identifier)
    }

    /// Returns the index path of an item, or `None` if it is not a member.
    pub fn index_path_for_item(&self, item: &T) -> Option<IndexPath> {
        let identifier = self.resolver.resolve_identifier(item)?;
        self.index_path_for_identifier(&identifier)
    }

    /// Returns `true` if the model contains an item with the same identifier.
    pub fn contains_item(&self, item: &T) -> bool {
        self.index_path_for_item(item).is_some()
    }

    /// Returns this model's version of an item taken from another model.
    ///
    /// Resolves the item's identifier, then looks that identifier up here.
    pub fn current_version_of_item(&self, item: &T) -> Option<&Arc<T>> {
        let identifier = self.resolver.resolve_identifier(item)?;
        self.item_for_identifier(&identifier)
    }
}

impl<T> DataModel<T> {
    /// The resolver this model was built with.
    pub fn resolver(&self) -> &IdentityResolver<T> {
        &self.resolver
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of rows in a section.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSection`] if `section` is out of range.
    pub fn row_count(&self, section: usize) -> Result<usize> {
        self.sections
            .get(section)
            .map(Section::len)
            .ok_or_else(|| Error::invalid_section(section, self.sections.len()))
    }

    /// The sections in order.
    pub fn sections(&self) -> &[Section<T>] {
        &self.sections
    }

    /// The section at an index.
    pub fn section(&self, section: usize) -> Option<&Section<T>> {
        self.sections.get(section)
    }

    /// The name of the section at an index.
    pub fn section_name(&self, section: usize) -> Option<&str> {
        self.sections.get(section).map(Section::name)
    }

    /// The title of the section at an index. Currently the section name.
    pub fn section_title(&self, section: usize) -> Option<&str> {
        self.sections.get(section).map(Section::title)
    }

    /// The index of a named section.
    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.section_lookup.get(name).copied()
    }

    /// A descriptor copy of the section at an index.
    pub fn section_info(&self, section: usize) -> Option<SectionInfo<T>> {
        self.sections.get(section).map(Section::to_info)
    }

    /// Section names in order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    /// Total number of items.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns `true` if the model holds no items (it may still have empty sections).
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// All items in section-major order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<T>> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// All index paths in section-major order.
    pub fn index_paths(&self) -> impl Iterator<Item = IndexPath> + '_ {
        self.sections.iter().enumerate().flat_map(|(section, s)| {
            (0..s.len()).map(move |row| IndexPath::new(section, row))
        })
    }

    /// All `(index path, identifier, item)` triples in section-major order.
    pub fn entries(&self) -> impl Iterator<Item = (IndexPath, &Identifier, &Arc<T>)> {
        self.sections.iter().enumerate().flat_map(|(section, s)| {
            s.identifiers
                .iter()
                .zip(s.items.iter())
                .enumerate()
                .map(move |(row, (id, item))| (IndexPath::new(section, row), id, item))
        })
    }

    /// The item at an index path, or `None` if the path is out of range.
    pub fn item_at(&self, index_path: IndexPath) -> Option<&Arc<T>> {
        self.sections
            .get(index_path.section())?
            .items
            .get(index_path.row())
    }

    /// The item at an index path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIndexPath`] if the path is out of range.
    pub fn checked_item_at(&self, index_path: IndexPath) -> Result<&Arc<T>> {
        self.item_at(index_path)
            .ok_or_else(|| Error::invalid_index_path(index_path))
    }

    /// The identifier at an index path, or `None` if the path is out of range.
    pub fn identifier_at(&self, index_path: IndexPath) -> Option<&Identifier> {
        self.sections
            .get(index_path.section())?
            .identifiers
            .get(index_path.row())
    }

    /// The index path of an identifier.
    pub fn index_path_for_identifier(&self, identifier: &Identifier) -> Option<IndexPath> {
        self.identifier_lookup.get(identifier).copied()
    }

    /// The item with an identifier.
    pub fn item_for_identifier(&self, identifier: &Identifier) -> Option<&Arc<T>> {
        self.index_path_for_identifier(identifier)
            .and_then(|path| self.item_at(path))
    }

    /// Returns `true` if an item with this identifier is in the model.
    pub fn contains_identifier(&self, identifier: &Identifier) -> bool {
        self.identifier_lookup.contains_key(identifier)
    }

    /// The name of the section that holds an index path.
    pub(crate) fn section_name_of(&self, index_path: IndexPath) -> &str {
        &self.sections[index_path.section()].name
    }
}

impl<T> Clone for DataModel<T> {
    fn clone(&self) -> Self {
        Self {
            sections: self
                .sections
                .iter()
                .map(|s| Section {
                    name: s.name.clone(),
                    items: s.items.clone(),
                    identifiers: s.identifiers.clone(),
                })
                .collect(),
            section_lookup: self.section_lookup.clone(),
            identifier_lookup: self.identifier_lookup.clone(),
            resolver: self.resolver.clone(),
            item_count: self.item_count,
        }
    }
}

impl<T> fmt::Debug for DataModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_map();
        for section in &self.sections {
            list.entry(&section.name, &section.identifiers);
        }
        list.finish()
    }
}
