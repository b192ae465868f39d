//! Hierarchical data flattened into a sectioned model.
//!
//! A [`TreeDataModel`] keeps a forest of [`TreeItem`] nodes plus the set of
//! collapsed node identifiers, and flattens the visible part of the forest
//! depth-first into a [`DataModel`] of [`TreeRow`]s. Expanding or collapsing
//! a node produces a new tree model; diffing the two flattened models yields
//! the row inserts and deletes that animate the disclosure.
//!
//! A node whose `children` is `None` has not been loaded yet. Use
//! [`TreeDataModel::set_children`] to fill it in lazily.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::data_model::{DataModel, SectionInfo};
use super::identifier::Identifier;
use super::item::Item;
use super::resolver::{DEFAULT_SECTION_NAME, IdentityResolver};
use crate::error::{Error, Result};

/// A node in a tree of items.
pub struct TreeItem<T> {
    identifier: Identifier,
    section_name: Option<String>,
    data: Arc<T>,
    children: Option<Vec<Arc<TreeItem<T>>>>,
}

impl<T> TreeItem<T> {
    /// Creates a leaf node whose children are not loaded.
    pub fn new(identifier: impl Into<Identifier>, data: T) -> Self {
        Self {
            identifier: identifier.into(),
            section_name: None,
            data: Arc::new(data),
            children: None,
        }
    }

    /// Sets the section this node belongs to. Only meaningful for roots.
    pub fn in_section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    /// Sets the children of this node.
    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeItem<T>>) -> Self {
        self.children = Some(children.into_iter().map(Arc::new).collect());
        self
    }

    /// The node identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// The node's section name, if set.
    pub fn section_name(&self) -> Option<&str> {
        self.section_name.as_deref()
    }

    /// The node payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The children, or `None` if they are not loaded.
    pub fn children(&self) -> Option<&[Arc<TreeItem<T>>]> {
        self.children.as_deref()
    }

    /// Returns `true` if the children have been loaded.
    pub fn has_loaded_children(&self) -> bool {
        self.children.is_some()
    }

    /// Returns `true` if the node is loaded and has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_some_and(Vec::is_empty)
    }

    fn find(self: &Arc<Self>, identifier: &Identifier) -> Option<&Arc<Self>> {
        if &self.identifier == identifier {
            return Some(self);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.find(identifier))
    }

    fn replacing_children(
        self: &Arc<Self>,
        identifier: &Identifier,
        children: &Option<Vec<Arc<TreeItem<T>>>>,
    ) -> Option<Arc<Self>> {
        if &self.identifier == identifier {
            return Some(Arc::new(self.with_children_list(children.clone())));
        }
        let current = self.children.as_ref()?;
        current.iter().enumerate().find_map(|(i, child)| {
            let replaced = child.replacing_children(identifier, children)?;
            let mut updated = current.clone();
            updated[i] = replaced;
            Some(Arc::new(self.with_children_list(Some(updated))))
        })
    }

    fn with_children_list(&self, children: Option<Vec<Arc<TreeItem<T>>>>) -> Self {
        Self {
            identifier: self.identifier.clone(),
            section_name: self.section_name.clone(),
            data: Arc::clone(&self.data),
            children,
        }
    }
}

impl<T> fmt::Debug for TreeItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeItem")
            .field("identifier", &self.identifier)
            .field("section_name", &self.section_name)
            .field("children", &self.children)
            .finish()
    }
}

impl<T: Item> Item for TreeItem<T> {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn identifier(&self) -> Option<Identifier> {
        Some(self.identifier.clone())
    }

    fn section_name(&self) -> Option<String> {
        self.section_name.clone()
    }

    fn content_eq(&self, other: &Self) -> bool {
        let same_data = Arc::ptr_eq(&self.data, &other.data)
            || (T::PROVIDES_CONTENT_EQUALITY && self.data.content_eq(&other.data));
        let child_ids = |item: &Self| {
            item.children
                .as_ref()
                .map(|c| c.iter().map(|n| n.identifier.clone()).collect::<Vec<_>>())
        };
        self.identifier == other.identifier
            && self.section_name == other.section_name
            && same_data
            && child_ids(self) == child_ids(other)
    }
}

/// A visible row of a flattened tree.
pub struct TreeRow<T> {
    node: Arc<TreeItem<T>>,
    level: usize,
    collapsed: bool,
}

impl<T> TreeRow<T> {
    /// The tree node shown in this row.
    pub fn node(&self) -> &Arc<TreeItem<T>> {
        &self.node
    }

    /// Nesting depth; roots are level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns `true` if the node is collapsed.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// The node payload.
    pub fn data(&self) -> &T {
        self.node.data()
    }
}

impl<T> fmt::Debug for TreeRow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeRow")
            .field("identifier", &self.node.identifier)
            .field("level", &self.level)
            .field("collapsed", &self.collapsed)
            .finish()
    }
}

impl<T: Item> Item for TreeRow<T> {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn identifier(&self) -> Option<Identifier> {
        Some(self.node.identifier.clone())
    }

    fn section_name(&self) -> Option<String> {
        self.node.section_name.clone()
    }

    // The disclosure state is part of what a row displays.
    fn content_eq(&self, other: &Self) -> bool {
        self.level == other.level
            && self.collapsed == other.collapsed
            && (Arc::ptr_eq(&self.node, &other.node) || self.node.content_eq(&other.node))
    }
}

/// A forest of tree items in a given collapsed state, flattened for display.
pub struct TreeDataModel<T> {
    sections: Vec<SectionInfo<TreeItem<T>>>,
    collapsed: BTreeSet<Identifier>,
    model: DataModel<TreeRow<T>>,
}

impl<T: Item> TreeDataModel<T> {
    /// Builds a tree model from root nodes, grouped by their section names.
    pub fn new(
        roots: impl IntoIterator<Item = TreeItem<T>>,
        collapsed: impl IntoIterator<Item = Identifier>,
    ) -> Result<Self> {
        let mut sections: Vec<(String, Vec<Arc<TreeItem<T>>>)> = Vec::new();
        for root in roots {
            let name = root
                .section_name
                .clone()
                .unwrap_or_else(|| DEFAULT_SECTION_NAME.to_owned());
            match sections.iter_mut().find(|(n, _)| *n == name) {
                Some((_, nodes)) => nodes.push(Arc::new(root)),
                None => sections.push((name, vec![Arc::new(root)])),
            }
        }
        let sections = sections
            .into_iter()
            .map(|(name, nodes)| SectionInfo::from_shared(name, nodes))
            .collect();
        Self::build(sections, collapsed.into_iter().collect())
    }

    /// Builds a tree model from explicit sections of root nodes.
    pub fn from_sections(
        sections: impl IntoIterator<Item = SectionInfo<TreeItem<T>>>,
        collapsed: impl IntoIterator<Item = Identifier>,
    ) -> Result<Self> {
        Self::build(
            sections.into_iter().collect(),
            collapsed.into_iter().collect(),
        )
    }

    fn build(
        sections: Vec<SectionInfo<TreeItem<T>>>,
        collapsed: BTreeSet<Identifier>,
    ) -> Result<Self> {
        let flattened = sections.iter().map(|section| {
            let mut rows = Vec::new();
            for root in section.items() {
                flatten(root, 0, &collapsed, &mut rows);
            }
            SectionInfo::new(section.name(), rows)
        });
        let model = DataModel::from_sections(flattened, IdentityResolver::new())?;
        Ok(Self {
            sections,
            collapsed,
            model,
        })
    }

    /// The flattened model of visible rows.
    pub fn model(&self) -> &DataModel<TreeRow<T>> {
        &self.model
    }

    /// Consumes the tree and returns the flattened model.
    pub fn into_model(self) -> DataModel<TreeRow<T>> {
        self.model
    }

    /// The root sections, including collapsed subtrees.
    pub fn tree_sections(&self) -> &[SectionInfo<TreeItem<T>>] {
        &self.sections
    }

    /// The identifiers of collapsed nodes, in order.
    pub fn collapsed_identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.collapsed.iter()
    }

    /// Returns `true` if the node is collapsed.
    pub fn is_collapsed(&self, identifier: &Identifier) -> bool {
        self.collapsed.contains(identifier)
    }

    /// Finds a node anywhere in the forest, visible or not.
    pub fn find(&self, identifier: &Identifier) -> Option<&Arc<TreeItem<T>>> {
        self.sections
            .iter()
            .flat_map(|section| section.items())
            .find_map(|root| root.find(identifier))
    }

    /// The nesting level of a visible node.
    pub fn level(&self, identifier: &Identifier) -> Option<usize> {
        self.model.item_for_identifier(identifier).map(|row| row.level)
    }

    /// Returns a model with the node collapsed.
    pub fn collapse(&self, identifier: &Identifier) -> Result<Self> {
        let mut collapsed = self.collapsed.clone();
        collapsed.insert(identifier.clone());
        Self::build(self.sections.clone(), collapsed)
    }

    /// Returns a model with the node expanded.
    pub fn expand(&self, identifier: &Identifier) -> Result<Self> {
        let mut collapsed = self.collapsed.clone();
        collapsed.remove(identifier);
        Self::build(self.sections.clone(), collapsed)
    }

    /// Returns a model with the node's collapsed state flipped.
    pub fn toggle(&self, identifier: &Identifier) -> Result<Self> {
        if self.is_collapsed(identifier) {
            self.expand(identifier)
        } else {
            self.collapse(identifier)
        }
    }

    /// Returns a model with a node's children replaced.
    ///
    /// Passing `None` marks the children as not loaded.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownIdentifier`] if no node has the identifier.
    pub fn set_children(
        &self,
        identifier: &Identifier,
        children: Option<Vec<TreeItem<T>>>,
    ) -> Result<Self> {
        let children = children.map(|c| c.into_iter().map(Arc::new).collect::<Vec<_>>());
        let mut found = false;
        let sections: Vec<SectionInfo<TreeItem<T>>> = self
            .sections
            .iter()
            .map(|section| {
                let roots = section.items().iter().map(|root| {
                    if found {
                        return Arc::clone(root);
                    }
                    match root.replacing_children(identifier, &children) {
                        Some(replaced) => {
                            found = true;
                            replaced
                        }
                        None => Arc::clone(root),
                    }
                });
                SectionInfo::from_shared(section.name(), roots.collect::<Vec<_>>())
            })
            .collect();

        if !found {
            return Err(Error::UnknownIdentifier {
                identifier: identifier.clone(),
            });
        }
        Self::build(sections, self.collapsed.clone())
    }
}

impl<T> fmt::Debug for TreeDataModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDataModel")
            .field("collapsed", &self.collapsed)
            .field("model", &self.model)
            .finish()
    }
}

fn flatten<T>(
    node: &Arc<TreeItem<T>>,
    level: usize,
    collapsed: &BTreeSet<Identifier>,
    rows: &mut Vec<TreeRow<T>>,
) {
    let is_collapsed = collapsed.contains(&node.identifier);
    rows.push(TreeRow {
        node: Arc::clone(node),
        level,
        collapsed: is_collapsed,
    });
    if is_collapsed {
        return;
    }
    for child in node.children.iter().flatten() {
        flatten(child, level + 1, collapsed, rows);
    }
}
