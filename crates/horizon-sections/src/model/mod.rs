//! Sectioned data models.
//!
//! This module provides the immutable snapshot that list and grid views
//! render from, and everything needed to build one:
//!
//! - [`Identifier`] and [`IndexPath`]: how an item is recognized and addressed
//! - [`Item`]: the hooks an item type exposes for identity, grouping and content
//! - [`IdentityResolver`]: the ordered rules that turn an item into an
//!   identifier and a section name
//! - [`DataModel`]: items grouped into named, ordered sections with O(1) lookups
//! - [`TreeDataModel`]: a collapsible hierarchy flattened into a [`DataModel`]
//! - [`IndexPathItem`]: a ready-made item wrapper for heterogeneous rows
//!
//! # Example
//!
//! ```
//! use horizon_sections::model::{DataModel, IndexPath, IndexPathItem};
//!
//! let model = DataModel::new(vec![
//!     IndexPathItem::with_data("wifi", true).in_section("Network"),
//!     IndexPathItem::with_data("bluetooth", false).in_section("Network"),
//!     IndexPathItem::with_data("dark_mode", true).in_section("Display"),
//! ])
//! .unwrap();
//!
//! assert_eq!(model.section_count(), 2);
//! assert_eq!(model.index_path_for_identifier(&"dark_mode".into()), Some(IndexPath::new(1, 0)));
//! ```

mod data_model;
mod debug;
mod identifier;
mod index_path;
mod item;
mod resolver;
mod tree;

pub use data_model::{DataModel, Section, SectionInfo};
pub use debug::{DataModelDebug, ModelFormatOptions, TreeStyle};
pub use identifier::Identifier;
pub use index_path::IndexPath;
pub use item::{IndexPathItem, Item};
pub use resolver::{
    DEFAULT_SECTION_NAME, IdentifierFn, IdentityResolver, IdentityResolverBuilder, SectionNameFn,
};
pub use tree::{TreeDataModel, TreeItem, TreeRow};
