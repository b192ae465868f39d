//! Error types for Horizon Sections.

use crate::model::{Identifier, IndexPath};

/// Result type alias for data model and controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building, querying or updating data models.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A section index was out of range.
    #[error("Invalid section {section}: the model has {count} sections")]
    InvalidSection { section: usize, count: usize },

    /// An index path did not address an item.
    #[error("Invalid index path {index_path}")]
    InvalidIndexPath { index_path: IndexPath },

    /// Two items in one model resolved to the same identifier.
    #[error("Duplicate identifier '{identifier}' at {first} and {second}")]
    DuplicateIdentifier {
        identifier: Identifier,
        first: IndexPath,
        second: IndexPath,
    },

    /// No item with the identifier exists.
    #[error("Unknown identifier '{identifier}'")]
    UnknownIdentifier { identifier: Identifier },

    /// Two explicit section descriptors used the same name.
    #[error("Duplicate section name '{name}'")]
    DuplicateSection { name: String },

    /// No identity rule produced an identifier for an item.
    #[error(
        "No identifier could be resolved for the item at position {position}; \
         configure an identifier key path or function"
    )]
    UnresolvedIdentifier { position: usize },

    /// A configured key path was malformed.
    #[error("Invalid {role} key path '{key_path}'")]
    InvalidKeyPath { role: &'static str, key_path: String },

    /// Content comparison was requested but no equality is available.
    #[error(
        "Content comparison is enabled but the item type provides no content equality; \
         supply a comparison function or use identity equality"
    )]
    AmbiguousContentEquality,

    /// Settings could not be parsed.
    #[error("Invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// The external data source failed to produce items.
    #[error("Data source fetch failed: {0}")]
    DataSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A fetch was requested but no data source is attached.
    #[error("No data source attached to the controller")]
    NoDataSource,
}

impl Error {
    /// Create an invalid section error.
    pub fn invalid_section(section: usize, count: usize) -> Self {
        Self::InvalidSection { section, count }
    }

    /// Create an invalid index path error.
    pub fn invalid_index_path(index_path: IndexPath) -> Self {
        Self::InvalidIndexPath { index_path }
    }

    /// Create an invalid key path error.
    pub fn invalid_key_path(role: &'static str, key_path: impl Into<String>) -> Self {
        Self::InvalidKeyPath {
            role,
            key_path: key_path.into(),
        }
    }

    /// Wrap a data source failure.
    pub fn data_source(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::DataSource(source.into())
    }

    /// Returns `true` for lookup errors that callers treat as "no such element".
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::InvalidSection { .. }
                | Self::InvalidIndexPath { .. }
                | Self::UnknownIdentifier { .. }
        )
    }
}
