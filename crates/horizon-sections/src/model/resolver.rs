//! Identity resolution: deriving an identifier and a section name from an item.
//!
//! # Identifier rules
//!
//! Tried in order; the first rule that yields a value wins:
//!
//! 1. The configured identifier function.
//! 2. The configured identifier key path ([`Item::value_for_key_path`]).
//! 3. The item's conventional identifier field ([`Item::identifier`]).
//! 4. A stable identity from an external store ([`Item::object_id`]).
//! 5. The item itself, for value types ([`Item::as_identifier`]).
//!
//! There is no fallback to a memory address. Such an identity would differ
//! between two regenerations of the same logical item, turning every update
//! into a delete plus an insert, so an item that matches no rule is rejected
//! when the model is built.
//!
//! # Section rules
//!
//! 1. The configured section function.
//! 2. The configured section-name key path.
//! 3. The item's conventional section name field ([`Item::section_name`]).
//! 4. [`DEFAULT_SECTION_NAME`].

use std::fmt;
use std::sync::Arc;

use super::identifier::Identifier;
use super::item::Item;
use crate::error::{Error, Result};

/// The section name used for items that resolve to no section.
pub const DEFAULT_SECTION_NAME: &str = "__default_section__";

/// Function that derives an identifier from an item.
pub type IdentifierFn<T> = Arc<dyn Fn(&T) -> Option<Identifier> + Send + Sync>;

/// Function that derives a section name from an item.
pub type SectionNameFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Resolves identifiers and section names for items of type `T`.
///
/// Resolvers are cheap to clone and are kept by the data models they build,
/// so that a controller can rebuild a model from a new item collection with
/// the same configuration.
///
/// # Example
///
/// ```
/// use horizon_sections::model::IdentityResolver;
///
/// // Group strings by their first letter.
/// let resolver = IdentityResolver::<String>::builder()
///     .section_name_fn(|s: &String| s.chars().next().map(|c| c.to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(resolver.resolve_section(&"apple".to_string()), "a");
/// assert_eq!(resolver.resolve_identifier(&"apple".to_string()), Some("apple".into()));
/// ```
pub struct IdentityResolver<T> {
    identifier_key_path: Option<String>,
    section_name_key_path: Option<String>,
    identifier_fn: Option<IdentifierFn<T>>,
    section_name_fn: Option<SectionNameFn<T>>,
}

impl<T> Clone for IdentityResolver<T> {
    fn clone(&self) -> Self {
        Self {
            identifier_key_path: self.identifier_key_path.clone(),
            section_name_key_path: self.section_name_key_path.clone(),
            identifier_fn: self.identifier_fn.clone(),
            section_name_fn: self.section_name_fn.clone(),
        }
    }
}

impl<T> fmt::Debug for IdentityResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("identifier_key_path", &self.identifier_key_path)
            .field("section_name_key_path", &self.section_name_key_path)
            .field("identifier_fn", &self.identifier_fn.is_some())
            .field("section_name_fn", &self.section_name_fn.is_some())
            .finish()
    }
}

impl<T: Item> Default for IdentityResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> IdentityResolver<T> {
    /// Creates a resolver that uses only the item's own hooks.
    pub fn new() -> Self {
        Self {
            identifier_key_path: None,
            section_name_key_path: None,
            identifier_fn: None,
            section_name_fn: None,
        }
    }

    /// Starts building a configured resolver.
    pub fn builder() -> IdentityResolverBuilder<T> {
        IdentityResolverBuilder {
            resolver: Self::new(),
        }
    }

    /// Creates a resolver from key paths, validating them.
    pub fn with_key_paths(
        section_name_key_path: Option<&str>,
        identifier_key_path: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(path) = section_name_key_path {
            builder = builder.section_name_key_path(path);
        }
        if let Some(path) = identifier_key_path {
            builder = builder.identifier_key_path(path);
        }
        builder.build()
    }

    /// The configured identifier key path.
    pub fn identifier_key_path(&self) -> Option<&str> {
        self.identifier_key_path.as_deref()
    }

    /// The configured section-name key path.
    pub fn section_name_key_path(&self) -> Option<&str> {
        self.section_name_key_path.as_deref()
    }

    /// Resolves the identifier for an item, or `None` if no rule applies.
    ///
    /// Never panics; a failing rule falls through to the next one.
    pub fn resolve_identifier(&self, item: &T) -> Option<Identifier> {
        self.identifier_fn
            .as_ref()
            .and_then(|f| f(item))
            .or_else(|| {
                self.identifier_key_path
                    .as_deref()
                    .and_then(|path| item.value_for_key_path(path))
            })
            .or_else(|| item.identifier())
            .or_else(|| item.object_id())
            .or_else(|| item.as_identifier())
    }

    /// Resolves the section name for an item.
    pub fn resolve_section(&self, item: &T) -> String {
        self.section_name_fn
            .as_ref()
            .and_then(|f| f(item))
            .or_else(|| {
                self.section_name_key_path
                    .as_deref()
                    .and_then(|path| item.value_for_key_path(path))
                    .map(|value| value.to_string())
            })
            .or_else(|| item.section_name())
            .unwrap_or_else(|| DEFAULT_SECTION_NAME.to_owned())
    }
}

/// Builder for [`IdentityResolver`].
pub struct IdentityResolverBuilder<T> {
    resolver: IdentityResolver<T>,
}

impl<T: Item> IdentityResolverBuilder<T> {
    /// Sets the key path used to identify items.
    pub fn identifier_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.resolver.identifier_key_path = Some(key_path.into());
        self
    }

    /// Sets the key path used to group items into sections.
    pub fn section_name_key_path(mut self, key_path: impl Into<String>) -> Self {
        self.resolver.section_name_key_path = Some(key_path.into());
        self
    }

    /// Sets a function used to identify items.
    pub fn identifier_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<Identifier> + Send + Sync + 'static,
    {
        self.resolver.identifier_fn = Some(Arc::new(f));
        self
    }

    /// Sets a function used to group items into sections.
    pub fn section_name_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.resolver.section_name_fn = Some(Arc::new(f));
        self
    }

    /// Validates the configuration and returns the resolver.
    pub fn build(self) -> Result<IdentityResolver<T>> {
        validate_key_path("identifier", self.resolver.identifier_key_path.as_deref())?;
        validate_key_path("section name", self.resolver.section_name_key_path.as_deref())?;
        Ok(self.resolver)
    }
}

fn validate_key_path(role: &'static str, key_path: Option<&str>) -> Result<()> {
    match key_path {
        Some(path) if path.is_empty() || path.split('.').any(str::is_empty) => {
            Err(Error::invalid_key_path(role, path))
        }
        _ => Ok(()),
    }
}
