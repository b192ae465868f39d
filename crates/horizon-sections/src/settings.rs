//! Declarative configuration.
//!
//! [`Settings`] collects the options of an identity resolver, the diff and
//! the surface adapter in one serde struct, so that a view's model behaviour
//! can live in a configuration file:
//!
//! ```toml
//! identifier_key_path = "record_id"
//! section_name_key_path = "category"
//! compare_content_of_updated_items = true
//! move_policy = "minimal"
//! reload_modified_items = true
//! ```

use serde::{Deserialize, Serialize};

use crate::diff::{DiffOptions, MovePolicy};
use crate::error::Result;
use crate::model::{IdentityResolver, Item};

/// Configuration for building models, reconciling them and applying updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key path used to identify items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_key_path: Option<String>,
    /// Key path used to group items into sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_name_key_path: Option<String>,
    /// Whether surviving items are checked for content changes.
    pub compare_content_of_updated_items: bool,
    /// How moved items are reported.
    pub move_policy: MovePolicy,
    /// Whether changed rows are reloaded when an update is applied to a surface.
    pub reload_modified_items: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            identifier_key_path: None,
            section_name_key_path: None,
            compare_content_of_updated_items: true,
            move_policy: MovePolicy::default(),
            reload_modified_items: true,
        }
    }
}

impl Settings {
    /// Parses settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Builds the identity resolver these settings describe.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidKeyPath`](crate::Error::InvalidKeyPath) for malformed key paths.
    pub fn resolver<T: Item>(&self) -> Result<IdentityResolver<T>> {
        IdentityResolver::with_key_paths(
            self.section_name_key_path.as_deref(),
            self.identifier_key_path.as_deref(),
        )
    }

    /// Builds the diff options these settings describe, using the item
    /// type's default content equality.
    pub fn diff_options<T: Item>(&self) -> Result<DiffOptions<T>> {
        DiffOptions::builder()
            .compare_content(self.compare_content_of_updated_items)
            .move_policy(self.move_policy)
            .build()
    }
}
