//! The item contract and the general-purpose [`IndexPathItem`] wrapper.
//!
//! Items are opaque, application-defined values. A data model never compares
//! items structurally to track them; it asks the [`IdentityResolver`] for an
//! identifier and a section name, and the resolver in turn consults the hooks
//! of the [`Item`] trait below.
//!
//! [`IdentityResolver`]: super::IdentityResolver

use super::identifier::Identifier;

/// Hooks a data model uses to identify, group and compare items.
///
/// Every method has a default, so an item type only implements what it
/// actually exposes. The resolver tries the hooks in a fixed order (see
/// [`IdentityResolver`](super::IdentityResolver)); at least one identifier
/// rule must succeed for every item or model construction fails.
///
/// # Example
///
/// ```
/// use horizon_sections::model::{Identifier, Item};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Contact {
///     id: u32,
///     name: String,
/// }
///
/// impl Item for Contact {
///     const PROVIDES_CONTENT_EQUALITY: bool = true;
///
///     fn identifier(&self) -> Option<Identifier> {
///         Some(self.id.into())
///     }
///
///     fn section_name(&self) -> Option<String> {
///         self.name.chars().next().map(|c| c.to_uppercase().to_string())
///     }
///
///     fn content_eq(&self, other: &Self) -> bool {
///         self == other
///     }
/// }
/// ```
pub trait Item: Send + Sync + 'static {
    /// Whether [`content_eq`](Item::content_eq) is a meaningful comparison.
    ///
    /// Types that leave this `false` can still be compared for content by
    /// supplying a comparison function or choosing identity equality.
    const PROVIDES_CONTENT_EQUALITY: bool = false;

    /// Returns the value at a dotted key path, e.g. `"owner.id"`.
    ///
    /// Returning `None` makes the resolver fall through to the next rule.
    fn value_for_key_path(&self, _key_path: &str) -> Option<Identifier> {
        None
    }

    /// The item's conventional identifier field, if it has one.
    fn identifier(&self) -> Option<Identifier> {
        None
    }

    /// The item's conventional section name field, if it has one.
    fn section_name(&self) -> Option<String> {
        None
    }

    /// A stable identity assigned by an external store, e.g. a row id.
    fn object_id(&self) -> Option<Identifier> {
        None
    }

    /// The item itself as a key, for value types that are their own identity.
    fn as_identifier(&self) -> Option<Identifier> {
        None
    }

    /// Returns `true` if the two versions carry the same content.
    ///
    /// Only consulted when [`PROVIDES_CONTENT_EQUALITY`](Item::PROVIDES_CONTENT_EQUALITY)
    /// is `true`.
    fn content_eq(&self, _other: &Self) -> bool {
        false
    }
}

macro_rules! impl_value_item {
    ($($ty:ty),*) => {
        $(impl Item for $ty {
            const PROVIDES_CONTENT_EQUALITY: bool = true;

            fn as_identifier(&self) -> Option<Identifier> {
                Some(Identifier::from(self.clone()))
            }

            fn content_eq(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

impl_value_item!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, String, &'static str);

impl Item for Identifier {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn as_identifier(&self) -> Option<Identifier> {
        Some(self.clone())
    }

    fn content_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// JSON values resolve key paths through nested objects and arrays.
///
/// This is the typical "raw API response" case: each refresh produces new
/// values, so an identifier key path such as `"record_id"` is what lets the
/// model track records across refreshes.
impl Item for serde_json::Value {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn value_for_key_path(&self, key_path: &str) -> Option<Identifier> {
        let mut current = self;
        for segment in key_path.split('.') {
            current = match current {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(values) => values.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Identifier::from_json(current)
    }

    fn as_identifier(&self) -> Option<Identifier> {
        Identifier::from_json(self)
    }

    fn content_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// A general-purpose item wrapper with built-in identifier and section name.
///
/// Useful for settings-style lists with heterogeneous rows: the wrapper
/// carries the identity and grouping, `cell_identifier` tells the view which
/// cell prototype to use, and `data` holds the payload.
///
/// By default two versions of a wrapper are considered to have the same
/// content when their identifier, section name and cell identifier match.
/// Set `should_compare_data` to also compare the payload, so that payload
/// changes are reported as modifications.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPathItem<D> {
    /// The identifier used to track this item across model versions.
    pub identifier: Identifier,
    /// The section this item belongs to, or `None` for the default section.
    pub section_name: Option<String>,
    /// The reuse identifier of the cell prototype that displays this item.
    pub cell_identifier: Option<String>,
    /// The payload.
    pub data: Option<D>,
    /// Whether payload changes count as content changes.
    pub should_compare_data: bool,
}

impl<D> IndexPathItem<D> {
    /// Prefix used for key paths that resolve into the payload.
    pub const DATA_KEY_PATH_PREFIX: &'static str = "data.";

    /// Creates a wrapper with every field.
    pub fn new(
        identifier: impl Into<Identifier>,
        section_name: Option<String>,
        cell_identifier: Option<String>,
        data: Option<D>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            section_name,
            cell_identifier,
            data,
            should_compare_data: false,
        }
    }

    /// Creates a wrapper holding only an identifier and a payload.
    pub fn with_data(identifier: impl Into<Identifier>, data: D) -> Self {
        Self::new(identifier, None, None, Some(data))
    }

    /// Sets the section name.
    pub fn in_section(mut self, section_name: impl Into<String>) -> Self {
        self.section_name = Some(section_name.into());
        self
    }

    /// Sets the cell identifier.
    pub fn with_cell_identifier(mut self, cell_identifier: impl Into<String>) -> Self {
        self.cell_identifier = Some(cell_identifier.into());
        self
    }

    /// Sets whether payload changes count as content changes.
    pub fn comparing_data(mut self, should_compare_data: bool) -> Self {
        self.should_compare_data = should_compare_data;
        self
    }

    /// Prefixes `data.` to a key path so it resolves into the payload.
    pub fn data_key_path(data_key_path: &str) -> String {
        format!("{}{data_key_path}", Self::DATA_KEY_PATH_PREFIX)
    }

    /// Collects the identifiers of a slice of wrappers.
    pub fn identifiers(items: &[IndexPathItem<D>]) -> Vec<Identifier> {
        items.iter().map(|item| item.identifier.clone()).collect()
    }
}

impl<D: Item> Item for IndexPathItem<D> {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn value_for_key_path(&self, key_path: &str) -> Option<Identifier> {
        match key_path {
            "identifier" => Some(self.identifier.clone()),
            "section_name" => self.section_name.clone().map(Identifier::Text),
            "cell_identifier" => self.cell_identifier.clone().map(Identifier::Text),
            "data" => self.data.as_ref()?.as_identifier(),
            _ => {
                let rest = key_path.strip_prefix(Self::DATA_KEY_PATH_PREFIX)?;
                self.data.as_ref()?.value_for_key_path(rest)
            }
        }
    }

    fn identifier(&self) -> Option<Identifier> {
        Some(self.identifier.clone())
    }

    fn section_name(&self) -> Option<String> {
        self.section_name.clone()
    }

    fn content_eq(&self, other: &Self) -> bool {
        if self.identifier != other.identifier
            || self.section_name != other.section_name
            || self.cell_identifier != other.cell_identifier
        {
            return false;
        }
        if !(self.should_compare_data || other.should_compare_data) {
            return true;
        }
        match (&self.data, &other.data) {
            (Some(a), Some(b)) if D::PROVIDES_CONTENT_EQUALITY => a.content_eq(b),
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}
