//! Reconciliation options.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Item;

/// A content comparison function: returns `true` if the two versions are equal.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// How two versions of an item with the same identifier are compared.
pub enum ContentEquality<T> {
    /// Equal only if both models share the same allocation of the item.
    Identity,
    /// Use [`Item::content_eq`].
    Item,
    /// Use a caller-supplied comparison.
    Custom(CompareFn<T>),
}

impl<T> Clone for ContentEquality<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Item => Self::Item,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for ContentEquality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Item => f.write_str("Item"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<T: Item> ContentEquality<T> {
    /// The default for `T`: [`Item`](Self::Item) if the type provides content
    /// equality, [`Identity`](Self::Identity) otherwise.
    pub fn for_item_type() -> Self {
        if T::PROVIDES_CONTENT_EQUALITY {
            Self::Item
        } else {
            Self::Identity
        }
    }

    /// Returns `true` if the two versions are considered equal.
    pub fn equal(&self, old: &Arc<T>, new: &Arc<T>) -> bool {
        match self {
            Self::Identity => Arc::ptr_eq(old, new),
            Self::Item => Arc::ptr_eq(old, new) || old.content_eq(new),
            Self::Custom(f) => f(old.as_ref(), new.as_ref()),
        }
    }
}

/// How surviving items whose position changed are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Every surviving item whose index path or section changed is a move.
    #[default]
    EveryChangedPath,
    /// Within each surviving section, the largest set of items that kept their
    /// relative order is left in place; only the others, plus items that
    /// changed section, are moves.
    Minimal,
}

/// Options controlling [`reconcile`](super::reconcile).
pub struct DiffOptions<T> {
    compare_content: bool,
    equality: ContentEquality<T>,
    move_policy: MovePolicy,
}

impl<T> Clone for DiffOptions<T> {
    fn clone(&self) -> Self {
        Self {
            compare_content: self.compare_content,
            equality: self.equality.clone(),
            move_policy: self.move_policy,
        }
    }
}

impl<T> fmt::Debug for DiffOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("compare_content", &self.compare_content)
            .field("equality", &self.equality)
            .field("move_policy", &self.move_policy)
            .finish()
    }
}

impl<T: Item> Default for DiffOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> DiffOptions<T> {
    /// Content comparison on, the item type's default equality, every changed
    /// path reported as a move.
    pub fn new() -> Self {
        Self {
            compare_content: true,
            equality: ContentEquality::for_item_type(),
            move_policy: MovePolicy::default(),
        }
    }

    /// Starts building options.
    pub fn builder() -> DiffOptionsBuilder<T> {
        DiffOptionsBuilder {
            options: Self::new(),
        }
    }

    /// Whether surviving items are checked for content changes.
    pub fn compare_content(&self) -> bool {
        self.compare_content
    }

    /// The content equality in use.
    pub fn equality(&self) -> &ContentEquality<T> {
        &self.equality
    }

    /// The move policy in use.
    pub fn move_policy(&self) -> MovePolicy {
        self.move_policy
    }

    /// Returns `true` if content comparison is on and the versions differ.
    pub fn content_changed(&self, old: &Arc<T>, new: &Arc<T>) -> bool {
        self.compare_content && !self.equality.equal(old, new)
    }
}

/// Builder for [`DiffOptions`].
pub struct DiffOptionsBuilder<T> {
    options: DiffOptions<T>,
}

impl<T: Item> DiffOptionsBuilder<T> {
    /// Sets whether surviving items are checked for content changes.
    pub fn compare_content(mut self, compare: bool) -> Self {
        self.options.compare_content = compare;
        self
    }

    /// Sets the content equality.
    pub fn equality(mut self, equality: ContentEquality<T>) -> Self {
        self.options.equality = equality;
        self
    }

    /// Uses a comparison function for content equality.
    pub fn compare_fn<F>(self, f: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.equality(ContentEquality::Custom(Arc::new(f)))
    }

    /// Sets the move policy.
    pub fn move_policy(mut self, policy: MovePolicy) -> Self {
        self.options.move_policy = policy;
        self
    }

    /// Validates the configuration and returns the options.
    ///
    /// # Errors
    ///
    /// [`Error::AmbiguousContentEquality`] if content comparison uses
    /// [`ContentEquality::Item`] but `T` provides no content equality.
    pub fn build(self) -> Result<DiffOptions<T>> {
        if self.options.compare_content
            && matches!(self.options.equality, ContentEquality::Item)
            && !T::PROVIDES_CONTENT_EQUALITY
        {
            return Err(Error::AmbiguousContentEquality);
        }
        Ok(self.options)
    }
}
