//! Index paths for addressing items in sectioned models.
//!
//! An [`IndexPath`] is the `(section, row)` coordinate of an item in a
//! [`DataModel`](super::DataModel). Both components are zero-based and
//! contiguous. Index paths are only meaningful for the model that produced
//! them; after an update, translate through the item's identifier instead of
//! keeping the path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(section, row)` coordinate into a data model.
///
/// Index paths order by section first, then by row, which is the order items
/// appear in a rendered list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct IndexPath {
    section: usize,
    row: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// The section index.
    #[inline]
    pub const fn section(&self) -> usize {
        self.section
    }

    /// The row index within the section.
    #[inline]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Returns an index path in the same section at a different row.
    #[inline]
    pub const fn with_row(&self, row: usize) -> Self {
        Self::new(self.section, row)
    }

    /// Returns `true` if both paths address the same section.
    #[inline]
    pub fn same_section(&self, other: &IndexPath) -> bool {
        self.section == other.section
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.row)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, row): (usize, usize)) -> Self {
        Self::new(section, row)
    }
}
