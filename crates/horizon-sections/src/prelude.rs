//! Prelude module for Horizon Sections.
//!
//! ```
//! use horizon_sections::prelude::*;
//! ```

// ============================================================================
// Data Model
// ============================================================================

pub use crate::model::{
    DataModel, Identifier, IdentityResolver, IndexPath, IndexPathItem, Item, SectionInfo,
    TreeDataModel, TreeItem,
};

// ============================================================================
// Reconciliation
// ============================================================================

pub use crate::diff::{ContentEquality, DiffOptions, EditBatch, MovePolicy, reconcile};

// ============================================================================
// Controller and Surfaces
// ============================================================================

pub use crate::controller::{DataSource, ModelObserver, ModelUpdate, UpdateController};
pub use crate::settings::Settings;
pub use crate::surface::{BatchUpdate, UpdateSurface};

// ============================================================================
// Signal/Slot System and Errors
// ============================================================================

pub use crate::error::Error;
pub use horizon_sections_core::Signal;
