//! Horizon Sections - sectioned data models and batch-update reconciliation
//! for list and grid views.
//!
//! A view renders an immutable [`DataModel`](model::DataModel): items grouped
//! into named, ordered sections and addressed by [`IndexPath`](model::IndexPath).
//! When the data changes, a new model is built and [`reconcile`](diff::reconcile)
//! compares it with the old one by item identity, producing an
//! [`EditBatch`](diff::EditBatch) of section and item inserts, deletes, moves and
//! modifications that a view can animate. The
//! [`UpdateController`](controller::UpdateController) ties this together for a
//! single view.
//!
//! # Example
//!
//! ```
//! use horizon_sections::prelude::*;
//!
//! let old = DataModel::new(vec![
//!     IndexPathItem::with_data(1, "Milk".to_string()).in_section("Dairy"),
//!     IndexPathItem::with_data(2, "Apples".to_string()).in_section("Fruit"),
//! ])?;
//! let new = DataModel::new(vec![
//!     IndexPathItem::with_data(2, "Apples".to_string()).in_section("Fruit"),
//!     IndexPathItem::with_data(3, "Pears".to_string()).in_section("Fruit"),
//! ])?;
//!
//! let batch = reconcile(&old, &new, &DiffOptions::new());
//! assert_eq!(batch.deleted_sections()[0].name, "Dairy");
//! assert_eq!(batch.inserted_items()[0].index_path, IndexPath::new(0, 1));
//! # Ok::<(), horizon_sections::Error>(())
//! ```

pub mod controller;
pub mod diff;
pub mod error;
pub mod model;
pub mod prelude;
pub mod settings;
pub mod surface;

pub use error::{Error, Result};

pub use horizon_sections_core::{ConnectionId, Signal};
