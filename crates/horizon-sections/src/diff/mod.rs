//! Reconciliation of two data models into an [`EditBatch`].
//!
//! [`reconcile`] matches items by identifier across an old and a new
//! [`DataModel`](crate::model::DataModel) and classifies every difference:
//!
//! | Change                                 | Reported as                    |
//! |----------------------------------------|--------------------------------|
//! | section name only in the old model     | deleted section (old index)    |
//! | section name only in the new model     | inserted section (new index)   |
//! | section in both, index changed         | moved section                  |
//! | identifier only in the old model       | deleted item (old path)        |
//! | identifier only in the new model       | inserted item (new path)       |
//! | identifier in both, position changed   | moved item (old and new path)  |
//! | identifier in both, content changed    | modified item (new path)       |
//!
//! Items inside an inserted or deleted section are covered by the section
//! edit. An item that moved and changed content is reported once, as a move
//! with [`ItemMove::content_changed`] set.
//!
//! The batch is meant to be replayed by an index-based view in the order
//! deletes, inserts, moves; see [`crate::surface`].

mod edit_batch;
mod moves;
mod options;
mod reconcile;

pub use edit_batch::{EditBatch, ItemEdit, ItemMove, SectionEdit, SectionMove};
pub use options::{CompareFn, ContentEquality, DiffOptions, DiffOptionsBuilder, MovePolicy};
pub use reconcile::reconcile;
