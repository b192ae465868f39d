//! The boundary to index-based rendering surfaces.
//!
//! A list or grid view does not know about identifiers; it applies edits by
//! position inside one atomic batch. [`EditBatch::batch_update`] translates
//! an edit batch into that form, and [`ModelUpdate::perform_batch_updates`]
//! drives an [`UpdateSurface`] with it.
//!
//! Within a batch a surface applies deletes against old positions, then
//! inserts against new positions, then moves. Rows listed in
//! [`BatchUpdate::reloaded_rows`] are reloaded after the batch, at their new
//! positions.

use crate::controller::ModelUpdate;
use crate::diff::EditBatch;
use crate::model::IndexPath;

/// Position-based edits for one atomic surface update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchUpdate {
    /// Section indices to delete, in the old model.
    pub deleted_sections: Vec<usize>,
    /// Section indices to insert, in the new model.
    pub inserted_sections: Vec<usize>,
    /// Section moves, old index to new index.
    pub moved_sections: Vec<(usize, usize)>,
    /// Rows to delete, by old path.
    pub deleted_rows: Vec<IndexPath>,
    /// Rows to insert, by new path.
    pub inserted_rows: Vec<IndexPath>,
    /// Row moves, old path to new path.
    pub moved_rows: Vec<(IndexPath, IndexPath)>,
    /// Rows to reload after the batch, by new path.
    pub reloaded_rows: Vec<IndexPath>,
}

impl BatchUpdate {
    /// Returns `true` if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.deleted_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.moved_sections.is_empty()
            && self.deleted_rows.is_empty()
            && self.inserted_rows.is_empty()
            && self.moved_rows.is_empty()
            && self.reloaded_rows.is_empty()
    }
}

/// A view that can apply position-based batch updates.
pub trait UpdateSurface {
    /// Applies all edits of `update` as one atomic operation.
    fn perform_batch_updates(&mut self, update: &BatchUpdate);

    /// Discards all displayed content and reloads it from the current model.
    fn reload_data(&mut self);
}

/// What [`ModelUpdate::perform_batch_updates`] did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceAction {
    /// The batch had no changes.
    Nothing,
    /// The surface was fully reloaded.
    Reloaded,
    /// The edits were applied as a batch.
    Batched,
}

impl EditBatch {
    /// Converts the batch into position-based surface edits.
    ///
    /// With `reload_modified`, modified rows and rows that moved with changed
    /// content are reloaded after the batch.
    pub fn batch_update(&self, reload_modified: bool) -> BatchUpdate {
        let mut reloaded_rows = Vec::new();
        if reload_modified {
            reloaded_rows.extend(self.modified_items().iter().map(|e| e.index_path));
            reloaded_rows.extend(
                self.moved_items()
                    .iter()
                    .filter(|m| m.content_changed)
                    .map(|m| m.to),
            );
            reloaded_rows.sort();
        }

        BatchUpdate {
            deleted_sections: self.deleted_sections().iter().map(|e| e.index).collect(),
            inserted_sections: self.inserted_sections().iter().map(|e| e.index).collect(),
            moved_sections: self.moved_sections().iter().map(|m| (m.from, m.to)).collect(),
            deleted_rows: self.deleted_items().iter().map(|e| e.index_path).collect(),
            inserted_rows: self.inserted_items().iter().map(|e| e.index_path).collect(),
            moved_rows: self.moved_items().iter().map(|m| (m.from, m.to)).collect(),
            reloaded_rows,
        }
    }
}

impl<T> ModelUpdate<T> {
    /// Applies this update to a surface.
    ///
    /// A surface that showed a model without sections is reloaded instead of
    /// animated; an update without changes leaves the surface untouched.
    pub fn perform_batch_updates<S: UpdateSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> SurfaceAction {
        if self.old_model().section_count() == 0 && self.updated_model().section_count() > 0 {
            surface.reload_data();
            return SurfaceAction::Reloaded;
        }
        if !self.has_changes() {
            return SurfaceAction::Nothing;
        }
        surface.perform_batch_updates(&self.batch().batch_update(self.reload_modified()));
        SurfaceAction::Batched
    }
}
