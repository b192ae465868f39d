//! The reconciliation engine.

use std::collections::HashMap;

use horizon_sections_core::PerfSpan;
use horizon_sections_core::logging::{span_names, targets};

use super::edit_batch::{EditBatch, ItemEdit, ItemMove, SectionEdit, SectionMove};
use super::moves::longest_increasing_subsequence;
use super::options::{DiffOptions, MovePolicy};
use crate::model::{DataModel, Identifier, IndexPath, Item};

/// An identifier present in both models whose endpoint sections both survive.
struct Survivor<'a> {
    identifier: &'a Identifier,
    from: IndexPath,
    to: IndexPath,
    changed_section: bool,
    content_changed: bool,
}

/// Computes the edits that turn `old` into `new`.
///
/// Items are matched by identifier, never by position. Runs in time linear in
/// the total number of items (plus `O(n log n)` per section for
/// [`MovePolicy::Minimal`]) and never fails for well-formed models.
///
/// # Example
///
/// ```
/// use horizon_sections::diff::{DiffOptions, reconcile};
/// use horizon_sections::model::{DataModel, IndexPath};
///
/// let old = DataModel::new(vec![1u32, 2, 3]).unwrap();
/// let new = DataModel::new(vec![1u32, 3, 4]).unwrap();
///
/// let batch = reconcile(&old, &new, &DiffOptions::new());
/// assert_eq!(batch.deleted_items()[0].index_path, IndexPath::new(0, 1));
/// assert_eq!(batch.inserted_items()[0].index_path, IndexPath::new(0, 2));
/// assert_eq!(batch.moved_items()[0].to, IndexPath::new(0, 1));
/// ```
pub fn reconcile<T: Item>(
    old: &DataModel<T>,
    new: &DataModel<T>,
    options: &DiffOptions<T>,
) -> EditBatch {
    let _perf = PerfSpan::new(span_names::RECONCILE);
    let mut batch = EditBatch::default();

    // Sections, by name.
    let mut section_deleted = vec![false; old.section_count()];
    let mut section_inserted = vec![false; new.section_count()];
    for (from, name) in old.section_names().enumerate() {
        match new.section_index(name) {
            None => {
                section_deleted[from] = true;
                batch.deleted_sections.push(SectionEdit {
                    name: name.to_owned(),
                    index: from,
                });
            }
            Some(to) if to != from => batch.moved_sections.push(SectionMove {
                name: name.to_owned(),
                from,
                to,
            }),
            Some(_) => {}
        }
    }
    for (to, name) in new.section_names().enumerate() {
        if old.section_index(name).is_none() {
            section_inserted[to] = true;
            batch.inserted_sections.push(SectionEdit {
                name: name.to_owned(),
                index: to,
            });
        }
    }

    // Items only in the old model.
    for (from, identifier, _) in old.entries() {
        if !new.contains_identifier(identifier) && !section_deleted[from.section()] {
            batch.deleted_items.push(ItemEdit {
                identifier: identifier.clone(),
                index_path: from,
            });
        }
    }

    // Items in the new model, in new order.
    let mut survivors = Vec::new();
    for (to, identifier, new_item) in new.entries() {
        let Some(from) = old.index_path_for_identifier(identifier) else {
            if !section_inserted[to.section()] {
                batch.inserted_items.push(ItemEdit {
                    identifier: identifier.clone(),
                    index_path: to,
                });
            }
            continue;
        };

        match (section_deleted[from.section()], section_inserted[to.section()]) {
            (true, true) => continue,
            (true, false) => {
                batch.inserted_items.push(ItemEdit {
                    identifier: identifier.clone(),
                    index_path: to,
                });
                continue;
            }
            (false, true) => {
                batch.deleted_items.push(ItemEdit {
                    identifier: identifier.clone(),
                    index_path: from,
                });
                continue;
            }
            (false, false) => {}
        }

        let content_changed = match old.item_at(from) {
            Some(old_item) => options.content_changed(old_item, new_item),
            None => false,
        };
        survivors.push(Survivor {
            identifier,
            from,
            to,
            changed_section: old.section_name_of(from) != new.section_name_of(to),
            content_changed,
        });
    }

    let moved: Vec<bool> = match options.move_policy() {
        MovePolicy::EveryChangedPath => survivors
            .iter()
            .map(|s| s.changed_section || s.from != s.to)
            .collect(),
        MovePolicy::Minimal => minimal_moves(&survivors),
    };

    for (survivor, is_moved) in survivors.iter().zip(moved) {
        if is_moved {
            batch.moved_items.push(ItemMove {
                identifier: survivor.identifier.clone(),
                from: survivor.from,
                to: survivor.to,
                content_changed: survivor.content_changed,
            });
        } else if survivor.content_changed {
            batch.modified_items.push(ItemEdit {
                identifier: survivor.identifier.clone(),
                index_path: survivor.to,
            });
        }
    }

    batch.sort();

    tracing::debug!(
        target: targets::DIFF,
        inserted_sections = batch.inserted_sections.len(),
        deleted_sections = batch.deleted_sections.len(),
        moved_sections = batch.moved_sections.len(),
        inserted_items = batch.inserted_items.len(),
        deleted_items = batch.deleted_items.len(),
        moved_items = batch.moved_items.len(),
        modified_items = batch.modified_items.len(),
        "reconciled data models"
    );

    batch
}

/// Marks the survivors to report as moves under [`MovePolicy::Minimal`].
///
/// Survivors arrive in new-model order. Within each new section, those that
/// stayed in their section keep the longest run whose old rows increase.
fn minimal_moves(survivors: &[Survivor<'_>]) -> Vec<bool> {
    let mut moved: Vec<bool> = survivors.iter().map(|s| s.changed_section).collect();

    let mut by_section: HashMap<usize, Vec<usize>> = HashMap::new();
    for (position, survivor) in survivors.iter().enumerate() {
        if !survivor.changed_section {
            by_section.entry(survivor.to.section()).or_default().push(position);
        }
    }

    for positions in by_section.values() {
        let old_rows: Vec<usize> = positions.iter().map(|&p| survivors[p].from.row()).collect();
        let mut keep = vec![false; positions.len()];
        for k in longest_increasing_subsequence(&old_rows) {
            keep[k] = true;
        }
        for (&position, kept) in positions.iter().zip(keep) {
            moved[position] = !kept;
        }
    }

    moved
}
