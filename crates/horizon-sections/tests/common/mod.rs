//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use horizon_sections::diff::EditBatch;
use horizon_sections::model::{DataModel, Identifier, Item};

/// Installs a test-writer subscriber honoring `RUST_LOG`, once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A titled row in a named section, identified by `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub section: String,
    pub title: String,
}

impl Row {
    pub fn new(id: u32, section: &str, title: &str) -> Self {
        Self {
            id,
            section: section.to_string(),
            title: title.to_string(),
        }
    }
}

impl Item for Row {
    const PROVIDES_CONTENT_EQUALITY: bool = true;

    fn identifier(&self) -> Option<Identifier> {
        Some(self.id.into())
    }

    fn section_name(&self) -> Option<String> {
        Some(self.section.clone())
    }

    fn content_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// Builds a model from `(id, section, title)` triples.
pub fn model(rows: &[(u32, &str, &str)]) -> DataModel<Row> {
    DataModel::new(
        rows.iter()
            .map(|&(id, section, title)| Row::new(id, section, title)),
    )
    .unwrap()
}

/// Section names and identifiers of a model, in order.
pub fn layout<T>(model: &DataModel<T>) -> Vec<(String, Vec<Identifier>)> {
    model
        .sections()
        .iter()
        .map(|s| (s.name().to_string(), s.identifiers().to_vec()))
        .collect()
}

/// Applies `batch` to the layout of `old` the way an index-based view does.
///
/// Every slot of the result is either pinned by an insert or a move
/// destination, or filled by the next untouched survivor in old order.
/// Inserted sections take their contents from `new`, since their items are
/// never listed separately.
pub fn replay<T>(
    old: &DataModel<T>,
    new: &DataModel<T>,
    batch: &EditBatch,
) -> Vec<(String, Vec<Identifier>)> {
    let deleted_sections: HashSet<usize> =
        batch.deleted_sections().iter().map(|e| e.index).collect();
    let moved_sections: HashSet<usize> = batch.moved_sections().iter().map(|m| m.from).collect();

    let section_count =
        old.section_count() - batch.deleted_sections().len() + batch.inserted_sections().len();
    let mut names: Vec<Option<String>> = vec![None; section_count];
    for edit in batch.inserted_sections() {
        names[edit.index] = Some(edit.name.clone());
    }
    for section_move in batch.moved_sections() {
        names[section_move.to] = Some(section_move.name.clone());
    }
    let mut untouched = old
        .section_names()
        .enumerate()
        .filter(|(i, _)| !deleted_sections.contains(i) && !moved_sections.contains(i))
        .map(|(_, name)| name.to_string());
    for slot in names.iter_mut().filter(|slot| slot.is_none()) {
        *slot = untouched.next();
    }
    assert!(untouched.next().is_none(), "surviving sections left over");

    let inserted_sections: HashSet<&str> = batch
        .inserted_sections()
        .iter()
        .map(|e| e.name.as_str())
        .collect();

    names
        .into_iter()
        .enumerate()
        .map(|(to_section, name)| {
            let name = name.expect("every section slot is filled");
            if inserted_sections.contains(name.as_str()) {
                let index = new.section_index(&name).expect("inserted section exists");
                let ids = new.sections()[index].identifiers().to_vec();
                return (name, ids);
            }
            let from_section = old.section_index(&name).expect("surviving section exists");
            (name, replay_rows(old, batch, from_section, to_section))
        })
        .collect()
}

fn replay_rows<T>(
    old: &DataModel<T>,
    batch: &EditBatch,
    from_section: usize,
    to_section: usize,
) -> Vec<Identifier> {
    let mut leaving: HashSet<usize> = HashSet::new();
    leaving.extend(
        batch
            .deleted_items()
            .iter()
            .filter(|e| e.index_path.section() == from_section)
            .map(|e| e.index_path.row()),
    );
    leaving.extend(
        batch
            .moved_items()
            .iter()
            .filter(|m| m.from.section() == from_section)
            .map(|m| m.from.row()),
    );

    let mut pinned: HashMap<usize, Identifier> = HashMap::new();
    for edit in batch.inserted_items() {
        if edit.index_path.section() == to_section {
            pinned.insert(edit.index_path.row(), edit.identifier.clone());
        }
    }
    for item_move in batch.moved_items() {
        if item_move.to.section() == to_section {
            pinned.insert(item_move.to.row(), item_move.identifier.clone());
        }
    }

    let old_ids = old.sections()[from_section].identifiers();
    let mut staying = old_ids
        .iter()
        .enumerate()
        .filter(|(row, _)| !leaving.contains(row))
        .map(|(_, id)| id.clone());

    let row_count = old_ids.len() - leaving.len() + pinned.len();
    let rows: Vec<Identifier> = (0..row_count)
        .map(|row| match pinned.remove(&row) {
            Some(id) => id,
            None => staying.next().expect("enough surviving rows"),
        })
        .collect();
    assert!(pinned.is_empty(), "edit beyond the end of section {to_section}");
    assert!(staying.next().is_none(), "surviving rows left over in section {to_section}");
    rows
}

/// Asserts that replaying `batch` on `old` yields the layout of `new`.
pub fn assert_replays<T>(old: &DataModel<T>, new: &DataModel<T>, batch: &EditBatch) {
    assert_eq!(replay(old, new, batch), layout(new), "batch: {batch}");
}
