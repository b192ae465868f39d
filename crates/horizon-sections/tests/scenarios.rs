//! End-to-end reconciliation scenarios.

mod common;

use common::{Row, assert_replays, model};
use horizon_sections::diff::{DiffOptions, ItemEdit, ItemMove, MovePolicy, SectionEdit, reconcile};
use horizon_sections::model::{
    DataModel, DataModelDebug, Identifier, IdentityResolver, IndexPath, ModelFormatOptions,
    SectionInfo, TreeDataModel, TreeItem, TreeStyle,
};
use serde_json::json;

fn minimal() -> DiffOptions<Row> {
    DiffOptions::builder()
        .move_policy(MovePolicy::Minimal)
        .build()
        .unwrap()
}

#[test]
fn test_reordered_rows_move() {
    let old = model(&[(1, "A", "one"), (2, "A", "two"), (3, "A", "three")]);
    let new = model(&[(1, "A", "one"), (3, "A", "three"), (2, "A", "two")]);

    let batch = reconcile(&old, &new, &DiffOptions::new());
    assert!(batch.inserted_sections().is_empty());
    assert!(batch.deleted_sections().is_empty());
    assert!(batch.moved_sections().is_empty());
    assert!(batch.inserted_items().is_empty());
    assert!(batch.deleted_items().is_empty());
    assert_eq!(
        batch.moved_items(),
        &[
            ItemMove {
                identifier: 3u32.into(),
                from: IndexPath::new(0, 2),
                to: IndexPath::new(0, 1),
                content_changed: false,
            },
            ItemMove {
                identifier: 2u32.into(),
                from: IndexPath::new(0, 1),
                to: IndexPath::new(0, 2),
                content_changed: false,
            },
        ]
    );
    assert_replays(&old, &new, &batch);

    let batch = reconcile(&old, &new, &minimal());
    assert_eq!(batch.moved_items().len(), 1);
    assert_replays(&old, &new, &batch);
}

#[test]
fn test_deleted_section_covers_its_items() {
    let old = model(&[(1, "A", "one"), (2, "B", "two")]);
    let new = model(&[(2, "B", "two"), (3, "B", "three")]);

    let batch = reconcile(&old, &new, &DiffOptions::new());
    assert_eq!(
        batch.deleted_sections(),
        &[SectionEdit {
            name: "A".into(),
            index: 0,
        }]
    );
    assert_eq!(
        batch.inserted_items(),
        &[ItemEdit {
            identifier: 3u32.into(),
            index_path: IndexPath::new(0, 1),
        }]
    );
    assert!(batch.deleted_items().is_empty());
    assert!(!batch.item_identifiers().any(|id| *id == Identifier::from(1u32)));
    assert_eq!(batch.moved_sections().len(), 1);
    assert_replays(&old, &new, &batch);

    // Item 2 keeps its place inside section "B".
    let batch = reconcile(&old, &new, &minimal());
    assert!(batch.moved_items().is_empty());
    assert_replays(&old, &new, &batch);
}

#[test]
fn test_changed_content_is_a_modification() {
    let old = model(&[(1, "A", "one"), (2, "A", "two"), (3, "A", "three")]);
    let new = old.clone();
    let options = DiffOptions::<Row>::builder()
        .compare_fn(|old, new| old.id != 2 && old == new)
        .build()
        .unwrap();

    let batch = reconcile(&old, &new, &options);
    assert_eq!(
        batch.modified_items(),
        &[ItemEdit {
            identifier: 2u32.into(),
            index_path: IndexPath::new(0, 1),
        }]
    );
    assert_eq!(batch.change_count(), 1);

    let retitled = model(&[(1, "A", "one"), (2, "A", "TWO"), (3, "A", "three")]);
    let batch = reconcile(&old, &retitled, &DiffOptions::new());
    assert_eq!(batch.modified_items().len(), 1);

    let ignoring = DiffOptions::builder().compare_content(false).build().unwrap();
    assert!(!reconcile(&old, &retitled, &ignoring).has_changes());
}

#[test]
fn test_first_content_inserts_sections_only() {
    let old = DataModel::<Row>::empty();
    let new = model(&[(1, "A", "one"), (2, "B", "two")]);

    let batch = reconcile(&old, &new, &DiffOptions::new());
    let names: Vec<&str> = batch.inserted_sections().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(batch.inserted_items().is_empty());
    assert!(batch.has_changes());
    assert_replays(&old, &new, &batch);

    let batch = reconcile(&new, &old, &DiffOptions::new());
    assert_eq!(batch.deleted_sections().len(), 2);
    assert!(batch.deleted_items().is_empty());
}

#[test]
fn test_item_leaving_for_new_section_is_deleted() {
    let old = model(&[(1, "A", "one"), (2, "A", "two")]);
    let new = model(&[(1, "A", "one"), (2, "C", "two")]);

    let batch = reconcile(&old, &new, &DiffOptions::new());
    assert_eq!(batch.inserted_sections()[0].name, "C");
    assert_eq!(
        batch.deleted_items(),
        &[ItemEdit {
            identifier: 2u32.into(),
            index_path: IndexPath::new(0, 1),
        }]
    );
    assert!(batch.moved_items().is_empty());
    assert_replays(&old, &new, &batch);

    // And the reverse: arriving from a deleted section is an insert.
    let batch = reconcile(&new, &old, &DiffOptions::new());
    assert_eq!(batch.deleted_sections()[0].name, "C");
    assert_eq!(batch.inserted_items()[0].index_path, IndexPath::new(0, 1));
    assert_replays(&new, &old, &batch);
}

#[test]
fn test_move_between_surviving_sections() {
    let old = model(&[(1, "A", "one"), (2, "A", "two"), (3, "B", "three")]);
    let new = model(&[(1, "A", "one"), (3, "B", "three"), (2, "B", "deux")]);

    for options in [DiffOptions::new(), minimal()] {
        let batch = reconcile(&old, &new, &options);
        assert_eq!(
            batch.moved_items(),
            &[ItemMove {
                identifier: 2u32.into(),
                from: IndexPath::new(0, 1),
                to: IndexPath::new(1, 1),
                content_changed: true,
            }]
        );
        assert!(batch.modified_items().is_empty());
        assert_replays(&old, &new, &batch);
    }
}

#[test]
fn test_explicit_sections_keep_empty_sections() {
    let old = DataModel::from_sections(
        vec![
            SectionInfo::new("Inbox", [Row::new(1, "Inbox", "hi")]),
            SectionInfo::empty("Archive"),
        ],
        IdentityResolver::new(),
    )
    .unwrap();
    let new = DataModel::from_sections(
        vec![
            SectionInfo::empty("Inbox"),
            SectionInfo::new("Archive", [Row::new(1, "Inbox", "hi")]),
        ],
        IdentityResolver::new(),
    )
    .unwrap();

    let batch = reconcile(&old, &new, &DiffOptions::new());
    assert!(batch.moved_sections().is_empty());
    assert_eq!(batch.moved_items()[0].to, IndexPath::new(1, 0));
    assert_replays(&old, &new, &batch);
}

#[test]
fn test_json_records_tracked_by_key_path() {
    let resolver = IdentityResolver::builder()
        .identifier_key_path("record.id")
        .section_name_key_path("kind")
        .build()
        .unwrap();
    let old = DataModel::with_resolver(
        vec![
            json!({ "record": { "id": 10 }, "kind": "task", "done": false }),
            json!({ "record": { "id": 11 }, "kind": "task", "done": false }),
        ],
        resolver,
    )
    .unwrap();
    let new = old
        .with_items(vec![
            json!({ "record": { "id": 11 }, "kind": "task", "done": false }),
            json!({ "record": { "id": 10 }, "kind": "task", "done": true }),
        ])
        .unwrap();

    let batch = reconcile(&old, &new, &DiffOptions::new());
    let changed: Vec<_> = batch
        .moved_items()
        .iter()
        .filter(|m| m.content_changed)
        .map(|m| m.identifier.clone())
        .collect();
    assert_eq!(changed, vec![Identifier::from(10)]);
    assert_replays(&old, &new, &batch);
}

#[test]
fn test_collapsing_a_tree_node() {
    let roots = vec![
        TreeItem::new("fruit", "Fruit".to_string()).with_children([
            TreeItem::new("apple", "Apple".to_string()),
            TreeItem::new("pear", "Pear".to_string()),
        ]),
        TreeItem::new("veg", "Vegetables".to_string())
            .with_children([TreeItem::new("kale", "Kale".to_string())]),
    ];
    let open = TreeDataModel::new(roots, []).unwrap();
    let closed = open.collapse(&"fruit".into()).unwrap();

    let options = DiffOptions::builder()
        .move_policy(MovePolicy::Minimal)
        .build()
        .unwrap();
    let batch = reconcile(open.model(), closed.model(), &options);

    let deleted: Vec<String> = batch
        .deleted_items()
        .iter()
        .map(|e| e.identifier.to_string())
        .collect();
    assert_eq!(deleted, vec!["apple", "pear"]);
    assert_eq!(batch.modified_items()[0].identifier, Identifier::from("fruit"));
    assert!(batch.moved_items().is_empty());
    assert_replays(open.model(), closed.model(), &batch);
}

#[test]
fn test_debug_output_of_reconciled_models() {
    let new = model(&[(2, "B", "two"), (3, "B", "three")]);
    let text = DataModelDebug::with_options(ModelFormatOptions {
        style: TreeStyle::Ascii,
        ..ModelFormatOptions::default()
    })
    .format(&new);
    assert!(text.starts_with("Data Model (1 sections, 2 items):"));
    assert!(text.contains("B"));
}
