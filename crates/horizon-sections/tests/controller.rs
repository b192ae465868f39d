//! Tests for the update controller driving observers, data sources and surfaces.

mod common;

use std::error::Error as StdError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use common::{Row, assert_replays, init_tracing};
use horizon_sections::controller::{DataSource, ModelObserver, ModelUpdate, UpdateController};
use horizon_sections::diff::{DiffOptions, MovePolicy};
use horizon_sections::model::{DataModel, IndexPath};
use horizon_sections::settings::Settings;
use horizon_sections::surface::{BatchUpdate, SurfaceAction, UpdateSurface};
use horizon_sections::{Error, Signal};
use parking_lot::Mutex;

/// An in-memory store that announces every change.
struct Store {
    rows: Mutex<Vec<Row>>,
    failing: AtomicBool,
    changed: Signal<()>,
}

impl Store {
    fn new(rows: Vec<Row>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            failing: AtomicBool::new(false),
            changed: Signal::new(),
        })
    }

    fn replace(&self, rows: Vec<Row>) {
        *self.rows.lock() = rows;
        self.changed.emit(());
    }
}

impl DataSource<Row> for Store {
    fn fetch(&self) -> Result<Vec<Arc<Row>>, Box<dyn StdError + Send + Sync>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("store offline".into());
        }
        Ok(self.rows.lock().iter().cloned().map(Arc::new).collect())
    }

    fn changed(&self) -> Option<&Signal<()>> {
        Some(&self.changed)
    }
}

#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<Arc<DataModel<Row>>>>,
}

impl ModelObserver<Row> for Recorder {
    fn did_update(&self, update: &ModelUpdate<Row>) {
        assert_replays(update.old_model(), update.updated_model(), update.batch());
        self.updates.lock().push(Arc::clone(update.updated_model()));
    }
}

type Hook = Box<dyn Fn(&UpdateController<Row>, usize) + Send + Sync>;

/// Runs `hook` on the controller from every `did_update`, and records the
/// model transitions it was shown.
struct Reentrant {
    controller: Mutex<Weak<UpdateController<Row>>>,
    hook: Hook,
    shown: Mutex<Vec<(Arc<DataModel<Row>>, Arc<DataModel<Row>>)>>,
}

impl Reentrant {
    fn attach(controller: &Arc<UpdateController<Row>>, hook: Hook) -> Arc<Self> {
        let observer = Arc::new(Self {
            controller: Mutex::new(Arc::downgrade(controller)),
            hook,
            shown: Mutex::new(Vec::new()),
        });
        controller.set_observer(Some(observer.clone()));
        observer
    }
}

impl ModelObserver<Row> for Reentrant {
    fn did_update(&self, update: &ModelUpdate<Row>) {
        assert_replays(update.old_model(), update.updated_model(), update.batch());
        let count = {
            let mut shown = self.shown.lock();
            shown.push((Arc::clone(update.old_model()), Arc::clone(update.updated_model())));
            shown.len()
        };
        let controller = self.controller.lock().upgrade();
        if let Some(controller) = controller {
            (self.hook)(&controller, count);
        }
    }
}

#[derive(Default)]
struct TableSurface {
    reloads: usize,
    batches: Vec<BatchUpdate>,
}

impl UpdateSurface for TableSurface {
    fn perform_batch_updates(&mut self, update: &BatchUpdate) {
        self.batches.push(update.clone());
    }

    fn reload_data(&mut self) {
        self.reloads += 1;
    }
}

fn rows(ids: &[u32]) -> Vec<Row> {
    ids.iter().map(|&id| Row::new(id, "Inbox", "message")).collect()
}

fn ids(controller: &UpdateController<Row>) -> Vec<u32> {
    controller.items().iter().map(|row| row.id).collect()
}

#[test]
fn test_fetch_and_refresh_on_source_change() {
    init_tracing();
    let store = Store::new(rows(&[1, 2]));
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    let recorder = Arc::new(Recorder::default());
    controller.set_observer(Some(recorder.clone()));
    controller.attach_source(store.clone());
    assert_eq!(store.changed.connection_count(), 1);

    assert!(!controller.is_fetched());
    controller.perform_fetch().unwrap();
    assert!(controller.is_fetched());
    assert_eq!(ids(&controller), vec![1, 2]);

    store.replace(rows(&[2, 3]));
    assert_eq!(ids(&controller), vec![2, 3]);
    assert_eq!(recorder.updates.lock().len(), 2);

    controller.set_ignore_source_changes(true);
    store.replace(rows(&[4]));
    assert_eq!(ids(&controller), vec![2, 3]);
    controller.set_ignore_source_changes(false);

    controller.detach_source();
    assert_eq!(store.changed.connection_count(), 0);
    assert!(matches!(controller.perform_fetch(), Err(Error::NoDataSource)));
}

#[test]
fn test_failed_fetch_keeps_model() {
    let store = Store::new(rows(&[1]));
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    controller.attach_source(store.clone());
    controller.perform_fetch().unwrap();

    store.failing.store(true, Ordering::SeqCst);
    let err = controller.perform_fetch().unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));
    assert_eq!(err.to_string(), "Data source fetch failed: store offline");
    assert_eq!(ids(&controller), vec![1]);
}

#[test]
fn test_dropping_controller_disconnects_source() {
    let store = Store::new(rows(&[1]));
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    controller.attach_source(store.clone());
    assert_eq!(store.changed.connection_count(), 1);

    drop(controller);
    assert_eq!(store.changed.connection_count(), 0);
    store.replace(rows(&[2]));
}

#[test]
fn test_signal_drives_surface() {
    let controller = UpdateController::<Row>::new(DiffOptions::new());
    let surface = Arc::new(Mutex::new(TableSurface::default()));
    let actions = Arc::new(Mutex::new(Vec::new()));

    let (s, a) = (surface.clone(), actions.clone());
    controller.signals().model_updated.connect(move |update| {
        let action = update.perform_batch_updates(&mut *s.lock());
        a.lock().push(action);
    });

    controller.set_items(rows(&[1, 2, 3])).unwrap();
    controller.set_items(rows(&[3, 1])).unwrap();
    controller.set_items(rows(&[3, 1])).unwrap();

    assert_eq!(*actions.lock(), vec![SurfaceAction::Reloaded, SurfaceAction::Batched]);
    let surface = surface.lock();
    assert_eq!(surface.reloads, 1);
    assert_eq!(surface.batches[0].deleted_rows, vec![IndexPath::new(0, 1)]);
    assert_eq!(
        surface.batches[0].moved_rows,
        vec![
            (IndexPath::new(0, 2), IndexPath::new(0, 0)),
            (IndexPath::new(0, 0), IndexPath::new(0, 1)),
        ]
    );
}

#[test]
fn test_batch_collapses_intermediate_states() {
    let controller = UpdateController::<Row>::new(DiffOptions::new());
    let recorder = Arc::new(Recorder::default());
    controller.set_observer(Some(recorder.clone()));
    controller.set_items(rows(&[1, 2])).unwrap();

    let returned = controller.perform_batch_updates(|c| {
        c.set_items(rows(&[9])).unwrap();
        c.set_items(rows(&[2, 1])).unwrap();
        c.set_sort(Some(|a: &Row, b: &Row| a.id.cmp(&b.id))).unwrap();
        "done"
    });
    assert_eq!(returned, "done");

    // The batch ended where it started, so nobody hears about it.
    assert_eq!(recorder.updates.lock().len(), 1);
    assert_eq!(ids(&controller), vec![1, 2]);
}

#[test]
fn test_silenced_changes_become_baseline() {
    let controller = UpdateController::<Row>::new(DiffOptions::new());
    let recorder = Arc::new(Recorder::default());
    controller.set_observer(Some(recorder.clone()));

    controller.set_ignore_data_model_changes(true);
    controller.set_items(rows(&[1, 2])).unwrap();
    controller.set_ignore_data_model_changes(false);
    assert!(recorder.updates.lock().is_empty());

    let update = controller.set_items(rows(&[1, 2, 3])).unwrap().unwrap();
    assert_eq!(update.batch().inserted_items().len(), 1);
    assert!(update.batch().inserted_sections().is_empty());
}

#[test]
fn test_controller_from_settings() {
    let settings = Settings::from_toml_str(
        r#"
        move_policy = "minimal"
        reload_modified_items = false
        "#,
    )
    .unwrap();
    assert_eq!(settings.move_policy, MovePolicy::Minimal);

    let controller = UpdateController::<Row>::from_settings(&settings).unwrap();
    controller.set_items(rows(&[1, 2, 3])).unwrap();
    let mut moved = rows(&[2, 3, 1]);
    moved[0].title = "edited".into();
    let update = controller.set_items(moved).unwrap().unwrap();

    assert_eq!(update.batch().moved_items().len(), 1);
    assert_eq!(update.batch().modified_items()[0].index_path, IndexPath::new(0, 0));
    assert!(!update.reload_modified());
    assert!(update.batch().batch_update(update.reload_modified()).reloaded_rows.is_empty());
}

#[test]
fn test_items_replaced_from_observer_apply_after_current_update() {
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    let observer = Reentrant::attach(
        &controller,
        Box::new(|controller: &UpdateController<Row>, count: usize| {
            if count == 1 {
                assert!(controller.set_items(rows(&[1, 2, 3])).unwrap().is_none());
            }
        }),
    );

    controller.set_items(rows(&[1])).unwrap();

    let shown = observer.shown.lock();
    assert_eq!(shown.len(), 2);
    assert!(Arc::ptr_eq(&shown[1].0, &shown[0].1));
    assert!(Arc::ptr_eq(&shown[1].1, &controller.data_model()));
    drop(shown);
    assert_eq!(ids(&controller), vec![1, 2, 3]);
}

#[test]
fn test_batch_ended_from_observer_applies_after_current_update() {
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    let observer = Reentrant::attach(
        &controller,
        Box::new(|controller: &UpdateController<Row>, count: usize| {
            if count == 1 {
                controller.perform_batch_updates(|c| {
                    c.set_items(rows(&[4])).unwrap();
                    c.set_items(rows(&[2, 1])).unwrap();
                });
            }
        }),
    );

    controller.set_items(rows(&[1, 2])).unwrap();

    let shown = observer.shown.lock();
    assert_eq!(shown.len(), 2);
    assert!(Arc::ptr_eq(&shown[1].0, &shown[0].1));
    drop(shown);
    assert_eq!(ids(&controller), vec![2, 1]);
}

#[test]
fn test_panicking_batch_restores_previous_model() {
    let controller = UpdateController::<Row>::new(DiffOptions::new());
    let recorder = Arc::new(Recorder::default());
    controller.set_observer(Some(recorder.clone()));
    controller.set_items(rows(&[1, 2])).unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        controller.perform_batch_updates(|c| {
            c.set_items(rows(&[9])).unwrap();
            panic!("edit gesture aborted");
        })
    }));
    assert!(outcome.is_err());

    assert_eq!(recorder.updates.lock().len(), 1);
    assert_eq!(ids(&controller), vec![1, 2]);
    let fetched: Vec<u32> = controller.fetched_items().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(fetched, vec![1, 2]);

    let update = controller.set_items(rows(&[1, 2, 3])).unwrap().unwrap();
    assert_eq!(update.batch().inserted_items().len(), 1);
    assert!(update.batch().deleted_items().is_empty());
    assert_eq!(recorder.updates.lock().len(), 2);
}

#[test]
fn test_first_fetch_is_visible_to_observers() {
    let store = Store::new(rows(&[1]));
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    Reentrant::attach(
        &controller,
        Box::new(move |controller: &UpdateController<Row>, _: usize| {
            seen_clone.lock().push(controller.is_fetched());
        }),
    );
    controller.attach_source(store.clone());

    controller.perform_fetch().unwrap();
    assert_eq!(*seen.lock(), vec![true]);

    store.failing.store(true, Ordering::SeqCst);
    assert!(controller.perform_fetch().is_err());
    assert!(controller.is_fetched());
}

#[test]
#[cfg(debug_assertions)]
fn test_mutators_check_owning_thread() {
    let store = Store::new(rows(&[7]));
    let controller = Arc::new(UpdateController::<Row>::new(DiffOptions::new()));
    controller.attach_source(store);
    controller.set_items(rows(&[1, 2])).unwrap();

    let off_thread = |call: fn(&UpdateController<Row>)| {
        let controller = controller.clone();
        std::thread::spawn(move || call(&controller)).join()
    };
    assert!(off_thread(|c| {
        let _ = c.set_filter(Some(|row: &Row| row.id > 1));
    })
    .is_err());
    assert!(off_thread(|c| {
        let _ = c.set_sort(Some(|a: &Row, b: &Row| b.id.cmp(&a.id)));
    })
    .is_err());
    assert!(off_thread(|c| {
        let _ = c.perform_fetch();
    })
    .is_err());

    assert_eq!(ids(&controller), vec![1, 2]);
}
