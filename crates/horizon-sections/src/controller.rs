//! The update controller.
//!
//! [`UpdateController`] owns the current [`DataModel`] of a view. Every time
//! the model is replaced, whether directly, from a new item collection, from
//! an external [`DataSource`], or because the in-memory filter or sort changed,
//! the controller reconciles the old and new models and tells its observer and
//! the [`ControllerSignals::model_updated`] signal about the result.
//!
//! # Notification order
//!
//! 1. [`ModelObserver::will_update`] may substitute the proposed model.
//! 2. The models are reconciled.
//! 3. If the batch has changes and notifications are not suppressed,
//!    [`ModelObserver::did_update`] runs, then `model_updated` is emitted.
//! 4. The new model becomes current.
//!
//! Observer and slots run synchronously on the calling thread with no
//! controller lock held, so they may query the controller.
//!
//! # Threading
//!
//! A controller belongs to the thread that created it. Replace its model only
//! from that thread, the same one that drives the rendering surface. Model
//! construction and reconciliation can be done elsewhere beforehand and handed
//! over with [`UpdateController::set_data_model`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, Weak};

use horizon_sections_core::logging::{span_names, targets};
use horizon_sections_core::{ConnectionId, PerfSpan, Signal, ThreadAffinity};
use parking_lot::Mutex;

use crate::diff::{DiffOptions, EditBatch, reconcile};
use crate::error::{Error, Result};
use crate::model::{DataModel, IdentityResolver, Item};
use crate::settings::Settings;

/// Predicate that keeps an item when it returns `true`.
pub type ItemFilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Ordering used to sort items before they are grouped.
pub type ItemSortFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A reconciled model transition.
pub struct ModelUpdate<T> {
    old_model: Arc<DataModel<T>>,
    updated_model: Arc<DataModel<T>>,
    batch: EditBatch,
    reload_modified: bool,
}

impl<T: Item> ModelUpdate<T> {
    /// Reconciles two models.
    pub fn new(
        old_model: Arc<DataModel<T>>,
        updated_model: Arc<DataModel<T>>,
        options: &DiffOptions<T>,
    ) -> Self {
        let batch = reconcile(&old_model, &updated_model, options);
        Self {
            old_model,
            updated_model,
            batch,
            reload_modified: true,
        }
    }
}

impl<T> ModelUpdate<T> {
    /// Sets whether changed rows are reloaded when applied to a surface.
    pub fn with_reload_modified(mut self, reload_modified: bool) -> Self {
        self.reload_modified = reload_modified;
        self
    }

    /// The model before the update.
    pub fn old_model(&self) -> &Arc<DataModel<T>> {
        &self.old_model
    }

    /// The model after the update.
    pub fn updated_model(&self) -> &Arc<DataModel<T>> {
        &self.updated_model
    }

    /// The edits between the two models.
    pub fn batch(&self) -> &EditBatch {
        &self.batch
    }

    /// Returns `true` if the batch has changes.
    pub fn has_changes(&self) -> bool {
        self.batch.has_changes()
    }

    /// Whether changed rows are reloaded when applied to a surface.
    pub fn reload_modified(&self) -> bool {
        self.reload_modified
    }
}

impl<T> fmt::Debug for ModelUpdate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelUpdate")
            .field("old_sections", &self.old_model.section_count())
            .field("updated_sections", &self.updated_model.section_count())
            .field("batch", &format_args!("{}", self.batch))
            .finish()
    }
}

/// Receives model transitions from an [`UpdateController`].
pub trait ModelObserver<T>: Send + Sync {
    /// Called before reconciliation. Return a model to use instead of
    /// `proposed`, e.g. a placeholder when `proposed` is empty.
    fn will_update(
        &self,
        _old: &Arc<DataModel<T>>,
        _proposed: &Arc<DataModel<T>>,
    ) -> Option<Arc<DataModel<T>>> {
        None
    }

    /// Called with every update that has changes, before it becomes current.
    fn did_update(&self, update: &ModelUpdate<T>);
}

/// An external provider of items, such as a query against a store.
pub trait DataSource<T>: Send + Sync {
    /// Runs the query and returns the items in order.
    fn fetch(&self) -> std::result::Result<Vec<Arc<T>>, Box<dyn std::error::Error + Send + Sync>>;

    /// A signal emitted when the underlying store changes, if the source has one.
    fn changed(&self) -> Option<&Signal<()>> {
        None
    }
}

/// Signals emitted by an [`UpdateController`].
pub struct ControllerSignals<T> {
    /// Emitted after the observer with every update that has changes.
    pub model_updated: Signal<Arc<ModelUpdate<T>>>,
}

impl<T: Item> ControllerSignals<T> {
    fn new() -> Self {
        Self {
            model_updated: Signal::new(),
        }
    }
}

struct AttachedSource<T> {
    source: Arc<dyn DataSource<T>>,
    connection: Option<ConnectionId>,
}

/// What a batch restores if its closure panics.
struct BatchStart<T> {
    model: Arc<DataModel<T>>,
    raw_items: Option<Vec<Arc<T>>>,
}

struct ControllerState<T> {
    model: Arc<DataModel<T>>,
    options: DiffOptions<T>,
    reload_modified: bool,
    raw_items: Option<Vec<Arc<T>>>,
    fetched: bool,
    filter: Option<ItemFilterFn<T>>,
    sort: Option<ItemSortFn<T>>,
    batch_depth: usize,
    batch_start: Option<BatchStart<T>>,
    updating: bool,
    queued: Option<Arc<DataModel<T>>>,
    ignore_data_model_changes: bool,
    ignore_source_changes: bool,
    source: Option<AttachedSource<T>>,
}

/// Tracks the current data model of a view and reports every change to it.
///
/// # Example
///
/// ```
/// use horizon_sections::controller::UpdateController;
/// use horizon_sections::diff::DiffOptions;
///
/// let controller = UpdateController::<String>::new(DiffOptions::new());
/// controller.signals().model_updated.connect(|update| {
///     println!("{}", update.batch());
/// });
///
/// controller.set_items(["a", "b"].map(String::from)).unwrap();
/// let update = controller.set_items(["b", "c"].map(String::from)).unwrap().unwrap();
/// assert_eq!(update.batch().deleted_items().len(), 1);
/// assert_eq!(controller.data_model().item_count(), 2);
/// ```
pub struct UpdateController<T> {
    state: Mutex<ControllerState<T>>,
    observer: Mutex<Option<Arc<dyn ModelObserver<T>>>>,
    signals: ControllerSignals<T>,
    affinity: ThreadAffinity,
}

static_assertions::assert_impl_all!(UpdateController<String>: Send, Sync);

impl<T: Item> UpdateController<T> {
    /// Creates a controller with an empty model and the default resolver.
    pub fn new(options: DiffOptions<T>) -> Self {
        Self::with_model(DataModel::empty(), options)
    }

    /// Creates a controller with an empty model that builds models with `resolver`.
    pub fn with_resolver(resolver: IdentityResolver<T>, options: DiffOptions<T>) -> Self {
        Self::with_model(DataModel::empty_with_resolver(resolver), options)
    }

    /// Creates a controller that starts from `model`.
    pub fn with_model(model: DataModel<T>, options: DiffOptions<T>) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                model: Arc::new(model),
                options,
                reload_modified: true,
                raw_items: None,
                fetched: false,
                filter: None,
                sort: None,
                batch_depth: 0,
                batch_start: None,
                updating: false,
                queued: None,
                ignore_data_model_changes: false,
                ignore_source_changes: false,
                source: None,
            }),
            observer: Mutex::new(None),
            signals: ControllerSignals::new(),
            affinity: ThreadAffinity::current(),
        }
    }

    /// Creates a controller configured from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let controller = Self::with_resolver(settings.resolver()?, settings.diff_options()?);
        controller.state.lock().reload_modified = settings.reload_modified_items;
        Ok(controller)
    }

    /// The controller's signals.
    pub fn signals(&self) -> &ControllerSignals<T> {
        &self.signals
    }

    /// Sets or clears the observer.
    pub fn set_observer(&self, observer: Option<Arc<dyn ModelObserver<T>>>) {
        *self.observer.lock() = observer;
    }

    /// The current model.
    pub fn data_model(&self) -> Arc<DataModel<T>> {
        Arc::clone(&self.state.lock().model)
    }

    /// The items of the current model in section-major order.
    pub fn items(&self) -> Vec<Arc<T>> {
        self.data_model().items().cloned().collect()
    }

    /// The raw items from the last fetch or [`set_items`](Self::set_items),
    /// before the in-memory filter and sort.
    pub fn fetched_items(&self) -> Option<Vec<Arc<T>>> {
        self.state.lock().raw_items.clone()
    }

    /// Returns `true` once a fetch from the data source has succeeded.
    pub fn is_fetched(&self) -> bool {
        self.state.lock().fetched
    }

    /// Replaces the diff options used for later updates.
    pub fn set_diff_options(&self, options: DiffOptions<T>) {
        self.state.lock().options = options;
    }

    /// Sets whether updates ask surfaces to reload changed rows.
    pub fn set_reload_modified_items(&self, reload: bool) {
        self.state.lock().reload_modified = reload;
    }

    /// While set, new models are adopted without notifying anyone.
    pub fn set_ignore_data_model_changes(&self, ignore: bool) {
        self.state.lock().ignore_data_model_changes = ignore;
    }

    /// Returns `true` while model changes are adopted silently.
    pub fn ignores_data_model_changes(&self) -> bool {
        self.state.lock().ignore_data_model_changes
    }

    /// While set, change notifications from the data source are dropped.
    pub fn set_ignore_source_changes(&self, ignore: bool) {
        self.state.lock().ignore_source_changes = ignore;
    }

    /// Returns `true` while data source changes are ignored.
    pub fn ignores_source_changes(&self) -> bool {
        self.state.lock().ignore_source_changes
    }

    /// Replaces the current model.
    ///
    /// The model is taken as is: it has no raw items for the in-memory filter
    /// and sort to re-apply to. Returns the update if observers were notified. Inside
    /// [`perform_batch_updates`](Self::perform_batch_updates) the model is
    /// only recorded and `None` is returned.
    pub fn set_data_model(&self, model: DataModel<T>) -> Option<Arc<ModelUpdate<T>>> {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        {
            let mut state = self.state.lock();
            state.raw_items = None;
        }
        self.update_model(Arc::new(model))
    }

    /// Replaces the tracked items, building a model with the current resolver.
    ///
    /// The in-memory filter and sort apply to these items.
    pub fn set_items(
        &self,
        items: impl IntoIterator<Item = T>,
    ) -> Result<Option<Arc<ModelUpdate<T>>>> {
        self.set_shared_items(items.into_iter().map(Arc::new).collect())
    }

    /// Like [`set_items`](Self::set_items), for shared items.
    pub fn set_shared_items(&self, items: Vec<Arc<T>>) -> Result<Option<Arc<ModelUpdate<T>>>> {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        let model = {
            let mut state = self.state.lock();
            let model = Self::build_model(&state, items.clone())?;
            state.raw_items = Some(items);
            model
        };
        Ok(self.update_model(Arc::new(model)))
    }

    /// Sets or clears the in-memory filter and re-applies it.
    pub fn set_filter<F>(&self, filter: Option<F>) -> Result<Option<Arc<ModelUpdate<T>>>>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        let filter = filter.map(|f| Arc::new(f) as ItemFilterFn<T>);
        self.state.lock().filter = filter;
        self.reapply()
    }

    /// Sets or clears the in-memory sort and re-applies it.
    ///
    /// Sorting happens before grouping, so it orders items within sections
    /// and sections by their first item.
    pub fn set_sort<F>(&self, sort: Option<F>) -> Result<Option<Arc<ModelUpdate<T>>>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        let sort = sort.map(|f| Arc::new(f) as ItemSortFn<T>);
        self.state.lock().sort = sort;
        self.reapply()
    }

    /// Groups several changes into one notification.
    ///
    /// Model replacements inside `f` are recorded without notifying. When the
    /// outermost call returns, the model from before the batch is reconciled
    /// against the final model and a single update is delivered. If `f`
    /// panics, the model and raw items from before the batch are restored.
    pub fn perform_batch_updates<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        {
            let mut state = self.state.lock();
            if state.batch_depth == 0 {
                state.batch_start = Some(BatchStart {
                    model: Arc::clone(&state.model),
                    raw_items: state.raw_items.clone(),
                });
            }
            state.batch_depth += 1;
        }

        let guard = BatchGuard { controller: self };
        let result = f(self);
        drop(guard);
        result
    }

    /// Attaches a data source, listening to its change signal.
    ///
    /// Replaces any previously attached source. Does not fetch; call
    /// [`perform_fetch`](Self::perform_fetch).
    pub fn attach_source(self: &Arc<Self>, source: Arc<dyn DataSource<T>>) {
        self.detach_source();
        let weak: Weak<Self> = Arc::downgrade(self);
        let connection = source.changed().map(|signal| {
            signal.connect(move |_| {
                if let Some(controller) = weak.upgrade() {
                    if let Err(err) = controller.handle_source_changed() {
                        tracing::warn!(
                            target: targets::CONTROLLER,
                            error = %err,
                            "refresh after data source change failed"
                        );
                    }
                }
            })
        });
        self.state.lock().source = Some(AttachedSource { source, connection });
    }

    /// Detaches the data source, if any.
    pub fn detach_source(&self) {
        let attached = self.state.lock().source.take();
        if let Some(AttachedSource {
            source,
            connection: Some(id),
        }) = attached
        {
            if let Some(signal) = source.changed() {
                signal.disconnect(id);
            }
        }
    }

    /// Fetches from the data source and replaces the model.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataSource`] without a source, [`Error::DataSource`] if the
    /// fetch fails, or a model construction error. The current model is kept
    /// on error.
    pub fn perform_fetch(&self) -> Result<Option<Arc<ModelUpdate<T>>>> {
        self.affinity
            .debug_assert_same_thread_with_msg("UpdateController used off its owning thread");
        let source = self
            .state
            .lock()
            .source
            .as_ref()
            .map(|attached| Arc::clone(&attached.source))
            .ok_or(Error::NoDataSource)?;

        let items = source.fetch().map_err(Error::DataSource)?;
        tracing::debug!(target: targets::CONTROLLER, items = items.len(), "fetched items");

        // Observers of the first fetched model already see `is_fetched()`.
        let was_fetched = std::mem::replace(&mut self.state.lock().fetched, true);
        let result = self.set_shared_items(items);
        if result.is_err() {
            self.state.lock().fetched = was_fetched;
        }
        result
    }

    /// Handles a change notification from the data source by refetching.
    pub fn handle_source_changed(&self) -> Result<Option<Arc<ModelUpdate<T>>>> {
        if self.ignores_source_changes() {
            tracing::trace!(target: targets::CONTROLLER, "ignoring data source change");
            return Ok(None);
        }
        self.perform_fetch()
    }

    fn reapply(&self) -> Result<Option<Arc<ModelUpdate<T>>>> {
        let model = {
            let state = self.state.lock();
            let Some(items) = state.raw_items.clone() else {
                return Ok(None);
            };
            Self::build_model(&state, items)?
        };
        Ok(self.update_model(Arc::new(model)))
    }

    fn build_model(state: &ControllerState<T>, mut items: Vec<Arc<T>>) -> Result<DataModel<T>> {
        if let Some(filter) = &state.filter {
            items.retain(|item| filter(item.as_ref()));
        }
        if let Some(sort) = &state.sort {
            items.sort_by(|a, b| sort(a.as_ref(), b.as_ref()));
        }
        state.model.with_shared_items(items)
    }

    fn update_model(&self, proposed: Arc<DataModel<T>>) -> Option<Arc<ModelUpdate<T>>> {
        let old = {
            let mut state = self.state.lock();
            if state.batch_depth > 0 {
                tracing::trace!(target: targets::CONTROLLER, "model recorded inside batch");
                state.model = proposed;
                return None;
            }
            if state.updating {
                tracing::trace!(target: targets::CONTROLLER, "model queued behind running update");
                state.queued = Some(proposed);
                return None;
            }
            state.updating = true;
            Arc::clone(&state.model)
        };
        self.commit_all(old, proposed)
    }

    /// Commits `proposed`, then every model queued by observers while it was
    /// being delivered, each against the model adopted before it.
    ///
    /// The caller has set `updating`.
    fn commit_all(
        &self,
        old: Arc<DataModel<T>>,
        proposed: Arc<DataModel<T>>,
    ) -> Option<Arc<ModelUpdate<T>>> {
        let _guard = UpdatingGuard { controller: self };
        let notified = self.commit(old, proposed);
        loop {
            let (old, queued) = {
                let mut state = self.state.lock();
                let Some(queued) = state.queued.take() else {
                    return notified;
                };
                (Arc::clone(&state.model), queued)
            };
            self.commit(old, queued);
        }
    }

    fn commit(
        &self,
        old: Arc<DataModel<T>>,
        proposed: Arc<DataModel<T>>,
    ) -> Option<Arc<ModelUpdate<T>>> {
        let _perf = PerfSpan::new(span_names::CONTROLLER_UPDATE);
        let observer = self.observer.lock().clone();

        let updated = observer
            .as_ref()
            .and_then(|o| o.will_update(&old, &proposed))
            .unwrap_or(proposed);

        let (options, reload_modified, ignore) = {
            let state = self.state.lock();
            (
                state.options.clone(),
                state.reload_modified,
                state.ignore_data_model_changes,
            )
        };
        let update = Arc::new(
            ModelUpdate::new(old, Arc::clone(&updated), &options)
                .with_reload_modified(reload_modified),
        );

        let notified = if !update.has_changes() {
            tracing::trace!(target: targets::CONTROLLER, "no changes, skipping notification");
            None
        } else if ignore {
            tracing::trace!(target: targets::CONTROLLER, "data model changes ignored");
            None
        } else {
            if let Some(observer) = &observer {
                observer.did_update(&update);
            }
            self.signals.model_updated.emit(Arc::clone(&update));
            Some(update)
        };

        self.state.lock().model = updated;
        notified
    }

    fn end_batch(&self) {
        let (start, current) = {
            let mut state = self.state.lock();
            state.batch_depth = state.batch_depth.saturating_sub(1);
            if state.batch_depth > 0 {
                return;
            }
            let Some(start) = state.batch_start.take() else {
                return;
            };
            if std::thread::panicking() {
                tracing::warn!(
                    target: targets::CONTROLLER,
                    "batch closure panicked, restoring the model from before the batch"
                );
                state.model = start.model;
                state.raw_items = start.raw_items;
                return;
            }
            let current = std::mem::replace(&mut state.model, start.model);
            if state.updating {
                tracing::trace!(
                    target: targets::CONTROLLER,
                    "batch result queued behind running update"
                );
                state.queued = Some(current);
                return;
            }
            state.updating = true;
            (Arc::clone(&state.model), current)
        };
        self.commit_all(start, current);
    }
}

impl<T> Drop for UpdateController<T> {
    fn drop(&mut self) {
        if let Some(AttachedSource {
            source,
            connection: Some(id),
        }) = self.state.get_mut().source.take()
        {
            if let Some(signal) = source.changed() {
                signal.disconnect(id);
            }
        }
    }
}

/// Clears the update-in-progress state, also when an observer panics.
struct UpdatingGuard<'a, T: Item> {
    controller: &'a UpdateController<T>,
}

impl<T: Item> Drop for UpdatingGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.controller.state.lock();
        state.updating = false;
        state.queued = None;
    }
}

/// Ends a batch when dropped, also when the batch closure panics.
struct BatchGuard<'a, T: Item> {
    controller: &'a UpdateController<T>,
}

impl<T: Item> Drop for BatchGuard<'_, T> {
    fn drop(&mut self) {
        self.controller.end_batch();
    }
}
