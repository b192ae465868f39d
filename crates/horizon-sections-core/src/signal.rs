//! Instance-scoped change notification.
//!
//! A [`Signal`] belongs to one object, such as a controller or a data source,
//! so connecting to it registers interest in that object only. There is no
//! process-wide notification registry.
//!
//! Slots run synchronously on the emitting thread, in connection order. The
//! connection table is snapshotted before the slots run, so a slot may connect
//! or disconnect (itself included) without deadlocking. Changes take effect on
//! the next emission.
//!
//! ```
//! use horizon_sections_core::Signal;
//!
//! let store_changed = Signal::<usize>::new();
//! let id = store_changed.connect(|rows| println!("store now has {rows} rows"));
//!
//! assert_eq!(store_changed.emit(3), 1);
//! store_changed.disconnect(id);
//! assert_eq!(store_changed.emit(4), 0);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one connection to a [`Signal`], for [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots invoked with a reference to each emitted value.
///
/// Use `()` as `Args` for signals that carry no payload.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Creates a signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connects `slot`, returning the id that disconnects it.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Removes a connection. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// The number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Invokes every connected slot with `args` and returns how many ran.
    #[tracing::instrument(skip_all, target = "horizon_sections_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        // Release the lock before running slots so they may touch this signal.
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in &slots {
            slot(&args);
        }
        slots.len()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
