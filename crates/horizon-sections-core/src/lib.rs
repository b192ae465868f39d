//! Core systems for Horizon Sections.
//!
//! This crate provides the foundational pieces shared by the sectioned data
//! model, the reconciliation engine and the update controller:
//!
//! - **Signal/Slot System**: Type-safe, instance-scoped change notification
//! - **Logging**: Tracing targets, span names and a timing guard
//! - **Thread Affinity**: Assertions for single-owning-thread objects
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_sections_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;
pub mod thread_check;

pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
