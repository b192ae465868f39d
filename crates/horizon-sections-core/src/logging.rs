//! Logging and tracing facilities for Horizon Sections.
//!
//! This module provides:
//! - Target and span names used by every subsystem, for log filtering
//! - [`PerfSpan`], a guard that times an operation inside a tracing span
//! - `sections_warn!`, which logs under the core target
//!
//! # Tracing Integration
//!
//! Horizon Sections uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_sections::diff=debug")
//!         .init();
//! }
//! ```

use std::time::Instant;

/// Span names used throughout Horizon Sections for tracing.
pub mod span_names {
    /// Data model construction span.
    pub const MODEL_BUILD: &str = "horizon_sections::model_build";
    /// Reconciliation span.
    pub const RECONCILE: &str = "horizon_sections::reconcile";
    /// Controller update span.
    pub const CONTROLLER_UPDATE: &str = "horizon_sections::controller_update";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "horizon_sections_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_sections_core::signal";
    /// Sectioned data model target.
    pub const MODEL: &str = "horizon_sections::model";
    /// Reconciliation engine target.
    pub const DIFF: &str = "horizon_sections::diff";
    /// Update controller target.
    pub const CONTROLLER: &str = "horizon_sections::controller";
    /// Performance spans target.
    pub const PERF: &str = "horizon_sections::perf";
}

/// A guard that keeps a tracing span entered and logs the elapsed time when
/// dropped.
///
/// # Example
///
/// ```
/// use horizon_sections_core::PerfSpan;
///
/// let _span = PerfSpan::new("reconcile");
/// // ... work measured until `_span` goes out of scope ...
/// ```
#[derive(Debug)]
pub struct PerfSpan {
    operation: &'static str,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_sections::perf", "perf", operation);
        Self {
            operation,
            started: Instant::now(),
            _span: span.entered(),
        }
    }

    /// Time elapsed since the span was opened.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::trace!(
            target: "horizon_sections::perf",
            operation = self.operation,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "operation finished"
        );
    }
}

/// Logs a warning under the core target.
#[macro_export]
macro_rules! sections_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_sections_core", $($arg)*)
    };
}
