//! Sink lifecycle errors

use thiserror::Error;

/// Errors from sink lifecycle operations
///
/// Write failures are not here: they are recovered locally (buffer retained,
/// retried on the next trigger) and surface only through logs and metrics.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Lifecycle operation in the wrong state, e.g. `start()` twice or
    /// `stop()` before `start()`
    #[error("cannot {operation}: sink is {state}")]
    IllegalState {
        /// Attempted operation
        operation: &'static str,
        /// Current lifecycle state
        state: &'static str,
    },
}
