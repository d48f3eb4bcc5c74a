//! Sink metrics
//!
//! Lock-free counters shared between the sink and a detachable handle that
//! stays valid after `stop()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one sink instance
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Events received from the bus
    events_received: AtomicU64,

    /// Events dropped because no table mapping exists for their category
    events_unroutable: AtomicU64,

    /// Batches successfully written
    batches_written: AtomicU64,

    /// Rows successfully written (sum of batch sizes)
    rows_written: AtomicU64,

    /// Failed write attempts that exhausted in-call retries
    write_errors: AtomicU64,

    /// In-call retry attempts
    retries: AtomicU64,

    /// Per-table flush operations started
    flushes: AtomicU64,
}

impl SinkMetrics {
    pub(crate) fn record_event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unroutable(&self) {
        self.events_unroutable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_written(&self, rows: u64) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
    }

    pub(crate) fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        SinkMetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_unroutable: self.events_unroutable.load(Ordering::Relaxed),
            batches_written: self.batches_written.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkMetricsSnapshot {
    pub events_received: u64,
    pub events_unroutable: u64,
    pub batches_written: u64,
    pub rows_written: u64,
    pub write_errors: u64,
    pub retries: u64,
    pub flushes: u64,
}

/// Lightweight handle for reading sink metrics
///
/// Clones the shared counters, so it remains valid after the sink stops.
#[derive(Debug, Clone)]
pub struct SinkMetricsHandle {
    metrics: Arc<SinkMetrics>,
}

impl SinkMetricsHandle {
    pub(crate) fn new(metrics: Arc<SinkMetrics>) -> Self {
        Self { metrics }
    }

    /// Point-in-time snapshot of all counters
    pub fn snapshot(&self) -> SinkMetricsSnapshot {
        self.metrics.snapshot()
    }
}
