//! Bus metrics
//!
//! Lock-free counters updated on the publish path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one bus instance
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Events accepted by publish
    events_published: AtomicU64,

    /// Successful subscriber deliveries (one per subscriber per event)
    events_delivered: AtomicU64,

    /// Subscriber handlers that returned an error
    subscriber_errors: AtomicU64,

    /// Publish calls after shutdown (no-ops)
    published_after_shutdown: AtomicU64,
}

impl BusMetrics {
    pub(crate) fn record_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_subscriber_error(&self) {
        self.subscriber_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published_after_shutdown(&self) {
        self.published_after_shutdown.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters
    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            subscriber_errors: self.subscriber_errors.load(Ordering::Relaxed),
            published_after_shutdown: self.published_after_shutdown.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of bus metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusMetricsSnapshot {
    pub events_published: u64,
    pub events_delivered: u64,
    pub subscriber_errors: u64,
    pub published_after_shutdown: u64,
}
