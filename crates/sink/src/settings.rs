//! Sink configuration

use std::time::Duration;

/// Default batch size per table
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default flush interval
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// In-call retry policy for a failing write
///
/// Applies within one flush attempt, with capped exponential backoff between
/// attempts. Independent of buffer retention: when all attempts fail, the
/// batch stays buffered and is retried on the next size or timer trigger.
/// The default of zero attempts relies on buffer retention alone.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure (0 disables in-call retry)
    pub attempts: usize,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Upper bound for the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 0,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Configuration for one [`crate::EventSink`]
#[derive(Debug, Clone)]
pub struct SinkSettings {
    /// Rows per table before a size-triggered flush; 0 means "flush on every
    /// event" (immediate consistency, worst throughput)
    pub max_batch_size: usize,

    /// Periodic flush interval; `Duration::ZERO` disables the timer so only
    /// size triggers (and explicit `flush()` calls) flush
    pub flush_interval: Duration,

    /// In-call retry policy for failed writes
    pub retry: RetryPolicy,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

impl SinkSettings {
    /// Effective buffer length that triggers a flush
    pub(crate) fn flush_threshold(&self) -> usize {
        self.max_batch_size.max(1)
    }
}
