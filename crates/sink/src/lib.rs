//! Spincycle - Sink
//!
//! The batching sink between the event bus and the warehouse.
//!
//! # Architecture
//!
//! ```text
//! [producers] --publish--> [EventBus] --on_event--> [EventSink]
//!                                                       │ per-table buffers
//!                                                       │ size / interval flush
//!                                                       ▼
//!                                          [WarehouseWriter::write_batch]
//! ```
//!
//! The sink subscribes to a bus, projects each event into a flat row via the
//! schema registry, and buffers rows per destination table. A table is
//! flushed when its buffer reaches the configured batch size or when the
//! periodic timer fires. A failed write retains the batch, so delivery is
//! at-least-once: rows may be written twice after a retry, never silently
//! dropped.
//!
//! # Writers
//!
//! | Writer | Purpose |
//! |--------|---------|
//! | [`PostgresWriter`] | production warehouse (one transaction per batch) |
//! | [`MemoryWriter`] | tests and local development, with failure injection |
//! | [`NullWriter`] | benchmarking (discard and count) |

mod error;
mod metrics;
mod settings;
mod sink;
pub mod writer;

pub use error::SinkError;
pub use metrics::{SinkMetrics, SinkMetricsHandle, SinkMetricsSnapshot};
pub use settings::{
    DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL, RetryPolicy, SinkSettings,
};
pub use sink::EventSink;
pub use writer::{BatchRecord, MemoryWriter, NullWriter, PostgresWriter, WarehouseWriter, WriteError};
