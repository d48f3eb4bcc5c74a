//! Warehouse writer backends
//!
//! A writer persists one batch of rows for one table. Writers are stateless
//! from the sink's perspective: they own their connection pool but expose
//! only [`WarehouseWriter::write_batch`], which either fully applies the
//! batch or fails. Atomicity holds per call, not across calls or tables.

mod memory;
mod null;
mod postgres;

use async_trait::async_trait;
use spincycle_events::{Row, TableSchema};
use thiserror::Error;

pub use memory::{BatchRecord, MemoryWriter};
pub use null::NullWriter;
pub use postgres::PostgresWriter;

/// Warehouse write failure, wrapping the underlying driver error
#[derive(Debug, Error)]
pub enum WriteError {
    /// Driver-level failure (connectivity, constraint, serialization)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Batch rejected by the backend (used by [`MemoryWriter`] failure
    /// injection)
    #[error("warehouse rejected batch: {0}")]
    Rejected(String),
}

/// Destination backend for batches of analytics rows
#[async_trait]
pub trait WarehouseWriter: Send + Sync {
    /// Persist `rows` into the table described by `schema`.
    ///
    /// Rows are positional cells aligned with `schema.columns()`, in the
    /// order they must be written. The call is all-or-nothing: on error the
    /// caller may re-send the same rows later, so writers with a natural key
    /// must tolerate duplicates.
    async fn write_batch(&self, schema: &TableSchema, rows: &[Row]) -> Result<(), WriteError>;
}
