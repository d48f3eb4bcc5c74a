//! Null writer - discards all rows
//!
//! Counts what it drops so the pipeline can be benchmarked without warehouse
//! I/O.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use spincycle_events::{Row, TableSchema};

use super::{WarehouseWriter, WriteError};

/// Writer that discards every batch
#[derive(Debug, Default)]
pub struct NullWriter {
    rows_discarded: AtomicU64,
}

impl NullWriter {
    /// Create a null writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows discarded so far
    pub fn rows_discarded(&self) -> u64 {
        self.rows_discarded.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl WarehouseWriter for NullWriter {
    async fn write_batch(&self, _schema: &TableSchema, rows: &[Row]) -> Result<(), WriteError> {
        self.rows_discarded
            .fetch_add(rows.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}
