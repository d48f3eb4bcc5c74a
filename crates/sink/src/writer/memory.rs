//! In-memory recording writer
//!
//! Records every `write_batch` call for inspection and supports per-table
//! failure injection. Used by the sink tests and handy for local development
//! without a warehouse.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use spincycle_events::{Row, TableSchema};

use super::{WarehouseWriter, WriteError};

/// One recorded `write_batch` call
#[derive(Debug, Clone)]
pub struct BatchRecord {
    /// Destination table name
    pub table: String,
    /// Rows exactly as received, in order
    pub rows: Vec<Row>,
}

/// Writer that records batches in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    calls: Mutex<Vec<BatchRecord>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `table` fail until [`MemoryWriter::heal_table`]
    pub fn fail_table(&self, table: impl Into<String>) {
        self.lock(&self.failing).insert(table.into());
    }

    /// Stop failing writes to `table`
    pub fn heal_table(&self, table: &str) {
        self.lock(&self.failing).remove(table);
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<BatchRecord> {
        self.lock(&self.calls).clone()
    }

    /// Recorded calls for one table, in order
    pub fn calls_for(&self, table: &str) -> Vec<BatchRecord> {
        self.calls()
            .into_iter()
            .filter(|c| c.table == table)
            .collect()
    }

    /// Total recorded calls
    pub fn call_count(&self) -> usize {
        self.lock(&self.calls).len()
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WarehouseWriter for MemoryWriter {
    async fn write_batch(&self, schema: &TableSchema, rows: &[Row]) -> Result<(), WriteError> {
        if self.lock(&self.failing).contains(schema.name()) {
            return Err(WriteError::Rejected(format!(
                "injected failure for table {}",
                schema.name()
            )));
        }
        self.lock(&self.calls).push(BatchRecord {
            table: schema.name().to_owned(),
            rows: rows.to_vec(),
        });
        Ok(())
    }
}
