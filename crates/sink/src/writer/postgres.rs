//! Postgres warehouse writer
//!
//! One transaction per `write_batch` call; rows go in as multi-row `INSERT`
//! statements, chunked so no statement exceeds the Postgres bind-parameter
//! limit. Tables with a natural key get `ON CONFLICT ... DO NOTHING`, which
//! makes re-sent batches (at-least-once retries) idempotent on Postgres.

use async_trait::async_trait;
use spincycle_events::{Cell, Row, TableSchema};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{WarehouseWriter, WriteError};

/// Postgres limits a statement to `u16::MAX` bind parameters.
const MAX_BIND_PARAMS: usize = u16::MAX as usize;

/// Warehouse writer backed by a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PostgresWriter {
    pool: PgPool,
}

impl PostgresWriter {
    /// Connect to the warehouse with default pool options
    pub async fn connect(url: &str) -> Result<Self, WriteError> {
        let pool = PgPoolOptions::new().connect(url).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows that fit in one statement for the given column count
    fn rows_per_statement(schema: &TableSchema) -> usize {
        (MAX_BIND_PARAMS / schema.columns().len().max(1)).max(1)
    }
}

/// Build one multi-row insert statement for a chunk of rows
fn build_insert<'args>(schema: &TableSchema, rows: &[Row]) -> QueryBuilder<'args, Postgres> {
    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", schema.name()));

    let mut first = true;
    for column in schema.columns() {
        if !first {
            builder.push(", ");
        }
        builder.push(column.name());
        first = false;
    }
    builder.push(") ");

    builder.push_values(rows, |mut binds, row| {
        for cell in row.cells() {
            match cell {
                Cell::Text(value) => binds.push_bind(value.clone()),
                Cell::Double(value) => binds.push_bind(*value),
                Cell::BigInt(value) => binds.push_bind(*value),
                Cell::Bool(value) => binds.push_bind(*value),
                Cell::Timestamp(value) => binds.push_bind(*value),
                Cell::Json(value) => binds.push_bind(value.clone()),
            };
        }
    });

    if let Some(key) = schema.natural_key() {
        builder.push(format!(" ON CONFLICT ({key}) DO NOTHING"));
    }

    builder
}

#[async_trait]
impl WarehouseWriter for PostgresWriter {
    async fn write_batch(&self, schema: &TableSchema, rows: &[Row]) -> Result<(), WriteError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for chunk in rows.chunks(Self::rows_per_statement(schema)) {
            build_insert(schema, chunk)
                .build()
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(table = schema.name(), rows = rows.len(), "batch committed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod postgres_test;
