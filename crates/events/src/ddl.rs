//! Warehouse DDL generation
//!
//! Emits `CREATE TABLE IF NOT EXISTS` statements from the same table schemas
//! the sink writes to, so provisioning and the runtime can never drift. Pure
//! string building; applying the DDL is the provisioning tool's job.

use crate::row::{ColumnType, TableSchema};

/// Target warehouse dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// PostgreSQL (the runtime writer's target)
    Postgres,
    /// Google BigQuery (provisioning only)
    BigQuery,
    /// Snowflake (provisioning only)
    Snowflake,
}

impl Dialect {
    /// Concrete SQL type for a logical column type
    pub fn column_type(self, ty: ColumnType) -> &'static str {
        match self {
            Self::Postgres => match ty {
                ColumnType::Text => "text",
                ColumnType::Double => "double precision",
                ColumnType::BigInt => "bigint",
                ColumnType::Bool => "boolean",
                ColumnType::Timestamp => "timestamptz",
                ColumnType::Json => "jsonb",
            },
            Self::BigQuery => match ty {
                ColumnType::Text => "STRING",
                ColumnType::Double => "FLOAT64",
                ColumnType::BigInt => "INT64",
                ColumnType::Bool => "BOOL",
                ColumnType::Timestamp => "TIMESTAMP",
                ColumnType::Json => "JSON",
            },
            Self::Snowflake => match ty {
                ColumnType::Text => "TEXT",
                ColumnType::Double => "DOUBLE",
                ColumnType::BigInt => "NUMBER",
                ColumnType::Bool => "BOOLEAN",
                ColumnType::Timestamp => "TIMESTAMP_TZ",
                ColumnType::Json => "VARIANT",
            },
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Postgres => "postgres",
            Self::BigQuery => "bigquery",
            Self::Snowflake => "snowflake",
        };
        f.write_str(name)
    }
}

/// Render the `CREATE TABLE IF NOT EXISTS` statement for one table.
///
/// Postgres declares the natural key as a primary key so the writer's
/// `ON CONFLICT` upsert has a unique index to target; BigQuery and Snowflake
/// do not enforce keys, so the clause is omitted there.
pub fn create_table_ddl(schema: &TableSchema, dialect: Dialect) -> String {
    let mut out = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name());

    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|col| format!("    {} {}", col.name(), dialect.column_type(col.ty())))
        .collect();
    out.push_str(&columns.join(",\n"));

    if dialect == Dialect::Postgres
        && let Some(key) = schema.natural_key()
    {
        out.push_str(&format!(",\n    PRIMARY KEY ({key})"));
    }

    out.push_str("\n);");
    out
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod ddl_test;
