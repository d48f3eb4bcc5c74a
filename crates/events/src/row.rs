//! Warehouse table schemas and flat row values
//!
//! A [`TableSchema`] is the ordered column list for one physical warehouse
//! table; a [`Row`] is one event projected into typed cells aligned with that
//! column list. Rows are what the sink buffers and what writers persist.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Logical column type, mapped to a concrete type per warehouse dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free text / identifiers
    Text,
    /// Floating-point numbers (money totals, coordinates)
    Double,
    /// 64-bit integers (counters, versions)
    BigInt,
    /// Booleans
    Bool,
    /// Timezone-aware timestamps
    Timestamp,
    /// JSON documents (payload, context)
    Json,
}

/// One column in a table schema
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    name: String,
    ty: ColumnType,
}

impl ColumnSpec {
    /// Create a column spec
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Column name (snake_case)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical column type
    pub fn ty(&self) -> ColumnType {
        self.ty
    }
}

/// Schema of one physical warehouse table
#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSpec>,
    natural_key: Option<String>,
}

impl TableSchema {
    /// Create a schema with no natural key
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
            natural_key: None,
        }
    }

    /// Declare a natural key column; writers that support it use the key for
    /// idempotent upserts (`ON CONFLICT DO NOTHING`)
    #[must_use]
    pub fn with_natural_key(mut self, column: impl Into<String>) -> Self {
        self.natural_key = Some(column.into());
        self
    }

    /// Physical table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered column list
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Natural key column, when declared
    pub fn natural_key(&self) -> Option<&str> {
        self.natural_key.as_deref()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }
}

/// One typed cell of a row
///
/// `None` inside a variant means SQL NULL of that column's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text value
    Text(Option<String>),
    /// Floating-point value
    Double(Option<f64>),
    /// Integer value
    BigInt(Option<i64>),
    /// Boolean value
    Bool(Option<bool>),
    /// Timestamp value
    Timestamp(DateTime<Utc>),
    /// JSON value
    Json(Option<Value>),
}

/// One event projected into a table's column list
///
/// Cells are positional and aligned with [`TableSchema::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// Create a row from positional cells
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Positional cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up a cell by column name via the table schema
    pub fn get<'a>(&'a self, schema: &TableSchema, column: &str) -> Option<&'a Cell> {
        schema
            .column_index(column)
            .and_then(|idx| self.cells.get(idx))
    }
}
