//! Category registry: validation, table schemas, row projection
//!
//! The registry is the single source of truth for the category taxonomy.
//! Each entry pairs a category with its warehouse table schema, the payload
//! fields required at construction, and the pure projection from an event to
//! a flat row. Adding a category is a [`SchemaRegistry::register`] call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::categories;
use crate::error::EventError;
use crate::event::{AnalyticsEvent, EventDraft};
use crate::naming::table_name;
use crate::row::{Cell, ColumnSpec, ColumnType, Row, TableSchema};

/// Projection of category-specific payload fields into typed cells
///
/// Must return cells aligned with the descriptor's promoted column list.
pub type PromoteFn = Arc<dyn Fn(&AnalyticsEvent) -> Vec<Cell> + Send + Sync>;

/// Standard columns present on every analytics table, in order, ahead of the
/// category-promoted columns.
fn standard_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("event_id", ColumnType::Text),
        ColumnSpec::new("occurred_at", ColumnType::Timestamp),
        ColumnSpec::new("source", ColumnType::Text),
        ColumnSpec::new("event_name", ColumnType::Text),
        ColumnSpec::new("schema_version", ColumnType::BigInt),
        ColumnSpec::new("actor_id", ColumnType::Text),
        ColumnSpec::new("actor_type", ColumnType::Text),
        ColumnSpec::new("actor_name", ColumnType::Text),
        ColumnSpec::new("context", ColumnType::Json),
        ColumnSpec::new("payload", ColumnType::Json),
    ]
}

/// One registered category: validation rules, table schema, projection
pub struct CategoryDescriptor {
    category: String,
    schema_version: u32,
    required: Vec<&'static str>,
    table: Arc<TableSchema>,
    promote: PromoteFn,
}

impl CategoryDescriptor {
    /// Create a descriptor.
    ///
    /// The table schema is derived from [`table_name`] plus the standard
    /// columns followed by `promoted` columns; `promote` must produce cells
    /// matching `promoted` in order. `event_id` is the natural key.
    pub fn new(
        category: impl Into<String>,
        schema_version: u32,
        required: Vec<&'static str>,
        promoted: Vec<ColumnSpec>,
        promote: impl Fn(&AnalyticsEvent) -> Vec<Cell> + Send + Sync + 'static,
    ) -> Self {
        let category = category.into();
        let mut columns = standard_columns();
        columns.extend(promoted);
        let table = TableSchema::new(table_name(&category), columns).with_natural_key("event_id");

        Self {
            category,
            schema_version,
            required,
            table: Arc::new(table),
            promote: Arc::new(promote),
        }
    }

    /// Category string
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Current payload schema version for the category
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Warehouse table schema for the category
    pub fn table(&self) -> &Arc<TableSchema> {
        &self.table
    }

    /// Project an event into a flat row matching the table's column list.
    ///
    /// Pure: the event is only read, never mutated.
    pub fn project(&self, event: &AnalyticsEvent) -> Row {
        let mut cells = vec![
            Cell::Text(Some(event.event_id().to_string())),
            Cell::Timestamp(event.occurred_at()),
            Cell::Text(Some(event.source().to_owned())),
            Cell::Text(Some(event.name().to_owned())),
            Cell::BigInt(Some(i64::from(event.schema_version()))),
            Cell::Text(event.actor().map(|a| a.actor_id.clone())),
            Cell::Text(event.actor().map(|a| a.actor_type.clone())),
            Cell::Text(event.actor().and_then(|a| a.actor_name.clone())),
            Cell::Json(event.context().cloned().map(Value::Object)),
            Cell::Json(Some(Value::Object(event.payload().clone()))),
        ];
        cells.extend((self.promote)(event));
        Row::new(cells)
    }
}

impl std::fmt::Debug for CategoryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryDescriptor")
            .field("category", &self.category)
            .field("schema_version", &self.schema_version)
            .field("table", &self.table.name())
            .finish_non_exhaustive()
    }
}

/// The closed category taxonomy
///
/// Owned by one process and shared (via `Arc`) between the event factory,
/// the sink, and the provisioning tool.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    categories: HashMap<String, Arc<CategoryDescriptor>>,
}

impl SchemaRegistry {
    /// Empty registry; callers register their own categories
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the platform's built-in categories
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in categories::builtin() {
            // Built-in categories are distinct, so registration cannot fail.
            let registered = registry.register(descriptor);
            debug_assert!(registered.is_ok(), "duplicate built-in category");
        }
        registry
    }

    /// Register a category descriptor
    pub fn register(&mut self, descriptor: CategoryDescriptor) -> Result<(), EventError> {
        let category = descriptor.category().to_owned();
        if self.categories.contains_key(&category) {
            return Err(EventError::DuplicateCategory(category));
        }
        self.categories.insert(category, Arc::new(descriptor));
        Ok(())
    }

    /// Look up a category descriptor
    pub fn descriptor(&self, category: &str) -> Option<&Arc<CategoryDescriptor>> {
        self.categories.get(category)
    }

    /// All descriptors, sorted by category for deterministic iteration
    pub fn descriptors(&self) -> Vec<&Arc<CategoryDescriptor>> {
        let mut all: Vec<_> = self.categories.values().collect();
        all.sort_by_key(|d| d.category().to_owned());
        all
    }

    /// Validate a draft and construct an immutable event.
    ///
    /// Fails with [`EventError::UnknownCategory`] if the category is not
    /// registered, or [`EventError::MissingField`] if a required payload
    /// field is absent or null. No side effects beyond allocation.
    pub fn create_event(&self, draft: EventDraft) -> Result<AnalyticsEvent, EventError> {
        let descriptor = self
            .categories
            .get(&draft.category)
            .ok_or_else(|| EventError::UnknownCategory(draft.category.clone()))?;

        for &field in &descriptor.required {
            let present = draft.payload.get(field).is_some_and(|v| !v.is_null());
            if !present {
                return Err(EventError::MissingField {
                    category: draft.category,
                    field,
                });
            }
        }

        Ok(AnalyticsEvent::assemble(draft, descriptor.schema_version))
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
