//! Tests for Postgres insert statement building
//!
//! Statement construction is pure, so it is tested without a database;
//! executing against a live warehouse is covered by ops smoke checks.

use serde_json::json;
use spincycle_events::{EventDraft, SchemaRegistry};

use super::{PostgresWriter, build_insert};

fn order_rows(count: usize) -> (SchemaRegistry, Vec<spincycle_events::Row>) {
    let registry = SchemaRegistry::builtin();
    let descriptor = registry.descriptor("order.lifecycle").unwrap().clone();
    let rows = (0..count)
        .map(|i| {
            let event = registry
                .create_event(EventDraft {
                    source: "order-service".into(),
                    category: "order.lifecycle".into(),
                    name: "created".into(),
                    payload: json!({
                        "order_id": format!("order-{i}"),
                        "status": "received",
                        "total": 10.0,
                    })
                    .as_object()
                    .cloned()
                    .unwrap(),
                    ..EventDraft::default()
                })
                .unwrap();
            descriptor.project(&event)
        })
        .collect();
    (registry, rows)
}

#[test]
fn insert_targets_the_category_table_with_all_columns() {
    let (registry, rows) = order_rows(1);
    let schema = registry.descriptor("order.lifecycle").unwrap().table();

    let sql = build_insert(schema, &rows).into_sql();

    assert!(sql.starts_with("INSERT INTO analytics_order_lifecycle_events (event_id, occurred_at, source, event_name, schema_version,"));
    assert!(sql.contains("order_id, branch_id, customer_id, status,"));
}

#[test]
fn one_bind_parameter_per_cell() {
    let (registry, rows) = order_rows(3);
    let schema = registry.descriptor("order.lifecycle").unwrap().table();

    let sql = build_insert(schema, &rows).into_sql();

    let placeholders = sql.matches('$').count();
    assert_eq!(placeholders, 3 * schema.columns().len());
}

#[test]
fn natural_key_adds_conflict_clause() {
    let (registry, rows) = order_rows(1);
    let schema = registry.descriptor("order.lifecycle").unwrap().table();

    let sql = build_insert(schema, &rows).into_sql();
    assert!(sql.ends_with("ON CONFLICT (event_id) DO NOTHING"));
}

#[test]
fn chunking_respects_the_bind_parameter_limit() {
    let registry = SchemaRegistry::builtin();
    let schema = registry.descriptor("order.lifecycle").unwrap().table();

    let per_statement = PostgresWriter::rows_per_statement(schema);
    assert_eq!(per_statement, usize::from(u16::MAX) / schema.columns().len());
    assert!(per_statement * schema.columns().len() <= usize::from(u16::MAX));
}
