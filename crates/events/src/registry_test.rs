//! Tests for event construction and row projection

use serde_json::{Value, json};

use crate::error::EventError;
use crate::event::{Actor, EventDraft};
use crate::registry::{CategoryDescriptor, SchemaRegistry};
use crate::row::{Cell, ColumnSpec, ColumnType};

fn order_draft() -> EventDraft {
    EventDraft {
        source: "order-service".into(),
        category: "order.lifecycle".into(),
        name: "created".into(),
        payload: json!({
            "order_id": "order-123",
            "branch_id": "branch-1",
            "customer_id": "customer-5",
            "status": "received",
            "total": 199.5,
        })
        .as_object()
        .cloned()
        .unwrap(),
        actor: Some(Actor {
            actor_id: "staff-9".into(),
            actor_type: "staff".into(),
            actor_name: Some("Front Desk".into()),
        }),
        context: None,
    }
}

// ============================================================================
// Construction and validation
// ============================================================================

#[test]
fn creates_fully_populated_event() {
    let registry = SchemaRegistry::builtin();
    let event = registry.create_event(order_draft()).unwrap();

    assert_eq!(event.source(), "order-service");
    assert_eq!(event.category(), "order.lifecycle");
    assert_eq!(event.name(), "created");
    assert_eq!(event.schema_version(), 2);
    assert_eq!(event.actor().unwrap().actor_id, "staff-9");
    assert_eq!(
        event.payload_field("order_id"),
        Some(&Value::String("order-123".into()))
    );
}

#[test]
fn event_ids_are_fresh_per_construction() {
    let registry = SchemaRegistry::builtin();
    let a = registry.create_event(order_draft()).unwrap();
    let b = registry.create_event(order_draft()).unwrap();
    assert_ne!(a.event_id(), b.event_id());
}

#[test]
fn unknown_category_is_rejected() {
    let registry = SchemaRegistry::builtin();
    let draft = EventDraft {
        category: "laundry.folding".into(),
        ..order_draft()
    };

    let err = registry.create_event(draft).unwrap_err();
    assert!(matches!(err, EventError::UnknownCategory(c) if c == "laundry.folding"));
}

#[test]
fn missing_required_field_is_rejected() {
    let registry = SchemaRegistry::builtin();
    let mut draft = order_draft();
    draft.payload.remove("status");

    let err = registry.create_event(draft).unwrap_err();
    assert!(matches!(err, EventError::MissingField { field: "status", .. }));
}

#[test]
fn null_required_field_is_rejected() {
    let registry = SchemaRegistry::builtin();
    let mut draft = order_draft();
    draft.payload.insert("order_id".into(), Value::Null);

    let err = registry.create_event(draft).unwrap_err();
    assert!(matches!(err, EventError::MissingField { field: "order_id", .. }));
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = SchemaRegistry::builtin();
    let err = registry
        .register(CategoryDescriptor::new(
            "order.lifecycle",
            3,
            vec![],
            vec![],
            |_| vec![],
        ))
        .unwrap_err();
    assert!(matches!(err, EventError::DuplicateCategory(_)));
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn order_event_projects_to_typed_columns() {
    let registry = SchemaRegistry::builtin();
    let descriptor = registry.descriptor("order.lifecycle").unwrap();
    let event = registry.create_event(order_draft()).unwrap();

    let schema = descriptor.table();
    assert_eq!(schema.name(), "analytics_order_lifecycle_events");

    let row = descriptor.project(&event);
    assert_eq!(row.len(), schema.columns().len());

    assert_eq!(
        row.get(schema, "order_id"),
        Some(&Cell::Text(Some("order-123".into())))
    );
    assert_eq!(row.get(schema, "total"), Some(&Cell::Double(Some(199.5))));
    assert_eq!(
        row.get(schema, "event_id"),
        Some(&Cell::Text(Some(event.event_id().to_string())))
    );
    // status was never transitioned, so previous_status is NULL
    assert_eq!(row.get(schema, "previous_status"), Some(&Cell::Text(None)));
}

#[test]
fn full_payload_is_retained_in_json_column() {
    let registry = SchemaRegistry::builtin();
    let descriptor = registry.descriptor("order.lifecycle").unwrap();
    let event = registry.create_event(order_draft()).unwrap();

    let row = descriptor.project(&event);
    let Some(Cell::Json(Some(Value::Object(payload)))) = row.get(descriptor.table(), "payload")
    else {
        panic!("payload column must hold the original payload object");
    };
    assert_eq!(payload.get("branch_id"), Some(&json!("branch-1")));
}

#[test]
fn actor_columns_are_null_without_actor() {
    let registry = SchemaRegistry::builtin();
    let descriptor = registry.descriptor("order.lifecycle").unwrap();
    let draft = EventDraft {
        actor: None,
        ..order_draft()
    };
    let event = registry.create_event(draft).unwrap();

    let row = descriptor.project(&event);
    assert_eq!(row.get(descriptor.table(), "actor_id"), Some(&Cell::Text(None)));
    assert_eq!(row.get(descriptor.table(), "actor_type"), Some(&Cell::Text(None)));
}

// ============================================================================
// Extension
// ============================================================================

#[test]
fn registering_a_new_category_requires_no_sink_changes() {
    let mut registry = SchemaRegistry::builtin();
    registry
        .register(CategoryDescriptor::new(
            "machine.maintenance",
            1,
            vec!["machine_id"],
            vec![ColumnSpec::new("machine_id", ColumnType::Text)],
            |event| {
                vec![Cell::Text(
                    event
                        .payload_field("machine_id")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                )]
            },
        ))
        .unwrap();

    let event = registry
        .create_event(EventDraft {
            source: "maintenance-service".into(),
            category: "machine.maintenance".into(),
            name: "serviced".into(),
            payload: json!({"machine_id": "washer-7"}).as_object().cloned().unwrap(),
            ..EventDraft::default()
        })
        .unwrap();

    let descriptor = registry.descriptor("machine.maintenance").unwrap();
    assert_eq!(
        descriptor.table().name(),
        "analytics_machine_maintenance_events"
    );
    let row = descriptor.project(&event);
    assert_eq!(
        row.get(descriptor.table(), "machine_id"),
        Some(&Cell::Text(Some("washer-7".into())))
    );
}

#[test]
fn descriptors_iterate_in_stable_order() {
    let registry = SchemaRegistry::builtin();
    let categories: Vec<_> = registry
        .descriptors()
        .iter()
        .map(|d| d.category().to_owned())
        .collect();
    assert_eq!(
        categories,
        vec![
            "campaign.interaction",
            "driver.telemetry",
            "order.lifecycle",
            "payment.transaction",
        ]
    );
}
