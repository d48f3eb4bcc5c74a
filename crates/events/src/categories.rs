//! Built-in category descriptors
//!
//! Each descriptor names the payload fields promoted to typed columns; the
//! full payload is always retained in the `payload` JSON column, so promoting
//! a field later is additive.

use serde_json::Value;

use crate::event::AnalyticsEvent;
use crate::registry::CategoryDescriptor;
use crate::row::{Cell, ColumnSpec, ColumnType};

/// Text cell from a payload field
fn text(event: &AnalyticsEvent, key: &str) -> Cell {
    Cell::Text(
        event
            .payload_field(key)
            .and_then(Value::as_str)
            .map(str::to_owned),
    )
}

/// Double cell from a payload field
fn double(event: &AnalyticsEvent, key: &str) -> Cell {
    Cell::Double(event.payload_field(key).and_then(Value::as_f64))
}

/// Bool cell from a payload field
fn boolean(event: &AnalyticsEvent, key: &str) -> Cell {
    Cell::Bool(event.payload_field(key).and_then(Value::as_bool))
}

/// Order intake and status transitions, emitted by the order service
fn order_lifecycle() -> CategoryDescriptor {
    CategoryDescriptor::new(
        "order.lifecycle",
        2,
        vec!["order_id", "status"],
        vec![
            ColumnSpec::new("order_id", ColumnType::Text),
            ColumnSpec::new("branch_id", ColumnType::Text),
            ColumnSpec::new("customer_id", ColumnType::Text),
            ColumnSpec::new("status", ColumnType::Text),
            ColumnSpec::new("previous_status", ColumnType::Text),
            ColumnSpec::new("delivery_status", ColumnType::Text),
            ColumnSpec::new("total", ColumnType::Double),
            ColumnSpec::new("promised_ready_date", ColumnType::Text),
            ColumnSpec::new("delivery_id", ColumnType::Text),
        ],
        |event| {
            vec![
                text(event, "order_id"),
                text(event, "branch_id"),
                text(event, "customer_id"),
                text(event, "status"),
                text(event, "previous_status"),
                text(event, "delivery_status"),
                double(event, "total"),
                text(event, "promised_ready_date"),
                text(event, "delivery_id"),
            ]
        },
    )
}

/// Driver location pings and route progress from the mobile app
fn driver_telemetry() -> CategoryDescriptor {
    CategoryDescriptor::new(
        "driver.telemetry",
        1,
        vec!["driver_id"],
        vec![
            ColumnSpec::new("driver_id", ColumnType::Text),
            ColumnSpec::new("delivery_id", ColumnType::Text),
            ColumnSpec::new("latitude", ColumnType::Double),
            ColumnSpec::new("longitude", ColumnType::Double),
            ColumnSpec::new("accuracy_m", ColumnType::Double),
        ],
        |event| {
            vec![
                text(event, "driver_id"),
                text(event, "delivery_id"),
                double(event, "latitude"),
                double(event, "longitude"),
                double(event, "accuracy_m"),
            ]
        },
    )
}

/// Campaign sends, opens, and redemptions
fn campaign_interaction() -> CategoryDescriptor {
    CategoryDescriptor::new(
        "campaign.interaction",
        1,
        vec!["campaign_id", "customer_id"],
        vec![
            ColumnSpec::new("campaign_id", ColumnType::Text),
            ColumnSpec::new("customer_id", ColumnType::Text),
            ColumnSpec::new("channel", ColumnType::Text),
            ColumnSpec::new("action", ColumnType::Text),
        ],
        |event| {
            vec![
                text(event, "campaign_id"),
                text(event, "customer_id"),
                text(event, "channel"),
                text(event, "action"),
            ]
        },
    )
}

/// Payment captures, refunds, and failures
fn payment_transaction() -> CategoryDescriptor {
    CategoryDescriptor::new(
        "payment.transaction",
        1,
        vec!["payment_id", "order_id", "amount"],
        vec![
            ColumnSpec::new("payment_id", ColumnType::Text),
            ColumnSpec::new("order_id", ColumnType::Text),
            ColumnSpec::new("customer_id", ColumnType::Text),
            ColumnSpec::new("amount", ColumnType::Double),
            ColumnSpec::new("method", ColumnType::Text),
            ColumnSpec::new("succeeded", ColumnType::Bool),
        ],
        |event| {
            vec![
                text(event, "payment_id"),
                text(event, "order_id"),
                text(event, "customer_id"),
                double(event, "amount"),
                text(event, "method"),
                boolean(event, "succeeded"),
            ]
        },
    )
}

/// All built-in descriptors
pub(crate) fn builtin() -> Vec<CategoryDescriptor> {
    vec![
        order_lifecycle(),
        driver_telemetry(),
        campaign_interaction(),
        payment_transaction(),
    ]
}
