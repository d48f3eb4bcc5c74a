//! Spincycle - Events
//!
//! The analytics event model shared by producers, the bus, the sink, and the
//! provisioning tool.
//!
//! # Overview
//!
//! Producers describe what happened with an [`EventDraft`] and turn it into an
//! immutable [`AnalyticsEvent`] through a [`SchemaRegistry`], which validates
//! the category and its required payload fields. The registry also owns the
//! mapping from each category to its warehouse [`TableSchema`] and the pure
//! projection from an event to a flat [`Row`] of typed cells.
//!
//! # Categories
//!
//! Categories form a closed taxonomy; [`SchemaRegistry::builtin`] registers
//! the ones the platform emits today:
//!
//! | Category | Table |
//! |----------|-------|
//! | `order.lifecycle` | `analytics_order_lifecycle_events` |
//! | `driver.telemetry` | `analytics_driver_telemetry_events` |
//! | `campaign.interaction` | `analytics_campaign_interaction_events` |
//! | `payment.transaction` | `analytics_payment_transaction_events` |
//!
//! Adding a category is a [`SchemaRegistry::register`] call, not a code branch
//! anywhere else in the pipeline.
//!
//! # Example
//!
//! ```
//! use spincycle_events::{EventDraft, SchemaRegistry};
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::builtin();
//! let event = registry
//!     .create_event(EventDraft {
//!         source: "order-service".into(),
//!         category: "order.lifecycle".into(),
//!         name: "created".into(),
//!         payload: json!({"order_id": "order-123", "status": "received"})
//!             .as_object()
//!             .cloned()
//!             .unwrap(),
//!         ..EventDraft::default()
//!     })
//!     .unwrap();
//!
//! assert_eq!(event.category(), "order.lifecycle");
//! ```

mod categories;
pub mod ddl;
mod error;
mod event;
mod naming;
mod registry;
mod row;

pub use error::EventError;
pub use event::{Actor, AnalyticsEvent, EventDraft, JsonMap};
pub use naming::table_name;
pub use registry::{CategoryDescriptor, SchemaRegistry};
pub use row::{Cell, ColumnSpec, ColumnType, Row, TableSchema};
