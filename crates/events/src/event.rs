//! Immutable analytics event records

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// JSON object used for payload and context bags
pub type JsonMap = Map<String, Value>;

/// Who or what caused an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    /// Stable identifier (customer id, driver id, "system", ...)
    pub actor_id: String,

    /// Kind of actor ("customer", "driver", "staff", "system")
    pub actor_type: String,

    /// Display name, when known
    pub actor_name: Option<String>,
}

/// Input to event construction
///
/// A draft carries everything the producer knows; the registry validates it
/// and stamps identity, time, and schema version.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    /// Producer identifier, e.g. "order-service"
    pub source: String,

    /// Dotted category string, e.g. "order.lifecycle"
    pub category: String,

    /// Event sub-type, e.g. "created", "status_changed"
    pub name: String,

    /// Category-specific fields
    pub payload: JsonMap,

    /// Optional actor attribution
    pub actor: Option<Actor>,

    /// Optional free-form context (request id, branch id, ...); stored as a
    /// single JSON column, never promoted to typed columns
    pub context: Option<JsonMap>,
}

/// An immutable, typed analytics event
///
/// Constructed only through [`crate::SchemaRegistry::create_event`], which
/// guarantees the category is registered and required payload fields are
/// present. All fields are private; the event is never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct AnalyticsEvent {
    event_id: Uuid,
    occurred_at: DateTime<Utc>,
    source: String,
    category: String,
    name: String,
    schema_version: u32,
    actor: Option<Actor>,
    context: Option<JsonMap>,
    payload: JsonMap,
}

impl AnalyticsEvent {
    /// Assemble a validated draft into an event, stamping identity and time.
    ///
    /// Crate-private: validation lives in the registry.
    pub(crate) fn assemble(draft: EventDraft, schema_version: u32) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            source: draft.source,
            category: draft.category,
            name: draft.name,
            schema_version,
            actor: draft.actor,
            context: draft.context,
            payload: draft.payload,
        }
    }

    /// Unique event identifier, fresh per construction
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Construction timestamp
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Producer identifier
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Category string
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Event sub-type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload schema version of the category at construction time
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Actor attribution, when present
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Free-form context bag, when present
    pub fn context(&self) -> Option<&JsonMap> {
        self.context.as_ref()
    }

    /// Category-specific payload
    pub fn payload(&self) -> &JsonMap {
        &self.payload
    }

    /// Look up a single payload field
    pub fn payload_field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}
