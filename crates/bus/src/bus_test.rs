//! Tests for the event bus: delivery, isolation, shutdown semantics

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use spincycle_events::{AnalyticsEvent, EventDraft, SchemaRegistry};

use crate::{EventBus, Subscriber, SubscriberError, SubscriptionId};

fn test_event(registry: &SchemaRegistry, name: &str) -> AnalyticsEvent {
    registry
        .create_event(EventDraft {
            source: "order-service".into(),
            category: "order.lifecycle".into(),
            name: name.into(),
            payload: json!({"order_id": "order-1", "status": "received"})
                .as_object()
                .cloned()
                .unwrap(),
            ..EventDraft::default()
        })
        .expect("valid draft")
}

/// Subscriber that records event names in arrival order
struct Recording {
    id: String,
    seen: Mutex<Vec<String>>,
}

impl Recording {
    fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Subscriber for Recording {
    fn id(&self) -> &str {
        &self.id
    }

    async fn on_event(&self, event: &AnalyticsEvent) -> Result<(), SubscriberError> {
        self.seen.lock().unwrap().push(event.name().to_owned());
        Ok(())
    }
}

/// Subscriber that always fails
struct Failing;

#[async_trait]
impl Subscriber for Failing {
    fn id(&self) -> &str {
        "failing"
    }

    async fn on_event(&self, _event: &AnalyticsEvent) -> Result<(), SubscriberError> {
        Err(SubscriberError::new("simulated handler failure"))
    }
}

/// Subscriber that unsubscribes itself while handling its first event
struct SelfRemoving {
    bus: Arc<EventBus>,
    own_id: Mutex<Option<SubscriptionId>>,
    handled: Mutex<usize>,
}

#[async_trait]
impl Subscriber for SelfRemoving {
    fn id(&self) -> &str {
        "self-removing"
    }

    async fn on_event(&self, _event: &AnalyticsEvent) -> Result<(), SubscriberError> {
        *self.handled.lock().unwrap() += 1;
        if let Some(id) = self.own_id.lock().unwrap().take() {
            self.bus.unsubscribe(id);
        }
        Ok(())
    }
}

#[tokio::test]
async fn delivers_to_all_subscribers_in_publish_order() {
    let registry = SchemaRegistry::builtin();
    let bus = EventBus::new();
    let first = Recording::new("first");
    let second = Recording::new("second");
    bus.subscribe(first.clone());
    bus.subscribe(second.clone());

    bus.publish(&test_event(&registry, "created")).await;
    bus.publish(&test_event(&registry, "status_changed")).await;

    assert_eq!(first.seen(), vec!["created", "status_changed"]);
    assert_eq!(second.seen(), vec!["created", "status_changed"]);

    let snapshot = bus.metrics().snapshot();
    assert_eq!(snapshot.events_published, 2);
    assert_eq!(snapshot.events_delivered, 4);
}

#[tokio::test]
async fn subscriber_error_does_not_block_other_subscribers() {
    let registry = SchemaRegistry::builtin();
    let bus = EventBus::new();
    let healthy = Recording::new("healthy");
    bus.subscribe(Arc::new(Failing));
    bus.subscribe(healthy.clone());

    bus.publish(&test_event(&registry, "created")).await;

    assert_eq!(healthy.seen(), vec!["created"]);
    assert_eq!(bus.metrics().snapshot().subscriber_errors, 1);
}

#[tokio::test]
async fn unsubscribe_removes_subscription() {
    let registry = SchemaRegistry::builtin();
    let bus = EventBus::new();
    let recording = Recording::new("recording");
    let id = bus.subscribe(recording.clone());

    bus.publish(&test_event(&registry, "created")).await;
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    bus.publish(&test_event(&registry, "status_changed")).await;

    assert_eq!(recording.seen(), vec!["created"]);
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test]
async fn unsubscribing_during_delivery_is_safe() {
    let registry = SchemaRegistry::builtin();
    let bus = Arc::new(EventBus::new());
    let remover = Arc::new(SelfRemoving {
        bus: bus.clone(),
        own_id: Mutex::new(None),
        handled: Mutex::new(0),
    });
    let tail = Recording::new("tail");

    let id = bus.subscribe(remover.clone());
    bus.subscribe(tail.clone());
    *remover.own_id.lock().unwrap() = Some(id);

    // First event: remover handles it and unsubscribes itself; delivery to
    // the tail subscriber is unaffected.
    bus.publish(&test_event(&registry, "created")).await;
    // Second event: only the tail subscriber remains.
    bus.publish(&test_event(&registry, "status_changed")).await;

    assert_eq!(*remover.handled.lock().unwrap(), 1);
    assert_eq!(tail.seen(), vec!["created", "status_changed"]);
}

#[tokio::test]
async fn publish_after_shutdown_is_a_noop() {
    let registry = SchemaRegistry::builtin();
    let bus = EventBus::new();
    let recording = Recording::new("recording");
    bus.subscribe(recording.clone());

    bus.shutdown();
    bus.publish(&test_event(&registry, "created")).await;

    assert!(recording.seen().is_empty());
    let snapshot = bus.metrics().snapshot();
    assert_eq!(snapshot.events_published, 0);
    assert_eq!(snapshot.published_after_shutdown, 1);
}

#[tokio::test]
async fn subscribe_after_shutdown_never_receives() {
    let registry = SchemaRegistry::builtin();
    let bus = EventBus::new();
    bus.shutdown();

    let recording = Recording::new("late");
    bus.subscribe(recording.clone());
    bus.publish(&test_event(&registry, "created")).await;

    assert_eq!(bus.subscriber_count(), 0);
    assert!(recording.seen().is_empty());
}
