//! In-process publish/subscribe bus

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use spincycle_events::AnalyticsEvent;

use crate::error::SubscriberError;
use crate::metrics::BusMetrics;

/// Handler for published events
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Identifier used in log attribution
    fn id(&self) -> &str;

    /// Handle one event. Errors are caught and logged by the bus; they never
    /// propagate to the publisher or to other subscribers.
    async fn on_event(&self, event: &AnalyticsEvent) -> Result<(), SubscriberError>;
}

/// Handle identifying one subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registered {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscriber>,
}

struct BusState {
    subscribers: Vec<Registered>,
    next_id: u64,
    closed: bool,
}

/// In-process event bus
///
/// Registration state lives behind a mutex that is never held across an
/// await: `publish` snapshots the subscriber list, releases the lock, then
/// awaits each handler. Unsubscribing mid-delivery therefore cannot panic
/// and does not affect events already in flight.
pub struct EventBus {
    state: Mutex<BusState>,
    metrics: BusMetrics,
}

impl EventBus {
    /// Create an open bus with no subscribers
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BusState {
                subscribers: Vec::new(),
                next_id: 0,
                closed: false,
            }),
            metrics: BusMetrics::default(),
        }
    }

    /// Register a subscriber; the returned id removes it again via
    /// [`EventBus::unsubscribe`].
    ///
    /// Subscribing after shutdown returns an id that will never see events.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriptionId {
        let mut state = self.lock_state();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        if state.closed {
            tracing::debug!(subscriber = subscriber.id(), "subscribe after shutdown ignored");
            return id;
        }
        state.subscribers.push(Registered { id, subscriber });
        id
    }

    /// Remove a subscription; returns whether it was present.
    ///
    /// Safe to call during delivery: events already snapshotted for delivery
    /// still reach the subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock_state();
        let before = state.subscribers.len();
        state.subscribers.retain(|r| r.id != id);
        state.subscribers.len() != before
    }

    /// Deliver an event to every currently-subscribed handler, awaiting each
    /// in registration order.
    ///
    /// After [`EventBus::shutdown`] this is a no-op that returns immediately.
    pub async fn publish(&self, event: &AnalyticsEvent) {
        let targets: Vec<Arc<dyn Subscriber>> = {
            let state = self.lock_state();
            if state.closed {
                self.metrics.record_published_after_shutdown();
                return;
            }
            state
                .subscribers
                .iter()
                .map(|r| Arc::clone(&r.subscriber))
                .collect()
        };

        self.metrics.record_published();

        for subscriber in targets {
            match subscriber.on_event(event).await {
                Ok(()) => self.metrics.record_delivered(),
                Err(error) => {
                    self.metrics.record_subscriber_error();
                    tracing::warn!(
                        subscriber = subscriber.id(),
                        category = event.category(),
                        %error,
                        "subscriber failed, continuing delivery"
                    );
                }
            }
        }
    }

    /// Close the bus and drop all subscriptions. Subsequent `publish` calls
    /// are no-ops.
    pub fn shutdown(&self) {
        let mut state = self.lock_state();
        state.closed = true;
        state.subscribers.clear();
    }

    /// Number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.lock_state().subscribers.len()
    }

    /// Bus metrics
    pub fn metrics(&self) -> &BusMetrics {
        &self.metrics
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
