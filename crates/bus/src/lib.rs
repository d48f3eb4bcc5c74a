//! Spincycle - Event Bus
//!
//! In-process publish/subscribe channel between event producers and the
//! analytics sink.
//!
//! # Design
//!
//! - `publish` awaits every currently-subscribed handler before returning
//!   (structured await-all, not fire-and-forget), so a subscriber's
//!   size-triggered flush is finished by the time the producer's call
//!   resolves.
//! - Subscriber failures are isolated: an error from one subscriber is
//!   logged and counted, and never reaches the publisher or other
//!   subscribers. A slow or broken analytics pipeline must not break the
//!   producer's request path.
//! - Delivery is in-process only and unpersisted; events published while no
//!   subscriber is registered are dropped.
//! - After [`EventBus::shutdown`], `publish` is a no-op that returns
//!   immediately without delivery.
//!
//! # Example
//!
//! ```ignore
//! let bus = Arc::new(EventBus::new());
//! let id = bus.subscribe(Arc::new(MySubscriber::new()));
//!
//! bus.publish(&event).await;
//!
//! bus.unsubscribe(id);
//! bus.shutdown();
//! ```

mod bus;
mod error;
mod metrics;

pub use bus::{EventBus, Subscriber, SubscriptionId};
pub use error::SubscriberError;
pub use metrics::{BusMetrics, BusMetricsSnapshot};

#[cfg(test)]
#[path = "bus_test.rs"]
mod bus_test;
