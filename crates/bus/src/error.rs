//! Subscriber error type

use thiserror::Error;

/// Error reported by a subscriber while handling an event
///
/// The bus catches these, logs them with the subscriber's id, and continues
/// delivery to the remaining subscribers.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(String);

impl SubscriberError {
    /// Create a subscriber error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for SubscriberError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for SubscriberError {
    fn from(message: &str) -> Self {
        Self(message.to_owned())
    }
}
