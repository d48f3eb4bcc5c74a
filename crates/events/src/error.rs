//! Event construction errors

use thiserror::Error;

/// Errors from event construction and registry lookups
///
/// Construction fails fast: an invalid event is never buffered or published.
#[derive(Debug, Error)]
pub enum EventError {
    /// Category is not registered in the schema registry
    #[error("unknown event category '{0}'")]
    UnknownCategory(String),

    /// A payload field required by the category is missing or null
    #[error("category '{category}' requires payload field '{field}'")]
    MissingField {
        /// The event category
        category: String,
        /// The missing payload key
        field: &'static str,
    },

    /// A category was registered twice
    #[error("category '{0}' is already registered")]
    DuplicateCategory(String),
}
