// Central Error Type for the Queue

use thiserror::Error;

/// Errors raised by the queue itself
///
/// Task failures are not represented here: they stay opaque and are handed
/// to the completion handler unchanged.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The queue was dropped before it could settle, which happens when a
    /// completion signal is dropped without reporting an outcome
    #[error("Queue abandoned before settling")]
    Abandoned,
}

/// Result type alias using QueueError
pub type Result<T> = std::result::Result<T, QueueError>;
