use thiserror::Error;

/// Errors that can occur when handing an event to the transport.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The transport refused or failed to accept the event.
    #[error("event transport rejected publish to '{topic}': {reason}")]
    Transport { topic: String, reason: String },

    /// The event payload could not be serialized.
    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
