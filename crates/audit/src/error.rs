use thiserror::Error;

/// Errors that can occur when recording audit events.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The event sink could not be reached or rejected the append.
    #[error("event sink unavailable: {0}")]
    SinkUnavailable(String),

    /// The retry queue was closed before the event could be handed off.
    #[error("retry queue closed")]
    QueueClosed,

    /// A serialization error occurred while building the event payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
