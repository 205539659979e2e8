use thiserror::Error;

use crate::store::Key;

/// Errors that can occur when interacting with the entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write's precondition did not hold.
    #[error("condition failed for key {key}")]
    ConditionFailed {
        /// The key the write was addressed to.
        key: Key,
    },

    /// The store could not be reached or answered with a transport-level
    /// failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for entity store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
