//! Domain error types.

use entity_store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No entity exists for the given key.
    #[error("{entity} not found: {key}")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    /// An order referenced a product that does not exist.
    #[error("order references unknown product: {product_id}")]
    InvalidReference { product_id: String },

    /// A create collided with an existing entity on a unique key.
    #[error("{entity} already exists: {key}")]
    Conflict {
        entity: &'static str,
        key: String,
    },

    /// The entity store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }
}
