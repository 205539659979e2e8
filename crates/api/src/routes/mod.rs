//! Route handlers.
//!
//! `products` and `orders` hold the handlers the route table dispatches
//! to; `health` and `metrics` are served natively by the transport
//! layer.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::router::ApiRequest;

/// Deserializes a body that already passed schema validation. A failure
/// here means the schema and the target type disagree, which is a bug,
/// not client error.
pub(crate) fn parse_body<T: DeserializeOwned>(request: &ApiRequest) -> Result<T, ApiError> {
    let body = request.body.clone().unwrap_or(Value::Null);
    serde_json::from_value(body)
        .map_err(|err| ApiError::Internal(format!("validated body failed to deserialize: {err}")))
}
