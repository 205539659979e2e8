use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the API request that triggered an operation.
///
/// Wraps a UUID to provide type safety and prevent mixing up
/// request identifiers with other UUID-based identifiers. Carried
/// into every audit event so a mutation can be traced back to the
/// call that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new random correlation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a correlation ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Per-request context handed from the transport layer to handlers.
///
/// Authentication happens upstream of the router; by the time a request
/// reaches a handler, `actor_email` is whatever identity the caller was
/// authenticated as (or `anonymous`).
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Email of the authenticated caller, used as the audit actor.
    pub actor_email: String,

    /// Identifier of the inbound request.
    pub correlation_id: CorrelationId,
}

impl RequestContext {
    /// Creates a context for the given caller with a fresh correlation ID.
    pub fn new(actor_email: impl Into<String>) -> Self {
        Self {
            actor_email: actor_email.into(),
            correlation_id: CorrelationId::new(),
        }
    }

    /// Creates a context with an explicit correlation ID.
    pub fn with_correlation(actor_email: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            actor_email: actor_email.into(),
            correlation_id,
        }
    }
}
