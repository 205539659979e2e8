use chrono::Utc;
use common::CorrelationId;
use serde::{Deserialize, Serialize};

/// How long an audit event is retained before the store's reaper may
/// remove it, in seconds.
pub const RETENTION_SECONDS: i64 = 300;

/// Kind of entity an audit event is about. Becomes part of the
/// partition key, grouping a given entity's events together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Product,
    Order,
}

impl EntityType {
    /// Returns the lowercase name used in partition keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Product => "product",
            EntityType::Order => "order",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of lifecycle transitions the system audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    OrderCreated,
    OrderDeleted,
}

impl EventType {
    /// Returns the wire name used in sort keys and serialized events.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ProductCreated => "PRODUCT_CREATED",
            EventType::ProductUpdated => "PRODUCT_UPDATED",
            EventType::ProductDeleted => "PRODUCT_DELETED",
            EventType::OrderCreated => "ORDER_CREATED",
            EventType::OrderDeleted => "ORDER_DELETED",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload recorded for product lifecycle events: the product's identity
/// and its price at the moment the event happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEventPayload {
    pub product_id: String,
    pub price: f64,
}

/// Payload recorded for order lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEventPayload {
    pub product_ids: Vec<String>,
    pub total: f64,
}

/// An immutable audit record of one business mutation.
///
/// `partition_key` groups all events for one entity; `sort_key` orders
/// them lexicographically by event type and millisecond timestamp within
/// the partition. `expires_at` is an absolute Unix-seconds expiry the
/// store's reaper acts on; application code never deletes events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// `#<entityType>_<entityCode>`.
    pub partition_key: String,

    /// `<EVENT_TYPE>#<timestampMillis>`.
    pub sort_key: String,

    /// Email of the actor who caused the mutation.
    pub actor_email: String,

    /// Event creation time, epoch milliseconds.
    pub created_at: i64,

    /// Identifier of the API request that triggered the mutation.
    pub correlation_id: CorrelationId,

    /// Which lifecycle transition happened.
    pub event_type: EventType,

    /// Type-specific snapshot of the mutated entity.
    pub payload: serde_json::Value,

    /// Absolute expiry, epoch seconds: `created_at / 1000 + 300`.
    pub expires_at: i64,
}

impl AuditEvent {
    /// Builds an event stamped with the current time.
    pub fn new(
        entity_type: EntityType,
        entity_code: &str,
        event_type: EventType,
        actor_email: impl Into<String>,
        correlation_id: CorrelationId,
        payload: serde_json::Value,
    ) -> Self {
        Self::at(
            Utc::now().timestamp_millis(),
            entity_type,
            entity_code,
            event_type,
            actor_email,
            correlation_id,
            payload,
        )
    }

    /// Builds an event for an explicit timestamp.
    fn at(
        created_at: i64,
        entity_type: EntityType,
        entity_code: &str,
        event_type: EventType,
        actor_email: impl Into<String>,
        correlation_id: CorrelationId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            partition_key: format!("#{}_{}", entity_type.as_str(), entity_code),
            sort_key: format!("{}#{}", event_type.as_str(), created_at),
            actor_email: actor_email.into(),
            created_at,
            correlation_id,
            event_type,
            payload,
            expires_at: created_at / 1000 + RETENTION_SECONDS,
        }
    }

    /// Returns a copy stamped with a fresh timestamp.
    ///
    /// Used by the retry worker: the trail needs at least one record per
    /// real mutation, not exactly one, so a retried append may carry a
    /// newer timestamp than the original attempt.
    pub fn refreshed(&self) -> Self {
        let created_at = Utc::now().timestamp_millis();
        Self {
            partition_key: self.partition_key.clone(),
            sort_key: format!("{}#{}", self.event_type.as_str(), created_at),
            actor_email: self.actor_email.clone(),
            created_at,
            correlation_id: self.correlation_id,
            event_type: self.event_type,
            payload: self.payload.clone(),
            expires_at: created_at / 1000 + RETENTION_SECONDS,
        }
    }
}
