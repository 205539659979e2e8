use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{AuditEvent, EventType, Result};

/// Append-only store for audit events.
///
/// The sink owns expiry: events carry an absolute `expires_at` and a
/// store-managed reaper removes them past that time. Appending an event
/// with an already-present `(partition_key, sort_key)` overwrites it;
/// the trail tolerates that at millisecond resolution.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Appends one event.
    async fn append(&self, event: AuditEvent) -> Result<()>;
}

/// In-memory event sink for tests and the default server binary.
///
/// Events live in a `BTreeMap` keyed by `(partition_key, sort_key)`, so
/// a partition's events come back in sort-key order and key collisions
/// overwrite, matching the production store's semantics. No reaper runs;
/// expiry is asserted on, not enforced, in tests.
#[derive(Clone, Default)]
pub struct InMemoryEventSink {
    events: Arc<RwLock<BTreeMap<(String, String), AuditEvent>>>,
}

impl InMemoryEventSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns all events in key order.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.values().cloned().collect()
    }

    /// Returns the events in one partition, ordered by sort key.
    pub async fn events_for_partition(&self, partition_key: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|((partition, _), _)| partition == partition_key)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Returns all events of one type, across partitions.
    pub async fn events_of_type(&self, event_type: EventType) -> Vec<AuditEvent> {
        self.events
            .read()
            .await
            .values()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        let mut events = self.events.write().await;
        events.insert((event.partition_key.clone(), event.sort_key.clone()), event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityType;
    use common::CorrelationId;
    use serde_json::json;

    fn event_for(code: &str, event_type: EventType) -> AuditEvent {
        AuditEvent::new(
            EntityType::Product,
            code,
            event_type,
            "admin@example.com",
            CorrelationId::new(),
            json!({"productId": code, "price": 1.0}),
        )
    }

    #[tokio::test]
    async fn append_stores_event() {
        let sink = InMemoryEventSink::new();
        sink.append(event_for("T-01", EventType::ProductCreated))
            .await
            .unwrap();
        assert_eq!(sink.event_count().await, 1);
    }

    #[tokio::test]
    async fn partition_lookup_filters_by_entity() {
        let sink = InMemoryEventSink::new();
        sink.append(event_for("T-01", EventType::ProductCreated))
            .await
            .unwrap();
        sink.append(event_for("T-02", EventType::ProductCreated))
            .await
            .unwrap();

        let events = sink.events_for_partition("#product_T-01").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].partition_key, "#product_T-01");
    }

    #[tokio::test]
    async fn colliding_keys_overwrite() {
        let sink = InMemoryEventSink::new();
        let event = event_for("T-01", EventType::ProductCreated);
        sink.append(event.clone()).await.unwrap();
        sink.append(event).await.unwrap();
        assert_eq!(sink.event_count().await, 1);
    }

    #[tokio::test]
    async fn events_of_type_spans_partitions() {
        let sink = InMemoryEventSink::new();
        sink.append(event_for("T-01", EventType::ProductCreated))
            .await
            .unwrap();
        sink.append(event_for("T-01", EventType::ProductDeleted))
            .await
            .unwrap();
        sink.append(event_for("T-02", EventType::ProductCreated))
            .await
            .unwrap();

        let created = sink.events_of_type(EventType::ProductCreated).await;
        assert_eq!(created.len(), 2);
        let deleted = sink.events_of_type(EventType::ProductDeleted).await;
        assert_eq!(deleted.len(), 1);
    }
}
