//! Order operations against the entity store.

use audit::{EntityType, EventRecorder, EventSink, EventType, OrderEventPayload};
use chrono::Utc;
use common::CorrelationId;
use entity_store::{EntityStore, StoreError, WriteCondition};
use uuid::Uuid;

use crate::error::DomainError;
use crate::product::ProductService;

use super::{Order, OrderDraft, OrderStatus};

/// Optional list filters: none, email, or email plus order id.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub email: Option<String>,
    pub order_id: Option<String>,
}

/// Service for managing orders.
///
/// Holds the order store, a product service for resolving referenced
/// products, and the audit recorder.
#[derive(Clone)]
pub struct OrderService<S, E>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    store: S,
    products: ProductService<S, E>,
    recorder: EventRecorder<E>,
}

impl<S, E> OrderService<S, E>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    /// Creates a new order service.
    pub fn new(store: S, products: ProductService<S, E>, recorder: EventRecorder<E>) -> Self {
        Self {
            store,
            products,
            recorder,
        }
    }

    /// Lists orders, narrowed by the given filters.
    ///
    /// No filters returns every order; an email alone returns that
    /// customer's orders; email plus order id returns exactly that
    /// order or NotFound. An order id without an email narrows the full
    /// scan to matching ids.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, DomainError> {
        match (filter.email, filter.order_id) {
            (Some(email), Some(order_id)) => {
                let order = self.fetch(&email, &order_id).await?;
                Ok(vec![order])
            }
            (Some(email), None) => {
                let items = self.store.query(&email).await?;
                items
                    .into_iter()
                    .map(|item| serde_json::from_value(item).map_err(DomainError::from))
                    .collect()
            }
            (None, order_id) => {
                let items = self.store.scan().await?;
                let orders = items
                    .into_iter()
                    .map(|item| serde_json::from_value::<Order>(item).map_err(DomainError::from))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match order_id {
                    Some(id) => orders.into_iter().filter(|o| o.id == id).collect(),
                    None => orders,
                })
            }
        }
    }

    /// Returns the order with the given email and id.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, email: &str, order_id: &str) -> Result<Order, DomainError> {
        let item = self
            .store
            .get(&Order::key(email, order_id))
            .await?
            .ok_or_else(|| DomainError::not_found("order", format!("{email}/{order_id}")))?;
        Ok(serde_json::from_value(item)?)
    }

    /// Creates an order from a validated body.
    ///
    /// Every referenced product is resolved before anything is
    /// persisted, so the stored total reflects product prices at
    /// creation time and an unresolvable reference leaves no trace.
    #[tracing::instrument(skip(self, draft), fields(email = %draft.email))]
    pub async fn create(
        &self,
        draft: OrderDraft,
        correlation_id: CorrelationId,
    ) -> Result<Order, DomainError> {
        let mut total = 0.0;
        for product_id in &draft.product_ids {
            match self.products.fetch(product_id).await {
                Ok(product) => total += product.price,
                Err(DomainError::NotFound { .. }) => {
                    return Err(DomainError::InvalidReference {
                        product_id: product_id.clone(),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            email: draft.email,
            product_ids: draft.product_ids,
            payment: draft.payment,
            status: OrderStatus::Pending,
            total,
            created_at: Utc::now(),
        };
        let item = serde_json::to_value(&order)?;

        match self
            .store
            .put(
                Order::key(&order.email, &order.id),
                item,
                WriteCondition::MustNotExist,
            )
            .await
        {
            Err(StoreError::ConditionFailed { .. }) => {
                return Err(DomainError::Conflict {
                    entity: "order",
                    key: order.id,
                });
            }
            result => result?,
        }

        self.record(EventType::OrderCreated, &order, correlation_id)
            .await;
        Ok(order)
    }

    /// Removes and returns the order with the given email and id.
    ///
    /// Both parameters are required; the router's validator rejects a
    /// request carrying only one of them before this runs.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        email: &str,
        order_id: &str,
        correlation_id: CorrelationId,
    ) -> Result<Order, DomainError> {
        let removed = self
            .store
            .delete(&Order::key(email, order_id))
            .await?
            .ok_or_else(|| DomainError::not_found("order", format!("{email}/{order_id}")))?;
        let order: Order = serde_json::from_value(removed)?;

        self.record(EventType::OrderDeleted, &order, correlation_id)
            .await;
        Ok(order)
    }

    /// Appends the audit event for a confirmed mutation, best-effort.
    /// The order's own customer email is the actor.
    async fn record(&self, event_type: EventType, order: &Order, correlation_id: CorrelationId) {
        let payload = OrderEventPayload {
            product_ids: order.product_ids.clone(),
            total: order.total,
        };

        if let Err(err) = self
            .recorder
            .record(
                EntityType::Order,
                &order.id,
                event_type,
                &order.email,
                correlation_id,
                &payload,
            )
            .await
        {
            tracing::warn!(order_id = %order.id, error = %err, "order audit event not recorded");
        }
    }
}
