//! Product operations against the entity store.

use audit::{EntityType, EventRecorder, EventSink, EventType, ProductEventPayload};
use common::RequestContext;
use entity_store::{EntityStore, StoreError, WriteCondition};

use crate::error::DomainError;

use super::{Product, ProductDraft};

/// Service for managing catalog products.
///
/// Holds its own store handle (the product table) and a recorder for
/// the audit trail. Mutations are atomic at the single-entity level:
/// the store write either happens under its condition or the operation
/// fails; the audit append follows a confirmed write and is never
/// allowed to undo it.
#[derive(Clone)]
pub struct ProductService<S, E>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    store: S,
    recorder: EventRecorder<E>,
}

impl<S, E> ProductService<S, E>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    /// Creates a new product service with the given store and recorder.
    pub fn new(store: S, recorder: EventRecorder<E>) -> Self {
        Self { store, recorder }
    }

    /// Returns all products in the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let items = self.store.scan().await?;
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(DomainError::from))
            .collect()
    }

    /// Returns the product with the given id.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, id: &str) -> Result<Product, DomainError> {
        let item = self
            .store
            .get(&Product::key(id))
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        Ok(serde_json::from_value(item)?)
    }

    /// Creates a product from a validated body.
    ///
    /// The insert is conditional on the id being free, so a concurrent
    /// create on the same code loses with a conflict instead of
    /// overwriting.
    #[tracing::instrument(skip(self, draft, ctx), fields(code = %draft.code))]
    pub async fn create(
        &self,
        draft: ProductDraft,
        ctx: &RequestContext,
    ) -> Result<Product, DomainError> {
        let product = Product::from_draft(draft);
        let item = serde_json::to_value(&product)?;

        match self
            .store
            .put(Product::key(&product.id), item, WriteCondition::MustNotExist)
            .await
        {
            Err(StoreError::ConditionFailed { .. }) => {
                return Err(DomainError::Conflict {
                    entity: "product",
                    key: product.id,
                });
            }
            result => result?,
        }

        self.record(EventType::ProductCreated, &product, ctx).await;
        Ok(product)
    }

    /// Replaces the product at `id` with the merged fields of the
    /// stored product and a validated body.
    #[tracing::instrument(skip(self, draft, ctx))]
    pub async fn update(
        &self,
        id: &str,
        draft: ProductDraft,
        ctx: &RequestContext,
    ) -> Result<Product, DomainError> {
        let existing = self.fetch(id).await?;
        let updated = existing.merged(draft);
        let item = serde_json::to_value(&updated)?;

        // A concurrent delete between the fetch and the write surfaces
        // as a failed condition, not a resurrected product.
        match self
            .store
            .put(Product::key(id), item, WriteCondition::MustExist)
            .await
        {
            Err(StoreError::ConditionFailed { .. }) => {
                return Err(DomainError::not_found("product", id));
            }
            result => result?,
        }

        self.record(EventType::ProductUpdated, &updated, ctx).await;
        Ok(updated)
    }

    /// Removes and returns the product at `id`.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn delete(&self, id: &str, ctx: &RequestContext) -> Result<Product, DomainError> {
        let removed = self
            .store
            .delete(&Product::key(id))
            .await?
            .ok_or_else(|| DomainError::not_found("product", id))?;
        let product: Product = serde_json::from_value(removed)?;

        self.record(EventType::ProductDeleted, &product, ctx).await;
        Ok(product)
    }

    /// Appends the audit event for a confirmed mutation, best-effort.
    async fn record(&self, event_type: EventType, product: &Product, ctx: &RequestContext) {
        let payload = ProductEventPayload {
            product_id: product.id.clone(),
            price: product.price,
        };

        if let Err(err) = self
            .recorder
            .record(
                EntityType::Product,
                &product.code,
                event_type,
                &ctx.actor_email,
                ctx.correlation_id,
                &payload,
            )
            .await
        {
            tracing::warn!(code = %product.code, error = %err, "product audit event not recorded");
        }
    }
}
