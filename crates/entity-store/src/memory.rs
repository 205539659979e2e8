use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{EntityStore, Item, Key, WriteCondition},
};

/// In-memory entity store used by tests and the default server binary.
///
/// Items live in a `BTreeMap` keyed by [`Key`], so partition queries come
/// back ordered by sort key the same way the production store orders them.
/// Clones share the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    items: Arc<RwLock<BTreeMap<Key, Item>>>,
}

impl InMemoryEntityStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of items stored.
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Clears all items.
    pub async fn clear(&self) {
        self.items.write().await.clear();
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn get(&self, key: &Key) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(key).cloned())
    }

    async fn put(&self, key: Key, item: Item, condition: WriteCondition) -> Result<()> {
        let mut items = self.items.write().await;
        let occupied = items.contains_key(&key);

        match condition {
            WriteCondition::MustNotExist if occupied => {
                return Err(StoreError::ConditionFailed { key });
            }
            WriteCondition::MustExist if !occupied => {
                return Err(StoreError::ConditionFailed { key });
            }
            _ => {}
        }

        items.insert(key, item);
        Ok(())
    }

    async fn delete(&self, key: &Key) -> Result<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.remove(key))
    }

    async fn query(&self, partition: &str) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|(key, _)| key.partition == partition)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn scan(&self) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items.values().cloned().collect())
    }
}
