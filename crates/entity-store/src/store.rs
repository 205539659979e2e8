use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A stored item. Items are schemaless JSON documents; typed views live
/// in the domain layer.
pub type Item = serde_json::Value;

/// Composite address of an item: a partition key plus an optional sort
/// key. Items sharing a partition can be retrieved together with
/// [`EntityStore::query`], ordered by sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Groups related items.
    pub partition: String,

    /// Orders items within a partition. Absent for entities addressed by
    /// partition key alone.
    pub sort: Option<String>,
}

impl Key {
    /// Creates a key with only a partition component.
    pub fn partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    /// Creates a composite key.
    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sort {
            Some(sort) => write!(f, "{}/{}", self.partition, sort),
            None => write!(f, "{}", self.partition),
        }
    }
}

/// Precondition attached to a [`EntityStore::put`].
///
/// Conditional writes are the only cross-request coordination the system
/// relies on: creation uses [`WriteCondition::MustNotExist`] so two
/// concurrent creates on the same key cannot silently overwrite each
/// other, and updates use [`WriteCondition::MustExist`] so a concurrent
/// delete surfaces as a failed condition instead of a resurrected item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteCondition {
    /// Write unconditionally, replacing any existing item.
    #[default]
    Unconditional,

    /// Fail with `ConditionFailed` if an item already exists at the key.
    MustNotExist,

    /// Fail with `ConditionFailed` if no item exists at the key.
    MustExist,
}

/// Core trait for entity store implementations.
///
/// All implementations must be thread-safe (Send + Sync); every method
/// may be called concurrently with any other on the same key.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Retrieves the item at `key`, or `None` if absent.
    async fn get(&self, key: &Key) -> Result<Option<Item>>;

    /// Writes `item` at `key`, subject to `condition`.
    ///
    /// Fails with [`StoreError::ConditionFailed`](crate::StoreError) when
    /// the condition does not hold; the stored state is unchanged in that
    /// case.
    async fn put(&self, key: Key, item: Item, condition: WriteCondition) -> Result<()>;

    /// Removes and returns the item at `key`, or `None` if absent.
    async fn delete(&self, key: &Key) -> Result<Option<Item>>;

    /// Retrieves all items in a partition, ordered by sort key.
    async fn query(&self, partition: &str) -> Result<Vec<Item>>;

    /// Retrieves every item in the store.
    async fn scan(&self) -> Result<Vec<Item>>;
}
