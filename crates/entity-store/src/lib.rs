//! Key-value persistence contract for the catalog and ordering system.
//!
//! Entities are stored as schemaless JSON items addressed by a partition
//! key and an optional sort key. The store is consumed through the
//! [`EntityStore`] trait; the production engine lives behind this seam
//! and is not part of this workspace. An in-memory implementation backs
//! tests and the default server binary.

pub mod error;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryEntityStore;
pub use store::{EntityStore, Item, Key, WriteCondition};
