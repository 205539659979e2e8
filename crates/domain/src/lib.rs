//! Business operations for the catalog and ordering system.
//!
//! This crate provides:
//! - Product catalog data model and operations (list, fetch, create,
//!   update, delete)
//! - Order data model and operations (list, create, delete)
//! - The domain error taxonomy mapped to HTTP statuses at the API
//!   boundary
//!
//! Services are generic over the [`entity_store::EntityStore`] and
//! [`audit::EventSink`] seams and receive their handles by constructor
//! injection; there is no module-scope client state. Every successful
//! mutation records one audit event, best-effort.

pub mod error;
pub mod order;
pub mod product;

pub use error::DomainError;
pub use order::{Order, OrderDraft, OrderFilter, OrderService, OrderStatus, PaymentMethod};
pub use product::{Product, ProductDraft, ProductService};
