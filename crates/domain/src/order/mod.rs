//! Order data model and operations.

mod service;

use chrono::{DateTime, Utc};
use entity_store::Key;
use serde::{Deserialize, Serialize};

pub use service::{OrderFilter, OrderService};

/// How an order is paid. Closed set; anything else fails validation
/// before reaching the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
}

/// Order lifecycle state. Orders are created `Pending`; the remaining
/// states belong to fulfillment flows outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
}

/// A customer order.
///
/// Keyed in the store by partition = customer email, sort = order id,
/// so one customer's orders are a single partition query and a specific
/// order is a composite-key get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub email: String,
    pub product_ids: Vec<String>,
    pub payment: PaymentMethod,
    pub status: OrderStatus,
    /// Sum of the referenced products' prices at creation time. Later
    /// price changes do not alter existing orders.
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Store key for an order.
    pub fn key(email: &str, id: &str) -> Key {
        Key::composite(email, id)
    }
}

/// Validated order creation body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub email: String,
    pub product_ids: Vec<String>,
    pub payment: PaymentMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::DebitCard).unwrap(),
            "DEBIT_CARD"
        );
        let parsed: PaymentMethod = serde_json::from_str("\"CASH\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cash);
    }

    #[test]
    fn unknown_payment_method_rejected() {
        let parsed: Result<PaymentMethod, _> = serde_json::from_str("\"BITCOIN\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn order_key_is_email_plus_id() {
        let key = Order::key("a@example.com", "order-1");
        assert_eq!(key.partition, "a@example.com");
        assert_eq!(key.sort.as_deref(), Some("order-1"));
    }
}
