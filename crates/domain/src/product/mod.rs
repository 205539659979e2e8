//! Product catalog data model and operations.

mod service;

use entity_store::Key;
use serde::{Deserialize, Serialize};

pub use service::ProductService;

/// A catalog product.
///
/// Keyed in the store by `id`. The id is the caller-supplied `code`:
/// since the product schema requires a code, the conditional insert on
/// the id key doubles as the guarantee that an existing code is never
/// silently overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub product_name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    pub price: f64,
}

impl Product {
    /// Store key for a product id.
    pub fn key(id: &str) -> Key {
        Key::partition(id)
    }

    /// Builds a product from a validated creation body.
    pub fn from_draft(draft: ProductDraft) -> Self {
        Self {
            id: draft.code.clone(),
            product_name: draft.product_name,
            code: draft.code,
            model: draft.model,
            product_url: draft.product_url,
            price: draft.price.unwrap_or(0.0),
        }
    }

    /// Applies an update body on top of this product.
    ///
    /// Required fields are replaced; optional fields absent from the
    /// body keep their stored values. The id never changes.
    pub fn merged(self, draft: ProductDraft) -> Self {
        Self {
            id: self.id,
            product_name: draft.product_name,
            code: draft.code,
            model: draft.model.or(self.model),
            product_url: draft.product_url.or(self.product_url),
            price: draft.price.unwrap_or(self.price),
        }
    }
}

/// Validated product creation/update body.
///
/// Deserialized only after the request passed the product schema, so
/// required fields are present and typed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub product_name: String,
    pub code: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(code: &str, price: Option<f64>) -> ProductDraft {
        ProductDraft {
            product_name: "Table".to_string(),
            code: code.to_string(),
            model: None,
            product_url: None,
            price,
        }
    }

    #[test]
    fn draft_without_explicit_id_uses_code() {
        let product = Product::from_draft(draft("T-01", Some(150.0)));
        assert_eq!(product.id, "T-01");
        assert_eq!(product.code, "T-01");
        assert_eq!(product.price, 150.0);
    }

    #[test]
    fn draft_without_price_defaults_to_zero() {
        let product = Product::from_draft(draft("T-01", None));
        assert_eq!(product.price, 0.0);
    }

    #[test]
    fn merge_keeps_id_and_absent_optionals() {
        let mut original = Product::from_draft(draft("T-01", Some(150.0)));
        original.model = Some("v1".to_string());

        let merged = original.merged(ProductDraft {
            product_name: "Bigger table".to_string(),
            code: "T-01".to_string(),
            model: None,
            product_url: Some("https://example.com/t01".to_string()),
            price: Some(199.0),
        });

        assert_eq!(merged.id, "T-01");
        assert_eq!(merged.product_name, "Bigger table");
        assert_eq!(merged.model.as_deref(), Some("v1"));
        assert_eq!(merged.product_url.as_deref(), Some("https://example.com/t01"));
        assert_eq!(merged.price, 199.0);
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_optionals() {
        let product = Product::from_draft(draft("T-01", Some(150.0)));
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["productName"], "Table");
        assert!(value.get("model").is_none());
        assert!(value.get("productUrl").is_none());
    }
}
