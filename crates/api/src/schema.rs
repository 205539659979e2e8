//! Schema-as-data request validation.
//!
//! Each route that accepts a body or requires query parameters declares
//! a [`Schema`]: a list of field specs interpreted by one generic
//! [`validate`] routine. Validation runs in full before any handler
//! executes and reports every violated field, not just the first.

use std::collections::HashMap;

use serde_json::Value;

/// Type/enum constraint for one field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Any JSON string.
    String,
    /// A non-negative JSON number.
    Number,
    /// A JSON array of strings with a minimum length.
    StringArray { min_items: usize },
    /// A string drawn from a fixed set.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "non-negative number",
            FieldKind::StringArray { .. } => "array of string",
            FieldKind::Enum(_) => "string",
        }
    }
}

/// Constraint on one named field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

/// A named set of field constraints for a request body or parameter set.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingField {
        field: &'static str,
    },
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    NotInEnum {
        field: &'static str,
        allowed: &'static [&'static str],
    },
    TooFewItems {
        field: &'static str,
        min_items: usize,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingField { field } => {
                write!(f, "{field}: required field is missing")
            }
            Violation::WrongType { field, expected } => {
                write!(f, "{field}: expected {expected}")
            }
            Violation::NotInEnum { field, allowed } => {
                write!(f, "{field}: must be one of {}", allowed.join(", "))
            }
            Violation::TooFewItems { field, min_items } => {
                write!(f, "{field}: must contain at least {min_items} item(s)")
            }
        }
    }
}

/// Request body schema for product creation and update.
pub static PRODUCT_SCHEMA: Schema = Schema {
    name: "product",
    fields: &[
        FieldSpec {
            name: "productName",
            required: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "code",
            required: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "model",
            required: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "productUrl",
            required: false,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "price",
            required: false,
            kind: FieldKind::Number,
        },
    ],
};

/// Request body schema for order creation.
pub static ORDER_CREATE_SCHEMA: Schema = Schema {
    name: "order-creation",
    fields: &[
        FieldSpec {
            name: "email",
            required: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "productIds",
            required: true,
            kind: FieldKind::StringArray { min_items: 1 },
        },
        FieldSpec {
            name: "payment",
            required: true,
            kind: FieldKind::Enum(&["CASH", "DEBIT_CARD", "CREDIT_CARD"]),
        },
    ],
};

/// Query parameter set for order deletion. Both parameters must be
/// present; absence of either is a validation failure, not a store
/// lookup.
pub static ORDER_DELETE_PARAMS: Schema = Schema {
    name: "order-deletion",
    fields: &[
        FieldSpec {
            name: "email",
            required: true,
            kind: FieldKind::String,
        },
        FieldSpec {
            name: "orderId",
            required: true,
            kind: FieldKind::String,
        },
    ],
};

/// Checks a parsed request body against a schema.
///
/// Pure; returns every violation. A non-object body reports each
/// required field as missing.
pub fn validate(schema: &Schema, body: &Value) -> Result<(), Vec<Violation>> {
    let object = body.as_object();
    let mut violations = Vec::new();

    for spec in schema.fields {
        let value = object.and_then(|fields| fields.get(spec.name));
        match value {
            None | Some(Value::Null) => {
                if spec.required {
                    violations.push(Violation::MissingField { field: spec.name });
                }
            }
            Some(value) => check_kind(spec, value, &mut violations),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Checks a query-parameter set against a schema. Parameters are
/// strings by construction, so this is the same machinery applied to a
/// synthesized object.
pub fn validate_params(
    schema: &Schema,
    params: &HashMap<String, String>,
) -> Result<(), Vec<Violation>> {
    let object = params
        .iter()
        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
        .collect::<serde_json::Map<_, _>>();
    validate(schema, &Value::Object(object))
}

fn check_kind(spec: &FieldSpec, value: &Value, violations: &mut Vec<Violation>) {
    match &spec.kind {
        FieldKind::String => {
            if !value.is_string() {
                violations.push(Violation::WrongType {
                    field: spec.name,
                    expected: spec.kind.expected(),
                });
            }
        }
        FieldKind::Number => {
            match value.as_f64() {
                Some(number) if number >= 0.0 => {}
                _ => violations.push(Violation::WrongType {
                    field: spec.name,
                    expected: spec.kind.expected(),
                }),
            }
        }
        FieldKind::StringArray { min_items } => match value.as_array() {
            Some(items) => {
                if !items.iter().all(Value::is_string) {
                    violations.push(Violation::WrongType {
                        field: spec.name,
                        expected: spec.kind.expected(),
                    });
                } else if items.len() < *min_items {
                    violations.push(Violation::TooFewItems {
                        field: spec.name,
                        min_items: *min_items,
                    });
                }
            }
            None => violations.push(Violation::WrongType {
                field: spec.name,
                expected: spec.kind.expected(),
            }),
        },
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => {}
            Some(_) => violations.push(Violation::NotInEnum {
                field: spec.name,
                allowed,
            }),
            None => violations.push(Violation::WrongType {
                field: spec.name,
                expected: spec.kind.expected(),
            }),
        },
    }
}
