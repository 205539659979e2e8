//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use domain::DomainError;
use serde_json::json;

use crate::router::ApiResponse;
use crate::schema::Violation;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body or parameters failed schema validation.
    Validation(Vec<Violation>),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(violations) => {
                let detail: Vec<String> = violations.iter().map(Violation::to_string).collect();
                ApiResponse::json(
                    StatusCode::BAD_REQUEST,
                    json!({"error": "validation failed", "violations": detail}),
                )
            }
            ApiError::BadRequest(message) => {
                ApiResponse::json(StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "internal server error");
                ApiResponse::json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "internal server error"}),
                )
            }
        }
    }
}

fn domain_error_to_response(err: DomainError) -> ApiResponse {
    let status = match &err {
        DomainError::NotFound { .. } | DomainError::InvalidReference { .. } => {
            StatusCode::NOT_FOUND
        }
        DomainError::Conflict { .. } => StatusCode::CONFLICT,
        DomainError::Store(_) | DomainError::Serialization(_) => {
            // Store detail stays in the logs; the caller only learns the
            // primary write failed.
            tracing::error!(error = %err, "store failure surfaced to caller");
            return ApiResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "internal server error"}),
            );
        }
    };

    ApiResponse::json(status, json!({"error": err.to_string()}))
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
