//! Order endpoints.

use audit::EventSink;
use axum::http::StatusCode;
use domain::{OrderDraft, OrderFilter};
use entity_store::EntityStore;

use crate::AppState;
use crate::error::ApiError;
use crate::router::{ApiRequest, ApiResponse};

use super::parse_body;

/// GET /orders — list orders, optionally narrowed by `email` and/or
/// `orderId` query parameters.
pub async fn list<S, E>(
    state: &AppState<S, E>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let filter = OrderFilter {
        email: request.query.get("email").cloned(),
        order_id: request.query.get("orderId").cloned(),
    };
    let orders = state.orders.list(filter).await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(orders)?,
    ))
}

/// POST /orders — create an order from a validated body.
pub async fn create<S, E>(
    state: &AppState<S, E>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let draft: OrderDraft = parse_body(request)?;
    let order = state
        .orders
        .create(draft, request.context.correlation_id)
        .await?;
    Ok(ApiResponse::json(
        StatusCode::CREATED,
        serde_json::to_value(order)?,
    ))
}

/// DELETE /orders — remove an order addressed by the `email` and
/// `orderId` query parameters, returning it. The validator has already
/// guaranteed both parameters are present.
pub async fn delete<S, E>(
    state: &AppState<S, E>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let email = request
        .query
        .get("email")
        .ok_or_else(|| ApiError::Internal("validated email parameter missing".to_string()))?;
    let order_id = request
        .query
        .get("orderId")
        .ok_or_else(|| ApiError::Internal("validated orderId parameter missing".to_string()))?;

    let order = state
        .orders
        .delete(email, order_id, request.context.correlation_id)
        .await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(order)?,
    ))
}
