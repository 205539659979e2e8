//! Product catalog endpoints.

use std::collections::HashMap;

use audit::EventSink;
use axum::http::StatusCode;
use domain::ProductDraft;
use entity_store::EntityStore;

use crate::AppState;
use crate::error::ApiError;
use crate::router::{ApiRequest, ApiResponse};

use super::parse_body;

fn path_id(params: &HashMap<String, String>) -> Result<&str, ApiError> {
    params
        .get("id")
        .map(String::as_str)
        .ok_or_else(|| ApiError::Internal("route pattern missing id parameter".to_string()))
}

/// GET /products — list the whole catalog.
pub async fn list<S, E>(state: &AppState<S, E>) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let products = state.products.list().await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(products)?,
    ))
}

/// GET /products/{id} — fetch one product.
pub async fn fetch<S, E>(
    state: &AppState<S, E>,
    params: &HashMap<String, String>,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let product = state.products.fetch(path_id(params)?).await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(product)?,
    ))
}

/// POST /products — create a product from a validated body.
pub async fn create<S, E>(
    state: &AppState<S, E>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let draft: ProductDraft = parse_body(request)?;
    let product = state.products.create(draft, &request.context).await?;
    Ok(ApiResponse::json(
        StatusCode::CREATED,
        serde_json::to_value(product)?,
    ))
}

/// PUT /products/{id} — update an existing product.
pub async fn update<S, E>(
    state: &AppState<S, E>,
    params: &HashMap<String, String>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let draft: ProductDraft = parse_body(request)?;
    let product = state
        .products
        .update(path_id(params)?, draft, &request.context)
        .await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(product)?,
    ))
}

/// DELETE /products/{id} — remove a product, returning it.
pub async fn delete<S, E>(
    state: &AppState<S, E>,
    params: &HashMap<String, String>,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    let product = state
        .products
        .delete(path_id(params)?, &request.context)
        .await?;
    Ok(ApiResponse::json(
        StatusCode::OK,
        serde_json::to_value(product)?,
    ))
}
