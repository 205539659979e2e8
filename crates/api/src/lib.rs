//! HTTP routing and validation layer for the catalog and ordering
//! system.
//!
//! The core of this crate is transport-neutral: an explicit route table
//! ([`router::RouteTable`]) matched by method and path pattern, with
//! schema validation applied before any handler runs. axum provides the
//! thin adapter around it — every catalog/order request flows through a
//! single fallback handler that normalizes the request and hands it to
//! the table; only `/health` and `/metrics` are wired natively.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod schema;

use std::collections::HashMap;
use std::sync::Arc;

use audit::{EventRecorder, EventSink, InMemoryEventSink, RetryWorker};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use common::{CorrelationId, RequestContext};
use domain::{OrderService, ProductService};
use entity_store::{EntityStore, InMemoryEntityStore};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use error::ApiError;
use router::{ApiRequest, ApiResponse, RouteTable};

/// Shared application state accessible from all handlers.
pub struct AppState<S, E>
where
    S: EntityStore,
    E: EventSink + Clone,
{
    pub products: ProductService<S, E>,
    pub orders: OrderService<S, E>,
    pub routes: RouteTable,
}

/// Creates the Axum application router wrapping the route table.
pub fn create_app<S, E>(state: Arc<AppState<S, E>>, metrics_handle: PrometheusHandle) -> Router
where
    S: EntityStore + Clone + 'static,
    E: EventSink + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .fallback(dispatch::<S, E>)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires services over the given stores and event sink.
///
/// Returns the shared state and the audit retry worker; spawn the
/// worker on the runtime so failed audit appends get retried.
pub fn create_state<S, E>(
    product_store: S,
    order_store: S,
    sink: E,
) -> (Arc<AppState<S, E>>, RetryWorker<E>)
where
    S: EntityStore + Clone,
    E: EventSink + Clone,
{
    let (recorder, retry_worker) = EventRecorder::with_retry(sink);
    let products = ProductService::new(product_store, recorder.clone());
    let orders = OrderService::new(order_store, products.clone(), recorder);
    let state = Arc::new(AppState {
        products,
        orders,
        routes: RouteTable::standard(),
    });
    (state, retry_worker)
}

/// Creates application state over in-memory stores, for the default
/// server binary and tests. Also returns the sink so tests can inspect
/// the recorded audit trail.
pub fn create_default_state() -> (
    Arc<AppState<InMemoryEntityStore, InMemoryEventSink>>,
    RetryWorker<InMemoryEventSink>,
    InMemoryEventSink,
) {
    let sink = InMemoryEventSink::new();
    let (state, retry_worker) = create_state(
        InMemoryEntityStore::new(),
        InMemoryEntityStore::new(),
        sink.clone(),
    );
    (state, retry_worker, sink)
}

/// Transport adapter: normalizes the axum request and hands it to the
/// route table.
async fn dispatch<S, E>(
    State(state): State<Arc<AppState<S, E>>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: EntityStore + Clone + 'static,
    E: EventSink + Clone + 'static,
{
    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(value) => Some(value),
            Err(_) => {
                let error =
                    ApiError::BadRequest("request body is not valid JSON".to_string());
                return ApiResponse::from(error).into_response();
            }
        }
    };

    let request = ApiRequest {
        method,
        path: uri.path().to_string(),
        query,
        body,
        context: request_context(&headers),
    };

    state.routes.dispatch(&state, request).await.into_response()
}

/// Builds the request context from transport headers.
///
/// Authentication is applied upstream of this service, so the adapter
/// trusts the identity header it is handed; without one the actor is
/// `anonymous`. The correlation ID is taken from `x-request-id` when it
/// parses as a UUID, else freshly generated.
fn request_context(headers: &HeaderMap) -> RequestContext {
    let actor_email = headers
        .get("x-caller-email")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous");

    let correlation_id = headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<uuid::Uuid>().ok())
        .map(CorrelationId::from_uuid)
        .unwrap_or_default();

    RequestContext::with_correlation(actor_email, correlation_id)
}
