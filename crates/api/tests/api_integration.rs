//! Integration tests for the API server.
//!
//! Each test drives the full axum application over in-memory stores and
//! inspects the audit sink directly where the behavior under test is
//! the recorded trail.

use std::sync::OnceLock;

use audit::{EventType, InMemoryEventSink};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (Router, InMemoryEventSink) {
    let (state, _retry_worker, sink) = api::create_default_state();
    let app = api::create_app(state, get_metrics_handle());
    (app, sink)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-caller-email", "admin@example.com");
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn table_body() -> Value {
    json!({"productName": "Table", "code": "T-01", "price": 150})
}

async fn seed_product(app: &Router, code: &str, price: f64) {
    let (status, _) = send(
        app,
        "POST",
        "/products",
        Some(json!({"productName": format!("Product {code}"), "code": code, "price": price})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_check() {
    let (app, _) = setup();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn metrics_endpoint_responds() {
    let (app, _) = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_product_then_fetch_it_back() {
    let (app, sink) = setup();

    let (status, created) = send(&app, "POST", "/products", Some(table_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "T-01");
    assert_eq!(created["productName"], "Table");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let events = sink.events_of_type(EventType::ProductCreated).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].partition_key, "#product_T-01");
    assert_eq!(events[0].payload["price"], 150.0);
    assert_eq!(events[0].actor_email, "admin@example.com");
}

#[tokio::test]
async fn create_product_reports_every_violation() {
    let (app, sink) = setup();

    let (status, body) = send(&app, "POST", "/products", Some(json!({"model": "v1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.as_str().unwrap().starts_with("productName")));
    assert!(violations.iter().any(|v| v.as_str().unwrap().starts_with("code")));

    assert_eq!(sink.event_count().await, 0);
}

#[tokio::test]
async fn duplicate_product_code_conflicts() {
    let (app, _) = setup();

    send(&app, "POST", "/products", Some(table_body())).await;
    let (status, _) = send(&app, "POST", "/products", Some(table_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/products")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_missing_product_is_not_found() {
    let (app, _) = setup();
    let (status, _) = send(&app, "GET", "/products/absent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_product_records_post_update_price() {
    let (app, sink) = setup();
    send(&app, "POST", "/products", Some(table_body())).await;

    let (status, updated) = send(
        &app,
        "PUT",
        "/products/T-01",
        Some(json!({"productName": "Table", "code": "T-01", "price": 199.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 199.5);

    let events = sink.events_of_type(EventType::ProductUpdated).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload["price"], 199.5);
}

#[tokio::test]
async fn update_missing_product_is_not_found() {
    let (app, _) = setup();
    let (status, _) = send(&app, "PUT", "/products/absent", Some(table_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_product_twice_emits_one_event() {
    let (app, sink) = setup();
    send(&app, "POST", "/products", Some(table_body())).await;

    let (status, removed) = send(&app, "DELETE", "/products/T-01", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["code"], "T-01");

    let (status, _) = send(&app, "DELETE", "/products/T-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let events = sink.events_of_type(EventType::ProductDeleted).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn create_order_totals_current_prices() {
    let (app, sink) = setup();
    seed_product(&app, "T-01", 150.0).await;
    seed_product(&app, "C-01", 49.5).await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "email": "a@example.com",
            "productIds": ["T-01", "C-01"],
            "payment": "CREDIT_CARD"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total"], 199.5);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["email"], "a@example.com");

    let events = sink.events_of_type(EventType::OrderCreated).await;
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].partition_key,
        format!("#order_{}", order["id"].as_str().unwrap())
    );
    assert_eq!(events[0].payload["productIds"], json!(["T-01", "C-01"]));
    assert_eq!(events[0].payload["total"], 199.5);
    assert_eq!(events[0].actor_email, "a@example.com");
}

#[tokio::test]
async fn order_with_unknown_product_leaves_no_trace() {
    let (app, sink) = setup();
    seed_product(&app, "T-01", 150.0).await;

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "email": "a@example.com",
            "productIds": ["T-01", "GHOST"],
            "payment": "CASH"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No order was persisted and no order event was produced.
    let (_, orders) = send(&app, "GET", "/orders", None).await;
    assert_eq!(orders, json!([]));
    assert!(sink.events_of_type(EventType::OrderCreated).await.is_empty());
}

#[tokio::test]
async fn order_creation_validates_body() {
    let (app, _) = setup();

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"email": "a@example.com", "productIds": [], "payment": "CASH"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["violations"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"email": "a@example.com", "productIds": ["T-01"], "payment": "BITCOIN"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_orders_supports_filters() {
    let (app, _) = setup();
    seed_product(&app, "T-01", 150.0).await;

    let order_body = |email: &str| {
        json!({"email": email, "productIds": ["T-01"], "payment": "CASH"})
    };
    let (_, first) = send(&app, "POST", "/orders", Some(order_body("a@example.com"))).await;
    send(&app, "POST", "/orders", Some(order_body("a@example.com"))).await;
    send(&app, "POST", "/orders", Some(order_body("b@example.com"))).await;

    let (status, all) = send(&app, "GET", "/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, for_a) = send(&app, "GET", "/orders?email=a@example.com", None).await;
    assert_eq!(for_a.as_array().unwrap().len(), 2);

    let first_id = first["id"].as_str().unwrap();
    let (status, exact) = send(
        &app,
        "GET",
        &format!("/orders?email=a@example.com&orderId={first_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exact.as_array().unwrap().len(), 1);
    assert_eq!(exact[0]["id"], *first_id);

    let (status, _) = send(
        &app,
        "GET",
        "/orders?email=a@example.com&orderId=no-such-order",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_deletion_requires_both_parameters() {
    let (app, sink) = setup();
    seed_product(&app, "T-01", 150.0).await;

    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"email": "a@example.com", "productIds": ["T-01"], "payment": "CASH"})),
    )
    .await;

    // Email alone is a validation failure, not a store lookup.
    let (status, body) = send(&app, "DELETE", "/orders?email=a@example.com", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["violations"], json!(["orderId: required field is missing"]));

    // The order is untouched and no deletion event was recorded.
    let (_, orders) = send(&app, "GET", "/orders?email=a@example.com", None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert!(sink.events_of_type(EventType::OrderDeleted).await.is_empty());

    let order_id = order["id"].as_str().unwrap();
    let (status, removed) = send(
        &app,
        "DELETE",
        &format!("/orders?email=a@example.com&orderId={order_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], *order_id);

    let events = sink.events_of_type(EventType::OrderDeleted).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn delete_missing_order_is_not_found() {
    let (app, _) = setup();
    let (status, _) = send(
        &app,
        "DELETE",
        "/orders?email=a@example.com&orderId=no-such-order",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let (app, _) = setup();

    let (status, _) = send(&app, "GET", "/invoices", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "PATCH", "/products/T-01", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_event_expires_five_minutes_after_creation() {
    let (app, sink) = setup();
    seed_product(&app, "T-01", 150.0).await;
    seed_product(&app, "C-01", 20.0).await;
    send(
        &app,
        "PUT",
        "/products/T-01",
        Some(json!({"productName": "Table", "code": "T-01", "price": 180})),
    )
    .await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({"email": "a@example.com", "productIds": ["T-01"], "payment": "DEBIT_CARD"})),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();
    send(
        &app,
        "DELETE",
        &format!("/orders?email=a@example.com&orderId={order_id}"),
        None,
    )
    .await;
    send(&app, "DELETE", "/products/C-01", None).await;

    let events = sink.events().await;
    assert_eq!(events.len(), 6);
    for event in events {
        assert_eq!(event.expires_at, event.created_at / 1000 + 300);
        assert_eq!(
            event.sort_key,
            format!("{}#{}", event.event_type.as_str(), event.created_at)
        );
    }
}
