//! Explicit route table and dispatch.
//!
//! Routing is an ordered table of (method, path pattern) entries
//! matched by plain segment comparison; there is no framework wiring
//! behind it. A route that declares a schema has that schema applied in
//! full before its handler runs.

use std::collections::HashMap;

use axum::Json;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use audit::EventSink;
use common::RequestContext;
use entity_store::EntityStore;

use crate::AppState;
use crate::routes;
use crate::schema::{self, ORDER_CREATE_SCHEMA, ORDER_DELETE_PARAMS, PRODUCT_SCHEMA, Schema};

/// A transport-normalized inbound request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub context: RequestContext,
}

impl ApiRequest {
    /// Creates a request with no query, body, or special context.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            body: None,
            context: RequestContext::new("anonymous"),
        }
    }

    /// Attaches a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a query parameter.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }
}

/// Status code plus optional JSON body, shaped by the router from a
/// handler result or failure.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Creates a response with a JSON body.
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// 404 with a descriptive message.
    pub fn not_found(message: &str) -> Self {
        Self::json(StatusCode::NOT_FOUND, json!({"error": message}))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path template of literal and `{param}` segments.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a template such as `/products/{id}`.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                match part
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(part.to_string()),
                }
            })
            .collect();
        Self { segments }
    }

    /// Matches a concrete path, extracting `{param}` values.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }
}

/// Handler a matched route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    ListProducts,
    FetchProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    ListOrders,
    CreateOrder,
    DeleteOrder,
}

/// One entry in the route table.
pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub body_schema: Option<&'static Schema>,
    pub param_schema: Option<&'static Schema>,
    pub target: RouteTarget,
}

impl Route {
    fn new(method: Method, pattern: &str, target: RouteTarget) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            body_schema: None,
            param_schema: None,
            target,
        }
    }

    fn body_schema(mut self, schema: &'static Schema) -> Self {
        self.body_schema = Some(schema);
        self
    }

    fn param_schema(mut self, schema: &'static Schema) -> Self {
        self.param_schema = Some(schema);
        self
    }
}

/// The ordered route table.
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds the system's route table.
    pub fn standard() -> Self {
        use RouteTarget::*;

        Self {
            routes: vec![
                Route::new(Method::GET, "/products", ListProducts),
                Route::new(Method::GET, "/products/{id}", FetchProduct),
                Route::new(Method::POST, "/products", CreateProduct).body_schema(&PRODUCT_SCHEMA),
                Route::new(Method::PUT, "/products/{id}", UpdateProduct)
                    .body_schema(&PRODUCT_SCHEMA),
                Route::new(Method::DELETE, "/products/{id}", DeleteProduct),
                Route::new(Method::GET, "/orders", ListOrders),
                Route::new(Method::POST, "/orders", CreateOrder).body_schema(&ORDER_CREATE_SCHEMA),
                Route::new(Method::DELETE, "/orders", DeleteOrder)
                    .param_schema(&ORDER_DELETE_PARAMS),
            ],
        }
    }

    /// Finds the first route matching the method and path.
    pub fn match_route(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&Route, HashMap<String, String>)> {
        self.routes.iter().find_map(|route| {
            if route.method != *method {
                return None;
            }
            route.pattern.matches(path).map(|params| (route, params))
        })
    }

    /// Routes one request: match, validate, invoke, shape the response.
    pub async fn dispatch<S, E>(&self, state: &AppState<S, E>, request: ApiRequest) -> ApiResponse
    where
        S: EntityStore,
        E: EventSink + Clone,
    {
        let Some((route, path_params)) = self.match_route(&request.method, &request.path) else {
            return ApiResponse::not_found("no route matches the request");
        };

        if let Some(schema) = route.body_schema {
            let body = request.body.clone().unwrap_or(Value::Null);
            if let Err(violations) = schema::validate(schema, &body) {
                return crate::error::ApiError::Validation(violations).into();
            }
        }
        if let Some(schema) = route.param_schema {
            if let Err(violations) = schema::validate_params(schema, &request.query) {
                return crate::error::ApiError::Validation(violations).into();
            }
        }

        let result = match route.target {
            RouteTarget::ListProducts => routes::products::list(state).await,
            RouteTarget::FetchProduct => routes::products::fetch(state, &path_params).await,
            RouteTarget::CreateProduct => routes::products::create(state, &request).await,
            RouteTarget::UpdateProduct => {
                routes::products::update(state, &path_params, &request).await
            }
            RouteTarget::DeleteProduct => {
                routes::products::delete(state, &path_params, &request).await
            }
            RouteTarget::ListOrders => routes::orders::list(state, &request).await,
            RouteTarget::CreateOrder => routes::orders::create(state, &request).await,
            RouteTarget::DeleteOrder => routes::orders::delete(state, &request).await,
        };

        result.unwrap_or_else(ApiResponse::from)
    }
}
