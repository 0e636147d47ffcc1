// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! HTTP surface: route table, permissive CORS, and the per-request
//! deadline. Handlers live in the per-domain modules.

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};

pub mod analytics;
pub mod categories;
pub mod error;
pub mod items;
pub mod params;

pub use error::ApiError;

use crate::service::Ledger;

/// Builds the full application router over a [`Ledger`].
pub fn router(ledger: Ledger, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/api/items", get(items::list).post(items::create))
        .route(
            "/api/items/{id}",
            get(items::get).put(items::update).delete(items::delete),
        )
        .route("/api/analytics/sum", get(analytics::sum))
        .route("/api/analytics/avg", get(analytics::avg))
        .route("/api/analytics/count", get(analytics::count))
        .route("/api/analytics/median", get(analytics::median))
        .route("/api/analytics/percentile", get(analytics::percentile))
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            deadline(request_timeout, req, next)
        }))
        // Added last so it wraps everything, deadline included.
        .layer(middleware::from_fn(cors))
        .with_state(ledger)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Bounds each request; an expired deadline answers 408.
async fn deadline(timeout: Duration, req: Request, next: Next) -> Response {
    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => ApiError::timeout().into_response(),
    }
}

/// Permissive CORS: every response carries the allow headers, and an
/// `OPTIONS` preflight short-circuits with 204.
async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Origin, Content-Type, Authorization"),
    );
    response
}
