// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use ledgerd::api;
use ledgerd::db::Db;
use ledgerd::service::Ledger;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let ledger = Ledger::new(Db::open_in_memory().unwrap());
    api::router(ledger, Duration::from_secs(5))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("DELETE")
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn item_body(title: &str, amount: &str, occurred_at: &str) -> Value {
    json!({
        "kind": "expense",
        "title": title,
        "amount": amount,
        "currency": "USD",
        "occurred_at": occurred_at,
    })
}

async fn create_item(app: &Router, body: Value) -> String {
    let (status, value) = send(app, with_json("POST", "/api/items", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    value["id"].as_str().unwrap().to_string()
}

async fn create_category(app: &Router, body: Value) -> String {
    let (status, value) = send(app, with_json("POST", "/api/categories", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, value) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "status": "ok" }));
}

#[tokio::test]
async fn item_create_then_fetch_preserves_every_field() {
    let app = app();
    let id = create_item(
        &app,
        json!({
            "kind": "expense",
            "title": "Lunch",
            "amount": "12.50",
            "currency": "USD",
            "occurred_at": "2024-05-01T12:00:00Z",
            "metadata": { "note": "team lunch" },
        }),
    )
    .await;

    let (status, value) = send(&app, get(&format!("/api/items/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let item = &value["item"];
    assert_eq!(item["id"], json!(id));
    assert_eq!(item["kind"], json!("expense"));
    assert_eq!(item["title"], json!("Lunch"));
    assert_eq!(item["amount"], json!("12.50"));
    assert_eq!(item["currency"], json!("USD"));
    assert_eq!(item["metadata"], json!({ "note": "team lunch" }));
    // No category was given, so the field is absent rather than null.
    assert!(item.get("category_id").is_none());
}

#[tokio::test]
async fn omitted_metadata_is_stored_as_empty_object() {
    let app = app();
    let id = create_item(&app, item_body("Lunch", "12.50", "2024-05-01T12:00:00Z")).await;

    let (_, value) = send(&app, get(&format!("/api/items/{id}"))).await;
    assert_eq!(value["item"]["metadata"], json!({}));
}

#[tokio::test]
async fn analytics_respect_the_category_filter() {
    let app = app();
    let food = create_category(
        &app,
        json!({ "name": "Food", "description": "meals and snacks" }),
    )
    .await;
    let travel = create_category(
        &app,
        json!({ "name": "Travel", "description": "getting around" }),
    )
    .await;

    for (title, amount) in [("Lunch", "12.50"), ("Dinner", "7.50")] {
        let mut body = item_body(title, amount, "2024-05-01T12:00:00Z");
        body["category_id"] = json!(food);
        create_item(&app, body).await;
    }
    let mut body = item_body("Taxi", "30.00", "2024-05-01T13:00:00Z");
    body["category_id"] = json!(travel);
    create_item(&app, body).await;

    let (status, value) = send(&app, get(&format!("/api/analytics/sum?category_id={food}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "sum": "20.00" }));

    let (_, value) = send(&app, get(&format!("/api/analytics/count?category_id={food}"))).await;
    assert_eq!(value, json!({ "count": 2 }));

    let (_, value) = send(&app, get(&format!("/api/analytics/avg?category_id={food}"))).await;
    assert_eq!(value, json!({ "avg": "10.00" }));
}

#[tokio::test]
async fn percentile_interpolates_and_defaults() {
    let app = app();
    for amount in ["1", "2", "3"] {
        create_item(&app, item_body("n", amount, "2024-05-01T12:00:00Z")).await;
    }

    let (_, value) = send(&app, get("/api/analytics/median")).await;
    assert_eq!(value, json!({ "median": "2" }));

    let (_, value) = send(&app, get("/api/analytics/percentile?percentile=0")).await;
    assert_eq!(value, json!({ "percentile": "1" }));

    let (_, value) = send(&app, get("/api/analytics/percentile?percentile=1")).await;
    assert_eq!(value, json!({ "percentile": "3" }));

    let (_, value) = send(&app, get("/api/analytics/percentile?percentile=0.25")).await;
    assert_eq!(value, json!({ "percentile": "1.5" }));

    // Default p is 0.9: h = 0.9 * 2 = 1.8 -> 2 + 0.8 * (3 - 2).
    let (_, value) = send(&app, get("/api/analytics/percentile")).await;
    assert_eq!(value, json!({ "percentile": "2.8" }));
}

#[tokio::test]
async fn category_tree_roundtrip() {
    let app = app();
    let food = create_category(
        &app,
        json!({ "name": "Food", "description": "meals and snacks" }),
    )
    .await;
    let groceries = create_category(
        &app,
        json!({ "name": "Groceries", "description": "supermarket", "parent_id": food }),
    )
    .await;

    let (status, value) = send(&app, get(&format!("/api/categories/{groceries}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["category"]["name"], json!("Groceries"));
    assert_eq!(value["category"]["parent_id"], json!(food));

    let (status, value) = send(&app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn item_update_and_delete_roundtrip() {
    let app = app();
    let id = create_item(&app, item_body("Lunhc", "12.00", "2024-05-01T12:00:00Z")).await;

    let (status, value) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/items/{id}"),
            item_body("Lunch", "12.50", "2024-05-01T12:00:00Z"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "message": "item updated" }));

    let (_, value) = send(&app, get(&format!("/api/items/{id}"))).await;
    assert_eq!(value["item"]["title"], json!("Lunch"));
    assert_eq!(value["item"]["amount"], json!("12.50"));

    let (status, value) = send(&app, delete(&format!("/api/items/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "message": "item deleted" }));

    let (status, value) = send(&app, get(&format!("/api/items/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "item not found" }));
}

#[tokio::test]
async fn future_window_is_empty_not_an_error() {
    let app = app();
    create_item(&app, item_body("Lunch", "12.50", "2024-05-01T12:00:00Z")).await;

    let (status, value) = send(&app, get("/api/analytics/sum?from=2999-01-01T00:00:00Z")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "sum": "0" }));

    let (status, value) = send(&app, get("/api/items?from=2999-01-01T00:00:00Z")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value, json!({ "items": [] }));
}

#[tokio::test]
async fn category_list_is_404_when_empty() {
    let app = app();
    let (status, value) = send(&app, get("/api/categories")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "no categories found" }));
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let app = app();
    let nil = uuid::Uuid::nil();

    let (status, value) = send(&app, get(&format!("/api/categories/{nil}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "category not found" }));

    let (status, value) = send(&app, get(&format!("/api/items/{nil}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "item not found" }));
}

#[tokio::test]
async fn malformed_parameters_are_rejected_with_exact_messages() {
    let app = app();
    let cases = [
        ("/api/items/not-a-uuid", "invalid id"),
        ("/api/items?category_id=xyz", "invalid category_id"),
        ("/api/items?from=yesterday", "invalid time format for from"),
        ("/api/items?to=tomorrow", "invalid time format for to"),
        ("/api/items?limit=two", "invalid int format for limit"),
        ("/api/items?offset=2.5", "invalid int format for offset"),
        ("/api/items?limit=-1", "limit must not be negative"),
        ("/api/analytics/sum?kind=dividend", "invalid kind"),
        (
            "/api/analytics/percentile?percentile=1.5",
            "percentile must be between 0 and 1",
        ),
        (
            "/api/analytics/percentile?percentile=ninety",
            "invalid float format for percentile",
        ),
    ];

    for (uri, message) in cases {
        let (status, value) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(value, json!({ "error": message }), "{uri}");
    }
}

#[tokio::test]
async fn empty_query_values_are_treated_as_absent() {
    let app = app();
    create_item(&app, item_body("Lunch", "12.50", "2024-05-01T12:00:00Z")).await;

    let (status, value) = send(&app, get("/api/items?kind=&from=&limit=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = app();
    let request = Request::builder()
        .uri("/api/items")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, value) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "invalid request body" }));
}

#[tokio::test]
async fn invalid_fields_are_validation_errors() {
    let app = app();
    let cases = [
        (
            json!({ "kind": "dividend", "title": "x", "amount": "1", "currency": "USD",
                     "occurred_at": "2024-05-01T12:00:00Z" }),
            "validation error: invalid kind 'dividend'",
        ),
        (
            json!({ "kind": "expense", "title": "", "amount": "1", "currency": "USD",
                     "occurred_at": "2024-05-01T12:00:00Z" }),
            "validation error: title must not be empty",
        ),
        (
            json!({ "kind": "expense", "title": "x", "amount": "12..50", "currency": "USD",
                     "occurred_at": "2024-05-01T12:00:00Z" }),
            "validation error: invalid amount '12..50'",
        ),
        (
            json!({ "kind": "expense", "title": "x", "amount": "-1", "currency": "USD",
                     "occurred_at": "2024-05-01T12:00:00Z" }),
            "validation error: amount must not be negative",
        ),
        (
            json!({ "kind": "expense", "title": "x", "amount": "1", "currency": "usd",
                     "occurred_at": "2024-05-01T12:00:00Z" }),
            "validation error: currency must be a three-letter uppercase code",
        ),
    ];

    for (body, message) in cases {
        let (status, value) = send(&app, with_json("POST", "/api/items", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(value, json!({ "error": message }));
    }

    let (status, value) = send(
        &app,
        with_json(
            "POST",
            "/api/categories",
            json!({ "name": "", "description": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value, json!({ "error": "validation error: name must not be empty" }));
}

#[tokio::test]
async fn deleting_a_category_with_items_is_a_constraint_error() {
    let app = app();
    let food = create_category(
        &app,
        json!({ "name": "Food", "description": "meals" }),
    )
    .await;
    let mut body = item_body("Lunch", "12.50", "2024-05-01T12:00:00Z");
    body["category_id"] = json!(food);
    create_item(&app, body).await;

    let (status, value) = send(&app, delete(&format!("/api/categories/{food}"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = value["error"].as_str().unwrap();
    assert!(message.starts_with("constraint violated"), "{message}");
}

#[tokio::test]
async fn cors_headers_are_always_present() {
    let app = app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers["access-control-allow-headers"],
        "Origin, Content-Type, Authorization"
    );

    let preflight = Request::builder()
        .uri("/api/items")
        .method("OPTIONS")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
