// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::params::{self, QueryMap};
use crate::models::ItemPayload;
use crate::service::Ledger;

/// `POST /api/items`
pub async fn create(
    State(ledger): State<Ledger>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let id = ledger.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /api/items/{id}`
pub async fn get(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    let item = ledger.get_item(id).await?;
    Ok(Json(json!({ "item": item })))
}

/// `GET /api/items`: zero matches is an empty list rather than a 404.
pub async fn list(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::filter_query(&query)?;
    let items = ledger.list_items(filter).await?;
    Ok(Json(json!({ "items": items })))
}

/// `PUT /api/items/{id}`
pub async fn update(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    let Json(payload) = payload?;
    ledger.update_item(id, payload).await?;
    Ok(Json(json!({ "message": "item updated" })))
}

/// `DELETE /api/items/{id}`
pub async fn delete(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    ledger.delete_item(id).await?;
    Ok(Json(json!({ "message": "item deleted" })))
}
