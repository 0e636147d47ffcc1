// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::params;
use crate::models::CategoryPayload;
use crate::service::Ledger;

/// `POST /api/categories`
pub async fn create(
    State(ledger): State<Ledger>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let id = ledger.create_category(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `GET /api/categories/{id}`
pub async fn get(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    let category = ledger.get_category(id).await?;
    Ok(Json(json!({ "category": category })))
}

/// `GET /api/categories`
pub async fn list(State(ledger): State<Ledger>) -> Result<Json<Value>, ApiError> {
    let categories = ledger.list_categories().await?;
    Ok(Json(json!({ "categories": categories })))
}

/// `PUT /api/categories/{id}`
pub async fn update(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    let Json(payload) = payload?;
    ledger.update_category(id, payload).await?;
    Ok(Json(json!({ "message": "category updated" })))
}

/// `DELETE /api/categories/{id}`
pub async fn delete(
    State(ledger): State<Ledger>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = params::path_id(&id)?;
    ledger.delete_category(id).await?;
    Ok(Json(json!({ "message": "category deleted" })))
}
