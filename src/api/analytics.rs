// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Analytics handlers. Amounts cross the wire as strings so their decimal
//! scale survives untouched; only `count` is a bare integer.

use axum::Json;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::params::{self, QueryMap};
use crate::service::Ledger;

/// `GET /api/analytics/sum`
pub async fn sum(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::analytics_filter(&query)?;
    let total = ledger.sum(filter).await?;
    Ok(Json(json!({ "sum": total.to_string() })))
}

/// `GET /api/analytics/avg`
pub async fn avg(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::analytics_filter(&query)?;
    let avg = ledger.avg(filter).await?;
    Ok(Json(json!({ "avg": avg.to_string() })))
}

/// `GET /api/analytics/count`
pub async fn count(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::analytics_filter(&query)?;
    let count = ledger.count(filter).await?;
    Ok(Json(json!({ "count": count })))
}

/// `GET /api/analytics/median`
pub async fn median(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::analytics_filter(&query)?;
    let median = ledger.median(filter).await?;
    Ok(Json(json!({ "median": median.to_string() })))
}

/// `GET /api/analytics/percentile`
pub async fn percentile(
    State(ledger): State<Ledger>,
    Query(query): Query<QueryMap>,
) -> Result<Json<Value>, ApiError> {
    let filter = params::analytics_filter(&query)?;
    let p = params::percentile_query(&query)?;
    let value = ledger.percentile(filter, p).await?;
    Ok(Json(json!({ "percentile": value.to_string() })))
}
