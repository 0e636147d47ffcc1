// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Query and path parameter parsing. Every helper treats an empty value as
//! absent and answers a malformed one with the exact client-facing message.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::models::{ItemFilter, Kind};

/// Decoded query string; duplicate keys keep the last value.
pub type QueryMap = HashMap<String, String>;

fn raw<'a>(query: &'a QueryMap, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parses the `{id}` path segment.
pub fn path_id(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|e| {
        debug!("failed to parse id param '{value}': {e}");
        ApiError::bad_request("invalid id")
    })
}

pub fn time_query(query: &QueryMap, key: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw(query, key) {
        None => Ok(None),
        Some(value) => match DateTime::parse_from_rfc3339(value) {
            Ok(t) => Ok(Some(t.with_timezone(&Utc))),
            Err(e) => {
                debug!("failed to parse time query {key}='{value}': {e}");
                Err(ApiError::bad_request(format!(
                    "invalid time format for {key}"
                )))
            }
        },
    }
}

pub fn uuid_query(query: &QueryMap, key: &str) -> Result<Option<Uuid>, ApiError> {
    match raw(query, key) {
        None => Ok(None),
        Some(value) => match Uuid::parse_str(value) {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                debug!("failed to parse UUID query {key}='{value}': {e}");
                Err(ApiError::bad_request(format!("invalid {key}")))
            }
        },
    }
}

pub fn kind_query(query: &QueryMap) -> Result<Option<Kind>, ApiError> {
    match raw(query, "kind") {
        None => Ok(None),
        Some(value) => match Kind::parse(value) {
            Some(kind) => Ok(Some(kind)),
            None => {
                debug!("failed to parse kind query '{value}'");
                Err(ApiError::bad_request("invalid kind"))
            }
        },
    }
}

pub fn int_query(query: &QueryMap, key: &str, default: i64) -> Result<i64, ApiError> {
    let Some(value) = raw(query, key) else {
        return Ok(default);
    };
    let n = value.parse::<i64>().map_err(|e| {
        debug!("failed to parse int query {key}='{value}': {e}");
        ApiError::bad_request(format!("invalid int format for {key}"))
    })?;
    if n < 0 {
        return Err(ApiError::bad_request(format!("{key} must not be negative")));
    }
    Ok(n)
}

pub fn string_query(query: &QueryMap, key: &str, default: &str) -> String {
    match raw(query, key) {
        Some(value) => value.to_string(),
        None => default.to_string(),
    }
}

pub fn percentile_query(query: &QueryMap) -> Result<f64, ApiError> {
    let Some(value) = raw(query, "percentile") else {
        return Ok(0.9);
    };
    let p = value.parse::<f64>().map_err(|e| {
        debug!("failed to parse float query percentile='{value}': {e}");
        ApiError::bad_request("invalid float format for percentile")
    })?;
    // NaN fails the range test as well.
    if !(0.0..=1.0).contains(&p) {
        return Err(ApiError::bad_request(
            "percentile must be between 0 and 1",
        ));
    }
    Ok(p)
}

/// Assembles the filter shared by the analytics endpoints: time window,
/// category, and kind.
pub fn analytics_filter(query: &QueryMap) -> Result<ItemFilter, ApiError> {
    Ok(ItemFilter {
        from: time_query(query, "from")?,
        to: time_query(query, "to")?,
        category_id: uuid_query(query, "category_id")?,
        kind: kind_query(query)?,
        ..ItemFilter::default()
    })
}

/// The listing filter: everything the analytics filter carries plus
/// pagination and sort order.
pub fn filter_query(query: &QueryMap) -> Result<ItemFilter, ApiError> {
    let mut filter = analytics_filter(query)?;
    filter.limit = int_query(query, "limit", 20)?;
    filter.offset = int_query(query, "offset", 0)?;
    filter.sort_by = string_query(query, "sort_by", "occurred_at");
    Ok(filter)
}
