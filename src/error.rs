// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Typed failures raised by the storage layer. Handlers map these onto
/// HTTP statuses; everything not listed as a client error surfaces as 500
/// with a generic message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("task join error: {0}")]
    Join(String),
    #[error("corrupt stored value: {0}")]
    Corrupt(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("category not found")]
    CategoryNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error("no categories found")]
    NoCategoriesFound,
}

impl StoreError {
    pub fn invalid(msg: impl Into<String>) -> StoreError {
        StoreError::InvalidInput(msg.into())
    }
}

/// Distinguishes constraint violations from other driver failures so that
/// a rejected foreign key or CHECK surfaces as a client error instead of a
/// generic 500.
pub(crate) fn map_sqlite(e: rusqlite::Error) -> StoreError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => StoreError::Constraint(e.to_string()),
        _ => StoreError::Sqlite(e),
    }
}

/// A store failure annotated with the operation that raised it. `Display`
/// renders `"{op}: {cause}"`; the typed cause stays reachable for status
/// mapping.
#[derive(Debug, Error)]
#[error("{op}: {source}")]
pub struct ServiceError {
    pub op: &'static str,
    #[source]
    pub source: StoreError,
}

impl ServiceError {
    pub fn wrap(op: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
        move |source| ServiceError { op, source }
    }
}
