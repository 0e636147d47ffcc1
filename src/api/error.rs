// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error};

use crate::error::{ServiceError, StoreError};

/// An error ready to leave the process: a status code plus the message the
/// client is allowed to see. Everything renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> ApiError {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn timeout() -> ApiError {
        ApiError {
            status: StatusCode::REQUEST_TIMEOUT,
            message: "request timed out".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Status selection keys off the typed store cause. The operation-prefixed
/// chain goes to the log; internal causes never reach the response body.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> ApiError {
        match &err.source {
            StoreError::CategoryNotFound
            | StoreError::ItemNotFound
            | StoreError::NoCategoriesFound => {
                debug!("{err}");
                ApiError {
                    status: StatusCode::NOT_FOUND,
                    message: err.source.to_string(),
                }
            }
            StoreError::InvalidInput(msg) => {
                debug!("{err}");
                ApiError::bad_request(format!("validation error: {msg}"))
            }
            StoreError::Constraint(_) => {
                debug!("{err}");
                ApiError::bad_request(err.source.to_string())
            }
            StoreError::Sqlite(_) | StoreError::Join(_) | StoreError::Corrupt(_) => {
                error!("{err}");
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal server error".to_string(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> ApiError {
        debug!("request body rejected: {rejection}");
        ApiError::bad_request("invalid request body")
    }
}
