//! API error responses.
//!
//! The transport layer is the single place that decides user-visible
//! messaging: store `NotFound` becomes a missing-resource response,
//! validation failures carry their field map, and everything else is a
//! generic failure that only shows up in the logs.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use hookd_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,

    #[error("Validation failed")]
    Validation(HashMap<String, String>),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "message": "Resource not found" }),
            ),
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "message": "Validation failed", "detail": detail }),
            ),
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "message": "Something went wrong" }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
