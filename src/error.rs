//! Error types and error handling for the HTTP layer
//!
//! `AppError` converts into a JSON response with a matching status code.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by HTTP handlers
#[derive(Error, Debug)]
pub enum AppError {
    /// Job with the given ID was not found
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The request body is unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The job store could not be reached or answered with an error
    #[error("Job store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::JobNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
