//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Catalog policy rejections (not-found, conflict, unknown actors) arrive here
/// only after the request layer has matched on a [`crate::catalog::CatalogOutcome`];
/// the catalog itself never throws them. Each variant implements automatic
/// conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced actor or movie does not exist
    #[error("{0}")]
    NotFound(String),

    /// Another row already holds the natural key (actor name+surname, movie title+year)
    #[error("{0}")]
    Conflict(String),

    /// An assignment list referenced one or more actor ids that do not exist
    #[error("One or more actor IDs do not exist.")]
    UnknownActors,

    /// Required request field missing or empty
    #[error("{0}")]
    Validation(String),

    /// Internal server error (catch-all for unexpected storage failures)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::UnknownActors => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
