//! Error types for the commentary HTTP layer.
//!
//! [`ApiError`] covers every failure a handler can report and converts into
//! the `{ "error": ..., "details": ... }` response body via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::repository::RepositoryError;
use crate::validation::ValidationDetails;

/// Errors a commentary handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The `id` path segment is not a valid match identifier.
    #[error("invalid path parameters")]
    InvalidPath(ValidationDetails),

    /// A query parameter failed validation.
    #[error("invalid query parameters")]
    InvalidQuery(ValidationDetails),

    /// The request body failed validation.
    #[error("invalid payload")]
    InvalidPayload(ValidationDetails),

    /// Reading commentary from the store failed.
    #[error("failed to fetch commentary: {0}")]
    Fetch(RepositoryError),

    /// Inserting commentary into the store failed.
    #[error("failed to create commentary: {0}")]
    Create(RepositoryError),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath(_) | Self::InvalidQuery(_) | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Fetch(_) | Self::Create(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::InvalidPath(details) => serde_json::json!({
                "error": "Invalid path parameters.",
                "details": details,
            }),
            Self::InvalidQuery(details) => serde_json::json!({
                "error": "Invalid query parameters.",
                "details": details,
            }),
            Self::InvalidPayload(details) => serde_json::json!({
                "error": "Invalid payload.",
                "details": details,
            }),
            Self::Fetch(e) => {
                tracing::error!(error = %e, "Failed to fetch commentary");
                serde_json::json!({
                    "error": "Failed to fetch commentary.",
                    "details": e.to_string(),
                })
            }
            Self::Create(e) => {
                tracing::error!(error = %e, "Failed to create commentary");
                serde_json::json!({
                    "error": "Failed to create commentary.",
                    "details": e.to_string(),
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
