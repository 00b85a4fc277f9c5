//! HTTP API handlers for mcm-cm

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mcm_common::Error;
use serde_json::json;
use tracing::error;

pub mod content;
pub mod health;
pub mod nodes;
pub mod outline;
pub mod playlist;

pub use health::health_routes;

/// Maps the common error taxonomy onto HTTP responses
///
/// Every failure body is `{"error": "<message>"}`. Validation and invariant
/// failures are the caller's to fix (400); the caller resubmits, nothing
/// is retried server-side.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidShape(_)
            | Error::MissingField(_)
            | Error::DuplicateKey(_)
            | Error::InvariantViolation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PartialFailure { .. }
            | Error::Database(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        if status.is_server_error() {
            error!("Request failed: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
