//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"success": false, "error": "..."}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use plantafel_core::{assignment::Assignment, error::BoxError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  /// The assignment is saved; only its time-tracking handoff failed.
  #[error("time-tracking sync failed: {message}")]
  SyncFailed {
    assignment: Box<Assignment>,
    message:    String,
  },
}

impl From<plantafel_core::Error> for ApiError {
  fn from(e: plantafel_core::Error) -> Self {
    use plantafel_core::Error as Core;
    match e {
      e if e.is_validation() => ApiError::BadRequest(e.to_string()),
      e if e.is_not_found() => ApiError::NotFound(e.to_string()),
      Core::SyncFailed { assignment, source } => ApiError::SyncFailed {
        assignment,
        message: source.to_string(),
      },
      Core::Store(e) => ApiError::Store(e),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => error_body(StatusCode::NOT_FOUND, m),
      ApiError::BadRequest(m) => error_body(StatusCode::BAD_REQUEST, m),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed");
        error_body(
          StatusCode::INTERNAL_SERVER_ERROR,
          "internal server error".to_owned(),
        )
      }
      ApiError::SyncFailed { assignment, message } => (
        StatusCode::BAD_GATEWAY,
        Json(json!({
          "success": false,
          "error": format!(
            "assignment saved, but time-tracking sync failed: {message}"
          ),
          "assignment": assignment,
        })),
      )
        .into_response(),
    }
  }
}

fn error_body(status: StatusCode, message: String) -> Response {
  (status, Json(json!({ "success": false, "error": message }))).into_response()
}
