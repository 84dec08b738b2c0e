//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),

  /// The body was not JSON, or did not fit the expected shape.
  #[error("invalid request body: {}", .0.body_text())]
  Body(#[from] JsonRejection),

  /// A path segment did not parse, e.g. a malformed student id.
  #[error("invalid path: {}", .0.body_text())]
  Path(#[from] PathRejection),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Core(err) => match err {
        Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::MatriculaTaken(_) => StatusCode::CONFLICT,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
      Self::Body(rejection) => rejection.status(),
      Self::Path(rejection) => rejection.status(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Self::Core(err) => err.kind(),
      Self::Body(_) | Self::Path(_) => "validation",
    }
  }

  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::Core(err) => err.field(),
      Self::Body(_) => None,
      Self::Path(_) => Some("id"),
    }
  }

  /// Message safe to show a client. Server-side failures are reported in
  /// full to the log only.
  fn public_message(&self) -> String {
    match self {
      Self::Core(Error::StoreUnavailable(_)) => "student store is unavailable".to_string(),
      Self::Core(Error::Hashing(_)) => "credential could not be processed".to_string(),
      other => other.to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = json!({
      "error": self.public_message(),
      "kind":  self.kind(),
      "field": self.field(),
    });
    (status, Json(body)).into_response()
  }
}
