//! Error types for `roster-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input. The caller must fix it and resubmit.
  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  /// The business key is held by another record, active or not.
  #[error("matricula {0:?} is already taken")]
  MatriculaTaken(String),

  #[error("student not found: {0}")]
  NotFound(Uuid),

  /// The persistence layer failed. Callers may retry with backoff.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("credential hashing failed: {0}")]
  Hashing(String),
}

impl Error {
  pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Validation { field, reason: reason.into() }
  }

  /// Short machine-readable name for the error kind.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Validation { .. } => "validation",
      Self::MatriculaTaken(_) => "conflict",
      Self::NotFound(_) => "not_found",
      Self::StoreUnavailable(_) => "store_unavailable",
      Self::Hashing(_) => "hashing",
    }
  }

  /// The offending input field, for validation errors and conflicts.
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::Validation { field, .. } => Some(*field),
      Self::MatriculaTaken(_) => Some("matricula"),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
