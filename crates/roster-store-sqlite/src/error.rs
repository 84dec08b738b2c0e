//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The file was stamped by a newer schema than this build understands.
  #[error("unsupported schema version {found} (expected at most {supported})")]
  SchemaVersion { found: i64, supported: i64 },

  /// The `UNIQUE` constraint on `matricula` rejected a write.
  #[error("matricula {0:?} is already taken")]
  MatriculaTaken(String),
}

impl Error {
  /// Classify a failed write: a constraint violation on `students` can only
  /// come from the `matricula` unique index.
  pub(crate) fn from_write(err: tokio_rusqlite::Error, matricula: Option<&str>) -> Self {
    match (&err, matricula) {
      (
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)),
        Some(matricula),
      ) if failure.code == rusqlite::ErrorCode::ConstraintViolation => {
        Error::MatriculaTaken(matricula.to_owned())
      }
      _ => Error::Database(err),
    }
  }
}

impl From<Error> for roster_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::MatriculaTaken(matricula) => roster_core::Error::MatriculaTaken(matricula),
      other => roster_core::Error::StoreUnavailable(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
