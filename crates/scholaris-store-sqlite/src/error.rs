//! Error type for `scholaris-store-sqlite`.

use scholaris_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] scholaris_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A unique constraint rejected an insert or update.
  #[error("unique constraint violated: {0}")]
  Conflict(String),

  /// The connection thread has shut down, or the database is held by
  /// another writer past the busy timeout.
  #[error("database unavailable: {0}")]
  Unavailable(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row that must exist after a write could not be read back.
  #[error("{0} vanished after write")]
  Missing(&'static str),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::ConnectionClosed => {
        Self::Unavailable("connection closed".to_owned())
      }
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        failure,
        msg,
      )) => match failure.code {
        rusqlite::ErrorCode::ConstraintViolation => {
          Self::Conflict(msg.unwrap_or_else(|| failure.to_string()))
        }
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
          Self::Unavailable(msg.unwrap_or_else(|| failure.to_string()))
        }
        _ => Self::Database(tokio_rusqlite::Error::Rusqlite(
          rusqlite::Error::SqliteFailure(failure, msg),
        )),
      },
      other => Self::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Self::Conflict(_)) }

  fn is_unavailable(&self) -> bool { matches!(self, Self::Unavailable(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
