//! Error types for `scholaris-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown sex code: {0:?}")]
  UnknownSex(String),

  #[error("unknown location level: {0:?}")]
  UnknownLocationLevel(String),

  #[error("scholar draft is missing a {0}")]
  MissingName(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
