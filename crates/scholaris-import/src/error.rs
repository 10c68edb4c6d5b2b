//! Error types for the import pipeline.

use scholaris_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The job's program does not exist and the run may not create it.
  #[error("program {0:?} does not exist")]
  MissingProgram(String),

  #[error(transparent)]
  Sheet(#[from] scholaris_sheet::Error),

  #[error("store error: {source}")]
  Store {
    source:      Box<dyn std::error::Error + Send + Sync>,
    unavailable: bool,
  },

  /// A conflicting insert was reported but the winning row cannot be read.
  #[error("{0} reported as a duplicate but not found")]
  LostRace(&'static str),

  #[error("import task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  /// Wrap a backend error, remembering whether the backend is gone.
  pub fn store<E: StoreError>(e: E) -> Self {
    Self::Store {
      unavailable: e.is_unavailable(),
      source:      Box::new(e),
    }
  }

  /// Whether no further row can succeed.
  pub fn is_unavailable(&self) -> bool {
    matches!(self, Self::Store { unavailable: true, .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
