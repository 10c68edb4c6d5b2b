//! Error types for the scholaris-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook has no worksheet named {0:?}")]
  SheetNotFound(String),

  #[error("workbook contains no worksheets")]
  EmptyWorkbook,

  #[error("unsupported file type: {0}")]
  UnsupportedFile(String),

  #[error("no recognisable column headers at row {0}")]
  MissingHeaderRow(usize),

  #[error("unknown source layout: {0:?}")]
  UnknownLayout(String),

  #[error("malformed {field}: {value:?}")]
  Malformed { field: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
