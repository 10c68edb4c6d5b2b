//! Spreadsheet codec for Scholaris.
//!
//! Reads CSV files and workbooks into field-addressed rows and cleans their
//! values. Pure synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use scholaris_sheet::{Field, RowStream, SourceLayout, SourceRow};
//!
//! let layout = SourceLayout::find("tes_grantees", &[]).unwrap();
//! let mut rows = RowStream::open(Path::new("grantees.xlsx"), None, &layout).unwrap();
//! for row in rows.next_chunk(layout.chunk_size).unwrap() {
//!   println!("{}: {:?}", row.row_number(), row.text(Field::LastName));
//! }
//! ```

pub mod cell;
pub mod error;
pub mod header;
pub mod layout;
pub mod normalize;
pub mod source;

pub use cell::Cell;
pub use error::{Error, Result};
pub use header::{Field, HeaderMap, header_key};
pub use layout::{CreationPolicy, SourceLayout};
pub use source::{
  CellSource, CsvRows, MappedRow, MemoryRows, RowStream, SourceRow, WorkbookRows,
};
