//! Row sources: CSV files, workbooks and in-memory grids, all streamed in
//! bounded chunks of [`MappedRow`]s.

use std::{fs::File, path::Path, sync::Arc};

use calamine::{Reader, open_workbook_auto};

use crate::{
  cell::Cell,
  error::{Error, Result},
  header::{Field, HeaderMap},
  layout::SourceLayout,
  normalize,
};

// ─── Raw cell sources ────────────────────────────────────────────────────────

/// Yields the sheet's rows in order, each with its 1-based row number.
pub trait CellSource: Send {
  fn next_row(&mut self) -> Result<Option<(usize, Vec<Cell>)>>;
}

/// A CSV file. Every field is read as text.
///
/// Fields are decoded as UTF-8 where they are valid and as Latin-1
/// otherwise, so a legacy export with an "Ñ" in one row still yields every
/// row.
pub struct CsvRows {
  reader: csv::Reader<File>,
  record: csv::ByteRecord,
}

impl CsvRows {
  pub fn open(path: &Path) -> Result<Self> {
    let reader = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_path(path)?;
    Ok(Self {
      reader,
      record: csv::ByteRecord::new(),
    })
  }
}

/// Decode one CSV field. Bytes that are not UTF-8 are read as Latin-1,
/// which every byte sequence is.
fn decode_field(bytes: &[u8]) -> String {
  match std::str::from_utf8(bytes) {
    Ok(s) => s.to_owned(),
    Err(_) => bytes.iter().copied().map(char::from).collect(),
  }
}

impl CellSource for CsvRows {
  fn next_row(&mut self) -> Result<Option<(usize, Vec<Cell>)>> {
    if !self.reader.read_byte_record(&mut self.record)? {
      return Ok(None);
    }
    let line = self
      .record
      .position()
      .map(|p| p.line() as usize)
      .unwrap_or_default();
    let cells = self
      .record
      .iter()
      .enumerate()
      .map(|(i, bytes)| {
        let field = decode_field(bytes);
        // Spreadsheet exports often lead with a UTF-8 byte-order mark.
        let field = if i == 0 { field.trim_start_matches('\u{feff}') } else { field.as_str() };
        if field.is_empty() { Cell::Empty } else { Cell::text(field) }
      })
      .collect();
    Ok(Some((line, cells)))
  }
}

/// One worksheet of an `.xlsx`, `.xls`, `.xlsb` or `.ods` workbook.
///
/// The workbook reader decodes the whole sheet at once, so the rows are held
/// in memory and handed out from there.
pub struct WorkbookRows {
  rows:      std::vec::IntoIter<Vec<Cell>>,
  next_line: usize,
}

impl WorkbookRows {
  /// Open `sheet`, or the first worksheet when `sheet` is `None`.
  pub fn open(path: &Path, sheet: Option<&str>) -> Result<Self> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = match sheet {
      Some(name) => name.to_owned(),
      None => workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(Error::EmptyWorkbook)?,
    };

    let range = workbook
      .worksheet_range(&sheet_name)
      .ok_or_else(|| Error::SheetNotFound(sheet_name.clone()))??;

    // The range starts at the first non-empty cell; keep row numbers
    // relative to the top of the sheet.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or_default();
    let rows: Vec<Vec<Cell>> = range
      .rows()
      .map(|row| row.iter().map(Cell::from).collect())
      .collect();

    Ok(Self {
      rows:      rows.into_iter(),
      next_line: first_row + 1,
    })
  }
}

impl CellSource for WorkbookRows {
  fn next_row(&mut self) -> Result<Option<(usize, Vec<Cell>)>> {
    Ok(self.rows.next().map(|cells| {
      let line = self.next_line;
      self.next_line += 1;
      (line, cells)
    }))
  }
}

/// Rows supplied by the caller, numbered from 1.
pub struct MemoryRows {
  rows:      std::vec::IntoIter<Vec<Cell>>,
  next_line: usize,
}

impl MemoryRows {
  pub fn new(rows: Vec<Vec<Cell>>) -> Self {
    Self {
      rows:      rows.into_iter(),
      next_line: 1,
    }
  }

  /// Convenience for tests and small fixtures: every non-empty string is a
  /// text cell.
  pub fn from_strings(rows: &[&[&str]]) -> Self {
    Self::new(
      rows
        .iter()
        .map(|r| {
          r.iter()
            .map(|s| if s.is_empty() { Cell::Empty } else { Cell::text(*s) })
            .collect()
        })
        .collect(),
    )
  }
}

impl CellSource for MemoryRows {
  fn next_row(&mut self) -> Result<Option<(usize, Vec<Cell>)>> {
    Ok(self.rows.next().map(|cells| {
      let line = self.next_line;
      self.next_line += 1;
      (line, cells)
    }))
  }
}

// ─── Mapped rows ─────────────────────────────────────────────────────────────

/// Field-addressed access to one data row.
pub trait SourceRow {
  fn row_number(&self) -> usize;

  fn cell(&self, field: Field) -> Option<&Cell>;

  /// Every non-empty cell with its header, for log lines about this row.
  fn raw(&self) -> String;

  fn is_blank(&self) -> bool;

  /// The cleaned text of `field`, or `None` for a missing column, a blank
  /// cell or a sentinel such as "N/A".
  fn text(&self, field: Field) -> Option<String> {
    self.cell(field).and_then(|c| normalize::clean(&c.to_string()))
  }
}

/// A data row paired with the job's header map.
#[derive(Debug, Clone)]
pub struct MappedRow {
  pub row_number: usize,
  pub cells:      Vec<Cell>,
  header:         Arc<HeaderMap>,
}

impl MappedRow {
  pub fn new(row_number: usize, cells: Vec<Cell>, header: Arc<HeaderMap>) -> Self {
    Self {
      row_number,
      cells,
      header,
    }
  }
}

impl SourceRow for MappedRow {
  fn row_number(&self) -> usize { self.row_number }

  fn cell(&self, field: Field) -> Option<&Cell> {
    self.header.column(field).and_then(|i| self.cells.get(i))
  }

  fn raw(&self) -> String {
    self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, c)| !c.is_blank())
      .map(|(i, c)| match self.header.header(i) {
        Some(h) if !h.is_empty() => format!("{h}={c}"),
        _ => format!("#{}={c}", i + 1),
      })
      .collect::<Vec<_>>()
      .join(" | ")
  }

  fn is_blank(&self) -> bool { self.cells.iter().all(Cell::is_blank) }
}

// ─── Row stream ──────────────────────────────────────────────────────────────

/// A sheet positioned just below its header row.
pub struct RowStream {
  source: Box<dyn CellSource>,
  header: Arc<HeaderMap>,
}

impl std::fmt::Debug for RowStream {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RowStream").field("header", &self.header).finish()
  }
}

impl RowStream {
  /// Skip to the layout's header row and map it. Rows above the header
  /// (letterheads, titles) are discarded.
  pub fn new(mut source: Box<dyn CellSource>, layout: &SourceLayout) -> Result<Self> {
    let header_row = layout.header_row.max(1);
    loop {
      match source.next_row()? {
        Some((line, _)) if line < header_row => continue,
        Some((line, cells)) if line == header_row => {
          let header = HeaderMap::build(&cells, &layout.columns, header_row)?;
          return Ok(Self {
            source,
            header: Arc::new(header),
          });
        }
        _ => return Err(Error::MissingHeaderRow(header_row)),
      }
    }
  }

  /// Open a file by extension: `.csv` is streamed, workbooks are read through
  /// `calamine`.
  pub fn open(path: &Path, sheet: Option<&str>, layout: &SourceLayout) -> Result<Self> {
    let ext = path
      .extension()
      .and_then(|e| e.to_str())
      .map(str::to_ascii_lowercase)
      .unwrap_or_default();
    let source: Box<dyn CellSource> = match ext.as_str() {
      "csv" => Box::new(CsvRows::open(path)?),
      "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Box::new(WorkbookRows::open(path, sheet)?),
      _ => return Err(Error::UnsupportedFile(path.display().to_string())),
    };
    Self::new(source, layout)
  }

  pub fn header(&self) -> &HeaderMap { &self.header }

  /// Read up to `max` further rows. An empty result means the sheet is
  /// exhausted.
  pub fn next_chunk(&mut self, max: usize) -> Result<Vec<MappedRow>> {
    let mut chunk = Vec::with_capacity(max.min(1024));
    while chunk.len() < max.max(1) {
      match self.source.next_row()? {
        Some((line, cells)) => {
          chunk.push(MappedRow::new(line, cells, Arc::clone(&self.header)))
        }
        None => break,
      }
    }
    Ok(chunk)
  }
}
