//! The cell model shared by every row source.

use std::fmt;

use calamine::DataType;

/// One spreadsheet cell, reduced to the shapes the importer cares about.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
  #[default]
  Empty,
  Text(String),
  /// Numbers, including spreadsheet date serials.
  Number(f64),
  Bool(bool),
}

impl Cell {
  pub fn text(s: impl Into<String>) -> Self { Self::Text(s.into()) }

  /// Whether the cell carries nothing but whitespace.
  pub fn is_blank(&self) -> bool {
    match self {
      Self::Empty => true,
      Self::Text(s) => s.trim().is_empty(),
      _ => false,
    }
  }

  /// The numeric value, if the cell is a number.
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      _ => None,
    }
  }
}

impl fmt::Display for Cell {
  /// Integral numbers render without a fractional part, so that an id typed
  /// into a numeric column reads back as `12345` rather than `12345.0`.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => Ok(()),
      Self::Text(s) => f.write_str(s),
      Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
        write!(f, "{}", *n as i64)
      }
      Self::Number(n) => write!(f, "{n}"),
      Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
    }
  }
}

impl From<&DataType> for Cell {
  fn from(value: &DataType) -> Self {
    match value {
      DataType::Empty | DataType::Error(_) => Self::Empty,
      DataType::String(s) => Self::Text(s.clone()),
      DataType::Int(i) => Self::Number(*i as f64),
      DataType::Float(f) | DataType::DateTime(f) => Self::Number(*f),
      DataType::Bool(b) => Self::Bool(*b),
      other => Self::Text(other.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn integral_numbers_render_without_fraction() {
    assert_eq!(Cell::Number(12345.0).to_string(), "12345");
    assert_eq!(Cell::Number(2.5).to_string(), "2.5");
    assert_eq!(Cell::Empty.to_string(), "");
  }

  #[test]
  fn whitespace_text_is_blank() {
    assert!(Cell::text("   ").is_blank());
    assert!(!Cell::Number(0.0).is_blank());
  }

  #[test]
  fn workbook_values_convert() {
    assert_eq!(Cell::from(&DataType::Int(7)), Cell::Number(7.0));
    assert_eq!(
      Cell::from(&DataType::String("abc".into())),
      Cell::text("abc")
    );
    assert_eq!(Cell::from(&DataType::Empty), Cell::Empty);
  }
}
