//! Cleaning of raw cell values.
//!
//! Everything here is pure. Unparseable dates log a warning and come back as
//! `None`; the only hard failure is an academic year whose two halves are not
//! consecutive, which no amount of tolerance can repair.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use scholaris_core::scholar::{PLACEHOLDER_EMAIL_DOMAIN, Sex};
use sha2::{Digest, Sha256};

use crate::{
  cell::Cell,
  error::{Error, Result},
};

/// Values that mean "nothing here" in legacy sheets.
const SENTINELS: &[&str] = &["", "N/A", "-", "0", "NONE", "NULL"];

/// Tokens read as `true` by [`parse_bool`].
const TRUTHY: &[&str] = &["1", "Y", "YES", "TRUE", "T", "X", "✓"];

/// Strings typed into email columns in place of an address.
const EMAIL_PLACEHOLDERS: &[&str] =
  &["NONE", "N/A", "NA", "NOEMAIL", "NO EMAIL", "NULL", "-"];

// ─── Text ────────────────────────────────────────────────────────────────────

/// Trim, collapse internal whitespace, and map sentinels to `None`.
pub fn clean(raw: &str) -> Option<String> {
  let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
  if SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(&collapsed)) {
    None
  } else {
    Some(collapsed)
  }
}

pub fn clean_cell(cell: &Cell) -> Option<String> { clean(&cell.to_string()) }

// ─── Numbers ─────────────────────────────────────────────────────────────────

/// Parse a peso amount such as "₱ 20,000.00". Anything unparseable is 0.
pub fn parse_currency(raw: &str) -> f64 {
  let digits: String = raw
    .chars()
    .filter(|c| c.is_ascii_digit() || *c == '.')
    .collect();
  digits.parse().unwrap_or(0.0)
}

/// Currency from a cell: numbers pass through, text goes through
/// [`parse_currency`].
pub fn currency_cell(cell: &Cell) -> f64 {
  match cell {
    Cell::Number(n) => *n,
    other => parse_currency(&other.to_string()),
  }
}

/// Year level 1..=6 from "1", "1st Year", "I", "THIRD YEAR" and the like.
pub fn parse_year_level(raw: &str) -> Option<u8> {
  let upper = raw.trim().to_ascii_uppercase();
  let head = upper
    .split(|c: char| c.is_whitespace() || c == '-')
    .next()
    .unwrap_or_default()
    .trim_end_matches('.');

  let level = match head {
    "I" | "FIRST" | "1ST" => 1,
    "II" | "SECOND" | "2ND" => 2,
    "III" | "THIRD" | "3RD" => 3,
    "IV" | "FOURTH" | "4TH" => 4,
    "V" | "FIFTH" | "5TH" => 5,
    "VI" | "SIXTH" | "6TH" => 6,
    other => {
      let digits: String = other.chars().take_while(char::is_ascii_digit).collect();
      digits.parse().ok()?
    }
  };
  (1..=6).contains(&level).then_some(level)
}

pub fn year_level_cell(cell: &Cell) -> Option<u8> {
  match cell {
    Cell::Number(n) if (1.0..=6.0).contains(n) && n.fract() == 0.0 => Some(*n as u8),
    other => parse_year_level(&other.to_string()),
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

const DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%d-%b-%Y", "%B %d, %Y", "%b %d, %Y",
  "%Y/%m/%d",
];

const DATETIME_FORMATS: &[&str] =
  &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

static FISCAL_YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^FY\s*(\d{4})$").expect("invalid fiscal year regex"));

/// Convert a spreadsheet day serial (1899-12-30 epoch) to a date.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
  if !(1.0..2_958_466.0).contains(&serial) {
    return None;
  }
  NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

/// Parse a date written as a day serial, one of the accepted text formats, a
/// date-time whose date part parses, or "FY YYYY" (read as 1 January).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let s = clean(raw)?;

  if let Ok(serial) = s.parse::<f64>() {
    return date_from_serial(serial).or_else(|| {
      tracing::warn!(value = %s, "date serial out of range");
      None
    });
  }

  if let Some(caps) = FISCAL_YEAR.captures(&s) {
    return caps[1]
      .parse()
      .ok()
      .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
  }

  let parsed = DATE_FORMATS
    .iter()
    .find_map(|f| NaiveDate::parse_from_str(&s, f).ok())
    .or_else(|| {
      DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&s, f).ok())
        .map(|dt| dt.date())
    })
    .or_else(|| {
      // Trailing time of day in some other shape; retry on the date part.
      let (date, _) = s.split_once(['T', ' '])?;
      DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(date, f).ok())
    });

  if parsed.is_none() {
    tracing::warn!(value = %s, "unparseable date");
  }
  parsed
}

pub fn date_cell(cell: &Cell) -> Option<NaiveDate> {
  match cell {
    Cell::Number(n) => date_from_serial(*n).or_else(|| {
      tracing::warn!(value = *n, "date serial out of range");
      None
    }),
    other => parse_date(&other.to_string()),
  }
}

// ─── Flags and codes ─────────────────────────────────────────────────────────

/// Only the first letter counts: "Male", "m", "MALE" are all `M`.
pub fn parse_sex(raw: &str) -> Option<Sex> {
  let first = raw.trim().chars().next()?.to_ascii_uppercase();
  match first {
    'M' => Some(Sex::Male),
    'F' => Some(Sex::Female),
    _ => None,
  }
}

/// Truthy tokens are `true`; any other present value is `false`.
pub fn parse_bool(raw: Option<&str>) -> Option<bool> {
  let s = raw?.trim();
  if s.is_empty() {
    return None;
  }
  Some(TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(s)))
}

pub fn bool_cell(cell: &Cell) -> Option<bool> {
  match cell {
    Cell::Bool(b) => Some(*b),
    Cell::Empty => None,
    other => parse_bool(Some(&other.to_string())),
  }
}

/// Keep digits and a leading `+`.
pub fn clean_phone(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  let mut out = String::with_capacity(trimmed.len());
  if trimmed.starts_with('+') {
    out.push('+');
  }
  out.extend(trimmed.chars().filter(char::is_ascii_digit));
  if out.trim_start_matches('+').is_empty() {
    None
  } else {
    Some(out)
  }
}

// ─── Email ───────────────────────────────────────────────────────────────────

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("invalid email regex")
});

/// A syntactically valid address, lower-cased, or `None`.
pub fn validate_email(raw: &str) -> Option<String> {
  let s = raw.trim();
  if EMAIL_PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(s)) {
    return None;
  }
  EMAIL.is_match(s).then(|| s.to_lowercase())
}

/// A deterministic stand-in address for a scholar with no usable email:
/// the same names and birth date always yield the same placeholder.
pub fn placeholder_email(
  first_name: &str,
  last_name: &str,
  birth_date: Option<NaiveDate>,
) -> String {
  let birth = birth_date.map(|d| d.to_string()).unwrap_or_default();
  let digest = Sha256::digest(
    format!(
      "{}|{}|{}",
      first_name.trim().to_lowercase(),
      last_name.trim().to_lowercase(),
      birth
    )
    .as_bytes(),
  );
  format!("{}@{PLACEHOLDER_EMAIL_DOMAIN}", &hex::encode(digest)[..16])
}

// ─── Academic calendar ───────────────────────────────────────────────────────

static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(\d{4})\s*[-/–]\s*(\d{4}|\d{2})\b")
    .expect("invalid academic year regex")
});

static SINGLE_YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\D*(\d{4})\D*$").expect("invalid single year regex"));

/// Canonical `YYYY-YYYY` label from "2023-2024", "AY 2023-24", "2023 - 2024"
/// or a lone "2023". The end year must follow the start year.
pub fn academic_year(raw: &str) -> Result<String> {
  let malformed = || Error::Malformed {
    field: "academic year",
    value: raw.to_owned(),
  };

  let (start, end): (i32, i32) = if let Some(caps) = YEAR_RANGE.captures(raw) {
    let start: i32 = caps[1].parse().map_err(|_| malformed())?;
    let end_raw = &caps[2];
    let end: i32 = end_raw.parse().map_err(|_| malformed())?;
    if end_raw.len() == 2 {
      // "1999-00" crosses a century.
      if (start + 1) % 100 != end {
        return Err(malformed());
      }
      (start, start + 1)
    } else {
      (start, end)
    }
  } else if let Some(caps) = SINGLE_YEAR.captures(raw) {
    let start: i32 = caps[1].parse().map_err(|_| malformed())?;
    (start, start + 1)
  } else {
    return Err(malformed());
  };

  if end != start + 1 {
    return Err(malformed());
  }
  Ok(format!("{start}-{end}"))
}

pub const FIRST_SEMESTER: &str = "First Semester";
pub const SECOND_SEMESTER: &str = "Second Semester";
pub const SUMMER: &str = "Summer";

/// Canonical semester label. Unrecognised text is kept as given.
pub fn semester(raw: &str) -> String {
  let upper = raw.trim().to_ascii_uppercase();
  let head = upper
    .split(|c: char| c.is_whitespace() || c == '-')
    .next()
    .unwrap_or_default()
    .trim_end_matches('.');
  match head {
    "1" | "1ST" | "I" | "FIRST" => FIRST_SEMESTER.to_owned(),
    "2" | "2ND" | "II" | "SECOND" => SECOND_SEMESTER.to_owned(),
    "SUMMER" | "MIDYEAR" | "MID" | "3RD" | "3" => SUMMER.to_owned(),
    _ => raw.split_whitespace().collect::<Vec<_>>().join(" "),
  }
}
