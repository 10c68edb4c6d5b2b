//! Source layouts: where a sheet's headers start, how its columns map to
//! fields, how many rows to stream at a time and how freely its unmatched
//! references may create new reference rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  error::{Error, Result},
  header::Field,
};

/// Whether a resolver may create a reference row it fails to find.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CreationPolicy {
  /// Lookup only; a miss leaves the foreign key null.
  #[default]
  Strict,
  /// A miss creates the row from the cleaned raw text.
  CreateMissing,
}

fn default_header_row() -> usize { 1 }
fn default_chunk_size() -> usize { 500 }

/// Declares the shape of one family of source sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLayout {
  pub name:          String,
  /// 1-based row holding the column headers.
  #[serde(default = "default_header_row")]
  pub header_row:    usize,
  /// Rows read from the source per batch.
  #[serde(default = "default_chunk_size")]
  pub chunk_size:    usize,
  /// Header text → field, on top of the built-in aliases.
  #[serde(default)]
  pub columns:       BTreeMap<String, Field>,
  #[serde(default)]
  pub geo_policy:    CreationPolicy,
  #[serde(default)]
  pub hei_policy:    CreationPolicy,
  #[serde(default)]
  pub course_policy: CreationPolicy,
}

impl SourceLayout {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:          name.into(),
      header_row:    default_header_row(),
      chunk_size:    default_chunk_size(),
      columns:       BTreeMap::new(),
      geo_policy:    CreationPolicy::Strict,
      hei_policy:    CreationPolicy::Strict,
      course_policy: CreationPolicy::Strict,
    }
  }

  fn with_columns(mut self, columns: &[(&str, Field)]) -> Self {
    self.columns.extend(columns.iter().map(|(h, f)| ((*h).to_owned(), *f)));
    self
  }

  /// The layouts every installation knows about.
  pub fn builtin() -> Vec<SourceLayout> {
    vec![
      // Header on the first row, built-in aliases only.
      SourceLayout::new("generic"),
      // Regional scholar masterlist: a letterhead block above the table.
      SourceLayout {
        header_row: 5,
        chunk_size: 500,
        geo_policy: CreationPolicy::CreateMissing,
        course_policy: CreationPolicy::CreateMissing,
        ..SourceLayout::new("masterlist")
      }
      .with_columns(&[
        ("Name of Institution", Field::HeiName),
        ("Program Name", Field::Course),
        ("City/Municipality of Residence", Field::City),
        ("Province of Residence", Field::Province),
        ("Barangay of Residence", Field::Barangay),
      ]),
      // Tertiary Education Subsidy grantee lists.
      SourceLayout {
        header_row: 8,
        chunk_size: 300,
        hei_policy: CreationPolicy::Strict,
        course_policy: CreationPolicy::CreateMissing,
        ..SourceLayout::new("tes_grantees")
      }
      .with_columns(&[
        ("TES Award No", Field::AwardNo),
        ("Student ID", Field::UniqueId),
        ("Name of Grantee (Last, First, Middle)", Field::FullName),
        ("Degree Program", Field::Course),
        ("Year", Field::YearLevel),
        ("TES Amount", Field::GrantAmount),
      ]),
      // Tulong Dunong Program grantee lists.
      SourceLayout {
        header_row: 2,
        chunk_size: 200,
        course_policy: CreationPolicy::CreateMissing,
        ..SourceLayout::new("tdp_grantees")
      }
      .with_columns(&[
        ("TDP Award No", Field::AwardNo),
        ("Application Number", Field::ApplicationNo),
        ("HEI Name", Field::HeiName),
        ("Grant", Field::GrantAmount),
      ]),
      // Billing / disbursement statements.
      SourceLayout {
        header_row: 11,
        chunk_size: 500,
        ..SourceLayout::new("stufaps_billing")
      }
      .with_columns(&[
        ("Award Number", Field::AwardNo),
        ("Date of FR", Field::FundRequestDate),
        ("Date of Disbursement", Field::DisbursementDate),
        ("Validated By", Field::ValidatedBy),
        ("Amount", Field::BillingAmount),
        ("Status", Field::BillingStatus),
      ]),
    ]
  }

  /// Find a layout by name (case-insensitive) among `extra`, then the
  /// built-ins. A configured layout shadows a built-in of the same name.
  pub fn find(name: &str, extra: &[SourceLayout]) -> Result<SourceLayout> {
    extra
      .iter()
      .cloned()
      .chain(Self::builtin())
      .find(|l| l.name.eq_ignore_ascii_case(name))
      .ok_or_else(|| Error::UnknownLayout(name.to_owned()))
  }
}
