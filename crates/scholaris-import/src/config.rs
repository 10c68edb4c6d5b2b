//! Per-job import configuration.

use scholaris_sheet::SourceLayout;
use serde::{Deserialize, Serialize};

/// A curated spelling for an institution that the fuzzy chain cannot find on
/// its own: when `pattern` occurs anywhere in the raw name
/// (case-insensitive), the institution is looked up by `canonical` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeiAlias {
  pub pattern:   String,
  pub canonical: String,
}

impl HeiAlias {
  pub fn new(pattern: impl Into<String>, canonical: impl Into<String>) -> Self {
    Self {
      pattern:   pattern.into(),
      canonical: canonical.into(),
    }
  }

  /// Abbreviations and misspellings that recur across regional sheets.
  pub fn defaults() -> Vec<HeiAlias> {
    [
      ("U.P. VISAYAS", "University of the Philippines Visayas"),
      ("UP VISAYAS", "University of the Philippines Visayas"),
      ("UPV MIAGAO", "University of the Philippines Visayas"),
      ("WVSU", "West Visayas State University"),
      ("WEST VISAYAS STATE UNIV", "West Visayas State University"),
      ("ISAT-U", "Iloilo Science and Technology University"),
      ("ISATU", "Iloilo Science and Technology University"),
      ("CENTRAL PHIL. UNIV", "Central Philippine University"),
      ("CPU ILOILO", "Central Philippine University"),
      ("USA ILOILO", "University of San Agustin"),
      ("UNIV. OF SAN AGUSTIN", "University of San Agustin"),
      ("NIPSC", "Northern Iloilo State University"),
      ("CAPSU", "Capiz State University"),
      ("GSU GUIMARAS", "Guimaras State University"),
      ("UA ANTIQUE", "University of Antique"),
    ]
    .into_iter()
    .map(|(p, c)| HeiAlias::new(p, c))
    .collect()
  }
}

/// Everything one import job needs besides the store and the rows.
#[derive(Debug, Clone)]
pub struct ImportConfig {
  /// The scholarship program every row of the job enrolls into.
  pub program:        String,
  /// Create `program` when it does not exist, instead of failing the job.
  pub create_program: bool,
  pub layout:         SourceLayout,
  pub hei_aliases:    Vec<HeiAlias>,
  /// A label for log lines and the summary, usually the file name.
  pub source_name:    String,
}

impl ImportConfig {
  pub fn new(program: impl Into<String>, layout: SourceLayout) -> Self {
    Self {
      program: program.into(),
      create_program: false,
      source_name: layout.name.clone(),
      layout,
      hei_aliases: HeiAlias::defaults(),
    }
  }
}
