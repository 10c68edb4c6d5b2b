//! The geographic hierarchy: region → province → city / district → barangay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// One level of the hierarchy, top-down.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LocationLevel {
  Region,
  Province,
  City,
  District,
  Barangay,
}

impl LocationLevel {
  /// The level a node of this level hangs under. Regions are roots; provinces
  /// hang under regions; cities and districts under provinces; barangays under
  /// cities.
  pub fn parent(self) -> Option<Self> {
    match self {
      Self::Region => None,
      Self::Province => Some(Self::Region),
      Self::City | Self::District => Some(Self::Province),
      Self::Barangay => Some(Self::City),
    }
  }

  pub fn decode(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownLocationLevel(s.to_owned()))
  }
}

/// A persisted node of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_id: Uuid,
  pub level:       LocationLevel,
  pub name:        String,
  pub parent_id:   Option<Uuid>,
  pub created_at:  DateTime<Utc>,
}

/// Where to look for a node by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationScope {
  /// Anywhere at the level. Only used for regions and provinces.
  Anywhere,
  /// Children of one resolved parent.
  Under(Uuid),
}

/// One address level as stored: the resolved id, if any, and the raw source
/// text, which is kept even after a successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
  pub id:  Option<Uuid>,
  pub raw: Option<String>,
}

impl LocationRef {
  pub fn raw_only(raw: Option<String>) -> Self { Self { id: None, raw } }

  pub fn is_empty(&self) -> bool { self.id.is_none() && self.raw.is_none() }

  /// Whether both refs name the same node: equal ids, or, when neither is
  /// resolved, the same raw text ignoring case.
  pub fn same_place(&self, other: &LocationRef) -> bool {
    match (self.id, other.id) {
      (None, None) => match (&self.raw, &other.raw) {
        (Some(a), Some(b)) => a.to_uppercase() == b.to_uppercase(),
        (a, b) => a.is_none() && b.is_none(),
      },
      (a, b) => a == b,
    }
  }

  /// Fill this level from `incoming` without clobbering. An unresolved level
  /// takes a resolved incoming pair wholesale; otherwise only missing raw text
  /// is filled, and only while no id is set.
  pub fn fill_from(&mut self, incoming: &LocationRef) -> bool {
    if self.id.is_none() && incoming.id.is_some() {
      *self = incoming.clone();
      return true;
    }
    if self.id.is_none() && self.raw.is_none() && incoming.raw.is_some() {
      self.raw = incoming.raw.clone();
      return true;
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolved_pair_replaces_raw_only_level() {
    let id = Uuid::new_v4();
    let mut slot = LocationRef::raw_only(Some("Iloilo Cty".into()));
    let incoming = LocationRef { id: Some(id), raw: Some("Iloilo City".into()) };
    assert!(slot.fill_from(&incoming));
    assert_eq!(slot, incoming);
  }

  #[test]
  fn resolved_level_is_never_touched() {
    let mut slot = LocationRef { id: Some(Uuid::new_v4()), raw: Some("A".into()) };
    let before = slot.clone();
    let incoming = LocationRef { id: Some(Uuid::new_v4()), raw: Some("B".into()) };
    assert!(!slot.fill_from(&incoming));
    assert_eq!(slot, before);
  }

  #[test]
  fn same_place_compares_ids_then_raw_text() {
    let id = Uuid::new_v4();
    let a = LocationRef { id: Some(id), raw: Some("Iloilo".into()) };
    let b = LocationRef { id: Some(id), raw: Some("ILOILO PROVINCE".into()) };
    assert!(a.same_place(&b));
    assert!(!a.same_place(&LocationRef::raw_only(Some("Iloilo".into()))));
    let lower = LocationRef::raw_only(Some("Peña".into()));
    assert!(lower.same_place(&LocationRef::raw_only(Some("PEÑA".into()))));
    assert!(LocationRef::default().same_place(&LocationRef::default()));
  }

  #[test]
  fn level_parents_and_codes() {
    assert_eq!(LocationLevel::Barangay.parent(), Some(LocationLevel::City));
    assert_eq!(LocationLevel::Region.parent(), None);
    assert_eq!(LocationLevel::District.to_string(), "district");
    assert_eq!(LocationLevel::decode("city").unwrap(), LocationLevel::City);
  }
}
