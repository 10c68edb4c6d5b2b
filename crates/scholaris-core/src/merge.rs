//! Field-level merge policies.
//!
//! Every entity written by the importer picks exactly one policy; see the
//! `POLICY` constants on the entity types. The helpers here report whether
//! they changed anything so callers can skip no-op writes.

use serde::{Deserialize, Serialize};

/// How an incoming value is merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
  /// Write only into fields that are currently empty.
  FillMissing,
  /// A supplied (non-null) value replaces the current one; omitted values
  /// leave the current one alone.
  OverwriteNonNull,
}

impl MergePolicy {
  /// Merge `incoming` into `slot` under this policy.
  pub fn apply<T: Clone + PartialEq>(
    self,
    slot: &mut Option<T>,
    incoming: &Option<T>,
  ) -> bool {
    match self {
      Self::FillMissing => fill(slot, incoming),
      Self::OverwriteNonNull => overwrite(slot, incoming),
    }
  }
}

/// Fill `slot` from `incoming` only if `slot` is empty.
pub fn fill<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) -> bool {
  if slot.is_none()
    && let Some(v) = incoming
  {
    *slot = Some(v.clone());
    return true;
  }
  false
}

/// Replace `slot` with `incoming` when `incoming` is present and different.
pub fn overwrite<T: Clone + PartialEq>(
  slot: &mut Option<T>,
  incoming: &Option<T>,
) -> bool {
  match incoming {
    Some(v) if slot.as_ref() != Some(v) => {
      *slot = Some(v.clone());
      true
    }
    _ => false,
  }
}

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
  Created,
  Updated,
  Unchanged,
}

impl UpsertOutcome {
  pub fn from_changed(changed: bool) -> Self {
    if changed { Self::Updated } else { Self::Unchanged }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_never_clobbers() {
    let mut slot = Some("old".to_string());
    assert!(!fill(&mut slot, &Some("new".to_string())));
    assert_eq!(slot.as_deref(), Some("old"));

    let mut empty: Option<String> = None;
    assert!(fill(&mut empty, &Some("new".to_string())));
    assert_eq!(empty.as_deref(), Some("new"));
  }

  #[test]
  fn overwrite_keeps_value_when_incoming_is_absent() {
    let mut slot = Some(3);
    assert!(!overwrite(&mut slot, &None));
    assert_eq!(slot, Some(3));
    assert!(!overwrite(&mut slot, &Some(3)));
    assert!(overwrite(&mut slot, &Some(4)));
    assert_eq!(slot, Some(4));
  }
}
