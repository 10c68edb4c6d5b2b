//! The per-job resolution cache.
//!
//! Created when a job starts and dropped when it ends. Besides saving store
//! round-trips across thousands of rows it is the job's memory of what has
//! already been resolved, created or warned about. Negative results are
//! cached too, so an unmatched name is looked up and reported once.

use std::collections::{HashMap, HashSet};

use scholaris_core::{RegistryStore, location::LocationLevel};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Case-insensitive cache key.
pub(crate) fn key(s: &str) -> String { s.trim().to_uppercase() }

#[derive(Debug, Default)]
pub struct ResolutionCache {
  academic_years:        HashMap<String, Uuid>,
  semesters:             HashMap<String, Uuid>,
  pub(crate) locations:  HashMap<(LocationLevel, Option<Uuid>, String), Option<Uuid>>,
  pub(crate) heis:       HashMap<(String, String), Option<Uuid>>,
  pub(crate) courses:    HashMap<String, Option<Uuid>>,
  pub(crate) majors:     HashMap<String, Option<Uuid>>,
  warned:                HashSet<String>,
}

impl ResolutionCache {
  pub fn new() -> Self { Self::default() }

  /// Record that a warning about `topic` is due. Returns `true` the first
  /// time a topic is seen, which is when the caller should log it.
  pub fn warn_once(&mut self, topic: impl Into<String>) -> bool {
    self.warned.insert(topic.into())
  }

  /// Distinct warnings raised so far.
  pub fn warnings(&self) -> u64 { self.warned.len() as u64 }

  /// Id of the academic year with canonical `label`, created on first use.
  pub async fn academic_year<S: RegistryStore>(
    &mut self,
    store: &S,
    label: &str,
  ) -> Result<Uuid> {
    if let Some(id) = self.academic_years.get(&key(label)) {
      return Ok(*id);
    }
    let year = store
      .get_or_create_academic_year(label)
      .await
      .map_err(Error::store)?;
    self.academic_years.insert(key(label), year.academic_year_id);
    Ok(year.academic_year_id)
  }

  /// Id of the semester with canonical `label`, created on first use.
  pub async fn semester<S: RegistryStore>(
    &mut self,
    store: &S,
    label: &str,
  ) -> Result<Uuid> {
    if let Some(id) = self.semesters.get(&key(label)) {
      return Ok(*id);
    }
    let semester = store
      .get_or_create_semester(label)
      .await
      .map_err(Error::store)?;
    self.semesters.insert(key(label), semester.semester_id);
    Ok(semester.semester_id)
  }
}
