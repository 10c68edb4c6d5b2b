//! Shared reference entities: institutions, courses, majors, programs,
//! academic years and semesters. These are small sets referenced by id from
//! the per-scholar records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A Higher Education Institution, keyed by case-insensitive name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hei {
  pub hei_id:     Uuid,
  pub name:       String,
  /// Externally issued institution code, when a source carries one.
  pub code:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A degree program, e.g. "Bachelor of Science in Nursing" / "BSN".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
  pub course_id:    Uuid,
  pub name:         String,
  pub abbreviation: Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// A specialization within a course. Majors form a closed, curated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Major {
  pub major_id:   Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// A scholarship or financial-assistance scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub program_id: Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// An academic year with a canonical `YYYY-YYYY` label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicYear {
  pub academic_year_id: Uuid,
  pub label:            String,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
  pub semester_id: Uuid,
  pub label:       String,
  pub created_at:  DateTime<Utc>,
}
