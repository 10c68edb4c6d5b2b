//! Enrollments and the per-semester history hanging off them.
//!
//! ```text
//! Scholar ─1:n─ ScholarEnrollment ─1:n─ AcademicRecord ─1:1─ BillingRecord
//! ```
//!
//! Each level has an `*Attrs` struct carrying only what a source row supplied.
//! Attributes are merged with [`MergePolicy::OverwriteNonNull`]: a supplied
//! value replaces the stored one, an omitted value leaves it alone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MergePolicy;

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// Binds one scholar to one program. Unique per (scholar, program).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id: Uuid,
  pub scholar_id:    Uuid,
  pub program_id:    Uuid,
  pub attrs:         EnrollmentAttrs,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentAttrs {
  pub award_no:       Option<String>,
  pub application_no: Option<String>,
  pub status:         Option<String>,
  pub hei_id:         Option<Uuid>,
}

impl EnrollmentAttrs {
  pub fn merge_from(&mut self, incoming: &Self) -> bool {
    let p = Enrollment::POLICY;
    let mut changed = false;
    changed |= p.apply(&mut self.award_no, &incoming.award_no);
    changed |= p.apply(&mut self.application_no, &incoming.application_no);
    changed |= p.apply(&mut self.status, &incoming.status);
    changed |= p.apply(&mut self.hei_id, &incoming.hei_id);
    changed
  }
}

impl Enrollment {
  pub const POLICY: MergePolicy = MergePolicy::OverwriteNonNull;
}

// ─── Academic record ─────────────────────────────────────────────────────────

/// One scholar's history for a single (academic year, semester) under one
/// enrollment. Unique by that triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
  pub record_id:        Uuid,
  pub enrollment_id:    Uuid,
  pub academic_year_id: Uuid,
  pub semester_id:      Uuid,
  pub attrs:            RecordAttrs,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordAttrs {
  pub year_level:        Option<u8>,
  pub course_id:         Option<Uuid>,
  pub major_id:          Option<Uuid>,
  pub grant_amount:      Option<f64>,
  pub validation_status: Option<String>,
  pub payment_status:    Option<String>,
  pub remarks:           Option<String>,
}

impl RecordAttrs {
  pub fn merge_from(&mut self, incoming: &Self) -> bool {
    let p = AcademicRecord::POLICY;
    let mut changed = false;
    changed |= p.apply(&mut self.year_level, &incoming.year_level);
    changed |= p.apply(&mut self.course_id, &incoming.course_id);
    changed |= p.apply(&mut self.major_id, &incoming.major_id);
    changed |= p.apply(&mut self.grant_amount, &incoming.grant_amount);
    changed |= p.apply(&mut self.validation_status, &incoming.validation_status);
    changed |= p.apply(&mut self.payment_status, &incoming.payment_status);
    changed |= p.apply(&mut self.remarks, &incoming.remarks);
    changed
  }
}

impl AcademicRecord {
  pub const POLICY: MergePolicy = MergePolicy::OverwriteNonNull;
}

// ─── Billing ─────────────────────────────────────────────────────────────────

/// Disbursement status attached 1:1 to an academic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
  pub billing_id: Uuid,
  pub record_id:  Uuid,
  pub attrs:      BillingAttrs,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingAttrs {
  pub fund_request_date: Option<NaiveDate>,
  pub disbursement_date: Option<NaiveDate>,
  pub validated_by:      Option<String>,
  pub billing_amount:    Option<f64>,
  pub billing_status:    Option<String>,
}

impl BillingAttrs {
  pub fn merge_from(&mut self, incoming: &Self) -> bool {
    let p = BillingRecord::POLICY;
    let mut changed = false;
    changed |= p.apply(&mut self.fund_request_date, &incoming.fund_request_date);
    changed |= p.apply(&mut self.disbursement_date, &incoming.disbursement_date);
    changed |= p.apply(&mut self.validated_by, &incoming.validated_by);
    changed |= p.apply(&mut self.billing_amount, &incoming.billing_amount);
    changed |= p.apply(&mut self.billing_status, &incoming.billing_status);
    changed
  }

  /// A row with no billing columns produces no billing record.
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

impl BillingRecord {
  pub const POLICY: MergePolicy = MergePolicy::OverwriteNonNull;
}
