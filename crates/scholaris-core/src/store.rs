//! The `RegistryStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g.
//! `scholaris-store-sqlite`). The import pipeline depends on this abstraction,
//! not on any concrete backend.
//!
//! Backends must enforce uniqueness of every natural key named below. The
//! pipeline tolerates racing writers by relying on that: the `get_or_create_*`
//! methods are atomic, and an `insert_*` that loses a race fails with an error
//! whose [`StoreError::is_conflict`] is true so the caller can re-read the
//! winner and update it instead.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  enrollment::{
    AcademicRecord, BillingAttrs, BillingRecord, Enrollment, EnrollmentAttrs,
    RecordAttrs,
  },
  location::{Location, LocationLevel, LocationScope},
  reference::{AcademicYear, Course, Hei, Major, Program, Semester},
  scholar::{Address, NewScholar, Scholar},
};

// ─── Error classification ────────────────────────────────────────────────────

/// Lets backend-agnostic code tell expected race losses and outages apart
/// from other failures.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// A unique constraint rejected the write.
  fn is_conflict(&self) -> bool;

  /// The backend can no longer serve requests.
  fn is_unavailable(&self) -> bool;
}

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Row counts per table, as returned by [`RegistryStore::counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
  pub scholars:         u64,
  pub addresses:        u64,
  pub enrollments:      u64,
  pub academic_records: u64,
  pub billing_records:  u64,
  pub heis:             u64,
  pub courses:          u64,
  pub majors:           u64,
  pub programs:         u64,
  pub academic_years:   u64,
  pub semesters:        u64,
  pub locations:        u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Scholaris registry backend.
///
/// Nothing is ever deleted: corrections arrive as later imports that update
/// rows in place.
///
/// All name lookups are case-insensitive. All methods return `Send` futures
/// so import jobs can run on a multi-threaded runtime.
pub trait RegistryStore: Send + Sync {
  type Error: StoreError;

  // ── Programs, academic years, semesters ──────────────────────────────

  fn find_program<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Program>, Self::Error>> + Send + 'a;

  fn get_or_create_program<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + 'a;

  fn get_or_create_academic_year<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<AcademicYear, Self::Error>> + Send + 'a;

  fn get_or_create_semester<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Semester, Self::Error>> + Send + 'a;

  // ── Institutions ─────────────────────────────────────────────────────

  /// Exact, case-insensitive name match.
  fn find_hei_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Hei>, Self::Error>> + Send + 'a;

  fn find_hei_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Hei>, Self::Error>> + Send + 'a;

  /// The institution with the shortest name containing `fragment`
  /// (case-insensitive), ties broken by name.
  fn find_hei_containing<'a>(
    &'a self,
    fragment: &'a str,
  ) -> impl Future<Output = Result<Option<Hei>, Self::Error>> + Send + 'a;

  /// Atomically return the institution named `name`, creating it if absent.
  /// A supplied `code` is recorded on creation only.
  fn get_or_create_hei<'a>(
    &'a self,
    name: &'a str,
    code: Option<&'a str>,
  ) -> impl Future<Output = Result<Hei, Self::Error>> + Send + 'a;

  // ── Courses and majors ───────────────────────────────────────────────

  /// Exact match against either the course name or its abbreviation.
  fn find_course<'a>(
    &'a self,
    term: &'a str,
  ) -> impl Future<Output = Result<Option<Course>, Self::Error>> + Send + 'a;

  fn get_or_create_course<'a>(
    &'a self,
    name: &'a str,
    abbreviation: Option<&'a str>,
  ) -> impl Future<Output = Result<Course, Self::Error>> + Send + 'a;

  fn find_major<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Major>, Self::Error>> + Send + 'a;

  /// Only reference seeding creates majors; the import pipeline never does.
  fn get_or_create_major<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Major, Self::Error>> + Send + 'a;

  // ── Locations ────────────────────────────────────────────────────────

  fn find_location<'a>(
    &'a self,
    level: LocationLevel,
    scope: LocationScope,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + 'a;

  /// Atomically return the node `name` at `level` under `parent`, creating
  /// it if absent.
  fn get_or_create_location<'a>(
    &'a self,
    level: LocationLevel,
    parent_id: Option<Uuid>,
    name: &'a str,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + 'a;

  // ── Scholars ─────────────────────────────────────────────────────────

  fn get_scholar(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Scholar>, Self::Error>> + Send + '_;

  fn find_scholar_by_unique_id<'a>(
    &'a self,
    unique_id: &'a str,
  ) -> impl Future<Output = Result<Option<Scholar>, Self::Error>> + Send + 'a;

  fn find_scholar_by_name_and_birth_date<'a>(
    &'a self,
    first_name: &'a str,
    last_name: &'a str,
    birth_date: NaiveDate,
  ) -> impl Future<Output = Result<Option<Scholar>, Self::Error>> + Send + 'a;

  /// Match on (first, last, middle); an absent middle name only matches an
  /// absent middle name.
  fn find_scholar_by_full_name<'a>(
    &'a self,
    first_name: &'a str,
    last_name: &'a str,
    middle_name: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<Scholar>, Self::Error>> + Send + 'a;

  /// Persist a new scholar. Fails with a conflict if another writer stored
  /// the same unique id or (name, birth date) first.
  fn insert_scholar(
    &self,
    input: NewScholar,
  ) -> impl Future<Output = Result<Scholar, Self::Error>> + Send + '_;

  /// Overwrite the mutable columns of an existing scholar and bump
  /// `updated_at`.
  fn update_scholar<'a>(
    &'a self,
    scholar: &'a Scholar,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_address(
    &self,
    scholar_id: Uuid,
  ) -> impl Future<Output = Result<Option<Address>, Self::Error>> + Send + '_;

  /// Insert or replace the address of `address.scholar_id`.
  fn put_address<'a>(
    &'a self,
    address: &'a Address,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Enrollments ──────────────────────────────────────────────────────

  fn find_enrollment(
    &self,
    scholar_id: Uuid,
    program_id: Uuid,
  ) -> impl Future<Output = Result<Option<Enrollment>, Self::Error>> + Send + '_;

  fn insert_enrollment(
    &self,
    scholar_id: Uuid,
    program_id: Uuid,
    attrs: EnrollmentAttrs,
  ) -> impl Future<Output = Result<Enrollment, Self::Error>> + Send + '_;

  fn update_enrollment<'a>(
    &'a self,
    enrollment: &'a Enrollment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Academic records ─────────────────────────────────────────────────

  fn find_academic_record(
    &self,
    enrollment_id: Uuid,
    academic_year_id: Uuid,
    semester_id: Uuid,
  ) -> impl Future<Output = Result<Option<AcademicRecord>, Self::Error>> + Send + '_;

  fn insert_academic_record(
    &self,
    enrollment_id: Uuid,
    academic_year_id: Uuid,
    semester_id: Uuid,
    attrs: RecordAttrs,
  ) -> impl Future<Output = Result<AcademicRecord, Self::Error>> + Send + '_;

  fn update_academic_record<'a>(
    &'a self,
    record: &'a AcademicRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Billing records ──────────────────────────────────────────────────

  fn find_billing_record(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<BillingRecord>, Self::Error>> + Send + '_;

  fn insert_billing_record(
    &self,
    record_id: Uuid,
    attrs: BillingAttrs,
  ) -> impl Future<Output = Result<BillingRecord, Self::Error>> + Send + '_;

  fn update_billing_record<'a>(
    &'a self,
    billing: &'a BillingRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Bookkeeping ──────────────────────────────────────────────────────

  fn counts(
    &self,
  ) -> impl Future<Output = Result<EntityCounts, Self::Error>> + Send + '_;
}
