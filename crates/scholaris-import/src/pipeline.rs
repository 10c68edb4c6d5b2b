//! The per-row pipeline: normalise, resolve references, then upsert the
//! scholar and their enrollment history.

use scholaris_core::{
  RegistryStore, UpsertOutcome,
  enrollment::{BillingAttrs, EnrollmentAttrs, RecordAttrs},
  scholar::ScholarDraft,
};
use scholaris_sheet::{Field, SourceLayout, SourceRow, normalize};
use uuid::Uuid;

use crate::{
  cache::ResolutionCache,
  config::HeiAlias,
  course::{CourseResolver, ParsedCourse, parse_course},
  error::Result,
  geo::{self, RawAddress},
  hei::HeiResolver,
  identity::{self, IdentityMatch, split_full_name},
  upsert,
};

// ─── Typed row ───────────────────────────────────────────────────────────────

/// The normalised content of one source row. Built once; every later stage
/// reads from here rather than from the cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
  pub scholar:       ScholarDraft,
  pub address:       RawAddress,
  pub street:        Option<String>,
  pub zip_code:      Option<String>,
  pub hei_name:      Option<String>,
  pub hei_code:      Option<String>,
  pub course:        Option<ParsedCourse>,
  pub award_no:      Option<String>,
  pub application_no: Option<String>,
  pub status:        Option<String>,
  /// Canonical `YYYY-YYYY`.
  pub academic_year: Option<String>,
  /// Canonical semester label.
  pub semester:      Option<String>,
  /// Academic record attributes, minus the resolved course and major.
  pub record:        RecordAttrs,
  pub billing:       BillingAttrs,
}

impl RowRecord {
  /// Normalise `row`. Fails only on values too malformed to guess at, such
  /// as an academic year whose halves are not consecutive.
  pub fn from_row(row: &impl SourceRow) -> Result<Self> {
    let text = |f: Field| row.text(f);
    // A cell that is present and not a sentinel.
    let filled = |f: Field| row.cell(f).filter(|c| normalize::clean_cell(c).is_some());

    let mut scholar = ScholarDraft {
      unique_id:      text(Field::UniqueId),
      first_name:     text(Field::FirstName),
      middle_name:    text(Field::MiddleName),
      last_name:      text(Field::LastName),
      extension_name: text(Field::ExtensionName),
      sex:            text(Field::Sex).and_then(|s| normalize::parse_sex(&s)),
      birth_date:     filled(Field::BirthDate).and_then(normalize::date_cell),
      contact_no:     text(Field::ContactNo).and_then(|s| normalize::clean_phone(&s)),
      email_address:  text(Field::Email).and_then(|s| normalize::validate_email(&s)),
      is_pwd:         row.cell(Field::IsPwd).and_then(normalize::bool_cell),
    };

    // Separate name columns win over a combined one.
    if let Some(full) = text(Field::FullName) {
      let parts = split_full_name(&full);
      if scholar.first_name.is_none() && scholar.last_name.is_none() {
        scholar.middle_name = scholar.middle_name.or(parts.middle);
      }
      scholar.first_name = scholar.first_name.or(parts.first);
      scholar.last_name = scholar.last_name.or(parts.last);
      scholar.extension_name = scholar.extension_name.or(parts.extension);
    }

    let mut course = text(Field::Course).map(|c| parse_course(&c));
    if let (Some(course), Some(major)) = (&mut course, text(Field::Major)) {
      course.major = Some(major);
    }

    let academic_year = text(Field::AcademicYear)
      .map(|ay| normalize::academic_year(&ay))
      .transpose()?;

    Ok(Self {
      scholar,
      address: RawAddress {
        region:   text(Field::Region),
        province: text(Field::Province),
        city:     text(Field::City),
        district: text(Field::District),
        barangay: text(Field::Barangay),
      },
      street: text(Field::Street),
      zip_code: text(Field::ZipCode),
      hei_name: text(Field::HeiName),
      hei_code: text(Field::HeiCode),
      course,
      award_no: text(Field::AwardNo),
      application_no: text(Field::ApplicationNo),
      status: text(Field::Status),
      academic_year,
      semester: text(Field::Semester).map(|s| normalize::semester(&s)),
      record: RecordAttrs {
        year_level: filled(Field::YearLevel).and_then(normalize::year_level_cell),
        grant_amount: filled(Field::GrantAmount).map(normalize::currency_cell),
        validation_status: text(Field::ValidationStatus),
        payment_status: text(Field::PaymentStatus),
        remarks: text(Field::Remarks),
        ..Default::default()
      },
      billing: BillingAttrs {
        fund_request_date: filled(Field::FundRequestDate).and_then(normalize::date_cell),
        disbursement_date: filled(Field::DisbursementDate).and_then(normalize::date_cell),
        validated_by:      text(Field::ValidatedBy),
        billing_amount:    filled(Field::BillingAmount).map(normalize::currency_cell),
        billing_status:    text(Field::BillingStatus),
      },
    })
  }

  /// Whether the row could identify anyone at all.
  fn is_identifiable(&self) -> bool {
    let s = &self.scholar;
    s.unique_id.is_some() || (s.first_name.is_some() && s.last_name.is_some())
  }
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a row was skipped without being treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// Nothing but blank cells.
  Blank,
  /// No usable name; carries whatever identifying fragment there was.
  Unidentifiable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
  Imported { scholar: UpsertOutcome },
  Skipped(SkipReason),
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// The per-job constants every row shares.
pub struct RowPipeline<'a> {
  pub program_id: Uuid,
  pub layout:     &'a SourceLayout,
  pub aliases:    &'a [HeiAlias],
}

impl RowPipeline<'_> {
  /// Run one row end to end. Any error is the row's alone: the caller logs
  /// it and moves on.
  pub async fn process<S: RegistryStore, R: SourceRow + Sync>(
    &self,
    store: &S,
    cache: &mut ResolutionCache,
    row: &R,
  ) -> Result<RowOutcome> {
    if row.is_blank() {
      return Ok(RowOutcome::Skipped(SkipReason::Blank));
    }
    let rec = RowRecord::from_row(row)?;
    if !rec.is_identifiable() {
      return Ok(RowOutcome::Skipped(SkipReason::Unidentifiable(
        rec.scholar.fragment(),
      )));
    }

    // Identity first, so a rejected row creates no reference rows.
    let matched = identity::resolve_identity(store, &rec.scholar).await?;
    if let IdentityMatch::Rejected(fragment) = matched {
      return Ok(RowOutcome::Skipped(SkipReason::Unidentifiable(fragment)));
    }

    // Reference resolution; the three resolvers are independent.
    let address =
      geo::resolve_address(store, cache, &rec.address, self.layout.geo_policy).await?;

    let hei_id = HeiResolver {
      aliases: self.aliases,
      policy:  self.layout.hei_policy,
    }
    .resolve(store, cache, rec.hei_name.as_deref(), rec.hei_code.as_deref())
    .await?;

    let courses = CourseResolver {
      policy: self.layout.course_policy,
    };
    let (course_id, major_id) = match &rec.course {
      Some(parsed) => {
        let course_id = courses.resolve_course(store, cache, &parsed.course).await?;
        let major_id = match &parsed.major {
          Some(major) => courses.resolve_major(store, cache, major).await?,
          None => None,
        };
        (course_id, major_id)
      }
      None => (None, None),
    };

    // Scholar and address.
    let Some((scholar, outcome)) = upsert::save_scholar(store, &rec.scholar, matched).await?
    else {
      return Ok(RowOutcome::Skipped(SkipReason::Unidentifiable(
        rec.scholar.fragment(),
      )));
    };
    let address = address.into_address(scholar.scholar_id, rec.street, rec.zip_code);
    upsert::upsert_address(store, &address).await?;

    // Enrollment history.
    let (enrollment, _) = upsert::upsert_enrollment(
      store,
      scholar.scholar_id,
      self.program_id,
      EnrollmentAttrs {
        award_no: rec.award_no,
        application_no: rec.application_no,
        status: rec.status,
        hei_id,
      },
    )
    .await?;

    match (&rec.academic_year, &rec.semester) {
      (Some(year), Some(semester)) => {
        let academic_year_id = cache.academic_year(store, year).await?;
        let semester_id = cache.semester(store, semester).await?;
        let (record, _) = upsert::upsert_academic_record(
          store,
          enrollment.enrollment_id,
          academic_year_id,
          semester_id,
          RecordAttrs {
            course_id,
            major_id,
            ..rec.record
          },
        )
        .await?;
        if !rec.billing.is_empty() {
          upsert::upsert_billing_record(store, record.record_id, rec.billing).await?;
        }
      }
      _ if rec.record != RecordAttrs::default()
        || !rec.billing.is_empty()
        || course_id.is_some() =>
      {
        tracing::debug!(
          row = row.row_number(),
          "no academic year and semester; academic record not written"
        );
      }
      _ => {}
    }

    Ok(RowOutcome::Imported { scholar: outcome })
  }
}
