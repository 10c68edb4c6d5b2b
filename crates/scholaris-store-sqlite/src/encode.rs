//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `%Y-%m-%d`,
//! UUIDs as hyphenated lowercase strings. Each `Raw*` struct holds the column
//! values of one row exactly as read, and is decoded outside the connection
//! thread.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::{
  enrollment::{
    AcademicRecord, BillingAttrs, BillingRecord, Enrollment, EnrollmentAttrs,
    RecordAttrs,
  },
  location::{Location, LocationLevel, LocationRef},
  reference::{AcademicYear, Course, Hei, Major, Program, Semester},
  scholar::{Address, Scholar, Sex},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Option<String> { id.map(encode_uuid) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: Option<NaiveDate>) -> Option<String> {
  d.map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn decode_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
  s.map(|s| {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
  })
  .transpose()
}

pub fn decode_sex(s: Option<&str>) -> Result<Option<Sex>> {
  Ok(s.map(Sex::from_code).transpose()?)
}

// ─── Reference rows ──────────────────────────────────────────────────────────

/// `(id, name-or-label, created_at)`: the shape shared by programs, majors,
/// academic years and semesters.
pub struct RawNamed {
  pub id:         String,
  pub name:       String,
  pub created_at: String,
}

impl RawNamed {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  fn decode(self) -> Result<(Uuid, String, DateTime<Utc>)> {
    Ok((decode_uuid(&self.id)?, self.name, decode_dt(&self.created_at)?))
  }

  pub fn into_program(self) -> Result<Program> {
    let (program_id, name, created_at) = self.decode()?;
    Ok(Program { program_id, name, created_at })
  }

  pub fn into_major(self) -> Result<Major> {
    let (major_id, name, created_at) = self.decode()?;
    Ok(Major { major_id, name, created_at })
  }

  pub fn into_academic_year(self) -> Result<AcademicYear> {
    let (academic_year_id, label, created_at) = self.decode()?;
    Ok(AcademicYear { academic_year_id, label, created_at })
  }

  pub fn into_semester(self) -> Result<Semester> {
    let (semester_id, label, created_at) = self.decode()?;
    Ok(Semester { semester_id, label, created_at })
  }
}

pub struct RawHei {
  pub hei_id:     String,
  pub name:       String,
  pub code:       Option<String>,
  pub created_at: String,
}

impl RawHei {
  pub const COLUMNS: &'static str = "hei_id, name, code, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      hei_id:     row.get(0)?,
      name:       row.get(1)?,
      code:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_hei(self) -> Result<Hei> {
    Ok(Hei {
      hei_id:     decode_uuid(&self.hei_id)?,
      name:       self.name,
      code:       self.code,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawCourse {
  pub course_id:    String,
  pub name:         String,
  pub abbreviation: Option<String>,
  pub created_at:   String,
}

impl RawCourse {
  pub const COLUMNS: &'static str = "course_id, name, abbreviation, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:    row.get(0)?,
      name:         row.get(1)?,
      abbreviation: row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:    decode_uuid(&self.course_id)?,
      name:         self.name,
      abbreviation: self.abbreviation,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawLocation {
  pub location_id: String,
  pub level:       String,
  pub name:        String,
  pub parent_id:   Option<String>,
  pub created_at:  String,
}

impl RawLocation {
  pub const COLUMNS: &'static str =
    "location_id, level, name, parent_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      location_id: row.get(0)?,
      level:       row.get(1)?,
      name:        row.get(2)?,
      parent_id:   row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      location_id: decode_uuid(&self.location_id)?,
      level:       LocationLevel::decode(&self.level)?,
      name:        self.name,
      parent_id:   decode_opt_uuid(self.parent_id.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Scholar rows ────────────────────────────────────────────────────────────

pub struct RawScholar {
  pub scholar_id:     String,
  pub unique_id:      Option<String>,
  pub first_name:     String,
  pub middle_name:    Option<String>,
  pub last_name:      String,
  pub extension_name: Option<String>,
  pub sex:            Option<String>,
  pub birth_date:     Option<String>,
  pub contact_no:     Option<String>,
  pub email_address:  String,
  pub is_pwd:         Option<bool>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawScholar {
  pub const COLUMNS: &'static str = "scholar_id, unique_id, first_name, \
     middle_name, last_name, extension_name, sex, birth_date, contact_no, \
     email_address, is_pwd, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      scholar_id:     row.get(0)?,
      unique_id:      row.get(1)?,
      first_name:     row.get(2)?,
      middle_name:    row.get(3)?,
      last_name:      row.get(4)?,
      extension_name: row.get(5)?,
      sex:            row.get(6)?,
      birth_date:     row.get(7)?,
      contact_no:     row.get(8)?,
      email_address:  row.get(9)?,
      is_pwd:         row.get(10)?,
      created_at:     row.get(11)?,
      updated_at:     row.get(12)?,
    })
  }

  pub fn into_scholar(self) -> Result<Scholar> {
    Ok(Scholar {
      scholar_id:     decode_uuid(&self.scholar_id)?,
      unique_id:      self.unique_id,
      first_name:     self.first_name,
      middle_name:    self.middle_name,
      last_name:      self.last_name,
      extension_name: self.extension_name,
      sex:            decode_sex(self.sex.as_deref())?,
      birth_date:     decode_date(self.birth_date.as_deref())?,
      contact_no:     self.contact_no,
      email_address:  self.email_address,
      is_pwd:         self.is_pwd,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Column values of an `addresses` row: scholar id, then (id, raw) for each
/// of the five levels, then street and zip code.
pub struct RawAddress {
  pub scholar_id: String,
  pub levels:     [(Option<String>, Option<String>); 5],
  pub street:     Option<String>,
  pub zip_code:   Option<String>,
}

impl RawAddress {
  pub const COLUMNS: &'static str = "scholar_id, region_id, region_raw, \
     province_id, province_raw, city_id, city_raw, district_id, district_raw, \
     barangay_id, barangay_raw, street, zip_code";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let level = |i: usize| -> rusqlite::Result<(Option<String>, Option<String>)> {
      Ok((row.get(1 + 2 * i)?, row.get(2 + 2 * i)?))
    };
    Ok(Self {
      scholar_id: row.get(0)?,
      levels:     [level(0)?, level(1)?, level(2)?, level(3)?, level(4)?],
      street:     row.get(11)?,
      zip_code:   row.get(12)?,
    })
  }

  pub fn from_address(address: &Address) -> Self {
    let pair = |l: &LocationRef| (encode_opt_uuid(l.id), l.raw.clone());
    Self {
      scholar_id: encode_uuid(address.scholar_id),
      levels:     [
        pair(&address.region),
        pair(&address.province),
        pair(&address.city),
        pair(&address.district),
        pair(&address.barangay),
      ],
      street:     address.street.clone(),
      zip_code:   address.zip_code.clone(),
    }
  }

  pub fn into_address(self) -> Result<Address> {
    let mut decoded = Vec::with_capacity(5);
    for (id, raw) in self.levels {
      decoded.push(LocationRef { id: decode_opt_uuid(id.as_deref())?, raw });
    }
    let mut it = decoded.into_iter();
    let mut next = || it.next().unwrap_or_default();
    Ok(Address {
      scholar_id: decode_uuid(&self.scholar_id)?,
      region:     next(),
      province:   next(),
      city:       next(),
      district:   next(),
      barangay:   next(),
      street:     self.street,
      zip_code:   self.zip_code,
    })
  }
}

// ─── Enrollment rows ─────────────────────────────────────────────────────────

pub struct RawEnrollment {
  pub enrollment_id:  String,
  pub scholar_id:     String,
  pub program_id:     String,
  pub award_no:       Option<String>,
  pub application_no: Option<String>,
  pub status:         Option<String>,
  pub hei_id:         Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawEnrollment {
  pub const COLUMNS: &'static str = "enrollment_id, scholar_id, program_id, \
     award_no, application_no, status, hei_id, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      enrollment_id:  row.get(0)?,
      scholar_id:     row.get(1)?,
      program_id:     row.get(2)?,
      award_no:       row.get(3)?,
      application_no: row.get(4)?,
      status:         row.get(5)?,
      hei_id:         row.get(6)?,
      created_at:     row.get(7)?,
      updated_at:     row.get(8)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      enrollment_id: decode_uuid(&self.enrollment_id)?,
      scholar_id:    decode_uuid(&self.scholar_id)?,
      program_id:    decode_uuid(&self.program_id)?,
      attrs:         EnrollmentAttrs {
        award_no:       self.award_no,
        application_no: self.application_no,
        status:         self.status,
        hei_id:         decode_opt_uuid(self.hei_id.as_deref())?,
      },
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawRecord {
  pub record_id:         String,
  pub enrollment_id:     String,
  pub academic_year_id:  String,
  pub semester_id:       String,
  pub year_level:        Option<u8>,
  pub course_id:         Option<String>,
  pub major_id:          Option<String>,
  pub grant_amount:      Option<f64>,
  pub validation_status: Option<String>,
  pub payment_status:    Option<String>,
  pub remarks:           Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawRecord {
  pub const COLUMNS: &'static str = "record_id, enrollment_id, \
     academic_year_id, semester_id, year_level, course_id, major_id, \
     grant_amount, validation_status, payment_status, remarks, created_at, \
     updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:         row.get(0)?,
      enrollment_id:     row.get(1)?,
      academic_year_id:  row.get(2)?,
      semester_id:       row.get(3)?,
      year_level:        row.get(4)?,
      course_id:         row.get(5)?,
      major_id:          row.get(6)?,
      grant_amount:      row.get(7)?,
      validation_status: row.get(8)?,
      payment_status:    row.get(9)?,
      remarks:           row.get(10)?,
      created_at:        row.get(11)?,
      updated_at:        row.get(12)?,
    })
  }

  pub fn into_record(self) -> Result<AcademicRecord> {
    Ok(AcademicRecord {
      record_id:        decode_uuid(&self.record_id)?,
      enrollment_id:    decode_uuid(&self.enrollment_id)?,
      academic_year_id: decode_uuid(&self.academic_year_id)?,
      semester_id:      decode_uuid(&self.semester_id)?,
      attrs:            RecordAttrs {
        year_level:        self.year_level,
        course_id:         decode_opt_uuid(self.course_id.as_deref())?,
        major_id:          decode_opt_uuid(self.major_id.as_deref())?,
        grant_amount:      self.grant_amount,
        validation_status: self.validation_status,
        payment_status:    self.payment_status,
        remarks:           self.remarks,
      },
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawBilling {
  pub billing_id:        String,
  pub record_id:         String,
  pub fund_request_date: Option<String>,
  pub disbursement_date: Option<String>,
  pub validated_by:      Option<String>,
  pub billing_amount:    Option<f64>,
  pub billing_status:    Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawBilling {
  pub const COLUMNS: &'static str = "billing_id, record_id, \
     fund_request_date, disbursement_date, validated_by, billing_amount, \
     billing_status, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      billing_id:        row.get(0)?,
      record_id:         row.get(1)?,
      fund_request_date: row.get(2)?,
      disbursement_date: row.get(3)?,
      validated_by:      row.get(4)?,
      billing_amount:    row.get(5)?,
      billing_status:    row.get(6)?,
      created_at:        row.get(7)?,
      updated_at:        row.get(8)?,
    })
  }

  pub fn into_billing(self) -> Result<BillingRecord> {
    Ok(BillingRecord {
      billing_id: decode_uuid(&self.billing_id)?,
      record_id:  decode_uuid(&self.record_id)?,
      attrs:      BillingAttrs {
        fund_request_date: decode_date(self.fund_request_date.as_deref())?,
        disbursement_date: decode_date(self.disbursement_date.as_deref())?,
        validated_by:      self.validated_by,
        billing_amount:    self.billing_amount,
        billing_status:    self.billing_status,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
