//! [`SqliteStore`], the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use scholaris_core::{
  enrollment::{
    AcademicRecord, BillingAttrs, BillingRecord, Enrollment, EnrollmentAttrs,
    RecordAttrs,
  },
  location::{Location, LocationLevel, LocationScope},
  reference::{AcademicYear, Course, Hei, Major, Program, Semester},
  scholar::{Address, NewScholar, Scholar},
  store::{EntityCounts, RegistryStore},
};

use crate::{
  Error, Result,
  encode::{
    RawAddress, RawBilling, RawCourse, RawEnrollment, RawHei, RawLocation,
    RawNamed, RawRecord, RawScholar, encode_date, encode_dt, encode_opt_uuid,
    encode_uuid,
  },
  schema::{SCHEMA, UNICASE, unicase},
};

/// Escape `%`, `_` and `\` for use inside a `LIKE … ESCAPE '\'` pattern.
fn like_escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scholaris registry backed by a single SQLite file.
///
/// Cloning is cheap (the inner connection is reference-counted) and clones
/// share the one connection thread, so concurrent import jobs can each hold
/// their own handle.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.create_collation(UNICASE, unicase)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema ready");
    Ok(())
  }

  /// Run a single-row query; `None` when no row matches.
  async fn query_opt<T, F>(
    &self,
    sql: String,
    params: Vec<Value>,
    map: F,
  ) -> Result<Option<T>>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(&sql, rusqlite::params_from_iter(params), map)
              .optional()?,
          )
        })
        .await?,
    )
  }

  /// Run a statement that writes rows.
  async fn execute(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.execute(sql, rusqlite::params_from_iter(params))?)
        })
        .await?,
    )
  }

  /// Insert a `(id, name, created_at)` row unless the name is taken, then
  /// read back whichever row owns the name. One connection call, so atomic.
  async fn get_or_create_named(
    &self,
    table: &'static str,
    id_col: &'static str,
    name_col: &'static str,
    name: &str,
  ) -> Result<RawNamed> {
    let insert = format!(
      "INSERT INTO {table} ({id_col}, {name_col}, created_at) VALUES (?1, ?2, ?3)
       ON CONFLICT DO NOTHING"
    );
    let select = format!(
      "SELECT {id_col}, {name_col}, created_at FROM {table} WHERE {name_col} = ?1"
    );
    let id = encode_uuid(Uuid::new_v4());
    let name = name.to_owned();
    let at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&insert, rusqlite::params![id, name, at])?;
        let raw = tx
          .query_row(&select, rusqlite::params![name], RawNamed::from_row)
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;
    raw.ok_or(Error::Missing(table))
  }

  async fn find_named(
    &self,
    table: &'static str,
    id_col: &'static str,
    name_col: &'static str,
    name: &str,
  ) -> Result<Option<RawNamed>> {
    self
      .query_opt(
        format!(
          "SELECT {id_col}, {name_col}, created_at FROM {table} WHERE {name_col} = ?1"
        ),
        vec![name.to_owned().into()],
        RawNamed::from_row,
      )
      .await
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Programs, academic years, semesters ───────────────────────────────────

  async fn find_program(&self, name: &str) -> Result<Option<Program>> {
    self
      .find_named("programs", "program_id", "name", name)
      .await?
      .map(RawNamed::into_program)
      .transpose()
  }

  async fn get_or_create_program(&self, name: &str) -> Result<Program> {
    self
      .get_or_create_named("programs", "program_id", "name", name)
      .await?
      .into_program()
  }

  async fn get_or_create_academic_year(&self, label: &str) -> Result<AcademicYear> {
    self
      .get_or_create_named("academic_years", "academic_year_id", "label", label)
      .await?
      .into_academic_year()
  }

  async fn get_or_create_semester(&self, label: &str) -> Result<Semester> {
    self
      .get_or_create_named("semesters", "semester_id", "label", label)
      .await?
      .into_semester()
  }

  // ── Institutions ──────────────────────────────────────────────────────────

  async fn find_hei_by_name(&self, name: &str) -> Result<Option<Hei>> {
    self
      .query_opt(
        format!("SELECT {} FROM heis WHERE name = ?1", RawHei::COLUMNS),
        vec![name.to_owned().into()],
        RawHei::from_row,
      )
      .await?
      .map(RawHei::into_hei)
      .transpose()
  }

  async fn find_hei_by_code(&self, code: &str) -> Result<Option<Hei>> {
    self
      .query_opt(
        format!("SELECT {} FROM heis WHERE code = ?1", RawHei::COLUMNS),
        vec![code.to_owned().into()],
        RawHei::from_row,
      )
      .await?
      .map(RawHei::into_hei)
      .transpose()
  }

  async fn find_hei_containing(&self, fragment: &str) -> Result<Option<Hei>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM heis
           WHERE name LIKE '%' || ?1 || '%' ESCAPE '\\'
           ORDER BY length(name), name
           LIMIT 1",
          RawHei::COLUMNS
        ),
        vec![like_escape(fragment).into()],
        RawHei::from_row,
      )
      .await?
      .map(RawHei::into_hei)
      .transpose()
  }

  async fn get_or_create_hei(&self, name: &str, code: Option<&str>) -> Result<Hei> {
    let id = encode_uuid(Uuid::new_v4());
    let name = name.to_owned();
    let code = code.map(str::to_owned);
    let at = encode_dt(Utc::now());
    let select = format!("SELECT {} FROM heis WHERE name = ?1", RawHei::COLUMNS);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // A code already owned by another institution is dropped rather
        // than failing the whole creation.
        let code_taken = match &code {
          Some(c) => tx
            .query_row("SELECT 1 FROM heis WHERE code = ?1", [c], |_| Ok(()))
            .optional()?
            .is_some(),
          None => false,
        };
        let code = if code_taken { None } else { code };
        tx.execute(
          "INSERT INTO heis (hei_id, name, code, created_at) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT DO NOTHING",
          rusqlite::params![id, name, code, at],
        )?;
        let raw = tx
          .query_row(&select, rusqlite::params![name], RawHei::from_row)
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(Error::Missing("heis"))?.into_hei()
  }

  // ── Courses and majors ────────────────────────────────────────────────────

  async fn find_course(&self, term: &str) -> Result<Option<Course>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM courses
           WHERE name = ?1 OR abbreviation = ?1
           ORDER BY (name = ?1) DESC, name
           LIMIT 1",
          RawCourse::COLUMNS
        ),
        vec![term.to_owned().into()],
        RawCourse::from_row,
      )
      .await?
      .map(RawCourse::into_course)
      .transpose()
  }

  async fn get_or_create_course(
    &self,
    name: &str,
    abbreviation: Option<&str>,
  ) -> Result<Course> {
    let id = encode_uuid(Uuid::new_v4());
    let name = name.to_owned();
    let abbreviation = abbreviation.map(str::to_owned);
    let at = encode_dt(Utc::now());
    let select = format!("SELECT {} FROM courses WHERE name = ?1", RawCourse::COLUMNS);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO courses (course_id, name, abbreviation, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT DO NOTHING",
          rusqlite::params![id, name, abbreviation, at],
        )?;
        let raw = tx
          .query_row(&select, rusqlite::params![name], RawCourse::from_row)
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(Error::Missing("courses"))?.into_course()
  }

  async fn find_major(&self, name: &str) -> Result<Option<Major>> {
    self
      .find_named("majors", "major_id", "name", name)
      .await?
      .map(RawNamed::into_major)
      .transpose()
  }

  async fn get_or_create_major(&self, name: &str) -> Result<Major> {
    self
      .get_or_create_named("majors", "major_id", "name", name)
      .await?
      .into_major()
  }

  // ── Locations ─────────────────────────────────────────────────────────────

  async fn find_location(
    &self,
    level: LocationLevel,
    scope: LocationScope,
    name: &str,
  ) -> Result<Option<Location>> {
    let (sql, params): (String, Vec<Value>) = match scope {
      LocationScope::Anywhere => (
        format!(
          "SELECT {} FROM locations WHERE level = ?1 AND name = ?2
           ORDER BY created_at, location_id LIMIT 1",
          RawLocation::COLUMNS
        ),
        vec![level.to_string().into(), name.to_owned().into()],
      ),
      LocationScope::Under(parent) => (
        format!(
          "SELECT {} FROM locations
           WHERE level = ?1 AND parent_key = ?2 AND name = ?3",
          RawLocation::COLUMNS
        ),
        vec![
          level.to_string().into(),
          encode_uuid(parent).into(),
          name.to_owned().into(),
        ],
      ),
    };

    self
      .query_opt(sql, params, RawLocation::from_row)
      .await?
      .map(RawLocation::into_location)
      .transpose()
  }

  async fn get_or_create_location(
    &self,
    level: LocationLevel,
    parent_id: Option<Uuid>,
    name: &str,
  ) -> Result<Location> {
    let id = encode_uuid(Uuid::new_v4());
    let level_str = level.to_string();
    let parent = encode_opt_uuid(parent_id);
    let parent_key = parent.clone().unwrap_or_default();
    let name = name.to_owned();
    let at = encode_dt(Utc::now());
    let select = format!(
      "SELECT {} FROM locations WHERE level = ?1 AND parent_key = ?2 AND name = ?3",
      RawLocation::COLUMNS
    );

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO locations (location_id, level, name, parent_id, parent_key, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT DO NOTHING",
          rusqlite::params![id, level_str, name, parent, parent_key, at],
        )?;
        let raw = tx
          .query_row(
            &select,
            rusqlite::params![level_str, parent_key, name],
            RawLocation::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(Error::Missing("locations"))?.into_location()
  }

  // ── Scholars ──────────────────────────────────────────────────────────────

  async fn get_scholar(&self, id: Uuid) -> Result<Option<Scholar>> {
    self
      .query_opt(
        format!("SELECT {} FROM scholars WHERE scholar_id = ?1", RawScholar::COLUMNS),
        vec![encode_uuid(id).into()],
        RawScholar::from_row,
      )
      .await?
      .map(RawScholar::into_scholar)
      .transpose()
  }

  async fn find_scholar_by_unique_id(&self, unique_id: &str) -> Result<Option<Scholar>> {
    self
      .query_opt(
        format!("SELECT {} FROM scholars WHERE unique_id = ?1", RawScholar::COLUMNS),
        vec![unique_id.to_owned().into()],
        RawScholar::from_row,
      )
      .await?
      .map(RawScholar::into_scholar)
      .transpose()
  }

  async fn find_scholar_by_name_and_birth_date(
    &self,
    first_name: &str,
    last_name: &str,
    birth_date: NaiveDate,
  ) -> Result<Option<Scholar>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM scholars
           WHERE first_name = ?1 AND last_name = ?2 AND birth_date = ?3
           ORDER BY created_at LIMIT 1",
          RawScholar::COLUMNS
        ),
        vec![
          first_name.to_owned().into(),
          last_name.to_owned().into(),
          encode_date(Some(birth_date)).into(),
        ],
        RawScholar::from_row,
      )
      .await?
      .map(RawScholar::into_scholar)
      .transpose()
  }

  async fn find_scholar_by_full_name(
    &self,
    first_name: &str,
    last_name: &str,
    middle_name: Option<&str>,
  ) -> Result<Option<Scholar>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM scholars
           WHERE first_name = ?1 AND last_name = ?2
             AND ((?3 IS NULL AND middle_name IS NULL) OR middle_name = ?3)
           ORDER BY created_at LIMIT 1",
          RawScholar::COLUMNS
        ),
        vec![
          first_name.to_owned().into(),
          last_name.to_owned().into(),
          middle_name.map(str::to_owned).into(),
        ],
        RawScholar::from_row,
      )
      .await?
      .map(RawScholar::into_scholar)
      .transpose()
  }

  async fn insert_scholar(&self, input: NewScholar) -> Result<Scholar> {
    let now = Utc::now();
    let scholar = Scholar {
      scholar_id:     Uuid::new_v4(),
      unique_id:      input.unique_id,
      first_name:     input.first_name,
      middle_name:    input.middle_name,
      last_name:      input.last_name,
      extension_name: input.extension_name,
      sex:            input.sex,
      birth_date:     input.birth_date,
      contact_no:     input.contact_no,
      email_address:  input.email_address,
      is_pwd:         input.is_pwd,
      created_at:     now,
      updated_at:     now,
    };

    self
      .execute(
        "INSERT INTO scholars (
           scholar_id, unique_id, first_name, middle_name, last_name,
           extension_name, sex, birth_date, contact_no, email_address, is_pwd,
           created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        vec![
          encode_uuid(scholar.scholar_id).into(),
          scholar.unique_id.clone().into(),
          scholar.first_name.clone().into(),
          scholar.middle_name.clone().into(),
          scholar.last_name.clone().into(),
          scholar.extension_name.clone().into(),
          scholar.sex.map(|s| s.code().to_owned()).into(),
          encode_date(scholar.birth_date).into(),
          scholar.contact_no.clone().into(),
          scholar.email_address.clone().into(),
          scholar.is_pwd.into(),
          encode_dt(now).into(),
          encode_dt(now).into(),
        ],
      )
      .await?;

    Ok(scholar)
  }

  async fn update_scholar(&self, scholar: &Scholar) -> Result<()> {
    self
      .execute(
        "UPDATE scholars SET
           unique_id = ?2, first_name = ?3, middle_name = ?4, last_name = ?5,
           extension_name = ?6, sex = ?7, birth_date = ?8, contact_no = ?9,
           email_address = ?10, is_pwd = ?11, updated_at = ?12
         WHERE scholar_id = ?1",
        vec![
          encode_uuid(scholar.scholar_id).into(),
          scholar.unique_id.clone().into(),
          scholar.first_name.clone().into(),
          scholar.middle_name.clone().into(),
          scholar.last_name.clone().into(),
          scholar.extension_name.clone().into(),
          scholar.sex.map(|s| s.code().to_owned()).into(),
          encode_date(scholar.birth_date).into(),
          scholar.contact_no.clone().into(),
          scholar.email_address.clone().into(),
          scholar.is_pwd.into(),
          encode_dt(Utc::now()).into(),
        ],
      )
      .await?;
    Ok(())
  }

  async fn get_address(&self, scholar_id: Uuid) -> Result<Option<Address>> {
    self
      .query_opt(
        format!("SELECT {} FROM addresses WHERE scholar_id = ?1", RawAddress::COLUMNS),
        vec![encode_uuid(scholar_id).into()],
        RawAddress::from_row,
      )
      .await?
      .map(RawAddress::into_address)
      .transpose()
  }

  async fn put_address(&self, address: &Address) -> Result<()> {
    let raw = RawAddress::from_address(address);
    let mut params: Vec<Value> = vec![raw.scholar_id.into()];
    for (id, text) in raw.levels {
      params.push(id.into());
      params.push(text.into());
    }
    params.push(raw.street.into());
    params.push(raw.zip_code.into());

    self
      .execute(
        "INSERT INTO addresses (
           scholar_id, region_id, region_raw, province_id, province_raw,
           city_id, city_raw, district_id, district_raw, barangay_id,
           barangay_raw, street, zip_code
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT (scholar_id) DO UPDATE SET
           region_id = excluded.region_id,     region_raw = excluded.region_raw,
           province_id = excluded.province_id, province_raw = excluded.province_raw,
           city_id = excluded.city_id,         city_raw = excluded.city_raw,
           district_id = excluded.district_id, district_raw = excluded.district_raw,
           barangay_id = excluded.barangay_id, barangay_raw = excluded.barangay_raw,
           street = excluded.street,           zip_code = excluded.zip_code",
        params,
      )
      .await?;
    Ok(())
  }

  // ── Enrollments ───────────────────────────────────────────────────────────

  async fn find_enrollment(
    &self,
    scholar_id: Uuid,
    program_id: Uuid,
  ) -> Result<Option<Enrollment>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM enrollments WHERE scholar_id = ?1 AND program_id = ?2",
          RawEnrollment::COLUMNS
        ),
        vec![encode_uuid(scholar_id).into(), encode_uuid(program_id).into()],
        RawEnrollment::from_row,
      )
      .await?
      .map(RawEnrollment::into_enrollment)
      .transpose()
  }

  async fn insert_enrollment(
    &self,
    scholar_id: Uuid,
    program_id: Uuid,
    attrs: EnrollmentAttrs,
  ) -> Result<Enrollment> {
    let now = Utc::now();
    let enrollment = Enrollment {
      enrollment_id: Uuid::new_v4(),
      scholar_id,
      program_id,
      attrs,
      created_at: now,
      updated_at: now,
    };
    let a = &enrollment.attrs;

    self
      .execute(
        "INSERT INTO enrollments (
           enrollment_id, scholar_id, program_id, award_no, application_no,
           status, hei_id, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          encode_uuid(enrollment.enrollment_id).into(),
          encode_uuid(scholar_id).into(),
          encode_uuid(program_id).into(),
          a.award_no.clone().into(),
          a.application_no.clone().into(),
          a.status.clone().into(),
          encode_opt_uuid(a.hei_id).into(),
          encode_dt(now).into(),
          encode_dt(now).into(),
        ],
      )
      .await?;

    Ok(enrollment)
  }

  async fn update_enrollment(&self, enrollment: &Enrollment) -> Result<()> {
    let a = &enrollment.attrs;
    self
      .execute(
        "UPDATE enrollments SET
           award_no = ?2, application_no = ?3, status = ?4, hei_id = ?5,
           updated_at = ?6
         WHERE enrollment_id = ?1",
        vec![
          encode_uuid(enrollment.enrollment_id).into(),
          a.award_no.clone().into(),
          a.application_no.clone().into(),
          a.status.clone().into(),
          encode_opt_uuid(a.hei_id).into(),
          encode_dt(Utc::now()).into(),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Academic records ──────────────────────────────────────────────────────

  async fn find_academic_record(
    &self,
    enrollment_id: Uuid,
    academic_year_id: Uuid,
    semester_id: Uuid,
  ) -> Result<Option<AcademicRecord>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM academic_records
           WHERE enrollment_id = ?1 AND academic_year_id = ?2 AND semester_id = ?3",
          RawRecord::COLUMNS
        ),
        vec![
          encode_uuid(enrollment_id).into(),
          encode_uuid(academic_year_id).into(),
          encode_uuid(semester_id).into(),
        ],
        RawRecord::from_row,
      )
      .await?
      .map(RawRecord::into_record)
      .transpose()
  }

  async fn insert_academic_record(
    &self,
    enrollment_id: Uuid,
    academic_year_id: Uuid,
    semester_id: Uuid,
    attrs: RecordAttrs,
  ) -> Result<AcademicRecord> {
    let now = Utc::now();
    let record = AcademicRecord {
      record_id: Uuid::new_v4(),
      enrollment_id,
      academic_year_id,
      semester_id,
      attrs,
      created_at: now,
      updated_at: now,
    };
    let a = &record.attrs;

    self
      .execute(
        "INSERT INTO academic_records (
           record_id, enrollment_id, academic_year_id, semester_id, year_level,
           course_id, major_id, grant_amount, validation_status,
           payment_status, remarks, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        vec![
          encode_uuid(record.record_id).into(),
          encode_uuid(enrollment_id).into(),
          encode_uuid(academic_year_id).into(),
          encode_uuid(semester_id).into(),
          a.year_level.into(),
          encode_opt_uuid(a.course_id).into(),
          encode_opt_uuid(a.major_id).into(),
          a.grant_amount.into(),
          a.validation_status.clone().into(),
          a.payment_status.clone().into(),
          a.remarks.clone().into(),
          encode_dt(now).into(),
          encode_dt(now).into(),
        ],
      )
      .await?;

    Ok(record)
  }

  async fn update_academic_record(&self, record: &AcademicRecord) -> Result<()> {
    let a = &record.attrs;
    self
      .execute(
        "UPDATE academic_records SET
           year_level = ?2, course_id = ?3, major_id = ?4, grant_amount = ?5,
           validation_status = ?6, payment_status = ?7, remarks = ?8,
           updated_at = ?9
         WHERE record_id = ?1",
        vec![
          encode_uuid(record.record_id).into(),
          a.year_level.into(),
          encode_opt_uuid(a.course_id).into(),
          encode_opt_uuid(a.major_id).into(),
          a.grant_amount.into(),
          a.validation_status.clone().into(),
          a.payment_status.clone().into(),
          a.remarks.clone().into(),
          encode_dt(Utc::now()).into(),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Billing records ───────────────────────────────────────────────────────

  async fn find_billing_record(&self, record_id: Uuid) -> Result<Option<BillingRecord>> {
    self
      .query_opt(
        format!(
          "SELECT {} FROM billing_records WHERE record_id = ?1",
          RawBilling::COLUMNS
        ),
        vec![encode_uuid(record_id).into()],
        RawBilling::from_row,
      )
      .await?
      .map(RawBilling::into_billing)
      .transpose()
  }

  async fn insert_billing_record(
    &self,
    record_id: Uuid,
    attrs: BillingAttrs,
  ) -> Result<BillingRecord> {
    let now = Utc::now();
    let billing = BillingRecord {
      billing_id: Uuid::new_v4(),
      record_id,
      attrs,
      created_at: now,
      updated_at: now,
    };
    let a = &billing.attrs;

    self
      .execute(
        "INSERT INTO billing_records (
           billing_id, record_id, fund_request_date, disbursement_date,
           validated_by, billing_amount, billing_status, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        vec![
          encode_uuid(billing.billing_id).into(),
          encode_uuid(record_id).into(),
          encode_date(a.fund_request_date).into(),
          encode_date(a.disbursement_date).into(),
          a.validated_by.clone().into(),
          a.billing_amount.into(),
          a.billing_status.clone().into(),
          encode_dt(now).into(),
          encode_dt(now).into(),
        ],
      )
      .await?;

    Ok(billing)
  }

  async fn update_billing_record(&self, billing: &BillingRecord) -> Result<()> {
    let a = &billing.attrs;
    self
      .execute(
        "UPDATE billing_records SET
           fund_request_date = ?2, disbursement_date = ?3, validated_by = ?4,
           billing_amount = ?5, billing_status = ?6, updated_at = ?7
         WHERE billing_id = ?1",
        vec![
          encode_uuid(billing.billing_id).into(),
          encode_date(a.fund_request_date).into(),
          encode_date(a.disbursement_date).into(),
          a.validated_by.clone().into(),
          a.billing_amount.into(),
          a.billing_status.clone().into(),
          encode_dt(Utc::now()).into(),
        ],
      )
      .await?;
    Ok(())
  }

  // ── Bookkeeping ───────────────────────────────────────────────────────────

  async fn counts(&self) -> Result<EntityCounts> {
    Ok(
      self
        .conn
        .call(|conn| {
          let count = |table: &str| -> rusqlite::Result<u64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
              r.get::<_, i64>(0).map(|n| n as u64)
            })
          };
          Ok(EntityCounts {
            scholars:         count("scholars")?,
            addresses:        count("addresses")?,
            enrollments:      count("enrollments")?,
            academic_records: count("academic_records")?,
            billing_records:  count("billing_records")?,
            heis:             count("heis")?,
            courses:          count("courses")?,
            majors:           count("majors")?,
            programs:         count("programs")?,
            academic_years:   count("academic_years")?,
            semesters:        count("semesters")?,
            locations:        count("locations")?,
          })
        })
        .await?,
    )
  }
}
