//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use scholaris_core::{
  StoreError as _,
  enrollment::{BillingAttrs, EnrollmentAttrs, RecordAttrs},
  location::{LocationLevel, LocationRef, LocationScope},
  scholar::{Address, NewScholar, Sex},
  store::RegistryStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_scholar(first: &str, last: &str) -> NewScholar {
  NewScholar {
    unique_id:      None,
    first_name:     first.into(),
    middle_name:    None,
    last_name:      last.into(),
    extension_name: None,
    sex:            Some(Sex::Female),
    birth_date:     None,
    contact_no:     None,
    email_address:  format!("{}@example.com", first.to_lowercase()),
    is_pwd:         None,
  }
}

// ─── Reference sets ──────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_program_is_idempotent_and_case_insensitive() {
  let s = store().await;
  let a = s.get_or_create_program("TES").await.unwrap();
  let b = s.get_or_create_program("tes").await.unwrap();
  assert_eq!(a.program_id, b.program_id);
  assert_eq!(b.name, "TES");

  let found = s.find_program("Tes").await.unwrap().unwrap();
  assert_eq!(found.program_id, a.program_id);
  assert!(s.find_program("TDP").await.unwrap().is_none());
  assert_eq!(s.counts().await.unwrap().programs, 1);
}

#[tokio::test]
async fn academic_years_and_semesters_are_keyed_by_label() {
  let s = store().await;
  let y1 = s.get_or_create_academic_year("2023-2024").await.unwrap();
  let y2 = s.get_or_create_academic_year("2023-2024").await.unwrap();
  let sem = s.get_or_create_semester("First Semester").await.unwrap();
  assert_eq!(y1.academic_year_id, y2.academic_year_id);
  assert_eq!(sem.label, "First Semester");

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.academic_years, 1);
  assert_eq!(counts.semesters, 1);
}

// ─── Institutions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn hei_lookup_by_name_code_and_fragment() {
  let s = store().await;
  let created = s
    .get_or_create_hei("West Visayas State University", Some("06001"))
    .await
    .unwrap();
  s.get_or_create_hei("West Visayas State University - Calinog Campus", None)
    .await
    .unwrap();

  let by_name = s
    .find_hei_by_name("WEST VISAYAS STATE UNIVERSITY")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_name.hei_id, created.hei_id);

  let by_code = s.find_hei_by_code("06001").await.unwrap().unwrap();
  assert_eq!(by_code.hei_id, created.hei_id);

  // Shortest containing name wins.
  let by_fragment = s.find_hei_containing("visayas state").await.unwrap().unwrap();
  assert_eq!(by_fragment.hei_id, created.hei_id);

  // LIKE wildcards in the fragment are literal.
  assert!(s.find_hei_containing("W%U").await.unwrap().is_none());
}

#[tokio::test]
async fn hei_code_owned_by_another_school_is_dropped() {
  let s = store().await;
  s.get_or_create_hei("Alpha College", Some("X1")).await.unwrap();
  let beta = s.get_or_create_hei("Beta College", Some("X1")).await.unwrap();
  assert_eq!(beta.code, None);
  assert_eq!(s.counts().await.unwrap().heis, 2);
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn course_matches_name_or_abbreviation() {
  let s = store().await;
  let c = s
    .get_or_create_course("Bachelor of Science in Nursing", Some("BSN"))
    .await
    .unwrap();
  assert_eq!(s.find_course("bsn").await.unwrap().unwrap().course_id, c.course_id);
  assert_eq!(
    s.find_course("bachelor of science in nursing")
      .await
      .unwrap()
      .unwrap()
      .course_id,
    c.course_id
  );
  assert!(s.find_major("Marketing").await.unwrap().is_none());
  s.get_or_create_major("Marketing").await.unwrap();
  assert!(s.find_major("MARKETING").await.unwrap().is_some());
}

// ─── Locations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn same_named_children_under_different_parents_are_distinct() {
  let s = store().await;
  let region = s
    .get_or_create_location(LocationLevel::Region, None, "Region VI")
    .await
    .unwrap();
  let p1 = s
    .get_or_create_location(LocationLevel::Province, Some(region.location_id), "Iloilo")
    .await
    .unwrap();
  let p2 = s
    .get_or_create_location(LocationLevel::Province, Some(region.location_id), "Capiz")
    .await
    .unwrap();
  let c1 = s
    .get_or_create_location(LocationLevel::City, Some(p1.location_id), "San Jose")
    .await
    .unwrap();
  let c2 = s
    .get_or_create_location(LocationLevel::City, Some(p2.location_id), "San Jose")
    .await
    .unwrap();
  assert_ne!(c1.location_id, c2.location_id);

  let found = s
    .find_location(LocationLevel::City, LocationScope::Under(p2.location_id), "SAN JOSE")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.location_id, c2.location_id);
  assert_eq!(found.parent_id, Some(p2.location_id));

  let again = s
    .get_or_create_location(LocationLevel::Region, None, "region vi")
    .await
    .unwrap();
  assert_eq!(again.location_id, region.location_id);
}

// ─── Scholars ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_scholar_by_each_key() {
  let s = store().await;
  let mut input = new_scholar("Maria", "Santos");
  input.unique_id = Some("UID-1".into());
  input.middle_name = Some("Reyes".into());
  input.birth_date = NaiveDate::from_ymd_opt(2003, 5, 17);
  let created = s.insert_scholar(input).await.unwrap();

  let by_uid = s.find_scholar_by_unique_id("uid-1").await.unwrap().unwrap();
  assert_eq!(by_uid, created);

  let by_birth = s
    .find_scholar_by_name_and_birth_date(
      "MARIA",
      "SANTOS",
      NaiveDate::from_ymd_opt(2003, 5, 17).unwrap(),
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_birth.scholar_id, created.scholar_id);

  let by_name = s
    .find_scholar_by_full_name("maria", "santos", Some("REYES"))
    .await
    .unwrap();
  assert!(by_name.is_some());
  let no_middle = s
    .find_scholar_by_full_name("maria", "santos", None)
    .await
    .unwrap();
  assert!(no_middle.is_none());
}

#[tokio::test]
async fn names_fold_case_beyond_ascii() {
  let s = store().await;
  let created = s.insert_scholar(new_scholar("Juan", "PEÑA")).await.unwrap();
  let found = s
    .find_scholar_by_full_name("JUAN", "peña", None)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.scholar_id, created.scholar_id);

  let hei = s.get_or_create_hei("Colegio de Sta. Niña", None).await.unwrap();
  let again = s.get_or_create_hei("COLEGIO DE STA. NIÑA", None).await.unwrap();
  assert_eq!(again.hei_id, hei.hei_id);
}

#[tokio::test]
async fn duplicate_unique_id_is_a_conflict() {
  let s = store().await;
  let mut a = new_scholar("Ana", "Cruz");
  a.unique_id = Some("LRN-9".into());
  s.insert_scholar(a).await.unwrap();

  let mut b = new_scholar("Ben", "Lim");
  b.unique_id = Some("LRN-9".into());
  let err = s.insert_scholar(b).await.unwrap_err();
  assert!(err.is_conflict());
  assert!(!err.is_unavailable());
}

#[tokio::test]
async fn update_scholar_persists_fields() {
  let s = store().await;
  let mut scholar = s.insert_scholar(new_scholar("Ana", "Cruz")).await.unwrap();
  scholar.contact_no = Some("09170000000".into());
  scholar.is_pwd = Some(true);
  s.update_scholar(&scholar).await.unwrap();

  let fetched = s.get_scholar(scholar.scholar_id).await.unwrap().unwrap();
  assert_eq!(fetched.contact_no.as_deref(), Some("09170000000"));
  assert_eq!(fetched.is_pwd, Some(true));
  assert!(fetched.updated_at >= scholar.created_at);
}

#[tokio::test]
async fn address_roundtrip_and_replace() {
  let s = store().await;
  let scholar = s.insert_scholar(new_scholar("Ana", "Cruz")).await.unwrap();
  let region = s
    .get_or_create_location(LocationLevel::Region, None, "Region VI")
    .await
    .unwrap();

  let mut address = Address {
    scholar_id: scholar.scholar_id,
    region: LocationRef {
      id:  Some(region.location_id),
      raw: Some("REGION VI".into()),
    },
    province: LocationRef::raw_only(Some("Iloilo".into())),
    ..Default::default()
  };
  s.put_address(&address).await.unwrap();
  assert_eq!(s.get_address(scholar.scholar_id).await.unwrap().unwrap(), address);

  address.street = Some("123 Rizal St.".into());
  s.put_address(&address).await.unwrap();
  assert_eq!(s.get_address(scholar.scholar_id).await.unwrap().unwrap(), address);
  assert_eq!(s.counts().await.unwrap().addresses, 1);
}

// ─── Enrollment history ──────────────────────────────────────────────────────

#[tokio::test]
async fn enrollment_record_and_billing_roundtrip() {
  let s = store().await;
  let scholar = s.insert_scholar(new_scholar("Ana", "Cruz")).await.unwrap();
  let program = s.get_or_create_program("TES").await.unwrap();
  let year = s.get_or_create_academic_year("2023-2024").await.unwrap();
  let sem = s.get_or_create_semester("First Semester").await.unwrap();

  let mut enrollment = s
    .insert_enrollment(scholar.scholar_id, program.program_id, EnrollmentAttrs {
      award_no: Some("TES-001".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  enrollment.attrs.status = Some("ACTIVE".into());
  s.update_enrollment(&enrollment).await.unwrap();
  let fetched = s
    .find_enrollment(scholar.scholar_id, program.program_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.attrs, enrollment.attrs);

  let dup = s
    .insert_enrollment(scholar.scholar_id, program.program_id, EnrollmentAttrs::default())
    .await
    .unwrap_err();
  assert!(dup.is_conflict());

  let record = s
    .insert_academic_record(
      enrollment.enrollment_id,
      year.academic_year_id,
      sem.semester_id,
      RecordAttrs {
        year_level: Some(2),
        grant_amount: Some(20_000.0),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  let found = s
    .find_academic_record(enrollment.enrollment_id, year.academic_year_id, sem.semester_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.attrs, record.attrs);

  let mut billing = s
    .insert_billing_record(record.record_id, BillingAttrs {
      disbursement_date: NaiveDate::from_ymd_opt(2024, 1, 15),
      billing_amount: Some(20_000.0),
      ..Default::default()
    })
    .await
    .unwrap();
  billing.attrs.billing_status = Some("PAID".into());
  s.update_billing_record(&billing).await.unwrap();
  let found = s.find_billing_record(record.record_id).await.unwrap().unwrap();
  assert_eq!(found.attrs, billing.attrs);

  assert!(s.find_billing_record(Uuid::new_v4()).await.unwrap().is_none());
}
