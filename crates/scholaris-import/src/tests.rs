//! End-to-end import tests against an in-memory SQLite registry.

use chrono::NaiveDate;
use scholaris_core::{
  RegistryStore,
  location::{LocationLevel, LocationScope},
};
use scholaris_sheet::{CreationPolicy, MemoryRows, RowStream, SourceLayout};
use scholaris_store_sqlite::SqliteStore;

use uuid::Uuid;

use crate::{
  Error, HeiAlias, ImportConfig, ImportJob, ImportSummary, ReferenceSeed, apply_seed,
  seed::{SeedCity, SeedHei, SeedProvince, SeedRegion},
  spawn_import, upsert,
};

const PROGRAM: &str = "TES";

async fn store() -> SqliteStore {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  store
    .get_or_create_program(PROGRAM)
    .await
    .expect("program");
  store
}

fn rows(layout: &SourceLayout, rows: &[&[&str]]) -> RowStream {
  RowStream::new(Box::new(MemoryRows::from_strings(rows)), layout).expect("header row")
}

async fn import(store: &SqliteStore, layout: SourceLayout, data: &[&[&str]]) -> ImportSummary {
  let stream = rows(&layout, data);
  ImportJob::new(store.clone(), ImportConfig::new(PROGRAM, layout))
    .run(stream)
    .await
    .expect("import job")
}

async fn scholar_by_uid(store: &SqliteStore, uid: &str) -> scholaris_core::scholar::Scholar {
  store
    .find_scholar_by_unique_id(uid)
    .await
    .unwrap()
    .expect("scholar")
}

async fn enrolled_hei(store: &SqliteStore, uid: &str) -> Option<Uuid> {
  let scholar = scholar_by_uid(store, uid).await;
  let program = store.find_program(PROGRAM).await.unwrap().unwrap();
  store
    .find_enrollment(scholar.scholar_id, program.program_id)
    .await
    .unwrap()
    .expect("enrollment")
    .attrs
    .hei_id
}

// ─── Idempotence ─────────────────────────────────────────────────────────────

const GRANTEES: &[&[&str]] = &[
  &[
    "Student ID", "Last Name", "First Name", "Middle Name", "Birthdate", "Sex",
    "Email", "HEI", "Course", "AY", "Sem", "Amount",
  ],
  &[
    "2023-0001", "Santos", "Maria", "Reyes", "2002-03-14", "F",
    "maria.santos@example.com", "Iloilo Science College", "BS Biology",
    "2023-2024", "1st", "20,000.00",
  ],
  &[
    "2023-0002", "Cruz", "Juan", "", "2001-11-02", "Male",
    "N/A", "Iloilo Science College", "BS Biology",
    "2023-2024", "1st", "₱ 20,000",
  ],
  &["", "", "", "", "", "", "", "", "", "", "", ""],
];

#[tokio::test]
async fn importing_the_same_sheet_twice_changes_nothing() {
  let s = store().await;
  s.get_or_create_hei("Iloilo Science College", None).await.unwrap();
  s.get_or_create_course("Bachelor of Science in Biology", Some("BS Biology"))
    .await
    .unwrap();

  let first = import(&s, SourceLayout::new("generic"), GRANTEES).await;
  assert_eq!(first.rows_seen, 3);
  assert_eq!(first.rows_imported, 2);
  assert_eq!(first.rows_skipped, 1);
  assert_eq!(first.rows_failed, 0);
  assert_eq!(first.scholars_created, 2);
  let counts_after_first = s.counts().await.unwrap();

  let second = import(&s, SourceLayout::new("generic"), GRANTEES).await;
  assert_eq!(second.rows_imported, 2);
  assert_eq!(second.scholars_created, 0);
  assert_eq!(second.scholars_updated, 0);
  assert_eq!(second.scholars_unchanged, 2);
  assert_eq!(s.counts().await.unwrap(), counts_after_first);

  assert_eq!(counts_after_first.scholars, 2);
  assert_eq!(counts_after_first.enrollments, 2);
  assert_eq!(counts_after_first.academic_records, 2);
  assert_eq!(counts_after_first.academic_years, 1);
  assert_eq!(counts_after_first.semesters, 1);

  let juan = scholar_by_uid(&s, "2023-0002").await;
  assert!(juan.email_address.ends_with("@no-email.invalid"));
  assert_eq!(juan.birth_date, NaiveDate::from_ymd_opt(2001, 11, 2));

  let program = s.find_program(PROGRAM).await.unwrap().unwrap();
  let enrollment = s
    .find_enrollment(juan.scholar_id, program.program_id)
    .await
    .unwrap()
    .unwrap();
  assert!(enrollment.attrs.hei_id.is_some());
}

// ─── Merge policies ──────────────────────────────────────────────────────────

#[tokio::test]
async fn later_sheets_fill_gaps_but_never_overwrite() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Email", "Contact No"],
    &["A-1", "Lopez", "Rosa", "rosa@example.com", ""],
  ])
  .await;

  let second = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Email", "Contact No"],
    &["A-1", "Lopez", "Rosa", "other@example.com", "0917 123 4567"],
  ])
  .await;
  assert_eq!(second.scholars_updated, 1);

  let rosa = scholar_by_uid(&s, "A-1").await;
  assert_eq!(rosa.email_address, "rosa@example.com");
  assert_eq!(rosa.contact_no.as_deref(), Some("09171234567"));
}

#[tokio::test]
async fn a_real_email_replaces_a_placeholder() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Email"],
    &["B-1", "Dela Cruz", "Pedro", "none"],
  ])
  .await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Email"],
    &["B-1", "Dela Cruz", "Pedro", "Pedro.DC@Example.com"],
  ])
  .await;

  let pedro = scholar_by_uid(&s, "B-1").await;
  assert_eq!(pedro.email_address, "pedro.dc@example.com");
}

#[tokio::test]
async fn enrollment_status_takes_the_latest_non_null_value() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Status", "Award No"],
    &["C-1", "Garcia", "Lea", "Active", "TES-001"],
  ])
  .await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Status", "Award No"],
    &["C-1", "Garcia", "Lea", "Graduated", ""],
  ])
  .await;

  let lea = scholar_by_uid(&s, "C-1").await;
  let program = s.find_program(PROGRAM).await.unwrap().unwrap();
  let enrollment = s
    .find_enrollment(lea.scholar_id, program.program_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(enrollment.attrs.status.as_deref(), Some("Graduated"));
  assert_eq!(enrollment.attrs.award_no.as_deref(), Some("TES-001"));
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unique_id_outranks_name_and_birth_date() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Birthdate"],
    &["D-1", "Reyes", "Ana", "2000-01-01"],
    &["D-2", "Reyes", "Ana", "1999-05-05"],
  ])
  .await;

  // Same name and birth date as D-2, but the id says D-1.
  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Birthdate", "Contact No"],
    &["D-1", "Reyes", "Ana", "1999-05-05", "09181112222"],
  ])
  .await;
  assert_eq!(summary.scholars_created, 0);

  let d1 = scholar_by_uid(&s, "D-1").await;
  let d2 = scholar_by_uid(&s, "D-2").await;
  assert_eq!(d1.contact_no.as_deref(), Some("09181112222"));
  assert_eq!(d2.contact_no, None);
  assert_eq!(s.counts().await.unwrap().scholars, 2);
}

#[tokio::test]
async fn rows_without_ids_match_on_name_and_birth_date() {
  let s = store().await;
  let data: &[&[&str]] = &[
    &["Name of Applicant", "Birthdate"],
    &["VILLANUEVA, JOSE MARI", "2003-07-21"],
  ];
  import(&s, SourceLayout::new("generic"), data).await;
  let again = import(&s, SourceLayout::new("generic"), data).await;

  assert_eq!(again.scholars_unchanged, 1);
  let jose = s
    .find_scholar_by_name_and_birth_date(
      "JOSE",
      "VILLANUEVA",
      NaiveDate::from_ymd_opt(2003, 7, 21).unwrap(),
    )
    .await
    .unwrap()
    .expect("scholar");
  assert_eq!(jose.middle_name.as_deref(), Some("MARI"));
}

#[tokio::test]
async fn nameless_rows_are_skipped_not_failed() {
  let s = store().await;
  let summary = import(&s, SourceLayout::new("generic"), &[
    &["Last Name", "First Name", "Email"],
    &["", "", "someone@example.com"],
    &["Torres", "Ben", ""],
  ])
  .await;
  assert_eq!(summary.rows_skipped, 1);
  assert_eq!(summary.rows_imported, 1);
  assert_eq!(summary.rows_failed, 0);
  assert_eq!(s.counts().await.unwrap().scholars, 1);
}

#[tokio::test]
async fn unknown_id_without_a_name_creates_no_references() {
  let s = store().await;
  let mut layout = SourceLayout::new("lenient");
  layout.hei_policy = CreationPolicy::CreateMissing;
  layout.course_policy = CreationPolicy::CreateMissing;

  let summary = import(&s, layout, &[
    &["UID", "Last Name", "First Name", "HEI", "Course"],
    &["Z-9", "", "", "Brand New College", "BS Astronomy"],
  ])
  .await;
  assert_eq!(summary.rows_skipped, 1);
  assert_eq!(summary.rows_imported, 0);

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.scholars, 0);
  assert_eq!(counts.heis, 0);
  assert_eq!(counts.courses, 0);
}

#[tokio::test]
async fn known_id_without_a_name_still_updates_the_scholar() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name"],
    &["Z-1", "Salazar", "Ria"],
  ])
  .await;
  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Contact No"],
    &["Z-1", "", "", "09170000001"],
  ])
  .await;
  assert_eq!(summary.scholars_updated, 1);
  let ria = scholar_by_uid(&s, "Z-1").await;
  assert_eq!(ria.contact_no.as_deref(), Some("09170000001"));
}

#[tokio::test]
async fn upsert_scholar_creates_then_leaves_unchanged() {
  let s = store().await;
  let draft = scholaris_core::scholar::ScholarDraft {
    first_name: Some("Mira".into()),
    last_name: Some("Tan".into()),
    birth_date: NaiveDate::from_ymd_opt(2004, 2, 29),
    ..Default::default()
  };
  let (created, outcome) = upsert::upsert_scholar(&s, &draft).await.unwrap().unwrap();
  assert_eq!(outcome, scholaris_core::UpsertOutcome::Created);
  let (again, outcome) = upsert::upsert_scholar(&s, &draft).await.unwrap().unwrap();
  assert_eq!(outcome, scholaris_core::UpsertOutcome::Unchanged);
  assert_eq!(again.scholar_id, created.scholar_id);

  let nameless = scholaris_core::scholar::ScholarDraft {
    unique_id: Some("nobody".into()),
    ..Default::default()
  };
  assert!(upsert::upsert_scholar(&s, &nameless).await.unwrap().is_none());
}

// ─── Geography ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn cities_resolve_within_their_province_only() {
  let s = store().await;
  let region = s
    .get_or_create_location(LocationLevel::Region, None, "Region VI")
    .await
    .unwrap();
  let iloilo = s
    .get_or_create_location(LocationLevel::Province, Some(region.location_id), "Iloilo")
    .await
    .unwrap();
  let capiz = s
    .get_or_create_location(LocationLevel::Province, Some(region.location_id), "Capiz")
    .await
    .unwrap();
  let iloilo_city = s
    .get_or_create_location(LocationLevel::City, Some(iloilo.location_id), "Iloilo City")
    .await
    .unwrap();

  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Region", "Province", "City"],
    &["E-1", "Bautista", "Carl", "Region VI", "Iloilo", "City of Iloilo"],
    &["E-2", "Bautista", "Dina", "Region VI", "Capiz", "Iloilo City"],
  ])
  .await;

  let carl = scholar_by_uid(&s, "E-1").await;
  let address = s.get_address(carl.scholar_id).await.unwrap().unwrap();
  assert_eq!(address.province.id, Some(iloilo.location_id));
  assert_eq!(address.city.id, Some(iloilo_city.location_id));
  assert_eq!(address.city.raw.as_deref(), Some("City of Iloilo"));

  let dina = scholar_by_uid(&s, "E-2").await;
  let address = s.get_address(dina.scholar_id).await.unwrap().unwrap();
  assert_eq!(address.province.id, Some(capiz.location_id));
  assert_eq!(address.city.id, None);
  assert_eq!(address.city.raw.as_deref(), Some("Iloilo City"));

  // Strict layout: nothing was created under Capiz.
  let under_capiz = s
    .find_location(LocationLevel::City, LocationScope::Under(capiz.location_id), "Iloilo City")
    .await
    .unwrap();
  assert!(under_capiz.is_none());
}

#[tokio::test]
async fn lenient_layouts_create_missing_places_but_never_regions() {
  let s = store().await;
  let mut layout = SourceLayout::new("lenient");
  layout.geo_policy = CreationPolicy::CreateMissing;

  let summary = import(&s, layout, &[
    &["UID", "Last Name", "First Name", "Region", "Province", "City", "Barangay"],
    &["F-1", "Ramos", "Eli", "Atlantis", "Guimaras", "Jordan", "Poblacion"],
  ])
  .await;
  assert_eq!(summary.rows_imported, 1);

  let eli = scholar_by_uid(&s, "F-1").await;
  let address = s.get_address(eli.scholar_id).await.unwrap().unwrap();
  assert_eq!(address.region.id, None);
  assert_eq!(address.region.raw.as_deref(), Some("Atlantis"));
  // Without a resolved region there is no parent to create the province
  // under, so everything below stays raw text.
  assert_eq!(address.province.id, None);
  assert_eq!(address.city.id, None);
  assert_eq!(address.barangay.raw.as_deref(), Some("Poblacion"));
  assert_eq!(s.counts().await.unwrap().locations, 0);
}

// ─── Institutions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn institution_spellings_resolve_to_one_school() {
  let s = store().await;
  let saint = s
    .get_or_create_hei("Saint Joseph College", None)
    .await
    .unwrap();
  let abc = s.get_or_create_hei("ABC University", None).await.unwrap();

  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["G-1", "Navarro", "Ivy", "St. Joseph College"],
    &["G-2", "Navarro", "Jun", "ABC University, Inc."],
  ])
  .await;

  let program = s.find_program(PROGRAM).await.unwrap().unwrap();
  for (uid, hei_id) in [("G-1", saint.hei_id), ("G-2", abc.hei_id)] {
    let scholar = scholar_by_uid(&s, uid).await;
    let enrollment = s
      .find_enrollment(scholar.scholar_id, program.program_id)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(enrollment.attrs.hei_id, Some(hei_id), "{uid}");
  }
  assert_eq!(s.counts().await.unwrap().heis, 2);
}

#[tokio::test]
async fn unmatched_institution_warns_once_and_stays_null() {
  let s = store().await;
  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["H-1", "Castro", "Kim", "Nowhere Polytechnic"],
    &["H-2", "Castro", "Lou", "nowhere polytechnic"],
  ])
  .await;
  assert_eq!(summary.rows_imported, 2);
  assert_eq!(summary.warnings, 1);
  assert_eq!(s.counts().await.unwrap().heis, 0);

  let kim = scholar_by_uid(&s, "H-1").await;
  let program = s.find_program(PROGRAM).await.unwrap().unwrap();
  let enrollment = s
    .find_enrollment(kim.scholar_id, program.program_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(enrollment.attrs.hei_id, None);
}

#[tokio::test]
async fn concurrent_jobs_create_a_new_institution_once() {
  let s = store().await;
  let mut layout = SourceLayout::new("lenient");
  layout.hei_policy = CreationPolicy::CreateMissing;

  let a = rows(&layout, &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["J-1", "Mendoza", "Ria", "Guimaras State University"],
    &["J-2", "Mendoza", "Sam", "Guimaras State University"],
  ]);
  let b = rows(&layout, &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["K-1", "Aquino", "Tess", "GUIMARAS STATE UNIVERSITY"],
    &["K-2", "Aquino", "Uly", "Guimaras State University"],
  ]);
  let mut config = ImportConfig::new(PROGRAM, layout);
  config.hei_aliases.clear();

  let first = spawn_import(s.clone(), config.clone(), a);
  let second = spawn_import(s.clone(), config, b);
  let (first, second) = (first.await.unwrap().unwrap(), second.await.unwrap().unwrap());

  assert_eq!(first.rows_failed + second.rows_failed, 0);
  assert_eq!(first.rows_imported + second.rows_imported, 4);
  assert_eq!(s.counts().await.unwrap().heis, 1);
}

#[tokio::test]
async fn campus_suffix_after_a_hyphen_resolves_to_the_school() {
  let s = store().await;
  let abc = s.get_or_create_hei("ABC University", None).await.unwrap();

  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["R-1", "Dizon", "Hana", "ABC University - Main Campus"],
  ])
  .await;
  assert_eq!(enrolled_hei(&s, "R-1").await, Some(abc.hei_id));
}

#[tokio::test]
async fn aliases_resolve_to_their_canonical_school() {
  let s = store().await;
  let wvsu = s
    .get_or_create_hei("West Visayas State University", None)
    .await
    .unwrap();
  let fcu = s
    .get_or_create_hei("Filamer Christian University", None)
    .await
    .unwrap();

  let layout = SourceLayout::new("generic");
  let data = rows(&layout, &[
    &["UID", "Last Name", "First Name", "HEI"],
    &["S-1", "Gonzaga", "Ivo", "WVSU - Calinog Campus"],
    &["S-2", "Gonzaga", "Jade", "FCU Roxas City"],
  ]);
  let mut config = ImportConfig::new(PROGRAM, layout);
  config.hei_aliases.push(HeiAlias::new("FCU", "Filamer Christian University"));
  let summary = ImportJob::new(s.clone(), config).run(data).await.unwrap();

  assert_eq!(summary.rows_imported, 2);
  assert_eq!(enrolled_hei(&s, "S-1").await, Some(wvsu.hei_id));
  assert_eq!(enrolled_hei(&s, "S-2").await, Some(fcu.hei_id));
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn course_cells_split_into_course_and_major() {
  let s = store().await;
  let course = s
    .get_or_create_course("Bachelor of Secondary Education", Some("BSEd"))
    .await
    .unwrap();
  let major = s.get_or_create_major("Mathematics").await.unwrap();

  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "Course", "AY", "Semester"],
    &["L-1", "Flores", "Vic", "BSEd Major in Mathematics", "2022-2023", "Second Semester"],
    &["L-2", "Flores", "Wes", "BSEd Major in Underwater Basketry", "2022-2023", "2nd Sem"],
  ])
  .await;
  assert_eq!(summary.rows_imported, 2);
  // An unknown major is reported, never created.
  assert_eq!(summary.warnings, 1);
  assert_eq!(s.counts().await.unwrap().majors, 1);

  let vic = scholar_by_uid(&s, "L-1").await;
  let program = s.find_program(PROGRAM).await.unwrap().unwrap();
  let enrollment = s
    .find_enrollment(vic.scholar_id, program.program_id)
    .await
    .unwrap()
    .unwrap();
  let ay = s.get_or_create_academic_year("2022-2023").await.unwrap();
  let sem = s.get_or_create_semester("Second Semester").await.unwrap();
  let record = s
    .find_academic_record(enrollment.enrollment_id, ay.academic_year_id, sem.semester_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(record.attrs.course_id, Some(course.course_id));
  assert_eq!(record.attrs.major_id, Some(major.major_id));
}

// ─── Billing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn billing_columns_land_on_the_semester_record() {
  let s = store().await;
  import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "AY", "Sem", "Billing Amount", "Date Disbursed"],
    &["M-1", "Pascual", "Xia", "2023-2024", "1st", "15,000", "2024-02-15"],
  ])
  .await;

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.academic_records, 1);
  assert_eq!(counts.billing_records, 1);
}

// ─── Failure handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn one_malformed_row_does_not_stop_the_job() {
  let s = store().await;
  let summary = import(&s, SourceLayout::new("generic"), &[
    &["UID", "Last Name", "First Name", "AY", "Sem"],
    &["N-1", "Santiago", "Yna", "2023-2024", "1st"],
    &["N-2", "Santiago", "Zed", "2023-2019", "1st"],
    &["N-3", "Santiago", "Abe", "2023-2024", "1st"],
  ])
  .await;
  assert_eq!(summary.rows_seen, 3);
  assert_eq!(summary.rows_imported, 2);
  assert_eq!(summary.rows_failed, 1);
  assert!(!summary.aborted);
  assert!(s.find_scholar_by_unique_id("N-2").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_program_fails_the_job_unless_creation_is_allowed() {
  let s = SqliteStore::open_in_memory().await.unwrap();
  let layout = SourceLayout::new("generic");
  let data: &[&[&str]] = &[&["UID", "Last Name", "First Name"], &["P-1", "Luna", "Bea"]];

  let err = ImportJob::new(s.clone(), ImportConfig::new("CMSP", layout.clone()))
    .run(rows(&layout, data))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingProgram(ref p) if p == "CMSP"));
  assert_eq!(s.counts().await.unwrap().scholars, 0);

  let mut config = ImportConfig::new("CMSP", layout.clone());
  config.create_program = true;
  let summary = ImportJob::new(s.clone(), config)
    .run(rows(&layout, data))
    .await
    .unwrap();
  assert_eq!(summary.rows_imported, 1);
  assert!(s.find_program("cmsp").await.unwrap().is_some());
}

#[tokio::test]
async fn small_chunks_see_every_row() {
  let s = store().await;
  let mut layout = SourceLayout::new("generic");
  layout.chunk_size = 2;
  let summary = import(&s, layout, &[
    &["UID", "Last Name", "First Name"],
    &["Q-1", "Ocampo", "Cy"],
    &["Q-2", "Ocampo", "Di"],
    &["Q-3", "Ocampo", "Ed"],
    &["Q-4", "Ocampo", "Fe"],
    &["Q-5", "Ocampo", "Gi"],
  ])
  .await;
  assert_eq!(summary.rows_seen, 5);
  assert_eq!(summary.scholars_created, 5);
}

#[tokio::test]
async fn latin1_csv_row_is_imported_with_its_neighbours() {
  use std::io::Write as _;

  let s = store().await;
  let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
  file
    .write_all(b"Last Name,First Name\nSantos,Maria\nPE\xD1A,Juan\nCruz,Ana\n")
    .unwrap();
  file.flush().unwrap();

  let layout = SourceLayout::new("generic");
  let stream = RowStream::open(file.path(), None, &layout).unwrap();
  let summary = ImportJob::new(s.clone(), ImportConfig::new(PROGRAM, layout))
    .run(stream)
    .await
    .unwrap();

  assert_eq!(summary.rows_seen, 3);
  assert_eq!(summary.rows_imported, 3);
  assert_eq!(summary.rows_failed, 0);
  assert_eq!(s.counts().await.unwrap().scholars, 3);
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent_and_builds_the_hierarchy() {
  let s = SqliteStore::open_in_memory().await.unwrap();
  let seed = ReferenceSeed {
    programs: vec!["TES".into(), "TDP".into()],
    semesters: vec!["1st".into(), "2nd Sem".into(), "Summer".into()],
    heis: vec![SeedHei {
      name: "West Visayas State University".into(),
      code: Some("WVSU".into()),
    }],
    majors: vec!["Mathematics".into()],
    regions: vec![SeedRegion {
      name:      "Region VI".into(),
      provinces: vec![SeedProvince {
        name:      "Iloilo".into(),
        districts: vec!["1st District".into()],
        cities:    vec![SeedCity {
          name:      "Iloilo City".into(),
          barangays: vec!["Jaro".into(), "Molo".into()],
        }],
      }],
    }],
    ..Default::default()
  };

  let first = apply_seed(&s, &seed).await.unwrap();
  let second = apply_seed(&s, &seed).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.programs, 2);
  assert_eq!(first.semesters, 3);
  assert_eq!(first.heis, 1);
  assert_eq!(first.locations, 6);

  assert!(s.find_hei_by_code("wvsu").await.unwrap().is_some());
  s.get_or_create_semester("Second Semester").await.unwrap();
  assert_eq!(s.counts().await.unwrap().semesters, 3);
}

#[test]
fn seed_sections_are_optional() {
  let seed: ReferenceSeed = serde_json::from_str(
    r#"{
      "programs": ["TES"],
      "regions": [{ "name": "Region VI", "provinces": [{ "name": "Antique" }] }]
    }"#,
  )
  .unwrap();
  assert_eq!(seed.regions[0].provinces[0].name, "Antique");
  assert!(seed.heis.is_empty());
}
