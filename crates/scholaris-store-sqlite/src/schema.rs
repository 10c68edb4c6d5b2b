//! SQL schema for the Scholaris SQLite store.
//!
//! Every natural key the import pipeline matches on is backed by a UNIQUE
//! constraint here; racing importers rely on them. Names compare with
//! `COLLATE UNICASE`, registered on the connection by [`unicase`].

use std::cmp::Ordering;

/// Name of the case-insensitive collation used by every name column.
pub const UNICASE: &str = "UNICASE";

/// Compare two strings after Unicode lower-casing, so "PEÑA" equals "peña".
/// SQLite's own `NOCASE` folds ASCII letters only.
pub fn unicase(a: &str, b: &str) -> Ordering {
  a.chars()
    .flat_map(char::to_lowercase)
    .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Reference sets ──────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS programs (
    program_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL COLLATE UNICASE UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS academic_years (
    academic_year_id TEXT PRIMARY KEY,
    label            TEXT NOT NULL COLLATE UNICASE UNIQUE,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS semesters (
    semester_id TEXT PRIMARY KEY,
    label       TEXT NOT NULL COLLATE UNICASE UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS heis (
    hei_id      TEXT PRIMARY KEY,
    name        TEXT NOT NULL COLLATE UNICASE UNIQUE,
    code        TEXT COLLATE UNICASE UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    course_id    TEXT PRIMARY KEY,
    name         TEXT NOT NULL COLLATE UNICASE UNIQUE,
    abbreviation TEXT COLLATE UNICASE,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS majors (
    major_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL COLLATE UNICASE UNIQUE,
    created_at  TEXT NOT NULL
);

-- parent_key is the parent's id or '' for roots, so that UNIQUE sees roots
-- as equal (NULLs never are).
CREATE TABLE IF NOT EXISTS locations (
    location_id TEXT PRIMARY KEY,
    level       TEXT NOT NULL,   -- 'region' | 'province' | 'city' | 'district' | 'barangay'
    name        TEXT NOT NULL COLLATE UNICASE,
    parent_id   TEXT REFERENCES locations(location_id),
    parent_key  TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    UNIQUE (level, parent_key, name)
);

-- ── Scholars ────────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS scholars (
    scholar_id     TEXT PRIMARY KEY,
    unique_id      TEXT COLLATE UNICASE UNIQUE,
    first_name     TEXT NOT NULL COLLATE UNICASE,
    middle_name    TEXT COLLATE UNICASE,
    last_name      TEXT NOT NULL COLLATE UNICASE,
    extension_name TEXT,
    sex            TEXT,            -- 'M' | 'F'
    birth_date     TEXT,            -- %Y-%m-%d
    contact_no     TEXT,
    email_address  TEXT NOT NULL,
    is_pwd         INTEGER,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS scholars_name_birth_idx
    ON scholars(first_name, last_name, birth_date)
    WHERE birth_date IS NOT NULL;

CREATE INDEX IF NOT EXISTS scholars_full_name_idx
    ON scholars(last_name, first_name, middle_name);

CREATE TABLE IF NOT EXISTS addresses (
    scholar_id    TEXT PRIMARY KEY REFERENCES scholars(scholar_id),
    region_id     TEXT REFERENCES locations(location_id),
    region_raw    TEXT,
    province_id   TEXT REFERENCES locations(location_id),
    province_raw  TEXT,
    city_id       TEXT REFERENCES locations(location_id),
    city_raw      TEXT,
    district_id   TEXT REFERENCES locations(location_id),
    district_raw  TEXT,
    barangay_id   TEXT REFERENCES locations(location_id),
    barangay_raw  TEXT,
    street        TEXT,
    zip_code      TEXT
);

-- ── Enrollment history ──────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id  TEXT PRIMARY KEY,
    scholar_id     TEXT NOT NULL REFERENCES scholars(scholar_id),
    program_id     TEXT NOT NULL REFERENCES programs(program_id),
    award_no       TEXT,
    application_no TEXT,
    status         TEXT,
    hei_id         TEXT REFERENCES heis(hei_id),
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE (scholar_id, program_id)
);

CREATE TABLE IF NOT EXISTS academic_records (
    record_id         TEXT PRIMARY KEY,
    enrollment_id     TEXT NOT NULL REFERENCES enrollments(enrollment_id),
    academic_year_id  TEXT NOT NULL REFERENCES academic_years(academic_year_id),
    semester_id       TEXT NOT NULL REFERENCES semesters(semester_id),
    year_level        INTEGER,
    course_id         TEXT REFERENCES courses(course_id),
    major_id          TEXT REFERENCES majors(major_id),
    grant_amount      REAL,
    validation_status TEXT,
    payment_status    TEXT,
    remarks           TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE (enrollment_id, academic_year_id, semester_id)
);

CREATE TABLE IF NOT EXISTS billing_records (
    billing_id        TEXT PRIMARY KEY,
    record_id         TEXT NOT NULL UNIQUE REFERENCES academic_records(record_id),
    fund_request_date TEXT,
    disbursement_date TEXT,
    validated_by      TEXT,
    billing_amount    REAL,
    billing_status    TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

PRAGMA user_version = 1;
";
