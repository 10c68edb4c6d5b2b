//! Header normalisation and the header → field mapping.
//!
//! Legacy sheets spell the same column a dozen ways ("E-mail", "EMAIL
//! ADDRESS", "email_add"). Every header is reduced to a lookup key with
//! [`header_key`]; the key is then looked up first in the layout's own column
//! table and then in [`default_field`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  cell::Cell,
  error::{Error, Result},
};

/// Case-fold `header` and collapse every run of non-alphanumeric characters
/// into a single underscore, trimming underscores at both ends.
pub fn header_key(header: &str) -> String {
  let mut key = String::with_capacity(header.len());
  let mut pending_sep = false;
  for c in header.chars() {
    if c.is_alphanumeric() {
      if pending_sep && !key.is_empty() {
        key.push('_');
      }
      pending_sep = false;
      key.extend(c.to_lowercase());
    } else {
      pending_sep = true;
    }
  }
  key
}

// ─── Semantic fields ─────────────────────────────────────────────────────────

/// A column's meaning, independent of how the source sheet labels it.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  // Person
  FirstName,
  LastName,
  MiddleName,
  ExtensionName,
  /// A single combined "applicant name" column.
  FullName,
  UniqueId,
  Sex,
  BirthDate,
  ContactNo,
  Email,
  IsPwd,

  // Address
  Region,
  Province,
  City,
  District,
  Barangay,
  Street,
  ZipCode,

  // Enrollment
  HeiName,
  HeiCode,
  Course,
  Major,
  AwardNo,
  ApplicationNo,
  Status,

  // Academic record
  YearLevel,
  AcademicYear,
  Semester,
  GrantAmount,
  ValidationStatus,
  PaymentStatus,
  Remarks,

  // Billing
  FundRequestDate,
  DisbursementDate,
  ValidatedBy,
  BillingAmount,
  BillingStatus,
}

/// The built-in header alias table: common legacy spellings of each field,
/// already in [`header_key`] form.
pub fn default_field(key: &str) -> Option<Field> {
  use Field::*;
  let field = match key {
    "first_name" | "firstname" | "given_name" | "fname" | "first" => FirstName,
    "last_name" | "lastname" | "surname" | "family_name" | "lname" | "last" => {
      LastName
    }
    "middle_name" | "middlename" | "mname" | "middle_initial" | "mi" | "middle" => {
      MiddleName
    }
    "extension_name" | "ext_name" | "name_extension" | "extension" | "ext"
    | "suffix" => ExtensionName,
    "name" | "full_name" | "applicant_name" | "name_of_applicant" | "student_name"
    | "grantee_name" | "name_of_grantee" | "scholar_name" | "name_of_scholar" => {
      FullName
    }
    "unique_id" | "uid" | "student_id" | "student_no" | "student_number"
    | "lrn" | "learner_reference_number" => UniqueId,
    "sex" | "gender" => Sex,
    "birth_date" | "birthdate" | "date_of_birth" | "dob" | "birthday" => {
      BirthDate
    }
    "contact_no" | "contact_number" | "contact" | "mobile_no" | "mobile_number"
    | "phone" | "phone_no" | "phone_number" | "cellphone_number" => ContactNo,
    "email" | "email_address" | "e_mail" | "e_mail_address" | "email_add" => {
      Email
    }
    "is_pwd" | "pwd" | "person_with_disability" | "with_disability" => IsPwd,

    "region" => Region,
    "province" => Province,
    "city" | "city_municipality" | "municipality" | "town" | "city_town" => City,
    "district" | "congressional_district" => District,
    "barangay" | "brgy" => Barangay,
    "street" | "street_address" | "house_no_street" | "street_name" => Street,
    "zip_code" | "zipcode" | "zip" | "postal_code" => ZipCode,

    "hei" | "hei_name" | "name_of_hei" | "school" | "school_name"
    | "name_of_school" | "institution" => HeiName,
    "hei_code" | "uii" | "school_code" => HeiCode,
    "course" | "degree_program" | "course_program" | "program_course"
    | "degree" => Course,
    "major" | "specialization" => Major,
    "award_no" | "award_number" => AwardNo,
    "application_no" | "application_number" | "app_no" => ApplicationNo,
    "status" | "scholarship_status" | "grant_status" => Status,

    "year_level" | "yr_level" | "year" | "yr" => YearLevel,
    "academic_year" | "ay" | "a_y" | "school_year" | "sy" => AcademicYear,
    "semester" | "sem" | "term" => Semester,
    "grant_amount" | "amount" | "amount_of_grant" | "total_amount" => {
      GrantAmount
    }
    "validation_status" | "validation" => ValidationStatus,
    "payment_status" => PaymentStatus,
    "remarks" | "remark" | "notes" => Remarks,

    "fund_request_date" | "date_of_fund_request" | "fr_date" => {
      FundRequestDate
    }
    "disbursement_date" | "date_disbursed" | "date_of_disbursement" => {
      DisbursementDate
    }
    "validated_by" | "validator" => ValidatedBy,
    "billing_amount" | "amount_billed" | "billed_amount" => BillingAmount,
    "billing_status" => BillingStatus,
    _ => return None,
  };
  Some(field)
}

// ─── Header map ──────────────────────────────────────────────────────────────

/// Field → column index, resolved once per job from the header row.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
  columns: HashMap<Field, usize>,
  headers: Vec<String>,
}

impl HeaderMap {
  /// Map the cells of the header row found at (1-based) `row`.
  ///
  /// `overrides` maps header text (any spelling; it is normalised here) to a
  /// field and takes precedence over the built-in aliases. When two columns
  /// map to the same field the leftmost wins. Fails when no column maps to
  /// any field, which almost always means the layout's header row is wrong.
  pub fn build(
    cells: &[Cell],
    overrides: &BTreeMap<String, Field>,
    row: usize,
  ) -> Result<Self> {
    let overrides: HashMap<String, Field> = overrides
      .iter()
      .map(|(k, f)| (header_key(k), *f))
      .collect();

    let mut map = Self::default();
    for (index, cell) in cells.iter().enumerate() {
      let text = cell.to_string().trim().to_owned();
      let key = header_key(&text);
      let field = overrides.get(&key).copied().or_else(|| default_field(&key));
      if let Some(field) = field {
        map.columns.entry(field).or_insert(index);
      }
      map.headers.push(text);
    }

    if map.columns.is_empty() {
      return Err(Error::MissingHeaderRow(row));
    }
    Ok(map)
  }

  pub fn column(&self, field: Field) -> Option<usize> {
    self.columns.get(&field).copied()
  }

  pub fn contains(&self, field: Field) -> bool {
    self.columns.contains_key(&field)
  }

  /// The header text of column `index`, as it appeared in the sheet.
  pub fn header(&self, index: usize) -> Option<&str> {
    self.headers.get(index).map(String::as_str)
  }

  /// Mapped fields in column order.
  pub fn fields(&self) -> Vec<(usize, Field)> {
    let mut fields: Vec<_> = self.columns.iter().map(|(f, i)| (*i, *f)).collect();
    fields.sort();
    fields
  }
}
