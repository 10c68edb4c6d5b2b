//! Scholars, the natural persons the registry is about, and their addresses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, MergePolicy, Result,
  location::LocationRef,
  merge::fill,
};

/// Domain of generated placeholder email addresses. `.invalid` is reserved
/// (RFC 2606) so a placeholder can never collide with a deliverable address.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "no-email.invalid";

/// Whether `email` is a generated placeholder rather than a real address.
pub fn is_placeholder_email(email: &str) -> bool {
  email
    .rsplit_once('@')
    .is_some_and(|(_, domain)| domain.eq_ignore_ascii_case(PLACEHOLDER_EMAIL_DOMAIN))
}

// ─── Sex ─────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum Sex {
  #[strum(serialize = "M")]
  #[serde(rename = "M")]
  Male,
  #[strum(serialize = "F")]
  #[serde(rename = "F")]
  Female,
}

impl Sex {
  pub fn code(self) -> &'static str {
    match self {
      Self::Male => "M",
      Self::Female => "F",
    }
  }

  pub fn from_code(code: &str) -> Result<Self> {
    code.parse().map_err(|_| Error::UnknownSex(code.to_owned()))
  }
}

// ─── Scholar ─────────────────────────────────────────────────────────────────

/// A persisted scholar. At most one row exists per real person; the importer
/// infers identity from several natural keys rather than trusting one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholar {
  pub scholar_id:     Uuid,
  /// Externally issued reference number; absent in most legacy sheets.
  pub unique_id:      Option<String>,
  pub first_name:     String,
  pub middle_name:    Option<String>,
  pub last_name:      String,
  /// Name suffix such as "JR." or "III".
  pub extension_name: Option<String>,
  pub sex:            Option<Sex>,
  pub birth_date:     Option<NaiveDate>,
  pub contact_no:     Option<String>,
  /// Never null; a generated placeholder stands in for a missing address.
  pub email_address:  String,
  /// Person-with-disability flag.
  pub is_pwd:         Option<bool>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

impl Scholar {
  /// A later source is not guaranteed to be more authoritative than an
  /// earlier one, so existing values always win.
  pub const POLICY: MergePolicy = MergePolicy::FillMissing;

  /// Back-fill currently-empty fields from `draft`. Returns whether anything
  /// changed.
  pub fn merge_from(&mut self, draft: &ScholarDraft) -> bool {
    let mut changed = false;
    changed |= fill(&mut self.unique_id, &draft.unique_id);
    changed |= fill(&mut self.middle_name, &draft.middle_name);
    changed |= fill(&mut self.extension_name, &draft.extension_name);
    changed |= fill(&mut self.sex, &draft.sex);
    changed |= fill(&mut self.birth_date, &draft.birth_date);
    changed |= fill(&mut self.contact_no, &draft.contact_no);
    changed |= fill(&mut self.is_pwd, &draft.is_pwd);

    if is_placeholder_email(&self.email_address)
      && let Some(email) = &draft.email_address
      && !is_placeholder_email(email)
    {
      self.email_address = email.clone();
      changed = true;
    }
    changed
  }

  pub fn full_name(&self) -> String {
    let mut parts = vec![self.first_name.as_str()];
    if let Some(m) = &self.middle_name {
      parts.push(m);
    }
    parts.push(&self.last_name);
    if let Some(e) = &self.extension_name {
      parts.push(e);
    }
    parts.join(" ")
  }
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// Everything a source row says about a person, already normalised. Any field
/// may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScholarDraft {
  pub unique_id:      Option<String>,
  pub first_name:     Option<String>,
  pub middle_name:    Option<String>,
  pub last_name:      Option<String>,
  pub extension_name: Option<String>,
  pub sex:            Option<Sex>,
  pub birth_date:     Option<NaiveDate>,
  pub contact_no:     Option<String>,
  /// A validated address, or `None`. Placeholders are generated on insert.
  pub email_address:  Option<String>,
  pub is_pwd:         Option<bool>,
}

impl ScholarDraft {
  /// A short identifying fragment for log lines about drafts that cannot be
  /// stored.
  pub fn fragment(&self) -> String {
    self
      .unique_id
      .clone()
      .or_else(|| self.email_address.clone())
      .or_else(|| self.first_name.clone())
      .or_else(|| self.last_name.clone())
      .unwrap_or_else(|| "<unidentified>".into())
  }
}

/// Input to [`crate::store::RegistryStore::insert_scholar`]. Unlike a
/// [`ScholarDraft`] both name parts and the email are guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScholar {
  pub unique_id:      Option<String>,
  pub first_name:     String,
  pub middle_name:    Option<String>,
  pub last_name:      String,
  pub extension_name: Option<String>,
  pub sex:            Option<Sex>,
  pub birth_date:     Option<NaiveDate>,
  pub contact_no:     Option<String>,
  pub email_address:  String,
  pub is_pwd:         Option<bool>,
}

impl NewScholar {
  /// Promote a draft. Fails unless both first and last name are present; an
  /// anonymous scholar is never created.
  pub fn from_draft(
    draft: &ScholarDraft,
    email_address: String,
  ) -> Result<Self> {
    let first_name = draft
      .first_name
      .clone()
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingName("first name"))?;
    let last_name = draft
      .last_name
      .clone()
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingName("last name"))?;

    Ok(Self {
      unique_id: draft.unique_id.clone(),
      first_name,
      middle_name: draft.middle_name.clone(),
      last_name,
      extension_name: draft.extension_name.clone(),
      sex: draft.sex,
      birth_date: draft.birth_date,
      contact_no: draft.contact_no.clone(),
      email_address,
      is_pwd: draft.is_pwd,
    })
  }
}

// ─── Address ─────────────────────────────────────────────────────────────────

/// The single address of a scholar. Every level keeps its raw text next to the
/// resolved id so unresolved levels can be backfilled later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub scholar_id: Uuid,
  pub region:     LocationRef,
  pub province:   LocationRef,
  pub city:       LocationRef,
  pub district:   LocationRef,
  pub barangay:   LocationRef,
  pub street:     Option<String>,
  pub zip_code:   Option<String>,
}

/// Index of each level's parent within [`Address::levels`].
const LEVEL_PARENT: [Option<usize>; 5] = [None, Some(0), Some(1), Some(1), Some(2)];

impl Address {
  pub const POLICY: MergePolicy = MergePolicy::FillMissing;

  /// Region, province, city, district, barangay.
  pub fn levels(&self) -> [&LocationRef; 5] {
    [
      &self.region,
      &self.province,
      &self.city,
      &self.district,
      &self.barangay,
    ]
  }

  pub fn levels_mut(&mut self) -> [&mut LocationRef; 5] {
    [
      &mut self.region,
      &mut self.province,
      &mut self.city,
      &mut self.district,
      &mut self.barangay,
    ]
  }

  /// Fill empty levels from `incoming`. A level's id and raw text move as a
  /// pair so a stored id never disagrees with its raw text.
  ///
  /// A level is only filled while every level above it names the same place
  /// in both addresses, so the stored address never mixes two branches of
  /// the hierarchy.
  pub fn merge_from(&mut self, incoming: &Address) -> bool {
    let sources = incoming.levels();
    let mut on_branch = [false; 5];
    let mut changed = false;
    for (i, parent) in LEVEL_PARENT.into_iter().enumerate() {
      on_branch[i] = match parent {
        None => true,
        Some(p) => on_branch[p] && self.levels()[p].same_place(sources[p]),
      };
      if on_branch[i]
        && let Some(slot) = self.levels_mut().into_iter().nth(i)
      {
        changed |= slot.fill_from(sources[i]);
      }
    }
    changed |= fill(&mut self.street, &incoming.street);
    changed |= fill(&mut self.zip_code, &incoming.zip_code);
    changed
  }

  pub fn is_empty(&self) -> bool {
    self.levels().iter().all(|l| l.is_empty())
      && self.street.is_none()
      && self.zip_code.is_none()
  }
}
