//! Scholar identity resolution.
//!
//! No single column identifies a person across legacy sheets, so a draft is
//! matched against existing scholars by, in order: unique id; first name,
//! last name and birth date; first, last and middle name.

use scholaris_core::{
  RegistryStore,
  scholar::{NewScholar, Scholar, ScholarDraft},
};
use scholaris_sheet::normalize;

use crate::error::{Error, Result};

/// Name suffixes recognised at the end of a combined name.
const EXTENSIONS: &[&str] = &["JR", "JR.", "SR", "SR.", "II", "III", "IV"];

/// Pop a trailing name suffix, leaving at least one token behind.
fn take_extension(tokens: &mut Vec<&str>) -> Option<String> {
  let is_extension = tokens.len() > 1
    && tokens
      .last()
      .is_some_and(|t| EXTENSIONS.contains(&t.to_ascii_uppercase().as_str()));
  if is_extension { tokens.pop().map(str::to_owned) } else { None }
}

/// The parts of a combined "applicant name" cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
  pub first:     Option<String>,
  pub middle:    Option<String>,
  pub last:      Option<String>,
  pub extension: Option<String>,
}

/// Split a combined name.
///
/// With a comma the cell reads `LAST, FIRST [MIDDLE]`, the final given token
/// being the middle name when there are two or more. Without one the last
/// token is the family name and the rest the given name. A trailing "JR.",
/// "III" and the like becomes the extension in both forms.
pub fn split_full_name(raw: &str) -> NameParts {
  let mut parts = NameParts::default();

  if let Some((last, given)) = raw.split_once(',') {
    let mut last_tokens: Vec<&str> = last.split_whitespace().collect();
    let mut given: Vec<&str> = given
      .split(|c: char| c.is_whitespace() || c == ',')
      .filter(|t| !t.is_empty())
      .collect();
    parts.extension = take_extension(&mut given).or_else(|| take_extension(&mut last_tokens));

    parts.last = normalize::clean(&last_tokens.join(" "));
    if given.len() >= 2 {
      parts.middle = given.pop().map(str::to_owned);
    }
    parts.first = normalize::clean(&given.join(" "));
  } else {
    let mut tokens: Vec<&str> = raw.split_whitespace().collect();
    parts.extension = take_extension(&mut tokens);
    parts.last = tokens.pop().map(str::to_owned);
    parts.first = normalize::clean(&tokens.join(" "));
  }
  parts
}

/// Outcome of matching a draft against the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityMatch {
  Existing(Scholar),
  New(NewScholar),
  /// No match and not enough of a name to create anyone; carries whatever
  /// identifying fragment the draft had.
  Rejected(String),
}

/// Find the scholar `draft` describes, if any.
pub async fn find_scholar<S: RegistryStore>(
  store: &S,
  draft: &ScholarDraft,
) -> Result<Option<Scholar>> {
  if let Some(uid) = &draft.unique_id
    && let Some(s) = store
      .find_scholar_by_unique_id(uid)
      .await
      .map_err(Error::store)?
  {
    return Ok(Some(s));
  }

  let (Some(first), Some(last)) = (&draft.first_name, &draft.last_name) else {
    return Ok(None);
  };

  if let Some(birth) = draft.birth_date
    && let Some(s) = store
      .find_scholar_by_name_and_birth_date(first, last, birth)
      .await
      .map_err(Error::store)?
  {
    return Ok(Some(s));
  }

  let by_name = store
    .find_scholar_by_full_name(first, last, draft.middle_name.as_deref())
    .await
    .map_err(Error::store)?;
  // Two recorded, different birth dates are two people.
  Ok(by_name.filter(|s| match (s.birth_date, draft.birth_date) {
    (Some(a), Some(b)) => a == b,
    _ => true,
  }))
}

/// Match `draft`, or prepare it for insertion.
pub async fn resolve_identity<S: RegistryStore>(
  store: &S,
  draft: &ScholarDraft,
) -> Result<IdentityMatch> {
  if let Some(existing) = find_scholar(store, draft).await? {
    return Ok(IdentityMatch::Existing(existing));
  }

  let email = match (&draft.email_address, &draft.first_name, &draft.last_name) {
    (Some(email), _, _) => email.clone(),
    (None, Some(first), Some(last)) => {
      normalize::placeholder_email(first, last, draft.birth_date)
    }
    _ => String::new(),
  };
  match NewScholar::from_draft(draft, email) {
    Ok(new) => Ok(IdentityMatch::New(new)),
    Err(_) => Ok(IdentityMatch::Rejected(draft.fragment())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parts(first: &str, middle: Option<&str>, last: &str, ext: Option<&str>) -> NameParts {
    NameParts {
      first:     Some(first.into()),
      middle:    middle.map(Into::into),
      last:      Some(last.into()),
      extension: ext.map(Into::into),
    }
  }

  #[test]
  fn comma_form_is_last_first_middle() {
    assert_eq!(
      split_full_name("DELA CRUZ, JUAN PEDRO"),
      parts("JUAN", Some("PEDRO"), "DELA CRUZ", None)
    );
    assert_eq!(
      split_full_name("Santos, Maria Clara Reyes"),
      parts("Maria Clara", Some("Reyes"), "Santos", None)
    );
    assert_eq!(split_full_name("Santos, Maria"), parts("Maria", None, "Santos", None));
  }

  #[test]
  fn plain_form_takes_last_token_as_family_name() {
    assert_eq!(
      split_full_name("Maria Clara Santos"),
      parts("Maria Clara", None, "Santos", None)
    );
  }

  #[test]
  fn extensions_are_split_off() {
    assert_eq!(
      split_full_name("Reyes, Jose Rizal Jr."),
      parts("Jose", Some("Rizal"), "Reyes", Some("Jr."))
    );
    assert_eq!(
      split_full_name("Jose Reyes III"),
      parts("Jose", None, "Reyes", Some("III"))
    );
    assert_eq!(
      split_full_name("REYES JR., JOSE"),
      parts("JOSE", None, "REYES", Some("JR."))
    );
  }

  #[test]
  fn single_token_has_no_given_name() {
    let p = split_full_name("Madonna");
    assert_eq!(p.last.as_deref(), Some("Madonna"));
    assert_eq!(p.first, None);
  }
}
