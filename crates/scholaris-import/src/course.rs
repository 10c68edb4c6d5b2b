//! Course and major resolution.
//!
//! Source sheets usually carry one combined string such as "BSBA MAJOR IN
//! MARKETING". The course half may be created when the run allows it; majors
//! are only ever looked up.

use scholaris_core::RegistryStore;
use scholaris_sheet::CreationPolicy;
use uuid::Uuid;

use crate::{
  cache::{ResolutionCache, key},
  error::{Error, Result},
};

const SEPARATORS: &[&str] = &[" MAJOR IN ", " SPECIALIZATION IN "];

/// A combined course string split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCourse {
  pub course: String,
  pub major:  Option<String>,
}

/// Split on the first " MAJOR IN " or " SPECIALIZATION IN "
/// (case-insensitive). Without a separator the whole string is the course.
pub fn parse_course(raw: &str) -> ParsedCourse {
  let upper = raw.to_ascii_uppercase();
  let split = SEPARATORS
    .iter()
    .filter_map(|sep| upper.find(sep).map(|at| (at, sep.len())))
    .min();

  match split {
    Some((at, len)) => {
      let major = raw[at + len..].trim();
      ParsedCourse {
        course: raw[..at].trim().to_owned(),
        major:  (!major.is_empty()).then(|| major.to_owned()),
      }
    }
    None => ParsedCourse {
      course: raw.trim().to_owned(),
      major:  None,
    },
  }
}

/// Replace every case-insensitive occurrence of the ASCII `from` with `to`.
fn replace_ascii_ci(s: &str, from: &str, to: &str) -> String {
  let upper = s.to_ascii_uppercase();
  let mut out = String::with_capacity(s.len());
  let mut last = 0;
  for (at, _) in upper.match_indices(from) {
    out.push_str(&s[last..at]);
    out.push_str(to);
    last = at + from.len();
  }
  out.push_str(&s[last..]);
  out
}

/// Spellings to try, in order, for a course name.
pub fn course_candidates(name: &str) -> Vec<String> {
  let mut candidates = vec![name.to_owned()];
  candidates.push(replace_ascii_ci(name, " MAJOR IN ", " in "));

  let upper = name.to_ascii_uppercase();
  if let Some(rest) = upper.strip_prefix("BS ") {
    candidates.push(format!("Bachelor of Science in {}", &name[name.len() - rest.len()..]));
  }
  if let Some(rest) = upper.strip_prefix("BA ").or_else(|| upper.strip_prefix("AB ")) {
    candidates.push(format!("Bachelor of Arts in {}", &name[name.len() - rest.len()..]));
  }
  if !upper.starts_with("BACHELOR") {
    candidates.push(format!("Bachelor of {name}"));
    candidates.push(format!("Bachelor of Science in {name}"));
    candidates.push(format!("Bachelor of Arts in {name}"));
  }

  let mut seen = std::collections::HashSet::new();
  candidates.retain(|c| seen.insert(key(c)));
  candidates
}

pub struct CourseResolver {
  pub policy: CreationPolicy,
}

impl CourseResolver {
  pub async fn resolve_course<S: RegistryStore>(
    &self,
    store: &S,
    cache: &mut ResolutionCache,
    name: &str,
  ) -> Result<Option<Uuid>> {
    if let Some(id) = cache.courses.get(&key(name)) {
      return Ok(*id);
    }

    let mut id = None;
    for candidate in course_candidates(name) {
      if let Some(course) = store.find_course(&candidate).await.map_err(Error::store)? {
        id = Some(course.course_id);
        break;
      }
    }

    if id.is_none() {
      if self.policy == CreationPolicy::CreateMissing {
        let course = store
          .get_or_create_course(name, None)
          .await
          .map_err(Error::store)?;
        tracing::debug!(name, "created course");
        id = Some(course.course_id);
      } else if cache.warn_once(format!("course:{}", key(name))) {
        tracing::warn!(course = name, "unmatched course");
      }
    }

    cache.courses.insert(key(name), id);
    Ok(id)
  }

  /// Lookup only. A miss leaves the major null and never affects the course.
  pub async fn resolve_major<S: RegistryStore>(
    &self,
    store: &S,
    cache: &mut ResolutionCache,
    name: &str,
  ) -> Result<Option<Uuid>> {
    if let Some(id) = cache.majors.get(&key(name)) {
      return Ok(*id);
    }
    let id = store
      .find_major(name)
      .await
      .map_err(Error::store)?
      .map(|m| m.major_id);
    if id.is_none() && cache.warn_once(format!("major:{}", key(name))) {
      tracing::warn!(major = name, "unmatched major");
    }
    cache.majors.insert(key(name), id);
    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_on_major_in() {
    assert_eq!(parse_course("BSBA MAJOR IN MARKETING"), ParsedCourse {
      course: "BSBA".into(),
      major:  Some("MARKETING".into()),
    });
    assert_eq!(
      parse_course("BSEd Specialization in Mathematics").major.as_deref(),
      Some("Mathematics")
    );
  }

  #[test]
  fn no_separator_keeps_the_whole_string() {
    assert_eq!(parse_course("BS Nursing"), ParsedCourse {
      course: "BS Nursing".into(),
      major:  None,
    });
  }

  #[test]
  fn candidates_expand_prefixes() {
    let c = course_candidates("BS Nursing");
    assert_eq!(c[0], "BS Nursing");
    assert!(c.contains(&"Bachelor of Science in Nursing".to_owned()));

    let c = course_candidates("AB Political Science");
    assert!(c.contains(&"Bachelor of Arts in Political Science".to_owned()));

    let c = course_candidates("Nursing");
    assert!(c.contains(&"Bachelor of Nursing".to_owned()));
    assert!(c.contains(&"Bachelor of Science in Nursing".to_owned()));
  }

  #[test]
  fn major_in_collapses_to_in() {
    let c = course_candidates("Bachelor of Secondary Education Major in English");
    assert!(c.contains(&"Bachelor of Secondary Education in English".to_owned()));
  }
}
