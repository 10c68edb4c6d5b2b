//! Institution (HEI) resolution.
//!
//! First hit wins:
//!
//! 0. exact match on the institution code, when the row has one;
//! 1. curated aliases whose pattern occurs in the raw name, looked up by their
//!    canonical term (exact, then substring);
//! 2. exact case-insensitive name;
//! 3. "St." / "St" spelled out as "Saint", exact;
//! 4. corporate suffixes stripped, substring match when more than five
//!    characters remain;
//! 5. steps 2 to 4 again on the text before the first hyphen ("WVSU - Calinog").
//!
//! Substring matches pick the shortest containing name, so the outcome does
//! not depend on insertion order.

use scholaris_core::{RegistryStore, reference::Hei};
use scholaris_sheet::CreationPolicy;
use uuid::Uuid;

use crate::{
  cache::{ResolutionCache, key},
  config::HeiAlias,
  error::{Error, Result},
};

const CORPORATE_SUFFIXES: &[&str] =
  &["INCORPORATED", "INC", "CORPORATION", "CORP", "FOUNDATION", "FDN"];

/// Shorter residuals match too many institutions to be useful.
const MIN_SUBSTRING_LEN: usize = 5;

/// `name` with a leading or embedded "St." / "St" spelled out, if it has one.
pub fn saint_form(name: &str) -> Option<String> {
  let mut changed = false;
  let words: Vec<String> = name
    .split_whitespace()
    .map(|w| {
      let upper = w.to_ascii_uppercase();
      if upper == "ST." || upper == "ST" {
        changed = true;
        "Saint".to_owned()
      } else if let Some(rest) = upper.strip_prefix("ST.") {
        changed = true;
        format!("Saint {}", &w[w.len() - rest.len()..])
      } else {
        w.to_owned()
      }
    })
    .collect();
  changed.then(|| words.join(" "))
}

/// `name` without trailing corporate suffixes and punctuation.
pub fn strip_suffixes(name: &str) -> String {
  let is_trailing = |c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | '-');
  let mut s = name.trim_end_matches(is_trailing);
  loop {
    let upper = s.to_ascii_uppercase();
    let stripped = CORPORATE_SUFFIXES.iter().find_map(|suffix| {
      let head = upper.strip_suffix(suffix)?;
      // Whole words only: "Zinc" keeps its "inc".
      head
        .chars()
        .last()
        .is_none_or(|c| !c.is_alphanumeric())
        .then(|| &s[..head.len()])
    });
    match stripped {
      Some(rest) => s = rest.trim_end_matches(is_trailing),
      None => return s.to_owned(),
    }
  }
}

/// The text before the first hyphen, for compound campus names.
pub fn hyphen_prefix(name: &str) -> Option<&str> {
  let (head, _) = name.split_once('-')?;
  let head = head.trim();
  (!head.is_empty()).then_some(head)
}

pub struct HeiResolver<'a> {
  pub aliases: &'a [HeiAlias],
  pub policy:  CreationPolicy,
}

impl HeiResolver<'_> {
  /// Resolve a row's institution to an id. A miss logs one warning per
  /// distinct name per job and, under `CreateMissing`, creates the
  /// institution from the cleaned raw name.
  pub async fn resolve<S: RegistryStore>(
    &self,
    store: &S,
    cache: &mut ResolutionCache,
    name: Option<&str>,
    code: Option<&str>,
  ) -> Result<Option<Uuid>> {
    if name.is_none() && code.is_none() {
      return Ok(None);
    }
    let cache_key = (
      name.map(key).unwrap_or_default(),
      code.map(key).unwrap_or_default(),
    );
    if let Some(id) = cache.heis.get(&cache_key) {
      return Ok(*id);
    }

    let found = self.find(store, name, code).await?.map(|h| h.hei_id);
    let id = match (found, name) {
      (Some(id), _) => Some(id),
      (None, Some(name)) if self.policy == CreationPolicy::CreateMissing => {
        let hei = store
          .get_or_create_hei(name, code)
          .await
          .map_err(Error::store)?;
        tracing::debug!(name, "created institution");
        Some(hei.hei_id)
      }
      (None, _) => {
        let label = name.or(code).unwrap_or_default();
        if cache.warn_once(format!("hei:{}", key(label))) {
          tracing::warn!(hei = label, "unmatched institution");
        }
        None
      }
    };
    cache.heis.insert(cache_key, id);
    Ok(id)
  }

  async fn find<S: RegistryStore>(
    &self,
    store: &S,
    name: Option<&str>,
    code: Option<&str>,
  ) -> Result<Option<Hei>> {
    if let Some(code) = code
      && let Some(hei) = store.find_hei_by_code(code).await.map_err(Error::store)?
    {
      return Ok(Some(hei));
    }
    let Some(name) = name else {
      return Ok(None);
    };

    let upper = name.to_uppercase();
    for alias in self
      .aliases
      .iter()
      .filter(|a| upper.contains(&a.pattern.to_uppercase()))
    {
      if let Some(hei) = store
        .find_hei_by_name(&alias.canonical)
        .await
        .map_err(Error::store)?
      {
        return Ok(Some(hei));
      }
      if let Some(hei) = store
        .find_hei_containing(&alias.canonical)
        .await
        .map_err(Error::store)?
      {
        return Ok(Some(hei));
      }
    }

    if let Some(hei) = match_name(store, name).await? {
      return Ok(Some(hei));
    }
    match hyphen_prefix(name) {
      Some(head) => match_name(store, head).await,
      None => Ok(None),
    }
  }
}

/// Exact, saint-form and suffix-stripped matching for one spelling.
async fn match_name<S: RegistryStore>(store: &S, name: &str) -> Result<Option<Hei>> {
  if let Some(hei) = store.find_hei_by_name(name).await.map_err(Error::store)? {
    return Ok(Some(hei));
  }

  let saint = saint_form(name);
  if let Some(saint) = &saint
    && let Some(hei) = store.find_hei_by_name(saint).await.map_err(Error::store)?
  {
    return Ok(Some(hei));
  }

  let residual = strip_suffixes(saint.as_deref().unwrap_or(name));
  if residual.chars().count() > MIN_SUBSTRING_LEN {
    return store
      .find_hei_containing(&residual)
      .await
      .map_err(Error::store);
  }
  Ok(None)
}
