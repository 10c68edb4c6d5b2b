//! Geographic hierarchy resolution, strictly top-down.
//!
//! Regions are matched by name and never created. Provinces are matched under
//! the resolved region, or by name alone when the row names no usable region,
//! and created only under a resolved region. Cities and districts are matched
//! under the resolved province, barangays under the resolved city; an
//! unresolved parent leaves every level below it as raw text only. Barangay
//! names repeat across the country, so they are never matched globally.

use scholaris_core::{
  RegistryStore,
  location::{LocationLevel, LocationRef, LocationScope},
  scholar::Address,
};
use scholaris_sheet::CreationPolicy;
use uuid::Uuid;

use crate::{
  cache::{ResolutionCache, key},
  error::{Error, Result},
};

/// The address text of one row, already cleaned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAddress {
  pub region:   Option<String>,
  pub province: Option<String>,
  pub city:     Option<String>,
  pub district: Option<String>,
  pub barangay: Option<String>,
}

/// Per level, the resolved id (if any) next to the raw text it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAddress {
  pub region:   LocationRef,
  pub province: LocationRef,
  pub city:     LocationRef,
  pub district: LocationRef,
  pub barangay: LocationRef,
}

impl ResolvedAddress {
  pub fn into_address(
    self,
    scholar_id: Uuid,
    street: Option<String>,
    zip_code: Option<String>,
  ) -> Address {
    Address {
      scholar_id,
      region: self.region,
      province: self.province,
      city: self.city,
      district: self.district,
      barangay: self.barangay,
      street,
      zip_code,
    }
  }
}

/// Where a level may be looked up.
#[derive(Debug, Clone, Copy)]
enum Parent {
  /// Match by name alone.
  Anywhere,
  Resolved(Uuid),
  /// The parent level was given but could not be resolved.
  Unresolved,
}

impl Parent {
  fn of(r: &LocationRef) -> Self {
    r.id.map_or(Self::Unresolved, Self::Resolved)
  }
}

/// The spellings a city may be stored under: "Iloilo City" and
/// "City of Iloilo" name the same place.
pub fn city_variants(name: &str) -> Vec<String> {
  let mut variants = vec![name.to_owned()];
  let upper = name.to_ascii_uppercase();
  if let Some(base) = upper.strip_suffix(" CITY") {
    let base = name[..base.len()].trim();
    variants.push(format!("City of {base}"));
  } else if upper.starts_with("CITY OF ") {
    let base = name["CITY OF ".len()..].trim();
    variants.push(format!("{base} City"));
  }
  variants
}

/// Resolve every level of `raw`. Creation follows `policy` except that
/// regions are never created.
pub async fn resolve_address<S: RegistryStore>(
  store: &S,
  cache: &mut ResolutionCache,
  raw: &RawAddress,
  policy: CreationPolicy,
) -> Result<ResolvedAddress> {
  let create = policy == CreationPolicy::CreateMissing;

  let region = resolve_level(
    store,
    cache,
    LocationLevel::Region,
    Parent::Anywhere,
    raw.region.as_deref(),
    false,
  )
  .await?;

  let province_parent = match region.id {
    Some(id) => Parent::Resolved(id),
    None => Parent::Anywhere,
  };
  let province = resolve_level(
    store,
    cache,
    LocationLevel::Province,
    province_parent,
    raw.province.as_deref(),
    create,
  )
  .await?;

  let city = resolve_level(
    store,
    cache,
    LocationLevel::City,
    Parent::of(&province),
    raw.city.as_deref(),
    create,
  )
  .await?;

  let district = resolve_level(
    store,
    cache,
    LocationLevel::District,
    Parent::of(&province),
    raw.district.as_deref(),
    create,
  )
  .await?;

  let barangay = resolve_level(
    store,
    cache,
    LocationLevel::Barangay,
    Parent::of(&city),
    raw.barangay.as_deref(),
    create,
  )
  .await?;

  Ok(ResolvedAddress {
    region,
    province,
    city,
    district,
    barangay,
  })
}

async fn resolve_level<S: RegistryStore>(
  store: &S,
  cache: &mut ResolutionCache,
  level: LocationLevel,
  parent: Parent,
  raw: Option<&str>,
  create: bool,
) -> Result<LocationRef> {
  let Some(name) = raw else {
    return Ok(LocationRef::default());
  };
  let (scope, parent_id) = match parent {
    Parent::Anywhere => (LocationScope::Anywhere, None),
    Parent::Resolved(id) => (LocationScope::Under(id), Some(id)),
    Parent::Unresolved => {
      return Ok(LocationRef::raw_only(Some(name.to_owned())));
    }
  };

  let cache_key = (level, parent_id, key(name));
  let id = match cache.locations.get(&cache_key) {
    Some(id) => *id,
    None => {
      let id = lookup(store, level, scope, parent_id, name, create).await?;
      if id.is_none() && cache.warn_once(format!("{level}:{parent_id:?}:{}", key(name))) {
        tracing::warn!(%level, name, "unresolved location; keeping raw text");
      }
      cache.locations.insert(cache_key, id);
      id
    }
  };

  Ok(LocationRef {
    id,
    raw: Some(name.to_owned()),
  })
}

async fn lookup<S: RegistryStore>(
  store: &S,
  level: LocationLevel,
  scope: LocationScope,
  parent_id: Option<Uuid>,
  name: &str,
  create: bool,
) -> Result<Option<Uuid>> {
  let candidates = match level {
    LocationLevel::City => city_variants(name),
    _ => vec![name.to_owned()],
  };
  for candidate in &candidates {
    if let Some(found) = store
      .find_location(level, scope, candidate)
      .await
      .map_err(Error::store)?
    {
      return Ok(Some(found.location_id));
    }
  }

  // Only ever create beneath a resolved parent.
  match parent_id {
    Some(parent_id) if create => {
      let created = store
        .get_or_create_location(level, Some(parent_id), name)
        .await
        .map_err(Error::store)?;
      tracing::debug!(%level, name, "created location");
      Ok(Some(created.location_id))
    }
    _ => Ok(None),
  }
}
