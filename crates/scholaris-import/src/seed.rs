//! Reference data seeding.
//!
//! Majors are never created by imports, and regions never are either, so a
//! fresh registry is seeded from a curated reference file first. Seeding is
//! idempotent: every write is a get-or-create.

use scholaris_core::{EntityCounts, RegistryStore, location::LocationLevel};
use scholaris_sheet::normalize;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSeed {
  #[serde(default)]
  pub programs:  Vec<String>,
  #[serde(default)]
  pub semesters: Vec<String>,
  #[serde(default)]
  pub heis:      Vec<SeedHei>,
  #[serde(default)]
  pub courses:   Vec<SeedCourse>,
  #[serde(default)]
  pub majors:    Vec<String>,
  #[serde(default)]
  pub regions:   Vec<SeedRegion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedHei {
  pub name: String,
  pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCourse {
  pub name:         String,
  pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRegion {
  pub name:      String,
  #[serde(default)]
  pub provinces: Vec<SeedProvince>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProvince {
  pub name:      String,
  #[serde(default)]
  pub cities:    Vec<SeedCity>,
  #[serde(default)]
  pub districts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCity {
  pub name:      String,
  #[serde(default)]
  pub barangays: Vec<String>,
}

async fn location<S: RegistryStore>(
  store: &S,
  level: LocationLevel,
  parent_id: Option<Uuid>,
  name: &str,
) -> Result<Uuid> {
  let node = store
    .get_or_create_location(level, parent_id, name)
    .await
    .map_err(Error::store)?;
  Ok(node.location_id)
}

/// Write `seed` into `store` and return the resulting table counts.
pub async fn apply_seed<S: RegistryStore>(
  store: &S,
  seed: &ReferenceSeed,
) -> Result<EntityCounts> {
  for name in &seed.programs {
    store.get_or_create_program(name).await.map_err(Error::store)?;
  }
  for label in &seed.semesters {
    store
      .get_or_create_semester(&normalize::semester(label))
      .await
      .map_err(Error::store)?;
  }
  for hei in &seed.heis {
    store
      .get_or_create_hei(&hei.name, hei.code.as_deref())
      .await
      .map_err(Error::store)?;
  }
  for course in &seed.courses {
    store
      .get_or_create_course(&course.name, course.abbreviation.as_deref())
      .await
      .map_err(Error::store)?;
  }
  for name in &seed.majors {
    store.get_or_create_major(name).await.map_err(Error::store)?;
  }

  for region in &seed.regions {
    let region_id = location(store, LocationLevel::Region, None, &region.name).await?;
    for province in &region.provinces {
      let province_id =
        location(store, LocationLevel::Province, Some(region_id), &province.name).await?;
      for district in &province.districts {
        location(store, LocationLevel::District, Some(province_id), district).await?;
      }
      for city in &province.cities {
        let city_id =
          location(store, LocationLevel::City, Some(province_id), &city.name).await?;
        for barangay in &city.barangays {
          location(store, LocationLevel::Barangay, Some(city_id), barangay).await?;
        }
      }
    }
  }

  let counts = store.counts().await.map_err(Error::store)?;
  tracing::info!(
    heis = counts.heis,
    courses = counts.courses,
    majors = counts.majors,
    locations = counts.locations,
    "reference data seeded"
  );
  Ok(counts)
}
