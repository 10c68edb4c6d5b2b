//! Natural-key upserts.
//!
//! Each function finds the row by its natural key, merges into it with the
//! entity's merge policy and writes only when something changed. An insert
//! that loses a uniqueness race to a concurrent job re-reads the winner and
//! merges into it instead.

use scholaris_core::{
  RegistryStore, StoreError as _, UpsertOutcome,
  enrollment::{
    AcademicRecord, BillingAttrs, BillingRecord, Enrollment, EnrollmentAttrs,
    RecordAttrs,
  },
  scholar::{Address, Scholar, ScholarDraft},
};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  identity::{self, IdentityMatch},
};

// ─── Scholar ─────────────────────────────────────────────────────────────────

async fn merge_scholar<S: RegistryStore>(
  store: &S,
  mut scholar: Scholar,
  draft: &ScholarDraft,
) -> Result<(Scholar, UpsertOutcome)> {
  let changed = scholar.merge_from(draft);
  if changed {
    store.update_scholar(&scholar).await.map_err(Error::store)?;
  }
  Ok((scholar, UpsertOutcome::from_changed(changed)))
}

/// Match `draft` to a scholar and fill that scholar's missing fields, or
/// create one. `None` means the draft was rejected for lack of a name.
pub async fn upsert_scholar<S: RegistryStore>(
  store: &S,
  draft: &ScholarDraft,
) -> Result<Option<(Scholar, UpsertOutcome)>> {
  let matched = identity::resolve_identity(store, draft).await?;
  save_scholar(store, draft, matched).await
}

/// Write a scholar matched by [`resolve_identity`](identity::resolve_identity):
/// fill an existing scholar's missing fields or create a new one. `None`
/// means the draft was rejected for lack of a name.
pub async fn save_scholar<S: RegistryStore>(
  store: &S,
  draft: &ScholarDraft,
  matched: IdentityMatch,
) -> Result<Option<(Scholar, UpsertOutcome)>> {
  match matched {
    IdentityMatch::Existing(scholar) => merge_scholar(store, scholar, draft).await.map(Some),
    IdentityMatch::New(new) => match store.insert_scholar(new).await {
      Ok(scholar) => Ok(Some((scholar, UpsertOutcome::Created))),
      Err(e) if e.is_conflict() => {
        let winner = identity::find_scholar(store, draft)
          .await?
          .ok_or(Error::LostRace("scholar"))?;
        merge_scholar(store, winner, draft).await.map(Some)
      }
      Err(e) => Err(Error::store(e)),
    },
    IdentityMatch::Rejected(fragment) => {
      tracing::debug!(%fragment, "scholar has no usable name; not created");
      Ok(None)
    }
  }
}

/// Fill the empty levels of the scholar's address.
pub async fn upsert_address<S: RegistryStore>(
  store: &S,
  incoming: &Address,
) -> Result<UpsertOutcome> {
  if incoming.is_empty() {
    return Ok(UpsertOutcome::Unchanged);
  }
  match store
    .get_address(incoming.scholar_id)
    .await
    .map_err(Error::store)?
  {
    None => {
      store.put_address(incoming).await.map_err(Error::store)?;
      Ok(UpsertOutcome::Created)
    }
    Some(mut address) => {
      let changed = address.merge_from(incoming);
      if changed {
        store.put_address(&address).await.map_err(Error::store)?;
      }
      Ok(UpsertOutcome::from_changed(changed))
    }
  }
}

// ─── Enrollment history ──────────────────────────────────────────────────────

async fn merge_enrollment<S: RegistryStore>(
  store: &S,
  mut enrollment: Enrollment,
  attrs: &EnrollmentAttrs,
) -> Result<(Enrollment, UpsertOutcome)> {
  let changed = enrollment.attrs.merge_from(attrs);
  if changed {
    store
      .update_enrollment(&enrollment)
      .await
      .map_err(Error::store)?;
  }
  Ok((enrollment, UpsertOutcome::from_changed(changed)))
}

/// Keyed on (scholar, program). Supplied attributes replace stored ones;
/// omitted attributes are kept.
pub async fn upsert_enrollment<S: RegistryStore>(
  store: &S,
  scholar_id: Uuid,
  program_id: Uuid,
  attrs: EnrollmentAttrs,
) -> Result<(Enrollment, UpsertOutcome)> {
  if let Some(existing) = store
    .find_enrollment(scholar_id, program_id)
    .await
    .map_err(Error::store)?
  {
    return merge_enrollment(store, existing, &attrs).await;
  }

  match store
    .insert_enrollment(scholar_id, program_id, attrs.clone())
    .await
  {
    Ok(created) => Ok((created, UpsertOutcome::Created)),
    Err(e) if e.is_conflict() => {
      let winner = store
        .find_enrollment(scholar_id, program_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::LostRace("enrollment"))?;
      merge_enrollment(store, winner, &attrs).await
    }
    Err(e) => Err(Error::store(e)),
  }
}

async fn merge_record<S: RegistryStore>(
  store: &S,
  mut record: AcademicRecord,
  attrs: &RecordAttrs,
) -> Result<(AcademicRecord, UpsertOutcome)> {
  let changed = record.attrs.merge_from(attrs);
  if changed {
    store
      .update_academic_record(&record)
      .await
      .map_err(Error::store)?;
  }
  Ok((record, UpsertOutcome::from_changed(changed)))
}

/// Keyed on (enrollment, academic year, semester).
pub async fn upsert_academic_record<S: RegistryStore>(
  store: &S,
  enrollment_id: Uuid,
  academic_year_id: Uuid,
  semester_id: Uuid,
  attrs: RecordAttrs,
) -> Result<(AcademicRecord, UpsertOutcome)> {
  if let Some(existing) = store
    .find_academic_record(enrollment_id, academic_year_id, semester_id)
    .await
    .map_err(Error::store)?
  {
    return merge_record(store, existing, &attrs).await;
  }

  match store
    .insert_academic_record(enrollment_id, academic_year_id, semester_id, attrs.clone())
    .await
  {
    Ok(created) => Ok((created, UpsertOutcome::Created)),
    Err(e) if e.is_conflict() => {
      let winner = store
        .find_academic_record(enrollment_id, academic_year_id, semester_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::LostRace("academic record"))?;
      merge_record(store, winner, &attrs).await
    }
    Err(e) => Err(Error::store(e)),
  }
}

async fn merge_billing<S: RegistryStore>(
  store: &S,
  mut billing: BillingRecord,
  attrs: &BillingAttrs,
) -> Result<(BillingRecord, UpsertOutcome)> {
  let changed = billing.attrs.merge_from(attrs);
  if changed {
    store
      .update_billing_record(&billing)
      .await
      .map_err(Error::store)?;
  }
  Ok((billing, UpsertOutcome::from_changed(changed)))
}

/// Keyed 1:1 on the owning academic record.
pub async fn upsert_billing_record<S: RegistryStore>(
  store: &S,
  record_id: Uuid,
  attrs: BillingAttrs,
) -> Result<(BillingRecord, UpsertOutcome)> {
  if let Some(existing) = store
    .find_billing_record(record_id)
    .await
    .map_err(Error::store)?
  {
    return merge_billing(store, existing, &attrs).await;
  }

  match store.insert_billing_record(record_id, attrs.clone()).await {
    Ok(created) => Ok((created, UpsertOutcome::Created)),
    Err(e) if e.is_conflict() => {
      let winner = store
        .find_billing_record(record_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::LostRace("billing record"))?;
      merge_billing(store, winner, &attrs).await
    }
    Err(e) => Err(Error::store(e)),
  }
}
