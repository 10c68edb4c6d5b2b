//! Import jobs: one source sheet streamed through the row pipeline.

use scholaris_core::{RegistryStore, UpsertOutcome};
use scholaris_sheet::{RowStream, SourceRow};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  cache::ResolutionCache,
  config::ImportConfig,
  error::{Error, Result},
  pipeline::{RowOutcome, RowPipeline},
};

/// Tally of one finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
  pub source:             String,
  pub rows_seen:          u64,
  pub rows_imported:      u64,
  pub rows_skipped:       u64,
  pub rows_failed:        u64,
  pub scholars_created:   u64,
  pub scholars_updated:   u64,
  pub scholars_unchanged: u64,
  /// Distinct unresolved references reported.
  pub warnings:           u64,
  /// The store became unavailable and the remaining rows were skipped.
  pub aborted:            bool,
}

impl ImportSummary {
  fn record_scholar(&mut self, outcome: UpsertOutcome) {
    match outcome {
      UpsertOutcome::Created => self.scholars_created += 1,
      UpsertOutcome::Updated => self.scholars_updated += 1,
      UpsertOutcome::Unchanged => self.scholars_unchanged += 1,
    }
  }
}

pub struct ImportJob<S> {
  store:  S,
  config: ImportConfig,
}

impl<S: RegistryStore> ImportJob<S> {
  pub fn new(store: S, config: ImportConfig) -> Self { Self { store, config } }

  /// Run the job to completion. Only job-level preconditions (a missing
  /// program, an unreadable sheet) fail the job; row errors are logged and
  /// counted.
  pub async fn run(&self, rows: RowStream) -> Result<ImportSummary> {
    let span = tracing::info_span!(
      "import",
      job = %self.config.source_name,
      layout = %self.config.layout.name,
      program = %self.config.program,
    );
    self.run_inner(rows).instrument(span).await
  }

  async fn program_id(&self) -> Result<Uuid> {
    let name = self.config.program.as_str();
    if let Some(program) = self.store.find_program(name).await.map_err(Error::store)? {
      return Ok(program.program_id);
    }
    if !self.config.create_program {
      return Err(Error::MissingProgram(name.to_owned()));
    }
    let program = self
      .store
      .get_or_create_program(name)
      .await
      .map_err(Error::store)?;
    tracing::info!(program = name, "created program");
    Ok(program.program_id)
  }

  async fn run_inner(&self, mut rows: RowStream) -> Result<ImportSummary> {
    let program_id = self.program_id().await?;
    let pipeline = RowPipeline {
      program_id,
      layout: &self.config.layout,
      aliases: &self.config.hei_aliases,
    };
    let mut cache = ResolutionCache::new();
    let mut summary = ImportSummary {
      source: self.config.source_name.clone(),
      ..Default::default()
    };
    tracing::info!("import started");

    loop {
      let chunk = rows.next_chunk(self.config.layout.chunk_size)?;
      if chunk.is_empty() {
        break;
      }

      for row in &chunk {
        summary.rows_seen += 1;
        if summary.aborted {
          summary.rows_skipped += 1;
          continue;
        }

        match pipeline.process(&self.store, &mut cache, row).await {
          Ok(RowOutcome::Imported { scholar }) => {
            summary.rows_imported += 1;
            summary.record_scholar(scholar);
          }
          Ok(RowOutcome::Skipped(reason)) => {
            tracing::debug!(row = row.row_number(), ?reason, "row skipped");
            summary.rows_skipped += 1;
          }
          Err(e) => {
            tracing::error!(
              row = row.row_number(),
              raw = %row.raw(),
              error = %e,
              "row failed"
            );
            summary.rows_failed += 1;
            if e.is_unavailable() {
              tracing::error!("store unavailable; skipping the remaining rows");
              summary.aborted = true;
            }
          }
        }
      }
    }

    summary.warnings = cache.warnings();
    tracing::info!(
      rows_seen = summary.rows_seen,
      rows_imported = summary.rows_imported,
      rows_skipped = summary.rows_skipped,
      rows_failed = summary.rows_failed,
      warnings = summary.warnings,
      "import finished"
    );
    Ok(summary)
  }
}

/// Run a job on a background task. Jobs over different files may run
/// side by side; the store's unique constraints keep them consistent.
pub fn spawn_import<S>(
  store: S,
  config: ImportConfig,
  rows: RowStream,
) -> JoinHandle<Result<ImportSummary>>
where
  S: RegistryStore + 'static,
{
  tokio::spawn(async move { ImportJob::new(store, config).run(rows).await })
}
