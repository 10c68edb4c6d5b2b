//! `scholaris` command-line front end for the registry importer.
//!
//! # Usage
//!
//! ```text
//! scholaris import --program TES --layout tes_grantees grantees-2023.xlsx
//! scholaris --config /etc/scholaris.toml import --program TDP a.csv b.csv
//! scholaris seed reference.toml
//! scholaris layouts
//! ```
//!
//! Each file given to `import` runs as its own job; the jobs run side by side
//! and their summaries are printed to stdout as JSON.

mod config;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use scholaris_import::{ImportConfig, ImportSummary, ReferenceSeed, apply_seed, spawn_import};
use scholaris_sheet::{RowStream, SourceLayout};
use scholaris_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Scholaris registry importer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "scholaris.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import one or more sheets into the registry.
  Import {
    /// Scholarship program the rows enroll into.
    #[arg(short, long)]
    program:        String,
    /// Source layout name; defaults to `default_layout` from the config.
    #[arg(short, long)]
    layout:         Option<String>,
    /// Worksheet to read from workbooks; defaults to the first one.
    #[arg(long)]
    sheet:          Option<String>,
    /// Create the program if it does not exist yet.
    #[arg(long)]
    create_program: bool,
    #[arg(required = true, value_name = "FILE")]
    files:          Vec<PathBuf>,
  },
  /// List the available source layouts.
  Layouts,
  /// Load reference data (programs, institutions, courses, places).
  Seed {
    #[arg(value_name = "FILE")]
    file: PathBuf,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  match cli.command {
    Command::Layouts => list_layouts(&cfg),
    Command::Seed { file } => seed(&cfg, file).await,
    Command::Import {
      program,
      layout,
      sheet,
      create_program,
      files,
    } => {
      let layout_name = layout.unwrap_or_else(|| cfg.default_layout.clone());
      let layout = SourceLayout::find(&layout_name, &cfg.layouts)?;
      import(&cfg, ImportArgs {
        program,
        layout,
        sheet,
        create_program,
        files,
      })
      .await
    }
  }
}

async fn open_store(cfg: &AppConfig) -> Result<SqliteStore> {
  SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
}

// ─── import ───────────────────────────────────────────────────────────────────

struct ImportArgs {
  program:        String,
  layout:         SourceLayout,
  sheet:          Option<String>,
  create_program: bool,
  files:          Vec<PathBuf>,
}

async fn import(cfg: &AppConfig, args: ImportArgs) -> Result<()> {
  let store = open_store(cfg).await?;

  let mut jobs = Vec::with_capacity(args.files.len());
  for path in &args.files {
    let rows = RowStream::open(path, args.sheet.as_deref(), &args.layout)
      .with_context(|| format!("failed to open {}", path.display()))?;

    let mut job = ImportConfig::new(args.program.clone(), args.layout.clone());
    job.create_program = args.create_program;
    job.source_name = path.display().to_string();
    // Site aliases are tried before the built-in ones.
    job.hei_aliases.splice(0..0, cfg.hei_aliases.iter().cloned());

    tracing::info!(file = %path.display(), layout = %args.layout.name, "queued import");
    jobs.push((path, spawn_import(store.clone(), job, rows)));
  }

  let mut summaries: Vec<ImportSummary> = Vec::with_capacity(jobs.len());
  let mut failed = 0usize;
  for (path, handle) in jobs {
    match handle.await.context("import task panicked")? {
      Ok(summary) => summaries.push(summary),
      Err(e) => {
        tracing::error!(file = %path.display(), error = %e, "import failed");
        failed += 1;
      }
    }
  }

  println!("{}", serde_json::to_string_pretty(&summaries)?);
  if failed > 0 {
    anyhow::bail!("{failed} of {} imports failed", args.files.len());
  }
  Ok(())
}

// ─── layouts ──────────────────────────────────────────────────────────────────

fn list_layouts(cfg: &AppConfig) -> Result<()> {
  let mut layouts = cfg.layouts.clone();
  for builtin in SourceLayout::builtin() {
    if !layouts.iter().any(|l| l.name.eq_ignore_ascii_case(&builtin.name)) {
      layouts.push(builtin);
    }
  }

  println!(
    "{:<20} {:>6} {:>6}  {:<15} {:<15} {:<15}",
    "NAME", "HEADER", "CHUNK", "GEO", "HEI", "COURSE"
  );
  for l in &layouts {
    println!(
      "{:<20} {:>6} {:>6}  {:<15} {:<15} {:<15}",
      l.name,
      l.header_row,
      l.chunk_size,
      l.geo_policy.to_string(),
      l.hei_policy.to_string(),
      l.course_policy.to_string(),
    );
  }
  Ok(())
}

// ─── seed ─────────────────────────────────────────────────────────────────────

async fn seed(cfg: &AppConfig, file: PathBuf) -> Result<()> {
  let raw = std::fs::read_to_string(&file)
    .with_context(|| format!("reading seed file {}", file.display()))?;
  let seed: ReferenceSeed = toml::from_str(&raw).context("parsing seed file")?;

  let store = open_store(cfg).await?;
  let counts = apply_seed(&store, &seed).await?;
  println!("{}", serde_json::to_string_pretty(&counts)?);
  Ok(())
}
