//! The Scholaris ingestion pipeline.
//!
//! Turns rows of heterogeneous legacy sheets into upserts against a
//! [`scholaris_core::RegistryStore`]: values are normalised, geographic,
//! institution and course references resolved, the scholar matched or
//! created, and the enrollment history merged in. Jobs run on background
//! tasks and fail row by row, never as a whole, once they have started.

pub mod cache;
pub mod config;
pub mod course;
pub mod error;
pub mod geo;
pub mod hei;
pub mod identity;
pub mod job;
pub mod pipeline;
pub mod seed;
pub mod upsert;

pub use cache::ResolutionCache;
pub use config::{HeiAlias, ImportConfig};
pub use error::{Error, Result};
pub use job::{ImportJob, ImportSummary, spawn_import};
pub use pipeline::{RowOutcome, RowPipeline, RowRecord, SkipReason};
pub use seed::{ReferenceSeed, apply_seed};

#[cfg(test)]
mod tests;
