//! Core types and trait definitions for the Scholaris registry.
//!
//! This crate is deliberately free of spreadsheet and database dependencies.
//! The sheet codec, the storage backends and the import pipeline all depend on
//! it; it depends on nothing of theirs.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod enrollment;
pub mod error;
pub mod location;
pub mod merge;
pub mod reference;
pub mod scholar;
pub mod store;

pub use error::{Error, Result};
pub use merge::{MergePolicy, UpsertOutcome};
pub use store::{EntityCounts, RegistryStore, StoreError};
