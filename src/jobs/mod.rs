// src/jobs/mod.rs
//! Asynchronous download-job subsystem.
//!
//! - `JobStore` — concurrent registry, the single source of truth for status
//! - `spawn_download` — one independent task per submitted job
//! - `Job`/`JobStatus` — forward-only state machine per job

pub mod runner;
pub mod store;
pub mod types;

pub use runner::spawn_download;
pub use store::{ClaimError, JobStore};
pub use types::{Job, JobId, JobStatus};
