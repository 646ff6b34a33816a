// src/jobs/store.rs
//! Concurrent job registry — the single source of truth for job status.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use super::types::{Job, JobId, JobStatus};

/// Why a delivery claim did not produce a job.
#[derive(Debug, PartialEq, Eq)]
pub enum ClaimError {
    /// No job with that id (never submitted, or already delivered).
    NotFound,
    /// The job exists but has not completed; carries its current status.
    NotReady(JobStatus),
}

/// Lock-guarded map from job id to job record.
///
/// Every operation is a short critical section that never awaits; the store
/// never waits on the fetcher. Uses `std::sync::RwLock` because nothing
/// holds the guard across an `.await` point.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new job. Existing entries are never overwritten; a
    /// colliding id is refused and logged.
    pub fn insert(&self, job: Job) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.entry(job.id.clone()) {
                Entry::Occupied(_) => {
                    tracing::error!(job_id = %job.id, "refusing to overwrite existing job");
                    false
                }
                Entry::Vacant(slot) => {
                    slot.insert(job);
                    true
                }
            },
            Err(e) => {
                tracing::error!("RwLock poisoned inserting job: {e}");
                false
            }
        }
    }

    /// Snapshot of a job's current state.
    pub fn get(&self, id: &str) -> Option<Job> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(id).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading job: {e}");
                None
            }
        }
    }

    /// Atomic read-modify-write on one job. Returns false when the id is
    /// unknown (e.g. the record was already claimed and removed).
    pub fn update<F>(&self, id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(id) {
                Some(job) => {
                    mutate(job);
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("RwLock poisoned updating job: {e}");
                false
            }
        }
    }

    /// Remove a job record, returning it if present.
    pub fn remove(&self, id: &str) -> Option<Job> {
        match self.jobs.write() {
            Ok(mut jobs) => jobs.remove(id),
            Err(e) => {
                tracing::error!("RwLock poisoned removing job: {e}");
                None
            }
        }
    }

    /// Atomically claim a completed job for delivery, removing its record.
    ///
    /// Of two concurrent retrieval attempts exactly one receives the job;
    /// the other (and any later attempt) sees `NotFound`. This is what makes
    /// file handoff at-most-once.
    pub fn claim_delivery(&self, id: &str) -> Result<Job, ClaimError> {
        let mut jobs = match self.jobs.write() {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!("RwLock poisoned claiming job: {e}");
                return Err(ClaimError::NotFound);
            }
        };
        match jobs.get(id).map(|job| job.status) {
            Some(JobStatus::Completed) => jobs.remove(id).ok_or(ClaimError::NotFound),
            Some(status) => Err(ClaimError::NotReady(status)),
            None => Err(ClaimError::NotFound),
        }
    }

    pub fn len(&self) -> usize {
        match self.jobs.read() {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                tracing::error!("RwLock poisoned counting jobs: {e}");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
