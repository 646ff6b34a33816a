// src/jobs/types.rs
//! Job record and status types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::fetcher::DownloadFormat;

/// Opaque external handle for one download job.
pub type JobId = String;

/// Lifecycle state of a job. Transitions only move forward:
/// Starting → FetchingInfo → Downloading → Completed | Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Starting,
    FetchingInfo,
    Downloading,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::FetchingInfo => "fetching_info",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked download request. Mutated exclusively by the runner task
/// bound to it; everyone else sees clone-out snapshots from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub format: DownloadFormat,
    pub status: JobStatus,
    /// Coarse indicator: 0 until completion, 100 after. The extractor does
    /// not report fine-grained progress through this service.
    pub progress: u8,
    /// Filesystem location of the artifact; set exactly when Completed.
    pub output_path: Option<PathBuf>,
    /// Sanitized display filename; set exactly when Completed.
    pub output_name: Option<String>,
    /// Human-readable failure detail; set exactly when Failed.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, format: DownloadFormat) -> Self {
        Self {
            id,
            format,
            status: JobStatus::Starting,
            progress: 0,
            output_path: None,
            output_name: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }

    pub fn complete(&mut self, output_path: PathBuf, output_name: String) {
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.output_path = Some(output_path);
        self.output_name = Some(output_name);
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(detail.into());
    }
}

/// Derive a job id from the request and submission time.
///
/// Hashing (url, format, nanos) keeps ids opaque and collision-free for the
/// process lifetime even for repeated submissions of the same URL.
pub fn new_job_id(url: &str, format: DownloadFormat) -> JobId {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(format.token().as_bytes());
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes(),
    );
    hex::encode(&hasher.finalize()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_starts_in_starting_state() {
        let job = Job::new("abc".to_string(), DownloadFormat::Mp3);
        assert_eq!(job.status, JobStatus::Starting);
        assert_eq!(job.progress, 0);
        assert!(job.output_path.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_complete_sets_output_and_progress() {
        let mut job = Job::new("abc".to_string(), DownloadFormat::P720);
        job.complete(PathBuf::from("downloads/a_720p.mp4"), "a_720p.mp4".to_string());
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.output_name.as_deref(), Some("a_720p.mp4"));
        assert!(job.output_path.is_some());
    }

    #[test]
    fn test_fail_records_detail() {
        let mut job = Job::new("abc".to_string(), DownloadFormat::Best);
        job.fail("extraction failed: geo-blocked");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("extraction failed: geo-blocked"));
        assert!(job.output_path.is_none());
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Starting.is_terminal());
        assert!(!JobStatus::FetchingInfo.is_terminal());
        assert!(!JobStatus::Downloading.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&JobStatus::FetchingInfo).unwrap(),
            "\"fetching_info\""
        );
        assert_eq!(JobStatus::FetchingInfo.to_string(), "fetching_info");
    }

    #[test]
    fn test_job_ids_are_unique_per_submission() {
        let a = new_job_id("https://e.com/v", DownloadFormat::Mp3);
        let b = new_job_id("https://e.com/v", DownloadFormat::Mp3);
        assert_ne!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
