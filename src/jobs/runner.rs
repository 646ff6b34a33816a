// src/jobs/runner.rs
//! Per-job async task driving the download state machine.

use std::path::PathBuf;
use std::sync::Arc;

use crate::fetcher::{DownloadFormat, FetchError};
use crate::jobs::store::JobStore;
use crate::jobs::types::{new_job_id, Job, JobId, JobStatus};
use crate::sanitize::sanitize_filename;
use crate::state::AppState;

/// Stem used when sanitization strips a title down to nothing.
const FALLBACK_STEM: &str = "video";

/// Create a job record and spawn the task that owns its whole lifecycle.
///
/// Returns the job id immediately; the submitting request never waits on
/// the fetcher. The spawned task is the only writer of this job's fields,
/// and any fetcher failure is converted to the Failed state at the task
/// boundary — one job's failure can never take down another's runner.
pub fn spawn_download(state: Arc<AppState>, url: String, format: DownloadFormat) -> JobId {
    let id = register_job(&state.store, format, || new_job_id(&url, format));
    tracing::info!(job_id = %id, %url, format = format.token(), "download job started");

    let task_id = id.clone();
    tokio::spawn(async move {
        match run(&state, &task_id, &url, format).await {
            Ok(output_name) => {
                tracing::info!(job_id = %task_id, file = %output_name, "download job completed");
            }
            Err(e) => {
                tracing::warn!(job_id = %task_id, error = %e, "download job failed");
                state.store.update(&task_id, |job| job.fail(e.to_string()));
            }
        }
    });

    id
}

/// Insert a fresh job record, regenerating the id on collision.
///
/// The store refuses to overwrite an existing entry; proceeding with a
/// refused id would hand this runner's updates to a record another task
/// already owns. Collisions need the same url and format hashed in the
/// same nanosecond, so in practice the loop runs once.
fn register_job<F>(store: &JobStore, format: DownloadFormat, mut next_id: F) -> JobId
where
    F: FnMut() -> JobId,
{
    loop {
        let id = next_id();
        if store.insert(Job::new(id.clone(), format)) {
            return id;
        }
        tracing::warn!(job_id = %id, "job id collision, regenerating");
    }
}

/// Drive one job Starting → FetchingInfo → Downloading → Completed,
/// returning the output filename. Any error is recorded by the caller.
async fn run(
    state: &AppState,
    id: &str,
    url: &str,
    format: DownloadFormat,
) -> Result<String, FetchError> {
    state
        .store
        .update(id, |job| job.set_status(JobStatus::FetchingInfo));
    let info = state.fetcher.probe(url).await?;

    let stem = sanitize_filename(&info.title);
    let stem = if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    };
    let output_name = format.file_name(&stem);
    let output_path: PathBuf = state.config.download_dir.join(&output_name);

    state
        .store
        .update(id, |job| job.set_status(JobStatus::Downloading));
    state.fetcher.fetch(url, format, &output_path).await?;

    // A zero-exit fetch can still produce nothing (e.g. postprocessor ate
    // the file); verify before advertising Completed.
    if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
        return Err(FetchError::MissingOutput);
    }

    state
        .store
        .update(id, |job| job.complete(output_path, output_name.clone()));
    Ok(output_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetcher::mock::MockFetcher;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_state(fetcher: MockFetcher) -> (Arc<AppState>, TempDir) {
        let dir = tempfile::tempdir().expect("temp download dir");
        let config = Config {
            port: 0,
            download_dir: dir.path().to_path_buf(),
            cookies: None,
        };
        (AppState::new(config, Arc::new(fetcher)), dir)
    }

    async fn wait_terminal(state: &AppState, id: &str) -> Job {
        for _ in 0..500 {
            if let Some(job) = state.store.get(id) {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {id} never reached a terminal state");
    }

    #[test]
    fn test_register_job_regenerates_a_colliding_id() {
        let store = JobStore::new();
        let mut occupied = Job::new("dup".to_string(), DownloadFormat::Mp3);
        occupied.complete(PathBuf::from("downloads/old.mp3"), "old.mp3".to_string());
        assert!(store.insert(occupied));

        let mut ids = ["dup", "fresh"].into_iter().map(str::to_string);
        let id = register_job(&store, DownloadFormat::P720, || {
            ids.next().expect("ran out of candidate ids")
        });

        assert_eq!(id, "fresh");
        assert_eq!(store.get("fresh").unwrap().status, JobStatus::Starting);
        // The earlier job's record is untouched by the new registration.
        let survivor = store.get("dup").unwrap();
        assert_eq!(survivor.status, JobStatus::Completed);
        assert_eq!(survivor.output_name.as_deref(), Some("old.mp3"));
    }

    #[tokio::test]
    async fn test_successful_mp3_job_completes_with_output() {
        let (state, _dir) = test_state(MockFetcher::ok("My Great Song"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://valid.example/watch?id=1".to_string(),
            DownloadFormat::Mp3,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.output_name.as_deref(), Some("My_Great_Song.mp3"));
        let path = job.output_path.expect("completed job has a path");
        assert!(path.exists());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_video_job_names_file_with_quality_token() {
        let (state, _dir) = test_state(MockFetcher::ok("Clip / One"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://valid.example/watch?id=2".to_string(),
            DownloadFormat::P720,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output_name.as_deref(), Some("Clip_One_720p.mp4"));
    }

    #[tokio::test]
    async fn test_probe_failure_marks_job_failed() {
        let (state, _dir) = test_state(MockFetcher::failing_probe("Video unavailable"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://broken.example/v".to_string(),
            DownloadFormat::P720,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Failed);
        let detail = job.error.expect("failed job carries a detail");
        assert!(detail.contains("Video unavailable"), "got {detail}");
        assert!(job.output_path.is_none());
        assert_eq!(job.progress, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_job_failed() {
        let (state, _dir) = test_state(MockFetcher::failing_fetch("network unreachable"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://flaky.example/v".to_string(),
            DownloadFormat::Mp3,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("network unreachable"));
    }

    #[tokio::test]
    async fn test_fetch_without_output_file_fails_with_missing_output() {
        let (state, _dir) = test_state(MockFetcher::silent_fetch("Ghost"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://valid.example/v".to_string(),
            DownloadFormat::P360,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("download produced no file"));
    }

    #[tokio::test]
    async fn test_empty_title_falls_back_to_default_stem() {
        let (state, _dir) = test_state(MockFetcher::ok(r#"<>:"/\|?*"#));
        let id = spawn_download(
            Arc::clone(&state),
            "https://valid.example/v".to_string(),
            DownloadFormat::Mp3,
        );

        let job = wait_terminal(&state, &id).await;
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output_name.as_deref(), Some("video.mp3"));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_keep_distinct_records() {
        let (state, _dir) = test_state(MockFetcher::ok("Shared Title"));
        let id_a = spawn_download(
            Arc::clone(&state),
            "https://valid.example/a".to_string(),
            DownloadFormat::Mp3,
        );
        let id_b = spawn_download(
            Arc::clone(&state),
            "https://valid.example/b".to_string(),
            DownloadFormat::P1080,
        );
        assert_ne!(id_a, id_b);

        let job_a = wait_terminal(&state, &id_a).await;
        let job_b = wait_terminal(&state, &id_b).await;
        assert_eq!(job_a.status, JobStatus::Completed);
        assert_eq!(job_b.status, JobStatus::Completed);
        assert_eq!(job_a.output_name.as_deref(), Some("Shared_Title.mp3"));
        assert_eq!(job_b.output_name.as_deref(), Some("Shared_Title_1080p.mp4"));
    }

    #[tokio::test]
    async fn test_one_failing_job_does_not_disturb_a_succeeding_one() {
        let (ok_state, _dir) = test_state(MockFetcher::ok("Fine"));
        let bad_fetcher = MockFetcher::failing_probe("dead site");
        let bad_state = AppState::new(ok_state.config.clone(), Arc::new(bad_fetcher));

        let good = spawn_download(
            Arc::clone(&ok_state),
            "https://valid.example/v".to_string(),
            DownloadFormat::Mp3,
        );
        let bad = spawn_download(
            Arc::clone(&bad_state),
            "https://broken.example/v".to_string(),
            DownloadFormat::Mp3,
        );

        assert_eq!(wait_terminal(&ok_state, &good).await.status, JobStatus::Completed);
        assert_eq!(wait_terminal(&bad_state, &bad).await.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_observed_states_move_only_forward() {
        fn rank(status: JobStatus) -> u8 {
            match status {
                JobStatus::Starting => 0,
                JobStatus::FetchingInfo => 1,
                JobStatus::Downloading => 2,
                JobStatus::Completed | JobStatus::Failed => 3,
            }
        }

        let (state, _dir) = test_state(MockFetcher::ok("Ordered"));
        let id = spawn_download(
            Arc::clone(&state),
            "https://valid.example/v".to_string(),
            DownloadFormat::Mp3,
        );

        let mut last = 0;
        for _ in 0..500 {
            if let Some(job) = state.store.get(&id) {
                let now = rank(job.status);
                assert!(now >= last, "status went backward: {} after rank {last}", job.status);
                last = now;
                if job.status.is_terminal() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("job never finished");
    }
}
