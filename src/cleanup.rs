// src/cleanup.rs
//! File janitor: post-delivery removal and the startup sweep.
//!
//! Job state is in-memory only, so files left behind by an ungraceful
//! shutdown are orphans; the startup sweep clears the whole download
//! directory. After a delivery the job record is already gone (removed by
//! the store's claim), so only the file itself needs deferred removal.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::task::JoinHandle;

/// How long to wait after the response body is dropped before deleting the
/// file, so the transport finishes flushing any buffered bytes.
pub const DELIVERY_GRACE: Duration = Duration::from_secs(2);

/// Open file being streamed to a client. Dropping it schedules removal of
/// the backing file after the grace period, so the janitor runs exactly
/// once per delivery whether the transfer completed or the client went
/// away mid-stream. Must be dropped inside the runtime.
pub struct DeliveredFile {
    file: File,
    path: Option<PathBuf>,
}

impl DeliveredFile {
    pub fn new(file: File, path: PathBuf) -> Self {
        Self {
            file,
            path: Some(path),
        }
    }
}

impl AsyncRead for DeliveredFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

impl Drop for DeliveredFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            schedule_file_removal(path);
        }
    }
}

/// Schedule removal of a delivered file after the grace period.
///
/// Idempotent: an already-missing file is not an error. Returns the task
/// handle so tests can await the removal deterministically.
pub fn schedule_file_removal(path: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(DELIVERY_GRACE).await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "removed delivered file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "delivered file already gone");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove delivered file");
            }
        }
    })
}

/// Delete every regular file in the download directory. Run once at process
/// start; directories (and anything unreadable) are left alone and logged.
pub async fn sweep_stale_files(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove stale file");
            }
        }
    }
    Ok(removed)
}
