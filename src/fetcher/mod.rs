// src/fetcher/mod.rs
//! External media-fetcher seam.
//!
//! `MediaFetcher` is the boundary behind which all site parsing, extraction
//! and transcoding live. The production implementation spawns `yt-dlp`;
//! tests swap in `MockFetcher`.

pub mod types;
pub mod yt_dlp;

#[cfg(test)]
pub mod mock;

pub use types::{DownloadFormat, FetchError, VideoInfo};
pub use yt_dlp::YtDlpFetcher;

use async_trait::async_trait;
use std::path::Path;

/// Collaborator that probes metadata and retrieves media.
///
/// Both operations may take seconds to minutes and carry their own bounded
/// per-attempt timeouts and retry counts; callers never retry on top.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Look up display metadata for a URL without downloading anything.
    async fn probe(&self, url: &str) -> Result<VideoInfo, FetchError>;

    /// Download (and transcode if needed) the media into `output`.
    async fn fetch(&self, url: &str, format: DownloadFormat, output: &Path)
        -> Result<(), FetchError>;
}
