// src/fetcher/mock.rs
//! Test double for `MediaFetcher`.

use std::path::Path;

use async_trait::async_trait;

use super::types::{DownloadFormat, FetchError, VideoInfo};
use super::MediaFetcher;

/// Configurable in-memory fetcher. Successful fetches write a small payload
/// to the requested output path so the runner's file-existence check passes.
pub struct MockFetcher {
    title: String,
    probe_error: Option<String>,
    fetch_error: Option<String>,
    write_output: bool,
}

impl MockFetcher {
    /// A fetcher where both probe and fetch succeed.
    pub fn ok(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            probe_error: None,
            fetch_error: None,
            write_output: true,
        }
    }

    /// Probe fails with an extraction error.
    pub fn failing_probe(message: impl Into<String>) -> Self {
        Self {
            probe_error: Some(message.into()),
            ..Self::ok("unused")
        }
    }

    /// Probe succeeds, fetch fails with an extraction error.
    pub fn failing_fetch(message: impl Into<String>) -> Self {
        Self {
            fetch_error: Some(message.into()),
            ..Self::ok("unused")
        }
    }

    /// Fetch reports success but writes nothing to disk.
    pub fn silent_fetch(title: impl Into<String>) -> Self {
        Self {
            write_output: false,
            ..Self::ok(title)
        }
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn probe(&self, _url: &str) -> Result<VideoInfo, FetchError> {
        if let Some(message) = &self.probe_error {
            return Err(FetchError::Extraction(message.clone()));
        }
        Ok(VideoInfo {
            title: self.title.clone(),
            channel: "Test Channel".to_string(),
            duration: 123,
            thumbnail: "https://thumb.example/1.jpg".to_string(),
            view_count: 456,
        })
    }

    async fn fetch(
        &self,
        _url: &str,
        _format: DownloadFormat,
        output: &Path,
    ) -> Result<(), FetchError> {
        if let Some(message) = &self.fetch_error {
            return Err(FetchError::Extraction(message.clone()));
        }
        if self.write_output {
            tokio::fs::write(output, b"test media payload")
                .await
                .map_err(|e| FetchError::Extraction(e.to_string()))?;
        }
        Ok(())
    }
}
