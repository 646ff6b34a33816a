// src/fetcher/yt_dlp.rs
//! yt-dlp fetcher — spawns the `yt-dlp` binary and parses its JSON output.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::types::{DownloadFormat, FetchError, VideoInfo};
use super::MediaFetcher;
use crate::config::Config;

/// Browser user agent sent to the extractor; some sites throttle the
/// default yt-dlp agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Per-attempt socket timeout for metadata probes, in seconds.
const PROBE_SOCKET_TIMEOUT_SECS: u64 = 15;
/// Per-attempt socket timeout for downloads, in seconds.
const FETCH_SOCKET_TIMEOUT_SECS: u64 = 30;
/// Outer bound on the whole probe process. Downloads carry no outer bound;
/// the socket timeout handles stalls and large files legitimately take
/// minutes.
const PROBE_PROCESS_TIMEOUT_SECS: u64 = 60;
/// Extractor retry count passed to yt-dlp. No retries happen above this.
const EXTRACTOR_RETRIES: u32 = 2;

/// Media fetcher backed by the `yt-dlp` CLI.
pub struct YtDlpFetcher {
    binary: String,
    /// Cookie jar written once at startup. The handle owns the temp file
    /// for the process lifetime; dropping the fetcher removes it.
    cookie_file: Option<NamedTempFile>,
}

impl YtDlpFetcher {
    /// Build a fetcher from the service configuration, materializing the
    /// cookie file if cookie contents were provided.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cookie_file = match &config.cookies {
            Some(contents) => {
                let mut file = NamedTempFile::new().context("creating cookie file")?;
                file.write_all(contents.as_bytes())
                    .context("writing cookie file")?;
                file.flush().context("flushing cookie file")?;
                tracing::info!(path = %file.path().display(), "cookie file loaded");
                Some(file)
            }
            None => {
                tracing::warn!(
                    "YOUTUBE_COOKIES not set; age-restricted or member-only media may fail"
                );
                None
            }
        };

        Ok(Self {
            binary: "yt-dlp".to_string(),
            cookie_file,
        })
    }

    /// Flags shared by every invocation.
    fn base_args(&self, socket_timeout_secs: u64) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            socket_timeout_secs.to_string(),
            "--retries".to_string(),
            EXTRACTOR_RETRIES.to_string(),
            "--user-agent".to_string(),
            USER_AGENT.to_string(),
        ];
        if let Some(file) = &self.cookie_file {
            args.push("--cookies".to_string());
            args.push(file.path().display().to_string());
        }
        args
    }

    fn probe_args(&self, url: &str) -> Vec<String> {
        let mut args = self.base_args(PROBE_SOCKET_TIMEOUT_SECS);
        args.push("--dump-single-json".to_string());
        args.push("--skip-download".to_string());
        args.push(url.to_string());
        args
    }

    fn fetch_args(&self, url: &str, format: DownloadFormat, output: &Path) -> Vec<String> {
        let mut args = self.base_args(FETCH_SOCKET_TIMEOUT_SECS);
        args.push("-f".to_string());
        args.push(format.selector().to_string());

        if format.is_audio() {
            // yt-dlp substitutes the extension after the mp3 transcode, so
            // the template carries %(ext)s instead of a fixed suffix.
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                "mp3".to_string(),
                "--audio-quality".to_string(),
                "192K".to_string(),
                "-o".to_string(),
                format!("{}.%(ext)s", output.with_extension("").display()),
            ]);
        } else {
            args.extend([
                "--merge-output-format".to_string(),
                "mp4".to_string(),
                "-o".to_string(),
                output.display().to_string(),
            ]);
        }

        args.push(url.to_string());
        args
    }

    /// Run the binary to completion, capturing output. `timeout_secs`
    /// bounds the whole process; the child is killed if it elapses.
    async fn run(
        &self,
        args: &[String],
        timeout_secs: Option<u64>,
    ) -> Result<std::process::Output, FetchError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawn_err = |source| FetchError::Spawn {
            binary: self.binary.clone(),
            source,
        };

        match timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), cmd.output())
                .await
                .map_err(|_| FetchError::Timeout(secs))?
                .map_err(spawn_err),
            None => cmd.output().await.map_err(spawn_err),
        }
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn probe(&self, url: &str) -> Result<VideoInfo, FetchError> {
        let args = self.probe_args(url);
        tracing::debug!(%url, "probing metadata");

        let output = self.run(&args, Some(PROBE_PROCESS_TIMEOUT_SECS)).await?;
        if !output.status.success() {
            return Err(FetchError::Extraction(stderr_summary(&output.stderr)));
        }
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(FetchError::NotFound);
        }

        let raw: RawProbe = serde_json::from_slice(&output.stdout)
            .map_err(|e| FetchError::ParseFailed(e.to_string()))?;
        Ok(raw.into())
    }

    async fn fetch(
        &self,
        url: &str,
        format: DownloadFormat,
        output: &Path,
    ) -> Result<(), FetchError> {
        let args = self.fetch_args(url, format, output);
        tracing::info!(%url, format = format.token(), output = %output.display(), "fetching media");

        let result = self.run(&args, None).await?;
        if !result.status.success() {
            return Err(FetchError::Extraction(stderr_summary(&result.stderr)));
        }
        Ok(())
    }
}

/// The last non-empty stderr line, capped so error details stay readable
/// in status responses.
fn stderr_summary(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("yt-dlp exited with an error and no output")
        .trim();
    if line.chars().count() > 300 {
        line.chars().take(300).collect()
    } else {
        line.to_string()
    }
}

/// Subset of yt-dlp's `--dump-single-json` output the service cares about.
#[derive(Debug, Deserialize)]
struct RawProbe {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    view_count: Option<u64>,
}

impl From<RawProbe> for VideoInfo {
    fn from(raw: RawProbe) -> Self {
        Self {
            title: raw.title.unwrap_or_else(|| "Unknown".to_string()),
            channel: raw
                .uploader
                .or(raw.channel)
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: raw.duration.unwrap_or_default() as u64,
            thumbnail: raw.thumbnail.unwrap_or_default(),
            view_count: raw.view_count.unwrap_or_default(),
        }
    }
}
