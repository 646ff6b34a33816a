// src/fetcher/types.rs
//! Request/response/error types for the media fetcher.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metadata returned by a probe of a video URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub channel: String,
    /// Duration in whole seconds; 0 when the extractor does not report one.
    pub duration: u64,
    pub thumbnail: String,
    pub view_count: u64,
}

/// Requested output format, resolved from the caller's symbolic token.
///
/// Unknown tokens map to `Best` rather than failing: the service is
/// permissive about quality selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Mp3,
    P360,
    P480,
    P720,
    P1080,
    Best,
}

impl DownloadFormat {
    /// Resolve a symbolic quality token. Unrecognized tokens fall back to
    /// best-available.
    pub fn parse(token: &str) -> Self {
        match token {
            "mp3" => Self::Mp3,
            "360p" => Self::P360,
            "480p" => Self::P480,
            "720p" => Self::P720,
            "1080p" => Self::P1080,
            _ => Self::Best,
        }
    }

    /// The symbolic token for this format, as accepted by `parse`.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::Best => "best",
        }
    }

    /// Concrete yt-dlp `-f` selector. Video selectors prefer an exact
    /// height match, then a capped match, then the best capped combined
    /// stream, so downloads succeed even when the ideal rendition is gone.
    pub fn selector(&self) -> &'static str {
        match self {
            Self::Mp3 => "bestaudio/best",
            Self::P360 => {
                "bestvideo[height<=360][height>=360]+bestaudio/bestvideo[height<=360]+bestaudio/best[height<=360]"
            }
            Self::P480 => {
                "bestvideo[height<=480][height>=480]+bestaudio/bestvideo[height<=480]+bestaudio/best[height<=480]"
            }
            Self::P720 => {
                "bestvideo[height<=720][height>=720]+bestaudio/bestvideo[height<=720]+bestaudio/best[height<=720]"
            }
            Self::P1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
            Self::Best => "best",
        }
    }

    /// Whether this format produces an audio-only file.
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Mp3)
    }

    /// MIME type of the produced file.
    pub fn content_type(&self) -> &'static str {
        if self.is_audio() {
            "audio/mpeg"
        } else {
            "video/mp4"
        }
    }

    /// Output filename for a sanitized title stem. Video filenames embed the
    /// quality token so differently-sized outputs of the same video never
    /// collide.
    pub fn file_name(&self, stem: &str) -> String {
        match self {
            Self::Mp3 => format!("{stem}.mp3"),
            Self::Best => format!("{stem}.mp4"),
            other => format!("{stem}_{}.mp4", other.token()),
        }
    }
}

/// Errors from the external media fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no media found for URL")]
    NotFound,

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("failed to parse extractor metadata: {0}")]
    ParseFailed(String),

    #[error("fetcher timed out after {0} seconds")]
    Timeout(u64),

    #[error("download produced no file")]
    MissingOutput,
}
