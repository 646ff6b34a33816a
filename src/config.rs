// src/config.rs
//! Immutable service configuration loaded once at startup.

use std::path::PathBuf;

/// Default listen port when `PORT` is unset or unparseable.
pub const DEFAULT_PORT: u16 = 3000;

/// Directory where job output files are written. Swept clean at startup
/// and after each delivery; nothing in it is persistent state.
pub const DOWNLOAD_DIR: &str = "downloads";

/// Service configuration. Built from the environment exactly once in `main`
/// and carried inside `AppState`; handlers and the fetcher read it, nobody
/// mutates it.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    /// Directory for produced media files.
    pub download_dir: PathBuf,
    /// Raw Netscape-format cookie file contents for the external fetcher.
    /// `None` when `YOUTUBE_COOKIES` is unset; startup logs a warning but
    /// does not fail.
    pub cookies: Option<String>,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cookies = std::env::var("YOUTUBE_COOKIES")
            .ok()
            .filter(|c| !c.trim().is_empty());

        Self {
            port,
            download_dir: PathBuf::from(DOWNLOAD_DIR),
            cookies,
        }
    }
}
