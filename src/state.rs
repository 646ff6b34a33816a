// src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::fetcher::MediaFetcher;
use crate::jobs::JobStore;

/// Shared application state accessible from all route handlers.
///
/// The job store is the only shared mutable structure; everything else is
/// immutable after startup. Passed by `Arc` everywhere — no ambient globals.
pub struct AppState {
    /// Server start time for uptime reporting.
    pub start_time: Instant,
    /// Immutable service configuration.
    pub config: Config,
    /// Concurrent job registry.
    pub store: JobStore,
    /// External media fetcher (yt-dlp in production, a mock in tests).
    pub fetcher: Arc<dyn MediaFetcher>,
}

impl AppState {
    /// Create the shared state wrapped in an `Arc`.
    pub fn new(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            config,
            store: JobStore::new(),
            fetcher,
        })
    }

    /// Server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
