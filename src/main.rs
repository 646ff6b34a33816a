// src/main.rs
//! ytfetch server binary.
//!
//! Loads configuration from the environment, sweeps stale files from the
//! download directory, then serves the API until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ytfetch::fetcher::YtDlpFetcher;
use ytfetch::{cleanup, create_app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env();

    tokio::fs::create_dir_all(&config.download_dir)
        .await
        .with_context(|| format!("creating {}", config.download_dir.display()))?;

    // Job state is not persisted, so any file in the download directory is
    // an orphan from a previous run.
    match cleanup::sweep_stale_files(&config.download_dir).await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "swept stale download files"),
        Err(e) => tracing::warn!(error = %e, "startup sweep failed (non-fatal)"),
    }

    let fetcher = YtDlpFetcher::from_config(&config).context("initializing yt-dlp fetcher")?;
    let port = config.port;
    let state = AppState::new(config, Arc::new(fetcher));
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    eprintln!("\nytfetch v{} - http://localhost:{}\n", env!("CARGO_PKG_VERSION"), port);
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
