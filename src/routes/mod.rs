// src/routes/mod.rs
//! API route handlers.

pub mod download;
pub mod health;
pub mod info;
pub mod pages;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api.
///
/// Routes:
/// - GET  /api/health — health check
/// - POST /api/info — synchronous metadata probe
/// - POST /api/download — submit a download job, returns immediately
/// - GET  /api/status/{download_id} — poll job state
/// - GET  /api/file/{download_id} — one-shot file delivery
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", info::router())
        .nest("/api", download::router())
        .with_state(state)
}
