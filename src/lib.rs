// src/lib.rs
//! ytfetch server library.
//!
//! An Axum HTTP service that probes video metadata and runs background
//! download/transcode jobs through an external media fetcher, delivering
//! each finished file exactly once.

pub mod cleanup;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod jobs;
pub mod routes;
pub mod sanitize;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// Sets up the landing page, the /api routes, permissive CORS, and request
/// tracing.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::pages::router())
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
