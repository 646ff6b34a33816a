// src/routes/info.rs
//! Synchronous metadata probe endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::fetcher::{FetchError, VideoInfo};
use crate::state::AppState;

/// Bound on how long an info request may wait on the extractor. The probe
/// has no job semantics, so a hung extractor would otherwise hang the
/// client indefinitely.
const INFO_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /api/info — probe metadata for a URL without downloading.
pub async fn video_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InfoRequest>,
) -> ApiResult<Json<VideoInfo>> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    tracing::info!(%url, "info request");
    let info = tokio::time::timeout(INFO_TIMEOUT, state.fetcher.probe(url))
        .await
        .map_err(|_| FetchError::Timeout(INFO_TIMEOUT.as_secs()))??;

    tracing::info!(%url, title = %info.title, "info resolved");
    Ok(Json(info))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/info", post(video_info))
}
