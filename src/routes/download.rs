// src/routes/download.rs
//! Download submission, status polling, and one-shot file delivery.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use crate::cleanup;
use crate::error::{ApiError, ApiResult};
use crate::fetcher::DownloadFormat;
use crate::jobs::{self, ClaimError, Job};
use crate::state::AppState;

/// Format token applied when the request omits one.
const DEFAULT_FORMAT_TOKEN: &str = "360p";

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub format: Option<String>,
}

/// Response to a successful job submission.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct DownloadStarted {
    pub download_id: String,
    pub status: String,
}

/// Status object returned by the polling endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct JobStatusResponse {
    pub download_id: String,
    pub status: String,
    pub format: String,
    pub progress: u8,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            download_id: job.id.clone(),
            status: job.status.as_str().to_string(),
            format: job.format.token().to_string(),
            progress: job.progress,
            created_at: job.created_at.to_rfc3339(),
            filename: job.output_name.clone(),
            error: job.error.clone(),
        }
    }
}

/// POST /api/download — create a job and return its id immediately.
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadRequest>,
) -> ApiResult<Json<DownloadStarted>> {
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let token = request.format.as_deref().unwrap_or(DEFAULT_FORMAT_TOKEN);
    let format = DownloadFormat::parse(token);
    let download_id = jobs::spawn_download(state, url, format);

    Ok(Json(DownloadStarted {
        download_id,
        status: "started".to_string(),
    }))
}

/// GET /api/status/{download_id} — current job state, progress, and error.
pub async fn download_status(
    State(state): State<Arc<AppState>>,
    Path(download_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = state
        .store
        .get(&download_id)
        .ok_or(ApiError::JobNotFound(download_id))?;
    Ok(Json(JobStatusResponse::from(&job)))
}

/// GET /api/file/{download_id} — stream the finished file exactly once.
///
/// The store claim atomically removes the job record, so concurrent and
/// repeat requests see 404 rather than racing the delete. The janitor's
/// grace period starts when the response body is dropped (fully sent or
/// client gone), not when streaming begins, so long transfers cannot
/// outlive their backing file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(download_id): Path<String>,
) -> ApiResult<Response> {
    let job = state.store.claim_delivery(&download_id).map_err(|e| match e {
        ClaimError::NotFound => ApiError::JobNotFound(download_id.clone()),
        ClaimError::NotReady(status) => ApiError::NotReady(status),
    })?;

    let path = job
        .output_path
        .ok_or_else(|| ApiError::Internal(format!("completed job {download_id} has no path")))?;
    let name = job
        .output_name
        .unwrap_or_else(|| path.file_name().map_or_else(
            || "download".to_string(),
            |n| n.to_string_lossy().into_owned(),
        ));

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::FileMissing(download_id.clone()))?;

    tracing::info!(job_id = %download_id, file = %name, "delivering file");

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_static(job.format.content_type());

    let body = Body::from_stream(ReaderStream::new(cleanup::DeliveredFile::new(file, path)));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/download", post(start_download))
        .route("/status/{download_id}", get(download_status))
        .route("/file/{download_id}", get(download_file))
}
