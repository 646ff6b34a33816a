// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::jobs::JobStatus;

/// Structured JSON error response for API errors.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body had an empty or missing URL.
    #[error("No URL")]
    MissingUrl,

    /// No job with that id — never submitted, or already delivered.
    #[error("Download not found: {0}")]
    JobNotFound(String),

    /// The job completed but its backing file is gone.
    #[error("File not found for download: {0}")]
    FileMissing(String),

    /// File requested before the job reached Completed.
    #[error("Download not ready, status: {0}")]
    NotReady(JobStatus),

    /// Anything from the external media fetcher (synchronous paths only;
    /// async jobs surface fetcher failures via the status endpoint).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::MissingUrl => {
                tracing::warn!("request with empty URL");
                (StatusCode::BAD_REQUEST, ErrorResponse::new("No URL"))
            }
            ApiError::JobNotFound(id) => {
                tracing::warn!(job_id = %id, "unknown download id");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Download not found", format!("id: {id}")),
                )
            }
            ApiError::FileMissing(id) => {
                tracing::error!(job_id = %id, "completed download has no backing file");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("File not found", format!("id: {id}")),
                )
            }
            ApiError::NotReady(job_status) => {
                tracing::warn!(status = %job_status, "file requested before completion");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details(
                        "Download not ready",
                        format!("status: {job_status}"),
                    ),
                )
            }
            ApiError::Fetch(FetchError::NotFound) => {
                tracing::warn!("extractor found no media");
                (StatusCode::NOT_FOUND, ErrorResponse::new("Not found"))
            }
            ApiError::Fetch(fetch_err @ FetchError::Timeout(_)) => {
                tracing::error!(error = %fetch_err, "fetcher timed out");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Extractor timed out", fetch_err.to_string()),
                )
            }
            ApiError::Fetch(fetch_err) => {
                tracing::error!(error = %fetch_err, "fetcher error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(fetch_err.to_string()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
