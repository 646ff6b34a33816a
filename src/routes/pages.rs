// src/routes/pages.rs
//! Static landing page and favicon.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

/// Landing page served from the working directory, if present.
const INDEX_PAGE: &str = "index.html";

/// GET / — serve the landing page; plain-text 404 when the file is absent.
async fn index() -> Response {
    match tokio::fs::read_to_string(INDEX_PAGE).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

/// GET /favicon.ico — nothing to serve, but no error either.
async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
}
