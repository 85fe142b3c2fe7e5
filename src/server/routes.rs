//! Router definitions for share and receive modes

use crate::{
    common::AppError,
    receive::{self, ReceiveAppState},
    send::{self, SendAppState},
};
use axum::{extract::DefaultBodyLimit, routing::*, Router};

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Build the router for the share listing and downloads.
pub fn create_send_router(state: &SendAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/share/:token", get(send::handlers::share_page))
        .route(
            "/download/:token/:index",
            get(send::handlers::download_item),
        )
        .fallback(not_found)
        .with_state(state.clone())
}

/// Build the router for the upload page and multipart endpoint.
///
/// `body_limit` caps the whole multipart request in bytes.
pub fn create_receive_router(state: &ReceiveAppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/upload/:token",
            get(receive::handlers::upload_page).post(receive::handlers::upload_files),
        )
        .fallback(not_found)
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(body_limit))
}
