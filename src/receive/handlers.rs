//! HTTP handlers for the upload page and multipart upload.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::common::AppError;
use crate::receive::state::ReceiveAppState;
use crate::receive::storage::{self, UploadSink};
use crate::server::auth::ValidToken;
use crate::ui::web;
use crate::utils::security;

/// Body of a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub saved: Vec<String>,
}

/// Serve the upload form for a valid link.
pub async fn upload_page(ValidToken(token): ValidToken) -> impl IntoResponse {
    web::serve_upload_page(&token)
}

/// Save every file part of the multipart body.
///
/// Any failure aborts the whole batch; files already written stay on disk.
pub async fn upload_files(
    ValidToken(_token): ValidToken,
    State(state): State<ReceiveAppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let destination = state.destination();

    // One timestamp for the whole request
    let timestamp = storage::upload_timestamp(Utc::now());
    let mut saved: Vec<String> = Vec::new();
    let mut directory_ready = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "invalid multipart body".to_string()))?
    {
        // Plain form fields carry no filename and are ignored
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        let original = security::sanitize_filename(&file_name);
        let save_failed = |e: &dyn std::fmt::Display| {
            AppError::Io(format!("Failed to save '{original}': {e}"))
        };

        // Created on the first file so a failure can name it
        if !directory_ready {
            storage::ensure_directory(destination)
                .await
                .map_err(|e| save_failed(&format!("{e:#}")))?;
            directory_ready = true;
        }

        let mut sink = UploadSink::create_unique(destination, &timestamp, &original)
            .await
            .map_err(|e| save_failed(&e))?;
        let target_name = sink.file_name().to_string();

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, format!("Failed to read '{original}'")))?
        {
            sink.write(&chunk).await.map_err(|e| save_failed(&e))?;
        }

        sink.finish().await.map_err(|e| save_failed(&e))?;

        tracing::info!(file = %target_name, "upload saved");
        saved.push(target_name);
    }

    if saved.is_empty() {
        return Err(AppError::BadRequest("no files in upload".to_string()));
    }

    state.session.complete_transfer();

    Ok(Json(UploadResponse { saved }))
}

fn multipart_error(err: MultipartError, context: String) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!("{context}: {err}"));
    }
    AppError::BadRequest(format!("{context}: {err}"))
}
