//! HTTP handlers for the share listing and item downloads.

use anyhow::Context;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, Response};
use axum::response::IntoResponse;
use futures::Stream;
use std::pin::Pin;
use std::task::{self, Poll};
use tokio_util::io::ReaderStream;

use crate::common::{AppError, Session};
use crate::server::auth::ValidToken;
use crate::ui::terminal::human_size;
use crate::ui::web::{self, ShareRow};

use super::SendAppState;

/// List every shared item with its current size.
pub async fn share_page(
    ValidToken(token): ValidToken,
    State(state): State<SendAppState>,
) -> impl IntoResponse {
    let mut rows = Vec::with_capacity(state.items().len());
    for (index, item) in state.items().iter().enumerate() {
        // Files may disappear while the session runs; show `?` instead of failing
        let size = match tokio::fs::metadata(&item.path).await {
            Ok(meta) => human_size(meta.len()),
            Err(_) => "?".to_string(),
        };
        rows.push(ShareRow {
            index,
            display_name: item.display_name.clone(),
            size,
        });
    }

    web::serve_share_page(&token, &rows)
}

/// Stream one item back to the client as an attachment.
pub async fn download_item(
    ValidToken(_token): ValidToken,
    Path((_, index)): Path<(String, String)>,
    State(state): State<SendAppState>,
) -> Result<Response<Body>, AppError> {
    let item = index
        .parse::<usize>()
        .ok()
        .and_then(|i| state.get_item(i))
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let file = match tokio::fs::File::open(&item.path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File no longer available".to_string()));
        }
        Err(e) => {
            return Err(AppError::Io(format!(
                "Failed to open '{}': {e}",
                item.display_name
            )));
        }
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::Io(format!("Failed to read '{}': {e}", item.display_name)))?;
    if !metadata.is_file() {
        return Err(AppError::NotFound("File no longer available".to_string()));
    }

    let mime = mime_guess::from_path(&item.display_name).first_or_octet_stream();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&item.display_name),
        )
        .body(Body::from_stream(CompleteOnEof::new(
            ReaderStream::new(file),
            state.session.clone(),
            item.display_name.clone(),
        )))
        .context("build download response")?;

    tracing::info!(item = %item.display_name, bytes = metadata.len(), "download started");

    Ok(response)
}

/// Body stream that records the transfer once the file has been read to the end.
///
/// Aborted or failed downloads never count: the session is only notified when
/// the inner stream ends cleanly.
struct CompleteOnEof<S> {
    inner: S,
    session: Option<Session>,
    item: String,
}

impl<S> CompleteOnEof<S> {
    fn new(inner: S, session: Session, item: String) -> Self {
        Self {
            inner,
            session: Some(session),
            item,
        }
    }
}

impl<S> Stream for CompleteOnEof<S>
where
    S: Stream<Item = std::io::Result<Bytes>> + Unpin,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.inner).poll_next(cx);
        match &polled {
            Poll::Ready(Some(Err(e))) => {
                tracing::warn!(item = %self.item, error = %e, "download failed mid-stream");
                self.session = None;
            }
            Poll::Ready(None) => {
                if let Some(session) = self.session.take() {
                    tracing::info!(item = %self.item, "download finished");
                    session.complete_transfer();
                }
            }
            _ => {}
        }
        polled
    }
}

/// `attachment` header with an ASCII fallback plus an RFC 5987 UTF-8 name.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == name {
        return format!("attachment; filename=\"{name}\"");
    }

    let mut encoded = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
