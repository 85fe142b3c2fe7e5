use super::runtime;
use crate::common::{AppConfig, Session, SessionLifecycle};
use crate::receive::ReceiveAppState;
use crate::send::{SendAppState, ShareItem};
use crate::server::routes;
use anyhow::{Context, Result};
use axum::Router;
use std::path::{Path, PathBuf};

// Router plus what the banner shows
pub struct ServerInstance {
    pub app: Router,
    pub display_name: String,
}

impl ServerInstance {
    pub fn new(app: Router, display_name: String) -> Self {
        Self { app, display_name }
    }
}

/// Fresh session with one token valid for the configured TTL.
pub fn new_session(config: &AppConfig) -> Session {
    let lifecycle = SessionLifecycle::with_grace(config.exit_on_transfer, config.shutdown_grace());
    Session::start(config.ttl(), lifecycle)
}

/// Create the upload directory if needed and return its absolute path.
pub fn prepare_upload_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    std::fs::canonicalize(dir)
        .with_context(|| format!("Failed to resolve upload directory {}", dir.display()))
}

//----------------
// RECEIVE SERVER
//----------------
pub async fn start_receive_server(config: &AppConfig) -> Result<u16> {
    let destination = prepare_upload_dir(&config.upload_dir)?;
    tracing::info!(dir = %destination.display(), "Saving uploads");

    let display_name = destination.display().to_string();
    let session = new_session(config);

    let state = ReceiveAppState::new(session, destination);
    let app = routes::create_receive_router(&state, config.max_upload_bytes());
    let server = ServerInstance::new(app, display_name);

    runtime::start_http(server, state, config).await
}

//----------------
// SHARE SERVER
//----------------
pub async fn start_share_server(
    items: Vec<ShareItem>,
    display_name: String,
    config: &AppConfig,
) -> Result<u16> {
    tracing::info!(items = items.len(), "Sharing items");

    let session = new_session(config);
    let state = SendAppState::new(session, items);
    let app = routes::create_send_router(&state);
    let server = ServerInstance::new(app, display_name);

    runtime::start_http(server, state, config).await
}
