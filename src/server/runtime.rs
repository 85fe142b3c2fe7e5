//! Runtime lifecycle: start the server, print the link, wait, and shut down.

use crate::common::config::AppConfig;
use crate::common::TransferState;
use crate::server::ServerInstance;
use crate::transport::local::{advertised_host, start_local_server, LocalServer};
use crate::ui::terminal::{print_session_banner, SessionBanner};
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

/// Start the HTTP server, print the banner, and run until shutdown.
pub async fn start_http<S: TransferState>(
    server: ServerInstance,
    app_state: S,
    config: &AppConfig,
) -> Result<u16> {
    let service = app_state.service_path();
    let ServerInstance { app, display_name } = server;

    let local = start_local_server(app, &config.host, config.port).await?;
    let port = local.port;

    let url = session_url(&advertised_host(&config.host), port, service, app_state.session().token());

    print_session_banner(&SessionBanner {
        url: &url,
        expires_at: app_state.session().expires_at(),
        is_receiving: app_state.is_receiving(),
        display_name: &display_name,
        show_qr: config.show_qr,
    })?;

    run_session(local, app_state, config.drain_timeout()).await?;
    Ok(port)
}

/// `http://{host}:{port}/{service}/{token}`
pub fn session_url(host: &str, port: u16, service: &str, token: &str) -> String {
    format!("http://{host}:{port}/{service}/{token}")
}

/// Wait for Ctrl+C or the lifecycle's shutdown signal, then drain.
pub async fn run_session<S: TransferState>(
    server: LocalServer,
    state: S,
    drain_timeout: Option<Duration>,
) -> Result<()> {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl+C received - initiating graceful shutdown"),
            Err(e) => {
                // Without a signal handler only the lifecycle can stop us
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    serve_until(server, state, ctrl_c, drain_timeout).await
}

/// Run until `stop` resolves or the session asks to shut down.
pub async fn serve_until<S, F>(
    server: LocalServer,
    state: S,
    stop: F,
    drain_timeout: Option<Duration>,
) -> Result<()>
where
    S: TransferState,
    F: Future<Output = ()>,
{
    let lifecycle_signal = state.session().lifecycle().shutdown_signal();

    tokio::select! {
        _ = stop => {}
        _ = lifecycle_signal.cancelled() => {
            tracing::info!("Transfer completed - shutting down");
        }
    }

    shutdown(server, drain_timeout).await
}

//==========
// SHUTDOWN
//==========

/// Stop accepting connections and let in-flight responses finish.
///
/// With no `drain_timeout` this waits for every open response.
async fn shutdown(server: LocalServer, drain_timeout: Option<Duration>) -> Result<()> {
    let LocalServer { handle, task, .. } = server;

    handle.graceful_shutdown(drain_timeout);
    tracing::info!(
        drain_timeout = ?drain_timeout,
        "Server stopped accepting new connections"
    );

    task.await.context("Server task failed")?;
    tracing::info!("Server shutdown complete");

    Ok(())
}
