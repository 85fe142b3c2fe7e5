//! Local server bootstrap utilities
//!
//! Binds a plain HTTP listener on the configured host; port 0 asks the OS
//! for a free port.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use tokio::task::JoinHandle;

/// A running listener plus the handle used to stop it.
pub struct LocalServer {
    pub port: u16,
    pub handle: axum_server::Handle,
    pub task: JoinHandle<()>,
}

/// Resolve `host:port`, preferring the first address the resolver returns.
pub fn bind_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve bind address {host}:{port}"))?
        .next()
        .with_context(|| format!("No usable address for {host}:{port}"))
}

/// Starts the Axum app on `host:port` in a background task.
pub async fn start_local_server(app: axum::Router, host: &str, port: u16) -> Result<LocalServer> {
    let addr = bind_addr(host, port)?;
    let listener = std::net::TcpListener::bind(addr).with_context(|| {
        format!(
            "Failed to bind to {addr} - port already in use.\n\n\
             Is another qrdrop instance running?\n\
             Or is another service using this port?"
        )
    })?;

    listener
        .set_nonblocking(true)
        .context("Failed to set listener to non-blocking mode")?;

    let port = listener
        .local_addr()
        .context("Failed to read bound address")?
        .port();

    let handle = axum_server::Handle::new();
    let server_handle = handle.clone();

    let task = tokio::spawn(async move {
        if let Err(e) = axum_server::from_tcp(listener)
            .handle(server_handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!(error = %e, "Server error");
        }
    });

    tracing::debug!(%addr, port, "listener bound");
    Ok(LocalServer { port, handle, task })
}

/// Best-effort local non-loopback IP discovery for the advertised URL.
///
/// No packet is sent; connecting a UDP socket only selects a route.
pub fn get_local_ip() -> Result<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind socket for IP detection")?;

    socket
        .connect("8.8.8.8:80")
        .context("Failed to connect socket for IP detection")?;

    let local_addr = socket.local_addr().context("Failed to get local address")?;

    Ok(local_addr.ip().to_string())
}

/// Host to put in the printed link.
///
/// Wildcard binds are not reachable by name, so use the LAN address instead
/// and fall back to loopback when discovery fails.
pub fn advertised_host(bind_host: &str) -> String {
    let is_wildcard = bind_host
        .parse::<IpAddr>()
        .map(|ip| ip.is_unspecified())
        .unwrap_or(false);

    let host = if is_wildcard {
        get_local_ip().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not determine LAN address, using loopback");
            "127.0.0.1".to_string()
        })
    } else {
        bind_host.to_string()
    };

    // Bare IPv6 literals need brackets inside a URL
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => format!("[{host}]"),
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_parses_ip_literals() {
        let addr = bind_addr("127.0.0.1", 8080).unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 8080)));

        let any = bind_addr("0.0.0.0", 0).unwrap();
        assert!(any.ip().is_unspecified());
    }

    #[test]
    fn explicit_hosts_are_advertised_verbatim() {
        assert_eq!(advertised_host("192.168.1.20"), "192.168.1.20");
        assert_eq!(advertised_host("::1"), "[::1]");
    }

    #[tokio::test]
    async fn ephemeral_port_is_reported() {
        let app = axum::Router::new().route("/health", axum::routing::get(|| async { "ok" }));
        let server = start_local_server(app, "127.0.0.1", 0).await.unwrap();

        assert_ne!(server.port, 0);
        server.handle.shutdown();
        server.task.await.unwrap();
    }
}
