//! Serving the MCP server over stdio or streamable HTTP

use anyhow::{Context, Result};
use axum::Router;
use rmcp::{
    transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    },
    ServiceExt,
};
use tokio::net::TcpListener;

use crate::config::Transport;
use crate::server::SqliteMcpServer;

/// Path the streamable HTTP endpoint is mounted at
pub const MCP_PATH: &str = "/mcp";

/// Serve until the client disconnects or a shutdown signal arrives
pub async fn serve(server: SqliteMcpServer, transport: Transport, addr: &str) -> Result<()> {
    match transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::StreamableHttp => serve_http(server, addr).await,
    }
}

pub async fn serve_stdio(server: SqliteMcpServer) -> Result<()> {
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start stdio transport")?;

    tracing::info!("Server running on stdio, waiting for requests...");

    let cancel = service.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    service.waiting().await?;
    Ok(())
}

pub async fn serve_http(server: SqliteMcpServer, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let local = listener.local_addr()?;
    tracing::info!("Server listening on http://{}{}", local, MCP_PATH);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Router with the MCP endpoint mounted; each session gets a clone of `server`
pub fn router(server: SqliteMcpServer) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new().nest_service(MCP_PATH, service)
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
