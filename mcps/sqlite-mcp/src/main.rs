//! SQLite MCP Server
//!
//! Serves one SQLite database over streamable HTTP (default) or stdio.
//! Read-only by default; pass `--read-write` to enable execute_statement.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mcp_common::{init_tracing, LogFormat};
use sqlite_mcp::{
    resources::{TABLES_URI, TABLE_URI_TEMPLATE},
    transport, Cli, Database, ServerConfig, SqliteMcpServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing("sqlite_mcp", LogFormat::from_env())?;

    let config = ServerConfig::load(cli).context("failed to load configuration")?;

    tracing::info!("Starting sqlite_mcp MCP Server");
    tracing::info!("Mode: {}", config.mode);
    tracing::info!("Database: {}", config.database.display());

    let db = Database::open(&config.database, config.mode)
        .with_context(|| format!("failed to open database {}", config.database.display()))?;
    let db = Arc::new(db);

    let server = SqliteMcpServer::new(db.clone(), !db.is_read_only());

    tracing::info!("Available tools: {}", server.tool_names().join(", "));
    tracing::info!("Available resources: {}, {}", TABLES_URI, TABLE_URI_TEMPLATE);
    tracing::info!("Transport: {}", config.transport);

    let served = transport::serve(server, config.transport, &config.addr).await;

    tracing::info!("Server shutting down");
    if let Err(e) = db.close() {
        tracing::error!("Error closing database: {}", e);
    }

    served
}
