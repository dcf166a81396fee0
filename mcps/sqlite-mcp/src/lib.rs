//! SQLite MCP Library
//!
//! Exposes one SQLite database to MCP clients: table listing, schema
//! inspection, SELECT queries and, when write access is granted, data
//! modification statements. Read-only by default.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlite_mcp::{AccessMode, Database, SqliteMcpServer};
//!
//! let db = Arc::new(Database::open("app.db", AccessMode::ReadOnly)?);
//! let server = SqliteMcpServer::new(db, false);
//! // Serve via stdio/HTTP, or call it in-process through `EmbeddableMcp`
//! ```

pub mod config;
pub mod database;
pub mod params;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::{Cli, ServerConfig, Transport};
pub use database::{Database, DbError};
pub use resources::{ResourceError, SchemaResources};
pub use server::SqliteMcpServer;
pub use tools::QueryTools;
pub use types::{AccessMode, ColumnInfo, Row, SqlValue};

// Re-export parameter types for direct API usage
pub use params::{DescribeTableParams, ExecuteQueryParams, ExecuteStatementParams, ListTablesParams};
