//! Embeddable MCP trait for in-process execution
//!
//! [`EmbeddableMcp`] lets a host drive a server's tools and resources
//! directly, with no transport in between.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//! use sqlite_mcp::SqliteMcpServer;
//!
//! let tools = server.list_tools();
//! let result = server
//!     .call_tool("list_tables", serde_json::json!({}))
//!     .await?;
//! let contents = server.read_resource("schema://tables").await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Resource, ResourceContents, ResourceTemplate, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool is not registered on this server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments were not a JSON object
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// MCP protocol error raised by the server
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// Implementations must be `Send + Sync` so concurrent tasks can share one
/// server. Listing methods report only what the server has registered, so a
/// host sees the same surface a remote client would.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Returns the server name for identification
    fn server_name(&self) -> &str;

    /// Returns every registered tool
    fn list_tools(&self) -> Vec<Tool>;

    /// Executes a tool by name
    ///
    /// `params` must be a JSON object (or `null` for no arguments).
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Returns the static resources
    fn list_resources(&self) -> Vec<Resource> {
        Vec::new()
    }

    /// Returns the URI templates for parameterized resources
    fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        Vec::new()
    }

    /// Reads a resource by URI
    async fn read_resource(&self, uri: &str) -> EmbeddableResult<Vec<ResourceContents>> {
        Err(EmbeddableError::McpError(format!(
            "unknown resource URI: {}",
            uri
        )))
    }

    /// Returns an optional description of the server
    fn server_description(&self) -> Option<&str> {
        None
    }

    /// Returns the server version, if available
    fn server_version(&self) -> Option<&str> {
        None
    }
}
