//! MCP Common - Shared utilities for MCP servers
//!
//! This crate provides the plumbing every server in the workspace shares:
//!
//! - **Initialization**: [`init_tracing`] for stderr logging (stdout is the protocol channel)
//! - **Results**: [`text_result`] for tool responses the calling model should read,
//!   including soft errors, and [`fenced_json`] for embedding JSON in them
//! - **Errors**: [`propagate_failure`] for hard, protocol-level failures
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{fenced_json, propagate_failure, text_result, FailureKind};
//!
//! // Tool handlers report problems in-band so the model can react
//! let result = text_result("query parameter is required", true);
//!
//! // Resource handlers fail the request instead
//! let err = propagate_failure(FailureKind::NotFound, "table 'x' not found");
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{propagate_failure, FailureKind, McpResult};
pub use init::{init_tracing, LogFormat};
pub use result::{fenced_json, text_result};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Resource, ResourceContents, ResourceTemplate, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
