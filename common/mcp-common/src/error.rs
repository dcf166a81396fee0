//! Error handling utilities for MCP servers
//!
//! Hard failures travel back to the client as protocol errors, unlike the
//! soft errors built with [`crate::text_result`].

use rmcp::ErrorData as McpError;

/// Type alias for MCP handler results
pub type McpResult<T> = Result<T, McpError>;

/// Category of a hard failure, selecting the protocol error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The addressed thing does not exist
    NotFound,
    /// The request itself is malformed
    BadRequest,
    /// Something failed on the server side
    Internal,
}

/// Turn a failure into the protocol error returned to the client
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::{propagate_failure, FailureKind};
///
/// if uri.is_empty() {
///     return Err(propagate_failure(FailureKind::BadRequest, "uri is required"));
/// }
/// ```
pub fn propagate_failure(kind: FailureKind, message: impl Into<String>) -> McpError {
    let message = message.into();
    match kind {
        FailureKind::NotFound => McpError::resource_not_found(message, None),
        FailureKind::BadRequest => McpError::invalid_params(message, None),
        FailureKind::Internal => McpError::internal_error(message, None),
    }
}
