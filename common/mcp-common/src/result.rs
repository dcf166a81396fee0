//! Result helpers for MCP tool responses
//!
//! Tool handlers never fail the protocol request for business errors. They
//! answer with a normal `CallToolResult` whose text the calling model reads,
//! flagging it with `is_error` when something went wrong.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// Build a single-text tool response
///
/// `is_error = true` produces a soft error: the request succeeds at the
/// protocol level and the message is shown to the model.
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::text_result;
///
/// let ok = text_result("Statement executed successfully. Rows affected: 1", false);
/// let soft = text_result("statement parameter is required", true);
/// ```
pub fn text_result(message: impl Into<String>, is_error: bool) -> CallToolResult {
    let content = vec![Content::text(message.into())];
    if is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// Render `data` as indented JSON inside a fenced block under a heading line
///
/// ```text
/// Tables in database:
/// ```json
/// [
///   "users"
/// ]
/// ```
/// ```
pub fn fenced_json<T: Serialize + ?Sized>(
    heading: &str,
    data: &T,
) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(data)?;
    Ok(format!("{}\n```json\n{}\n```", heading, json))
}
