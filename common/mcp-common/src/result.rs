//! Result helpers for MCP tool responses
//!
//! Tools answer in one of two shapes: a success carrying text content, or a
//! tool-level error (`is_error = true`) whose text explains what went wrong.
//! Tool-level errors are ordinary responses; the protocol request succeeds.

use rmcp::model::{CallToolResult, Content, RawContent};
use serde::Serialize;

use crate::error::{McpResult, ResultExt};

/// Create a successful response holding pretty-printed JSON
///
/// # Errors
///
/// Returns an internal protocol error only if `data` cannot be serialized.
pub fn json_success<T: Serialize>(data: &T) -> McpResult<CallToolResult> {
    let json = serde_json::to_string_pretty(data).to_mcp_err()?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Create a successful plain text response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Create a tool-level error response
///
/// Use this for failures the caller should read and react to: rejected
/// arguments, refused operations, upstream service errors.
pub fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Concatenate the text content of a result, skipping non-text items
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
