//! In-process tool execution
//!
//! [`EmbeddableMcp`] lets a host (or a test) call a server's tools directly,
//! without a transport in between. Tool results come back exactly as a
//! remote client would see them, including tool-level errors. Arguments
//! that do not fit a tool's parameters are a tool-level error too.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let tools = server.list_tools();
//! let result = server
//!     .call_tool("list_tables", serde_json::json!({ "schema": "audit" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Errors raised before a tool gets to produce a result
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No tool with this name is registered
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// The tool failed at the protocol level
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

/// An MCP server whose tools can be called in-process
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Server name, as used in MCP client configuration
    fn server_name(&self) -> &str;

    /// All tools with their names, descriptions and input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Run a tool by name with JSON arguments
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{text_success, tool_error};
    use serde::Deserialize;

    struct EchoServer;

    #[derive(Deserialize)]
    struct EchoParams {
        message: String,
    }

    #[async_trait]
    impl EmbeddableMcp for EchoServer {
        fn server_name(&self) -> &str {
            "echo"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
            match name {
                "echo" => match serde_json::from_value::<EchoParams>(params) {
                    Ok(params) => Ok(text_success(params.message)),
                    Err(e) => Ok(tool_error(format!("invalid parameters for echo: {}", e))),
                },
                other => Err(EmbeddableError::ToolNotFound(other.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_call_known_tool() {
        let result = EchoServer
            .call_tool("echo", serde_json::json!({ "message": "hi" }))
            .await
            .unwrap();
        assert_eq!(crate::result_text(&result), "hi");
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let result = EchoServer.call_tool("unknown", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_bad_params_are_a_tool_error() {
        let result = EchoServer
            .call_tool("echo", serde_json::json!({ "msg": 1 }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(crate::result_text(&result).starts_with("invalid parameters for echo"));
    }
}
