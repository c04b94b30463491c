//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: [`init_tracing`] sends logs to stderr, keeping stdout for the protocol
//! - **Results**: helpers for successful and tool-level error `CallToolResult`s
//! - **Errors**: conversions from library errors into protocol errors
//! - **Embeddable**: [`EmbeddableMcp`] for calling a server's tools in-process
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{json_success, tool_error};
//!
//! fn my_tool(&self, name: &str) -> Result<CallToolResult, McpError> {
//!     if name.is_empty() {
//!         // The caller sees this as a failed tool call, not a protocol failure
//!         return Ok(tool_error("name must not be empty"));
//!     }
//!     json_success(&lookup(name))
//! }
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{IntoMcpError, McpResult, ResultExt};
pub use init::{init_tracing, LogFormat};
pub use result::{json_success, result_text, text_success, tool_error};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
