//! Gateway DB MCP Library
//!
//! Exposes a remote PostgreSQL gateway API as MCP tools. Table, schema and
//! column arguments are sanitized before they reach generated SQL, and a
//! read-only mode blocks mutating tools and screens raw SQL for write
//! keywords.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use gateway_db_mcp::{Config, GatewayDbMcpServer};
//! use mcp_common::EmbeddableMcp;
//!
//! let server = GatewayDbMcpServer::new(Config::default())?;
//! let result = server
//!     .call_tool("describe_table", serde_json::json!({ "table": "audit.events" }))
//!     .await?;
//! ```

pub mod classifier;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod identifier;
pub mod params;
pub mod policy;
pub mod server;

// Re-export main server type
pub use server::GatewayDbMcpServer;

pub use config::{AccessMode, Config};
pub use gateway::{Gateway, GatewayError, Operation};

// Re-export parameter types for direct API usage
pub use params::*;
