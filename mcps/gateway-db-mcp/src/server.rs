//! MCP Server implementation for the database gateway
//!
//! Tools are declared here and delegate to the handlers module. The same
//! handlers back [`EmbeddableMcp::call_tool`] for in-process use. Arguments
//! arrive as [`ToolArgs`], so a shape error becomes a tool-level error
//! instead of a protocol error.

use std::sync::Arc;

use mcp_common::{
    async_trait, CallToolResult, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError, Tool,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::config::Config;
use crate::gateway::{Gateway, GatewayResult, GuardedGateway, HttpGateway};
use crate::handlers;
use crate::params::*;
use crate::policy::Policy;

/// The Gateway DB MCP Server
#[derive(Clone)]
pub struct GatewayDbMcpServer {
    gateway: GuardedGateway,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl GatewayDbMcpServer {
    /// Create a server talking to the configured Gateway API over HTTP
    pub fn new(config: Config) -> GatewayResult<Self> {
        let http = HttpGateway::new(&config.gateway)?;
        Ok(Self::with_gateway(config, Arc::new(http)))
    }

    /// Create a server on top of any gateway implementation
    pub fn with_gateway(config: Config, gateway: Arc<dyn Gateway>) -> Self {
        let policy = Policy::new(config.access_mode());
        Self {
            gateway: GuardedGateway::new(policy, gateway),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl GatewayDbMcpServer {
    #[tool(description = "Execute a SQL statement on the database and return the result rows as JSON. In read-only mode, statements containing write keywords are refused.")]
    async fn execute_sql(
        &self,
        Parameters(args): Parameters<ToolArgs<ExecuteSqlParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::execute_sql(&self.gateway, args).await
    }

    #[tool(description = "Show the query plan for a SQL statement. With analyze=true the statement is executed (EXPLAIN ANALYZE).")]
    async fn explain_query(
        &self,
        Parameters(args): Parameters<ToolArgs<ExplainQueryParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::explain_query(&self.gateway, args).await
    }

    #[tool(description = "List all schemas in the database.")]
    async fn list_schemas(&self) -> Result<CallToolResult, McpError> {
        handlers::list_schemas(&self.gateway).await
    }

    #[tool(description = "List tables, optionally restricted to one schema.")]
    async fn list_tables(
        &self,
        Parameters(args): Parameters<ToolArgs<ListTablesParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_tables(&self.gateway, args).await
    }

    #[tool(description = "Get column names, types, nullability and defaults for a table.")]
    async fn describe_table(
        &self,
        Parameters(args): Parameters<ToolArgs<TableParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::describe_table(&self.gateway, args).await
    }

    #[tool(description = "List the indexes defined on a table.")]
    async fn list_indexes(
        &self,
        Parameters(args): Parameters<ToolArgs<TableParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_indexes(&self.gateway, args).await
    }

    #[tool(description = "Count the rows in a table.")]
    async fn count_rows(
        &self,
        Parameters(args): Parameters<ToolArgs<TableParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::count_rows(&self.gateway, args).await
    }

    #[tool(description = "Fetch rows from a table with optional column selection, equality filters, ordering and paging.")]
    async fn select_rows(
        &self,
        Parameters(args): Parameters<ToolArgs<SelectRowsParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::select_rows(&self.gateway, args).await
    }

    #[tool(description = "Insert one or more rows into a table. Disabled in read-only mode.")]
    async fn insert_rows(
        &self,
        Parameters(args): Parameters<ToolArgs<InsertRowsParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::insert_rows(&self.gateway, args).await
    }

    #[tool(description = "Update rows matching equality filters. Filters are required. Disabled in read-only mode.")]
    async fn update_rows(
        &self,
        Parameters(args): Parameters<ToolArgs<UpdateRowsParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::update_rows(&self.gateway, args).await
    }

    #[tool(description = "Delete rows matching equality filters. Filters are required. Disabled in read-only mode.")]
    async fn delete_rows(
        &self,
        Parameters(args): Parameters<ToolArgs<DeleteRowsParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::delete_rows(&self.gateway, args).await
    }

    #[tool(description = "Apply a named schema migration. Disabled in read-only mode.")]
    async fn apply_migration(
        &self,
        Parameters(args): Parameters<ToolArgs<ApplyMigrationParams>>,
    ) -> Result<CallToolResult, McpError> {
        handlers::apply_migration(&self.gateway, args).await
    }

    #[tool(description = "Report the server's mode (read-only or read-write), gateway URL and client name.")]
    async fn server_status(&self) -> Result<CallToolResult, McpError> {
        handlers::server_status(&self.config)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for GatewayDbMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mode = self.config.access_mode();
        ServerInfo {
            instructions: Some(format!(
                "Database gateway MCP server, currently in {} mode. \
                 Use list_schemas, list_tables and describe_table to explore, \
                 execute_sql or select_rows to read data, and insert_rows, update_rows, \
                 delete_rows or apply_migration to change it (refused in read-only mode).",
                mode.as_str()
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// In-process execution
// ============================================================================

#[async_trait]
impl EmbeddableMcp for GatewayDbMcpServer {
    fn server_name(&self) -> &str {
        "gateway-db"
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        let gw = &self.gateway;
        let result = match name {
            "execute_sql" => handlers::execute_sql(gw, ToolArgs::from_value(params)).await,
            "explain_query" => handlers::explain_query(gw, ToolArgs::from_value(params)).await,
            "list_schemas" => handlers::list_schemas(gw).await,
            "list_tables" => handlers::list_tables(gw, ToolArgs::from_value(params)).await,
            "describe_table" => handlers::describe_table(gw, ToolArgs::from_value(params)).await,
            "list_indexes" => handlers::list_indexes(gw, ToolArgs::from_value(params)).await,
            "count_rows" => handlers::count_rows(gw, ToolArgs::from_value(params)).await,
            "select_rows" => handlers::select_rows(gw, ToolArgs::from_value(params)).await,
            "insert_rows" => handlers::insert_rows(gw, ToolArgs::from_value(params)).await,
            "update_rows" => handlers::update_rows(gw, ToolArgs::from_value(params)).await,
            "delete_rows" => handlers::delete_rows(gw, ToolArgs::from_value(params)).await,
            "apply_migration" => {
                handlers::apply_migration(gw, ToolArgs::from_value(params)).await
            }
            "server_status" => handlers::server_status(&self.config),
            other => return Err(EmbeddableError::ToolNotFound(other.to_string())),
        };
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::gateway::test_support::RecordingGateway;

    fn server(read_only: bool) -> (GatewayDbMcpServer, Arc<RecordingGateway>) {
        let config = Config {
            read_only,
            ..Config::default()
        };
        let stub = Arc::new(RecordingGateway::new(json!([])));
        (GatewayDbMcpServer::with_gateway(config, stub.clone()), stub)
    }

    #[test]
    fn test_tool_schemas_describe_parameters() {
        let (server, _stub) = server(false);
        let tools = server.list_tools();

        let insert = tools.iter().find(|t| t.name == "insert_rows").unwrap();
        let properties = insert
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
            .unwrap();
        assert!(properties.contains_key("table"));
        assert!(properties.contains_key("rows"));
    }

    #[tokio::test]
    async fn test_call_tool_reports_bad_shape_as_tool_error() {
        let (server, stub) = server(false);

        let result = server
            .call_tool("select_rows", json!({ "table": "users", "limit": 0 }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(stub.calls().is_empty());
    }
}
