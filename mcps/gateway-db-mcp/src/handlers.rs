//! Tool handler implementations
//!
//! Each tool turns its parameters into an [`Operation`] (validating and
//! sanitizing on the way) and sends it through the [`GuardedGateway`].
//! Bad arguments, policy refusals and gateway failures all come back as
//! tool-level errors, never as protocol errors.

use std::sync::LazyLock;

use mcp_common::{json_success, tool_error, CallToolResult, McpResult};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::gateway::{CallError, GuardedGateway, Operation, Row, RowQuery};
use crate::identifier::{sanitize_all, sanitize_identifier, IdentifierError, TableRef};
use crate::params::*;
use crate::policy::{Access, PolicyRefusal};

static MIGRATION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid migration name regex"));

/// Why a tool call did not produce a gateway response
#[derive(Error, Debug)]
enum ToolFailure {
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    Refused(#[from] PolicyRefusal),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error("{0}")]
    Invalid(String),

    #[error("Invalid arguments: {0}")]
    Arguments(String),
}

type Built = Result<Operation, ToolFailure>;

// ============================================================================
// Helper Functions
// ============================================================================

fn respond(outcome: Result<Value, ToolFailure>) -> McpResult<CallToolResult> {
    match outcome {
        Ok(value) => json_success(&value),
        Err(failure) => Ok(tool_error(failure.to_string())),
    }
}

/// Send a built operation through the guarded gateway
async fn dispatch(gateway: &GuardedGateway, built: Built) -> McpResult<CallToolResult> {
    let outcome = match built {
        Ok(operation) => gateway.call(&operation).await.map_err(ToolFailure::from),
        Err(failure) => Err(failure),
    };
    respond(outcome)
}

/// Like [`dispatch`], but in read-only mode the tool is refused before its
/// arguments are even looked at, shape errors included
async fn dispatch_mutation(
    gateway: &GuardedGateway,
    tool: &str,
    build: impl FnOnce() -> Built,
) -> McpResult<CallToolResult> {
    if let Err(refusal) = gateway.admit(tool, &Access::Mutation) {
        return respond(Err(refusal.into()));
    }
    dispatch(gateway, build()).await
}

/// Unwrap tool arguments and build the operation from them
fn build<T>(args: ToolArgs<T>, builder: impl FnOnce(T) -> Built) -> Built {
    args.into_result().map_err(ToolFailure::Arguments).and_then(builder)
}

fn non_empty(value: String, field: &str) -> Result<String, ToolFailure> {
    if value.trim().is_empty() {
        Err(ToolFailure::Invalid(format!("{} must not be empty", field)))
    } else {
        Ok(value)
    }
}

fn sanitize_keys(row: &Row) -> Result<(), IdentifierError> {
    sanitize_all(row.keys().map(String::as_str), "column")
}

fn optional_schema(schema: Option<String>) -> Result<Option<String>, IdentifierError> {
    schema
        .map(|s| sanitize_identifier(&s, "schema").map(str::to_string))
        .transpose()
}

// ============================================================================
// Operation Builders
// ============================================================================

fn execute_sql_operation(params: ExecuteSqlParams) -> Built {
    let query = non_empty(params.query, "query")?;
    Ok(Operation::ExecuteSql { query })
}

fn explain_operation(params: ExplainQueryParams) -> Built {
    let query = non_empty(params.query, "query")?;
    let prefix = if params.analyze {
        "EXPLAIN ANALYZE"
    } else {
        "EXPLAIN"
    };
    // Screened as caller SQL: EXPLAIN ANALYZE runs the statement
    Ok(Operation::ExecuteSql {
        query: format!("{} {}", prefix, query.trim()),
    })
}

fn list_tables_operation(params: ListTablesParams) -> Built {
    Ok(Operation::ListTables {
        schema: optional_schema(params.schema)?,
    })
}

fn describe_table_operation(params: TableParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;
    Ok(Operation::DescribeTable { table })
}

fn list_indexes_operation(params: TableParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;
    let query = format!(
        "SELECT indexname, indexdef FROM pg_indexes \
         WHERE schemaname = '{}' AND tablename = '{}' ORDER BY indexname",
        table.schema, table.table
    );
    Ok(Operation::CatalogQuery { query })
}

fn count_rows_operation(params: TableParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;
    let query = format!("SELECT COUNT(*) AS count FROM {}", table.qualified);
    Ok(Operation::CatalogQuery { query })
}

fn select_rows_operation(params: SelectRowsParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;

    if let Some(columns) = &params.columns {
        sanitize_all(columns.iter().map(String::as_str), "column")?;
    }
    let filters = params.filters.unwrap_or_default();
    sanitize_keys(&filters)?;
    if let Some(order_by) = &params.order_by {
        sanitize_identifier(order_by, "column")?;
    }

    Ok(Operation::SelectRows {
        table,
        query: RowQuery {
            columns: params.columns,
            filters,
            order_by: params.order_by,
            descending: params.descending,
            limit: params.limit.map(|n| n.get()),
            offset: params.offset,
        },
    })
}

fn insert_rows_operation(params: InsertRowsParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;

    if params.rows.is_empty() {
        return Err(ToolFailure::Invalid(
            "rows must contain at least one row".to_string(),
        ));
    }
    for row in &params.rows {
        if row.is_empty() {
            return Err(ToolFailure::Invalid(
                "each row must set at least one column".to_string(),
            ));
        }
        sanitize_keys(row)?;
    }

    Ok(Operation::InsertRows {
        table,
        rows: params.rows,
    })
}

fn update_rows_operation(params: UpdateRowsParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;

    if params.values.is_empty() {
        return Err(ToolFailure::Invalid("values must not be empty".to_string()));
    }
    if params.filters.is_empty() {
        return Err(ToolFailure::Invalid(
            "filters must not be empty; refusing to update every row".to_string(),
        ));
    }
    sanitize_keys(&params.values)?;
    sanitize_keys(&params.filters)?;

    Ok(Operation::UpdateRows {
        table,
        values: params.values,
        filters: params.filters,
    })
}

fn delete_rows_operation(params: DeleteRowsParams) -> Built {
    let table = TableRef::resolve(&params.table, params.schema.as_deref())?;

    if params.filters.is_empty() {
        return Err(ToolFailure::Invalid(
            "filters must not be empty; refusing to delete every row".to_string(),
        ));
    }
    sanitize_keys(&params.filters)?;

    Ok(Operation::DeleteRows {
        table,
        filters: params.filters,
    })
}

fn apply_migration_operation(params: ApplyMigrationParams) -> Built {
    if !MIGRATION_NAME_RE.is_match(&params.name) {
        return Err(ToolFailure::Invalid(format!(
            "Invalid migration name: '{}'. Use letters, digits, underscores and hyphens.",
            params.name
        )));
    }
    let query = non_empty(params.query, "query")?;

    Ok(Operation::ApplyMigration {
        name: params.name,
        query,
    })
}

// ============================================================================
// Handler Functions
// ============================================================================

pub async fn execute_sql(
    gateway: &GuardedGateway,
    args: ToolArgs<ExecuteSqlParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, execute_sql_operation)).await
}

pub async fn explain_query(
    gateway: &GuardedGateway,
    args: ToolArgs<ExplainQueryParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, explain_operation)).await
}

pub async fn list_schemas(gateway: &GuardedGateway) -> McpResult<CallToolResult> {
    dispatch(gateway, Ok(Operation::ListSchemas)).await
}

pub async fn list_tables(
    gateway: &GuardedGateway,
    args: ToolArgs<ListTablesParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, list_tables_operation)).await
}

pub async fn describe_table(
    gateway: &GuardedGateway,
    args: ToolArgs<TableParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, describe_table_operation)).await
}

pub async fn list_indexes(
    gateway: &GuardedGateway,
    args: ToolArgs<TableParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, list_indexes_operation)).await
}

pub async fn count_rows(
    gateway: &GuardedGateway,
    args: ToolArgs<TableParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, count_rows_operation)).await
}

pub async fn select_rows(
    gateway: &GuardedGateway,
    args: ToolArgs<SelectRowsParams>,
) -> McpResult<CallToolResult> {
    dispatch(gateway, build(args, select_rows_operation)).await
}

pub async fn insert_rows(
    gateway: &GuardedGateway,
    args: ToolArgs<InsertRowsParams>,
) -> McpResult<CallToolResult> {
    dispatch_mutation(gateway, "insert_rows", || build(args, insert_rows_operation)).await
}

pub async fn update_rows(
    gateway: &GuardedGateway,
    args: ToolArgs<UpdateRowsParams>,
) -> McpResult<CallToolResult> {
    dispatch_mutation(gateway, "update_rows", || build(args, update_rows_operation)).await
}

pub async fn delete_rows(
    gateway: &GuardedGateway,
    args: ToolArgs<DeleteRowsParams>,
) -> McpResult<CallToolResult> {
    dispatch_mutation(gateway, "delete_rows", || build(args, delete_rows_operation)).await
}

pub async fn apply_migration(
    gateway: &GuardedGateway,
    args: ToolArgs<ApplyMigrationParams>,
) -> McpResult<CallToolResult> {
    dispatch_mutation(gateway, "apply_migration", || {
        build(args, apply_migration_operation)
    })
    .await
}

/// Local status report; never contacts the gateway
#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub server: &'static str,
    pub version: &'static str,
    pub mode: &'static str,
    pub read_only: bool,
    pub gateway_url: String,
    pub client_name: String,
    pub api_key_configured: bool,
    pub health_port: Option<u16>,
}

pub fn server_status(config: &Config) -> McpResult<CallToolResult> {
    let mode = config.access_mode();
    json_success(&ServerStatus {
        server: "gateway-db-mcp",
        version: env!("CARGO_PKG_VERSION"),
        mode: mode.as_str(),
        read_only: mode.is_restricted(),
        gateway_url: config.gateway.base_url.clone(),
        client_name: config.gateway.client_name.clone(),
        api_key_configured: !config.gateway.api_key.is_empty(),
        health_port: config.health.port,
    })
}
