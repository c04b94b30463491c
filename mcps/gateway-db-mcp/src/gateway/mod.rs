//! Gateway API access
//!
//! [`Operation`] describes one outbound call in typed form, [`Gateway`] is
//! anything that can carry it out. Tools never talk to a `Gateway` directly:
//! they go through [`GuardedGateway`], which applies the read-only policy
//! first.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::identifier::TableRef;
use crate::policy::Access;

pub mod guarded;
pub mod http;

pub use guarded::{CallError, GuardedGateway};
pub use http::HttpGateway;

/// A JSON object of column name to value
pub type Row = Map<String, Value>;

/// Filters, projection and paging for a row fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    /// Equality filters, combined with AND
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub filters: Row,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    pub descending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// One call to the Gateway API
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Run caller-supplied SQL
    ExecuteSql { query: String },
    /// Run SQL built from a fixed read-only template and sanitized identifiers
    CatalogQuery { query: String },
    ListSchemas,
    ListTables { schema: Option<String> },
    DescribeTable { table: TableRef },
    SelectRows { table: TableRef, query: RowQuery },
    InsertRows { table: TableRef, rows: Vec<Row> },
    UpdateRows { table: TableRef, values: Row, filters: Row },
    DeleteRows { table: TableRef, filters: Row },
    ApplyMigration { name: String, query: String },
}

impl Operation {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecuteSql { .. } => "execute_sql",
            Self::CatalogQuery { .. } => "catalog_query",
            Self::ListSchemas => "list_schemas",
            Self::ListTables { .. } => "list_tables",
            Self::DescribeTable { .. } => "describe_table",
            Self::SelectRows { .. } => "select_rows",
            Self::InsertRows { .. } => "insert_rows",
            Self::UpdateRows { .. } => "update_rows",
            Self::DeleteRows { .. } => "delete_rows",
            Self::ApplyMigration { .. } => "apply_migration",
        }
    }

    /// The access class the read-only policy judges this operation by
    pub fn access(&self) -> Access<'_> {
        match self {
            Self::ExecuteSql { query } => Access::Sql(query),
            Self::CatalogQuery { .. }
            | Self::ListSchemas
            | Self::ListTables { .. }
            | Self::DescribeTable { .. }
            | Self::SelectRows { .. } => Access::Read,
            Self::InsertRows { .. }
            | Self::UpdateRows { .. }
            | Self::DeleteRows { .. }
            | Self::ApplyMigration { .. } => Access::Mutation,
        }
    }
}

/// Failures talking to the Gateway API
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-2xx response; `body` is pretty JSON when the body parsed, raw text otherwise
    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body is not JSON
    #[error("Gateway returned a response that is not valid JSON: {body}")]
    InvalidBody { body: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Something that can execute gateway operations
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Name of this gateway implementation, for logs
    fn name(&self) -> &str;

    async fn call(&self, operation: &Operation) -> GatewayResult<Value>;
}
