//! Parameter types for Gateway DB MCP tools

use std::borrow::Cow;
use std::num::NonZeroU32;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Tool arguments that may not have matched the parameter type
///
/// Deserializing never fails: a shape error is kept so the handler can
/// report it as a tool-level error, after any read-only refusal. The input
/// schema is the one of `T`.
#[derive(Debug)]
pub struct ToolArgs<T>(Result<T, String>);

impl<T: DeserializeOwned> ToolArgs<T> {
    pub fn from_value(value: Value) -> Self {
        Self(serde_json::from_value(value).map_err(|e| e.to_string()))
    }
}

impl<T> ToolArgs<T> {
    pub fn into_result(self) -> Result<T, String> {
        self.0
    }
}

impl<T> From<T> for ToolArgs<T> {
    fn from(params: T) -> Self {
        Self(Ok(params))
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ToolArgs<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl<T: JsonSchema> JsonSchema for ToolArgs<T> {
    fn inline_schema() -> bool {
        T::inline_schema()
    }

    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteSqlParams {
    #[schemars(
        description = "SQL statement to execute. In read-only mode, statements containing \
                       INSERT, UPDATE, DELETE, DROP, CREATE, ALTER, TRUNCATE, GRANT, REVOKE \
                       or REPLACE are refused."
    )]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExplainQueryParams {
    #[schemars(description = "SQL statement to explain")]
    pub query: String,

    #[schemars(description = "Run the statement and report actual timings (EXPLAIN ANALYZE)")]
    #[serde(default)]
    pub analyze: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTablesParams {
    #[schemars(description = "Only list tables in this schema (default: all schemas)")]
    #[serde(default)]
    pub schema: Option<String>,
}

/// Parameters for tools that act on one table
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TableParams {
    #[schemars(description = "Table name, optionally schema-qualified (e.g. 'audit.events')")]
    pub table: String,

    #[schemars(description = "Schema name (default: public). Ignored when the table is qualified.")]
    #[serde(default)]
    pub schema: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SelectRowsParams {
    #[schemars(description = "Table name, optionally schema-qualified (e.g. 'audit.events')")]
    pub table: String,

    #[schemars(description = "Schema name (default: public). Ignored when the table is qualified.")]
    #[serde(default)]
    pub schema: Option<String>,

    #[schemars(description = "Columns to return (default: all)")]
    #[serde(default)]
    pub columns: Option<Vec<String>>,

    #[schemars(description = "Equality filters as column -> value, combined with AND")]
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,

    #[schemars(description = "Column to sort by")]
    #[serde(default)]
    pub order_by: Option<String>,

    #[schemars(description = "Sort descending instead of ascending")]
    #[serde(default)]
    pub descending: bool,

    #[schemars(description = "Maximum number of rows to return (positive)")]
    #[serde(default)]
    pub limit: Option<NonZeroU32>,

    #[schemars(description = "Number of rows to skip")]
    #[serde(default)]
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InsertRowsParams {
    #[schemars(description = "Table name, optionally schema-qualified (e.g. 'audit.events')")]
    pub table: String,

    #[schemars(description = "Schema name (default: public). Ignored when the table is qualified.")]
    #[serde(default)]
    pub schema: Option<String>,

    #[schemars(description = "Rows to insert, each an object of column -> value")]
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateRowsParams {
    #[schemars(description = "Table name, optionally schema-qualified (e.g. 'audit.events')")]
    pub table: String,

    #[schemars(description = "Schema name (default: public). Ignored when the table is qualified.")]
    #[serde(default)]
    pub schema: Option<String>,

    #[schemars(description = "New values as column -> value")]
    pub values: Map<String, Value>,

    #[schemars(description = "Equality filters selecting the rows to update (required, non-empty)")]
    pub filters: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRowsParams {
    #[schemars(description = "Table name, optionally schema-qualified (e.g. 'audit.events')")]
    pub table: String,

    #[schemars(description = "Schema name (default: public). Ignored when the table is qualified.")]
    #[serde(default)]
    pub schema: Option<String>,

    #[schemars(description = "Equality filters selecting the rows to delete (required, non-empty)")]
    pub filters: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApplyMigrationParams {
    #[schemars(
        description = "Migration name: letters, digits, underscores and hyphens",
        regex(pattern = r"^[A-Za-z0-9_-]+$")
    )]
    pub name: String,

    #[schemars(description = "SQL to apply as the migration")]
    pub query: String,
}
