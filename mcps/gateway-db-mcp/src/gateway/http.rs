//! HTTP gateway
//!
//! Maps each [`Operation`] onto the Gateway API's REST endpoints using reqwest.
//! Requests carry the client name in `X-Client-Info`, plus the API key as both
//! a bearer token and an `apikey` header when one is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::{Gateway, GatewayError, GatewayResult, Operation};
use crate::config::GatewayConfig;

/// A resolved endpoint: method, path below the base URL, query string and body
#[derive(Debug, PartialEq)]
struct Route {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl Route {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

fn rows_path(schema: &str, table: &str) -> String {
    format!("/v1/tables/{}/{}/rows", schema, table)
}

fn route(operation: &Operation) -> Route {
    match operation {
        Operation::ExecuteSql { query } | Operation::CatalogQuery { query } => {
            Route::new(Method::POST, "/v1/sql").with_body(json!({ "query": query }))
        }
        Operation::ListSchemas => Route::new(Method::GET, "/v1/schemas"),
        Operation::ListTables { schema } => {
            let mut route = Route::new(Method::GET, "/v1/tables");
            if let Some(schema) = schema {
                route.query.push(("schema", schema.clone()));
            }
            route
        }
        Operation::DescribeTable { table } => Route::new(
            Method::GET,
            format!("/v1/tables/{}/{}/columns", table.schema, table.table),
        ),
        Operation::SelectRows { table, query } => Route::new(
            Method::POST,
            format!("{}/query", rows_path(&table.schema, &table.table)),
        )
        .with_body(json!(query)),
        Operation::InsertRows { table, rows } => {
            Route::new(Method::POST, rows_path(&table.schema, &table.table))
                .with_body(json!({ "rows": rows }))
        }
        Operation::UpdateRows {
            table,
            values,
            filters,
        } => Route::new(Method::PATCH, rows_path(&table.schema, &table.table))
            .with_body(json!({ "values": values, "filters": filters })),
        Operation::DeleteRows { table, filters } => {
            Route::new(Method::DELETE, rows_path(&table.schema, &table.table))
                .with_body(json!({ "filters": filters }))
        }
        Operation::ApplyMigration { name, query } => Route::new(Method::POST, "/v1/migrations")
            .with_body(json!({ "name": name, "query": query })),
    }
}

/// Gateway reached over HTTP(S)
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
    client_name: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("gateway-db-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client_name: config.client_name.clone(),
        })
    }
}

/// Turn a response body into the error text shown to the caller
fn error_body(text: String) -> String {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(text),
        Err(_) => text,
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, operation), fields(op = operation.name()))]
    async fn call(&self, operation: &Operation) -> GatewayResult<Value> {
        let route = route(operation);
        let url = format!("{}{}", self.base_url, route.path);

        debug!(method = %route.method, %url, "sending gateway request");

        let mut request = self
            .client
            .request(route.method, &url)
            .header("X-Client-Info", &self.client_name);

        if !self.api_key.is_empty() {
            request = request
                .bearer_auth(&self.api_key)
                .header("apikey", &self.api_key);
        }
        if !route.query.is_empty() {
            request = request.query(&route.query);
        }
        if let Some(body) = &route.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            // The status is reported even when the body cannot be read
            let text = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "gateway returned an error");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: error_body(text),
            });
        }

        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|_| GatewayError::InvalidBody { body: text })
    }
}
