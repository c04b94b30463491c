//! End-to-end tool dispatch against a stub gateway
//!
//! Drives the server through [`EmbeddableMcp::call_tool`], the same path an
//! in-process host uses, and checks what does and does not reach the gateway.

mod support;

use gateway_db_mcp::gateway::Operation;
use mcp_common::{result_text, EmbeddableError, EmbeddableMcp};
use serde_json::{json, Value};

fn mutating_calls() -> Vec<(&'static str, Value)> {
    vec![
        ("insert_rows", json!({ "table": "users", "rows": [{ "name": "ada" }] })),
        (
            "update_rows",
            json!({ "table": "users", "values": { "name": "bob" }, "filters": { "id": 1 } }),
        ),
        ("delete_rows", json!({ "table": "users", "filters": { "id": 1 } })),
        (
            "apply_migration",
            json!({ "name": "add_email", "query": "ALTER TABLE users ADD COLUMN email text" }),
        ),
    ]
}

#[tokio::test]
async fn read_only_refuses_every_mutating_tool() {
    let (server, stub) = support::server(true);

    for (tool, args) in mutating_calls() {
        let result = server.call_tool(tool, args).await.unwrap();
        assert_eq!(result.is_error, Some(true), "{} should be refused", tool);
        assert!(
            result_text(&result).contains("Read-only mode is enabled"),
            "{}: {}",
            tool,
            result_text(&result)
        );
    }

    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn read_only_refuses_mutation_with_bad_arguments_too() {
    let (server, stub) = support::server(true);

    let result = server
        .call_tool("delete_rows", json!({ "table": "users; DROP", "filters": {} }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("Read-only mode is enabled"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn read_only_forwards_read_sql_once() {
    let (server, stub) = support::server(true);

    let result = server
        .call_tool("execute_sql", json!({ "query": "SELECT * FROM users" }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    assert_eq!(
        stub.calls(),
        vec![Operation::ExecuteSql {
            query: "SELECT * FROM users".to_string()
        }]
    );
}

#[tokio::test]
async fn read_only_refuses_write_sql() {
    let (server, stub) = support::server(true);

    for query in ["DELETE FROM users", "select 1; drop table users", "Truncate logs"] {
        let result = server
            .call_tool("execute_sql", json!({ "query": query }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true), "{}", query);
    }

    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn read_only_still_allows_catalog_tools() {
    let (server, stub) = support::server(true);

    for (tool, args) in [
        ("list_schemas", json!({})),
        ("list_tables", json!({ "schema": "public" })),
        ("describe_table", json!({ "table": "users" })),
        ("list_indexes", json!({ "table": "audit.events" })),
        ("count_rows", json!({ "table": "update" })),
        ("select_rows", json!({ "table": "users", "limit": 5 })),
    ] {
        let result = server.call_tool(tool, args).await.unwrap();
        assert_ne!(result.is_error, Some(true), "{}: {}", tool, result_text(&result));
    }

    assert_eq!(stub.calls().len(), 6);
}

#[tokio::test]
async fn normal_mode_forwards_mutations() {
    let (server, stub) = support::server(false);

    for (tool, args) in mutating_calls() {
        let result = server.call_tool(tool, args).await.unwrap();
        assert_ne!(result.is_error, Some(true), "{}: {}", tool, result_text(&result));
    }

    let names: Vec<_> = stub.calls().iter().map(Operation::name).collect();
    assert_eq!(
        names,
        vec!["insert_rows", "update_rows", "delete_rows", "apply_migration"]
    );
}

#[tokio::test]
async fn unsafe_identifier_never_reaches_gateway() {
    let (server, stub) = support::server(false);

    let result = server
        .call_tool("describe_table", json!({ "table": "users\"; DROP TABLE x; --" }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).starts_with("Invalid table_name"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn server_status_is_local() {
    let (server, stub) = support::server(true);
    assert!(server.config().access_mode().is_restricted());

    let result = server.call_tool("server_status", json!({})).await.unwrap();
    let status: Value = serde_json::from_str(&result_text(&result)).unwrap();

    assert_eq!(status["mode"], "read-only");
    assert_eq!(status["read_only"], true);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn every_listed_tool_dispatches() {
    let (server, _stub) = support::server(true);

    let tools = server.list_tools();
    assert_eq!(tools.len(), 13);

    for tool in tools {
        let outcome = server.call_tool(&tool.name, json!({})).await;
        assert!(
            !matches!(outcome, Err(EmbeddableError::ToolNotFound(_))),
            "{} is listed but not dispatched",
            tool.name
        );
    }
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let (server, _stub) = support::server(false);

    let outcome = server.call_tool("drop_database", json!({})).await;
    assert!(matches!(outcome, Err(EmbeddableError::ToolNotFound(name)) if name == "drop_database"));
}

#[tokio::test]
async fn read_only_refuses_mutation_with_wrong_shape() {
    let (server, stub) = support::server(true);

    for (tool, args) in [
        ("insert_rows", json!({ "table": "users" })),
        ("update_rows", json!({ "table": "users", "values": "not an object" })),
        ("delete_rows", json!({})),
        ("apply_migration", json!({ "name": 7 })),
    ] {
        let result = server.call_tool(tool, args).await.unwrap();
        assert_eq!(result.is_error, Some(true), "{}", tool);
        assert!(
            result_text(&result).starts_with("Read-only mode is enabled"),
            "{}: {}",
            tool,
            result_text(&result)
        );
    }

    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn wrong_shape_is_a_tool_error() {
    let (server, stub) = support::server(false);

    let result = server
        .call_tool("select_rows", json!({ "table": "users", "limit": 0 }))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).starts_with("Invalid arguments:"));

    let result = server
        .call_tool("insert_rows", json!({ "table": "users" }))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("missing field `rows`"));

    assert!(stub.calls().is_empty());
}
