//! Optional local health-check listener
//!
//! Answers `GET /` and `GET /health` with a fixed status document. Anything
//! else is a 404. Runs beside the stdio MCP service on 127.0.0.1.

use std::net::SocketAddr;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub read_only: bool,
}

async fn health(State(response): State<HealthResponse>) -> Json<HealthResponse> {
    Json(response)
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

pub fn router(read_only: bool) -> Router {
    let response = HealthResponse {
        status: "ok",
        service: "gateway-db-mcp",
        read_only,
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(response)
}

/// Bind the listener on 127.0.0.1
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await
}

/// Serve health checks until the process exits
pub async fn serve(listener: TcpListener, read_only: bool) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Health endpoint listening on http://{}/health", addr);
    }
    axum::serve(listener, router(read_only)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn start(read_only: bool) -> String {
        let listener = bind(0).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, read_only));
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_paths_return_status() {
        let base = start(true).await;

        for path in ["/health", "/"] {
            let response = reqwest::get(format!("{}{}", base, path)).await.unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::OK);

            let body: Value = response.json().await.unwrap();
            assert_eq!(
                body,
                json!({ "status": "ok", "service": "gateway-db-mcp", "read_only": true })
            );
        }
    }

    #[tokio::test]
    async fn test_other_paths_not_found() {
        let base = start(false).await;

        let response = reqwest::get(format!("{}/metrics", base)).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "not found" }));
    }
}
