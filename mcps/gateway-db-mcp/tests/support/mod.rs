//! Shared fixtures for integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gateway_db_mcp::config::Config;
use gateway_db_mcp::gateway::{Gateway, GatewayResult, Operation};
use gateway_db_mcp::GatewayDbMcpServer;
use serde_json::{json, Value};

/// Stub gateway that records every operation it receives
#[derive(Default)]
pub struct StubGateway {
    calls: Mutex<Vec<Operation>>,
}

impl StubGateway {
    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    async fn call(&self, operation: &Operation) -> GatewayResult<Value> {
        self.calls.lock().unwrap().push(operation.clone());
        Ok(json!([{ "ok": true }]))
    }
}

/// Build a server over a fresh stub
pub fn server(read_only: bool) -> (GatewayDbMcpServer, Arc<StubGateway>) {
    let config = Config {
        read_only,
        ..Config::default()
    };
    let stub = Arc::new(StubGateway::default());
    (GatewayDbMcpServer::with_gateway(config, stub.clone()), stub)
}
