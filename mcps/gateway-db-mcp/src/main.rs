//! Gateway DB MCP Server
//!
//! Serves database gateway tools over stdio, with an optional local health
//! listener.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gateway_db_mcp::config::Overrides;
use gateway_db_mcp::{health, Config, GatewayDbMcpServer};
use mcp_common::LogFormat;
use rmcp::{transport::stdio, ServiceExt};

#[derive(Parser, Debug)]
#[command(name = "gateway-db-mcp", version, about = "MCP server for a remote PostgreSQL gateway API")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "GATEWAY_DB_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Gateway API base URL
    #[arg(long, env = "GATEWAY_BASE_URL")]
    base_url: Option<String>,

    /// Gateway API key
    #[arg(long, env = "GATEWAY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Client name sent in X-Client-Info
    #[arg(long, env = "GATEWAY_CLIENT_NAME")]
    client_name: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Refuse mutating tools and write SQL (env accepts 1/0, yes/no, on/off)
    #[arg(
        long,
        env = "GATEWAY_READ_ONLY",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    read_only: bool,

    /// Serve GET /health on this local port
    #[arg(long, env = "GATEWAY_HEALTH_PORT")]
    health_port: Option<u16>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            client_name: self.client_name.clone(),
            timeout_secs: self.timeout_secs,
            // A flag can only turn read-only on; the config file may also set it
            read_only: self.read_only.then_some(true),
            health_port: self.health_port,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    mcp_common::init_tracing("gateway_db_mcp", LogFormat::from_env())?;

    tracing::info!("Starting Gateway DB MCP Server");

    let config = Config::load(cli.config.as_deref(), cli.overrides())
        .context("failed to load configuration")?;

    tracing::info!(
        base_url = %config.gateway.base_url,
        mode = config.access_mode().as_str(),
        api_key_configured = !config.gateway.api_key.is_empty(),
        "Configuration loaded"
    );

    if let Some(port) = config.health.port {
        let listener = health::bind(port)
            .await
            .with_context(|| format!("failed to bind health endpoint on port {}", port))?;
        let read_only = config.access_mode().is_restricted();
        tokio::spawn(async move {
            if let Err(e) = health::serve(listener, read_only).await {
                tracing::error!("Health endpoint stopped: {}", e);
            }
        });
    }

    let server = GatewayDbMcpServer::new(config).context("failed to create gateway client")?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
