//! Configuration for the Gateway DB MCP server
//!
//! Values are layered, lowest priority first:
//! 1. Built-in defaults
//! 2. TOML file (`--config` / `GATEWAY_DB_CONFIG_PATH`, else `~/.binks/gateway-db.toml` if present)
//! 3. Environment variables and CLI flags
//!
//! The result is validated once and never changes for the life of the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether mutating operations may reach the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Every tool forwards to the gateway
    #[default]
    Normal,
    /// Mutating tools are refused and SQL text is screened for write keywords
    Restricted,
}

impl AccessMode {
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            Self::Restricted
        } else {
            Self::Normal
        }
    }

    pub fn is_restricted(self) -> bool {
        self == Self::Restricted
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "read-write",
            Self::Restricted => "read-only",
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Block mutating operations
    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub health: HealthConfig,
}

/// Connection settings for the remote Gateway API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the Gateway API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as a bearer token and as the `apikey` header
    #[serde(default)]
    pub api_key: String,

    /// Value of the `X-Client-Info` header
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Optional local health-check listener
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Port on 127.0.0.1; the listener is disabled when unset
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_base_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_client_name() -> String {
    "gateway-db-mcp".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            client_name: default_client_name(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub client_name: Option<String>,
    pub timeout_secs: Option<u64>,
    pub read_only: Option<bool>,
    pub health_port: Option<u16>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid gateway base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("gateway timeout_secs must be greater than zero")]
    ZeroTimeout,
}

impl Config {
    /// Load, layer and validate the configuration
    ///
    /// An explicitly requested file must exist and parse. The default file
    /// location is only read when it exists.
    pub fn load(explicit_path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `~/.binks/gateway-db.toml`
    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".binks").join("gateway-db.toml"))
    }

    /// Apply CLI/environment values on top of file values
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.base_url {
            self.gateway.base_url = url;
        }
        if let Some(key) = overrides.api_key {
            self.gateway.api_key = key;
        }
        if let Some(name) = overrides.client_name {
            self.gateway.client_name = name;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.gateway.timeout_secs = secs;
        }
        if let Some(read_only) = overrides.read_only {
            self.read_only = read_only;
        }
        if let Some(port) = overrides.health_port {
            self.health.port = Some(port);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.gateway.base_url;
        let parsed = url::Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.gateway.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    pub fn access_mode(&self) -> AccessMode {
        AccessMode::from_read_only(self.read_only)
    }
}
