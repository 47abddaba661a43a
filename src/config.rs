//! Configuration handling for the memory MCP server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, DatabaseType};
use clap::{Parser, ValueEnum};
use std::time::Duration;
use url::Url;

pub const DEFAULT_DATABASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for remote clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the memory MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "memory-mcp-server",
    about = "MCP server giving AI assistants a tagged long-term memory in libSQL",
    version
)]
pub struct Config {
    /// Database URL: http(s)://, libsql:// or ws(s):// for a libSQL server,
    /// sqlite:path or sqlite::memory: for a local file
    #[arg(
        short = 'd',
        long = "database-url",
        value_name = "URL",
        default_value = DEFAULT_DATABASE_URL,
        env = "LIBSQL_URL"
    )]
    pub database_url: String,

    /// Auth token for the libSQL server
    #[arg(
        long,
        value_name = "TOKEN",
        default_value = "",
        hide_default_value = true,
        env = "LIBSQL_AUTH_TOKEN",
        hide_env_values = true
    )]
    pub auth_token: String,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Seconds allowed for the startup reachability check
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth_token: String::new(),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Build the database connection settings.
    ///
    /// Remote URLs must parse as URLs with a host.
    pub fn connection_config(&self) -> DbResult<ConnectionConfig> {
        let config = ConnectionConfig::new(&self.database_url, &self.auth_token)
            .map_err(|e| DbError::invalid_config(e.to_string()))?;

        if config.db_type == DatabaseType::Remote {
            let url = Url::parse(&config.url)
                .map_err(|e| DbError::invalid_config(format!("Invalid database URL: {e}")))?;
            if url.host_str().is_none_or(str::is_empty) {
                return Err(DbError::invalid_config(
                    "Database URL must include a host",
                ));
            }
        }

        Ok(config)
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
