//! Memory MCP Server - Main entry point.
//!
//! Serves the `query` and `execute` tools over a libSQL memory database
//! (entities, observations, relations, tags) for AI assistants.

use clap::Parser;
use memory_mcp_server::config::{Config, TransportMode};
use memory_mcp_server::db::DbPool;
use memory_mcp_server::error::DbError;
use memory_mcp_server::tools::StatementClassifier;
use memory_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr; stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn open_database(config: &Config) -> Result<DbPool, DbError> {
    let connection_config = config.connection_config()?;
    let pool = DbPool::connect(&connection_config).await?;
    pool.ping(config.connect_timeout_duration()).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting Memory MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = match open_database(&config).await {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            match e.suggestion() {
                Some(suggestion) => error!(error = %e, suggestion, "Failed to open database"),
                None => error!(error = %e, "Failed to open database"),
            }
            std::process::exit(1);
        }
    };
    info!(db_type = %pool.db_type(), "Database reachable");

    let classifier = Arc::new(
        StatementClassifier::new()
            .map_err(|e| DbError::internal(format!("Invalid statement pattern: {e}")))?,
    );

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(pool, classifier).run().await,
        TransportMode::Http => {
            info!(
                bind_addr = %config.http_bind_addr(),
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            HttpTransport::new(
                pool,
                classifier,
                config.http_bind_addr(),
                &config.mcp_endpoint,
            )
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
