//! Stdio transport for the MCP server.
//!
//! Messages are read from stdin and responses written to stdout, so nothing
//! else in the process may print to stdout.

use crate::db::DbPool;
use crate::error::{DbError, DbResult};
use crate::mcp::MemoryService;
use crate::tools::classifier::StatementClassifier;
use crate::transport::{Transport, shutdown_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

pub struct StdioTransport {
    pool: Arc<DbPool>,
    classifier: Arc<StatementClassifier>,
}

impl StdioTransport {
    pub fn new(pool: Arc<DbPool>, classifier: Arc<StatementClassifier>) -> Self {
        Self { pool, classifier }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = MemoryService::new(self.pool.clone(), self.classifier.clone());
        let running_service = service
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let interrupted = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_) => info!("Stdio transport closed"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.pool.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = shutdown_signal() => true,
        };

        info!("Closing database");
        self.pool.close().await;

        if interrupted {
            // A blocked stdin read cannot be cancelled from here.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdio_transport_creation() {
        let pool = Arc::new(DbPool::connect_sqlite("sqlite::memory:").await.unwrap());
        let transport = StdioTransport::new(pool, Arc::new(StatementClassifier::new().unwrap()));
        assert_eq!(transport.name(), "stdio");
    }
}
