//! Streamable HTTP transport for the MCP server.
//!
//! Each HTTP session gets its own `MemoryService`; all of them share the same
//! database handle and compiled classifier.

use crate::db::DbPool;
use crate::error::{DbError, DbResult};
use crate::mcp::MemoryService;
use crate::tools::classifier::StatementClassifier;
use crate::transport::{Transport, shutdown_signal};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Open SSE streams can hold the server open; give up after this long.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    pool: Arc<DbPool>,
    classifier: Arc<StatementClassifier>,
    /// Address to bind, `host:port`
    bind_addr: String,
    /// MCP endpoint path
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        pool: Arc<DbPool>,
        classifier: Arc<StatementClassifier>,
        bind_addr: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            classifier,
            bind_addr: bind_addr.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn router(&self) -> axum::Router {
        let pool = self.pool.clone();
        let classifier = self.classifier.clone();
        let service = StreamableHttpService::new(
            move || Ok(MemoryService::new(pool.clone(), classifier.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects "/", so the root endpoint is served as a fallback
        if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        }
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        info!(bind_addr = %self.bind_addr, "Starting MCP server with HTTP transport");

        let listener = TcpListener::bind(&self.bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", self.bind_addr, e),
                "Check that the port is available",
            )
        })?;
        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let notify = shutdown_notify.clone();
        let server = axum::serve(listener, self.router()).with_graceful_shutdown(async move {
            shutdown_signal().await;
            notify.notify_one();
        });

        let outcome = tokio::select! {
            result = server => result.map_err(|e| {
                error!(error = %e, "HTTP server error");
                DbError::internal(format!("HTTP server error: {}", e))
            }),
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)"
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => warn!("Graceful shutdown timeout, forcing exit"),
                    _ = shutdown_signal() => warn!("Received second signal, forcing immediate exit"),
                }
            } => Ok(()),
        };

        info!("Closing database");
        self.pool.close().await;
        outcome
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
