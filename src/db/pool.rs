//! Database handle management.
//!
//! This module opens the single database handle shared by every tool call:
//! a libSQL `Database` for remote servers, or a sqlx `SqlitePool` for local
//! SQLite files.

use crate::db::executor::QueryExecutor;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, DatabaseType};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Backend-specific database handle.
#[derive(Clone)]
pub enum DbPool {
    /// Each operation opens its own lightweight connection from this handle
    Remote(Arc<libsql::Database>),
    /// Capped at one connection so in-memory databases stay shared
    SQLite(SqlitePool),
}

impl DbPool {
    /// Open the database described by `config`.
    ///
    /// Opening a remote handle does not touch the network; call [`DbPool::ping`]
    /// to verify reachability.
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        info!(
            db_type = %config.db_type,
            url = %config.masked_url(),
            "Opening database"
        );

        match config.db_type {
            DatabaseType::Remote => {
                let db = libsql::Builder::new_remote(config.url.clone(), config.auth_token.clone())
                    .build()
                    .await
                    .map_err(|e| {
                        DbError::connection(
                            format!("Failed to open libSQL database: {}", e),
                            "Check the URL format: http://host:port or libsql://host",
                        )
                    })?;
                Ok(DbPool::Remote(Arc::new(db)))
            }
            DatabaseType::SQLite => Self::connect_sqlite(&config.url).await,
        }
    }

    /// Open a local SQLite database, creating the file if it does not exist.
    pub async fn connect_sqlite(url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| {
                DbError::connection(
                    format!("Invalid SQLite connection string: {}", e),
                    "Check the URL format: sqlite:path/to/memory.db or sqlite::memory:",
                )
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                DbError::connection(
                    format!("Failed to connect: {}", e),
                    "Check that the file path exists and is writable",
                )
            })?;
        Ok(DbPool::SQLite(pool))
    }

    /// Verify the database answers a trivial query within `timeout`.
    pub async fn ping(&self, timeout: Duration) -> DbResult<()> {
        debug!(timeout_secs = timeout.as_secs(), "Checking database reachability");
        let executor = QueryExecutor::new();
        match tokio::time::timeout(timeout, executor.fetch_rows(self, "SELECT 1", &[])).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DbError::connection(
                format!("Database is not reachable: {}", e),
                "Check that the libSQL server is running and the URL is correct",
            )),
            Err(_) => Err(DbError::connection(
                format!("Database did not answer within {}s", timeout.as_secs()),
                "Check network connectivity or raise --connect-timeout",
            )),
        }
    }

    /// Close the handle.
    pub async fn close(&self) {
        match self {
            // Remote connections are per-operation and already dropped.
            DbPool::Remote(_) => {}
            DbPool::SQLite(pool) => pool.close().await,
        }
    }

    /// Get the database type for this handle.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::Remote(_) => DatabaseType::Remote,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

impl std::fmt::Debug for DbPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbPool::Remote(_) => f.debug_tuple("Remote").field(&"libsql::Database").finish(),
            DbPool::SQLite(pool) => f.debug_tuple("SQLite").field(pool).finish(),
        }
    }
}
