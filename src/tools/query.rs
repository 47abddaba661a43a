//! Query execution tool.
//!
//! This module implements the `query` MCP tool for read statements.
//! Write and schema-mutating statements are rejected before reaching the database.

use crate::db::{DbPool, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::tools::classifier::StatementClassifier;
use crate::tools::format::format_rows;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the query tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct QueryInput {
    /// SQL SELECT statement to execute
    #[serde(default)]
    pub sql: String,
}

pub struct QueryToolHandler {
    pool: Arc<DbPool>,
    classifier: Arc<StatementClassifier>,
    executor: QueryExecutor,
}

impl QueryToolHandler {
    pub fn new(pool: Arc<DbPool>, classifier: Arc<StatementClassifier>) -> Self {
        Self {
            pool,
            classifier,
            executor: QueryExecutor::new(),
        }
    }

    /// Run a read statement and render the rows as text.
    pub async fn query(&self, input: QueryInput) -> DbResult<String> {
        let sql = input.sql;
        if sql.trim().is_empty() {
            return Err(DbError::MissingParameter { name: "sql" });
        }

        if let Err(e) = self.classifier.validate(&sql, false) {
            warn!(error = %e, "Rejected query statement");
            return Err(e);
        }

        let result = self.executor.fetch_rows(&self.pool, &sql, &[]).await?;
        info!(
            rows = result.row_count(),
            columns = result.columns.len(),
            "Query executed"
        );

        Ok(format_rows(&result))
    }
}
