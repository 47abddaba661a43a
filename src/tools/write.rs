//! Write operation tools.
//!
//! This module implements the `execute` MCP tool for INSERT, UPDATE and DELETE.
//! Inserts into `observations` additionally require at least one known tag,
//! which is linked to the new row once the insert succeeds.

use crate::db::{DbPool, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::tools::classifier::StatementClassifier;
use crate::tools::format::{format_observation_created, format_write_result};
use crate::tools::tags::{TagValidator, driver_message, parse_tag_names};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Input for the execute tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ExecuteInput {
    /// SQL statement to execute (INSERT, UPDATE, DELETE)
    #[serde(default)]
    pub sql: String,
    /// Comma-separated tag names. Required when inserting into observations.
    #[serde(default)]
    pub tags: Option<String>,
}

pub struct WriteToolHandler {
    pool: Arc<DbPool>,
    classifier: Arc<StatementClassifier>,
    executor: QueryExecutor,
}

impl WriteToolHandler {
    pub fn new(pool: Arc<DbPool>, classifier: Arc<StatementClassifier>) -> Self {
        Self {
            pool,
            classifier,
            executor: QueryExecutor::new(),
        }
    }

    pub async fn execute(&self, input: ExecuteInput) -> DbResult<String> {
        let sql = input.sql;
        if sql.trim().is_empty() {
            return Err(DbError::MissingParameter { name: "sql" });
        }

        if let Err(e) = self.classifier.validate(&sql, true) {
            warn!(error = %e, "Rejected execute statement");
            return Err(e);
        }

        let tags = input.tags.unwrap_or_default();
        if self.classifier.is_observation_insert(&sql) {
            return self.insert_observation(&sql, &tags).await;
        }

        let mut result = self.executor.execute_write(&self.pool, &sql, &[]).await?;
        if !self.classifier.is_insert(&sql) {
            result.last_insert_id = 0;
        }
        info!(
            rows_affected = result.rows_affected,
            last_insert_id = result.last_insert_id,
            "Write operation executed"
        );
        Ok(format_write_result(&result))
    }

    /// Validate tags, insert the observation, then link each tag to it.
    ///
    /// The insert and the links are separate statements; a failed link leaves
    /// the observation and any earlier links in place.
    async fn insert_observation(&self, sql: &str, tags: &str) -> DbResult<String> {
        if tags.trim().is_empty() {
            warn!("Observation insert without tags");
            return Err(DbError::TagsRequired);
        }

        let validator = TagValidator::new(&self.pool);
        let tag_ids = validator.validate_tags(&parse_tag_names(tags)).await?;

        let result = self.executor.execute_write(&self.pool, sql, &[]).await?;
        if result.rows_affected == 0 {
            info!("Observation insert matched no rows, nothing to tag");
            return Ok(format_write_result(&result));
        }

        let observation_id = result.last_insert_id;
        if let Err(e) = validator.link_tags(observation_id, &tag_ids).await {
            warn!(observation_id, error = %e, "Observation created but tag linking failed");
            return Err(DbError::partial_success(observation_id, driver_message(e)));
        }

        info!(observation_id, tags = %tags, "Observation created");
        Ok(format_observation_created(observation_id, tags))
    }
}
