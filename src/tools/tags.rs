//! Tag validation and linking for observation inserts.

use crate::db::{DbPool, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::models::{QueryParam, SqlValue, TagInfo};
use tracing::debug;

const TAG_ID_BY_NAME: &str = "SELECT id FROM tags WHERE name = ?";
const TAG_LISTING: &str = "SELECT name, description FROM tags ORDER BY name";
const LINK_TAG: &str = "INSERT INTO observation_tags (observation_id, tag_id) VALUES (?, ?)";

/// Split a comma-separated tag list into trimmed, non-empty names.
///
/// Order is preserved and duplicates are kept.
pub fn parse_tag_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves tag names against the `tags` table and links them to observations.
pub struct TagValidator<'a> {
    pool: &'a DbPool,
    executor: QueryExecutor,
}

impl<'a> TagValidator<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self {
            pool,
            executor: QueryExecutor::new(),
        }
    }

    /// Look up every name and return the tag ids in the same order.
    ///
    /// Unknown names are collected and reported together with the current
    /// tag listing so the caller can correct the request.
    pub async fn validate_tags(&self, names: &[String]) -> DbResult<Vec<i64>> {
        let mut tag_ids = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            let found = self
                .executor
                .fetch_optional_i64(self.pool, TAG_ID_BY_NAME, &[QueryParam::from(name.as_str())])
                .await
                .map_err(|e| DbError::tag_lookup(name, driver_message(e)))?;
            match found {
                Some(id) => tag_ids.push(id),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            debug!(missing = ?missing, "Unknown tags requested");
            let available = self.available_tags().await.ok();
            return Err(DbError::UnknownTags { missing, available });
        }

        Ok(tag_ids)
    }

    /// All tags, ordered by name.
    pub async fn available_tags(&self) -> DbResult<Vec<TagInfo>> {
        let result = self.executor.fetch_rows(self.pool, TAG_LISTING, &[]).await?;
        Ok(result
            .rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let name = cells.next().map(cell_text).unwrap_or_default();
                let description = cells.next().filter(|v| !v.is_null()).map(cell_text);
                TagInfo::new(name, description)
            })
            .collect())
    }

    /// Insert one `observation_tags` row per tag id, stopping at the first failure.
    pub async fn link_tags(&self, observation_id: i64, tag_ids: &[i64]) -> DbResult<()> {
        for &tag_id in tag_ids {
            self.executor
                .execute_write(
                    self.pool,
                    LINK_TAG,
                    &[QueryParam::Int(observation_id), QueryParam::Int(tag_id)],
                )
                .await?;
            debug!(observation_id, tag_id, "Linked tag");
        }
        Ok(())
    }
}

fn cell_text(value: SqlValue) -> String {
    match value {
        SqlValue::Text(s) => s,
        other => other.to_string(),
    }
}

/// Driver text without the stage prefix added by the executor.
pub(crate) fn driver_message(err: DbError) -> String {
    match err {
        DbError::Database { message, .. } => message,
        other => other.to_string(),
    }
}
