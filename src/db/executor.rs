//! Query execution engine.
//!
//! This module runs statements against the shared [`DbPool`] and returns
//! backend-neutral results.
//!
//! # Architecture
//!
//! The executor uses backend-specific implementations organized in submodules:
//! - `remote`: libSQL over HTTP, one connection per operation
//! - `sqlite`: local SQLite through sqlx
//!
//! No timeouts are applied here. Callers that need to abort a statement drop
//! the returned future.

use crate::db::pool::DbPool;
use crate::db::types::RowToValues;
use crate::error::{DbError, DbResult};
use crate::impl_db_dispatch;
use crate::models::{QueryParam, QueryResult, WriteResult};
use std::time::Instant;
use tracing::debug;

/// Query executor that handles statement execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Run a read statement and collect every row.
    pub async fn fetch_rows(
        &self,
        pool: &DbPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<QueryResult> {
        let start = Instant::now();
        debug!(sql = %sql, params = params.len(), "Executing query");

        let result = impl_db_dispatch!(pool, {
            Remote(db) => remote::fetch_rows(db, sql, params).await?,
            SQLite(p) => sqlite::fetch_rows(p, sql, params).await?,
        });

        debug!(
            rows = result.row_count(),
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Query finished"
        );
        Ok(result)
    }

    /// Run a write statement and report affected rows and the last insert id.
    ///
    /// The driver's insert id is connection-wide, so it is only passed through
    /// when the statement changed at least one row. Callers that run non-insert
    /// writes must still discard it.
    pub async fn execute_write(
        &self,
        pool: &DbPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<WriteResult> {
        let start = Instant::now();
        debug!(sql = %sql, params = params.len(), "Executing write operation");

        let mut result = impl_db_dispatch!(pool, {
            Remote(db) => remote::execute_write(db, sql, params).await?,
            SQLite(p) => sqlite::execute_write(p, sql, params).await?,
        });
        if result.rows_affected == 0 {
            result.last_insert_id = 0;
        }

        debug!(
            rows_affected = result.rows_affected,
            last_insert_id = result.last_insert_id,
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Write finished"
        );
        Ok(result)
    }

    /// Run a single-column integer lookup, returning the first row's value.
    pub async fn fetch_optional_i64(
        &self,
        pool: &DbPool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<Option<i64>> {
        let result = self.fetch_rows(pool, sql, params).await?;
        match result.rows.first().and_then(|row| row.first()) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| DbError::scan(format!("expected integer, got {value}"))),
        }
    }
}

mod remote {
    use super::*;
    use crate::db::params::to_libsql_values;
    use crate::db::types::decode_libsql_row;
    use libsql::Database;

    pub async fn fetch_rows(
        db: &Database,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<QueryResult> {
        let conn = db.connect().map_err(DbError::query)?;
        let mut rows = conn
            .query(sql, to_libsql_values(params))
            .await
            .map_err(DbError::query)?;

        let column_count = rows.column_count();
        let columns = (0..column_count)
            .map(|idx| {
                rows.column_name(idx)
                    .map(str::to_string)
                    .ok_or_else(|| DbError::columns(format!("column {idx} has no name")))
            })
            .collect::<DbResult<Vec<_>>>()?;

        let mut values = Vec::new();
        while let Some(row) = rows.next().await.map_err(DbError::scan)? {
            values.push(decode_libsql_row(&row, column_count)?);
        }

        Ok(QueryResult {
            columns,
            rows: values,
        })
    }

    pub async fn execute_write(
        db: &Database,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<WriteResult> {
        let conn = db.connect().map_err(DbError::execute)?;
        let rows_affected = conn
            .execute(sql, to_libsql_values(params))
            .await
            .map_err(DbError::execute)?;

        Ok(WriteResult {
            rows_affected,
            last_insert_id: conn.last_insert_rowid(),
        })
    }
}

mod sqlite {
    use super::*;
    use crate::db::params::bind_sqlite_param;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqliteRow;

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<QueryResult> {
        let rows: Vec<SqliteRow> = if params.is_empty() {
            use sqlx::Executor;
            pool.fetch_all(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_sqlite_param(query, param);
            }
            query.fetch_all(pool).await
        }
        .map_err(DbError::query)?;

        let columns = rows
            .first()
            .map(RowToValues::column_names)
            .unwrap_or_default();
        let values = rows
            .iter()
            .map(RowToValues::to_values)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(QueryResult {
            columns,
            rows: values,
        })
    }

    pub async fn execute_write(
        pool: &SqlitePool,
        sql: &str,
        params: &[QueryParam],
    ) -> DbResult<WriteResult> {
        let result = if params.is_empty() {
            use sqlx::Executor;
            pool.execute(sql).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_sqlite_param(query, param);
            }
            query.execute(pool).await
        }
        .map_err(DbError::execute)?;

        Ok(WriteResult {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        })
    }
}
