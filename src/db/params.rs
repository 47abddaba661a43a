//! Parameter binding utilities for database queries.
//!
//! Converts `QueryParam` values into each backend's bind representation.

use crate::models::QueryParam;
use sqlx::Sqlite;
use sqlx::sqlite::SqliteArguments;

/// Bind a parameter to a SQLite query.
pub(crate) fn bind_sqlite_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Text(v) => query.bind(v.as_str()),
    }
}

/// Convert parameters into positional libSQL values.
pub(crate) fn to_libsql_values(params: &[QueryParam]) -> Vec<libsql::Value> {
    params
        .iter()
        .map(|param| match param {
            QueryParam::Int(v) => libsql::Value::Integer(*v),
            QueryParam::Text(v) => libsql::Value::Text(v.clone()),
        })
        .collect()
}
