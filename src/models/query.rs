//! Query-related data models.
//!
//! This module defines the backend-neutral values and results produced by the
//! executor, independent of whether rows came from libSQL or SQLite.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;

/// A positional bind value for the server's own statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Int(i64),
    Text(String),
}

impl From<i64> for QueryParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for QueryParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A single cell value, using SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

/// Text form used when rendering rows.
///
/// Blobs are shown as UTF-8 when valid, otherwise base64.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => f.write_str(s),
                Err(_) => f.write_str(&STANDARD.encode(bytes)),
            },
        }
    }
}

/// Rows returned by a read statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names, in statement order
    pub columns: Vec<String>,
    /// One entry per row, each aligned with `columns`
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate rows as (column, value) pairs in column order.
    pub fn iter_rows(&self) -> impl Iterator<Item = Vec<(&str, &SqlValue)>> + '_ {
        self.rows.iter().map(|row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteResult {
    pub rows_affected: u64,
    /// Rowid of the last inserted row on the executing connection; 0 when none
    pub last_insert_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Integer(-42).to_string(), "-42");
        assert_eq!(SqlValue::Real(1.5).to_string(), "1.5");
        assert_eq!(SqlValue::Text("café".to_string()).to_string(), "café");
    }

    #[test]
    fn test_blob_display() {
        assert_eq!(SqlValue::Blob(b"hello".to_vec()).to_string(), "hello");
        assert_eq!(SqlValue::Blob(vec![0xff, 0xfe]).to_string(), "//4=");
    }

    #[test]
    fn test_iter_rows_pairs_columns() {
        let result = QueryResult {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec![SqlValue::Integer(1), SqlValue::Text("a".to_string())]],
        };
        let rows: Vec<_> = result.iter_rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], ("id", &SqlValue::Integer(1)));
        assert_eq!(rows[0][1].0, "name");
    }

    #[test]
    fn test_param_conversions() {
        assert_eq!(QueryParam::from(3), QueryParam::Int(3));
        assert_eq!(QueryParam::from("x"), QueryParam::Text("x".to_string()));
    }
}
