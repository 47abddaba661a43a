//! Backend value decoding.
//!
//! Both backends store SQLite storage classes, so every cell is decoded into
//! [`SqlValue`] by its runtime type rather than by the declared column type.
//! Rendering then goes through `SqlValue`'s `Display` alone.

use crate::error::{DbError, DbResult};
use crate::models::SqlValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Decode rows from a backend into column names and `SqlValue`s.
pub trait RowToValues {
    /// Column names in statement order.
    fn column_names(&self) -> Vec<String>;

    /// Every cell of this row, aligned with `column_names`.
    fn to_values(&self) -> DbResult<Vec<SqlValue>>;
}

impl RowToValues for SqliteRow {
    fn column_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }

    fn to_values(&self) -> DbResult<Vec<SqlValue>> {
        (0..self.len())
            .map(|idx| sqlite::decode_column(self, idx))
            .collect()
    }
}

impl From<libsql::Value> for SqlValue {
    fn from(value: libsql::Value) -> Self {
        match value {
            libsql::Value::Null => SqlValue::Null,
            libsql::Value::Integer(v) => SqlValue::Integer(v),
            libsql::Value::Real(v) => SqlValue::Real(v),
            libsql::Value::Text(v) => SqlValue::Text(v),
            libsql::Value::Blob(v) => SqlValue::Blob(v),
        }
    }
}

/// Decode one libSQL row of `column_count` cells.
pub fn decode_libsql_row(row: &libsql::Row, column_count: i32) -> DbResult<Vec<SqlValue>> {
    (0..column_count)
        .map(|idx| {
            row.get_value(idx)
                .map(SqlValue::from)
                .map_err(DbError::scan)
        })
        .collect()
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize) -> DbResult<SqlValue> {
        let raw = row.try_get_raw(idx).map_err(DbError::scan)?;
        if raw.is_null() {
            return Ok(SqlValue::Null);
        }

        let storage_class = raw.type_info().name().to_uppercase();
        let value = match storage_class.as_str() {
            "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(idx).map(SqlValue::Integer),
            "REAL" | "NUMERIC" => row.try_get::<f64, _>(idx).map(SqlValue::Real),
            "BLOB" => row.try_get::<Vec<u8>, _>(idx).map(SqlValue::Blob),
            _ => row.try_get::<String, _>(idx).map(SqlValue::Text),
        };
        value.map_err(DbError::scan)
    }
}
