//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Handle management for the remote libSQL and local SQLite backends
//! - Statement execution
//! - Value decoding
//! - Database dispatch macros for reducing code duplication

pub mod executor;
#[macro_use]
pub mod macros;
pub mod params;
pub mod pool;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::DbPool;
pub use types::RowToValues;
