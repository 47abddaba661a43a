//! Data models for the memory MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod tag;

// Re-export commonly used types
pub use connection::{ConnectionConfig, DatabaseType};
pub use query::{QueryParam, QueryResult, SqlValue, WriteResult};
pub use tag::TagInfo;
