//! Memory MCP Server Library
//!
//! MCP tools that let AI assistants read and write a tagged long-term memory
//! stored in libSQL (or a local SQLite file).

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::MemoryService;
