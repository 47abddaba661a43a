//! MCP tool implementations.
//!
//! This module contains the tool handlers and the logic they share:
//! - `query`: Execute read statements
//! - `execute`: Execute write statements, enforcing tags on observation inserts
//! - `classifier`: Leading-keyword statement classification
//! - `tags`: Tag validation and linking

pub mod classifier;
pub mod format;
pub mod query;
pub mod tags;
pub mod write;

pub use classifier::{Classification, StatementCategory, StatementClassifier};
pub use query::{QueryInput, QueryToolHandler};
pub use tags::{TagValidator, parse_tag_names};
pub use write::{ExecuteInput, WriteToolHandler};
