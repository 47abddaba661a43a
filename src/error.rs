//! Error types for the memory MCP server.
//!
//! This module defines all error types using `thiserror`. Every variant that can
//! occur during a tool call renders to the exact text the calling agent sees, so
//! messages are written to be actionable on their own.

use crate::models::TagInfo;
use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("{name} parameter is required")]
    MissingParameter { name: &'static str },

    #[error("dangerous operation not allowed: {keywords} are blocked")]
    DangerousOperation { keywords: String },

    #[error("write operations not allowed in query tool, use execute tool instead")]
    WriteNotAllowed,

    #[error("SELECT not allowed in execute tool, use query tool instead")]
    ReadNotAllowed,

    #[error("multiple statements not allowed, send one statement per call")]
    MultipleStatements,

    #[error("invalid SQL: {message}")]
    InvalidSql { message: String },

    #[error(
        "tags parameter is required when inserting observations. Use broad categories like: homelab, career, drinks, personal. Query 'SELECT name, description FROM tags' to see all available tags."
    )]
    TagsRequired,

    #[error("{}", unknown_tags_message(missing, available.as_deref()))]
    UnknownTags {
        missing: Vec<String>,
        /// None when the tag listing itself could not be read
        available: Option<Vec<TagInfo>>,
    },

    #[error("error checking tag '{name}': {message}")]
    TagLookup { name: String, message: String },

    #[error("observation created but failed to link tags: {message}")]
    PartialSuccess { observation_id: i64, message: String },

    #[error("{}: {message}", kind.prefix())]
    Database {
        kind: DatabaseErrorKind,
        message: String,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Stage or constraint class of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    /// Statement failed while running a read
    Query,
    /// Column list could not be read
    Columns,
    /// A row could not be decoded
    Scan,
    /// Statement failed while running a write
    Execute,
    /// UNIQUE constraint violated
    Duplicate,
    /// FOREIGN KEY constraint violated
    ForeignKey,
    /// CHECK constraint violated
    Check,
}

impl DatabaseErrorKind {
    /// Text prepended to the driver message.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Query => "query error",
            Self::Columns => "columns error",
            Self::Scan => "scan error",
            Self::Execute => "execute error",
            Self::Duplicate => "duplicate entry",
            Self::ForeignKey => "referenced entity does not exist",
            Self::Check => "validation failed (empty or invalid value)",
        }
    }

    /// Classify a failed write by the constraint named in the driver message.
    pub fn from_execute_message(message: &str) -> Self {
        if message.contains("UNIQUE constraint") {
            Self::Duplicate
        } else if message.contains("FOREIGN KEY constraint") {
            Self::ForeignKey
        } else if message.contains("CHECK constraint") {
            Self::Check
        } else {
            Self::Execute
        }
    }
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a dangerous operation error listing the blocked keywords.
    pub fn dangerous_operation(keywords: &[&str]) -> Self {
        Self::DangerousOperation {
            keywords: keywords.join(", "),
        }
    }

    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::database(DatabaseErrorKind::Query, err)
    }

    pub fn columns(err: impl std::fmt::Display) -> Self {
        Self::database(DatabaseErrorKind::Columns, err)
    }

    pub fn scan(err: impl std::fmt::Display) -> Self {
        Self::database(DatabaseErrorKind::Scan, err)
    }

    /// Create a write error, classified by the constraint it violated.
    pub fn execute(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        Self::Database {
            kind: DatabaseErrorKind::from_execute_message(&message),
            message,
        }
    }

    fn database(kind: DatabaseErrorKind, err: impl std::fmt::Display) -> Self {
        Self::Database {
            kind,
            message: err.to_string(),
        }
    }

    pub fn invalid_sql(err: impl std::fmt::Display) -> Self {
        Self::InvalidSql {
            message: err.to_string(),
        }
    }

    pub fn tag_lookup(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::TagLookup {
            name: name.into(),
            message: err.to_string(),
        }
    }

    pub fn partial_success(observation_id: i64, err: impl std::fmt::Display) -> Self {
        Self::PartialSuccess {
            observation_id,
            message: err.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Render this error as a tool-level error result.
    ///
    /// Tool calls never fail at the protocol level: the agent receives the
    /// message as content with `is_error` set and can correct its request.
    pub fn into_tool_result(self) -> CallToolResult {
        CallToolResult::error(vec![Content::text(self.to_string())])
    }
}

fn unknown_tags_message(missing: &[String], available: Option<&[TagInfo]>) -> String {
    let missing = missing.join(", ");
    match available {
        None => format!("unknown tag(s): {missing}"),
        Some(tags) => {
            let listing = tags
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "unknown tag(s): {missing}\n\nAvailable tags:\n{listing}\n\nIf you need a new tag, ask the user first before creating it with: INSERT INTO tags (name, description) VALUES ('name', 'description')"
            )
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
