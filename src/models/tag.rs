//! Tag-related data models.

use std::fmt;

/// A row of the `tags` table as shown to agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub description: Option<String>,
}

impl TagInfo {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }
}

/// Renders as `name (description)`, or the bare name when no description is set.
impl fmt::Display for TagInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}
