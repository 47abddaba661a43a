//! Static MCP resources.

use rmcp::model::{AnnotateAble, RawResource, Resource, ResourceContents};

pub const SCHEMA_URI: &str = "memory://schema";
pub const SCHEMA_NAME: &str = "Database schema";
const SCHEMA_DESCRIPTION: &str = "Table definitions for the memory database";
const TEXT_PLAIN: &str = "text/plain";

pub const SCHEMA_TEXT: &str = "-- memory database schema

entities (id, name, entity_type, created_at)
observations (id, entity_id, content, created_at)
relations (id, from_id, to_id, relation_type, created_at)
tags (id, name, description, created_at)
observation_tags (observation_id, tag_id)

All observations are categorized via tags. Query tags first to see available categories:
  SELECT name, description FROM tags

When inserting observations, the 'tags' parameter is required in execute tool.
";

/// Listing entry for the schema resource.
pub fn schema_resource() -> Resource {
    let mut raw = RawResource::new(SCHEMA_URI, SCHEMA_NAME);
    raw.description = Some(SCHEMA_DESCRIPTION.to_string());
    raw.mime_type = Some(TEXT_PLAIN.to_string());
    raw.no_annotation()
}

/// Contents of the schema resource.
pub fn schema_contents() -> ResourceContents {
    let mut contents = ResourceContents::text(SCHEMA_TEXT, SCHEMA_URI);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(TEXT_PLAIN.to_string());
    }
    contents
}
