//! MCP service implementation using rmcp.
//!
//! This module defines the MemoryService struct exposing the `query` and
//! `execute` tools and the `memory://schema` resource via the rmcp macros.
//! Every tool failure is reported as an error result, never as a protocol error.

use crate::db::DbPool;
use crate::error::{DbError, DbResult};
use crate::mcp::resources::{SCHEMA_URI, schema_contents, schema_resource};
use crate::tools::classifier::StatementClassifier;
use crate::tools::query::{QueryInput, QueryToolHandler};
use crate::tools::write::{ExecuteInput, WriteToolHandler};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ListResourcesResult, PaginatedRequestParam,
        ProtocolVersion, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone)]
pub struct MemoryService {
    /// Shared database handle for all tool calls
    pool: Arc<DbPool>,
    /// Compiled statement patterns, built once at startup
    classifier: Arc<StatementClassifier>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl MemoryService {
    pub fn new(pool: Arc<DbPool>, classifier: Arc<StatementClassifier>) -> Self {
        Self {
            pool,
            classifier,
            tool_router: Self::tool_router(),
        }
    }

    /// Run the query tool without a cancellation context.
    pub async fn run_query(&self, input: QueryInput) -> CallToolResult {
        let handler = QueryToolHandler::new(self.pool.clone(), self.classifier.clone());
        into_call_result(handler.query(input).await)
    }

    /// Run the execute tool without a cancellation context.
    pub async fn run_execute(&self, input: ExecuteInput) -> CallToolResult {
        let handler = WriteToolHandler::new(self.pool.clone(), self.classifier.clone());
        into_call_result(handler.execute(input).await)
    }
}

fn into_call_result(result: DbResult<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => e.into_tool_result(),
    }
}

/// Race `work` against the request's cancellation token.
///
/// A cancelled token drops `work`, aborting any in-flight database call.
async fn until_cancelled(
    ct: &CancellationToken,
    work: impl Future<Output = CallToolResult>,
) -> CallToolResult {
    tokio::select! {
        biased;
        _ = ct.cancelled() => {
            debug!("Tool call cancelled by client");
            DbError::Cancelled.into_tool_result()
        }
        result = work => result,
    }
}

#[tool_router]
impl MemoryService {
    #[tool(
        description = "Execute a SELECT query and return results.\n\nAll observations are tagged with broad categories. Check tags first to find what you're looking for:\n  SELECT name, description FROM tags\n\nThen filter observations by tag via observation_tags junction table. Build whatever query you need from there."
    )]
    async fn query(
        &self,
        Parameters(input): Parameters<QueryInput>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(until_cancelled(&context.ct, self.run_query(input)).await)
    }

    #[tool(
        description = "Execute INSERT, UPDATE, or DELETE statement. Use this for writing data.\n\nIMPORTANT: When inserting observations, you MUST provide the tags parameter.\nTags are broad categories: homelab, career, drinks, personal.\nQuery 'SELECT name, description FROM tags' to see available tags.\nIf you need a new tag, ask the user first before creating it."
    )]
    async fn execute(
        &self,
        Parameters(input): Parameters<ExecuteInput>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(until_cancelled(&context.ct, self.run_execute(input)).await)
    }
}

#[tool_handler]
impl ServerHandler for MemoryService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "memory-mcp".to_owned(),
                title: Some("Memory MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Long-term memory stored as entities, observations, relations and tags.\n\
                \n\
                ## Workflow\n\
                1. Read `memory://schema` for the table layout\n\
                2. Run `SELECT name, description FROM tags` with `query` to see the categories\n\
                3. Use `query` for reads and `execute` for INSERT, UPDATE and DELETE\n\
                \n\
                ## Observations\n\
                Inserting into `observations` requires the `tags` argument on `execute`,\n\
                e.g. 'homelab' or 'career,personal'. Unknown tags are rejected with the list\n\
                of valid ones. Ask the user before creating a new tag.\n\
                \n\
                ## Blocked statements\n\
                DROP, TRUNCATE, ALTER, CREATE, ATTACH and DETACH are rejected by both tools."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(vec![schema_resource()]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri == SCHEMA_URI {
            Ok(ReadResourceResult {
                contents: vec![schema_contents()],
            })
        } else {
            Err(McpError::resource_not_found(
                format!("unknown resource: {}", request.uri),
                None,
            ))
        }
    }
}
