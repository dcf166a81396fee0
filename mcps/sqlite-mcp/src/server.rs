//! SQLite MCP Server implementation
//!
//! Registers the tool and resource dispatchers with rmcp. This is where the
//! read-only gate lives: without write permission `execute_statement` is never
//! registered, so clients neither see nor reach it.

use std::sync::Arc;

use mcp_common::{
    async_trait, propagate_failure, CallToolResult, EmbeddableError, EmbeddableMcp,
    EmbeddableResult, McpError, McpResult, Resource, ResourceContents, ResourceTemplate, Tool,
};
use rmcp::{
    model::{
        CallToolRequestParam, JsonObject, ListResourceTemplatesResult, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    RoleServer, ServerHandler,
};
use serde_json::Value;

use crate::database::Database;
use crate::resources::{ResourceError, SchemaResources};
use crate::tools::{QueryTools, WRITE_TOOLS};

const SERVER_DESCRIPTION: &str = "SQLite MCP Server - list tables, inspect schemas, \
     and run SQL against a single SQLite database.";

/// The SQLite MCP Server
#[derive(Clone)]
pub struct SqliteMcpServer {
    db: Arc<Database>,
    tools: QueryTools,
    resources: SchemaResources,
    registered_tools: Arc<Vec<Tool>>,
    allow_writes: bool,
}

impl SqliteMcpServer {
    /// Wire both dispatchers to `db`
    ///
    /// `allow_writes` decides whether write tools are registered. It is
    /// independent of the connection mode; a read-only connection still
    /// refuses writes at the SQLite level.
    pub fn new(db: Arc<Database>, allow_writes: bool) -> Self {
        let tools = QueryTools::new(db.clone());
        let resources = SchemaResources::new(db.clone());

        let registered_tools = tools
            .list()
            .into_iter()
            .filter(|tool| {
                let name: &str = &tool.name;
                let skip = !allow_writes && WRITE_TOOLS.contains(&name);
                if skip {
                    tracing::info!("Skipping write tool '{}' in read-only mode", tool.name);
                }
                !skip
            })
            .collect();

        Self {
            db,
            tools,
            resources,
            registered_tools: Arc::new(registered_tools),
            allow_writes,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn allow_writes(&self) -> bool {
        self.allow_writes
    }

    /// Names of the tools clients can see and call
    pub fn tool_names(&self) -> Vec<String> {
        self.registered_tools
            .iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    fn is_registered(&self, name: &str) -> bool {
        self.registered_tools.iter().any(|tool| tool.name == name)
    }

    /// Dispatch a call to a registered tool
    ///
    /// Unregistered names are rejected here, as a protocol error; anything
    /// that reaches the dispatcher comes back as a tool result.
    pub fn dispatch_tool(&self, name: &str, args: JsonObject) -> McpResult<CallToolResult> {
        if !self.is_registered(name) {
            return Err(McpError::invalid_params(
                format!("tool not found: {}", name),
                None,
            ));
        }

        tracing::debug!(tool = name, "Calling tool");
        Ok(self.tools.invoke(name, args))
    }

    /// Read a resource, turning failures into protocol errors
    pub fn dispatch_resource(&self, uri: &str) -> McpResult<Vec<ResourceContents>> {
        tracing::debug!(uri, "Reading resource");
        self.resources.read(uri).map_err(|e: ResourceError| {
            tracing::debug!(uri, error = %e, "Resource read failed");
            propagate_failure(e.kind(), e.to_string())
        })
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

impl ServerHandler for SqliteMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mode = if self.allow_writes {
            "read-write"
        } else {
            "read-only"
        };
        ServerInfo {
            instructions: Some(format!(
                "SQLite database MCP server. Currently in {} mode. \
                 Use list_tables and describe_table to explore the schema, \
                 execute_query for SELECT queries{}. \
                 Schema is also available as resources: schema://tables and schema://table/{{name}}.",
                mode,
                if self.allow_writes {
                    ", and execute_statement for INSERT/UPDATE/DELETE"
                } else {
                    ""
                }
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<ListToolsResult> {
        Ok(ListToolsResult::with_all_items(
            self.registered_tools.as_ref().clone(),
        ))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<CallToolResult> {
        self.dispatch_tool(&request.name, request.arguments.unwrap_or_default())
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<ListResourcesResult> {
        Ok(ListResourcesResult::with_all_items(self.resources.list()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<ListResourceTemplatesResult> {
        Ok(ListResourceTemplatesResult::with_all_items(
            self.resources.templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> McpResult<ReadResourceResult> {
        let contents = self.dispatch_resource(&request.uri)?;
        Ok(ReadResourceResult { contents })
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for SqliteMcpServer {
    fn server_name(&self) -> &str {
        "sqlite"
    }

    fn server_description(&self) -> Option<&str> {
        Some(SERVER_DESCRIPTION)
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.registered_tools.as_ref().clone()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        if !self.is_registered(name) {
            return Err(EmbeddableError::ToolNotFound(name.to_string()));
        }

        let args = match params {
            Value::Object(map) => map,
            Value::Null => JsonObject::new(),
            other => {
                return Err(EmbeddableError::InvalidParams(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        self.dispatch_tool(name, args).map_err(Into::into)
    }

    fn list_resources(&self) -> Vec<Resource> {
        self.resources.list()
    }

    fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        self.resources.templates()
    }

    async fn read_resource(&self, uri: &str) -> EmbeddableResult<Vec<ResourceContents>> {
        self.dispatch_resource(uri).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{open_test_db, text_content, text_resource};
    use crate::types::AccessMode;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn read_only_server() -> (crate::testutil::TestDb, SqliteMcpServer) {
        let (fixture, db) = open_test_db(AccessMode::ReadOnly);
        (fixture, SqliteMcpServer::new(db, false))
    }

    fn read_write_server() -> (crate::testutil::TestDb, SqliteMcpServer) {
        let (fixture, db) = open_test_db(AccessMode::ReadWrite);
        (fixture, SqliteMcpServer::new(db, true))
    }

    #[test]
    fn test_embeddable_server_name() {
        let (_fixture, server) = read_only_server();
        assert_eq!(server.server_name(), "sqlite");
        assert!(server.server_version().is_some());
    }

    #[test]
    fn test_read_only_registers_three_tools() {
        let (_fixture, server) = read_only_server();
        assert_eq!(
            server.tool_names(),
            vec!["execute_query", "list_tables", "describe_table"]
        );
        assert_eq!(EmbeddableMcp::list_tools(&server).len(), 3);
    }

    #[test]
    fn test_read_write_registers_all_tools() {
        let (_fixture, server) = read_write_server();
        assert_eq!(
            server.tool_names(),
            vec![
                "execute_query",
                "execute_statement",
                "list_tables",
                "describe_table"
            ]
        );
        assert!(server.allow_writes());
    }

    #[test]
    fn test_get_info_reports_mode() {
        let (_fixture, server) = read_only_server();
        let info = server.get_info();
        let instructions = info.instructions.unwrap();
        assert!(instructions.contains("read-only mode"));
        assert!(!instructions.contains("execute_statement"));
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[tokio::test]
    async fn test_write_tool_unreachable_in_read_only_mode() {
        let (_fixture, server) = read_only_server();

        let err = server
            .dispatch_tool("execute_statement", JsonObject::new())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let result = EmbeddableMcp::call_tool(
            &server,
            "execute_statement",
            json!({ "statement": "DELETE FROM users" }),
        )
        .await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));

        let rows = server
            .database()
            .query("SELECT COUNT(*) AS n FROM users", &[])
            .unwrap();
        assert_eq!(rows[0]["n"], crate::types::SqlValue::Integer(2));
    }

    #[tokio::test]
    async fn test_embeddable_call_list_tables() {
        let (_fixture, server) = read_only_server();

        let result = EmbeddableMcp::call_tool(&server, "list_tables", json!({}))
            .await
            .unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert!(text_content(&result).contains("users"));

        // `null` arguments count as none
        let result = EmbeddableMcp::call_tool(&server, "list_tables", Value::Null)
            .await
            .unwrap();
        assert!(text_content(&result).contains("products"));
    }

    #[tokio::test]
    async fn test_embeddable_soft_errors_are_results() {
        let (_fixture, server) = read_write_server();

        let result = EmbeddableMcp::call_tool(
            &server,
            "execute_query",
            json!({ "query": "DROP TABLE users" }),
        )
        .await
        .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_content(&result).contains("only SELECT queries are allowed"));
    }

    #[tokio::test]
    async fn test_embeddable_round_trip_write() {
        let (_fixture, server) = read_write_server();

        let result = EmbeddableMcp::call_tool(
            &server,
            "execute_statement",
            json!({
                "statement": "INSERT INTO users (name, email, age) VALUES (?, ?, ?)",
                "parameters": ["Charlie", "c@x.com", "35"],
            }),
        )
        .await
        .unwrap();
        assert!(text_content(&result).contains("Rows affected: 1"));

        let result = EmbeddableMcp::call_tool(
            &server,
            "execute_query",
            json!({ "query": "SELECT name FROM users WHERE email = ?", "parameters": ["c@x.com"] }),
        )
        .await
        .unwrap();
        assert!(text_content(&result).contains("Charlie"));
    }

    #[tokio::test]
    async fn test_embeddable_rejects_non_object_params() {
        let (_fixture, server) = read_only_server();

        let result = EmbeddableMcp::call_tool(&server, "list_tables", json!([1, 2])).await;
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_embeddable_resources() {
        let (_fixture, server) = read_only_server();

        assert_eq!(EmbeddableMcp::list_resources(&server).len(), 1);
        assert_eq!(EmbeddableMcp::list_resource_templates(&server).len(), 1);

        let contents = EmbeddableMcp::read_resource(&server, "schema://table/products")
            .await
            .unwrap();
        let (text, uri, _) = text_resource(&contents[0]);
        assert_eq!(uri, "schema://table/products");
        assert!(text.contains("\"price\""));
    }

    #[test]
    fn test_resource_failures_are_hard_errors() {
        let (_fixture, server) = read_only_server();

        let err = server.dispatch_resource("schema://table/nosuchtable").unwrap_err();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(err.message.contains("table 'nosuchtable' not found"));

        let err = server.dispatch_resource("schema://table/").unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("table name is required"));

        let err = server.dispatch_resource("schema://bogus").unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("unknown resource URI"));
    }
}
