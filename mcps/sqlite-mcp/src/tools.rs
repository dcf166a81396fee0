//! Tool dispatcher
//!
//! Maps tool calls onto the data access wrapper. Every outcome, including
//! bad arguments and SQL failures, comes back as a normal tool result so the
//! calling model can read the message and adjust.
//!
//! The dispatcher does not look at the connection mode. Hiding
//! `execute_statement` from read-only servers is done when tools are
//! registered (see [`crate::server`]).

use std::sync::Arc;

use mcp_common::{fenced_json, text_result, CallToolResult, Tool};
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::database::Database;
use crate::params::*;
use crate::types::SqlValue;

pub const EXECUTE_QUERY: &str = "execute_query";
pub const EXECUTE_STATEMENT: &str = "execute_statement";
pub const LIST_TABLES: &str = "list_tables";
pub const DESCRIBE_TABLE: &str = "describe_table";

/// Tools that change the database; only offered in read-write mode
pub const WRITE_TOOLS: &[&str] = &[EXECUTE_STATEMENT];

/// Message shown to the model, success or soft error
type ToolOutcome = Result<String, String>;

/// The four SQL tools, backed by one shared connection
#[derive(Clone)]
pub struct QueryTools {
    db: Arc<Database>,
}

impl QueryTools {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Descriptors for all four tools, regardless of mode
    pub fn list(&self) -> Vec<Tool> {
        vec![
            Tool::new(
                EXECUTE_QUERY,
                "Execute a SELECT query against the SQLite database",
                input_schema::<ExecuteQueryParams>(),
            ),
            Tool::new(
                EXECUTE_STATEMENT,
                "Execute an INSERT, UPDATE, or DELETE statement against the SQLite database",
                input_schema::<ExecuteStatementParams>(),
            ),
            Tool::new(
                LIST_TABLES,
                "List all tables in the SQLite database",
                input_schema::<ListTablesParams>(),
            ),
            Tool::new(
                DESCRIBE_TABLE,
                "Get the schema information for a specific table",
                input_schema::<DescribeTableParams>(),
            ),
        ]
    }

    /// Run a tool; never fails at the protocol level
    pub fn invoke(&self, name: &str, args: JsonObject) -> CallToolResult {
        let outcome = match name {
            EXECUTE_QUERY => self.execute_query(args),
            EXECUTE_STATEMENT => self.execute_statement(args),
            LIST_TABLES => self.list_tables(),
            DESCRIBE_TABLE => self.describe_table(args),
            _ => Err(format!("Unknown tool: {}", name)),
        };

        match outcome {
            Ok(message) => text_result(message, false),
            Err(message) => {
                tracing::debug!(tool = name, error = %message, "Tool call failed");
                text_result(message, true)
            }
        }
    }

    fn execute_query(&self, args: JsonObject) -> ToolOutcome {
        require(&args, "query")?;
        let params: ExecuteQueryParams = parse_args(EXECUTE_QUERY, args)?;

        if !starts_with_select(&params.query) {
            return Err("only SELECT queries are allowed with execute_query".to_string());
        }

        let bound = bind(params.parameters.as_deref());
        let rows = self
            .db
            .query(&params.query, &bound)
            .map_err(|e| format!("Query execution failed: {}", e))?;

        fenced_json("Query executed successfully. Results:", &rows)
            .map_err(|e| format!("Failed to format results: {}", e))
    }

    fn execute_statement(&self, args: JsonObject) -> ToolOutcome {
        require(&args, "statement")?;
        let params: ExecuteStatementParams = parse_args(EXECUTE_STATEMENT, args)?;

        if starts_with_select(&params.statement) {
            return Err("SELECT queries should use execute_query tool".to_string());
        }

        let bound = bind(params.parameters.as_deref());
        let affected = self
            .db
            .execute(&params.statement, &bound)
            .map_err(|e| format!("Statement execution failed: {}", e))?;

        Ok(format!(
            "Statement executed successfully. Rows affected: {}",
            affected
        ))
    }

    fn list_tables(&self) -> ToolOutcome {
        let tables = self
            .db
            .list_tables()
            .map_err(|e| format!("Failed to list tables: {}", e))?;

        if tables.is_empty() {
            return Ok("No tables found in the database".to_string());
        }

        fenced_json("Tables in database:", &tables)
            .map_err(|e| format!("Failed to format table list: {}", e))
    }

    fn describe_table(&self, args: JsonObject) -> ToolOutcome {
        require(&args, "table_name")?;
        let params: DescribeTableParams = parse_args(DESCRIBE_TABLE, args)?;
        let table = params.table_name;

        let columns = self
            .db
            .table_schema(&table)
            .map_err(|e| format!("Failed to describe table '{}': {}", table, e))?;

        if columns.is_empty() {
            return Err(format!("Table '{}' not found", table));
        }

        fenced_json(&format!("Schema for table '{}':", table), &columns)
            .map_err(|e| format!("Failed to format schema: {}", e))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// JSON schema for a parameter struct, as the object MCP expects
fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(schema)) => Arc::new(schema),
        _ => Arc::new(JsonObject::new()),
    }
}

/// A required string argument must be present and non-empty
fn require(args: &JsonObject, key: &str) -> Result<(), String> {
    match args.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(format!("{} parameter is required", key)),
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: JsonObject) -> Result<T, String> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| format!("Invalid arguments for {}: {}", tool, e))
}

fn bind(parameters: Option<&[Value]>) -> Vec<SqlValue> {
    parameters
        .unwrap_or_default()
        .iter()
        .map(SqlValue::from)
        .collect()
}

/// Textual prefix check; no SQL parsing
fn starts_with_select(sql: &str) -> bool {
    sql.trim().to_uppercase().starts_with("SELECT")
}
