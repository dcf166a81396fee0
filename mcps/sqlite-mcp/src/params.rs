//! Parameter types for SQLite MCP tools
//!
//! These structs double as each tool's advertised input schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteQueryParams {
    #[schemars(description = "The SQL SELECT query to execute")]
    pub query: String,

    #[schemars(description = "Optional parameters for the query, bound to `?` placeholders in order")]
    #[serde(default)]
    pub parameters: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteStatementParams {
    #[schemars(description = "The SQL statement to execute (INSERT, UPDATE, DELETE, ...)")]
    pub statement: String,

    #[schemars(description = "Optional parameters for the statement, bound to `?` placeholders in order")]
    #[serde(default)]
    pub parameters: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTablesParams {}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DescribeTableParams {
    #[schemars(description = "The name of the table to describe")]
    pub table_name: String,
}
