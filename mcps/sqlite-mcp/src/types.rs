//! Type definitions for SQLite MCP

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, Value};
use serde::Serialize;

// ============================================================================
// Connection Mode
// ============================================================================

/// Access mode a connection is opened with; fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn from_read_write(read_write: bool) -> Self {
        if read_write {
            Self::ReadWrite
        } else {
            Self::ReadOnly
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("read-only"),
            Self::ReadWrite => f.write_str("read-write"),
        }
    }
}

// ============================================================================
// Values and Rows
// ============================================================================

/// A single SQLite scalar
///
/// Serializes untagged: `null`, a JSON number, or a JSON string. Blobs never
/// appear here; they are decoded to text when a row is read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Integer(i) => SqlValue::Integer(i),
            Value::Real(f) => SqlValue::Real(f),
            Value::Text(s) => SqlValue::Text(s),
            Value::Blob(b) => SqlValue::Text(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

/// Bind a JSON tool argument as a positional parameter
impl From<&serde_json::Value> for SqlValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Integer(i),
                None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
            },
            serde_json::Value::String(s) => SqlValue::Text(s.clone()),
            // Nested structures are bound as their JSON text
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::from(*i),
            SqlValue::Real(f) => ToSqlOutput::from(*f),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// One result row keyed by column name
///
/// Ordered so the JSON handed to the model is stable between calls.
pub type Row = BTreeMap<String, SqlValue>;

// ============================================================================
// Schema Types
// ============================================================================

/// Column descriptor as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub notnull: bool,
    pub dflt_value: Option<String>,
    /// 1-based position in the primary key, 0 when not part of it
    pub pk: i64,
}

impl ColumnInfo {
    pub fn is_primary_key(&self) -> bool {
        self.pk > 0
    }
}

/// Table schema payload for `schema://table/{name}`
#[derive(Debug, Serialize)]
pub struct TableSchema<'a> {
    pub table_name: &'a str,
    pub columns: &'a [ColumnInfo],
}
