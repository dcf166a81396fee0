//! Resource dispatcher
//!
//! Read-only schema views addressed by URI:
//!
//! - `schema://tables` - JSON array of table names
//! - `schema://table/{name}` - JSON object with the table's columns
//!
//! Unlike tools, failures here are hard errors returned to the client.

use std::sync::Arc;

use mcp_common::{FailureKind, Resource, ResourceContents, ResourceTemplate};
use rmcp::model::{AnnotateAble, RawResource, RawResourceTemplate};
use serde::Serialize;
use thiserror::Error;

use crate::database::Database;
use crate::types::TableSchema;

pub const TABLES_URI: &str = "schema://tables";
pub const TABLE_URI_PREFIX: &str = "schema://table/";
pub const TABLE_URI_TEMPLATE: &str = "schema://table/{name}";

const JSON_MIME: &str = "application/json";

/// Hard failures from resource reads
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ResourceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::BadRequest(_) => FailureKind::BadRequest,
            Self::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Schema resources over one shared connection
#[derive(Clone)]
pub struct SchemaResources {
    db: Arc<Database>,
}

impl SchemaResources {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The static table-list resource
    pub fn list(&self) -> Vec<Resource> {
        let mut tables = RawResource::new(TABLES_URI, "Database Tables");
        tables.description = Some("List of all tables in the SQLite database".to_string());
        tables.mime_type = Some(JSON_MIME.to_string());

        vec![tables.no_annotation()]
    }

    /// The per-table schema template
    pub fn templates(&self) -> Vec<ResourceTemplate> {
        let template = RawResourceTemplate {
            uri_template: TABLE_URI_TEMPLATE.to_string(),
            name: "Table Schema".to_string(),
            title: None,
            description: Some("Schema information for a specific table".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
            icons: None,
        };

        vec![template.no_annotation()]
    }

    /// Resolve a URI to its contents
    pub fn read(&self, uri: &str) -> Result<Vec<ResourceContents>, ResourceError> {
        if uri == TABLES_URI {
            return self.read_tables();
        }

        match uri.strip_prefix(TABLE_URI_PREFIX) {
            Some(table) => self.read_table_schema(table),
            None => Err(ResourceError::BadRequest(format!(
                "unknown resource URI: {}",
                uri
            ))),
        }
    }

    fn read_tables(&self) -> Result<Vec<ResourceContents>, ResourceError> {
        let tables = self
            .db
            .list_tables()
            .map_err(|e| ResourceError::Internal(format!("failed to get tables: {}", e)))?;

        Ok(vec![json_contents(TABLES_URI, &tables)?])
    }

    fn read_table_schema(&self, table: &str) -> Result<Vec<ResourceContents>, ResourceError> {
        if table.is_empty() {
            return Err(ResourceError::BadRequest(
                "table name is required".to_string(),
            ));
        }

        let columns = self.db.table_schema(table).map_err(|e| {
            ResourceError::Internal(format!(
                "failed to get table schema for '{}': {}",
                table, e
            ))
        })?;

        if columns.is_empty() {
            return Err(ResourceError::NotFound(format!(
                "table '{}' not found",
                table
            )));
        }

        let schema = TableSchema {
            table_name: table,
            columns: &columns,
        };
        let uri = format!("{}{}", TABLE_URI_PREFIX, table);

        Ok(vec![json_contents(&uri, &schema)?])
    }
}

/// Indented JSON text content addressed by `uri`
fn json_contents<T: Serialize + ?Sized>(
    uri: &str,
    data: &T,
) -> Result<ResourceContents, ResourceError> {
    let text = serde_json::to_string_pretty(data)
        .map_err(|e| ResourceError::Internal(format!("failed to encode {}: {}", uri, e)))?;

    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(JSON_MIME.to_string());
    }
    Ok(contents)
}
