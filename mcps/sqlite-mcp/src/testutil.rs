//! Shared fixtures for unit tests

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::model::{CallToolResult, RawContent, ResourceContents};
use rusqlite::Connection;
use tempfile::TempDir;

use crate::database::Database;
use crate::types::AccessMode;

/// On-disk test database; the directory is removed when this is dropped
pub struct TestDb {
    pub _dir: TempDir,
    pub path: PathBuf,
}

/// Create `users` (Alice, Bob) and `products` (Widget, Gadget) in a temp file
pub fn create_test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            age INTEGER
        );
        INSERT INTO users (name, email, age) VALUES
            ('Alice', 'alice@example.com', 30),
            ('Bob', 'bob@example.com', 25);

        CREATE TABLE products (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price REAL
        );
        INSERT INTO products (name, price) VALUES
            ('Widget', 9.99),
            ('Gadget', 19.99);
        "#,
    )
    .unwrap();
    conn.close().unwrap();

    TestDb { _dir: dir, path }
}

/// Open the fixture database through the wrapper
pub fn open_test_db(mode: AccessMode) -> (TestDb, Arc<Database>) {
    let fixture = create_test_db();
    let db = Database::open(&fixture.path, mode).unwrap();
    (fixture, Arc::new(db))
}

/// Text of the first content item of a tool result
pub fn text_content(result: &CallToolResult) -> String {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.clone(),
        _ => panic!("expected text content"),
    }
}

/// Text, URI and MIME type of a resource content item
pub fn text_resource(contents: &ResourceContents) -> (String, String, Option<String>) {
    match contents {
        ResourceContents::TextResourceContents {
            uri,
            mime_type,
            text,
            ..
        } => (text.clone(), uri.clone(), mime_type.clone()),
        _ => panic!("expected text resource contents"),
    }
}
