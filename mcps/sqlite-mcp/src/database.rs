//! SQLite data access wrapper
//!
//! One long-lived connection opened in a fixed [`AccessMode`]. Read-only
//! connections are enforced by SQLite itself, so mutating SQL fails here even
//! if it slips past the tool layer.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rusqlite::{params_from_iter, Batch, Connection, OpenFlags};
use thiserror::Error;

use crate::types::{AccessMode, ColumnInfo, Row, SqlValue};

/// Path that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Pragmas applied to every file-backed connection
///
/// Temp data stays in memory and memory-mapped I/O is off, which keeps SQLite
/// working on read-only or overlay filesystems inside containers.
const TUNING_PRAGMAS: &str = "PRAGMA temp_store = MEMORY;
     PRAGMA mmap_size = 0;
     PRAGMA cache_size = -64000;";

/// Extra pragmas for writable files: no rollback journal, no fsync
const WRITE_PRAGMAS: &str = "PRAGMA journal_mode = OFF;
     PRAGMA synchronous = OFF;";

/// Errors from the data access layer
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to {action} database: {source}")]
    ConnectionFailed {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    QueryFailed(#[source] rusqlite::Error),

    #[error("execution failed: {0}")]
    ExecFailed(#[source] rusqlite::Error),

    #[error("failed to close database: {0}")]
    CloseFailed(#[source] rusqlite::Error),

    #[error("database connection is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Shared SQLite connection
///
/// `rusqlite::Connection` is not `Sync`; the mutex serializes callers the way
/// SQLite would serialize them anyway.
pub struct Database {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
    mode: AccessMode,
}

impl Database {
    /// Open `path` (or [`IN_MEMORY`]) and verify the connection answers
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> Result<Self> {
        let path = path.as_ref();
        let in_memory = path.as_os_str() == IN_MEMORY;

        if !in_memory && !path.exists() {
            return Err(DbError::NotFound(path.to_path_buf()));
        }

        let conn = if in_memory {
            Self::open_in_memory(mode)?
        } else {
            Self::open_file(path, mode)?
        };

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|source| DbError::ConnectionFailed {
                action: "ping",
                source,
            })?;

        tracing::debug!(path = %path.display(), %mode, "Database connection established");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: path.to_path_buf(),
            mode,
        })
    }

    fn open_file(path: &Path, mode: AccessMode) -> Result<Connection> {
        let access = match mode {
            AccessMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            AccessMode::ReadWrite => {
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        };
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(path, flags).map_err(|source| {
            DbError::ConnectionFailed {
                action: "open",
                source,
            }
        })?;

        let mut pragmas = TUNING_PRAGMAS.to_string();
        if mode == AccessMode::ReadWrite {
            pragmas.push('\n');
            pragmas.push_str(WRITE_PRAGMAS);
        }
        conn.execute_batch(&pragmas)
            .map_err(|source| DbError::ConnectionFailed {
                action: "configure",
                source,
            })?;

        Ok(conn)
    }

    fn open_in_memory(mode: AccessMode) -> Result<Connection> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::ConnectionFailed {
            action: "open",
            source,
        })?;

        // No file to open read-only; SQLite's query_only switch does the same job
        if mode == AccessMode::ReadOnly {
            conn.execute_batch("PRAGMA query_only = ON;")
                .map_err(|source| DbError::ConnectionFailed {
                    action: "configure",
                    source,
                })?;
        }

        Ok(conn)
    }

    /// Path the database was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == AccessMode::ReadOnly
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(DbError::Closed),
        }
    }

    /// Run a read query and collect every row before returning
    ///
    /// `sql` must hold a single statement; trailing statements are refused
    /// rather than silently skipped.
    pub fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        self.with_conn(|conn| {
            let mut batch = Batch::new(conn, sql);
            let Some(mut stmt) = batch.next().map_err(DbError::QueryFailed)? else {
                return Ok(Vec::new());
            };
            if batch.next().map_err(DbError::QueryFailed)?.is_some() {
                return Err(DbError::QueryFailed(rusqlite::Error::MultipleStatement));
            }

            let columns: Vec<String> = stmt
                .column_names()
                .iter()
                .map(|name| name.to_string())
                .collect();

            let rows = stmt
                .query_map(params_from_iter(params), |row| {
                    let mut record = Row::new();
                    for (i, column) in columns.iter().enumerate() {
                        let value: rusqlite::types::Value = row.get(i)?;
                        record.insert(column.clone(), SqlValue::from(value));
                    }
                    Ok(record)
                })
                .map_err(DbError::QueryFailed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(DbError::QueryFailed)?;

            Ok(rows)
        })
    }

    /// Run every statement in `sql` and return the total rows they changed
    ///
    /// Parameters are handed out in order, each statement taking as many as
    /// it has placeholders; all of them must be used. Execution stops at the
    /// first failing statement.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        self.with_conn(|conn| {
            let mut batch = Batch::new(conn, sql);
            let mut remaining = params;
            let mut affected: u64 = 0;

            while let Some(mut stmt) = batch.next().map_err(DbError::ExecFailed)? {
                let wanted = stmt.parameter_count();
                if wanted > remaining.len() {
                    let needed = params.len() - remaining.len() + wanted;
                    return Err(DbError::ExecFailed(
                        rusqlite::Error::InvalidParameterCount(params.len(), needed),
                    ));
                }
                let (bound, rest) = remaining.split_at(wanted);
                remaining = rest;

                let before = conn.total_changes();

                // Step through any RETURNING rows so the statement fully completes
                let mut rows = stmt
                    .query(params_from_iter(bound))
                    .map_err(DbError::ExecFailed)?;
                while rows.next().map_err(DbError::ExecFailed)?.is_some() {}

                // changes() still reports the last DML count after DDL
                if conn.total_changes() != before {
                    affected += conn.changes();
                }
            }

            if !remaining.is_empty() {
                let used = params.len() - remaining.len();
                return Err(DbError::ExecFailed(
                    rusqlite::Error::InvalidParameterCount(params.len(), used),
                ));
            }

            Ok(affected as i64)
        })
    }

    /// User tables, sorted by name
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )
                .map_err(DbError::QueryFailed)?;

            let tables = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(DbError::QueryFailed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(DbError::QueryFailed)?;

            Ok(tables)
        })
    }

    /// Columns of `table` in declaration order; empty when the table is unknown
    pub fn table_schema(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT cid, name, type, \"notnull\", dflt_value, pk \
                     FROM pragma_table_info(?1) ORDER BY cid",
                )
                .map_err(DbError::QueryFailed)?;

            let columns = stmt
                .query_map([table], |row| {
                    Ok(ColumnInfo {
                        cid: row.get(0)?,
                        name: row.get(1)?,
                        data_type: row.get(2)?,
                        notnull: row.get::<_, i64>(3)? != 0,
                        dflt_value: row.get(4)?,
                        pk: row.get(5)?,
                    })
                })
                .map_err(DbError::QueryFailed)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(DbError::QueryFailed)?;

            Ok(columns)
        })
    }

    /// Release the connection; calling it again is a no-op
    pub fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| DbError::CloseFailed(e)),
            None => Ok(()),
        }
    }
}
