//! Configuration for the SQLite MCP Server
//!
//! Settings are layered: command line (and its env fallbacks), then an
//! optional TOML file, then built-in defaults.
//!
//! ```toml
//! [database]
//! path = "/var/lib/app/data.db"
//! read_write = false
//!
//! [server]
//! addr = "127.0.0.1:8080"
//! transport = "streamable-http"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::types::AccessMode;

pub const DEFAULT_DATABASE: &str = "./database.db";
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Command line for the `sqlite-mcp` binary
#[derive(Debug, Default, Parser)]
#[command(name = "sqlite-mcp", version, about = "MCP server for a SQLite database")]
pub struct Cli {
    /// Path to the SQLite database file (or `:memory:`)
    #[arg(long = "db", env = "SQLITE_MCP_DB")]
    pub db: Option<PathBuf>,

    /// Allow write operations (registers execute_statement)
    #[arg(long)]
    pub read_write: bool,

    /// Address for the streamable HTTP transport
    #[arg(long, env = "MCP_ADDR")]
    pub addr: Option<String>,

    /// Transport: `streamable-http` or `stdio`
    #[arg(long, env = "MCP_TRANSPORT")]
    pub transport: Option<String>,

    /// Path to a TOML config file
    #[arg(long, env = "SQLITE_MCP_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database: DatabaseSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: Option<PathBuf>,
    pub read_write: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub addr: Option<String>,
    pub transport: Option<String>,
}

impl FileConfig {
    /// Parse a config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit config if given, else the default one if it exists
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_path(path).map(Some);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_path(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// `<config_dir>/sqlite-mcp/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqlite-mcp").join("config.toml"))
    }
}

/// How the server talks to clients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    #[default]
    StreamableHttp,
}

impl Transport {
    /// Interpret a transport setting, falling back to the default on bad input
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Self::Stdio,
            "streamable-http" | "http" => Self::StreamableHttp,
            "sse" => {
                tracing::warn!("SSE transport is not available, serving streamable-http instead");
                Self::StreamableHttp
            }
            other => {
                tracing::warn!(
                    "Unknown transport '{}', using {}",
                    other,
                    Self::default()
                );
                Self::default()
            }
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::StreamableHttp => write!(f, "streamable-http"),
        }
    }
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database: PathBuf,
    pub mode: AccessMode,
    pub addr: String,
    pub transport: Transport,
}

impl ServerConfig {
    /// Merge the command line with the environment's `MCP_PORT` and any config file
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        let file = FileConfig::load(cli.config.as_deref())?.unwrap_or_default();
        let port = std::env::var("MCP_PORT").ok();
        Ok(Self::resolve(cli, file, port.as_deref()))
    }

    /// Apply precedence: command line, then file, then defaults
    pub fn resolve(cli: Cli, file: FileConfig, port: Option<&str>) -> Self {
        let database = cli
            .db
            .or(file.database.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        let mode = AccessMode::from_read_write(cli.read_write || file.database.read_write);

        let addr = cli
            .addr
            .or(file.server.addr)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let mut addr = normalize_addr(&addr);

        if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
            match port.parse::<u16>() {
                Ok(port) => addr = with_port(&addr, port),
                Err(_) => tracing::warn!("Invalid MCP_PORT value '{}', ignoring", port),
            }
        }

        let transport = cli
            .transport
            .or(file.server.transport)
            .map(|t| Transport::from_setting(&t))
            .unwrap_or_default();

        Self {
            database,
            mode,
            addr,
            transport,
        }
    }
}

/// Accept Go-style `:8080` as "all interfaces"
fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

/// Replace (or add) the port of `host:port`
fn with_port(addr: &str, port: u16) -> String {
    let host = match addr.rsplit_once(':') {
        Some((host, existing)) if existing.parse::<u16>().is_ok() => host,
        _ => addr,
    };
    format!("{}:{}", host, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::resolve(Cli::default(), FileConfig::default(), None);
        assert_eq!(config.database, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.mode, AccessMode::ReadOnly);
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.transport, Transport::StreamableHttp);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "sqlite-mcp",
            "--db",
            "/tmp/app.db",
            "--read-write",
            "--addr",
            "127.0.0.1:9000",
            "--transport",
            "stdio",
        ])
        .unwrap();

        let config = ServerConfig::resolve(cli, FileConfig::default(), None);
        assert_eq!(config.database, PathBuf::from("/tmp/app.db"));
        assert_eq!(config.mode, AccessMode::ReadWrite);
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.transport, Transport::Stdio);
    }

    #[test]
    fn test_file_config_under_cli() {
        let file: FileConfig = toml::from_str(
            r#"
            [database]
            path = "from-file.db"
            read_write = true

            [server]
            addr = "127.0.0.1:7000"
            transport = "stdio"
            "#,
        )
        .unwrap();

        let cli = Cli {
            db: Some(PathBuf::from("from-cli.db")),
            ..Default::default()
        };
        let config = ServerConfig::resolve(cli, file, None);

        assert_eq!(config.database, PathBuf::from("from-cli.db"));
        assert_eq!(config.mode, AccessMode::ReadWrite);
        assert_eq!(config.addr, "127.0.0.1:7000");
        assert_eq!(config.transport, Transport::Stdio);
    }

    #[test]
    fn test_partial_file_config() {
        let file: FileConfig = toml::from_str("[server]\ntransport = \"stdio\"\n").unwrap();
        assert!(file.database.path.is_none());
        assert!(!file.database.read_write);
    }

    #[test]
    fn test_port_override() {
        let config = ServerConfig::resolve(Cli::default(), FileConfig::default(), Some("9090"));
        assert_eq!(config.addr, "0.0.0.0:9090");

        let cli = Cli {
            addr: Some("[::1]:8080".to_string()),
            ..Default::default()
        };
        let config = ServerConfig::resolve(cli, FileConfig::default(), Some(" 3000 "));
        assert_eq!(config.addr, "[::1]:3000");
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        for bad in ["abc", "70000", "-1"] {
            let config = ServerConfig::resolve(Cli::default(), FileConfig::default(), Some(bad));
            assert_eq!(config.addr, DEFAULT_ADDR, "port {:?}", bad);
        }
    }

    #[test]
    fn test_go_style_addr() {
        let cli = Cli {
            addr: Some(":8081".to_string()),
            ..Default::default()
        };
        let config = ServerConfig::resolve(cli, FileConfig::default(), None);
        assert_eq!(config.addr, "0.0.0.0:8081");
    }

    #[test]
    fn test_transport_setting() {
        assert_eq!(Transport::from_setting("stdio"), Transport::Stdio);
        assert_eq!(Transport::from_setting("  STDIO "), Transport::Stdio);
        assert_eq!(
            Transport::from_setting("streamable-http"),
            Transport::StreamableHttp
        );
        assert_eq!(Transport::from_setting("sse"), Transport::StreamableHttp);
        assert_eq!(Transport::from_setting("carrier-pigeon"), Transport::StreamableHttp);
        assert_eq!(Transport::StreamableHttp.to_string(), "streamable-http");
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"explicit.db\"").unwrap();

        let config = FileConfig::load(Some(file.path())).unwrap().unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("explicit.db")));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database\npath = ").unwrap();

        let err = FileConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
