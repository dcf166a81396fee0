//! Server initialization utilities
//!
//! Tracing setup shared by every server binary. Output always goes to
//! stderr because the stdio transport owns stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines without ANSI colors
    #[default]
    Text,
    /// One JSON object per event, for log aggregation
    Json,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT` (`json` selects [`LogFormat::Json`])
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::Text,
        }
    }

    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Initialize tracing/logging for an MCP server
///
/// Filtering comes from `RUST_LOG`, with `<crate_name>=info` added so the
/// server's own events show up even when `RUST_LOG` is unset.
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing("sqlite_mcp", mcp_common::LogFormat::from_env())?;
/// ```
pub fn init_tracing(crate_name: &str, format: LogFormat) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?,
    }

    Ok(())
}
