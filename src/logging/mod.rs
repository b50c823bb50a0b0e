//! Logging initialization with environment-based formatters
//!
//! - Production (`PANGAN_ENV=production`): structured JSON lines
//! - Otherwise: human-readable lines (colored on a terminal)
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it logs to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::AppError;

pub const DEFAULT_LOG_FILE: &str = "pangan.log";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// File target for the TUI: `PANGAN_LOG_FILE`, else `pangan.log`.
    pub fn tui_file() -> Self {
        let path = std::env::var("PANGAN_LOG_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        LogTarget::File(PathBuf::from(path))
    }

    fn default_level(&self) -> &'static str {
        match self {
            LogTarget::Stderr => "warn",
            LogTarget::File(_) => "info",
        }
    }
}

pub fn is_production() -> bool {
    std::env::var("PANGAN_ENV")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

/// Initialize the global subscriber. `RUST_LOG` overrides the default level.
///
/// A second call is a no-op.
pub fn init_logging(target: LogTarget) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(target.default_level()));

    let (writer, ansi) = match &target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let result = if is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(writer),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_ansi(ansi).with_writer(writer))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_levels_per_target() {
        assert_eq!(LogTarget::Stderr.default_level(), "warn");
        assert_eq!(LogTarget::File(PathBuf::from("x.log")).default_level(), "info");
    }

    #[test]
    fn repeated_init_is_harmless() {
        assert!(init_logging(LogTarget::Stderr).is_ok());
        assert!(init_logging(LogTarget::Stderr).is_ok());
    }
}
