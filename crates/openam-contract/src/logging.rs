// crates/openam-contract/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Tracing subscriber installation for runners and tests.
// Purpose: Provide one entry point for pretty or JSON structured logs.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs a global `tracing` subscriber writing to stderr. `RUST_LOG`
//! overrides the default level. Installing twice is not an error, so every
//! test binary may call [`init_logging`] freely.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Format name is not `pretty` or `json`.
    #[error("unknown log format: {0}")]
    UnknownFormat(String),
}

/// Installs the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(format: LogFormat, level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Pretty => {
            registry.with(fmt::layer().with_writer(std::io::stderr).with_target(false)).try_init()
        }
    };
    installed.is_ok()
}
