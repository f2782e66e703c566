//! Logging initialization.
//!
//! Structured logs go to stderr so stdout stays clean for command output
//! (and JSON piping). Verbosity maps to a level filter, with `RUST_LOG`
//! taking precedence when set.

use crate::error::{PmuError, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Levels: quiet = errors only, default = warnings, `-v` = info,
/// `-vv` and up = debug.
///
/// # Errors
///
/// Returns an error when a subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pmu={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| PmuError::Other(anyhow::anyhow!("failed to initialize logging: {e}")))
}
