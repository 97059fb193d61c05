//! Logging configuration for hookpin CLI
//!
//! Provides compact terminal output and optional file logging using tracing.

use crate::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default
const TARGETS: &[&str] = &["hookpin", "hookpin_core", "hookpin_config", "hookpin_engine"];

/// Build the default filter for the given level
///
/// `RUST_LOG` wins when set and valid.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = TARGETS
            .iter()
            .map(|t| format!("{t}={level}"))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::new(directives)
    })
}

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging and timestamps on the terminal
/// * `log_file` - Optional path to append detailed logs to
///
/// # Examples
/// ```ignore
/// // Warnings and above on the terminal
/// init(false, None)?;
///
/// // Debug output, also written to a file
/// init(true, Some(Path::new("hookpin.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    // Normal runs print results themselves; only problems are logged
    let level = if verbose { "debug" } else { "warn" };

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // Timestamps only in verbose mode
    let stdout_layer = if verbose {
        stdout_layer.with_filter(env_filter(level)).boxed()
    } else {
        stdout_layer
            .without_time()
            .with_filter(env_filter(level))
            .boxed()
    };

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::Error::Message(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
