//! Base error types for hookpin
//!
//! This module provides the foundation error types that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured data could not be parsed
    #[error("Failed to parse {}{}: {message}", path.display(), location_suffix(*line, *column))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    /// Regular expression failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Hook configuration error
    #[error("Hook configuration error: {0}")]
    HookConfig(String),

    /// Hook execution error
    #[error("Hook execution error: {0}")]
    HookExecution(String),

    /// Git operation error
    #[error("Git error: {0}")]
    Git(String),

    /// Settings file error
    #[error("Settings error: {0}")]
    Settings(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

fn location_suffix(line: Option<usize>, column: Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line} column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
