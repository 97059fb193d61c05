//! Error types for CLI commands

use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The manifest has validation errors (or any issue in strict mode)
    #[error("Manifest is invalid: {errors} error(s), {warnings} warning(s)")]
    ValidationFailed {
        /// Number of errors
        errors: usize,
        /// Number of warnings
        warnings: usize,
    },

    /// At least one hook failed
    #[error("{failed} out of {total} hooks failed")]
    HooksFailed {
        /// Number of failed hooks
        failed: usize,
        /// Number of hooks that were run or skipped
        total: usize,
    },

    /// No hook matches the given id, alias or name
    #[error("No hook matches '{0}'")]
    HookNotFound(String),

    /// Error from the hookpin libraries
    #[error(transparent)]
    Core(#[from] hookpin_core::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
