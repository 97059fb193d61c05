//! Configuration management for hookpin
//!
//! This crate handles:
//! - Hook manifest loading (`.pre-commit-config.yaml`)
//! - Manifest validation
//! - Hook definitions and override resolution
//! - File path patterns
//! - Settings loading and XDG directory management
//! - Logging initialization

pub mod config;
pub mod definition;
pub mod dirs;
pub mod logging;
pub mod manifest;
pub mod patterns;
pub mod validate;

// Re-export error types from core
pub use hookpin_core::{Error, Result};

// Re-export main types
pub use config::{CatalogConfig, Config, GeneralConfig, IconMode, LintConfig, RunConfig, UiConfig};
pub use definition::{HookDefinition, ResolvedHook};
pub use manifest::{HookPosition, HookRef, HookSource, Manifest, SourceKind};
pub use patterns::FilePattern;
pub use validate::{Issue, ManifestSummary, Severity, ValidationReport, validate};
