//! # Hookpin Engine
//!
//! Turns a loaded manifest into work:
//!
//! - **Catalog**: hook definitions read from hook repository checkouts
//! - **Selection**: which candidate files each hook sees
//! - **Plan**: ordered list of hooks with their files or the reason they skip
//! - **Git**: staged and tracked files of the working repository
//! - **Executor**: runs the plan and reports an outcome per hook

pub mod catalog;
pub mod executor;
pub mod git;
pub mod meta;
pub mod plan;
pub mod selection;

// Re-export error types from core
pub use hookpin_core::{Error, Result};

// Re-export commonly used types
pub use catalog::{HookCatalog, HookOrigin, ResolvedEntry};
pub use executor::{HookOutcome, HookReport, HookRunner, RunSummary};
pub use plan::{ExecutionPlan, PlannedHook, SkipReason};
pub use selection::FileSet;
