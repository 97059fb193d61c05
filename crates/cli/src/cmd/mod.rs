//! CLI command implementations
//!
//! This module contains all command implementations for the hookpin CLI.

pub mod list;
pub mod plan;
pub mod run;
pub mod show;
pub mod validate;

use hookpin_config::HookRef;

/// Output format shared by the reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Simple,
    /// Machine readable JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(OutputFormat::Simple),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {s}. Use 'simple' or 'json'")),
        }
    }
}

/// Whether `selector` names this hook by id, alias or display name
pub(crate) fn selects(hook: &HookRef, selector: &str) -> bool {
    hook.matches_selector(selector) || hook.name.as_deref() == Some(selector)
}

/// `n` followed by the singular or plural noun
pub(crate) fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}
