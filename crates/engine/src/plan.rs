//! Execution plan
//!
//! The plan lists every hook reference of the manifest in declaration order,
//! with the files it would run against or the reason it will be skipped.
//! `hookpin plan` prints it; `hookpin run` executes it.

use crate::catalog::{HookOrigin, ResolvedEntry};
use crate::selection::FileSet;
use hookpin_config::manifest::normalize_stage;
use hookpin_config::{FilePattern, HookPosition, Manifest};
use hookpin_core::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Stage used when none is requested
pub const DEFAULT_STAGE: &str = "pre-commit";

/// Why a planned hook will not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "language", rename_all = "snake_case")]
pub enum SkipReason {
    /// No candidate file matched and the hook is not `always_run`
    NoFiles,
    /// The hook is not bound to the requested stage
    StageMismatch,
    /// No definition was found for the hook
    Unresolved,
    /// The hook's language needs an environment hookpin does not provision
    NotRunnable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFiles => f.write_str("no files to check"),
            Self::StageMismatch => f.write_str("not bound to this stage"),
            Self::Unresolved => f.write_str("definition not found"),
            Self::NotRunnable(language) => write!(f, "language '{language}' is not supported"),
        }
    }
}

/// One hook reference in the plan
#[derive(Debug, Clone, Serialize)]
pub struct PlannedHook {
    /// Index of the source in `repos`
    pub source_index: usize,
    /// Index of the hook in its source
    pub hook_index: usize,
    /// Hook id
    pub id: String,
    /// Display name
    pub name: String,
    /// Files the hook runs against
    pub files: Vec<PathBuf>,
    /// Set when the hook will not run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl PlannedHook {
    /// Position of the hook reference in the manifest
    #[must_use]
    pub fn position(&self) -> HookPosition {
        HookPosition {
            source: self.source_index,
            hook: self.hook_index,
        }
    }

    /// Whether the hook will run
    #[must_use]
    pub fn will_run(&self) -> bool {
        self.skipped.is_none()
    }
}

/// Ordered hooks for one stage
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    /// Stage the plan was built for
    pub stage: String,
    /// Hooks in manifest order
    pub hooks: Vec<PlannedHook>,
}

impl ExecutionPlan {
    /// Build the plan for `stage`
    ///
    /// # Errors
    ///
    /// Returns error if the manifest's global `files`/`exclude` do not compile
    pub fn build(
        manifest: &Manifest,
        resolved: &[ResolvedEntry],
        files: &FileSet,
        stage: &str,
    ) -> Result<Self> {
        let stage = normalize_stage(stage)
            .ok_or_else(|| Error::HookConfig(format!("Unknown stage '{stage}'")))?;
        let global_files = FilePattern::new(&manifest.files)?;
        let global_exclude = FilePattern::new(&manifest.exclude)?;

        let hooks = resolved
            .iter()
            .map(|entry| {
                let hook = &entry.hook;
                let selected: Vec<PathBuf> = files
                    .select(hook, &global_files, &global_exclude)
                    .into_iter()
                    .map(PathBuf::from)
                    .collect();

                let skipped = if !bound_to(entry, manifest, stage) {
                    Some(SkipReason::StageMismatch)
                } else if selected.is_empty() && !hook.always_run {
                    Some(SkipReason::NoFiles)
                } else if entry.origin == HookOrigin::Unresolved {
                    Some(SkipReason::Unresolved)
                } else if !hook.is_runnable() {
                    Some(SkipReason::NotRunnable(hook.language.clone()))
                } else {
                    None
                };

                tracing::debug!(
                    hook_id = %hook.id,
                    files = selected.len(),
                    skipped = ?skipped,
                    "Planned hook"
                );

                PlannedHook {
                    source_index: entry.position.source,
                    hook_index: entry.position.hook,
                    id: hook.id.clone(),
                    name: hook.name.clone(),
                    files: selected,
                    skipped,
                }
            })
            .collect();

        Ok(Self {
            stage: stage.to_string(),
            hooks,
        })
    }

    /// Hooks that will run
    pub fn runnable(&self) -> impl Iterator<Item = &PlannedHook> {
        self.hooks.iter().filter(|h| h.will_run())
    }
}

/// Hooks without stages of their own fall back to `default_stages`
fn bound_to(entry: &ResolvedEntry, manifest: &Manifest, stage: &str) -> bool {
    if !entry.hook.stages.is_empty() {
        return entry.hook.runs_at(stage);
    }
    match &manifest.default_stages {
        Some(defaults) => defaults
            .iter()
            .any(|s| normalize_stage(s).unwrap_or(s.as_str()) == stage),
        None => true,
    }
}
