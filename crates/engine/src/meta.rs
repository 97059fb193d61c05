//! Built-in `meta` hooks
//!
//! These check the manifest against the repository instead of checking the
//! files themselves, so they need the whole candidate set rather than the
//! files passed to one hook.

use crate::catalog::{HookOrigin, ResolvedEntry};
use crate::selection::FileSet;
use hookpin_config::{FilePattern, Manifest};
use hookpin_core::{Error, Result};
use std::path::PathBuf;

/// What meta hooks inspect
#[derive(Debug, Clone, Copy)]
pub struct MetaContext<'a> {
    /// The loaded manifest
    pub manifest: &'a Manifest,
    /// Every resolved hook reference
    pub resolved: &'a [ResolvedEntry],
    /// All files of the repository
    pub files: &'a FileSet,
}

/// Result of one meta hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaResult {
    /// Whether the check passed
    pub passed: bool,
    /// Lines describing what was found
    pub output: String,
}

impl MetaContext<'_> {
    /// Run the meta hook `id` on `files`
    ///
    /// # Errors
    ///
    /// Returns error for an unknown meta hook id or a global pattern that
    /// does not compile
    pub fn run(&self, id: &str, files: &[PathBuf]) -> Result<MetaResult> {
        let problems = match id {
            "check-hooks-apply" => self.hooks_that_never_apply()?,
            "check-useless-excludes" => self.useless_excludes()?,
            "identity" => {
                let output = files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(MetaResult {
                    passed: true,
                    output,
                });
            }
            other => {
                return Err(Error::HookConfig(format!("Unknown meta hook '{other}'")));
            }
        };

        Ok(MetaResult {
            passed: problems.is_empty(),
            output: problems.join("\n"),
        })
    }

    fn user_hooks(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.resolved
            .iter()
            .filter(|e| e.origin != HookOrigin::Meta)
    }

    fn hooks_that_never_apply(&self) -> Result<Vec<String>> {
        let global_files = FilePattern::new(&self.manifest.files)?;
        let global_exclude = FilePattern::new(&self.manifest.exclude)?;

        Ok(self
            .user_hooks()
            .filter(|e| !e.hook.always_run)
            .filter(|e| {
                self.files
                    .select(&e.hook, &global_files, &global_exclude)
                    .is_empty()
            })
            .map(|e| format!("{} does not apply to this repository", e.hook.id))
            .collect())
    }

    fn useless_excludes(&self) -> Result<Vec<String>> {
        let mut problems = Vec::new();

        let global_exclude = FilePattern::new(&self.manifest.exclude)?;
        if global_exclude != FilePattern::match_none()
            && self.files.matching(&global_exclude).is_empty()
        {
            problems.push(format!(
                "The global exclude pattern '{}' does not match any files",
                global_exclude.as_str()
            ));
        }

        for entry in self.user_hooks() {
            let exclude = &entry.hook.exclude;
            if *exclude == FilePattern::match_none() {
                continue;
            }
            let included = self.files.included(&entry.hook);
            if !included.into_iter().any(|p| exclude.matches_path(p)) {
                problems.push(format!(
                    "The exclude pattern '{}' for {} does not match any files",
                    exclude.as_str(),
                    entry.hook.id
                ));
            }
        }

        Ok(problems)
    }
}
