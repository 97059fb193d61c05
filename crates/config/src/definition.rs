//! Hook definitions and their resolution against manifest overrides
//!
//! A hook repository describes the hooks it exposes in
//! `.pre-commit-hooks.yaml`. A manifest entry picks one of them by id and may
//! override any field; [`HookDefinition::apply_overrides`] merges the two
//! into the [`ResolvedHook`] that file selection and execution work from.

use crate::Result;
use crate::manifest::HookRef;
use crate::patterns::FilePattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the definitions inside a hook repository
pub const DEFINITIONS_FILE: &str = ".pre-commit-hooks.yaml";

/// Ids of the built-in `meta` hooks
pub const META_HOOKS: &[&str] = &["check-hooks-apply", "check-useless-excludes", "identity"];

/// Languages hookpin can execute without provisioning an environment
///
/// `meta` hooks are built into the executor.
pub const RUNNABLE_LANGUAGES: &[&str] = &["system", "script", "fail", "meta"];

/// One hook exposed by a hook repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookDefinition {
    /// Hook id
    pub id: String,

    /// Display name
    pub name: String,

    /// Command to run
    pub entry: String,

    /// Language the hook is written in
    pub language: String,

    /// Include pattern
    #[serde(default)]
    pub files: String,

    /// Exclude pattern
    #[serde(default = "default_exclude")]
    pub exclude: String,

    /// File must carry every one of these tags
    #[serde(default = "default_types")]
    pub types: Vec<String>,

    /// File must carry at least one of these tags
    #[serde(default)]
    pub types_or: Vec<String>,

    /// File must carry none of these tags
    #[serde(default)]
    pub exclude_types: Vec<String>,

    /// Arguments appended to the entry
    #[serde(default)]
    pub args: Vec<String>,

    /// Run even when no file matches
    #[serde(default)]
    pub always_run: bool,

    /// Pass matched file names as arguments
    #[serde(default = "default_pass_filenames")]
    pub pass_filenames: bool,

    /// Never split the file list across invocations
    #[serde(default)]
    pub require_serial: bool,

    /// Stages the hook is bound to (empty = all)
    #[serde(default)]
    pub stages: Vec<String>,

    /// Human description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Print output even when the hook passes
    #[serde(default)]
    pub verbose: bool,
}

impl HookDefinition {
    /// Load every definition from a `.pre-commit-hooks.yaml` file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load_all(path: &Path) -> Result<Vec<Self>> {
        let content = fs::read_to_string(path).map_err(|e| {
            crate::Error::HookConfig(format!(
                "Failed to read hook definitions {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            let location = e.location();
            crate::Error::Parse {
                path: PathBuf::from(path),
                line: location.as_ref().map(serde_yaml::Location::line),
                column: location.as_ref().map(serde_yaml::Location::column),
                message: e.to_string(),
            }
        })
    }

    /// Build the definition of a hook declared inline under `repo: local`
    ///
    /// # Errors
    ///
    /// Returns error if `name`, `entry` or `language` is missing
    pub fn from_local(hook: &HookRef) -> Result<Self> {
        let required = |field: &Option<String>, key: &str| {
            field.clone().ok_or_else(|| {
                crate::Error::HookConfig(format!("Local hook '{}' is missing '{key}'", hook.id))
            })
        };

        Ok(Self {
            id: hook.id.clone(),
            name: required(&hook.name, "name")?,
            entry: required(&hook.entry, "entry")?,
            language: required(&hook.language, "language")?,
            ..Self::bare(&hook.id)
        })
    }

    /// Definition of a built-in `meta` hook
    #[must_use]
    pub fn meta(id: &str) -> Option<Self> {
        let (name, files) = match id {
            "check-hooks-apply" => (
                "Check hooks apply to the repository",
                r"^\.pre-commit-config\.yaml$",
            ),
            "check-useless-excludes" => (
                "Check for useless excludes",
                r"^\.pre-commit-config\.yaml$",
            ),
            "identity" => ("identity", ""),
            _ => return None,
        };

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            entry: id.to_string(),
            language: "meta".to_string(),
            files: files.to_string(),
            ..Self::bare(id)
        })
    }

    /// Placeholder used when no definition is available for a remote hook
    ///
    /// Only the manifest overrides shape its file selection.
    #[must_use]
    pub fn unresolved(id: &str) -> Self {
        Self {
            language: "unknown".to_string(),
            ..Self::bare(id)
        }
    }

    fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            entry: String::new(),
            language: String::new(),
            files: String::new(),
            exclude: default_exclude(),
            types: default_types(),
            types_or: Vec::new(),
            exclude_types: Vec::new(),
            args: Vec::new(),
            always_run: false,
            pass_filenames: true,
            require_serial: false,
            stages: Vec::new(),
            description: None,
            verbose: false,
        }
    }

    /// Merge manifest overrides over this definition
    ///
    /// Any field present on `hook` replaces the definition's value.
    ///
    /// # Errors
    ///
    /// Returns error if a resulting `files`/`exclude` pattern does not compile
    pub fn apply_overrides(&self, hook: &HookRef) -> Result<ResolvedHook> {
        let pick_vec = |over: &Option<Vec<String>>, base: &Vec<String>| {
            over.clone().unwrap_or_else(|| base.clone())
        };

        let files = hook.files.as_deref().unwrap_or(&self.files);
        let exclude = hook.exclude.as_deref().unwrap_or(&self.exclude);

        Ok(ResolvedHook {
            id: self.id.clone(),
            name: hook.name.clone().unwrap_or_else(|| self.name.clone()),
            alias: hook.alias.clone(),
            entry: hook.entry.clone().unwrap_or_else(|| self.entry.clone()),
            language: hook
                .language
                .clone()
                .unwrap_or_else(|| self.language.clone()),
            files: FilePattern::new(files)?,
            exclude: FilePattern::new(exclude)?,
            types: pick_vec(&hook.types, &self.types),
            types_or: pick_vec(&hook.types_or, &self.types_or),
            exclude_types: pick_vec(&hook.exclude_types, &self.exclude_types),
            args: pick_vec(&hook.args, &self.args),
            always_run: hook.always_run.unwrap_or(self.always_run),
            pass_filenames: hook.pass_filenames.unwrap_or(self.pass_filenames),
            require_serial: hook.require_serial.unwrap_or(self.require_serial),
            verbose: hook.verbose.unwrap_or(self.verbose),
            stages: pick_vec(&hook.stages, &self.stages),
            additional_dependencies: hook.additional_dependencies.clone(),
        })
    }
}

/// A manifest entry merged with its definition
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHook {
    /// Hook id
    pub id: String,
    /// Display name
    pub name: String,
    /// Alias from the manifest
    pub alias: Option<String>,
    /// Command to run
    pub entry: String,
    /// Language the hook is written in
    pub language: String,
    /// Include pattern
    pub files: FilePattern,
    /// Exclude pattern
    pub exclude: FilePattern,
    /// File must carry every one of these tags
    pub types: Vec<String>,
    /// File must carry at least one of these tags
    pub types_or: Vec<String>,
    /// File must carry none of these tags
    pub exclude_types: Vec<String>,
    /// Arguments appended to the entry
    pub args: Vec<String>,
    /// Run even when no file matches
    pub always_run: bool,
    /// Pass matched file names as arguments
    pub pass_filenames: bool,
    /// Never split the file list across invocations
    pub require_serial: bool,
    /// Print output even when the hook passes
    pub verbose: bool,
    /// Stages the hook is bound to (empty = all)
    pub stages: Vec<String>,
    /// Extra packages for the hook environment
    pub additional_dependencies: Vec<String>,
}

impl ResolvedHook {
    /// Whether hookpin can run this hook itself
    #[must_use]
    pub fn is_runnable(&self) -> bool {
        RUNNABLE_LANGUAGES.contains(&self.language.as_str())
    }

    /// Whether this hook is bound to `stage`
    ///
    /// Stage names are compared after normalizing legacy spellings.
    #[must_use]
    pub fn runs_at(&self, stage: &str) -> bool {
        use crate::manifest::normalize_stage;

        if self.stages.is_empty() {
            return true;
        }
        let wanted = normalize_stage(stage).unwrap_or(stage);
        self.stages
            .iter()
            .any(|s| normalize_stage(s).unwrap_or(s.as_str()) == wanted)
    }
}

fn default_exclude() -> String {
    "^$".to_string()
}

fn default_types() -> Vec<String> {
    vec!["file".to_string()]
}

fn default_pass_filenames() -> bool {
    true
}
