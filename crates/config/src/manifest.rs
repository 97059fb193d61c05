//! Hook manifest model and loader
//!
//! The manifest is the `.pre-commit-config.yaml` document: an ordered list of
//! hook sources, each pinned to a revision and selecting hooks by id.
//!
//! ```yaml
//! repos:
//!   - repo: https://github.com/psf/black
//!     rev: 23.3.0
//!     hooks:
//!       - id: black
//! ```
//!
//! Declaration order is execution order, so every sequence here is a `Vec`
//! and every free-form mapping an `IndexMap`.

use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name, looked up at the repository root
pub const MANIFEST_FILE: &str = ".pre-commit-config.yaml";

/// Sentinel `repo` value for hooks defined inline in the manifest
pub const LOCAL_REPO: &str = "local";

/// Sentinel `repo` value for the built-in manifest checks
pub const META_REPO: &str = "meta";

/// Every git hook stage a hook may be bound to
pub const STAGES: &[&str] = &[
    "commit-msg",
    "manual",
    "post-checkout",
    "post-commit",
    "post-merge",
    "post-rewrite",
    "pre-commit",
    "pre-merge-commit",
    "pre-push",
    "pre-rebase",
    "prepare-commit-msg",
];

/// Normalize a stage name, accepting the legacy short spellings
///
/// Returns `None` for names that are not stages at all.
#[must_use]
pub fn normalize_stage(stage: &str) -> Option<&'static str> {
    match stage {
        "commit" => Some("pre-commit"),
        "push" => Some("pre-push"),
        "merge-commit" => Some("pre-merge-commit"),
        other => STAGES.iter().copied().find(|s| *s == other),
    }
}

/// The whole manifest document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Hook sources in execution order
    pub repos: Vec<HookSource>,

    /// Global include pattern applied before every hook's own filters
    #[serde(default = "default_files")]
    pub files: String,

    /// Global exclude pattern applied before every hook's own filters
    #[serde(default = "default_exclude")]
    pub exclude: String,

    /// Stop after the first failing hook
    #[serde(default)]
    pub fail_fast: bool,

    /// Stages used by hooks that declare none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_stages: Option<Vec<String>>,

    /// Minimum runner version the manifest was written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pre_commit_version: Option<String>,

    /// Language to version defaults for hook environments
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub default_language_version: IndexMap<String, String>,

    /// CI service settings, carried along untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<serde_yaml::Value>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// What a `repo` entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A hook repository fetched at a pinned revision
    Remote,
    /// Hooks defined inline in the manifest
    Local,
    /// Built-in checks about the manifest itself
    Meta,
}

impl SourceKind {
    /// Get the string name of this source kind
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Remote => "remote",
            SourceKind::Local => "local",
            SourceKind::Meta => "meta",
        }
    }
}

/// One `repos` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookSource {
    /// Location of the hook repository (or `local` / `meta`)
    #[serde(rename = "repo", default)]
    pub location: String,

    /// Immutable revision pin (tag or commit)
    #[serde(rename = "rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Hooks selected from this source, in execution order
    #[serde(default)]
    pub hooks: Vec<HookRef>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl HookSource {
    /// Classify the `repo` value
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self.location.as_str() {
            LOCAL_REPO => SourceKind::Local,
            META_REPO => SourceKind::Meta,
            _ => SourceKind::Remote,
        }
    }

    /// Short name of the source: last path segment of the location
    ///
    /// `https://github.com/psf/black.git` → `black`
    #[must_use]
    pub fn slug(&self) -> &str {
        let trimmed = self.location.trim_end_matches('/');
        let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
        last.strip_suffix(".git").unwrap_or(last)
    }
}

/// One hook selected from a source, with optional overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookRef {
    /// Id of the hook exposed by the source
    #[serde(default)]
    pub id: String,

    /// Display name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Alternative id used to select this entry from the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Command to run (local hooks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Hook language (local hooks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Include pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<String>,

    /// Exclude pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// File must carry every one of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,

    /// File must carry at least one of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types_or: Option<Vec<String>>,

    /// File must carry none of these tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_types: Option<Vec<String>>,

    /// Extra packages for the hook environment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_dependencies: Vec<String>,

    /// Extra arguments appended to the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Stages this hook is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<String>>,

    /// Run even when no file matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_run: Option<bool>,

    /// Pass matched file names as arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_filenames: Option<bool>,

    /// Never split the file list across invocations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_serial: Option<bool>,

    /// Print output even when the hook passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Interpreter version for the hook environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,

    /// Write hook output to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl HookRef {
    /// Name shown to users: the override if any, otherwise the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether `selector` picks this hook (by id or alias)
    #[must_use]
    pub fn matches_selector(&self, selector: &str) -> bool {
        self.id == selector || self.alias.as_deref() == Some(selector)
    }
}

/// Position of a hook inside the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HookPosition {
    /// Index into `repos`
    pub source: usize,
    /// Index into that source's `hooks`
    pub hook: usize,
}

impl Manifest {
    /// Load a manifest from a YAML file
    ///
    /// Syntax errors fail fast: nothing else happens until the document parses.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid manifest
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading manifest");

        let content = fs::read_to_string(path).map_err(|e| {
            crate::Error::Message(format!(
                "Failed to read manifest {}: {e}",
                path.display()
            ))
        })?;

        Self::parse(&content, path)
    }

    /// Parse a manifest from a YAML string
    ///
    /// # Errors
    ///
    /// Returns error if the string is not a valid manifest
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<string>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            let location = e.location();
            crate::Error::Parse {
                path: PathBuf::from(path),
                line: location.as_ref().map(serde_yaml::Location::line),
                column: location.as_ref().map(serde_yaml::Location::column),
                message: e.to_string(),
            }
        })
    }

    /// Number of hook sources
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.repos.len()
    }

    /// Number of hook entries across all sources
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.repos.iter().map(|r| r.hooks.len()).sum()
    }

    /// Hook ids in first-seen order, each once
    #[must_use]
    pub fn distinct_hook_ids(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.hooks()
            .filter_map(|(_, _, hook)| seen.insert(hook.id.as_str()).then_some(hook.id.as_str()))
            .collect()
    }

    /// All hooks in execution order
    pub fn hooks(&self) -> impl Iterator<Item = (HookPosition, &HookSource, &HookRef)> {
        self.repos.iter().enumerate().flat_map(|(s, source)| {
            source.hooks.iter().enumerate().map(move |(h, hook)| {
                (HookPosition { source: s, hook: h }, source, hook)
            })
        })
    }

    /// Look up a hook by position
    #[must_use]
    pub fn hook_at(&self, position: HookPosition) -> Option<(&HookSource, &HookRef)> {
        let source = self.repos.get(position.source)?;
        let hook = source.hooks.get(position.hook)?;
        Some((source, hook))
    }
}

fn default_files() -> String {
    String::new()
}

fn default_exclude() -> String {
    "^$".to_string()
}
