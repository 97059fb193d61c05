//! Manifest validation
//!
//! Loading only checks that the document is well-formed YAML with the right
//! shape. [`validate`] then walks the whole manifest and collects every
//! problem it finds, so one run reports all of them:
//!
//! - remote sources need a location and a revision pin
//! - every source needs at least one hook, every hook an id
//! - `files` / `exclude` must compile
//! - inline (`local`) hooks need `name`, `entry` and `language`
//! - hook entries covered by an earlier entry with the same id are redundant
//! - moving revisions, unknown keys, unknown tags and stages are warnings

use crate::definition::META_HOOKS;
use crate::manifest::{HookRef, HookSource, Manifest, SourceKind, normalize_stage};
use crate::patterns::FilePattern;
use hookpin_core::is_known_tag;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Revisions that name a branch rather than a fixed commit or tag
const MOVING_REVISIONS: &[&str] = &["HEAD", "master", "main", "develop", "trunk"];

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The manifest cannot be used as written
    Error,
    /// The manifest works but something is likely wrong
    Warning,
}

impl Severity {
    /// Get the string name of this severity
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// One problem found in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Error or warning
    pub severity: Severity,
    /// Where the problem is, e.g. `repos[1].hooks[0].exclude`
    pub location: String,
    /// What is wrong
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity.name(),
            self.location,
            self.message
        )
    }
}

/// Counts describing the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    /// Number of hook sources
    pub sources: usize,
    /// Number of hook entries across all sources
    pub hook_entries: usize,
    /// Number of distinct hook ids
    pub distinct_hook_ids: usize,
}

impl ManifestSummary {
    /// Summarize a manifest
    #[must_use]
    pub fn of(manifest: &Manifest) -> Self {
        Self {
            sources: manifest.source_count(),
            hook_entries: manifest.hook_count(),
            distinct_hook_ids: manifest.distinct_hook_ids().len(),
        }
    }
}

/// Result of validating a manifest
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Manifest counts
    pub summary: ManifestSummary,
    /// Every issue, in document order
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Issues with `Severity::Error`
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    /// Issues with `Severity::Warning`
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// No errors (warnings allowed)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// No issues at all
    #[must_use]
    pub fn is_valid_strict(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Collects issues while walking the manifest
#[derive(Default)]
struct Collector {
    issues: Vec<Issue>,
}

impl Collector {
    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, location.into(), message.into());
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, location.into(), message.into());
    }

    fn push(&mut self, severity: Severity, location: String, message: String) {
        tracing::debug!(severity = severity.name(), %location, %message, "Manifest issue");
        self.issues.push(Issue {
            severity,
            location,
            message,
        });
    }
}

/// Validate a loaded manifest
#[must_use]
pub fn validate(manifest: &Manifest) -> ValidationReport {
    let mut out = Collector::default();

    check_pattern(&mut out, "files", &manifest.files);
    check_pattern(&mut out, "exclude", &manifest.exclude);
    if let Some(stages) = &manifest.default_stages {
        check_stages(&mut out, "default_stages", stages);
    }
    for key in manifest.extra.keys() {
        out.warning(key.clone(), format!("Unexpected key '{key}' is ignored"));
    }

    for (index, source) in manifest.repos.iter().enumerate() {
        check_source(&mut out, &format!("repos[{index}]"), source);
    }

    ValidationReport {
        summary: ManifestSummary::of(manifest),
        issues: out.issues,
    }
}

fn check_source(out: &mut Collector, at: &str, source: &HookSource) {
    let kind = source.kind();

    if source.location.trim().is_empty() {
        out.error(format!("{at}.repo"), "Hook source must have a non-empty 'repo'");
    }

    match (kind, source.revision.as_deref().map(str::trim)) {
        (SourceKind::Remote, None | Some("")) => {
            out.error(
                format!("{at}.rev"),
                format!("Hook source '{}' must pin a non-empty 'rev'", source.location),
            );
        }
        (SourceKind::Remote, Some(rev)) if MOVING_REVISIONS.contains(&rev) => {
            out.warning(
                format!("{at}.rev"),
                format!("Revision '{rev}' is a branch name, not an immutable pin"),
            );
        }
        (SourceKind::Local | SourceKind::Meta, Some(_)) => {
            out.warning(
                format!("{at}.rev"),
                format!("'rev' has no effect for '{}' sources", kind.name()),
            );
        }
        _ => {}
    }

    for key in source.extra.keys() {
        out.warning(
            format!("{at}.{key}"),
            format!("Unexpected key '{key}' is ignored"),
        );
    }

    if source.hooks.is_empty() {
        out.error(
            format!("{at}.hooks"),
            format!("Hook source '{}' must list at least one hook", source.location),
        );
        return;
    }

    for (index, hook) in source.hooks.iter().enumerate() {
        check_hook(out, &format!("{at}.hooks[{index}]"), kind, hook);
    }

    check_redundant(out, at, &source.hooks);
}

fn check_hook(out: &mut Collector, at: &str, kind: SourceKind, hook: &HookRef) {
    if hook.id.trim().is_empty() {
        out.error(format!("{at}.id"), "Hook must have a non-empty 'id'");
    }

    match kind {
        SourceKind::Local => {
            for (key, value) in [
                ("name", &hook.name),
                ("entry", &hook.entry),
                ("language", &hook.language),
            ] {
                if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                    out.error(
                        format!("{at}.{key}"),
                        format!("Local hook '{}' must define '{key}'", hook.id),
                    );
                }
            }
        }
        SourceKind::Meta => {
            if !META_HOOKS.contains(&hook.id.as_str()) {
                out.error(
                    format!("{at}.id"),
                    format!(
                        "Unknown meta hook '{}'. Valid meta hooks: {}",
                        hook.id,
                        META_HOOKS.join(", ")
                    ),
                );
            }
        }
        SourceKind::Remote => {}
    }

    if let Some(files) = &hook.files {
        check_pattern(out, &format!("{at}.files"), files);
    }
    if let Some(exclude) = &hook.exclude {
        check_pattern(out, &format!("{at}.exclude"), exclude);
    }

    for (key, tags) in [
        ("types", &hook.types),
        ("types_or", &hook.types_or),
        ("exclude_types", &hook.exclude_types),
    ] {
        for tag in tags.iter().flatten() {
            if !is_known_tag(tag) {
                out.warning(
                    format!("{at}.{key}"),
                    format!("Unknown file type tag '{tag}' (typo?)"),
                );
            }
        }
    }

    if let Some(stages) = &hook.stages {
        check_stages(out, &format!("{at}.stages"), stages);
    }

    for key in hook.extra.keys() {
        out.warning(
            format!("{at}.{key}"),
            format!("Unexpected key '{key}' is ignored"),
        );
    }
}

fn check_pattern(out: &mut Collector, at: &str, pattern: &str) {
    if let Err(e) = FilePattern::new(pattern) {
        out.error(at, e.to_string());
    }
}

fn check_stages(out: &mut Collector, at: &str, stages: &[String]) {
    for stage in stages {
        if normalize_stage(stage).is_none() {
            out.warning(at, format!("Unknown stage '{stage}'"));
        }
    }
}

/// A tag list override compared without regard to order or repeats
type Tags = Option<BTreeSet<String>>;

fn tag_set(tags: Option<&Vec<String>>) -> Tags {
    tags.map(|t| t.iter().cloned().collect())
}

/// Fields that decide which files a hook entry sees and how it runs on them
#[derive(PartialEq)]
struct Scope<'a> {
    types: Tags,
    types_or: Tags,
    exclude_types: Tags,
    files: &'a Option<String>,
    exclude: &'a Option<String>,
    args: &'a Option<Vec<String>>,
    stages: &'a Option<Vec<String>>,
    entry: &'a Option<String>,
}

impl<'a> Scope<'a> {
    fn of(hook: &'a HookRef) -> Self {
        Self {
            types: tag_set(hook.types.as_ref()),
            types_or: tag_set(hook.types_or.as_ref()),
            exclude_types: tag_set(hook.exclude_types.as_ref()),
            files: &hook.files,
            exclude: &hook.exclude,
            args: &hook.args,
            stages: &hook.stages,
            entry: &hook.entry,
        }
    }

    /// Every file `narrower` selects is also selected by `self`
    ///
    /// Overrides replace the definition's value, so an override on one side
    /// only is comparable when it is the narrower side's `exclude`.
    fn covers(&self, narrower: &Self) -> bool {
        let same_invocation = self.args == narrower.args
            && self.stages == narrower.stages
            && self.entry == narrower.entry;
        let unfiltered = self.files.is_none() && self.exclude.is_none();

        // `types` and `exclude_types` narrow as they grow; `types_or` widens
        let requires_fewer = |wide: &Tags, narrow: &Tags| match (wide, narrow) {
            (None, None) => true,
            (Some(w), Some(n)) => w.is_subset(n),
            _ => false,
        };
        let allows_more = |wide: &Tags, narrow: &Tags| match (wide, narrow) {
            (None, None) => true,
            (Some(w), Some(n)) => !n.is_empty() && n.is_subset(w),
            _ => false,
        };

        same_invocation
            && unfiltered
            && narrower.files.is_none()
            && requires_fewer(&self.types, &narrower.types)
            && requires_fewer(&self.exclude_types, &narrower.exclude_types)
            && allows_more(&self.types_or, &narrower.types_or)
    }
}

/// Flag later entries that an earlier entry with the same id already covers
///
/// An exact repeat of the scope runs the same check twice; a narrower scope
/// under an unfiltered earlier entry only re-checks files already checked.
fn check_redundant(out: &mut Collector, at: &str, hooks: &[HookRef]) {
    for (later, hook) in hooks.iter().enumerate() {
        let scope = Scope::of(hook);
        let earlier = hooks[..later].iter().enumerate().find_map(|(index, prev)| {
            if prev.id != hook.id {
                return None;
            }
            let prev_scope = Scope::of(prev);
            if prev_scope == scope {
                Some((index, true))
            } else if prev_scope.covers(&scope) {
                Some((index, false))
            } else {
                None
            }
        });

        match earlier {
            Some((earlier, true)) => out.warning(
                format!("{at}.hooks[{later}]"),
                format!(
                    "Hook '{}' repeats {at}.hooks[{earlier}] with the same files, types and args; \
                     it only runs the same check twice",
                    hook.id
                ),
            ),
            Some((earlier, false)) => out.warning(
                format!("{at}.hooks[{later}]"),
                format!(
                    "Hook '{}' only selects files that {at}.hooks[{earlier}] already checks",
                    hook.id
                ),
            ),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn report(yaml: &str) -> ValidationReport {
        validate(&Manifest::from_yaml_str(yaml).unwrap())
    }

    fn locations(report: &ValidationReport, severity: Severity) -> Vec<String> {
        report
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .map(|i| i.location.clone())
            .collect()
    }

    #[test]
    fn test_valid_manifest() {
        let report = report(
            r"
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    hooks:
      - id: black
",
        );
        assert!(report.is_valid());
        assert!(report.is_valid_strict());
        assert_eq!(report.summary.sources, 1);
    }

    #[test]
    fn test_missing_rev_and_repo() {
        let report = report(
            r"
repos:
  - repo: https://github.com/psf/black
    hooks:
      - id: black
  - rev: v1.0.0
    hooks:
      - id: other
  - repo: https://github.com/pycqa/flake8
    rev: '  '
    hooks:
      - id: flake8
",
        );
        assert!(!report.is_valid());
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["repos[0].rev", "repos[1].repo", "repos[2].rev"]
        );
    }

    #[test]
    fn test_empty_hooks() {
        let report = report(
            r"
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    hooks: []
  - repo: https://github.com/pycqa/flake8
    rev: 6.0.0
",
        );
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["repos[0].hooks", "repos[1].hooks"]
        );
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let report = report(
            r"
exclude: '(broken'
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    hooks:
      - id: black
        exclude: '^docs/['
        files: '\.py$'
",
        );
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["exclude", "repos[0].hooks[0].exclude"]
        );
    }

    #[test]
    fn test_empty_hook_id() {
        let report = report(
            r"
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    hooks:
      - name: nameless
",
        );
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["repos[0].hooks[0].id"]
        );
    }

    #[test]
    fn test_redundant_duplicate() {
        let report = report(
            r"
repos:
  - repo: https://github.com/pycqa/isort
    rev: 5.12.0
    hooks:
      - id: isort
        types: [python]
      - id: isort
        types: [cython]
      - id: isort
        name: isort again
        types: [python]
",
        );
        assert!(report.is_valid());
        assert_eq!(
            locations(&report, Severity::Warning),
            vec!["repos[0].hooks[2]"]
        );
        let message = &report.warnings().next().unwrap().message;
        assert!(message.contains("repos[0].hooks[0]"));
    }

    #[test]
    fn test_redundant_regardless_of_tag_order() {
        let report = report(
            r"
repos:
  - repo: https://github.com/pycqa/isort
    rev: 5.12.0
    hooks:
      - id: isort
        types: [python, text]
      - id: isort
        types: [text, python, text]
",
        );
        assert_eq!(
            locations(&report, Severity::Warning),
            vec!["repos[0].hooks[1]"]
        );
    }

    #[test]
    fn test_narrower_entry_under_unfiltered_one() {
        let report = report(
            r"
repos:
  - repo: https://github.com/pycqa/flake8
    rev: 6.0.0
    hooks:
      - id: flake8
      - id: flake8
        exclude: ^docs/
      - id: flake8
        args: [--max-line-length=100]
        exclude: ^docs/
",
        );
        assert!(report.is_valid());
        assert_eq!(
            locations(&report, Severity::Warning),
            vec!["repos[0].hooks[1]"]
        );
        let message = &report.warnings().next().unwrap().message;
        assert!(message.contains("already checks"));
        assert!(message.contains("repos[0].hooks[0]"));
    }

    #[test]
    fn test_narrower_tags_under_broader_ones() {
        let unrelated = report(
            r"
repos:
  - repo: https://github.com/pre-commit/mirrors-prettier
    rev: v3.0.0
    hooks:
      - id: prettier
        types_or: [json, yaml, markdown]
      - id: prettier
        types_or: [json]
        exclude_types: [markdown]
      - id: prettier
        types_or: [json, toml]
",
        );
        assert!(unrelated.is_valid_strict());

        let nested = report(
            r"
repos:
  - repo: https://github.com/pre-commit/mirrors-prettier
    rev: v3.0.0
    hooks:
      - id: prettier
        types_or: [json, yaml, markdown]
      - id: prettier
        types_or: [yaml, json]
",
        );
        assert_eq!(
            locations(&nested, Severity::Warning),
            vec!["repos[0].hooks[1]"]
        );
    }

    #[test]
    fn test_same_id_different_scope_is_not_redundant() {
        let report = report(
            r"
repos:
  - repo: https://github.com/pycqa/isort
    rev: 5.12.0
    hooks:
      - id: isort
        name: isort (python)
      - id: isort
        name: isort (cython)
        types: [cython]
      - id: isort
        name: isort (pyi)
        types: [pyi]
",
        );
        assert!(report.is_valid_strict());
    }

    #[test]
    fn test_local_hook_requirements() {
        let report = report(
            r"
repos:
  - repo: local
    hooks:
      - id: pytest
        name: pytest
        entry: pytest
      - id: mypy
        entry: mypy
        language: system
",
        );
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["repos[0].hooks[0].language", "repos[0].hooks[1].name"]
        );
    }

    #[test]
    fn test_local_rev_is_warning() {
        let report = report(
            r"
repos:
  - repo: local
    rev: v1
    hooks:
      - id: fmt
        name: fmt
        entry: cargo fmt
        language: system
",
        );
        assert!(report.is_valid());
        assert_eq!(locations(&report, Severity::Warning), vec!["repos[0].rev"]);
    }

    #[test]
    fn test_meta_hooks() {
        let report = report(
            r"
repos:
  - repo: meta
    hooks:
      - id: check-useless-excludes
      - id: check-everything
",
        );
        assert_eq!(
            locations(&report, Severity::Error),
            vec!["repos[0].hooks[1].id"]
        );
    }

    #[test]
    fn test_moving_revision_warning() {
        let report = report(
            r"
repos:
  - repo: https://github.com/psf/black
    rev: main
    hooks:
      - id: black
",
        );
        assert!(report.is_valid());
        assert!(!report.is_valid_strict());
        assert!(report.warnings().next().unwrap().message.contains("main"));
    }

    #[test]
    fn test_unknown_keys_tags_and_stages() {
        let report = report(
            r"
colour: blue
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    mirror: true
    hooks:
      - id: black
        types: [pythn]
        stages: [on-save]
        speed: fast
",
        );
        assert!(report.is_valid());
        assert_eq!(
            locations(&report, Severity::Warning),
            vec![
                "colour",
                "repos[0].mirror",
                "repos[0].hooks[0].types",
                "repos[0].hooks[0].stages",
                "repos[0].hooks[0].speed",
            ]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue {
            severity: Severity::Error,
            location: "repos[0].rev".to_string(),
            message: "missing".to_string(),
        };
        assert_eq!(issue.to_string(), "error: repos[0].rev: missing");
    }
}
