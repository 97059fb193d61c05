//! File selection
//!
//! A [`FileSet`] holds the candidate files of one run together with their
//! type tags. Each hook then picks its files from the set.

use hookpin_config::patterns::normalize;
use hookpin_config::{FilePattern, ResolvedHook};
use hookpin_core::{Result, tags_for_path};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A candidate file with its precomputed tags
#[derive(Debug, Clone)]
struct Candidate {
    path: PathBuf,
    normalized: String,
    tags: BTreeSet<&'static str>,
}

/// Candidate files of a run
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    candidates: Vec<Candidate>,
}

impl FileSet {
    /// Tag `paths` (relative to `root`) in parallel
    ///
    /// Paths that no longer exist get no tags, so they only reach hooks that
    /// ask for no types at all.
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be inspected
    pub fn new(root: &Path, paths: Vec<PathBuf>) -> Result<Self> {
        let candidates = paths
            .into_par_iter()
            .map(|path| {
                let tags = tags_for_path(&root.join(&path))?;
                Ok(Candidate {
                    normalized: normalize(&path),
                    path,
                    tags,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(files = candidates.len(), "Tagged candidate files");
        Ok(Self { candidates })
    }

    /// Build a set from paths whose tags are already known
    pub fn from_tagged<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, BTreeSet<&'static str>)>,
    {
        let candidates = entries
            .into_iter()
            .map(|(path, tags)| Candidate {
                normalized: normalize(&path),
                path,
                tags,
            })
            .collect();
        Self { candidates }
    }

    /// Number of candidate files
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidate files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate paths in input order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.candidates.iter().map(|c| c.path.as_path())
    }

    /// Tags of a candidate path
    #[must_use]
    pub fn tags(&self, path: &Path) -> Option<&BTreeSet<&'static str>> {
        self.candidates
            .iter()
            .find(|c| c.path == path)
            .map(|c| &c.tags)
    }

    /// Files a hook runs against
    ///
    /// A path is kept when the global `files` matches and the global
    /// `exclude` does not, then the same for the hook's own patterns, and
    /// finally its tags satisfy the hook's type filters.
    #[must_use]
    pub fn select(
        &self,
        hook: &ResolvedHook,
        global_files: &FilePattern,
        global_exclude: &FilePattern,
    ) -> Vec<&Path> {
        self.filter(|c| {
            global_files.is_match(&c.normalized)
                && !global_exclude.is_match(&c.normalized)
                && hook.files.is_match(&c.normalized)
                && !hook.exclude.is_match(&c.normalized)
                && matches_types(&c.tags, &hook.types, &hook.types_or, &hook.exclude_types)
        })
    }

    /// Paths matching `pattern`
    #[must_use]
    pub fn matching(&self, pattern: &FilePattern) -> Vec<&Path> {
        self.filter(|c| pattern.is_match(&c.normalized))
    }

    /// Files a hook would see if it had no `exclude`
    #[must_use]
    pub fn included(&self, hook: &ResolvedHook) -> Vec<&Path> {
        self.filter(|c| {
            hook.files.is_match(&c.normalized)
                && matches_types(&c.tags, &hook.types, &hook.types_or, &hook.exclude_types)
        })
    }

    fn filter(&self, keep: impl Fn(&Candidate) -> bool) -> Vec<&Path> {
        self.candidates
            .iter()
            .filter(|c| keep(c))
            .map(|c| c.path.as_path())
            .collect()
    }
}

/// Check a file's tags against a hook's type filters
///
/// All of `types`, at least one of `types_or` (when non-empty) and none of
/// `exclude_types`.
#[must_use]
pub fn matches_types(
    tags: &BTreeSet<&'static str>,
    types: &[String],
    types_or: &[String],
    exclude_types: &[String],
) -> bool {
    types.iter().all(|t| tags.contains(t.as_str()))
        && (types_or.is_empty() || types_or.iter().any(|t| tags.contains(t.as_str())))
        && !exclude_types.iter().any(|t| tags.contains(t.as_str()))
}
