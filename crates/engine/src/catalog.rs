//! Hook catalog and reference resolution
//!
//! The catalog holds the `.pre-commit-hooks.yaml` definitions of hook
//! repositories that are checked out locally. A checkout is keyed by its
//! directory name, which is matched against the last path segment of a
//! source's `repo` (`https://github.com/psf/black` → `black`).

use hookpin_config::definition::DEFINITIONS_FILE;
use hookpin_config::{HookDefinition, HookPosition, Manifest, ResolvedHook, SourceKind};
use hookpin_core::{Error, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Definitions from one hook repository checkout
#[derive(Debug, Clone)]
struct CatalogRepo {
    root: PathBuf,
    definitions: Vec<HookDefinition>,
}

/// Hook definitions from local checkouts, keyed by repository name
#[derive(Debug, Clone, Default)]
pub struct HookCatalog {
    repos: IndexMap<String, CatalogRepo>,
}

/// Where a resolved hook's definition came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOrigin {
    /// Catalog checkout at this path
    Catalog(PathBuf),
    /// Inline definition under `repo: local`
    Local,
    /// Built-in `meta` hook
    Meta,
    /// No definition available; only manifest overrides apply
    Unresolved,
}

/// A manifest hook reference merged with its definition
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    /// Position of the reference in the manifest
    pub position: HookPosition,
    /// Merged hook
    pub hook: ResolvedHook,
    /// Definition origin
    pub origin: HookOrigin,
}

impl ResolvedEntry {
    /// Directory `script` entries are resolved against
    ///
    /// Catalog hooks use their checkout; everything else uses `repo_root`.
    #[must_use]
    pub fn script_root<'a>(&'a self, repo_root: &'a Path) -> &'a Path {
        match &self.origin {
            HookOrigin::Catalog(root) => root,
            _ => repo_root,
        }
    }
}

impl HookCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every checkout in `dirs`
    ///
    /// # Errors
    ///
    /// Returns error if a directory has no readable definitions file
    pub fn from_dirs(dirs: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::new();

        for dir in dirs {
            let name = dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.trim_end_matches(".git").to_string())
                .ok_or_else(|| {
                    Error::HookConfig(format!(
                        "Catalog directory {} has no usable name",
                        dir.display()
                    ))
                })?;

            let definitions = HookDefinition::load_all(&dir.join(DEFINITIONS_FILE))?;
            tracing::debug!(
                repo = %name,
                path = %dir.display(),
                hooks = definitions.len(),
                "Loaded hook definitions"
            );
            catalog.insert(name, dir.clone(), definitions);
        }

        Ok(catalog)
    }

    /// Add or replace a repository's definitions
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        definitions: Vec<HookDefinition>,
    ) {
        self.repos.insert(
            name.into(),
            CatalogRepo {
                root: root.into(),
                definitions,
            },
        );
    }

    /// Number of repositories in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Whether the catalog holds no repositories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    /// Names of the repositories in the catalog
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.repos.keys().map(String::as_str)
    }

    /// Resolve every hook reference in the manifest, in manifest order
    ///
    /// # Errors
    ///
    /// Returns error if a catalog checkout does not define a referenced id,
    /// a local hook is incomplete, or a pattern does not compile
    pub fn resolve(&self, manifest: &Manifest) -> Result<Vec<ResolvedEntry>> {
        manifest
            .hooks()
            .map(|(position, source, hook_ref)| {
                let (definition, origin) = match source.kind() {
                    SourceKind::Local => (HookDefinition::from_local(hook_ref)?, HookOrigin::Local),
                    SourceKind::Meta => {
                        let definition = HookDefinition::meta(&hook_ref.id).ok_or_else(|| {
                            Error::HookConfig(format!("Unknown meta hook '{}'", hook_ref.id))
                        })?;
                        (definition, HookOrigin::Meta)
                    }
                    SourceKind::Remote => match self.repos.get(source.slug()) {
                        Some(repo) => {
                            let definition = repo
                                .definitions
                                .iter()
                                .find(|d| d.id == hook_ref.id)
                                .cloned()
                                .ok_or_else(|| {
                                    Error::HookConfig(format!(
                                        "Hook '{}' is not defined by {} (checked {})",
                                        hook_ref.id,
                                        source.location,
                                        repo.root.join(DEFINITIONS_FILE).display()
                                    ))
                                })?;
                            (definition, HookOrigin::Catalog(repo.root.clone()))
                        }
                        None => {
                            tracing::debug!(
                                hook_id = %hook_ref.id,
                                source = %source.location,
                                "No catalog entry, using manifest fields only"
                            );
                            (
                                HookDefinition::unresolved(&hook_ref.id),
                                HookOrigin::Unresolved,
                            )
                        }
                    },
                };

                let hook = definition.apply_overrides(hook_ref).map_err(|e| match e {
                    Error::Pattern { pattern, message } => Error::Pattern {
                        pattern,
                        message: format!(
                            "{message} (repos[{}].hooks[{}])",
                            position.source, position.hook
                        ),
                    },
                    other => other,
                })?;

                Ok(ResolvedEntry {
                    position,
                    hook,
                    origin,
                })
            })
            .collect()
    }
}
