//! Common utilities and types shared across CLI commands

use anyhow::{Context, Result};
use hookpin_config::{Config, Manifest};
use hookpin_engine::meta::MetaContext;
use hookpin_engine::plan::DEFAULT_STAGE;
use hookpin_engine::{ExecutionPlan, FileSet, HookCatalog, ResolvedEntry, git};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime context for CLI commands
///
/// Holds the settings and the locations every command works from.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Shared settings (uses Arc to avoid cloning)
    pub config: Arc<Config>,
    /// Root of the working repository (or the current directory outside git)
    pub repo_root: PathBuf,
    /// Whether `repo_root` is a git working tree
    pub in_git: bool,
    /// Directory the command was started from; explicit files are relative to it
    pub cwd: PathBuf,
    /// Manifest to read
    pub manifest_path: PathBuf,
    /// Whether to print Nerd Font icons
    pub use_icons: bool,
}

impl RuntimeContext {
    /// Create a context for the current directory
    ///
    /// `manifest` overrides the manifest path from the settings; relative
    /// settings paths are taken from the repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or the
    /// enclosing repository cannot be opened.
    pub fn new(config: Config, manifest: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let discovered = git::discover_root(&cwd).context("Failed to open git repository")?;
        let in_git = discovered.is_some();
        let repo_root = discovered.unwrap_or_else(|| cwd.clone());

        let manifest_path = match manifest {
            Some(path) => path.to_path_buf(),
            None => repo_root.join(&config.general.manifest),
        };
        let use_icons = config
            .ui
            .icons
            .should_show_icons(std::io::stdout().is_terminal());

        tracing::debug!(
            repo_root = %repo_root.display(),
            manifest = %manifest_path.display(),
            in_git,
            "Resolved runtime context"
        );

        Ok(Self {
            config: Arc::new(config),
            repo_root,
            in_git,
            cwd,
            manifest_path,
            use_icons,
        })
    }

    /// Create a context with explicit locations, started from `repo_root`
    #[must_use]
    pub fn from_parts(config: Config, repo_root: PathBuf, in_git: bool) -> Self {
        let manifest_path = repo_root.join(&config.general.manifest);
        Self {
            config: Arc::new(config),
            cwd: repo_root.clone(),
            repo_root,
            in_git,
            manifest_path,
            use_icons: false,
        }
    }

    /// Same context, started from `cwd`
    #[must_use]
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Load the manifest
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub fn load_manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest_path)
            .with_context(|| format!("Failed to load manifest {}", self.manifest_path.display()))
    }

    /// Load the hook catalog from the configured checkouts
    ///
    /// # Errors
    ///
    /// Returns an error if a checkout has no readable definitions.
    pub fn catalog(&self) -> Result<HookCatalog> {
        HookCatalog::from_dirs(&self.config.catalog.dirs).context("Failed to load hook catalog")
    }

    /// Candidate files for a run, relative to the repository root
    ///
    /// Explicit `files` win and are taken relative to the directory the
    /// command was started from; otherwise all tracked files with
    /// `all_files`, else the staged files. Outside git the directory tree is
    /// used.
    ///
    /// # Errors
    ///
    /// Returns an error if git or the filesystem cannot be read.
    pub fn candidate_files(&self, all_files: bool, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if !files.is_empty() {
            return Ok(files
                .iter()
                .map(|f| relative_to(&self.repo_root, &self.cwd, f))
                .collect());
        }

        let found = if !self.in_git {
            git::walk_files(&self.repo_root)
        } else if all_files {
            git::tracked_files(&self.repo_root)
        } else {
            git::staged_files(&self.repo_root)
        };
        found.context("Failed to collect files")
    }

    /// Every file of the repository, for the `meta` hooks
    ///
    /// # Errors
    ///
    /// Returns an error if git or the filesystem cannot be read.
    pub fn all_files(&self) -> Result<Vec<PathBuf>> {
        self.candidate_files(true, &[])
    }
}

/// Express `path`, given relative to `cwd`, relative to `root`
///
/// Paths outside `root` are returned unchanged.
fn relative_to(root: &Path, cwd: &Path, path: &Path) -> PathBuf {
    let absolute = cwd.join(path);

    // Existing files: compare real locations (symlinked roots, `..`)
    let real = absolute
        .canonicalize()
        .ok()
        .zip(root.canonicalize().ok())
        .and_then(|(real, real_root)| real.strip_prefix(&real_root).ok().map(Path::to_path_buf));
    if let Some(stripped) = real {
        return stripped;
    }

    match absolute.strip_prefix(root) {
        Ok(stripped) => stripped.components().collect(),
        Err(_) => path.to_path_buf(),
    }
}

/// Everything `plan` and `run` work from
pub struct Prepared {
    /// The loaded manifest
    pub manifest: Manifest,
    /// Hook references merged with their definitions
    pub resolved: Vec<ResolvedEntry>,
    /// Candidate files with their tags
    pub files: FileSet,
    /// The plan for the requested stage
    pub plan: ExecutionPlan,
}

impl Prepared {
    /// Load, resolve, collect files and plan
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn new(
        context: &RuntimeContext,
        all_files: bool,
        stage: Option<&str>,
        files: &[PathBuf],
    ) -> Result<Self> {
        let manifest = context.load_manifest()?;
        let resolved = context
            .catalog()?
            .resolve(&manifest)
            .context("Failed to resolve hooks")?;

        let candidates = context.candidate_files(all_files, files)?;
        let files = FileSet::new(&context.repo_root, candidates).context("Failed to tag files")?;

        let plan = ExecutionPlan::build(
            &manifest,
            &resolved,
            &files,
            stage.unwrap_or(DEFAULT_STAGE),
        )
        .context("Failed to build execution plan")?;

        Ok(Self {
            manifest,
            resolved,
            files,
            plan,
        })
    }

    /// Whether a `meta` hook will run
    #[must_use]
    pub fn needs_meta(&self) -> bool {
        self.plan.runnable().any(|planned| {
            self.resolved
                .iter()
                .any(|e| e.position == planned.position() && e.hook.language == "meta")
        })
    }

    /// Context for the `meta` hooks over `all_files`
    #[must_use]
    pub fn meta_context<'a>(&'a self, all_files: &'a FileSet) -> MetaContext<'a> {
        MetaContext {
            manifest: &self.manifest,
            resolved: &self.resolved,
            files: all_files,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_relative_to() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_to(root, root, Path::new("/repo/src/a.py")),
            PathBuf::from("src/a.py")
        );
        assert_eq!(
            relative_to(root, root, Path::new("./src/a.py")),
            PathBuf::from("src/a.py")
        );
        assert_eq!(
            relative_to(root, Path::new("/repo/src"), Path::new("a.py")),
            PathBuf::from("src/a.py")
        );
        assert_eq!(
            relative_to(root, root, Path::new("/elsewhere/b.py")),
            PathBuf::from("/elsewhere/b.py")
        );
    }

    #[test]
    fn test_explicit_files_are_relative_to_cwd() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("pkg/a.py"), "").unwrap();

        let context = RuntimeContext::from_parts(Config::default(), temp.path().to_path_buf(), false)
            .with_cwd(temp.path().join("pkg"));
        let files = context
            .candidate_files(false, &[PathBuf::from("a.py")])
            .unwrap();

        assert_eq!(files, vec![PathBuf::from("pkg/a.py")]);
        assert!(temp.path().join(&files[0]).is_file());
    }

    #[test]
    fn test_candidate_files_outside_git() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "").unwrap();
        fs::write(temp.path().join("b.json"), "").unwrap();

        let context = RuntimeContext::from_parts(Config::default(), temp.path().to_path_buf(), false);
        assert_eq!(
            context.candidate_files(false, &[]).unwrap(),
            vec![PathBuf::from("a.py"), PathBuf::from("b.json")]
        );
        assert_eq!(
            context
                .candidate_files(false, &[temp.path().join("b.json")])
                .unwrap(),
            vec![PathBuf::from("b.json")]
        );
    }

    #[test]
    fn test_prepared_plan() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(
            temp.path().join(".pre-commit-config.yaml"),
            r"
repos:
  - repo: local
    hooks:
      - id: py
        name: py
        entry: cat
        language: system
        types: [python]
  - repo: meta
    hooks:
      - id: identity
",
        )
        .unwrap();

        let context = RuntimeContext::from_parts(Config::default(), temp.path().to_path_buf(), false);
        let prepared = Prepared::new(&context, false, None, &[]).unwrap();

        assert_eq!(prepared.plan.stage, "pre-commit");
        assert_eq!(prepared.plan.hooks[0].files, vec![PathBuf::from("a.py")]);
        assert!(prepared.needs_meta());
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let context = RuntimeContext::from_parts(Config::default(), temp.path().to_path_buf(), false);
        let err = context.load_manifest().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load manifest"));
    }
}
