//! Git file discovery
//!
//! Hooks run against the files of the working repository: the staged files
//! by default, every tracked file with `--all-files`. Outside a repository
//! the directory tree is walked instead.

use hookpin_core::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Helper function to convert git2 errors to `hookpin_core` errors
#[inline]
#[allow(clippy::needless_pass_by_value)]
fn git_err(e: git2::Error) -> hookpin_core::Error {
    hookpin_core::Error::Git(e.message().to_string())
}

/// Find the working directory of the repository containing `path`
///
/// Returns `Ok(None)` when `path` is not inside a repository or the
/// repository is bare.
///
/// # Errors
///
/// Returns error if a repository is found but cannot be opened
pub fn discover_root(path: &Path) -> Result<Option<PathBuf>> {
    match git2::Repository::discover(path) {
        Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(git_err(e)),
    }
}

/// Files staged for the next commit
///
/// Additions, modifications, renames and type changes between `HEAD` and the
/// index. Staged deletions are left out: there is nothing to check.
///
/// # Errors
///
/// Returns error if the repository cannot be opened or its status read
pub fn staged_files(repo_root: &Path) -> Result<Vec<PathBuf>> {
    use git2::{Repository, Status, StatusOptions};

    let repo = Repository::open(repo_root).map_err(git_err)?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(false)
        .include_ignored(false)
        .renames_head_to_index(true);
    let statuses = repo.statuses(Some(&mut options)).map_err(git_err)?;

    let wanted = Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE;

    let mut files: Vec<PathBuf> = statuses
        .iter()
        .filter(|entry| entry.status().intersects(wanted))
        .filter_map(|entry| {
            entry
                .head_to_index()
                .and_then(|delta| delta.new_file().path().map(Path::to_path_buf))
                .or_else(|| entry.path().map(PathBuf::from))
        })
        .collect();
    files.sort();
    files.dedup();

    tracing::debug!(files = files.len(), "Collected staged files");
    Ok(files)
}

/// Every file in the index
///
/// # Errors
///
/// Returns error if the repository or its index cannot be read
pub fn tracked_files(repo_root: &Path) -> Result<Vec<PathBuf>> {
    let repo = git2::Repository::open(repo_root).map_err(git_err)?;
    let index = repo.index().map_err(git_err)?;

    let mut files: Vec<PathBuf> = index
        .iter()
        .map(|entry| PathBuf::from(String::from_utf8_lossy(&entry.path).into_owned()))
        .collect();
    files.sort();
    files.dedup();

    tracing::debug!(files = files.len(), "Collected tracked files");
    Ok(files)
}

/// Every file below `root`, skipping `.git`
///
/// # Errors
///
/// Returns error if a directory cannot be read
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.map_err(|e| {
            hookpin_core::Error::Message(format!("Failed to walk {}: {e}", root.display()))
        })?;
        if entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    tracing::debug!(files = files.len(), root = %root.display(), "Walked directory");
    Ok(files)
}
