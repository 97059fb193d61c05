//! Settings management
//!
//! hookpin's own settings live in a small TOML file, separate from the hook
//! manifest it reads. Every section is optional.
//!
//! ```toml
//! [general]
//! manifest = ".pre-commit-config.yaml"
//!
//! [lint]
//! strict = true
//!
//! [catalog]
//! dirs = ["~/.cache/hookpin/repos/black"]
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Icon display mode (similar to eza's --icons option)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IconMode {
    /// Automatically show icons when output is a terminal
    #[default]
    #[serde(alias = "automatic")]
    Auto,
    /// Always show icons
    Always,
    /// Never show icons
    Never,
}

impl IconMode {
    /// Determine if icons should be shown based on mode and terminal detection
    #[must_use]
    pub fn should_show_icons(&self, is_tty: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_tty,
        }
    }
}

/// General settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Manifest path, relative to the repository root
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

/// Validation settings section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Treat warnings as errors in `validate`
    #[serde(default)]
    pub strict: bool,
}

/// UI settings section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Icon display mode: "auto", "always", or "never"
    #[serde(default)]
    pub icons: IconMode,
}

/// Hook catalog settings section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Checkouts of hook repositories holding `.pre-commit-hooks.yaml`
    ///
    /// Can use ~ for home directory
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
}

/// Hook execution settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum file names passed to a single hook invocation
    #[serde(default = "default_max_args")]
    pub max_args: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_args: default_max_args(),
        }
    }
}

/// hookpin settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings section
    #[serde(default)]
    pub general: GeneralConfig,

    /// Validation settings section
    #[serde(default)]
    pub lint: LintConfig,

    /// UI settings section
    #[serde(default)]
    pub ui: UiConfig,

    /// Hook catalog settings section
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Hook execution settings section
    #[serde(default)]
    pub run: RunConfig,
}

fn default_manifest() -> PathBuf {
    PathBuf::from(crate::manifest::MANIFEST_FILE)
}

fn default_max_args() -> usize {
    4096
}

impl Config {
    /// Load settings from a file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            crate::Error::Settings(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut config = Self::from_toml_str(&content).map_err(|e| {
            crate::Error::Settings(format!("Failed to parse {}: {e}", path.display()))
        })?;

        if let Some(parent) = path.parent() {
            config.resolve_relative_paths(parent);
        }

        Ok(config)
    }

    /// Load settings from an explicit path, or the default location
    ///
    /// A missing default file yields default settings; a missing explicit
    /// file is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the settings file exists but is invalid
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match crate::dirs::default_config_file() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading settings");
                Self::load(&path)
            }
            _ => {
                tracing::debug!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse settings from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str(toml_content).map_err(|e| crate::Error::Settings(e.to_string()))
    }

    /// Expand `~` and make catalog directories absolute
    fn resolve_relative_paths(&mut self, base_dir: &Path) {
        for dir in &mut self.catalog.dirs {
            let expanded = expand_tilde(dir);
            *dir = if expanded.is_absolute() {
                expanded
            } else {
                base_dir.join(expanded)
            };
        }
    }
}

/// Expand a leading `~` to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match ::dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(
            config.general.manifest,
            PathBuf::from(".pre-commit-config.yaml")
        );
        assert!(!config.lint.strict);
        assert_eq!(config.ui.icons, IconMode::Auto);
        assert!(config.catalog.dirs.is_empty());
        assert_eq!(config.run.max_args, 4096);
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = Config::from_toml_str(
            r#"
[lint]
strict = true

[ui]
icons = "never"
"#,
        )
        .unwrap();

        assert!(config.lint.strict);
        assert_eq!(config.ui.icons, IconMode::Never);
        assert_eq!(config.run.max_args, 4096);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = Config::from_toml_str("[lint]\nstrict = \"yes\"").unwrap_err();
        assert!(matches!(err, crate::Error::Settings(_)));
    }

    #[test]
    fn test_load_resolves_catalog_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[catalog]\ndirs = [\"repos/black\", \"/abs/flake8\"]\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.catalog.dirs[0], temp.path().join("repos/black"));
        assert_eq!(config.catalog.dirs[1], PathBuf::from("/abs/flake8"));
    }

    #[test]
    fn test_load_or_default_explicit_missing() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_or_default(Some(&temp.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_icon_mode() {
        assert!(IconMode::Always.should_show_icons(false));
        assert!(!IconMode::Never.should_show_icons(true));
        assert!(IconMode::Auto.should_show_icons(true));
        assert!(!IconMode::Auto.should_show_icons(false));
    }

    #[test]
    fn test_expand_tilde_plain_path() {
        assert_eq!(expand_tilde(Path::new("a/b")), PathBuf::from("a/b"));
    }
}
