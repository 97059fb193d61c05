//! XDG directory utilities
//!
//! This module provides XDG-compliant directory paths for hookpin.
//! It follows the XDG Base Directory specification using the `xdg` crate:
//! - `XDG_CONFIG_HOME` defaults to ~/.config

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Get the hookpin config directory
///
/// Returns `$XDG_CONFIG_HOME/hookpin` or `~/.config/hookpin`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("hookpin").get_config_home()
}

/// Get the default settings file path
///
/// Returns `$XDG_CONFIG_HOME/hookpin/config.toml` or `~/.config/hookpin/config.toml`
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_config_dir_contains_prefix() {
        if let Some(dir) = config_dir() {
            assert!(
                dir.to_string_lossy().contains("hookpin"),
                "config_dir path should contain 'hookpin': {dir:?}"
            );
        }
    }

    #[test]
    fn test_default_config_file_name() {
        if let Some(path) = default_config_file() {
            assert_eq!(path.file_name().unwrap(), "config.toml");
        }
    }
}
