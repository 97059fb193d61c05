//! File path patterns
//!
//! `files` and `exclude` are regular expressions searched (not anchored)
//! against `/`-separated paths relative to the repository root. An empty
//! pattern matches every path; the default `exclude` is `^$`, which matches
//! none.

use crate::Result;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// A compiled `files` / `exclude` pattern
#[derive(Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    /// Compile a pattern
    ///
    /// `\Z` (end of input in the manifest's regex dialect) is accepted and
    /// rewritten to `\z`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if the expression does not compile
    pub fn new(pattern: &str) -> Result<Self> {
        let translated = translate(pattern);
        let regex = Regex::new(&translated).map_err(|e| crate::Error::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern that matches every path
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            source: String::new(),
            regex: Regex::new("").expect("empty regex is valid"),
        }
    }

    /// Pattern that matches no path
    #[must_use]
    pub fn match_none() -> Self {
        Self {
            source: "^$".to_string(),
            regex: Regex::new("^$").expect("'^$' is a valid regex"),
        }
    }

    /// The pattern as written in the manifest
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Search the pattern anywhere in a `/`-separated path string
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Search the pattern in a path, normalizing separators first
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        self.is_match(&normalize(path))
    }
}

impl fmt::Debug for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilePattern").field(&self.source).finish()
    }
}

impl PartialEq for FilePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Render a path with `/` separators, the form patterns are written against
#[must_use]
pub fn normalize(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Rewrite `\Z` to `\z`, leaving escaped backslashes (`\\Z`) alone
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('Z') => out.push_str("\\z"),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_search_semantics() {
        let pattern = FilePattern::new(r"\.py$").unwrap();
        assert!(pattern.is_match("pkg/module.py"));
        assert!(!pattern.is_match("pkg/module.pyi"));
    }

    #[test]
    fn test_anchored_directory_exclude() {
        let pattern = FilePattern::new("^docs/").unwrap();
        assert!(pattern.is_match("docs/conf.py"));
        assert!(!pattern.is_match("src/docs/conf.py"));
    }

    #[test]
    fn test_match_all_and_none() {
        assert!(FilePattern::match_all().is_match("anything/at/all"));
        assert!(!FilePattern::match_none().is_match("anything"));
        assert_eq!(FilePattern::new("^$").unwrap(), FilePattern::match_none());
    }

    #[test]
    fn test_verbose_pattern() {
        let pattern = FilePattern::new(
            r"(?x)^(
                tests/data/.*|
                docs/_build/.*
            )$",
        )
        .unwrap();
        assert!(pattern.is_match("tests/data/basis.json"));
        assert!(pattern.is_match("docs/_build/index.html"));
        assert!(!pattern.is_match("src/lib.py"));
    }

    #[test]
    fn test_end_of_input_escape() {
        let pattern = FilePattern::new(r"\.json\Z").unwrap();
        assert!(pattern.is_match("a.json"));
        assert!(!pattern.is_match("a.json5"));
        assert_eq!(pattern.as_str(), r"\.json\Z");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = FilePattern::new("(unclosed").unwrap_err();
        match err {
            crate::Error::Pattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected pattern error, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_keeps_escaped_backslash() {
        assert_eq!(translate(r"\\Z"), r"\\Z");
        assert_eq!(translate(r"a\Z"), r"a\z");
        assert_eq!(translate("trailing\\"), "trailing\\");
    }
}
