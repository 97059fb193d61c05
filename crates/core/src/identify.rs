//! File type identification
//!
//! Maps paths to identify-style tags (`file`, `text`, `python`, `json`, ...).
//! Hooks restrict the files they run against with `types`, `types_or` and
//! `exclude_types`, all expressed in these tags.

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Tags describing what kind of filesystem entry a path is
const MODE_TAGS: &[&str] = &[
    "file",
    "directory",
    "symlink",
    "executable",
    "non-executable",
    "text",
    "binary",
];

/// Extension to tags
const EXTENSIONS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("c", &["c"]),
    ("cfg", &["ini"]),
    ("cpp", &["c++"]),
    ("css", &["css"]),
    ("csv", &["csv"]),
    ("go", &["go"]),
    ("h", &["header", "c"]),
    ("html", &["html"]),
    ("ini", &["ini"]),
    ("ipynb", &["jupyter", "json"]),
    ("js", &["javascript"]),
    ("json", &["json"]),
    ("md", &["markdown"]),
    ("pxd", &["cython"]),
    ("pxi", &["cython"]),
    ("py", &["python"]),
    ("pyi", &["pyi"]),
    ("pyx", &["cython"]),
    ("rs", &["rust"]),
    ("rst", &["rst"]),
    ("sh", &["shell", "sh"]),
    ("toml", &["toml"]),
    ("ts", &["ts"]),
    ("txt", &["plain-text"]),
    ("xml", &["xml"]),
    ("yaml", &["yaml"]),
    ("yml", &["yaml"]),
    ("zsh", &["shell", "zsh"]),
];

/// Well-known file names to tags
const NAMES: &[(&str, &[&str])] = &[
    (".bashrc", &["shell", "bash"]),
    (".gitattributes", &["gitattributes"]),
    (".gitignore", &["gitignore"]),
    (".pre-commit-config.yaml", &["yaml"]),
    (".pre-commit-hooks.yaml", &["yaml"]),
    (".zshrc", &["shell", "zsh"]),
    ("Cargo.lock", &["toml"]),
    ("Dockerfile", &["dockerfile"]),
    ("LICENSE", &["plain-text"]),
    ("Makefile", &["makefile"]),
    ("setup.cfg", &["ini"]),
];

/// Interpreter names found in shebangs to tags
const INTERPRETERS: &[(&str, &[&str])] = &[
    ("bash", &["shell", "bash"]),
    ("python", &["python"]),
    ("python3", &["python", "python3"]),
    ("sh", &["shell", "sh"]),
    ("zsh", &["shell", "zsh"]),
];

/// Check whether a tag is one hookpin knows how to produce
#[must_use]
pub fn is_known_tag(tag: &str) -> bool {
    MODE_TAGS.contains(&tag)
        || EXTENSIONS
            .iter()
            .chain(NAMES.iter())
            .chain(INTERPRETERS.iter())
            .any(|(_, tags)| tags.contains(&tag))
}

/// Tags derivable from a file name alone (no filesystem access)
///
/// Exact file names win over extensions: `setup.cfg` is `ini` because it is
/// listed by name, `foo.cfg` because of its extension.
#[must_use]
pub fn tags_for_name(name: &str) -> BTreeSet<&'static str> {
    let mut tags = BTreeSet::new();

    if let Some((_, found)) = NAMES.iter().find(|(n, _)| *n == name) {
        tags.extend(found.iter().copied());
        return tags;
    }

    if let Some((_, ext)) = name.rsplit_once('.') {
        let ext = ext.to_ascii_lowercase();
        if let Some((_, found)) = EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            tags.extend(found.iter().copied());
        }
    }

    tags
}

/// Identify a path on disk
///
/// Missing paths return an empty set: a deleted file has nothing to check.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be inspected.
pub fn tags_for_path(path: &Path) -> crate::Result<BTreeSet<&'static str>> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(BTreeSet::new());
    };

    let mut tags = BTreeSet::new();

    if metadata.file_type().is_symlink() {
        tags.insert("symlink");
        return Ok(tags);
    }
    if metadata.is_dir() {
        tags.insert("directory");
        return Ok(tags);
    }

    tags.insert("file");

    let executable = is_executable(&metadata);
    tags.insert(if executable {
        "executable"
    } else {
        "non-executable"
    });

    let head = read_head(path)?;
    let is_text = !head.contains(&0);
    tags.insert(if is_text { "text" } else { "binary" });

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let by_name = tags_for_name(name);
    if by_name.is_empty() && executable && is_text {
        tags.extend(tags_from_shebang(&head));
    } else {
        tags.extend(by_name);
    }

    Ok(tags)
}

fn read_head(path: &Path) -> crate::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(1024);
    fs::File::open(path)?.take(1024).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

/// `#!/usr/bin/env python3` → `python`, `python3`
fn tags_from_shebang(head: &[u8]) -> BTreeSet<&'static str> {
    let mut tags = BTreeSet::new();
    let first_line = head.split(|b| *b == b'\n').next().unwrap_or_default();
    let Some(line) = std::str::from_utf8(first_line)
        .ok()
        .and_then(|l| l.strip_prefix("#!"))
    else {
        return tags;
    };

    let mut parts = line.split_whitespace();
    let Some(program) = parts.next() else {
        return tags;
    };
    let program = program.rsplit('/').next().unwrap_or(program);
    let interpreter = if program == "env" {
        parts.find(|p| !p.starts_with('-')).unwrap_or_default()
    } else {
        program
    };

    if let Some((_, found)) = INTERPRETERS.iter().find(|(i, _)| *i == interpreter) {
        tags.extend(found.iter().copied());
    }
    tags
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tags_for_name_extensions() {
        assert!(tags_for_name("module.py").contains("python"));
        assert!(tags_for_name("stubs.pyi").contains("pyi"));
        assert!(tags_for_name("fast.pyx").contains("cython"));
        assert!(tags_for_name("data.JSON").contains("json"));
        assert!(tags_for_name("README").is_empty());
    }

    #[test]
    fn test_tags_for_name_prefers_exact_name() {
        let tags = tags_for_name("setup.cfg");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["ini"]);
        assert!(tags_for_name("Makefile").contains("makefile"));
    }

    #[test]
    fn test_tags_for_path_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("calc.py");
        fs::write(&path, "print('hi')\n").unwrap();

        let tags = tags_for_path(&path).unwrap();
        assert!(tags.contains("file"));
        assert!(tags.contains("text"));
        assert!(tags.contains("python"));
        assert!(!tags.contains("binary"));
    }

    #[test]
    fn test_tags_for_path_binary_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.bin");
        fs::write(&path, [0x7f, 0x45, 0x00, 0x01]).unwrap();

        let tags = tags_for_path(&path).unwrap();
        assert!(tags.contains("binary"));
        assert!(!tags.contains("text"));
    }

    #[test]
    fn test_tags_for_path_missing() {
        let temp = TempDir::new().unwrap();
        assert!(tags_for_path(&temp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_tags_for_path_directory() {
        let temp = TempDir::new().unwrap();
        let tags = tags_for_path(temp.path()).unwrap();
        assert!(tags.contains("directory"));
        assert!(!tags.contains("file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tags_for_path_shebang() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tool");
        fs::write(&path, "#!/usr/bin/env python3\nprint(1)\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let tags = tags_for_path(&path).unwrap();
        assert!(tags.contains("executable"));
        assert!(tags.contains("python"));
        assert!(tags.contains("python3"));
    }

    #[test]
    fn test_is_known_tag() {
        assert!(is_known_tag("python"));
        assert!(is_known_tag("text"));
        assert!(is_known_tag("cython"));
        assert!(!is_known_tag("pythn"));
    }
}
