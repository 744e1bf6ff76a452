use crate::config::Config;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Suffixes appended to an encrypted note's real extension.
pub const ENCRYPTION_SUFFIXES: &[&str] = &["gpg", "age"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Member,
    NoPath,
    OutsideRoot,
    NoExtension,
    UnlistedExtension(String),
    Excluded(String),
}

impl Classification {
    pub fn is_member(&self) -> bool {
        matches!(self, Classification::Member)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Member => write!(f, "corpus file"),
            Classification::NoPath => write!(f, "no file path"),
            Classification::OutsideRoot => write!(f, "outside the root directory"),
            Classification::NoExtension => write!(f, "file name has no extension"),
            Classification::UnlistedExtension(ext) => write!(f, "extension `{}` is not configured", ext),
            Classification::Excluded(pattern) => write!(f, "excluded by pattern `{}`", pattern),
        }
    }
}

/// Corpus membership of `path`. `None` stands for "no current file".
pub fn is_corpus_file(config: &Config, path: Option<&Path>) -> bool {
    classify(config, path).is_member()
}

/// Same decision as [`is_corpus_file`], with the reason for a rejection.
///
/// Purely lexical: the filesystem is never consulted.
pub fn classify(config: &Config, path: Option<&Path>) -> Classification {
    let Some(path) = path else {
        return Classification::NoPath;
    };

    let Some(relative) = config.roots().find_map(|root| relative_to_root(root, path)) else {
        return Classification::OutsideRoot;
    };

    let Some(ext) = file_extension(path) else {
        return Classification::NoExtension;
    };

    if !config.extensions().iter().any(|e| *e == ext) {
        return Classification::UnlistedExtension(ext.to_string());
    }

    match config.exclude().find_match(&relative) {
        Some(pattern) => Classification::Excluded(pattern.as_str().to_string()),
        None => Classification::Member,
    }
}

/// Extension of the base name, looking through one `.gpg`/`.age` suffix.
///
/// `notes.org.gpg` gives `org`, `archive.tar.gz` gives `gz`.
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let ext = last_dot_segment(name)?;

    if ENCRYPTION_SUFFIXES.contains(&ext) {
        let inner = &name[..name.len() - ext.len() - 1];
        return last_dot_segment(inner);
    }

    Some(ext)
}

/// Everything after the final `.`, verbatim.
fn last_dot_segment(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx + 1..])
}

/// `path` relative to `root` with `/` separators, or `None` unless `path`
/// lies strictly below `root`.
fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let root = lexical_normalize(root);
    let path = lexical_normalize(path);

    let relative = path.strip_prefix(&root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }

    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Drop `.` and fold `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
