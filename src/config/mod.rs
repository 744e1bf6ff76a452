pub mod file;

pub use file::ConfigFile;

use crate::error::{DiscoveryError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_EXTENSIONS: &[&str] = &["org"];

/// Attachment directory, relative to the root
pub const DEFAULT_EXCLUDE: &str = "data/";

pub const DEFAULT_BACKENDS: &[&str] = &["find", "fd", "fdfind", "rg"];

static DEFAULT_EXCLUDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_EXCLUDE).unwrap()
});

/// One entry of the backend preference list.
///
/// The tag is kept as written and only checked against the known backends
/// when resolution reaches it, so a bad entry behind a resolvable one is
/// never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEntry {
    pub tag: String,
    pub path: Option<PathBuf>,
}

impl BackendEntry {
    pub fn named(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            path: None,
        }
    }

    pub fn with_path(tag: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tag: tag.into(),
            path: Some(path.into()),
        }
    }
}

impl FromStr for BackendEntry {
    type Err = DiscoveryError;

    /// Accepts `tag` or `tag=/path/to/executable`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('=') {
            Some((tag, path)) if !tag.is_empty() && !path.is_empty() => {
                Ok(Self::with_path(tag, path))
            }
            Some(_) => Err(DiscoveryError::MalformedEntry(s.to_string())),
            None if s.is_empty() => Err(DiscoveryError::MalformedEntry(s.to_string())),
            None => Ok(Self::named(s)),
        }
    }
}

impl fmt::Display for BackendEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}={}", self.tag, path.display()),
            None => write!(f, "{}", self.tag),
        }
    }
}

/// Exclusion rules, matched against the root-relative path.
#[derive(Debug, Clone, Default)]
pub enum ExcludePatterns {
    #[default]
    None,
    One(Regex),
    Many(Vec<Regex>),
}

impl ExcludePatterns {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut compiled = patterns
            .iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(match compiled.len() {
            0 => ExcludePatterns::None,
            1 => ExcludePatterns::One(compiled.remove(0)),
            _ => ExcludePatterns::Many(compiled),
        })
    }

    /// First pattern found anywhere in `relative`.
    pub fn find_match(&self, relative: &str) -> Option<&Regex> {
        match self {
            ExcludePatterns::None => None,
            ExcludePatterns::One(re) => re.is_match(relative).then_some(re),
            ExcludePatterns::Many(list) => list.iter().find(|re| re.is_match(relative)),
        }
    }

    pub fn is_match(&self, relative: &str) -> bool {
        self.find_match(relative).is_some()
    }

    pub fn patterns(&self) -> Vec<&str> {
        match self {
            ExcludePatterns::None => Vec::new(),
            ExcludePatterns::One(re) => vec![re.as_str()],
            ExcludePatterns::Many(list) => list.iter().map(|re| re.as_str()).collect(),
        }
    }
}

/// Discovery parameters for one corpus.
///
/// Every engine operation borrows a `Config`; nothing in the engine reads
/// process-wide state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical root when it exists, otherwise the configured one
    root_directory: PathBuf,
    /// Root as configured, after `~` expansion and made absolute
    configured_root: PathBuf,
    extensions: Vec<String>,
    exclude: ExcludePatterns,
    backend_preference: Vec<BackendEntry>,
}

impl Default for Config {
    fn default() -> Self {
        let root = dirs::home_dir()
            .map(|home| home.join("org"))
            .unwrap_or_else(|| PathBuf::from("/org"));

        Self {
            root_directory: root.clone(),
            configured_root: root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude: ExcludePatterns::One(DEFAULT_EXCLUDE_REGEX.clone()),
            backend_preference: DEFAULT_BACKENDS.iter().map(|b| BackendEntry::named(*b)).collect(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn configured_root(&self) -> &Path {
        &self.configured_root
    }

    /// Canonical root first, then the configured spelling if it differs.
    ///
    /// A symlinked root is reached through either, so both count as the
    /// corpus root when classifying.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        let configured = (self.configured_root != self.root_directory).then_some(self.configured_root.as_path());
        std::iter::once(self.root_directory.as_path()).chain(configured)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn exclude(&self) -> &ExcludePatterns {
        &self.exclude
    }

    pub fn backend_preference(&self) -> &[BackendEntry] {
        &self.backend_preference
    }
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    root_directory: Option<PathBuf>,
    extensions: Vec<String>,
    exclude: Vec<String>,
    backend_preference: Vec<BackendEntry>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            root_directory: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude: vec![DEFAULT_EXCLUDE.to_string()],
            backend_preference: DEFAULT_BACKENDS.iter().map(|b| BackendEntry::named(*b)).collect(),
        }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        ConfigFile::load(path)?.into_builder()
    }

    pub fn root_directory(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_directory = Some(root.into());
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn no_exclude(mut self) -> Self {
        self.exclude.clear();
        self
    }

    pub fn backend_preference(mut self, entries: Vec<BackendEntry>) -> Self {
        self.backend_preference = entries;
        self
    }

    pub fn build(self) -> Result<Config> {
        let root = self.root_directory.ok_or(DiscoveryError::MissingRoot)?;
        let configured_root = absolute_root(&root);
        let root_directory = match configured_root.canonicalize() {
            Ok(canonical) => canonical,
            Err(e) => {
                log::debug!("root {} not canonicalized: {}", configured_root.display(), e);
                configured_root.clone()
            }
        };

        let mut extensions: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in self.extensions {
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            log::warn!("no file extensions configured, every file will be rejected");
        }

        Ok(Config {
            root_directory,
            configured_root,
            extensions,
            exclude: ExcludePatterns::compile(&self.exclude)?,
            backend_preference: self.backend_preference,
        })
    }
}

/// Expand `~` and make absolute against the working directory.
fn absolute_root(root: &Path) -> PathBuf {
    let expanded = expand_tilde(root);
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builder_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::builder().root_directory(dir.path()).build().unwrap();

        assert_eq!(config.root_directory(), dir.path().canonicalize().unwrap());
        assert_eq!(config.extensions(), ["org"]);
        assert_eq!(config.exclude().patterns(), vec!["data/"]);
        let tags: Vec<_> = config.backend_preference().iter().map(|b| b.tag.as_str()).collect();
        assert_eq!(tags, vec!["find", "fd", "fdfind", "rg"]);
    }

    #[test]
    fn test_builder_requires_root() {
        let err = Config::builder().build().unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingRoot));
    }

    #[test]
    fn test_extensions_are_deduplicated_in_order() {
        let config = Config::builder()
            .root_directory("/notes")
            .extensions(["org", "md", "org", ""])
            .build()
            .unwrap();
        assert_eq!(config.extensions(), ["org", "md"]);
    }

    #[test]
    fn test_exclude_shapes() {
        assert!(matches!(ExcludePatterns::compile::<&str>(&[]).unwrap(), ExcludePatterns::None));
        assert!(matches!(ExcludePatterns::compile(&["a/"]).unwrap(), ExcludePatterns::One(_)));
        assert!(matches!(ExcludePatterns::compile(&["a/", "b/"]).unwrap(), ExcludePatterns::Many(_)));
    }

    #[test]
    fn test_exclude_any_pattern_matches() {
        let patterns = ExcludePatterns::compile(&["^journal/", "\\.draft\\."]).unwrap();
        assert!(patterns.is_match("journal/2024.org"));
        assert!(patterns.is_match("ideas/x.draft.org"));
        assert!(!patterns.is_match("ideas/journal/x.org"));
        assert_eq!(patterns.find_match("a.draft.org").unwrap().as_str(), "\\.draft\\.");
    }

    #[test]
    fn test_invalid_exclude_is_rejected() {
        let err = Config::builder()
            .root_directory("/notes")
            .exclude(["[unclosed"])
            .build()
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidPattern { .. }));
    }

    #[test]
    fn test_backend_entry_parsing() {
        assert_eq!("rg".parse::<BackendEntry>().unwrap(), BackendEntry::named("rg"));
        assert_eq!(
            "fd=/opt/bin/fd".parse::<BackendEntry>().unwrap(),
            BackendEntry::with_path("fd", "/opt/bin/fd")
        );
        assert!("=".parse::<BackendEntry>().is_err());
        assert!("fd=".parse::<BackendEntry>().is_err());
        assert!("".parse::<BackendEntry>().is_err());
    }

    #[test]
    fn test_missing_root_is_kept_absolute() {
        let config = Config::builder()
            .root_directory("/definitely/not/here")
            .build()
            .unwrap();
        assert_eq!(config.root_directory(), Path::new("/definitely/not/here"));
        assert_eq!(config.roots().count(), 1);
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let home = dirs::home_dir().unwrap();
        let config = Config::builder()
            .root_directory("~/no-such-notes-dir")
            .build()
            .unwrap();
        assert_eq!(config.configured_root(), home.join("no-such-notes-dir"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_root_keeps_both_spellings() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("org")).unwrap();

        let config = Config::builder()
            .root_directory(dir.path().join("org"))
            .build()
            .unwrap();

        let real = dir.path().join("real").canonicalize().unwrap();
        assert_eq!(config.root_directory(), real);
        assert_eq!(config.configured_root(), dir.path().join("org"));
        assert_eq!(config.roots().collect::<Vec<_>>(), vec![real.as_path(), config.configured_root()]);
    }
}
