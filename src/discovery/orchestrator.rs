use super::{normalizer, walker};
use crate::backend::{resolve, resolve_with, BackendTag, ResolvedBackend};
use crate::config::Config;
use crate::corpus::is_corpus_file;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What the external query produced, before the fallback decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NoBackendResolved,
    BackendFoundZero(BackendTag),
    BackendFoundResults(BackendTag, Vec<PathBuf>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    Backend(BackendTag),
    Walker,
}

/// Result of one discovery call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    pub source: DiscoverySource,
    /// Backend that resolved but found nothing, forcing the walker
    pub fell_back_from: Option<BackendTag>,
    pub files: Vec<PathBuf>,
}

/// Absolute, canonical paths of every corpus file under the root.
pub fn list_files(config: &Config) -> Result<Vec<PathBuf>> {
    Ok(discover(config)?.files)
}

pub fn discover(config: &Config) -> Result<Discovery> {
    let resolved = resolve(config.backend_preference())?;
    Ok(discover_with_backend(config, &resolved))
}

/// [`discover`] with a caller-supplied executable lookup.
pub fn discover_with<F>(config: &Config, lookup: F) -> Result<Discovery>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let resolved = resolve_with(config.backend_preference(), lookup)?;
    Ok(discover_with_backend(config, &resolved))
}

pub fn discover_with_backend(config: &Config, resolved: &ResolvedBackend) -> Discovery {
    let fell_back_from = match query_backend(config, resolved) {
        QueryOutcome::BackendFoundResults(tag, files) => {
            return Discovery {
                source: DiscoverySource::Backend(tag),
                fell_back_from: None,
                files,
            };
        }
        QueryOutcome::NoBackendResolved => None,
        // A backend that finds nothing is treated like no backend at all.
        QueryOutcome::BackendFoundZero(tag) => {
            log::info!("{} found no corpus files, falling back to the walker", tag);
            Some(tag)
        }
    };

    Discovery {
        source: DiscoverySource::Walker,
        fell_back_from,
        files: walker::walk(config),
    }
}

/// Run the resolved external backend, if any, and keep only corpus files.
pub fn query_backend(config: &Config, resolved: &ResolvedBackend) -> QueryOutcome {
    let tag = resolved.tag();
    let Some(command) = resolved.query(config.root_directory(), config.extensions()) else {
        return QueryOutcome::NoBackendResolved;
    };

    let lines = normalizer::run(&command);
    let raw_count = lines.len();
    let files = validate(config, lines);
    log::debug!("{} listed {} paths, {} are corpus files", tag, raw_count, files.len());

    if files.is_empty() {
        QueryOutcome::BackendFoundZero(tag)
    } else {
        QueryOutcome::BackendFoundResults(tag, files)
    }
}

/// Canonicalize raw tool output and keep unique corpus files.
///
/// Paths that no longer exist are dropped. Classification runs on the
/// canonical form, so a file reached through a symlink leading out of the
/// root is rejected even when the tool listed it under the root.
fn validate(config: &Config, lines: Vec<String>) -> Vec<PathBuf> {
    let root = config.root_directory();
    let mut seen = HashSet::new();

    lines
        .into_iter()
        .filter_map(|line| canonicalize_line(root, &line))
        .filter(|path| is_corpus_file(config, Some(path)))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn canonicalize_line(root: &Path, line: &str) -> Option<PathBuf> {
    let candidate = Path::new(line);
    let absolute = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    match absolute.canonicalize() {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("dropping {}: {}", absolute.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.org"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("sub/c.org.gpg"), "").unwrap();
        let config = Config::builder()
            .root_directory(dir.path())
            .no_exclude()
            .build()
            .unwrap();
        (dir, config)
    }

    #[test]
    fn test_fallback_backend_uses_walker() {
        let (_dir, config) = corpus();
        let root = config.root_directory().to_path_buf();

        let discovery = discover_with_backend(&config, &ResolvedBackend::Fallback);
        assert_eq!(discovery.source, DiscoverySource::Walker);
        assert_eq!(discovery.fell_back_from, None);
        assert_eq!(discovery.files, vec![root.join("a.org"), root.join("sub/c.org.gpg")]);
    }

    #[test]
    fn test_unrunnable_backend_falls_back() {
        let (_dir, config) = corpus();
        let resolved = ResolvedBackend::External {
            tag: BackendTag::Ripgrep,
            executable: PathBuf::from("/nonexistent/rg"),
        };

        assert_eq!(
            query_backend(&config, &resolved),
            QueryOutcome::BackendFoundZero(BackendTag::Ripgrep)
        );

        let discovery = discover_with_backend(&config, &resolved);
        assert_eq!(discovery.source, DiscoverySource::Walker);
        assert_eq!(discovery.fell_back_from, Some(BackendTag::Ripgrep));
        assert_eq!(discovery.files.len(), 2);
    }

    #[test]
    fn test_empty_preference_goes_straight_to_walker() {
        let (dir, _) = corpus();
        let config = Config::builder()
            .root_directory(dir.path())
            .backend_preference(Vec::new())
            .build()
            .unwrap();

        let discovery = discover_with(&config, |_| panic!("lookup must not run")).unwrap();
        assert_eq!(discovery.source, DiscoverySource::Walker);
        assert_eq!(discovery.files.len(), 2);
    }

    #[test]
    fn test_validate_drops_noise() {
        let (_dir, config) = corpus();
        let root = config.root_directory().to_path_buf();
        let lines = vec![
            root.join("a.org").display().to_string(),
            "sub/c.org.gpg".to_string(),
            root.join("b.txt").display().to_string(),
            root.join("missing.org").display().to_string(),
            root.join("sub/../a.org").display().to_string(),
            "/etc/passwd".to_string(),
        ];

        assert_eq!(
            validate(&config, lines),
            vec![root.join("a.org"), root.join("sub/c.org.gpg")]
        );
    }
}
