use super::query::SearchCommand;
use super::tag::BackendTag;
use crate::config::BackendEntry;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Outcome of backend resolution for one discovery call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedBackend {
    External { tag: BackendTag, executable: PathBuf },
    /// The built-in walker, always available.
    Fallback,
}

impl ResolvedBackend {
    pub fn tag(&self) -> BackendTag {
        match self {
            ResolvedBackend::External { tag, .. } => *tag,
            ResolvedBackend::Fallback => BackendTag::ElispWalk,
        }
    }

    pub fn executable(&self) -> Option<&Path> {
        match self {
            ResolvedBackend::External { executable, .. } => Some(executable),
            ResolvedBackend::Fallback => None,
        }
    }

    pub fn query(&self, root: &Path, extensions: &[String]) -> Option<SearchCommand> {
        match self {
            ResolvedBackend::External { tag, executable } => tag.query(executable, root, extensions),
            ResolvedBackend::Fallback => None,
        }
    }
}

/// Pick the first backend in `preference` with a usable executable,
/// searching `PATH` for entries without an explicit path.
pub fn resolve(preference: &[BackendEntry]) -> Result<ResolvedBackend> {
    resolve_with(preference, |binary| match which::which(binary) {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("{} not found on PATH: {}", binary, e);
            None
        }
    })
}

/// [`resolve`] with a caller-supplied executable lookup.
///
/// An explicit path wins without any check. Entries are validated only as
/// they are reached, so an unknown tag after a resolvable entry never errors.
pub fn resolve_with<F>(preference: &[BackendEntry], lookup: F) -> Result<ResolvedBackend>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    for entry in preference {
        let tag: BackendTag = entry.tag.parse()?;

        let executable = match &entry.path {
            Some(path) => Some(path.clone()),
            None => tag.binary_name().and_then(|binary| lookup(binary)),
        };

        if let Some(executable) = executable {
            log::debug!("resolved backend {} at {}", tag, executable.display());
            return Ok(ResolvedBackend::External { tag, executable });
        }
    }

    log::debug!("no search backend resolved, using the built-in walker");
    Ok(ResolvedBackend::Fallback)
}
