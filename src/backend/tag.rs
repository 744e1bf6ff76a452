use super::query::{fd_command, find_command, rg_command, SearchCommand};
use crate::error::DiscoveryError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Search strategies. `ElispWalk` is the built-in walker: always the last
/// resort and never named in a preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendTag {
    Find,
    Fd,
    FdFind,
    #[serde(rename = "rg")]
    Ripgrep,
    #[serde(rename = "walker")]
    ElispWalk,
}

impl BackendTag {
    /// Tags that may appear in a preference list.
    pub const EXTERNAL: [BackendTag; 4] = [
        BackendTag::Find,
        BackendTag::Fd,
        BackendTag::FdFind,
        BackendTag::Ripgrep,
    ];

    /// Executable looked up on `PATH` when no explicit path is given.
    pub fn binary_name(&self) -> Option<&'static str> {
        match self {
            BackendTag::Find => Some("find"),
            BackendTag::Fd => Some("fd"),
            BackendTag::FdFind => Some("fdfind"),
            BackendTag::Ripgrep => Some("rg"),
            BackendTag::ElispWalk => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.binary_name().unwrap_or("walker")
    }

    /// Listing command for this backend; `None` for the built-in walker.
    pub fn query(&self, executable: &Path, root: &Path, extensions: &[String]) -> Option<SearchCommand> {
        match self {
            BackendTag::Find => Some(find_command(executable, root, extensions)),
            BackendTag::Fd | BackendTag::FdFind => Some(fd_command(executable, root, extensions)),
            BackendTag::Ripgrep => Some(rg_command(executable, root, extensions)),
            BackendTag::ElispWalk => None,
        }
    }
}

impl FromStr for BackendTag {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendTag::EXTERNAL
            .into_iter()
            .find(|tag| tag.binary_name() == Some(s))
            .ok_or_else(|| DiscoveryError::UnknownBackend(s.to_string()))
    }
}

impl fmt::Display for BackendTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!("find".parse::<BackendTag>().unwrap(), BackendTag::Find);
        assert_eq!("fd".parse::<BackendTag>().unwrap(), BackendTag::Fd);
        assert_eq!("fdfind".parse::<BackendTag>().unwrap(), BackendTag::FdFind);
        assert_eq!("rg".parse::<BackendTag>().unwrap(), BackendTag::Ripgrep);
    }

    #[test]
    fn test_walker_and_unknown_tags_are_rejected() {
        for name in ["walker", "elisp", "locate", "ripgrep", "RG", ""] {
            let err = name.parse::<BackendTag>().unwrap_err();
            assert!(matches!(err, DiscoveryError::UnknownBackend(ref n) if n == name));
        }
    }

    #[test]
    fn test_fd_and_fdfind_share_a_builder() {
        let exts = vec!["org".to_string()];
        let fd = BackendTag::Fd.query(Path::new("x"), Path::new("/n"), &exts).unwrap();
        let fdfind = BackendTag::FdFind.query(Path::new("x"), Path::new("/n"), &exts).unwrap();
        assert_eq!(fd, fdfind);
    }

    #[test]
    fn test_walker_has_no_query() {
        let exts = vec!["org".to_string()];
        assert!(BackendTag::ElispWalk.query(Path::new("x"), Path::new("/n"), &exts).is_none());
        assert_eq!(BackendTag::ElispWalk.to_string(), "walker");
    }
}
