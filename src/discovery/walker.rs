use crate::config::Config;
use crate::corpus::is_corpus_file;
use regex::Regex;
use std::collections::HashSet;
use std::fs::File;
use std::path::PathBuf;
use walkdir::WalkDir;

/// `\.(?:org|md)(?:\.gpg|\.age)?$` for the configured extensions.
pub fn extension_regex(extensions: &[String]) -> Regex {
    let alternation = extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");
    // Escaped literals in a fixed frame always form a valid pattern
    Regex::new(&format!(r"\.(?:{})(?:\.gpg|\.age)?$", alternation)).unwrap()
}

/// Built-in recursive scan of the root directory.
///
/// Needs no external tool. Symlinks are followed; entries that cannot be
/// read, including symlink loops, are skipped.
///
/// Results are canonical paths and are classified in that form, so a file
/// reached through a symlink that points outside the root is dropped even
/// though the walk followed it. Every returned path passes
/// [`is_corpus_file`].
pub fn walk(config: &Config) -> Vec<PathBuf> {
    let root = config.root_directory();
    if config.extensions().is_empty() {
        return Vec::new();
    }
    let name_regex = extension_regex(config.extensions());

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches_name = entry
            .file_name()
            .to_str()
            .map(|name| name_regex.is_match(name))
            .unwrap_or(false);
        if !matches_name {
            continue;
        }

        if let Err(e) = File::open(entry.path()) {
            log::debug!("skipping {}: {}", entry.path().display(), e);
            continue;
        }

        let path = match entry.path().canonicalize() {
            Ok(path) => path,
            Err(e) => {
                log::debug!("cannot canonicalize {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if is_corpus_file(config, Some(&path)) && seen.insert(path.clone()) {
            files.push(path);
        }
    }

    log::debug!("walker found {} files under {}", files.len(), root.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_extension_regex() {
        let re = extension_regex(&exts(&["org", "md"]));
        assert!(re.is_match("a.org"));
        assert!(re.is_match("a.md.gpg"));
        assert!(re.is_match("a.org.age"));
        assert!(!re.is_match("a.org.txt"));
        assert!(!re.is_match("a.orgx"));
        assert!(!re.is_match("aorg"));
    }

    #[test]
    fn test_extension_regex_escapes_metacharacters() {
        let re = extension_regex(&exts(&["c++"]));
        assert!(re.is_match("main.c++"));
        assert!(!re.is_match("main.cc"));
    }

    #[test]
    fn test_walk_filters_and_canonicalizes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub/data")).unwrap();
        fs::write(dir.path().join("a.org"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("sub/c.org.gpg"), "").unwrap();
        fs::write(dir.path().join("sub/data/y.org"), "").unwrap();

        let config = Config::builder()
            .root_directory(dir.path())
            .exclude(["^sub/data/"])
            .build()
            .unwrap();
        let root = config.root_directory().to_path_buf();

        let files = walk(&config);
        assert_eq!(files, vec![root.join("a.org"), root.join("sub/c.org.gpg")]);
    }

    #[test]
    fn test_walk_missing_root_is_empty() {
        let config = Config::builder()
            .root_directory("/definitely/not/here")
            .build()
            .unwrap();
        assert!(walk(&config).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_follows_symlinks_without_duplicates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/n.org"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        // loop back to the root
        std::os::unix::fs::symlink(dir.path(), dir.path().join("real/up")).unwrap();

        let config = Config::builder().root_directory(dir.path()).build().unwrap();
        let files = walk(&config);
        assert_eq!(files, vec![config.root_directory().join("real/n.org")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_unreadable_files() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("open.org"), "").unwrap();
        fs::write(dir.path().join("locked.org"), "").unwrap();
        // root can read anything
        if fs::metadata(dir.path()).unwrap().uid() == 0 {
            return;
        }
        fs::set_permissions(dir.path().join("locked.org"), fs::Permissions::from_mode(0o000)).unwrap();

        let config = Config::builder().root_directory(dir.path()).build().unwrap();
        let files = walk(&config);
        assert_eq!(files, vec![config.root_directory().join("open.org")]);
    }
}
