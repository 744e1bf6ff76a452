use super::{BackendEntry, ConfigBuilder};
use crate::error::{DiscoveryError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk TOML form of the discovery configuration.
///
/// ```toml
/// root_directory = "~/org"
/// extensions = ["org", "md"]
/// exclude = ["data/", "^archive/"]
/// backend_preference = ["fd", ["rg", "/opt/bin/rg"], { tag = "find" }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub root_directory: Option<PathBuf>,
    pub extensions: Option<Vec<String>>,
    pub exclude: Option<ExcludeSetting>,
    pub backend_preference: Option<Vec<toml::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExcludeSetting {
    One(String),
    Many(Vec<String>),
}

impl ExcludeSetting {
    fn into_vec(self) -> Vec<String> {
        match self {
            ExcludeSetting::One(pattern) => vec![pattern],
            ExcludeSetting::Many(patterns) => patterns,
        }
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DiscoveryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| DiscoveryError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn into_builder(self) -> Result<ConfigBuilder> {
        let mut builder = ConfigBuilder::new();

        if let Some(root) = self.root_directory {
            builder = builder.root_directory(root);
        }
        if let Some(extensions) = self.extensions {
            builder = builder.extensions(extensions);
        }
        if let Some(exclude) = self.exclude {
            builder = builder.exclude(exclude.into_vec());
        }
        if let Some(entries) = self.backend_preference {
            let entries = entries
                .iter()
                .map(backend_entry_from_value)
                .collect::<Result<Vec<_>>>()?;
            builder = builder.backend_preference(entries);
        }

        Ok(builder)
    }
}

/// A bare tag string, a `[tag, path]` pair or a `{ tag, path }` table.
fn backend_entry_from_value(value: &toml::Value) -> Result<BackendEntry> {
    let malformed = || DiscoveryError::MalformedEntry(value.to_string());

    match value {
        toml::Value::String(tag) => Ok(BackendEntry::named(tag.as_str())),
        toml::Value::Array(pair) => match pair.as_slice() {
            [toml::Value::String(tag), toml::Value::String(path)] => {
                Ok(BackendEntry::with_path(tag.as_str(), path.as_str()))
            }
            _ => Err(malformed()),
        },
        toml::Value::Table(table) => {
            if table.keys().any(|k| k != "tag" && k != "path") {
                return Err(malformed());
            }
            let tag = table.get("tag").and_then(|v| v.as_str()).ok_or_else(malformed)?;
            match table.get("path") {
                None => Ok(BackendEntry::named(tag)),
                Some(toml::Value::String(path)) => Ok(BackendEntry::with_path(tag, path.as_str())),
                Some(_) => Err(malformed()),
            }
        }
        _ => Err(malformed()),
    }
}
