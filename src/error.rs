use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A preference entry names a backend with no query builder
    #[error("{0} is not an implemented search method")]
    UnknownBackend(String),

    /// A preference entry is neither a tag nor a tag/path pair
    #[error("wrong type argument in backend preference: {0}")]
    MalformedEntry(String),

    #[error("invalid exclude pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no root directory configured")]
    MissingRoot,

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
