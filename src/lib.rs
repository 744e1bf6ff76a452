//! Discovery and classification of the files that make up a notes corpus.
//!
//! [`list_files`] enumerates the corpus with the first available external
//! search tool (`find`, `fd`, `fdfind`, `rg`) and falls back to a built-in
//! directory walk. [`is_corpus_file`] decides membership for a single path.

pub mod backend;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod discovery;
pub mod error;

pub use backend::{resolve, resolve_with, BackendTag, ResolvedBackend, SearchCommand};
pub use config::{BackendEntry, Config, ConfigBuilder, ExcludePatterns};
pub use corpus::{classify, is_corpus_file, Classification};
pub use discovery::{discover, list_files, Discovery, DiscoverySource};
pub use error::{DiscoveryError, Result};
