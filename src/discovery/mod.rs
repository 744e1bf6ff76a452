pub mod normalizer;
pub mod orchestrator;
pub mod walker;

pub use orchestrator::{
    discover, discover_with, discover_with_backend, list_files, query_backend, Discovery,
    DiscoverySource, QueryOutcome,
};
pub use walker::walk;
