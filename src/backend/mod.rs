pub mod query;
pub mod resolver;
pub mod tag;

pub use query::SearchCommand;
pub use resolver::{resolve, resolve_with, ResolvedBackend};
pub use tag::BackendTag;
