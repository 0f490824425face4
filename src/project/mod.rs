//! Project management: schema loading and the schema registry.
//!
//! The loader (phase 0) starts from the top schema origins, parses each
//! source, follows `use`/`require` imports across local paths and remote
//! URIs, and fills the [`Registry`] with one entry per canonical origin.
//! Import cycles are permitted at this level; the forbidden cycles are the
//! `ancestors`/`implements` ones, which later phases reject.

mod builtin;
mod fetcher;
mod loader;
mod registry;
mod search_path;

pub use builtin::BUILTIN_SOURCE;
pub use fetcher::{FetchError, Fetcher, FileFetcher, MemoryFetcher, Origin};
#[cfg(feature = "http")]
pub use fetcher::HttpFetcher;
pub use loader::Loader;
pub use registry::{LoadedSchema, Registry, ResolvedImport};
pub use search_path::SearchPath;
