//! Source fetching
//!
//! The loader is generic over a [`Fetcher`]: the file-system fetcher is the
//! default, tests use [`MemoryFetcher`], and remote origins are served by
//! [`HttpFetcher`] when the crate is built with the `http` feature. All
//! fetching is synchronous; the compiler never suspends.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::base::constants::BUILTIN_PACKAGE;

/// Identity of a loadable schema source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Local file path
    Path(PathBuf),
    /// Remote `http`/`https`/`ftp` URI, kept verbatim
    Uri(String),
    /// A package shipped inside the compiler
    Builtin(&'static str),
}

impl Origin {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    pub fn builtin() -> Self {
        Self::Builtin(BUILTIN_PACKAGE)
    }

    /// Directory to resolve sibling imports against, for local origins.
    pub fn parent_dir(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => path.parent(),
            _ => None,
        }
    }

    /// File stem of a local origin, used for the top-schema name check.
    pub fn file_stem(&self) -> Option<&str> {
        match self {
            Self::Path(path) => path.file_stem().and_then(|s| s.to_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
            Self::Builtin(name) => write!(f, "builtin:{}", name),
        }
    }
}

/// Fetch failure, converted by the loader into a phase-0 diagnostic.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {uri}: {message}")]
    Remote { uri: String, message: String },
    #[error("remote fetching is disabled; rebuild with the `http` feature")]
    RemoteDisabled,
    #[error("origin not found: {0}")]
    NotFound(String),
    #[error("source is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Synchronous source access: `origin -> text-or-IOError`.
pub trait Fetcher {
    fn fetch(&self, origin: &Origin) -> Result<String, FetchError>;

    /// Probe without fetching; used for search-path resolution.
    fn exists(&self, origin: &Origin) -> bool;

    /// Canonicalize an origin so re-loads of the same source are detected.
    /// The default keeps the origin as-is; the file-system fetcher resolves
    /// symlinks.
    fn canonicalize(&self, origin: &Origin) -> Origin {
        origin.clone()
    }
}

/// Reads schema sources from the file system.
#[derive(Debug, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, origin: &Origin) -> Result<String, FetchError> {
        match origin {
            Origin::Path(path) => std::fs::read_to_string(path).map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            }),
            Origin::Uri(_) => Err(FetchError::RemoteDisabled),
            Origin::Builtin(_) => Ok(super::builtin::BUILTIN_SOURCE.to_string()),
        }
    }

    fn exists(&self, origin: &Origin) -> bool {
        match origin {
            Origin::Path(path) => path.is_file(),
            Origin::Uri(_) => false,
            Origin::Builtin(_) => true,
        }
    }

    fn canonicalize(&self, origin: &Origin) -> Origin {
        match origin {
            Origin::Path(path) => match std::fs::canonicalize(path) {
                Ok(resolved) => Origin::Path(resolved),
                Err(_) => origin.clone(),
            },
            _ => origin.clone(),
        }
    }
}

/// In-memory fetcher for tests and embedded compilations.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    sources: HashMap<Origin, String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: Origin, text: impl Into<String>) -> &mut Self {
        self.sources.insert(origin, text.into());
        self
    }

    pub fn with(mut self, origin: Origin, text: impl Into<String>) -> Self {
        self.insert(origin, text);
        self
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, origin: &Origin) -> Result<String, FetchError> {
        if let Origin::Builtin(_) = origin {
            return Ok(super::builtin::BUILTIN_SOURCE.to_string());
        }
        self.sources
            .get(origin)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(origin.to_string()))
    }

    fn exists(&self, origin: &Origin) -> bool {
        matches!(origin, Origin::Builtin(_)) || self.sources.contains_key(origin)
    }
}

/// Fetcher that serves local paths from disk and remote URIs over HTTP.
/// FTP origins are rejected; no authentication is attempted.
#[cfg(feature = "http")]
#[derive(Debug, Default)]
pub struct HttpFetcher {
    files: FileFetcher,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, origin: &Origin) -> Result<String, FetchError> {
        match origin {
            Origin::Uri(uri) => {
                let response = reqwest::blocking::get(uri).map_err(|e| FetchError::Remote {
                    uri: uri.clone(),
                    message: e.to_string(),
                })?;
                if !response.status().is_success() {
                    return Err(FetchError::Remote {
                        uri: uri.clone(),
                        message: format!("server returned {}", response.status()),
                    });
                }
                response.text().map_err(|e| FetchError::Encoding(e.to_string()))
            }
            other => self.files.fetch(other),
        }
    }

    fn exists(&self, origin: &Origin) -> bool {
        match origin {
            // Remote existence is only learned by fetching.
            Origin::Uri(_) => true,
            other => self.files.exists(other),
        }
    }

    fn canonicalize(&self, origin: &Origin) -> Origin {
        self.files.canonicalize(origin)
    }
}
