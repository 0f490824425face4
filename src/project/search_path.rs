//! Search path for dotted imports.
//!
//! A dotted import `a.b.c` maps to the relative path `a/b/c.yasdl`. The
//! importing schema's own directory is probed first, then each configured
//! entry in order. The built-in package is not on the search path; the
//! loader resolves it before consulting this list.

use std::path::{Path, PathBuf};

use crate::base::Name;
use crate::base::constants::SCHEMA_EXT;

use super::fetcher::{Fetcher, Origin};

/// Ordered list of directories to resolve dotted imports against.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn with(mut self, dir: impl Into<PathBuf>) -> Self {
        self.push(dir);
        self
    }

    /// Build from a `PATH`-style separated list, e.g. the `YASDL_PATH`
    /// environment variable or a configuration file entry.
    pub fn from_separated(list: &str) -> Self {
        let mut path = Self::new();
        for entry in std::env::split_paths(list) {
            if !entry.as_os_str().is_empty() {
                path.push(entry);
            }
        }
        path
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Relative file path for a dotted import: every non-final segment a
    /// directory, the final segment a `.yasdl` file.
    pub fn relative_file(segments: &[Name]) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in &segments[..segments.len() - 1] {
            path.push(segment.as_str());
        }
        let last = &segments[segments.len() - 1];
        path.push(format!("{}.{}", last, SCHEMA_EXT));
        path
    }

    /// Resolve a dotted import to the first existing origin: the importing
    /// schema's directory first, then each search-path entry.
    pub fn resolve(
        &self,
        segments: &[Name],
        importer_dir: Option<&Path>,
        fetcher: &dyn Fetcher,
    ) -> Option<Origin> {
        let relative = Self::relative_file(segments);
        let candidates = importer_dir
            .into_iter()
            .map(Path::to_path_buf)
            .chain(self.dirs.iter().cloned());
        for dir in candidates {
            let origin = Origin::Path(dir.join(&relative));
            if fetcher.exists(&origin) {
                return Some(origin);
            }
        }
        None
    }
}
