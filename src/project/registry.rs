//! Schema registry (phase 0 output)
//!
//! One entry per canonical origin, in load order. Source text is retained
//! for the compiler's lifetime so diagnostics can quote ranges. Entries
//! whose parse failed keep their slot (diagnostics reference their
//! [`FileId`]) but carry no document.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, Name, Span};
use crate::syntax::{ImportKind, SchemaDoc};

use super::fetcher::Origin;

/// How the loader first reached a schema; decides which package-name
/// check applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachedBy {
    /// Listed on the command line
    Top,
    /// Imported through a dotted name (stored dot-joined)
    Dotted(String),
    /// Imported through a URI
    Uri(String),
    /// Shipped with the compiler
    Builtin,
}

/// An import whose target schema was loaded.
#[derive(Debug, Clone)]
pub struct ResolvedImport {
    pub alias: Name,
    pub kind: ImportKind,
    pub target: FileId,
    pub span: Span,
}

/// A loaded schema source with its parse result and resolved imports.
#[derive(Debug)]
pub struct LoadedSchema {
    pub file: FileId,
    /// Origin as requested
    pub origin: Origin,
    /// Canonical identity (symlinks resolved for local paths)
    pub canonical: Origin,
    pub reached_by: ReachedBy,
    pub is_top: bool,
    pub text: String,
    /// `None` when the source failed to parse
    pub doc: Option<SchemaDoc>,
    pub imports: Vec<ResolvedImport>,
}

impl LoadedSchema {
    /// Canonical dot-joined package name; empty for unparsed entries.
    pub fn package_name(&self) -> String {
        self.doc.as_ref().map(|d| d.package_name()).unwrap_or_default()
    }
}

/// All loaded schemas keyed by canonical origin.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: Vec<LoadedSchema>,
    by_key: FxHashMap<Origin, FileId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, file: FileId) -> &LoadedSchema {
        &self.schemas[file.index()]
    }

    pub fn get_mut(&mut self, file: FileId) -> &mut LoadedSchema {
        &mut self.schemas[file.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedSchema> {
        self.schemas.iter()
    }

    /// Schemas that parsed successfully, in load order.
    pub fn parsed(&self) -> impl Iterator<Item = &LoadedSchema> {
        self.schemas.iter().filter(|s| s.doc.is_some())
    }

    pub fn lookup_key(&self, canonical: &Origin) -> Option<FileId> {
        self.by_key.get(canonical).copied()
    }

    pub(super) fn insert(&mut self, schema: LoadedSchema) -> FileId {
        let file = schema.file;
        debug_assert_eq!(file.index(), self.schemas.len());
        self.by_key.insert(schema.canonical.clone(), file);
        self.schemas.push(schema);
        file
    }

    pub(super) fn next_file_id(&self) -> FileId {
        FileId::new(self.schemas.len())
    }

    /// Package name → file, in load order. Duplicates keep the first entry;
    /// the loader reports them separately.
    pub fn packages(&self) -> IndexMap<String, FileId> {
        let mut map = IndexMap::new();
        for schema in self.parsed() {
            map.entry(schema.package_name()).or_insert(schema.file);
        }
        map
    }
}
