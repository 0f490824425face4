//! The loader (phase 0)
//!
//! Resolves `use`/`require` statements, fetches sources by local path or
//! URI, invokes the parser, canonicalizes identities, and detects
//! re-loads. I/O and syntax failures are terminal and reported at the
//! importing statement when one exists.

use std::path::Path;

use tracing::debug;
use url::Url;

use crate::base::constants::BUILTIN_PACKAGE;
use crate::base::{FileId, Name, Span};
use crate::diag::{DiagCode, Diagnostic, DiagnosticSink, Diagnostics};
use crate::parser::parse_schema;
use crate::syntax::{ImportKind, ImportStmt, ImportTarget, Stmt};

use super::fetcher::{Fetcher, Origin};
use super::registry::{LoadedSchema, ReachedBy, Registry, ResolvedImport};
use super::search_path::SearchPath;

/// Loads the transitive closure of the top schemas.
pub struct Loader<'a> {
    fetcher: &'a dyn Fetcher,
    search_path: &'a SearchPath,
    diags: &'a mut Diagnostics,
    registry: Registry,
}

impl<'a> Loader<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        search_path: &'a SearchPath,
        diags: &'a mut Diagnostics,
    ) -> Self {
        Self {
            fetcher,
            search_path,
            diags,
            registry: Registry::new(),
        }
    }

    /// Load every top origin and everything reachable from them, then run
    /// the post-load registry checks. Always returns the registry; the
    /// diagnostics bag decides whether compilation continues.
    pub fn load(mut self, tops: &[Origin]) -> Registry {
        for top in tops {
            if let Some(file) = self.load_origin(top, None, ReachedBy::Top) {
                self.registry.get_mut(file).is_top = true;
                self.ensure_builtin_required(file);
            }
        }
        self.check_package_names();
        self.check_unique_packages();
        self.registry
    }

    // =========================================================================
    // Recursive loading
    // =========================================================================

    fn load_origin(
        &mut self,
        origin: &Origin,
        importer: Option<(FileId, Span)>,
        reached_by: ReachedBy,
    ) -> Option<FileId> {
        let canonical = self.fetcher.canonicalize(origin);
        if let Some(existing) = self.registry.lookup_key(&canonical) {
            // Already loaded (or already failed); cycles end here.
            return self.registry.get(existing).doc.is_some().then_some(existing);
        }

        let text = match self.fetcher.fetch(origin) {
            Ok(text) => text,
            Err(err) => {
                let message = format!("cannot load '{}': {}", origin, err);
                match importer {
                    Some((file, span)) => self.diags.error(DiagCode::E0001, file, span, message),
                    None => self.diags.report(Diagnostic::unanchored(DiagCode::E0001, message)),
                }
                return None;
            }
        };

        let file = self.registry.next_file_id();
        debug!(%origin, file = file.index(), "loading schema");
        let parse = parse_schema(&text, file);
        for err in &parse.errors {
            self.diags
                .error(DiagCode::E0002, file, err.span, err.message.clone());
        }
        let doc = if parse.errors.is_empty() { parse.doc } else { None };
        let parsed = doc.is_some();

        // Register before walking imports so import cycles terminate.
        self.registry.insert(LoadedSchema {
            file,
            origin: origin.clone(),
            canonical,
            reached_by,
            is_top: false,
            text,
            doc,
            imports: Vec::new(),
        });
        if !parsed {
            return None;
        }

        let import_stmts: Vec<ImportStmt> = self
            .registry
            .get(file)
            .doc
            .as_ref()
            .map(|d| {
                d.body
                    .iter()
                    .filter_map(|stmt| match stmt {
                        Stmt::Import(imp) => Some(imp.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut resolved = Vec::new();
        for stmt in import_stmts {
            if let Some(import) = self.load_import(file, &stmt) {
                resolved.push(import);
            }
        }
        self.registry.get_mut(file).imports = resolved;
        Some(file)
    }

    fn load_import(&mut self, importer: FileId, stmt: &ImportStmt) -> Option<ResolvedImport> {
        match &stmt.target {
            ImportTarget::Dotted(segments) => {
                let dotted = join_segments(segments);
                let alias = match &stmt.alias {
                    Some(alias) => alias.clone(),
                    None if segments.len() == 1 => segments[0].clone(),
                    None => {
                        self.diags.error(
                            DiagCode::E0004,
                            importer,
                            stmt.span,
                            format!("import of '{}' requires an alias", dotted),
                        );
                        return None;
                    }
                };

                let target_origin = if segments.len() == 1
                    && segments[0].as_str() == BUILTIN_PACKAGE
                {
                    Origin::builtin()
                } else {
                    let importer_dir = self.registry.get(importer).origin.parent_dir().map(Path::to_path_buf);
                    match self
                        .search_path
                        .resolve(segments, importer_dir.as_deref(), self.fetcher)
                    {
                        Some(origin) => origin,
                        None => {
                            self.diags.error(
                                DiagCode::E0003,
                                importer,
                                stmt.span,
                                format!("schema '{}' not found on the search path", dotted),
                            );
                            return None;
                        }
                    }
                };

                let reached = if matches!(target_origin, Origin::Builtin(_)) {
                    ReachedBy::Builtin
                } else {
                    ReachedBy::Dotted(dotted)
                };
                let target =
                    self.load_origin(&target_origin, Some((importer, stmt.span)), reached)?;
                Some(ResolvedImport {
                    alias,
                    kind: stmt.kind,
                    target,
                    span: stmt.span,
                })
            }
            ImportTarget::Uri(uri) => {
                let alias = match &stmt.alias {
                    Some(alias) => alias.clone(),
                    None => {
                        self.diags.error(
                            DiagCode::E0004,
                            importer,
                            stmt.span,
                            format!("import of '{}' requires an alias", uri),
                        );
                        return None;
                    }
                };
                match Url::parse(uri) {
                    Ok(url) if matches!(url.scheme(), "http" | "https" | "ftp") => {}
                    Ok(url) => {
                        self.diags.error(
                            DiagCode::E0009,
                            importer,
                            stmt.span,
                            format!("unsupported URI scheme '{}'", url.scheme()),
                        );
                        return None;
                    }
                    Err(err) => {
                        self.diags.error(
                            DiagCode::E0009,
                            importer,
                            stmt.span,
                            format!("invalid import URI: {}", err),
                        );
                        return None;
                    }
                }
                let target = self.load_origin(
                    &Origin::uri(uri.clone()),
                    Some((importer, stmt.span)),
                    ReachedBy::Uri(uri.clone()),
                )?;
                Some(ResolvedImport {
                    alias,
                    kind: stmt.kind,
                    target,
                    span: stmt.span,
                })
            }
        }
    }

    /// Every top schema implicitly requires the built-in package.
    fn ensure_builtin_required(&mut self, top: FileId) {
        if self.registry.get(top).package_name() == BUILTIN_PACKAGE {
            return;
        }
        let Some(builtin) = self.load_origin(&Origin::builtin(), None, ReachedBy::Builtin) else {
            return;
        };
        let already = self
            .registry
            .get(top)
            .imports
            .iter()
            .any(|i| i.target == builtin || i.alias.as_str() == BUILTIN_PACKAGE);
        if !already {
            self.registry.get_mut(top).imports.push(ResolvedImport {
                alias: Name::new(BUILTIN_PACKAGE),
                kind: ImportKind::Require,
                target: builtin,
                span: Span::empty(),
            });
        }
    }

    // =========================================================================
    // Post-load checks
    // =========================================================================

    fn check_package_names(&mut self) {
        let mut findings = Vec::new();
        for schema in self.registry.parsed() {
            let doc = schema.doc.as_ref().expect("parsed entries carry a doc");
            let package = schema.package_name();
            match &schema.reached_by {
                ReachedBy::Top => {
                    if let Some(stem) = schema.origin.file_stem() {
                        let last = doc.package.last().map(|n| n.as_str()).unwrap_or("");
                        if !stem.eq_ignore_ascii_case(last) {
                            findings.push((
                                schema.file,
                                doc.package_span,
                                DiagCode::E0006,
                                format!(
                                    "package '{}' does not match the file name '{}'",
                                    package, stem
                                ),
                            ));
                        }
                    }
                }
                ReachedBy::Dotted(path) => {
                    if &package != path {
                        findings.push((
                            schema.file,
                            doc.package_span,
                            DiagCode::E0005,
                            format!(
                                "package '{}' does not match the import path '{}'",
                                package, path
                            ),
                        ));
                    }
                }
                ReachedBy::Uri(uri) => {
                    if let Some(prefix) = reverse_dns_prefix(uri) {
                        if package != prefix && !package.starts_with(&format!("{}.", prefix)) {
                            findings.push((
                                schema.file,
                                doc.package_span,
                                DiagCode::E0007,
                                format!(
                                    "package '{}' must start with '{}' (reverse DNS of the host)",
                                    package, prefix
                                ),
                            ));
                        }
                    }
                }
                ReachedBy::Builtin => {}
            }
        }
        for (file, span, code, message) in findings {
            self.diags.error(code, file, span, message);
        }
    }

    fn check_unique_packages(&mut self) {
        let mut seen: rustc_hash::FxHashMap<String, FileId> = rustc_hash::FxHashMap::default();
        let mut findings = Vec::new();
        for schema in self.registry.parsed() {
            let package = schema.package_name();
            match seen.get(&package) {
                Some(first) => {
                    let doc = schema.doc.as_ref().expect("parsed entries carry a doc");
                    findings.push((
                        schema.file,
                        doc.package_span,
                        format!(
                            "package '{}' is already loaded from '{}'",
                            package,
                            self.registry.get(*first).origin
                        ),
                    ));
                }
                None => {
                    seen.insert(package, schema.file);
                }
            }
        }
        for (file, span, message) in findings {
            self.diags.error(DiagCode::E0008, file, span, message);
        }
    }
}

fn join_segments(segments: &[Name]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(seg.as_str());
    }
    out
}

/// `https://www.example.com/x.yasdl` → `com.example`; the `www.` prefix
/// is optional on the host.
fn reverse_dns_prefix(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut segments: Vec<&str> = host.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    segments.reverse();
    Some(segments.join(".").to_ascii_lowercase())
}
