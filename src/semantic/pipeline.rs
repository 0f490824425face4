//! The compilation pipeline
//!
//! Control flow is strictly linear: load (phase 0), populate the model,
//! then run phases 1-7 in order. Each phase reads the fully annotated
//! state left by its predecessor; the first phase step that produces an
//! error ends the run.

use tracing::debug;

use crate::diag::Diagnostics;
use crate::project::{Fetcher, FileFetcher, Loader, Origin, SearchPath};

use super::model::Model;
use super::phases::{bind, global, impl_tree, inherit, local, realize, require};
use super::populate::populate;
use super::result::Compilation;

/// Configuration consumed by the compiler.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Directories for dotted-import resolution
    pub search_path: SearchPath,
    /// Acquisition-style dynamic lookup (walk `static_parent` on a miss)
    pub recursive: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            search_path: SearchPath::new(),
            recursive: true,
        }
    }
}

/// The YASDL compiler front door.
pub struct Compiler {
    options: CompilerOptions,
    fetcher: Box<dyn Fetcher>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            options: CompilerOptions::default(),
            fetcher: Box::new(FileFetcher::new()),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.options.search_path = search_path;
        self
    }

    /// Compile the given top schemas and everything they reach.
    pub fn compile(&self, tops: &[Origin]) -> Compilation {
        let mut diags = Diagnostics::new();

        let registry =
            Loader::new(self.fetcher.as_ref(), &self.options.search_path, &mut diags).load(tops);
        if diags.has_errors() {
            return Compilation::new(registry, None, diags);
        }

        let mut model = populate(&registry);
        model.recursive_lookup = self.options.recursive;
        run_phases(&mut model, &mut diags);

        Compilation::new(registry, Some(model), diags)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Run phases 1-7 over a populated model. Returns `true` when every phase
/// ran clean. Re-running over already-annotated state is a no-op: all
/// annotations are recomputed to the same values and no diagnostics are
/// repeated as errors.
pub fn run_phases(model: &mut Model, diags: &mut Diagnostics) -> bool {
    let phases: [(&str, fn(&mut Model, &mut Diagnostics) -> bool); 7] = [
        ("local", local::run),
        ("impl-tree", impl_tree::run),
        ("inherit", inherit::run),
        ("bind", bind::run),
        ("realize", realize::run),
        ("require", require::run),
        ("global", global::run),
    ];
    for (name, phase) in phases {
        debug!(phase = name, "running phase");
        if !phase(model, diags) {
            debug!(phase = name, errors = diags.error_count(), "phase failed");
            return false;
        }
    }
    true
}
