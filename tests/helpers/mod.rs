//! Shared fixtures for the integration tests: in-memory compilation from
//! source strings and small lookup helpers over the result.

#![allow(dead_code)]

use yasdl::diag::DiagCode;
use yasdl::semantic::{Compilation, DefId, Model};
use yasdl::{Compiler, MemoryFetcher, Origin};

/// Compile in-memory sources; the first entry is the top schema. Paths
/// follow the loader's rules, so a top schema `a.b.app` should live at
/// a path whose stem is `app`.
pub fn compile(sources: &[(&str, &str)]) -> Compilation {
    compile_tops(sources, &[sources[0].0])
}

/// Compile with an explicit set of top origins.
pub fn compile_tops(sources: &[(&str, &str)], tops: &[&str]) -> Compilation {
    let mut fetcher = MemoryFetcher::new();
    for (path, text) in sources {
        let origin = if path.contains("://") {
            Origin::uri(*path)
        } else {
            Origin::path(*path)
        };
        fetcher.insert(origin, *text);
    }
    let top_origins: Vec<Origin> = tops
        .iter()
        .map(|path| {
            if path.contains("://") {
                Origin::uri(*path)
            } else {
                Origin::path(*path)
            }
        })
        .collect();
    Compiler::new().with_fetcher(fetcher).compile(&top_origins)
}

/// All diagnostic codes, in report order.
pub fn codes(compilation: &Compilation) -> Vec<DiagCode> {
    compilation.diagnostics.iter().map(|d| d.code).collect()
}

pub fn has_code(compilation: &Compilation, code: DiagCode) -> bool {
    codes(compilation).contains(&code)
}

pub fn assert_clean(compilation: &Compilation) {
    assert!(
        compilation.ok(),
        "expected a clean compilation, got: {:#?}",
        compilation
            .diagnostics
            .iter()
            .map(|d| d.format())
            .collect::<Vec<_>>()
    );
}

pub fn model(compilation: &Compilation) -> &Model {
    compilation.model().expect("compilation built a model")
}

/// Look up a definition by package and static path.
pub fn find(compilation: &Compilation, package: &str, path: &[&str]) -> DefId {
    let model = model(compilation);
    let mut current = model
        .schema_by_package(package)
        .unwrap_or_else(|| panic!("schema '{}' not loaded", package));
    for segment in path {
        current = model
            .def(current)
            .body
            .iter()
            .copied()
            .find(|&child| model.def(child).name.as_str() == *segment)
            .unwrap_or_else(|| panic!("no '{}' under '{}'", segment, model.display_name(current)));
    }
    current
}

/// Member names of a definition, in table order.
pub fn member_names(compilation: &Compilation, def: DefId) -> Vec<String> {
    model(compilation)
        .def(def)
        .members
        .keys()
        .map(|name| name.to_string())
        .collect()
}
