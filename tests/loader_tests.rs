//! Phase 0: loader and schema registry.

#![allow(clippy::unwrap_used)]

mod helpers;

use helpers::{codes, compile, compile_tops, has_code};
use yasdl::diag::{DiagCode, ExitClass};
use yasdl::{Compiler, Origin, SearchPath};

const MINIMAL: &str = "schema app { guid \"g-app\"; language \"en\"; }";

#[test]
fn test_single_top_schema_loads() {
    let result = compile(&[("/ws/app.yasdl", MINIMAL)]);
    helpers::assert_clean(&result);
    // The built-in package is loaded alongside the top schema.
    assert_eq!(result.registry.len(), 2);
}

#[test]
fn test_builtin_is_implicitly_required() {
    let result = compile(&[("/ws/app.yasdl", MINIMAL)]);
    let model = helpers::model(&result);
    let venus = model.schema_by_package("venus").expect("venus is loaded");
    // `require` propagates realization from the top schema.
    assert!(model.def(venus).realized);
}

#[test]
fn test_dotted_import_resolves_relative_to_importer() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app {\n  guid \"g-app\"; language \"en\";\n  use com.example.base as base;\n}",
        ),
        (
            "/ws/com/example/base.yasdl",
            "schema com.example.base { guid \"g-base\"; language \"en\"; }",
        ),
    ]);
    helpers::assert_clean(&result);
    assert!(helpers::model(&result).schema_by_package("com.example.base").is_some());
}

#[test]
fn test_import_search_path_fallback() {
    let fetcher = yasdl::MemoryFetcher::new()
        .with(Origin::path("/ws/app.yasdl"), "schema app { guid \"g-app\"; language \"en\"; use lib as lib; }")
        .with(Origin::path("/lib-root/lib.yasdl"), "schema lib { guid \"g-lib\"; language \"en\"; }");
    let result = Compiler::new()
        .with_fetcher(fetcher)
        .with_search_path(SearchPath::new().with("/lib-root"))
        .compile(&[Origin::path("/ws/app.yasdl")]);
    assert!(result.ok(), "{:?}", codes(&result));
}

#[test]
fn test_missing_import_is_reported_at_statement() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app {\n  guid \"g-app\"; language \"en\";\n  use nowhere.to.be as x;\n}",
    )]);
    assert!(has_code(&result, DiagCode::E0003));
    let diag = result.diagnostics.iter().find(|d| d.code == DiagCode::E0003).unwrap();
    assert_eq!(diag.span.start.line, 3);
}

#[test]
fn test_multi_segment_import_requires_alias() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; use com.example.base; }",
        ),
        (
            "/ws/com/example/base.yasdl",
            "schema com.example.base { guid \"g-base\"; language \"en\"; }",
        ),
    ]);
    assert!(has_code(&result, DiagCode::E0004));
}

#[test]
fn test_single_segment_import_alias_defaults() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; use base; }",
        ),
        ("/ws/base.yasdl", "schema base { guid \"g-base\"; language \"en\"; }"),
    ]);
    helpers::assert_clean(&result);
}

#[test]
fn test_package_name_must_match_import_path() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; use com.example.base as base; }",
        ),
        (
            "/ws/com/example/base.yasdl",
            "schema com.example.wrong { guid \"g-base\"; language \"en\"; }",
        ),
    ]);
    assert!(has_code(&result, DiagCode::E0005));
}

#[test]
fn test_top_schema_name_must_match_file_stem() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema elsewhere { guid \"g\"; language \"en\"; }",
    )]);
    assert!(has_code(&result, DiagCode::E0006));
}

#[test]
fn test_uri_import_checks_reverse_dns() {
    let good = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; require \"https://www.example.com/ext.yasdl\" as ext; }",
        ),
        (
            "https://www.example.com/ext.yasdl",
            "schema com.example.ext { guid \"g-ext\"; language \"en\"; }",
        ),
    ]);
    helpers::assert_clean(&good);

    let bad = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; require \"https://www.example.com/ext.yasdl\" as ext; }",
        ),
        (
            "https://www.example.com/ext.yasdl",
            "schema org.other.ext { guid \"g-ext\"; language \"en\"; }",
        ),
    ]);
    assert!(has_code(&bad, DiagCode::E0007));
}

#[test]
fn test_uri_import_requires_alias_and_known_scheme() {
    let no_alias = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g\"; language \"en\"; require \"https://example.com/x.yasdl\"; }",
    )]);
    assert!(has_code(&no_alias, DiagCode::E0004));

    let bad_scheme = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g\"; language \"en\"; require \"file:///etc/x.yasdl\" as x; }",
    )]);
    assert!(has_code(&bad_scheme, DiagCode::E0009));
}

#[test]
fn test_duplicate_package_name_rejected() {
    let result = compile_tops(
        &[
            ("/a/app.yasdl", "schema app { guid \"g-1\"; language \"en\"; }"),
            ("/b/app.yasdl", "schema app { guid \"g-2\"; language \"en\"; }"),
        ],
        &["/a/app.yasdl", "/b/app.yasdl"],
    );
    assert!(has_code(&result, DiagCode::E0008));
}

#[test]
fn test_import_cycles_are_permitted() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-a\"; language \"en\"; use other as other; }",
        ),
        (
            "/ws/other.yasdl",
            "schema other { guid \"g-o\"; language \"en\"; use app as app; }",
        ),
    ]);
    helpers::assert_clean(&result);
}

#[test]
fn test_missing_top_schema_is_io_error() {
    let result = compile_tops(&[], &["/nowhere/app.yasdl"]);
    assert!(has_code(&result, DiagCode::E0001));
    assert_eq!(result.exit_class(), ExitClass::IoOrSyntaxError);
}

#[test]
fn test_syntax_error_is_fatal_with_exit_class_two() {
    let result = compile(&[("/ws/app.yasdl", "schema app { field ; }")]);
    assert!(has_code(&result, DiagCode::E0002));
    assert_eq!(result.exit_class(), ExitClass::IoOrSyntaxError);
    assert!(result.model().is_none());
}

#[test]
fn test_reload_detection_through_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    let real = dir.path().join("real");
    std::fs::create_dir(&real).unwrap();
    std::fs::write(
        real.join("app.yasdl"),
        "schema app { guid \"g-app\"; language \"en\"; use base as b1; use alias.base as b2; }",
    )
    .unwrap();
    std::fs::write(
        real.join("base.yasdl"),
        "schema base { guid \"g-base\"; language \"en\"; }",
    )
    .unwrap();
    // alias/base.yasdl reaches the same file through a symlinked directory.
    let alias_dir = real.join("alias");
    std::os::unix::fs::symlink(&real, &alias_dir).unwrap();

    let result = Compiler::new().compile(&[Origin::path(real.join("app.yasdl"))]);

    // One canonical `base`, not two: otherwise E0008 would fire on the
    // duplicate package name.
    assert!(!has_code(&result, DiagCode::E0008));
    let loaded: Vec<String> = result.registry.iter().map(|s| s.package_name()).collect();
    assert_eq!(loaded.iter().filter(|p| p.as_str() == "base").count(), 1);
}
