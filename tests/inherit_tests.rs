//! Phase 3: ancestors, the inheritance DAG, and member synthesis.

#![allow(clippy::unwrap_used)]

mod helpers;

use helpers::{compile, has_code, member_names};
use yasdl::diag::DiagCode;

fn compile_body(body: &str) -> yasdl::semantic::Compilation {
    let source = format!("schema app {{ guid \"g-app\"; language \"en\"; {} }}", body);
    compile(&[("/ws/app.yasdl", &source)])
}

#[test]
fn test_member_merge_with_delete() {
    // Scenario: deleting one inherited member keeps the others in order.
    let result = compile_body(
        "abstract fieldset a { field f1; field f2; field f3; } \
         fieldset b : a { delete f2; }",
    );
    helpers::assert_clean(&result);
    let b = helpers::find(&result, "app", &["b"]);
    assert_eq!(member_names(&result, b), vec!["f1", "f3"]);

    let model = helpers::model(&result);
    for member in model.def(b).members.values() {
        assert_eq!(
            model.final_implementor(member.def),
            member.def,
            "member values are final implementors"
        );
    }
}

#[test]
fn test_member_overwrite_keeps_ancestor_position() {
    // An overwrite through a later ancestor updates the value but not
    // the position.
    let result = compile_body(
        "abstract fieldset a { field f1; field f2; } \
         abstract fieldset c { field f2 { type \"text\"; } field f4; } \
         fieldset b : a, c { field f5; }",
    );
    helpers::assert_clean(&result);
    let b = helpers::find(&result, "app", &["b"]);
    assert_eq!(member_names(&result, b), vec!["f1", "f2", "f4", "f5"]);

    let model = helpers::model(&result);
    let c_f2 = helpers::find(&result, "app", &["c", "f2"]);
    assert_eq!(model.def(b).members.get("f2").unwrap().def, c_f2);
}

#[test]
fn test_static_child_overwrite_moves_position() {
    let result = compile_body(
        "abstract fieldset a { field f1; field f2; field f3; } \
         fieldset b : a { field f1 { type \"text\"; } }",
    );
    helpers::assert_clean(&result);
    let b = helpers::find(&result, "app", &["b"]);
    assert_eq!(member_names(&result, b), vec!["f2", "f3", "f1"]);
}

#[test]
fn test_imp_name_ancestor_inherits_from_final_implementor() {
    // Scenario: the stub `name` was reimplemented by `goodname`; the
    // imp-name ancestor pulls properties from the implementor.
    let result = compile_body(
        "abstract field name { type \"char\"; size 100; } \
         field firstname : =name { reqlevel \"mandatory\"; } \
         final field goodname { implements name; type \"text\"; }",
    );
    helpers::assert_clean(&result);
    let model = helpers::model(&result);
    let firstname = helpers::find(&result, "app", &["firstname"]);
    let goodname = helpers::find(&result, "app", &["goodname"]);

    assert_eq!(model.def(firstname).ancestors_refs, vec![goodname]);
    assert_eq!(model.effective_str(firstname, "type"), Some("text"));
    assert_eq!(model.effective_int(firstname, "size"), Some(100));
    assert_eq!(model.effective_str(firstname, "reqlevel"), Some("mandatory"));
}

#[test]
fn test_ancestor_cycle_stops_the_pipeline() {
    // Scenario: a three-field ancestor cycle.
    let result = compile_body("field a : b; field b : c; field c : a;");
    assert!(has_code(&result, DiagCode::E0304));
    // Phases 4 and later never ran.
    assert!(
        result.diagnostics.iter().all(|d| d.code.phase() <= 3),
        "no diagnostics from later phases"
    );
}

#[test]
fn test_unresolved_ancestor() {
    let result = compile_body("field a : missing;");
    assert!(has_code(&result, DiagCode::E0301));
}

#[test]
fn test_owner_excluded_from_ancestor_search() {
    // `fieldset location : location` binds the outer definition.
    let result = compile_body(
        "fieldset location { field code { type \"text\"; } } \
         fieldset site { fieldset location : location { } }",
    );
    helpers::assert_clean(&result);
    let outer = helpers::find(&result, "app", &["location"]);
    let inner = helpers::find(&result, "app", &["site", "location"]);
    let model = helpers::model(&result);
    assert_eq!(model.def(inner).ancestors_refs, vec![outer]);
    assert_eq!(member_names(&result, inner), vec!["code"]);
}

#[test]
fn test_ancestor_containment_rejected() {
    let result = compile_body("fieldset a { fieldset b : a { } }");
    assert!(has_code(&result, DiagCode::E0303));
}

#[test]
fn test_ancestor_kind_mismatch() {
    let result = compile_body("fieldset fs { field x; } field a : fs;");
    assert!(has_code(&result, DiagCode::E0305));
}

#[test]
fn test_unused_delete_warns() {
    let result = compile_body("abstract fieldset a { field f1; } fieldset b : a { delete nothing; }");
    assert!(has_code(&result, DiagCode::W0306));
    // Warnings never fail the compilation.
    assert!(result.ok());
}

#[test]
fn test_delete_of_statically_visible_name_is_a_notice() {
    let result = compile_body(
        "field stray; abstract fieldset a { field f1; } fieldset b : a { delete stray; }",
    );
    assert!(has_code(&result, DiagCode::N0307));
    assert!(result.ok());
}

#[test]
fn test_descendants_inverse_relation() {
    let result = compile_body(
        "abstract fieldset base { field f1; } \
         fieldset mid : base { field f2; } \
         fieldset leaf : mid { field f3; }",
    );
    helpers::assert_clean(&result);
    let model = helpers::model(&result);
    let base = helpers::find(&result, "app", &["base"]);
    let mid = helpers::find(&result, "app", &["mid"]);
    let leaf = helpers::find(&result, "app", &["leaf"]);

    assert!(model.def(base).descendants.contains(&mid));
    assert!(model.def(base).descendants.contains(&leaf));
    assert!(model.def(leaf).ancestors_all.contains(&base));
    assert!(!model.def(base).ancestors_all.contains(&leaf));
}

#[test]
fn test_ancestors_across_schemas() {
    let result = compile(&[
        (
            "/ws/app.yasdl",
            "schema app { guid \"g-app\"; language \"en\"; use base as base; \
             fieldset partner : base.party { field extra; } }",
        ),
        (
            "/ws/base.yasdl",
            "schema base { guid \"g-base\"; language \"en\"; \
             abstract fieldset party { field code; field name; } }",
        ),
    ]);
    helpers::assert_clean(&result);
    let partner = helpers::find(&result, "app", &["partner"]);
    assert_eq!(member_names(&result, partner), vec!["code", "name", "extra"]);
}
