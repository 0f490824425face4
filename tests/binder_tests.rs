//! Phase 4: dynamic binding and property-argument checks.

#![allow(clippy::unwrap_used)]

mod helpers;

use helpers::{compile, has_code};
use yasdl::diag::DiagCode;
use yasdl::semantic::Value;

fn compile_body(body: &str) -> yasdl::semantic::Compilation {
    let source = format!("schema app {{ guid \"g-app\"; language \"en\"; {} }}", body);
    compile(&[("/ws/app.yasdl", &source)])
}

#[test]
fn test_reference_binds_through_acquisition() {
    let result = compile_body(
        "fieldset invoice { field issuer -> person; field number { type \"integer\"; } } \
         fieldset person { field name { type \"text\"; } }",
    );
    helpers::assert_clean(&result);
    let issuer = helpers::find(&result, "app", &["invoice", "issuer"]);
    let person = helpers::find(&result, "app", &["person"]);
    let model = helpers::model(&result);
    assert_eq!(model.reference_target(issuer), Some(person));
}

#[test]
fn test_absolute_reference() {
    let result = compile_body(
        "fieldset invoice { field issuer -> schema.person; } \
         fieldset person { field name { type \"text\"; } }",
    );
    helpers::assert_clean(&result);
    let issuer = helpers::find(&result, "app", &["invoice", "issuer"]);
    let person = helpers::find(&result, "app", &["person"]);
    assert_eq!(helpers::model(&result).reference_target(issuer), Some(person));
}

#[test]
fn test_mixed_binding_dereferences_static_children() {
    // `stub` was reimplemented elsewhere; a reference through the old
    // name lands on the final implementor.
    let result = compile_body(
        "fieldset holder { fieldset stub { field code; } } \
         fieldset actual { implements holder.stub; field code; } \
         fieldset user { field link -> holder.stub; }",
    );
    helpers::assert_clean(&result);
    let link = helpers::find(&result, "app", &["user", "link"]);
    let actual = helpers::find(&result, "app", &["actual"]);
    assert_eq!(helpers::model(&result).reference_target(link), Some(actual));
}

#[test]
fn test_unresolved_property_name() {
    let result = compile_body("fieldset a { field x; cluster nothing_here; }");
    assert!(has_code(&result, DiagCode::E0401) || has_code(&result, DiagCode::E0711));
}

#[test]
fn test_reference_must_be_a_fieldset() {
    let result = compile_body(
        "fieldset invoice { field issuer -> number; field number { type \"integer\"; } }",
    );
    assert!(has_code(&result, DiagCode::E0402));
}

#[test]
fn test_reference_to_enclosing_fieldset_rejected() {
    let result = compile_body("fieldset invoice { field parent -> invoice; field x; }");
    assert!(has_code(&result, DiagCode::E0403));
}

#[test]
fn test_universal_reference_marker() {
    let result = compile_body("fieldset log { field target -> any; field note { type \"text\"; } }");
    helpers::assert_clean(&result);
    let target = helpers::find(&result, "app", &["log", "target"]);
    let model = helpers::model(&result);
    assert!(model.is_universal_reference(target));
    assert_eq!(model.reference_target(target), None);
}

#[test]
fn test_index_requires_fields() {
    let result = compile_body("fieldset a { field x; index idx { unique true; } }");
    assert!(has_code(&result, DiagCode::E0404));
}

#[test]
fn test_index_fields_resolve_inside_the_fieldset() {
    let result = compile_body(
        "fieldset a { field x; index idx { fields y; } } field y { type \"text\"; }",
    );
    // `y` exists at schema level, but index fields do not acquire.
    assert!(has_code(&result, DiagCode::E0405));
}

#[test]
fn test_index_duplicate_field() {
    let result = compile_body("fieldset a { field x; index idx { fields x, x; } }");
    assert!(has_code(&result, DiagCode::E0406));
}

#[test]
fn test_index_fields_with_sort_directions() {
    let result = compile_body(
        "fieldset a { field x { type \"text\"; } field y { type \"text\"; } \
         index idx { fields x+, y-; } }",
    );
    helpers::assert_clean(&result);
    let idx = helpers::find(&result, "app", &["a", "idx"]);
    let model = helpers::model(&result);
    let fields_prop = model.def(idx).properties.get("fields").copied().unwrap();
    let args = &model.def(fields_prop).args;
    assert!(matches!(args[0].value, Value::Path(_)));
    assert_eq!(args[0].sort, Some(yasdl::syntax::SortDir::Ascending));
    assert_eq!(args[1].sort, Some(yasdl::syntax::SortDir::Descending));
}

#[test]
fn test_constraint_requires_check() {
    let result = compile_body("fieldset a { field x; constraint positive { } }");
    assert!(has_code(&result, DiagCode::E0407));
}

#[test]
fn test_constraint_with_string_and_field_args() {
    let result = compile_body(
        "fieldset a { field amount { type \"numeric\"; precision 2; } \
         constraint positive { check amount, \"> 0\"; } }",
    );
    helpers::assert_clean(&result);
}

#[test]
fn test_binding_results_are_paths() {
    let result = compile_body(
        "abstract fieldset address { field city { type \"text\"; } } \
         fieldset person { fieldset home : address { } fieldset work : address { } \
         index idx { fields home.city; } }",
    );
    helpers::assert_clean(&result);
    let idx = helpers::find(&result, "app", &["person", "idx"]);
    let model = helpers::model(&result);
    let fields_prop = model.def(idx).properties.get("fields").copied().unwrap();
    let Value::Path(path) = &model.def(fields_prop).args[0].value else {
        panic!("expected a bound path");
    };
    // The path distinguishes home.city from work.city even though both
    // resolve through the same ancestor.
    assert_eq!(path.dotted(), "home.city");
}
