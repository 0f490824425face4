//! Phase 7 global checks and the phase-8 type-registry hook.

#![allow(clippy::unwrap_used)]

mod helpers;

use helpers::{compile, has_code};
use yasdl::diag::DiagCode;
use yasdl::semantic::{TypeKind, TypeRegistry};

/// One realized table with the given extra body.
fn compile_table(body: &str) -> yasdl::semantic::Compilation {
    let source = format!(
        "schema app {{ guid \"g-app\"; language \"en\"; \
         required fieldset main {{ guid \"g-main\"; field keep {{ type \"text\"; }} {} }} }}",
        body
    );
    compile(&[("/ws/app.yasdl", &source)])
}

#[test]
fn test_empty_realized_fieldset_rejected() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset empty { guid \"g-empty\"; index idx { fields nothing; } } }",
    )]);
    // Either the dangling index field or the emptiness is fatal; the
    // emptiness check is what this exercises:
    let no_fields = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset empty { guid \"g-empty\"; } }",
    )]);
    assert!(!result.ok());
    assert!(has_code(&no_fields, DiagCode::E0701));
}

#[test]
fn test_required_on_outermost_field_warns() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; required field stray { type \"text\"; } }",
    )]);
    assert!(has_code(&result, DiagCode::W0702));
    assert!(result.ok());
}

#[test]
fn test_reference_field_defaults_to_identifier_type() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset invoice { guid \"g-i\"; field issuer -> person { need_index false; } } \
         fieldset person { guid \"g-p\"; field name { type \"text\"; } } }",
    )]);
    helpers::assert_clean(&result);
    let issuer = helpers::find(&result, "app", &["invoice", "issuer"]);
    assert_eq!(result.field_type(issuer), Some("identifier"));
}

#[test]
fn test_reference_field_with_wrong_type_rejected() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset invoice { guid \"g-i\"; \
           field issuer -> person { type \"integer\"; need_index false; } } \
         fieldset person { guid \"g-p\"; field name { type \"text\"; } } }",
    )]);
    assert!(has_code(&result, DiagCode::E0704));
}

#[test]
fn test_realized_field_without_type_rejected() {
    let result = compile_table("field untyped;");
    assert!(has_code(&result, DiagCode::E0704));
}

#[test]
fn test_size_takes_a_single_integer() {
    let result = compile_table("field sized { type \"varchar\"; size \"wide\"; }");
    assert!(has_code(&result, DiagCode::E0705));
}

#[test]
fn test_notnull_restricted_to_fields() {
    let result = compile_table("notnull true;");
    assert!(has_code(&result, DiagCode::E0706));
}

#[test]
fn test_unique_restricted_to_indexes() {
    let result = compile_table("field code { type \"text\"; unique true; }");
    assert!(has_code(&result, DiagCode::E0706));
}

#[test]
fn test_guid_mandatory_on_toplevel() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset main { field x { type \"text\"; } } }",
    )]);
    assert!(has_code(&result, DiagCode::E0707));
}

#[test]
fn test_guid_must_be_globally_unique() {
    let result = compile_table("field a { type \"text\"; guid \"g-app\"; }");
    assert!(has_code(&result, DiagCode::E0707));
}

#[test]
fn test_guid_map_collects_definitions() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset main { guid \"g-main\"; field x { type \"text\"; } } }",
    )]);
    helpers::assert_clean(&result);
    let map = result.guid_map();
    assert!(map.contains_key("g-app"));
    assert!(map.contains_key("g-main"));
    let main = helpers::find(&result, "app", &["main"]);
    assert_eq!(map.get("g-main"), Some(&main));
}

#[test]
fn test_ondelete_value_and_context() {
    let bad_value = compile_table("ondelete \"explode\";");
    // `ondelete` on the fieldset itself with a bad value:
    assert!(has_code(&bad_value, DiagCode::E0708));

    let bad_context = compile_table("field x { type \"text\"; ondelete \"cascade\"; }");
    assert!(has_code(&bad_context, DiagCode::E0708));
}

#[test]
fn test_notnull_with_setnull_target_rejected() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset invoice { guid \"g-i\"; \
           field issuer -> person { notnull true; need_index false; } } \
         fieldset person { guid \"g-p\"; ondelete \"setnull\"; field name { type \"text\"; } } }",
    )]);
    assert!(has_code(&result, DiagCode::E0708));
}

#[test]
fn test_missing_language_warns_with_default() {
    let result = compile(&[("/ws/app.yasdl", "schema app { guid \"g-app\"; }")]);
    assert!(has_code(&result, DiagCode::W0709));
    assert!(result.ok());
}

#[test]
fn test_language_restricted_to_schemas() {
    let result = compile_table("language \"hu\";");
    assert!(has_code(&result, DiagCode::E0710));
}

#[test]
fn test_cluster_names_a_same_level_index() {
    let good = compile_table(
        "cluster by_keep; index by_keep { fields keep; }",
    );
    helpers::assert_clean(&good);

    let bad = compile_table("cluster keep;");
    assert!(has_code(&bad, DiagCode::E0711));
}

#[test]
fn test_reqlevel_values() {
    let bad = compile_table("field x { type \"text\"; reqlevel \"sometimes\"; }");
    assert!(has_code(&bad, DiagCode::E0712));

    let notice = compile_table("field x { type \"text\"; reqlevel \"required\"; }");
    assert!(has_code(&notice, DiagCode::N0713));
    assert!(notice.ok(), "notices never fail the build");

    let quiet = compile_table("field x { type \"text\"; notnull true; reqlevel \"required\"; }");
    assert!(!has_code(&quiet, DiagCode::N0713));
}

#[test]
fn test_index_over_unrealized_field_rejected() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         abstract fieldset base { field hidden { type \"text\"; } } \
         required fieldset main : base { guid \"g-main\"; \
           delete hidden; \
           field keep { type \"text\"; } \
           index idx { fields hidden; } } }",
    )]);
    // `hidden` is not a member of main anymore; the index cannot bind it.
    assert!(!result.ok());
}

#[test]
fn test_reference_without_index_notices() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset invoice { guid \"g-i\"; field issuer -> person; } \
         fieldset person { guid \"g-p\"; field name { type \"text\"; } } }",
    )]);
    assert!(has_code(&result, DiagCode::N0715));
    assert!(result.ok());
}

// =============================================================================
// Phase 8: driver type registry
// =============================================================================

struct TestRegistry;

impl TypeRegistry for TestRegistry {
    fn kind(&self, type_name: &str) -> Option<TypeKind> {
        match type_name {
            "text" | "integer" => Some(TypeKind::FixedSize),
            "varchar" => Some(TypeKind::RequiresSize),
            "numeric" => Some(TypeKind::RequiresPrecision),
            "identifier" => Some(TypeKind::IdentifierCompatible),
            _ => None,
        }
    }
}

#[test]
fn test_driver_type_checks() {
    let result = compile_table(
        "field ok { type \"varchar\"; size 10; } \
         field missing_size { type \"varchar\"; } \
         field strange { type \"blob9000\"; }",
    );
    helpers::assert_clean(&result);

    let driver = result.check_types(&TestRegistry);
    let codes: Vec<_> = driver.iter().map(|d| d.code).collect();
    assert!(codes.contains(&DiagCode::E0802), "varchar without size");
    assert!(codes.contains(&DiagCode::E0801), "unknown type");
    assert!(!codes.contains(&DiagCode::E0803));
}
