//! End-to-end scenarios and the quantified model invariants.

#![allow(clippy::unwrap_used)]

mod helpers;

use helpers::{compile, member_names};
use yasdl::diag::Diagnostics;
use yasdl::project::{Loader, SearchPath};
use yasdl::semantic::{DefKind, populate, run_phases};
use yasdl::{MemoryFetcher, Origin};

/// Stub reimplementation with rename: the old member names disappear,
/// the renamed implementors take their place, and indexes resolve to the
/// renamed fields.
#[test]
fn test_stub_reimplementation_rename() {
    let result = compile(&[(
        "/ws/indexes_04.yasdl",
        "schema indexes_04 { guid \"g-i04\"; language \"en\"; \
         abstract fieldset outer_1 { \
           field code { type \"varchar\"; size 10; } \
           field name { type \"varchar\"; size 100; } } \
         fieldset outer_2 : outer_1 { \
           delete code; \
           delete name; \
           field code3 { implements outer_1.code; type \"varchar\"; size 10; } \
           field name3 { implements outer_1.name; type \"varchar\"; size 100; } } \
         required fieldset outer_3 : outer_2 { \
           guid \"g-outer3\"; \
           field code { type \"varchar\"; size 20; } \
           index uidx_code { fields code3; unique true; } \
           index idx_name { fields name3; } } }",
    )]);
    helpers::assert_clean(&result);
    let model = helpers::model(&result);

    let outer_3 = helpers::find(&result, "indexes_04", &["outer_3"]);
    assert!(model.def(outer_3).toplevel);
    assert_eq!(member_names(&result, outer_3), vec!["code3", "name3", "code"]);

    let code3 = helpers::find(&result, "indexes_04", &["outer_2", "code3"]);
    let name3 = helpers::find(&result, "indexes_04", &["outer_2", "name3"]);

    let indexes = result.indexes_of(outer_3);
    assert_eq!(indexes.len(), 2);
    let uidx_fields = result.index_fields(indexes[0]);
    assert_eq!(uidx_fields[0].0.target(), code3);
    let idx_fields = result.index_fields(indexes[1]);
    assert_eq!(idx_fields[0].0.target(), name3);
}

#[test]
fn test_member_paths_for_code_generation() {
    let result = compile(&[(
        "/ws/app.yasdl",
        "schema app { guid \"g-app\"; language \"en\"; \
         required fieldset person { guid \"g-person\"; \
           field name { type \"text\"; } \
           fieldset home { field city { type \"text\"; } } \
           fieldset work { field city { type \"text\"; } } } }",
    )]);
    helpers::assert_clean(&result);
    let person = helpers::find(&result, "app", &["person"]);
    let paths: Vec<String> = result
        .member_paths(person)
        .iter()
        .map(|p| p.dotted())
        .collect();
    assert_eq!(paths, vec!["name", "home.city", "work.city"]);
}

const RICH: &str = "schema app { guid \"g-app\"; language \"en\"; \
    abstract fieldset party { \
      required field code { type \"varchar\"; size 20; notnull true; } \
      field name { type \"varchar\"; size 100; } } \
    required fieldset partner : party { \
      implements all; \
      guid \"g-partner\"; \
      field phone { type \"varchar\"; size 32; } \
      field owner -> partner2 { need_index false; } } \
    required fieldset partner2 { \
      guid \"g-partner2\"; \
      field code { type \"varchar\"; size 20; } } }";

fn rich_model() -> (yasdl::semantic::Model, Diagnostics) {
    let fetcher = MemoryFetcher::new().with(Origin::path("/ws/app.yasdl"), RICH);
    let mut diags = Diagnostics::new();
    let registry =
        Loader::new(&fetcher, &SearchPath::new(), &mut diags).load(&[Origin::path("/ws/app.yasdl")]);
    assert!(!diags.has_errors());
    let mut model = populate(&registry);
    assert!(run_phases(&mut model, &mut diags));
    (model, diags)
}

/// Re-running the pipeline over annotated state changes nothing: same
/// attributes, same diagnostics, no new errors.
#[test]
fn test_pipeline_is_idempotent() {
    let (mut model, first) = rich_model();

    let members_before: Vec<Vec<String>> = model
        .iter()
        .map(|d| d.members.keys().map(|k| k.to_string()).collect())
        .collect();
    let realized_before: Vec<bool> = model.iter().map(|d| d.realized).collect();
    let fi_before: Vec<_> = model.iter().map(|d| d.final_implementor).collect();

    let mut second = Diagnostics::new();
    assert!(run_phases(&mut model, &mut second));

    let first_codes: Vec<_> = first.iter().map(|d| d.code).collect();
    let second_codes: Vec<_> = second.iter().map(|d| d.code).collect();
    assert_eq!(first_codes, second_codes);
    assert!(!second.has_errors());

    let members_after: Vec<Vec<String>> = model
        .iter()
        .map(|d| d.members.keys().map(|k| k.to_string()).collect())
        .collect();
    let realized_after: Vec<bool> = model.iter().map(|d| d.realized).collect();
    let fi_after: Vec<_> = model.iter().map(|d| d.final_implementor).collect();

    assert_eq!(members_before, members_after);
    assert_eq!(realized_before, realized_after);
    assert_eq!(fi_before, fi_after);
}

/// The quantified invariants of the annotated model.
#[test]
fn test_model_invariants() {
    let (model, _diags) = rich_model();

    let mut guids: Vec<String> = Vec::new();
    for def in model.iter() {
        // GUIDs are pairwise distinct.
        if let Some(prop) = model.own_property(def.id, "guid") {
            if let Some(value) = prop.args.first().and_then(|a| a.value.as_str()) {
                assert!(!guids.contains(&value.to_string()), "guid reuse: {}", value);
                guids.push(value.to_string());
            }
        }
        if !def.kind.is_typed() {
            continue;
        }

        // fi is total and idempotent; root xor implemented.
        let fi = model.final_implementor(def.id);
        assert_eq!(model.final_implementor(fi), fi);
        assert_ne!(fi == def.id, def.direct_implementor.is_some());

        // Ancestor pairs are distinct and never statically nested.
        for &ancestor in &def.ancestors_refs {
            assert_ne!(ancestor, def.id);
            assert!(!model.statically_contains(ancestor, def.id));
            assert!(!model.statically_contains(def.id, ancestor));
        }

        // Every member value is a final implementor.
        for member in def.members.values() {
            assert_eq!(model.final_implementor(member.def), member.def);
        }

        // No realized abstract final implementation.
        if def.realized && def.modifiers.is_abstract {
            assert_ne!(fi, def.id, "realized abstract final implementation");
        }

        // Realized reference fields resolve to the identifier type.
        if def.kind == DefKind::Field && def.realized && model.reference_target(def.id).is_some()
        {
            assert_eq!(def.resolved_type.as_deref(), Some("identifier"));
        }
    }
}

/// Required members of realized specifications are realized.
#[test]
fn test_required_members_realized_invariant() {
    let (model, _diags) = rich_model();
    for def in model.iter() {
        if !def.kind.is_typed() || !def.realized || model.final_implementor(def.id) != def.id {
            continue;
        }
        for &spec in &def.specifications {
            for (name, member) in &model.def(spec).members {
                if model.def(member.origin).modifiers.is_required {
                    let found = def.members.get(name).expect("required member present");
                    assert!(model.def(found.def).realized);
                }
            }
        }
    }
}
