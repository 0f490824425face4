//! Phase 5: realization fixpoint
//!
//! Decides which definitions become database objects. Realization seeds
//! at the top schemas, flows through `require` imports, `required`
//! outermost fieldsets, member tables, and concrete references, and
//! iterates to a fixed point. Universal (`any`) references and plain
//! `use` imports propagate nothing.

use rustc_hash::FxHashSet;

use tracing::warn;

use crate::diag::{DiagCode, Diagnostics};

use super::super::model::{DefId, DefKind, Model};
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(model, diags, &[seed_schemas, fixpoint, check_abstract])
}

// =============================================================================
// Step 1: schema seeding through `require`
// =============================================================================

fn seed_schemas(model: &mut Model, _diags: &mut Diagnostics) {
    for &schema in &model.schemas().to_vec() {
        if model.schema_data(schema).is_top {
            model.def_mut(schema).realized = true;
        }
    }
    let mut changed = true;
    while changed {
        changed = false;
        for &schema in &model.schemas().to_vec() {
            if !model.def(schema).realized {
                continue;
            }
            let requires: Vec<DefId> = model
                .schema_data(schema)
                .imports
                .iter()
                .filter(|i| i.kind == crate::syntax::ImportKind::Require)
                .map(|i| i.target)
                .collect();
            for target in requires {
                if !model.def(target).realized {
                    model.def_mut(target).realized = true;
                    changed = true;
                }
            }
        }
    }
}

// =============================================================================
// Steps 2-5: the fixpoint proper
// =============================================================================

const MAX_ITERATIONS: usize = 10_000;

fn fixpoint(model: &mut Model, diags: &mut Diagnostics) {
    // The flags are monotonic, so errors are collected once per offender
    // instead of once per iteration.
    let mut not_outermost_required: FxHashSet<DefId> = FxHashSet::default();
    let mut not_outermost_referenced: FxHashSet<DefId> = FxHashSet::default();

    let mut changed = true;
    let mut iterations = 0usize;
    while changed && iterations < MAX_ITERATIONS {
        changed = false;
        iterations += 1;

        // `required` outermost fieldsets of realized schemas become
        // toplevel through their final implementor.
        for &schema in &model.schemas().to_vec() {
            if !model.def(schema).realized {
                continue;
            }
            for child in model.def(schema).body.clone() {
                let child_def = model.def(child);
                if child_def.kind != DefKind::Fieldset || !child_def.modifiers.is_required {
                    continue;
                }
                let root = model.final_implementor(child);
                if !model.is_outermost(root) {
                    not_outermost_required.insert(child);
                    continue;
                }
                changed |= mark(model, root, true);
            }
        }

        // Members of realized fieldsets are realized (not toplevel).
        for id in model.ids() {
            let def = model.def(id);
            if def.kind != DefKind::Fieldset || !def.realized {
                continue;
            }
            let members: Vec<DefId> = def.members.values().map(|m| m.def).collect();
            for member in members {
                changed |= mark(model, member, false);
            }
        }

        // Concrete references pull in the target's final implementor as a
        // toplevel fieldset.
        for id in model.ids() {
            let def = model.def(id);
            if def.kind != DefKind::Field || !def.realized {
                continue;
            }
            let Some(target) = model.reference_target(id) else {
                continue;
            };
            let root = model.final_implementor(target);
            if !model.is_outermost(root) {
                not_outermost_referenced.insert(id);
                continue;
            }
            changed |= mark(model, root, true);
        }
    }

    if iterations >= MAX_ITERATIONS {
        warn!("realization fixpoint hit the iteration limit");
    }

    for id in not_outermost_required {
        let def = model.def(id);
        diags.error(
            DiagCode::E0501,
            def.file,
            def.name_span,
            format!(
                "required fieldset '{}' is finally implemented by the non-outermost '{}'",
                model.display_name(id),
                model.display_name(model.final_implementor(id))
            ),
        );
    }
    for id in not_outermost_referenced {
        let def = model.def(id);
        diags.error(
            DiagCode::E0502,
            def.file,
            def.name_span,
            format!(
                "field '{}' references a fieldset whose final implementor is not outermost",
                model.display_name(id)
            ),
        );
    }
}

fn mark(model: &mut Model, id: DefId, toplevel: bool) -> bool {
    let def = model.def_mut(id);
    let mut changed = false;
    if !def.realized {
        def.realized = true;
        changed = true;
    }
    if toplevel && !def.toplevel {
        def.toplevel = true;
        changed = true;
    }
    changed
}

// =============================================================================
// Step 6: no realized abstract final implementation
// =============================================================================

fn check_abstract(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() || !def.realized || !def.modifiers.is_abstract {
            continue;
        }
        if model.final_implementor(id) == id {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "abstract definition '{}' is realized; something must implement it",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0503, file, span, message);
    }
}
