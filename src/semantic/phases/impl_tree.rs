//! Phase 2: implementation-tree builder
//!
//! Partitions fields and fieldsets into implementation trees: connects
//! direct-implementor links, computes the total `final_implementor`
//! function, validates modifiers against the trees, rejects static
//! containment inside one tree, and caches the spec/impl closures.

use crate::diag::{DiagCode, Diagnostics};

use super::super::model::{DefId, Model, Value};
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(
        model,
        diags,
        &[
            assign_direct_implementors,
            check_imp_ancestor_rule,
            compute_final_implementors,
            check_tree_modifiers,
            check_tree_containment,
            build_closures,
        ],
    )
}

/// True when the definition's ancestor list contains an imp-name.
pub(super) fn has_imp_ancestor(model: &Model, id: DefId) -> bool {
    let Some(prop) = model.def(id).ancestors_property() else {
        return false;
    };
    model.def(prop).args.iter().any(|arg| match &arg.value {
        Value::Name(name) => name.imp,
        Value::Def { imp, .. } => *imp,
        _ => false,
    })
}

// =============================================================================
// Step 1: direct implementor assignment
// =============================================================================

fn assign_direct_implementors(model: &mut Model, diags: &mut Diagnostics) {
    for id in model.ids() {
        if !model.def(id).kind.is_typed() {
            continue;
        }
        let refs = model.def(id).implements_refs.clone();
        for spec in refs {
            match model.def(spec).direct_implementor {
                None => model.def_mut(spec).direct_implementor = Some(id),
                Some(existing) if existing == id => {}
                Some(existing) => {
                    let def = model.def(id);
                    let message = format!(
                        "'{}' is already implemented by '{}'; a definition has at most one direct implementor",
                        model.display_name(spec),
                        model.display_name(existing)
                    );
                    diags.error(DiagCode::E0201, def.file, def.name_span, message);
                }
            }
        }
    }
}

// =============================================================================
// Step 2: imp-name ancestor constraint
// =============================================================================

fn check_imp_ancestor_rule(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() || def.direct_implementor.is_none() {
            continue;
        }
        if has_imp_ancestor(model, id) {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "'{}' has an imp-name ancestor and cannot be listed under implements",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0202, file, span, message);
    }
}

// =============================================================================
// Step 3: final-implementor computation
// =============================================================================

fn compute_final_implementors(model: &mut Model, _diags: &mut Diagnostics) {
    for id in model.ids() {
        if !model.def(id).kind.is_typed() {
            continue;
        }
        // Chains are acyclic after phase 1 step 7.
        let mut root = id;
        while let Some(up) = model.def(root).direct_implementor {
            root = up;
        }
        model.def_mut(id).final_implementor = Some(root);
    }
}

// =============================================================================
// Step 4: modifier consistency against trees
// =============================================================================

fn check_tree_modifiers(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() {
            continue;
        }
        let is_root = model.final_implementor(id) == id;
        if def.modifiers.is_final && !is_root {
            findings.push((
                def.file,
                def.name_span,
                DiagCode::E0203,
                format!(
                    "final definition '{}' is implemented by '{}'",
                    model.display_name(id),
                    model.display_name(model.final_implementor(id))
                ),
            ));
        }
        if def.modifiers.is_abstract && def.modifiers.is_required && is_root {
            findings.push((
                def.file,
                def.name_span,
                DiagCode::E0204,
                format!(
                    "abstract required definition '{}' has no implementor",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, code, message) in findings {
        diags.error(code, file, span, message);
    }
}

// =============================================================================
// Step 5: static containment within one tree
// =============================================================================

fn check_tree_containment(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() {
            continue;
        }
        let root = model.final_implementor(id);
        // Walk the lexical parent chain; a typed container in the same
        // tree means one tree node statically contains another.
        let mut current = def.static_parent;
        while let Some(parent) = current {
            let parent_def = model.def(parent);
            if parent_def.kind.is_typed() && model.final_implementor(parent) == root {
                findings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "'{}' and '{}' are in one implementation tree but one statically contains the other",
                        model.display_name(parent),
                        model.display_name(id)
                    ),
                ));
                break;
            }
            current = parent_def.static_parent;
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0205, file, span, message);
    }
}

// =============================================================================
// Step 6: closure caches
// =============================================================================

fn build_closures(model: &mut Model, _diags: &mut Diagnostics) {
    for id in model.ids() {
        if !model.def(id).kind.is_typed() {
            continue;
        }

        // specifications: this definition plus everything it transitively
        // implements, depth first in listed order.
        let mut specs = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if specs.contains(&next) {
                continue;
            }
            specs.push(next);
            for &spec in model.def(next).implements_refs.iter().rev() {
                stack.push(spec);
            }
        }

        // implementations: the chain up to the final implementor.
        let mut impls = vec![id];
        let mut current = id;
        while let Some(up) = model.def(current).direct_implementor {
            impls.push(up);
            current = up;
        }

        let def = model.def_mut(id);
        def.specifications = specs;
        def.implementations = impls;
    }
}
