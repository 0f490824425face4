//! Phase 3: inheritance-graph builder
//!
//! Resolves the `ancestors` property (imp-names dereference to final
//! implementors), rejects cycles and containment violations, and runs the
//! central member-synthesis algorithm that merges ancestor member tables
//! with statically contained children.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::Name;
use crate::diag::{DiagCode, Diagnostics};
use crate::syntax::{ClassSet, NameClass};

use super::super::binder::{self, BindError};
use super::super::model::{DefId, DefKind, Member, Model, Value};
use super::impl_tree::has_imp_ancestor;
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(
        model,
        diags,
        &[
            resolve_ancestors,
            check_acyclic,
            assert_no_impl_rule,
            build_closures,
            check_containment,
            synthesize_members,
        ],
    )
}

const ANCESTOR_CLASSES: ClassSet = ClassSet::of(&[NameClass::Fieldset, NameClass::Field]);

// =============================================================================
// Step 1: resolve `ancestors` arguments
// =============================================================================

fn resolve_ancestors(model: &mut Model, diags: &mut Diagnostics) {
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() {
            continue;
        }
        let Some(prop) = def.ancestors_property() else {
            continue;
        };
        let file = def.file;
        let kind = def.kind;
        let mut args = model.def(prop).args.clone();
        let mut effective: Vec<DefId> = Vec::new();

        for arg in &mut args {
            let (target, imp) = match &arg.value {
                Value::Name(name) => {
                    let imp = name.imp;
                    // The owning definition is excluded from the search,
                    // permitting `fieldset location : location`.
                    match binder::bind_static(model, id, name, ANCESTOR_CLASSES, Some(id)) {
                        Ok(target) => {
                            arg.value = Value::Def { def: target, imp };
                            (target, imp)
                        }
                        Err(BindError::Unresolved { name }) => {
                            diags.error(
                                DiagCode::E0301,
                                file,
                                arg.span,
                                format!("cannot resolve ancestor '{}'", name),
                            );
                            continue;
                        }
                        Err(BindError::WrongClass { name, found }) => {
                            diags.error(
                                DiagCode::E0305,
                                file,
                                arg.span,
                                format!("ancestor '{}' is a {}", name, found.as_str()),
                            );
                            continue;
                        }
                    }
                }
                Value::Def { def, imp } => (*def, *imp),
                other => {
                    diags.error(
                        DiagCode::E0301,
                        file,
                        arg.span,
                        format!("ancestors argument must be a name, not {}", other.kind_name()),
                    );
                    continue;
                }
            };

            if target == id {
                diags.error(
                    DiagCode::E0302,
                    file,
                    arg.span,
                    format!("'{}' cannot be its own ancestor", model.display_name(id)),
                );
                continue;
            }
            if model.def(target).kind != kind {
                diags.error(
                    DiagCode::E0305,
                    file,
                    arg.span,
                    format!(
                        "a {} cannot inherit from the {} '{}'",
                        kind.as_str(),
                        model.def(target).kind.as_str(),
                        model.display_name(target)
                    ),
                );
                continue;
            }
            if model.statically_contains(target, id) || model.statically_contains(id, target) {
                diags.error(
                    DiagCode::E0303,
                    file,
                    arg.span,
                    format!(
                        "'{}' and its ancestor '{}' are statically nested",
                        model.display_name(id),
                        model.display_name(target)
                    ),
                );
                continue;
            }

            // Imp-names inherit from the final implementor, not the stub.
            let ancestor = if imp {
                model.final_implementor(target)
            } else {
                target
            };
            if ancestor == id {
                diags.error(
                    DiagCode::E0302,
                    file,
                    arg.span,
                    format!(
                        "'{}' is its own effective ancestor through '{}'",
                        model.display_name(id),
                        model.display_name(target)
                    ),
                );
                continue;
            }
            if !effective.contains(&ancestor) {
                effective.push(ancestor);
            }
        }

        model.def_mut(prop).args = args;
        model.def_mut(id).ancestors_refs = effective;
    }
}

// =============================================================================
// Step 2: acyclicity
// =============================================================================

fn check_acyclic(model: &mut Model, diags: &mut Diagnostics) {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut colors: FxHashMap<DefId, Color> = FxHashMap::default();

    fn visit(
        model: &Model,
        colors: &mut FxHashMap<DefId, Color>,
        id: DefId,
        stack: &mut Vec<DefId>,
    ) -> Option<Vec<DefId>> {
        colors.insert(id, Color::Gray);
        stack.push(id);
        for &next in &model.def(id).ancestors_refs {
            match colors.get(&next).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    let start = stack.iter().position(|&d| d == next).unwrap_or(0);
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(next);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = visit(model, colors, next, stack) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }
        stack.pop();
        colors.insert(id, Color::Black);
        None
    }

    for id in model.ids() {
        if !model.def(id).kind.is_typed() {
            continue;
        }
        if colors.get(&id).copied().unwrap_or(Color::White) != Color::White {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(cycle) = visit(model, &mut colors, id, &mut stack) {
            let names: Vec<String> = cycle.iter().map(|&d| model.display_name(d)).collect();
            let def = model.def(cycle[0]);
            diags.error(
                DiagCode::E0304,
                def.file,
                def.name_span,
                format!("ancestor cycle: {}", names.join(" -> ")),
            );
            return;
        }
    }
}

// =============================================================================
// Step 3: no-impl rule (re-assertion)
// =============================================================================

/// Phase 2 step 2 already rejected imp-ancestored definitions under
/// `implements`; seeing one here means the earlier phases are broken.
fn assert_no_impl_rule(model: &mut Model, diags: &mut Diagnostics) {
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
                    "internal: imp-ancestored '{}' survived to phase 3 with an implementor",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0901, file, span, message);
    }
}

// =============================================================================
// Step 4: ancestor/descendant closures
// =============================================================================

fn build_closures(model: &mut Model, _diags: &mut Diagnostics) {
    let mut memo: FxHashMap<DefId, FxHashSet<DefId>> = FxHashMap::default();

    fn closure(
        model: &Model,
        memo: &mut FxHashMap<DefId, FxHashSet<DefId>>,
        id: DefId,
    ) -> FxHashSet<DefId> {
        if let Some(done) = memo.get(&id) {
            return done.clone();
        }
        let mut all = FxHashSet::default();
        for &ancestor in &model.def(id).ancestors_refs {
            all.insert(ancestor);
            all.extend(closure(model, memo, ancestor));
        }
        memo.insert(id, all.clone());
        all
    }

    for id in model.ids() {
        if !model.def(id).kind.is_typed() {
            continue;
        }
        let all = closure(model, &mut memo, id);
        model.def_mut(id).ancestors_all = all;
    }

    // Inverse relation.
    let mut descendants: FxHashMap<DefId, FxHashSet<DefId>> = FxHashMap::default();
    for id in model.ids() {
        for &ancestor in &model.def(id).ancestors_all {
            descendants.entry(ancestor).or_default().insert(id);
        }
    }
    for id in model.ids() {
        model.def_mut(id).descendants = descendants.remove(&id).unwrap_or_default();
    }
}

// =============================================================================
// Step 5: containment against effective ancestors
// =============================================================================

/// Imp-name dereferencing may have moved an ancestor far away from the
/// written name, so the step-1 check is repeated over the closure.
fn check_containment(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() {
            continue;
        }
        for &ancestor in &def.ancestors_all {
            if model.statically_contains(ancestor, id) || model.statically_contains(id, ancestor) {
                findings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "'{}' and its effective ancestor '{}' are statically nested",
                        model.display_name(id),
                        model.display_name(ancestor)
                    ),
                ));
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0308, file, span, message);
    }
}

// =============================================================================
// Steps 6 and 7: member synthesis and unused deletions
// =============================================================================

fn deleted_names(model: &Model, id: DefId) -> FxHashSet<Name> {
    model
        .def(id)
        .body
        .iter()
        .filter_map(|&child| {
            let child_def = model.def(child);
            (child_def.kind == DefKind::Deletion)
                .then(|| child_def.delete_target.clone())
                .flatten()
        })
        .collect()
}

fn synthesize_members(model: &mut Model, diags: &mut Diagnostics) {
    // Ancestors must be merged before their descendants.
    let mut order: Vec<DefId> = Vec::new();
    let mut visited: FxHashSet<DefId> = FxHashSet::default();

    fn visit(model: &Model, visited: &mut FxHashSet<DefId>, order: &mut Vec<DefId>, id: DefId) {
        if !visited.insert(id) {
            return;
        }
        for &ancestor in &model.def(id).ancestors_refs {
            visit(model, visited, order, ancestor);
        }
        order.push(id);
    }

    for id in model.ids() {
        let kind = model.def(id).kind;
        if kind.is_typed() || kind == DefKind::Schema {
            visit(model, &mut visited, &mut order, id);
        }
    }

    let mut used_all: FxHashMap<DefId, FxHashSet<Name>> = FxHashMap::default();

    for id in order {
        let deleted = deleted_names(model, id);
        let mut used: FxHashSet<Name> = FxHashSet::default();
        let mut members: IndexMap<Name, Member> = IndexMap::new();

        // Ancestor merge: first insertion fixes the position, later
        // overwrites update the value only.
        for ancestor in model.def(id).ancestors_refs.clone() {
            for (name, member) in model.def(ancestor).members.clone() {
                if deleted.contains(&name) {
                    used.insert(name);
                    continue;
                }
                members.insert(name, member);
            }
        }

        // Static children: an overwrite does move the position to the
        // current insertion point, and every value is a final implementor.
        for child in model.def(id).body.clone() {
            let child_def = model.def(child);
            if !child_def.kind.is_typed() {
                continue;
            }
            let name = child_def.name.clone();
            let member = Member {
                def: model.final_implementor(child),
                origin: child,
            };
            members.shift_remove(&name);
            members.insert(name, member);
        }

        used_all.insert(id, used);
        model.def_mut(id).members = members;
    }

    check_deletions(model, diags, &used_all);
}

/// Step 7: a `delete` that never suppressed an inherited member warns;
/// one that names a statically defined member gets a notice instead.
/// Warnings never gate the pipeline, so this runs with step 6.
fn check_deletions(
    model: &Model,
    diags: &mut Diagnostics,
    used_all: &FxHashMap<DefId, FxHashSet<Name>>,
) {
    let mut findings = Vec::new();

    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Deletion {
            continue;
        }
        let Some(target) = &def.delete_target else {
            continue;
        };
        let Some(owner) = def.static_parent else {
            continue;
        };
        if used_all.get(&owner).is_some_and(|used| used.contains(target)) {
            continue;
        }
        // A delete that names something statically visible from here (but
        // not inherited) is suspicious rather than dead.
        let mut visible = false;
        let mut scope = Some(owner);
        while let Some(current) = scope {
            if model
                .def(current)
                .body
                .iter()
                .any(|&child| &model.def(child).name == target)
            {
                visible = true;
                break;
            }
            scope = model.def(current).static_parent;
        }
        findings.push((def.file, def.span, visible, target.clone()));
    }

    for (file, span, visible, target) in findings {
        if visible {
            diags.notice(
                DiagCode::N0307,
                file,
                span,
                format!("'delete {}' names a statically defined member", target),
            );
        } else {
            diags.warning(
                DiagCode::W0306,
                file,
                span,
                format!("'delete {}' does not match any inherited member", target),
            );
        }
    }
}
