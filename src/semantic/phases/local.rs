//! Phase 1: local semantic checks
//!
//! Per-schema checks that need no inheritance information: import sanity,
//! identifier legality, block-level name uniqueness, special-property
//! kinds, modifier consistency, static `implements` binding, and
//! implementation acyclicity.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{Name, Span};
use crate::diag::{DiagCode, Diagnostics};
use crate::parser::keywords;
use crate::syntax::{ClassSet, Modifier, NameClass};

use super::super::binder::{self, BindError};
use super::super::model::{DefId, DefKind, Model, Modifiers, Value};
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(
        model,
        diags,
        &[
            check_imports,
            check_identifiers,
            check_block_uniqueness,
            check_special_properties,
            check_modifiers,
            resolve_implements,
            check_implements_acyclic,
        ],
    )
}

// =============================================================================
// Step 1: self-imports and duplicate imports
// =============================================================================

fn check_imports(model: &mut Model, diags: &mut Diagnostics) {
    for &schema in model.schemas() {
        let file = model.def(schema).file;
        let data = model.schema_data(schema);
        let mut seen: FxHashSet<DefId> = FxHashSet::default();
        let mut findings = Vec::new();
        for import in &data.imports {
            if import.target == schema {
                findings.push((
                    DiagCode::E0101,
                    import.span,
                    format!("schema '{}' imports itself", data.package_name),
                ));
                continue;
            }
            if !seen.insert(import.target) {
                findings.push((
                    DiagCode::E0102,
                    import.span,
                    format!(
                        "schema '{}' is imported more than once",
                        model.schema_data(import.target).package_name
                    ),
                ));
            }
        }
        for (code, span, message) in findings {
            diags.error(code, file, span, message);
        }
    }
}

// =============================================================================
// Step 2: identifier legality
// =============================================================================

fn check_identifiers(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for def in model.iter() {
        // Property names are free-form; reserved words only poison the
        // names of definitions proper.
        if matches!(
            def.kind,
            DefKind::Schema | DefKind::Property | DefKind::Deletion
        ) {
            continue;
        }
        let name = def.name.as_str();
        let complaint = if name.contains('.') {
            Some("must not contain '.'")
        } else if keywords::is_reserved(name) {
            Some("is a reserved word")
        } else if name == keywords::GENERATED_ID {
            Some("is reserved for the generated key column")
        } else {
            None
        };
        if let Some(complaint) = complaint {
            findings.push((
                def.file,
                def.name_span,
                format!("name '{}' {}", def.original_name, complaint),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0103, file, span, message);
    }
}

// =============================================================================
// Step 3: block-level name uniqueness
// =============================================================================

fn check_block_uniqueness(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for block in model.iter() {
        if block.body.is_empty() && block.kind != DefKind::Schema {
            continue;
        }
        let mut seen: IndexMap<Name, Span> = IndexMap::new();

        // Import aliases share the schema block's namespace. The implicit
        // built-in require (empty span) stays out of the user's way.
        if block.kind == DefKind::Schema {
            let data = model.schema_data(block.id);
            for import in &data.imports {
                if import.span == Span::empty() {
                    continue;
                }
                match seen.get(&import.alias) {
                    Some(_) => findings.push((
                        block.file,
                        import.span,
                        format!("alias '{}' is already used in this block", import.alias),
                    )),
                    None => {
                        seen.insert(import.alias.clone(), import.span);
                    }
                }
            }
        }

        for &child in &block.body {
            let child_def = model.def(child);
            let name = match child_def.kind {
                DefKind::Deletion => match &child_def.delete_target {
                    Some(target) => target.clone(),
                    None => continue,
                },
                _ if child_def.name.is_empty() => continue,
                _ => child_def.name.clone(),
            };
            match seen.get(&name) {
                Some(_) => findings.push((
                    child_def.file,
                    child_def.name_span,
                    format!("name '{}' is already used in this block", name),
                )),
                None => {
                    seen.insert(name, child_def.name_span);
                }
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0104, file, span, message);
    }
}

// =============================================================================
// Step 4: special-property kinds
// =============================================================================

fn check_special_properties(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for def in model.iter() {
        if matches!(def.kind, DefKind::Property | DefKind::Schema | DefKind::Deletion) {
            continue;
        }
        if keywords::is_special_property(def.name.as_str()) {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "'{}' names a special property and cannot name a {}",
                    def.original_name,
                    def.kind.as_str()
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0105, file, span, message);
    }
}

// =============================================================================
// Step 5: modifier consistency
// =============================================================================

fn check_modifiers(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.written_modifiers.is_empty() {
            continue;
        }
        let mut modifiers = Modifiers::default();
        for (modifier, span) in &def.written_modifiers {
            let slot = match modifier {
                Modifier::Abstract => &mut modifiers.is_abstract,
                Modifier::Final => &mut modifiers.is_final,
                Modifier::Required => &mut modifiers.is_required,
            };
            if *slot {
                findings.push((
                    def.file,
                    *span,
                    DiagCode::E0112,
                    format!("modifier '{}' is listed twice", modifier.as_str()),
                ));
            }
            *slot = true;
        }
        if modifiers.is_abstract && modifiers.is_final {
            findings.push((
                def.file,
                def.name_span,
                DiagCode::E0106,
                format!(
                    "'{}' cannot be both abstract and final",
                    def.original_name
                ),
            ));
        }
        model.def_mut(id).modifiers = modifiers;
    }
    for (file, span, code, message) in findings {
        diags.error(code, file, span, message);
    }
}

// =============================================================================
// Step 6: static `implements` binding
// =============================================================================

const IMPLEMENTS_CLASSES: ClassSet = ClassSet::of(&[NameClass::Fieldset, NameClass::Field]);

fn resolve_implements(model: &mut Model, diags: &mut Diagnostics) {
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() {
            continue;
        }
        let Some(prop) = def.implements_property() else {
            continue;
        };
        let file = def.file;
        let kind = def.kind;
        let mut args = model.def(prop).args.clone();
        let mut refs: Vec<DefId> = Vec::new();

        for arg in &mut args {
            let bound: Vec<DefId> = match &arg.value {
                // `all` expands to the ancestor list; unresolvable
                // ancestors are left for phase 3 to report.
                Value::All => expand_all(model, id),
                Value::Name(name) => {
                    let imp = name.imp;
                    match binder::bind_static(model, id, name, IMPLEMENTS_CLASSES, None) {
                        Ok(target) => {
                            arg.value = Value::Def { def: target, imp };
                            vec![target]
                        }
                        Err(err) => {
                            report_bind_error(diags, file, arg.span, kind, err);
                            continue;
                        }
                    }
                }
                Value::Def { def, .. } => vec![*def],
                other => {
                    diags.error(
                        DiagCode::E0107,
                        file,
                        arg.span,
                        format!("implements argument must be a name, not {}", other.kind_name()),
                    );
                    continue;
                }
            };

            for target in bound {
                if target == id {
                    diags.error(
                        DiagCode::E0108,
                        file,
                        arg.span,
                        format!("'{}' implements itself", model.def(id).original_name),
                    );
                    continue;
                }
                if model.def(target).kind != kind {
                    diags.error(
                        DiagCode::E0113,
                        file,
                        arg.span,
                        format!(
                            "a {} cannot implement the {} '{}'",
                            kind.as_str(),
                            model.def(target).kind.as_str(),
                            model.display_name(target)
                        ),
                    );
                    continue;
                }
                if model.statically_contains(target, id) {
                    diags.error(
                        DiagCode::E0109,
                        file,
                        arg.span,
                        format!(
                            "specification '{}' statically contains its implementation",
                            model.display_name(target)
                        ),
                    );
                    continue;
                }
                if model.statically_contains(id, target) {
                    diags.error(
                        DiagCode::E0110,
                        file,
                        arg.span,
                        format!(
                            "implementation '{}' statically contains its specification",
                            model.display_name(id)
                        ),
                    );
                    continue;
                }
                if !refs.contains(&target) {
                    refs.push(target);
                }
            }
        }

        model.def_mut(prop).args = args;
        model.def_mut(id).implements_refs = refs;
    }
}

/// Statically bind the owner's written ancestor list for `implements all`.
/// Imp-name prefixes are ignored here: `all` expands to the specification
/// as written, and phase 2 rejects imp-ancestored definitions appearing
/// under `implements` anyway.
fn expand_all(model: &Model, owner: DefId) -> Vec<DefId> {
    let Some(prop) = model.def(owner).ancestors_property() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for arg in &model.def(prop).args {
        let target = match &arg.value {
            Value::Name(name) => {
                binder::bind_static(model, owner, name, IMPLEMENTS_CLASSES, Some(owner)).ok()
            }
            Value::Def { def, .. } => Some(*def),
            _ => None,
        };
        if let Some(target) = target {
            if !out.contains(&target) {
                out.push(target);
            }
        }
    }
    out
}

fn report_bind_error(
    diags: &mut Diagnostics,
    file: crate::base::FileId,
    span: Span,
    kind: DefKind,
    err: BindError,
) {
    match err {
        BindError::Unresolved { name } => diags.error(
            DiagCode::E0107,
            file,
            span,
            format!("cannot resolve implements target '{}'", name),
        ),
        BindError::WrongClass { name, found } => diags.error(
            DiagCode::E0113,
            file,
            span,
            format!(
                "a {} cannot implement '{}', which is a {}",
                kind.as_str(),
                name,
                found.as_str()
            ),
        ),
    }
}

// =============================================================================
// Step 7: implementation acyclicity
// =============================================================================

fn check_implements_acyclic(model: &mut Model, diags: &mut Diagnostics) {
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
        for &next in &model.def(id).implements_refs {
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
            let head = cycle[0];
            let def = model.def(head);
            // Only the first cycle is reported.
            diags.error(
                DiagCode::E0111,
                def.file,
                def.name_span,
                format!("implementation cycle: {}", names.join(" -> ")),
            );
            return;
        }
    }
}
