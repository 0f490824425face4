//! Phase 4: full name binder
//!
//! Binds every remaining dotted name in property arguments (everything
//! except `ancestors` and `implements`) through the dynamic binder, then
//! validates the shape of `references`, `index`, and `constraint`
//! arguments. Binding results are member paths: the same definition can
//! sit at several member positions, and code generation needs to know
//! which one was meant.

use crate::base::FileId;
use crate::base::Span;
use crate::diag::{DiagCode, Diagnostics};
use crate::syntax::{ClassSet, DottedName, NameClass};

use super::super::binder::{self, BindError};
use super::super::model::{DefId, DefKind, Model, Value};
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(
        model,
        diags,
        &[
            bind_property_args,
            check_references,
            check_indexes,
            check_constraints,
        ],
    )
}

const GENERIC_CLASSES: ClassSet = ClassSet::of(&[
    NameClass::Fieldset,
    NameClass::Field,
    NameClass::Index,
]);

// =============================================================================
// Step 1: dynamic binding of property arguments
// =============================================================================

struct BindContext {
    site: DefId,
    recursive: bool,
}

/// Where a property argument resolves from. `fields` on an index binds
/// inside the enclosing fieldset without acquisition; everything else
/// binds at the property's owner.
fn bind_context(model: &Model, owner: DefId, property: &str) -> BindContext {
    let recursive = model.recursive_lookup;
    match property {
        "fields" if model.def(owner).kind == DefKind::Index => BindContext {
            site: model.def(owner).static_parent.unwrap_or(owner),
            recursive: false,
        },
        "cluster" => BindContext {
            site: owner,
            recursive: false,
        },
        _ => BindContext {
            site: owner,
            recursive,
        },
    }
}

fn bind_property_args(model: &mut Model, diags: &mut Diagnostics) {
    for prop_id in model.ids() {
        let prop = model.def(prop_id);
        if prop.kind != DefKind::Property {
            continue;
        }
        let name = prop.name.clone();
        if matches!(name.as_str(), "ancestors" | "implements") {
            continue;
        }
        let Some(owner) = prop.static_parent else {
            continue;
        };
        let file = prop.file;
        let context = bind_context(model, owner, name.as_str());
        let mut args = model.def(prop_id).args.clone();

        for arg in &mut args {
            let Value::Name(dotted) = &arg.value else {
                continue;
            };
            // `references any` is the universal-reference marker, not a name.
            if name.as_str() == "references" && is_any(dotted) {
                arg.value = Value::Universal;
                continue;
            }
            if name.as_str() == "fields" && dotted.absolute {
                diags.error(
                    DiagCode::E0405,
                    file,
                    arg.span,
                    "index fields must be written relative to the enclosing fieldset",
                );
                continue;
            }
            match binder::bind_dynamic(model, context.site, dotted, GENERIC_CLASSES, context.recursive)
            {
                Ok(path) => arg.value = Value::Path(path),
                Err(err) => report_bind_error(diags, file, arg.span, &name, err),
            }
        }

        model.def_mut(prop_id).args = args;
    }
}

fn is_any(name: &DottedName) -> bool {
    name.is_simple() && name.head().as_str() == "any"
}

fn report_bind_error(
    diags: &mut Diagnostics,
    file: FileId,
    span: Span,
    property: &crate::base::Name,
    err: BindError,
) {
    let code = match (property.as_str(), &err) {
        ("references", BindError::WrongClass { .. }) => DiagCode::E0402,
        ("fields", _) => DiagCode::E0405,
        _ => DiagCode::E0401,
    };
    diags.error(code, file, span, format!("{} in '{}'", err.message(), property));
}

// =============================================================================
// Step 2: `references` shape
// =============================================================================

fn check_references(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for prop_id in model.ids() {
        let prop = model.def(prop_id);
        if prop.kind != DefKind::Property || prop.name.as_str() != "references" {
            continue;
        }
        let Some(owner) = prop.static_parent else {
            continue;
        };
        let file = prop.file;

        if model.def(owner).kind != DefKind::Field {
            findings.push((
                file,
                prop.span,
                DiagCode::E0402,
                format!(
                    "'references' applies to fields, not to a {}",
                    model.def(owner).kind.as_str()
                ),
            ));
            continue;
        }
        if prop.args.len() > 1 {
            findings.push((
                file,
                prop.span,
                DiagCode::E0402,
                "'references' takes at most one argument".to_string(),
            ));
            continue;
        }
        let Some(arg) = prop.args.first() else {
            // A bare `references;` is a universal reference.
            continue;
        };
        let target = match &arg.value {
            Value::Universal => continue,
            Value::Path(path) => path.target(),
            Value::Name(_) => continue, // binding already failed and reported
            other => {
                findings.push((
                    file,
                    arg.span,
                    DiagCode::E0402,
                    format!("'references' argument must be a fieldset, not {}", other.kind_name()),
                ));
                continue;
            }
        };
        if model.def(target).kind != DefKind::Fieldset {
            findings.push((
                file,
                arg.span,
                DiagCode::E0402,
                format!(
                    "'{}' is a {}, not a fieldset",
                    model.display_name(target),
                    model.def(target).kind.as_str()
                ),
            ));
            continue;
        }
        // The enclosing fieldset cannot be the target.
        if let Some(enclosing) = model.enclosing_fieldset(owner) {
            if target == enclosing || target == model.final_implementor(enclosing) {
                findings.push((
                    file,
                    arg.span,
                    DiagCode::E0403,
                    format!(
                        "field '{}' references its enclosing fieldset",
                        model.display_name(owner)
                    ),
                ));
            }
        }
    }
    for (file, span, code, message) in findings {
        diags.error(code, file, span, message);
    }
}

// =============================================================================
// Step 3: index shape
// =============================================================================

fn check_indexes(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Index {
            continue;
        }
        let file = def.file;
        let Some(fields_prop) = def.properties.get("fields").copied() else {
            findings.push((
                file,
                def.name_span,
                DiagCode::E0404,
                format!("index '{}' has no 'fields' property", def.original_name),
            ));
            continue;
        };
        let fields = model.def(fields_prop);
        if fields.args.is_empty() {
            findings.push((
                file,
                fields.span,
                DiagCode::E0404,
                format!("index '{}' lists no fields", def.original_name),
            ));
            continue;
        }
        let mut seen: Vec<DefId> = Vec::new();
        for arg in &fields.args {
            let target = match &arg.value {
                Value::Path(path) => path.target(),
                Value::Name(_) => continue, // binding already failed and reported
                other => {
                    findings.push((
                        file,
                        arg.span,
                        DiagCode::E0404,
                        format!("index fields must be names, not {}", other.kind_name()),
                    ));
                    continue;
                }
            };
            if !model.def(target).kind.is_typed() {
                findings.push((
                    file,
                    arg.span,
                    DiagCode::E0405,
                    format!(
                        "'{}' is a {}, not a field or fieldset",
                        model.display_name(target),
                        model.def(target).kind.as_str()
                    ),
                ));
                continue;
            }
            if seen.contains(&target) {
                findings.push((
                    file,
                    arg.span,
                    DiagCode::E0406,
                    format!(
                        "'{}' is listed twice in index '{}'",
                        model.display_name(target),
                        def.original_name
                    ),
                ));
                continue;
            }
            seen.push(target);
        }
    }
    for (file, span, code, message) in findings {
        diags.error(code, file, span, message);
    }
}

// =============================================================================
// Step 4: constraint shape
// =============================================================================

fn check_constraints(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Constraint {
            continue;
        }
        let file = def.file;
        let Some(check_prop) = def.properties.get("check").copied() else {
            findings.push((
                file,
                def.name_span,
                format!("constraint '{}' has no 'check' property", def.original_name),
            ));
            continue;
        };
        let check = model.def(check_prop);
        if check.args.is_empty() {
            findings.push((
                file,
                check.span,
                format!("constraint '{}' has an empty 'check'", def.original_name),
            ));
            continue;
        }
        for arg in &check.args {
            let ok = match &arg.value {
                Value::Str(_) => true,
                Value::Path(path) => model.def(path.target()).kind == DefKind::Field,
                Value::Name(_) => true, // binding already failed and reported
                _ => false,
            };
            if !ok {
                findings.push((
                    file,
                    arg.span,
                    format!(
                        "'check' arguments must be strings or fields, not {}",
                        arg.value.kind_name()
                    ),
                ));
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0407, file, span, message);
    }
}
