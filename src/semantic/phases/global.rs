//! Phase 7: global checks
//!
//! The non-tree-shaped checks: property argument shapes and contexts,
//! type resolution and defaulting, GUID uniqueness, language tags,
//! cluster/index consistency, and the foreign-key index notice. Unless a
//! check says otherwise it applies to realized definitions only.

use rustc_hash::FxHashMap;

use crate::base::constants::{DEFAULT_LANGUAGE, IDENTIFIER_TYPE};
use crate::diag::{DiagCode, Diagnostics};

use super::super::model::{DefId, DefKind, Model, Value};
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(
        model,
        diags,
        &[
            check_fieldsets_nonempty,
            check_outermost_required_fields,
            check_embedded_specifications,
            check_types,
            check_sizes,
            check_booleans,
            check_guids,
            check_delete_actions,
            check_languages,
            check_clusters,
            check_reqlevels,
            check_index_realization,
            check_reference_indexes,
        ],
    )
}

/// Indexes live and die with their enclosing fieldset.
fn index_is_live(model: &Model, index: DefId) -> bool {
    model
        .def(index)
        .static_parent
        .is_some_and(|parent| model.def(parent).realized)
}

// =============================================================================
// Check 1: realized fieldsets contain at least one realized field
// =============================================================================

fn check_fieldsets_nonempty(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Fieldset || !def.realized {
            continue;
        }
        let has_field = def
            .members
            .values()
            .any(|m| model.def(m.def).kind == DefKind::Field && model.def(m.def).realized);
        if !has_field {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "realized fieldset '{}' contains no realized field",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0701, file, span, message);
    }
}

// =============================================================================
// Check 2: `required` on outermost fields (warning)
// =============================================================================

fn check_outermost_required_fields(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind == DefKind::Field && def.modifiers.is_required && model.is_outermost(id) {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "'required' has no effect on the outermost field '{}'",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.warning(DiagCode::W0702, file, span, message);
    }
}

// =============================================================================
// Check 3: toplevel fieldsets with embedded specifications (notice)
// =============================================================================

fn check_embedded_specifications(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Fieldset || !def.toplevel {
            continue;
        }
        for &spec in &def.specifications {
            if spec != id && !model.is_outermost(spec) {
                findings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "toplevel fieldset '{}' has the embedded specification '{}'; instances may be copied",
                        model.display_name(id),
                        model.display_name(spec)
                    ),
                ));
            }
        }
    }
    for (file, span, message) in findings {
        diags.notice(DiagCode::N0703, file, span, message);
    }
}

// =============================================================================
// Check 4: `type`
// =============================================================================

fn check_types(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    let mut resolved: Vec<(DefId, String)> = Vec::new();

    // Argument shape first, wherever a realized definition carries `type`.
    for id in model.ids() {
        let def = model.def(id);
        if !def.realized {
            continue;
        }
        if let Some(prop) = model.own_property(id, "type") {
            let well_formed = matches!(prop.args.as_slice(), [arg] if arg.value.as_str().is_some());
            if !well_formed {
                findings.push((
                    prop.file,
                    prop.span,
                    "'type' takes a single string argument".to_string(),
                ));
            }
        }
    }

    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Field || !def.realized {
            continue;
        }
        let written = model.effective_str(id, "type").map(str::to_owned);

        if model.is_universal_reference(id) {
            if written.is_some() {
                findings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "universal reference '{}' must not declare a type",
                        model.display_name(id)
                    ),
                ));
            }
            continue;
        }
        if model.reference_target(id).is_some() {
            match written.as_deref() {
                None | Some(IDENTIFIER_TYPE) => {
                    resolved.push((id, IDENTIFIER_TYPE.to_string()));
                }
                Some(other) => {
                    findings.push((
                        def.file,
                        def.name_span,
                        format!(
                            "reference field '{}' must have type \"{}\", not \"{}\"",
                            model.display_name(id),
                            IDENTIFIER_TYPE,
                            other
                        ),
                    ));
                }
            }
            continue;
        }
        match written {
            Some(value) => resolved.push((id, value)),
            None => findings.push((
                def.file,
                def.name_span,
                format!("realized field '{}' has no type", model.display_name(id)),
            )),
        }
    }

    for (id, value) in resolved {
        model.def_mut(id).resolved_type = Some(value);
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0704, file, span, message);
    }
}

// =============================================================================
// Check 5: `size` and `precision`
// =============================================================================

fn check_sizes(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.realized {
            continue;
        }
        for property in ["size", "precision"] {
            if let Some(prop) = model.own_property(id, property) {
                let well_formed =
                    matches!(prop.args.as_slice(), [arg] if arg.value.as_int().is_some());
                if !well_formed {
                    findings.push((
                        prop.file,
                        prop.span,
                        format!("'{}' takes a single integer argument", property),
                    ));
                }
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0705, file, span, message);
    }
}

// =============================================================================
// Check 6: boolean properties and their contexts
// =============================================================================

fn check_booleans(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        let live = def.realized || (def.kind == DefKind::Index && index_is_live(model, id));
        if !live {
            continue;
        }
        for (property, allowed) in [
            ("notnull", DefKind::Field),
            ("unique", DefKind::Index),
            ("immutable", DefKind::Index),
        ] {
            let Some(prop) = model.own_property(id, property) else {
                continue;
            };
            if def.kind != allowed {
                findings.push((
                    prop.file,
                    prop.span,
                    format!(
                        "'{}' is restricted to {} context, not {}",
                        property,
                        allowed.as_str(),
                        def.kind.as_str()
                    ),
                ));
                continue;
            }
            let well_formed =
                matches!(prop.args.as_slice(), [arg] if arg.value.as_bool().is_some());
            if !well_formed {
                findings.push((
                    prop.file,
                    prop.span,
                    format!("'{}' takes a single boolean argument", property),
                ));
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0706, file, span, message);
    }
}

// =============================================================================
// Check 7: GUIDs
// =============================================================================

fn check_guids(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    let mut seen: FxHashMap<String, DefId> = FxHashMap::default();

    for id in model.ids() {
        let def = model.def(id);
        let Some(prop) = model.own_property(id, "guid") else {
            // Mandatory on schemas and on self-realized toplevel fieldsets.
            let mandatory = def.kind == DefKind::Schema
                || (def.toplevel && model.final_implementor(id) == id);
            if mandatory {
                findings.push((
                    def.file,
                    def.name_span,
                    format!("'{}' has no guid", model.display_name(id)),
                ));
            }
            continue;
        };
        let value = match prop.args.as_slice() {
            [arg] => arg.value.as_str(),
            _ => None,
        };
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            findings.push((
                prop.file,
                prop.span,
                "'guid' takes a single non-empty string".to_string(),
            ));
            continue;
        };
        match seen.get(value) {
            Some(&first) => findings.push((
                prop.file,
                prop.span,
                format!(
                    "guid \"{}\" is already used by '{}'",
                    value,
                    model.display_name(first)
                ),
            )),
            None => {
                seen.insert(value.to_string(), id);
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0707, file, span, message);
    }
}

// =============================================================================
// Check 8: `ondelete` / `onupdate`
// =============================================================================

const DELETE_ACTIONS: &[&str] = &["cascade", "setnull", "noaction"];

fn check_delete_actions(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.realized {
            continue;
        }
        for property in ["ondelete", "onupdate"] {
            let Some(prop) = model.own_property(id, property) else {
                continue;
            };
            if def.kind != DefKind::Fieldset {
                findings.push((
                    prop.file,
                    prop.span,
                    format!("'{}' applies to fieldsets only", property),
                ));
                continue;
            }
            let value = match prop.args.as_slice() {
                [arg] => arg.value.as_str(),
                _ => None,
            };
            match value {
                Some(v) if DELETE_ACTIONS.contains(&v) => {}
                _ => findings.push((
                    prop.file,
                    prop.span,
                    format!(
                        "'{}' must be one of \"cascade\", \"setnull\", \"noaction\"",
                        property
                    ),
                )),
            }
        }
    }

    // `setnull` cannot serve a reference that forbids null.
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Field || !def.realized {
            continue;
        }
        if model.effective_bool(id, "notnull") != Some(true) {
            continue;
        }
        if let Some(target) = model.reference_target(id) {
            if model.effective_str(target, "ondelete") == Some("setnull") {
                findings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "'{}' is notnull but its referenced fieldset deletes with \"setnull\"",
                        model.display_name(id)
                    ),
                ));
            }
        }
    }

    for (file, span, message) in findings {
        diags.error(DiagCode::E0708, file, span, message);
    }
}

// =============================================================================
// Check 9: `language`
// =============================================================================

fn check_languages(model: &mut Model, diags: &mut Diagnostics) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind == DefKind::Schema {
            match model.own_property(id, "language") {
                Some(prop) => {
                    let well_formed =
                        matches!(prop.args.as_slice(), [arg] if arg.value.as_str().is_some());
                    if !well_formed {
                        errors.push((
                            prop.file,
                            prop.span,
                            "'language' takes a single language tag".to_string(),
                        ));
                    }
                }
                None => warnings.push((
                    def.file,
                    def.name_span,
                    format!(
                        "schema '{}' has no language; assuming \"{}\"",
                        model.display_name(id),
                        DEFAULT_LANGUAGE
                    ),
                )),
            }
        } else if let Some(prop) = model.own_property(id, "language") {
            errors.push((
                prop.file,
                prop.span,
                "'language' applies to schemas only".to_string(),
            ));
        }
    }
    for (file, span, message) in errors {
        diags.error(DiagCode::E0710, file, span, message);
    }
    for (file, span, message) in warnings {
        diags.warning(DiagCode::W0709, file, span, message);
    }
}

// =============================================================================
// Check 10: `cluster`
// =============================================================================

fn check_clusters(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        let Some(prop) = model.own_property(id, "cluster") else {
            continue;
        };
        if !def.realized {
            continue;
        }
        if def.kind != DefKind::Fieldset {
            findings.push((
                prop.file,
                prop.span,
                "'cluster' applies to fieldsets only".to_string(),
            ));
            continue;
        }
        match prop.args.as_slice() {
            [] => {}
            [arg] => {
                let target = match &arg.value {
                    Value::Path(path) => Some(path.target()),
                    _ => None,
                };
                let same_level = target.is_some_and(|t| {
                    model.def(t).kind == DefKind::Index && model.def(t).static_parent == Some(id)
                });
                if !same_level {
                    findings.push((
                        prop.file,
                        arg.span,
                        format!(
                            "'cluster' must name an index defined in '{}'",
                            model.display_name(id)
                        ),
                    ));
                }
            }
            _ => findings.push((
                prop.file,
                prop.span,
                "'cluster' takes at most one argument".to_string(),
            )),
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0711, file, span, message);
    }
}

// =============================================================================
// Check 11: `reqlevel`
// =============================================================================

// "mandatory" is accepted as a legacy synonym of "required".
const REQLEVELS: &[&str] = &["optional", "desired", "required", "mandatory"];

fn check_reqlevels(model: &mut Model, diags: &mut Diagnostics) {
    let mut errors = Vec::new();
    let mut notices = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.realized {
            continue;
        }
        let Some(prop) = model.own_property(id, "reqlevel") else {
            continue;
        };
        let value = match prop.args.as_slice() {
            [arg] => arg.value.as_str(),
            _ => None,
        };
        match value {
            Some(v) if REQLEVELS.contains(&v) => {
                if matches!(v, "required" | "mandatory")
                    && model.effective_bool(id, "notnull") != Some(true)
                {
                    notices.push((
                        prop.file,
                        prop.span,
                        format!(
                            "'{}' is {} but not notnull",
                            model.display_name(id),
                            v
                        ),
                    ));
                }
            }
            _ => errors.push((
                prop.file,
                prop.span,
                "'reqlevel' must be \"optional\", \"desired\", or \"required\"".to_string(),
            )),
        }
    }
    for (file, span, message) in errors {
        diags.error(DiagCode::E0712, file, span, message);
    }
    for (file, span, message) in notices {
        diags.notice(DiagCode::N0713, file, span, message);
    }
}

// =============================================================================
// Check 12: indexes of realized final fieldsets
// =============================================================================

fn check_index_realization(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Fieldset || !def.realized || model.final_implementor(id) != id {
            continue;
        }
        for &child in &def.body {
            if model.def(child).kind != DefKind::Index {
                continue;
            }
            let Some(fields_prop) = model.def(child).properties.get("fields").copied() else {
                continue;
            };
            for arg in &model.def(fields_prop).args {
                let Value::Path(path) = &arg.value else {
                    continue;
                };
                let target = path.target();
                if !model.def(target).realized {
                    findings.push((
                        model.def(child).file,
                        arg.span,
                        format!(
                            "index '{}' uses '{}', which is not realized",
                            model.def(child).original_name,
                            model.display_name(target)
                        ),
                    ));
                }
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0714, file, span, message);
    }
}

// =============================================================================
// Check 13: foreign keys without a covering index (notice)
// =============================================================================

fn check_reference_indexes(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if def.kind != DefKind::Field || !def.realized {
            continue;
        }
        if model.reference_target(id).is_none() {
            continue;
        }
        if model.effective_bool(id, "need_index") == Some(false) {
            continue;
        }
        let Some(enclosing) = model.enclosing_fieldset(id) else {
            continue;
        };
        let fieldset = model.final_implementor(enclosing);
        let covered = model.def(fieldset).body.iter().any(|&child| {
            if model.def(child).kind != DefKind::Index {
                return false;
            }
            let Some(fields_prop) = model.def(child).properties.get("fields").copied() else {
                return false;
            };
            model
                .def(fields_prop)
                .args
                .first()
                .and_then(|arg| arg.value.target())
                .is_some_and(|t| t == id || t == model.final_implementor(id))
        });
        if !covered {
            findings.push((
                def.file,
                def.name_span,
                format!(
                    "reference field '{}' has no covering index; add one or set 'need_index false'",
                    model.display_name(id)
                ),
            ));
        }
    }
    for (file, span, message) in findings {
        diags.notice(DiagCode::N0715, file, span, message);
    }
}
