//! Phase 6: requirement checker
//!
//! Every `required` member of every specification of a realized final
//! implementation must survive into the final implementation — present
//! under the same name and realized. The usual way to break this is to
//! hide a required member behind a later ancestor or a `delete`.

use crate::diag::{DiagCode, Diagnostics};

use super::super::model::Model;
use super::run_steps;

pub fn run(model: &mut Model, diags: &mut Diagnostics) -> bool {
    run_steps(model, diags, &[check_required_members])
}

fn check_required_members(model: &mut Model, diags: &mut Diagnostics) {
    let mut findings = Vec::new();
    for id in model.ids() {
        let def = model.def(id);
        if !def.kind.is_typed() || !def.realized || model.final_implementor(id) != id {
            continue;
        }

        for &spec in &def.specifications {
            for (name, member) in &model.def(spec).members {
                if !model.def(member.origin).modifiers.is_required {
                    continue;
                }
                let satisfied = def
                    .members
                    .get(name)
                    .is_some_and(|m| model.def(m.def).realized);
                if !satisfied {
                    findings.push((
                        def.file,
                        def.name_span,
                        format!(
                            "'{}' requires member '{}', which is not realized in '{}'",
                            model.display_name(spec),
                            model.display_name(member.origin),
                            model.display_name(id)
                        ),
                    ));
                }
            }
        }
    }
    for (file, span, message) in findings {
        diags.error(DiagCode::E0601, file, span, message);
    }
}
