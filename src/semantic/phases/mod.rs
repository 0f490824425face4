//! Analysis phases 1-7
//!
//! Each phase is a sequence of steps over the shared model. A step reports
//! every violation it finds; one or more errors after a step stops the
//! phase (and the pipeline). Warnings and notices never stop anything.

pub mod bind;
pub mod global;
pub mod impl_tree;
pub mod inherit;
pub mod local;
pub mod realize;
pub mod require;

use crate::diag::Diagnostics;

use super::model::Model;

type Step = fn(&mut Model, &mut Diagnostics);

/// Run steps in order; stop after the first step that added errors.
/// Returns `true` when every step ran clean.
fn run_steps(model: &mut Model, diags: &mut Diagnostics, steps: &[Step]) -> bool {
    for step in steps {
        let before = diags.error_count();
        step(model, diags);
        if diags.error_count() > before {
            return false;
        }
    }
    true
}
