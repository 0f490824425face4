//! # Semantic Analysis
//!
//! Transforms parsed schema documents into an annotated model: the flat
//! definition arena, the static and dynamic binders, and analysis phases
//! 1-7 (local checks, implementation trees, inheritance and member
//! synthesis, full binding, realization, requirement and global checks).

pub mod binder;
pub mod model;
pub mod phases;
mod pipeline;
mod populate;
mod result;

pub use binder::{BindError, bind_dynamic, bind_static};
pub use model::{
    Arg, DefId, DefKind, Definition, Member, MemberPath, Model, Modifiers, SchemaData,
    SchemaImport, Value,
};
pub use pipeline::{Compiler, CompilerOptions, run_phases};
pub use populate::populate;
pub use result::{Compilation, TypeKind, TypeRegistry};
