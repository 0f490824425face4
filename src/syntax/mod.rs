//! AST types for YASDL schema documents.
//!
//! The parser produces one [`SchemaDoc`] per source file. Statements keep
//! their source order and spans; names are stored lowercase with the
//! verbatim source text kept alongside for diagnostics.

mod ast;
mod dotted;

pub use ast::{
    Arg, ArgValue, AstDefKind, DefStmt, DeleteStmt, ImportKind, ImportStmt, ImportTarget,
    Modifier, PropertyStmt, SchemaDoc, Stmt,
};
pub use dotted::{ClassSet, DottedName, NameClass, SortDir};
