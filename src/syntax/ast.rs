//! Statement-level AST
//!
//! One [`SchemaDoc`] per source file. Blocks hold ordered [`Stmt`] lists;
//! the `:` ancestor list and the `->` reference arrow are kept as written
//! and normalized into `ancestors`/`references` properties when the
//! semantic model is populated.

use smol_str::SmolStr;

use crate::base::{FileId, Name, Span};

use super::dotted::DottedName;

/// A parsed schema document.
#[derive(Debug, Clone)]
pub struct SchemaDoc {
    pub file: FileId,
    /// Declared package name segments, lowercased
    pub package: Vec<Name>,
    /// Verbatim package name as written
    pub package_original: SmolStr,
    pub package_span: Span,
    /// Statements of the schema block, in source order
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl SchemaDoc {
    /// Dot-joined canonical package name.
    pub fn package_name(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.package.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(seg.as_str());
        }
        out
    }
}

/// A statement inside a `{}` block.
#[derive(Debug, Clone)]
pub enum Stmt {
    Import(ImportStmt),
    Def(DefStmt),
    Property(PropertyStmt),
    Delete(DeleteStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Import(s) => s.span,
            Stmt::Def(s) => s.span,
            Stmt::Property(s) => s.span,
            Stmt::Delete(s) => s.span,
        }
    }
}

/// `use` / `require` import kinds. Only `require` propagates realization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Use,
    Require,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Use => "use",
            Self::Require => "require",
        }
    }
}

/// Import target: a dotted package path or a remote URI string.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    Dotted(Vec<Name>),
    Uri(String),
}

/// `use a.b.c as x;` / `require "https://…" as y;`
#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub kind: ImportKind,
    pub target: ImportTarget,
    pub alias: Option<Name>,
    pub span: Span,
}

/// Definition modifiers. `abstract` and `final` are mutually exclusive,
/// which phase 1 enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Abstract,
    Final,
    Required,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abstract => "abstract",
            Self::Final => "final",
            Self::Required => "required",
        }
    }
}

/// Kinds of named definitions a block can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstDefKind {
    Fieldset,
    Field,
    Index,
    Constraint,
}

impl AstDefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fieldset => "fieldset",
            Self::Field => "field",
            Self::Index => "index",
            Self::Constraint => "constraint",
        }
    }
}

/// `[modifiers] kind name [: ancestors] [-> target] ({ body } | ;)`
#[derive(Debug, Clone)]
pub struct DefStmt {
    pub kind: AstDefKind,
    pub modifiers: Vec<(Modifier, Span)>,
    pub name: Name,
    pub original_name: SmolStr,
    pub name_span: Span,
    /// Ancestor list written after `:`
    pub ancestors: Vec<DottedName>,
    /// Reference target written after `->`
    pub reference: Option<DottedName>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `name arg, arg…;` — any statement headed by a plain name.
#[derive(Debug, Clone)]
pub struct PropertyStmt {
    pub name: Name,
    pub original_name: SmolStr,
    pub args: Vec<Arg>,
    pub span: Span,
}

/// `delete name;` — suppresses an inherited member.
#[derive(Debug, Clone)]
pub struct DeleteStmt {
    pub target: Name,
    pub target_original: SmolStr,
    pub span: Span,
}

/// A property argument with its source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub value: ArgValue,
    pub span: Span,
}

/// Heterogeneous property argument values.
///
/// Name binding (phases 1, 3, 4) narrows `Name` arguments to bound
/// definitions in the semantic model; the AST always keeps the written form.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    All,
    Name(DottedName),
}

impl ArgValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::None => "none",
            Self::All => "all",
            Self::Name(_) => "name",
        }
    }
}
