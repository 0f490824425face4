//! # yasdl-base
//!
//! Core library for YASDL parsing, AST, and multi-phase semantic analysis.
//!
//! YASDL is a declarative schema language describing relational database
//! structures with object-oriented reuse: multiple inheritance, implementation
//! trees, stubs, and parametric final-implementation references. This crate
//! turns one or more top-level schema documents into an annotated model that
//! downstream DDL generators consume.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! semantic  → definition arena, binders, analysis phases 1-7, pipeline
//!   ↓
//! project   → loader (phase 0), fetchers, search path, built-in package
//!   ↓
//! syntax    → AST types, dotted names, property arguments
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! diag      → severities, stable codes, diagnostic collection
//!   ↓
//! base      → Primitives (FileId, Name, Position, Span)
//! ```

/// Foundation types: FileId, Name, Position, Span
pub mod base;

/// Diagnostics: severities, stable codes, sinks, exit classification
pub mod diag;

/// Parser: Logos lexer, recursive-descent parser, reserved words
pub mod parser;

/// Syntax: AST types produced by the parser
pub mod syntax;

/// Project management: schema loading, fetchers, search paths
pub mod project;

/// Semantic analysis: definition model, binders, phases 1-7
pub mod semantic;

// Re-export commonly needed items
pub use parser::keywords;

// Re-export foundation types
pub use base::{FileId, Name, Position, Span};

pub use diag::{DiagCode, Diagnostic, Diagnostics, Severity};
pub use project::{Fetcher, FileFetcher, MemoryFetcher, Origin, SearchPath};
pub use semantic::{Compilation, Compiler, CompilerOptions};
