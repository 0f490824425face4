//! Lexer and parser for YASDL
//!
//! - **logos** for fast tokenization (nothing skipped, so line/column
//!   tracking is exact)
//! - a hand-written recursive-descent parser producing [`SchemaDoc`]s
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → SchemaDoc (AST with spans) + batched SyntaxErrors
//!     ↓
//! Semantic model → annotated definitions
//! ```
//!
//! The parser accepts reserved words in name position on purpose: the
//! local semantic checker rejects them with a dedicated diagnostic, which
//! is more useful than a parse error.

pub mod keywords;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, SyntaxError, parse_schema};
