//! Foundation types for the YASDL toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`FileId`] - Interned source identifiers
//! - [`Position`], [`Span`] - Line/column positions for AST nodes
//! - [`Name`] - Lowercase-normalized identifiers
//! - Domain constants (file extension, built-in package name)
//!
//! This module has NO dependencies on other yasdl modules.

pub mod constants;
mod file_id;
mod name;
mod position;

pub use file_id::FileId;
pub use name::Name;
pub use position::{Position, Span};
