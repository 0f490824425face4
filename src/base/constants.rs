//! Domain constants shared across the toolchain.

/// File extension for YASDL schema sources (without the dot).
pub const SCHEMA_EXT: &str = "yasdl";

/// Package name of the built-in schema implicitly required by every
/// top schema.
pub const BUILTIN_PACKAGE: &str = "venus";

/// Language tag assumed when a schema carries no `language` property.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Type assigned to reference fields that carry no explicit `type`.
pub const IDENTIFIER_TYPE: &str = "identifier";
