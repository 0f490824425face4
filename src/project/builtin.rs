//! The built-in `venus` package.
//!
//! Logically prepended to the search path and implicitly required by every
//! top schema, so a dotted import of `venus` always resolves even on an
//! empty search path.

/// Source text of the built-in package.
pub const BUILTIN_SOURCE: &str = r#"# Built-in base package, implicitly required by every top schema.
schema venus {
    guid "venus-builtin-2f6a1c";
    language "en";
}
"#;
