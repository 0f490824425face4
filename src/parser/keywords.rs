//! Reserved words and special property names.
//!
//! Reserved words can never name a definition; special property names may
//! only name property statements. Both lists are enforced by the local
//! semantic checker, not the lexer, so that the violations get precise
//! semantic diagnostics instead of parse errors.

/// Words that cannot be used as definition names.
pub const RESERVED_WORDS: &[&str] = &[
    "schema", "fieldset", "field", "index", "fields", "modifiers", "abstract", "final",
    "fallback", "required", "use", "require", "as", "rename", "delete", "none", "true",
    "false", "all",
];

/// Property names with dedicated semantics; usable only as properties.
pub const SPECIAL_PROPERTIES: &[&str] = &[
    "ancestors",
    "references",
    "implements",
    "unique",
    "fields",
    "index",
    "property",
];

/// `id` is reserved for the generated primary key column.
pub const GENERATED_ID: &str = "id";

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

pub fn is_special_property(name: &str) -> bool {
    SPECIAL_PROPERTIES.contains(&name)
}
