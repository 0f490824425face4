//! Dotted names
//!
//! A dotted name is a sequence of simple names, optionally prefixed with
//! `schema.` (absolute) or `=` (imp-name, "final implementation of"),
//! optionally suffixed with a bracketed min-classes set such as
//! `[field|fieldset]`. Index field arguments may additionally carry a
//! `+`/`-` sort direction.

use std::fmt;

use smol_str::SmolStr;

use crate::base::{Name, Span};

/// The binding classes a dotted name may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameClass {
    Schema,
    Fieldset,
    Field,
    Index,
    Property,
}

impl NameClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Fieldset => "fieldset",
            Self::Field => "field",
            Self::Index => "index",
            Self::Property => "property",
        }
    }
}

/// A small set of [`NameClass`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassSet(u8);

impl ClassSet {
    pub const EMPTY: ClassSet = ClassSet(0);

    pub const fn of(classes: &[NameClass]) -> ClassSet {
        let mut bits = 0u8;
        let mut i = 0;
        while i < classes.len() {
            bits |= 1u8 << classes[i] as u8;
            i += 1;
        }
        ClassSet(bits)
    }

    pub fn insert(&mut self, class: NameClass) {
        self.0 |= 1u8 << class as u8;
    }

    pub fn contains(self, class: NameClass) -> bool {
        (self.0 & (1u8 << class as u8)) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = [
            NameClass::Schema,
            NameClass::Fieldset,
            NameClass::Field,
            NameClass::Index,
            NameClass::Property,
        ];
        let mut first = true;
        for class in all {
            if self.contains(class) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(class.as_str())?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Sort direction on an index field argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDir {
    Ascending,
    Descending,
}

/// A dotted name as written in source, before binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DottedName {
    /// `=` prefix: bind statically, then take the final implementor
    pub imp: bool,
    /// `schema.` prefix: resolve from the enclosing schema, no acquisition
    pub absolute: bool,
    /// Lowercased segments, in order
    pub segments: Vec<Name>,
    /// Verbatim source text, for diagnostics
    pub original: SmolStr,
    /// Bracketed class restriction, if written
    pub min_classes: Option<ClassSet>,
    /// `+`/`-` suffix; only meaningful in index `fields` arguments
    pub sort: Option<SortDir>,
    pub span: Span,
}

impl DottedName {
    /// True when the name is one unprefixed segment.
    pub fn is_simple(&self) -> bool {
        !self.imp && !self.absolute && self.segments.len() == 1
    }

    pub fn head(&self) -> &Name {
        &self.segments[0]
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
