//! Diagnostic code definitions
//!
//! Codes follow a naming convention: {severity}{phase}{step}
//! - first letter: E error, W warning, N notice
//! - first two digits: the phase that generated the code (00-07, 09 internal)
//! - last two digits: the step within the phase
//!
//! The numeric value of a code is stable across releases; renderers and
//! test suites may match on it.

use std::fmt;

use super::diagnostic::Severity;

/// Diagnostic codes for the compiler
///
/// Each code represents one specific violation, enabling filtering,
/// documentation, and stable assertions in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum DiagCode {
    // =========================================================================
    // 00xx: Loader & schema registry
    // =========================================================================
    /// I/O failure fetching a schema origin
    E0001 = 1,
    /// Syntax error in a schema source
    E0002 = 2,
    /// Import target not found on the search path
    E0003 = 3,
    /// Import requires an alias (multi-segment dotted name or URI)
    E0004 = 4,
    /// Declared package name does not match the dotted path used to reach it
    E0005 = 5,
    /// Top schema package name does not match its file name
    E0006 = 6,
    /// URI-loaded package name does not start with the host's reverse DNS
    E0007 = 7,
    /// Two loaded schemas share a package name
    E0008 = 8,
    /// Invalid or unsupported import URI
    E0009 = 9,

    // =========================================================================
    // 01xx: Local semantic checks
    // =========================================================================
    /// Schema imports itself
    E0101 = 101,
    /// Duplicate import of the same target schema
    E0102 = 102,
    /// Illegal identifier (reserved word, `id`, or embedded dot)
    E0103 = 103,
    /// Duplicate name within a block
    E0104 = 104,
    /// Special property name used for a non-property child
    E0105 = 105,
    /// `abstract` and `final` on the same definition
    E0106 = 106,
    /// Unresolved `implements` reference
    E0107 = 107,
    /// Definition implements itself
    E0108 = 108,
    /// Specification statically contains its implementation
    E0109 = 109,
    /// Implementation statically contains its specification
    E0110 = 110,
    /// Cycle in the `implements` relation
    E0111 = 111,
    /// Modifier listed twice on one definition
    E0112 = 112,
    /// `implements` target kind does not match the implementor kind
    E0113 = 113,

    // =========================================================================
    // 02xx: Implementation-tree builder
    // =========================================================================
    /// Definition listed under `implements` more than once in the compilation
    E0201 = 201,
    /// Definition with an imp-name ancestor is listed under `implements`
    E0202 = 202,
    /// `final` definition is not its own final implementor
    E0203 = 203,
    /// `abstract required` definition has no implementor
    E0204 = 204,
    /// Static containment between two nodes of one implementation tree
    E0205 = 205,

    // =========================================================================
    // 03xx: Inheritance-graph builder
    // =========================================================================
    /// Unresolved ancestor reference
    E0301 = 301,
    /// Definition is its own ancestor
    E0302 = 302,
    /// Static containment between a definition and its ancestor
    E0303 = 303,
    /// Cycle in the `ancestors` relation
    E0304 = 304,
    /// Ancestor kind does not match the inheriting definition's kind
    E0305 = 305,
    /// `delete` names nothing inherited
    W0306 = 306,
    /// `delete` names a statically defined sibling
    N0307 = 307,
    /// Static containment between a definition and an effective ancestor
    E0308 = 308,

    // =========================================================================
    // 04xx: Full name binder
    // =========================================================================
    /// Unresolved dotted name in a property argument
    E0401 = 401,
    /// Invalid `references` argument
    E0402 = 402,
    /// Field references its enclosing fieldset
    E0403 = 403,
    /// Index without a usable `fields` property
    E0404 = 404,
    /// Index field outside the enclosing fieldset
    E0405 = 405,
    /// Duplicate field in one index
    E0406 = 406,
    /// Constraint without a usable `check` property
    E0407 = 407,

    // =========================================================================
    // 05xx: Realization fixpoint
    // =========================================================================
    /// Final implementor of a `required` fieldset is not outermost
    E0501 = 501,
    /// Final implementor of a referenced fieldset is not outermost
    E0502 = 502,
    /// Realized final implementation carries `abstract`
    E0503 = 503,

    // =========================================================================
    // 06xx: Requirement checker
    // =========================================================================
    /// Required member of a realized specification is not realized
    E0601 = 601,

    // =========================================================================
    // 07xx: Global checks
    // =========================================================================
    /// Realized fieldset contains no realized field
    E0701 = 701,
    /// Outermost field definition carries `required`
    W0702 = 702,
    /// Toplevel fieldset has a non-outermost specification
    N0703 = 703,
    /// Invalid `type` property
    E0704 = 704,
    /// Invalid `size` or `precision` property
    E0705 = 705,
    /// Invalid boolean property or wrong context
    E0706 = 706,
    /// Missing, empty, or duplicate `guid`
    E0707 = 707,
    /// Invalid `ondelete`/`onupdate` value or context
    E0708 = 708,
    /// Schema carries no `language` property
    W0709 = 709,
    /// Invalid `language` property
    E0710 = 710,
    /// `cluster` does not name an index at the same level
    E0711 = 711,
    /// Invalid `reqlevel` value
    E0712 = 712,
    /// `reqlevel "required"` without `notnull true`
    N0713 = 713,
    /// Index on a realized fieldset names an unrealized field
    E0714 = 714,
    /// Reference field without a covering index
    N0715 = 715,

    // =========================================================================
    // 08xx: Driver type checks (optional collaborator)
    // =========================================================================
    /// Field type unknown to the driver's type registry
    E0801 = 801,
    /// Type requires a `size` and none is given
    E0802 = 802,
    /// Type requires a `precision` and none is given
    E0803 = 803,

    // =========================================================================
    // 09xx: Internal invariant violations
    // =========================================================================
    /// Internal invariant violation; a compiler bug, not a user error
    E0901 = 901,
}

impl DiagCode {
    /// The stable numeric value of this code.
    pub fn number(self) -> u16 {
        self as u16
    }

    /// The analysis phase this code belongs to (0-7, 9 for internal).
    pub fn phase(self) -> u8 {
        (self.number() / 100) as u8
    }

    /// The step ordinal within the phase.
    pub fn step(self) -> u8 {
        (self.number() % 100) as u8
    }

    /// The severity implied by this code.
    pub fn severity(self) -> Severity {
        match self {
            Self::W0306 | Self::W0702 | Self::W0709 => Severity::Warning,
            Self::N0307 | Self::N0703 | Self::N0713 | Self::N0715 => Severity::Notice,
            _ => Severity::Error,
        }
    }

    /// True for codes that classify as I/O or syntax failures (exit code 2).
    pub fn is_io_or_syntax(self) -> bool {
        matches!(self, Self::E0001 | Self::E0002 | Self::E0009)
    }

    /// True for internal invariant violations (exit code 3).
    pub fn is_internal(self) -> bool {
        matches!(self, Self::E0901)
    }
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
