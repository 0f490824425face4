//! The semantic model
//!
//! All definitions of a compilation live in one flat arena; every relation
//! between definitions (`implements`, `ancestors`, members) is a [`DefId`]
//! edge, never an owning pointer, because the relations form cycles at the
//! graph level even though each one is individually acyclic. Phases write
//! their annotations onto [`Definition`] fields and never retract them.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{FileId, Name, Span};
use crate::project::Origin;
use crate::syntax::{DottedName, ImportKind, SortDir};

/// Index of a definition in the arena (O(1) lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(u32);

impl DefId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Definition tags. Only fieldsets and fields participate in the
/// inheritance and implementation relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefKind {
    Schema,
    Fieldset,
    Field,
    Index,
    Constraint,
    Property,
    Deletion,
}

impl DefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Fieldset => "fieldset",
            Self::Field => "field",
            Self::Index => "index",
            Self::Constraint => "constraint",
            Self::Property => "property",
            Self::Deletion => "deletion",
        }
    }

    /// True for the kinds that own implementation/inheritance edges.
    pub fn is_typed(self) -> bool {
        matches!(self, Self::Fieldset | Self::Field)
    }
}

/// Modifier set attached to a definition (phase 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_required: bool,
}

/// A property argument in the semantic model.
///
/// Binding narrows `Name` arguments in place: statically bound names
/// become `Def`, dynamically bound names become `Path`, and the universal
/// reference marker becomes `Universal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    All,
    /// Unbound dotted name, as written
    Name(DottedName),
    /// Statically bound (phases 1 and 3); `imp` records the `=` prefix
    Def { def: DefId, imp: bool },
    /// Dynamically bound member path (phase 4)
    Path(MemberPath),
    /// The `any` marker of a universal reference
    Universal,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The bound definition, for `Def` and `Path` values.
    pub fn target(&self) -> Option<DefId> {
        match self {
            Self::Def { def, .. } => Some(*def),
            Self::Path(path) => Some(path.target()),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "a string",
            Self::Int(_) => "an integer",
            Self::Float(_) => "a float",
            Self::Bool(_) => "a boolean",
            Self::None => "none",
            Self::All => "all",
            Self::Name(_) => "a name",
            Self::Def { .. } => "a definition",
            Self::Path(_) => "a definition",
            Self::Universal => "any",
        }
    }
}

/// Argument with its source span; index `fields` arguments keep their
/// written sort direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub value: Value,
    pub span: Span,
    pub sort: Option<SortDir>,
}

/// A dynamically bound name: the ordered member steps from the site's
/// root down to the target. The same definition can be contained multiple
/// times through different members, so consumers need the path, not just
/// the final node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPath {
    pub steps: Vec<(Name, DefId)>,
}

impl MemberPath {
    pub fn target(&self) -> DefId {
        self.steps.last().expect("paths are never empty").1
    }

    /// Dot-joined member names, e.g. `issuer.code`.
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for (i, (name, _)) in self.steps.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(name.as_str());
        }
        out
    }
}

/// A member table entry: the final implementation visible under the name,
/// plus the definition through which it was declared or inherited
/// (modifiers such as `required` are read from the origin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub def: DefId,
    pub origin: DefId,
}

/// An entry of a schema's import table.
#[derive(Debug, Clone)]
pub struct SchemaImport {
    pub alias: Name,
    pub kind: ImportKind,
    /// The imported schema's definition
    pub target: DefId,
    pub span: Span,
}

/// Extra state carried by schema definitions only.
#[derive(Debug)]
pub struct SchemaData {
    pub package: Vec<Name>,
    pub package_name: String,
    pub origin: Origin,
    pub is_top: bool,
    pub imports: Vec<SchemaImport>,
    /// alias → index into `imports`; duplicates keep the first entry and
    /// are rejected by the block-uniqueness check
    pub alias_map: IndexMap<Name, usize>,
}

/// A definition node with all phase-written annotations.
#[derive(Debug)]
pub struct Definition {
    pub id: DefId,
    pub kind: DefKind,
    /// Lowercased simple name; empty for deletions
    pub name: Name,
    /// Source casing, for diagnostics
    pub original_name: SmolStr,
    pub file: FileId,
    pub span: Span,
    pub name_span: Span,
    /// Enclosing definition; `None` for schemas
    pub static_parent: Option<DefId>,
    /// The owning schema (self for schemas)
    pub schema: DefId,
    /// Child definitions in source order
    pub body: Vec<DefId>,
    /// Property children by name (first occurrence wins; duplicates are
    /// rejected by block uniqueness)
    pub properties: IndexMap<Name, DefId>,
    /// Arguments, for property definitions
    pub args: Vec<Arg>,
    /// Target simple name, for deletions
    pub delete_target: Option<Name>,
    /// Schema-only state
    pub schema_data: Option<Box<SchemaData>>,
    /// Modifiers as written, with spans; validated and folded into
    /// `modifiers` by phase 1
    pub written_modifiers: Vec<(crate::syntax::Modifier, Span)>,

    // ------------------------------------------------------------------
    // Phase 1
    // ------------------------------------------------------------------
    pub modifiers: Modifiers,
    /// Directly implemented definitions (static bind)
    pub implements_refs: Vec<DefId>,

    // ------------------------------------------------------------------
    // Phase 2
    // ------------------------------------------------------------------
    /// The unique definition whose `implements` lists this one
    pub direct_implementor: Option<DefId>,
    /// Root of this definition's implementation tree (total for typed
    /// definitions after phase 2; may be self)
    pub final_implementor: Option<DefId>,
    /// This definition plus everything it transitively implements
    pub specifications: Vec<DefId>,
    /// Chain from this definition up to its final implementor
    pub implementations: Vec<DefId>,

    // ------------------------------------------------------------------
    // Phase 3
    // ------------------------------------------------------------------
    /// Effective ancestors, imp-names dereferenced, in listed order
    pub ancestors_refs: Vec<DefId>,
    /// Transitive closure of `ancestors_refs`
    pub ancestors_all: FxHashSet<DefId>,
    /// Inverse of `ancestors_all`
    pub descendants: FxHashSet<DefId>,
    /// Merged member table; every value is a final implementation
    pub members: IndexMap<Name, Member>,

    // ------------------------------------------------------------------
    // Phase 5
    // ------------------------------------------------------------------
    pub realized: bool,
    pub toplevel: bool,

    // ------------------------------------------------------------------
    // Phase 7
    // ------------------------------------------------------------------
    /// Effective column type after defaulting, for realized fields
    pub resolved_type: Option<String>,
}

impl Definition {
    pub fn new(id: DefId, kind: DefKind, name: Name, file: FileId, schema: DefId) -> Self {
        Self {
            id,
            kind,
            original_name: SmolStr::new(name.as_str()),
            name,
            file,
            span: Span::empty(),
            name_span: Span::empty(),
            static_parent: None,
            schema,
            body: Vec::new(),
            properties: IndexMap::new(),
            args: Vec::new(),
            delete_target: None,
            schema_data: None,
            written_modifiers: Vec::new(),
            modifiers: Modifiers::default(),
            implements_refs: Vec::new(),
            direct_implementor: None,
            final_implementor: None,
            specifications: Vec::new(),
            implementations: Vec::new(),
            ancestors_refs: Vec::new(),
            ancestors_all: FxHashSet::default(),
            descendants: FxHashSet::default(),
            members: IndexMap::new(),
            realized: false,
            toplevel: false,
            resolved_type: None,
        }
    }

    /// The `ancestors` property node, if any.
    pub fn ancestors_property(&self) -> Option<DefId> {
        self.properties.get("ancestors").copied()
    }

    /// The `implements` property node, if any.
    pub fn implements_property(&self) -> Option<DefId> {
        self.properties.get("implements").copied()
    }
}

/// The flat definition arena plus compilation-wide indexes.
#[derive(Debug)]
pub struct Model {
    defs: Vec<Definition>,
    /// Schema definitions in load order
    schemas: Vec<DefId>,
    /// Acquisition-style dynamic lookup (compiler option; on by default)
    pub recursive_lookup: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            defs: Vec::new(),
            schemas: Vec::new(),
            recursive_lookup: true,
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, def: Definition) -> DefId {
        let id = def.id;
        debug_assert_eq!(id.index(), self.defs.len());
        if def.kind == DefKind::Schema {
            self.schemas.push(id);
        }
        self.defs.push(def);
        id
    }

    pub fn next_id(&self) -> DefId {
        DefId::new(self.defs.len())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn def(&self, id: DefId) -> &Definition {
        &self.defs[id.index()]
    }

    pub fn def_mut(&mut self, id: DefId) -> &mut Definition {
        &mut self.defs[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.defs.iter()
    }

    /// All definition ids, in arena (source) order.
    pub fn ids(&self) -> impl Iterator<Item = DefId> + use<> {
        (0..self.defs.len()).map(DefId::new)
    }

    pub fn schemas(&self) -> &[DefId] {
        &self.schemas
    }

    pub fn schema_by_package(&self, package: &str) -> Option<DefId> {
        self.schemas
            .iter()
            .copied()
            .find(|&s| self.schema_data(s).package_name == package)
    }

    /// Schema data of a schema definition. Panics on non-schema ids.
    pub fn schema_data(&self, id: DefId) -> &SchemaData {
        self.def(id)
            .schema_data
            .as_deref()
            .expect("schema definitions carry schema data")
    }

    pub fn schema_data_mut(&mut self, id: DefId) -> &mut SchemaData {
        self.def_mut(id)
            .schema_data
            .as_deref_mut()
            .expect("schema definitions carry schema data")
    }

    // =========================================================================
    // Structure queries
    // =========================================================================

    /// True when `outer` statically (lexically) contains `inner`, strictly.
    pub fn statically_contains(&self, outer: DefId, inner: DefId) -> bool {
        let mut current = self.def(inner).static_parent;
        while let Some(parent) = current {
            if parent == outer {
                return true;
            }
            current = self.def(parent).static_parent;
        }
        false
    }

    /// True for definitions sitting directly in a schema block.
    pub fn is_outermost(&self, id: DefId) -> bool {
        match self.def(id).static_parent {
            Some(parent) => self.def(parent).kind == DefKind::Schema,
            None => false,
        }
    }

    /// The nearest enclosing fieldset, if any.
    pub fn enclosing_fieldset(&self, id: DefId) -> Option<DefId> {
        let mut current = self.def(id).static_parent;
        while let Some(parent) = current {
            if self.def(parent).kind == DefKind::Fieldset {
                return Some(parent);
            }
            current = self.def(parent).static_parent;
        }
        None
    }

    /// Every definition statically contained in `id`, depth first.
    pub fn itercontained(&self, id: DefId) -> Vec<DefId> {
        let mut out = Vec::new();
        let mut stack: Vec<DefId> = self.def(id).body.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.def(next).body.iter().rev().copied());
        }
        out
    }

    /// Schema-qualified dotted display name, e.g. `cmr.partner.name`.
    pub fn display_name(&self, id: DefId) -> String {
        let def = self.def(id);
        if def.kind == DefKind::Schema {
            return self.schema_data(id).package_name.clone();
        }
        let mut parts = vec![def.name.to_string()];
        let mut current = def.static_parent;
        while let Some(parent) = current {
            let parent_def = self.def(parent);
            if parent_def.kind == DefKind::Schema {
                parts.push(self.schema_data(parent).package_name.clone());
                break;
            }
            parts.push(parent_def.name.to_string());
            current = parent_def.static_parent;
        }
        parts.reverse();
        parts.join(".")
    }

    // =========================================================================
    // Phase-derived queries
    // =========================================================================

    /// Final implementor of a typed definition. Total after phase 2.
    pub fn final_implementor(&self, id: DefId) -> DefId {
        self.def(id).final_implementor.unwrap_or(id)
    }

    /// Property node carried directly by `id`.
    pub fn own_property(&self, id: DefId, name: &str) -> Option<&Definition> {
        self.def(id)
            .properties
            .get(name)
            .map(|&prop| self.def(prop))
    }

    /// Effective property lookup: the definition's own table first, then
    /// its specifications (an implementation inherits what it implements),
    /// then its effective ancestors, depth first in listed order.
    pub fn effective_property(&self, id: DefId, name: &str) -> Option<&Definition> {
        let mut visited = FxHashSet::default();
        self.effective_property_inner(id, name, &mut visited)
    }

    fn effective_property_inner(
        &self,
        id: DefId,
        name: &str,
        visited: &mut FxHashSet<DefId>,
    ) -> Option<&Definition> {
        if !visited.insert(id) {
            return None;
        }
        if let Some(prop) = self.own_property(id, name) {
            return Some(prop);
        }
        for &spec in &self.def(id).implements_refs {
            if let Some(prop) = self.effective_property_inner(spec, name, visited) {
                return Some(prop);
            }
        }
        for &ancestor in &self.def(id).ancestors_refs {
            if let Some(prop) = self.effective_property_inner(ancestor, name, visited) {
                return Some(prop);
            }
        }
        None
    }

    /// Single-string value of an effective property, if well formed.
    pub fn effective_str(&self, id: DefId, name: &str) -> Option<&str> {
        match self.effective_property(id, name)?.args.as_slice() {
            [arg] => arg.value.as_str(),
            _ => None,
        }
    }

    /// Single-integer value of an effective property, if well formed.
    pub fn effective_int(&self, id: DefId, name: &str) -> Option<i64> {
        match self.effective_property(id, name)?.args.as_slice() {
            [arg] => arg.value.as_int(),
            _ => None,
        }
    }

    /// Single-boolean value of an effective property, if well formed.
    pub fn effective_bool(&self, id: DefId, name: &str) -> Option<bool> {
        match self.effective_property(id, name)?.args.as_slice() {
            [arg] => arg.value.as_bool(),
            _ => None,
        }
    }

    /// The concrete reference target of a field, post phase 4: the bound
    /// fieldset of its effective `references` property. `None` for
    /// universal references and unreferenced fields.
    pub fn reference_target(&self, field: DefId) -> Option<DefId> {
        let prop = self.effective_property(field, "references")?;
        match prop.args.as_slice() {
            [arg] => arg.value.target(),
            _ => None,
        }
    }

    /// True when the field's effective `references` is the universal `any`.
    pub fn is_universal_reference(&self, field: DefId) -> bool {
        match self.effective_property(field, "references") {
            Some(prop) => {
                prop.args.is_empty()
                    || prop.args.iter().any(|a| matches!(a.value, Value::Universal))
            }
            None => false,
        }
    }
}
