//! Name binding
//!
//! Two regimes share this module:
//!
//! - **Static binding** resolves a dotted name lexically: the head segment
//!   is searched in each enclosing block walking outward to the schema
//!   (consulting the schema's import aliases last), remaining segments
//!   descend through statically contained children. Used for `implements`
//!   and `ancestors`.
//! - **Dynamic binding** resolves through member tables built by phase 3,
//!   with two twists: a head that is only a static child is dereferenced
//!   through its final implementor ("mixed binding", so references survive
//!   reimplementation under a different name), and on a miss the lookup
//!   retries at the static parent, acquisition style, when `recursive`
//!   is enabled. Used for everything phase 4 binds.

use tracing::trace;

use crate::base::Name;
use crate::syntax::{ClassSet, DottedName, NameClass};

use super::model::{DefId, DefKind, Member, MemberPath, Model};

/// Why a name failed to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    Unresolved { name: String },
    WrongClass { name: String, found: DefKind },
}

impl BindError {
    pub fn message(&self) -> String {
        match self {
            Self::Unresolved { name } => format!("cannot resolve '{}'", name),
            Self::WrongClass { name, found } => {
                format!("'{}' resolves to a {}", name, found.as_str())
            }
        }
    }
}

fn class_of(kind: DefKind) -> Option<NameClass> {
    match kind {
        DefKind::Schema => Some(NameClass::Schema),
        DefKind::Fieldset => Some(NameClass::Fieldset),
        DefKind::Field => Some(NameClass::Field),
        DefKind::Index => Some(NameClass::Index),
        DefKind::Property => Some(NameClass::Property),
        DefKind::Constraint | DefKind::Deletion => None,
    }
}

fn matches_classes(kind: DefKind, classes: ClassSet) -> bool {
    class_of(kind).is_some_and(|c| classes.contains(c))
}

fn static_child(model: &Model, scope: DefId, name: &Name) -> Option<DefId> {
    model
        .def(scope)
        .body
        .iter()
        .copied()
        .find(|&child| &model.def(child).name == name)
}

// =============================================================================
// Static binding
// =============================================================================

/// Statically bind `name` at `site`.
///
/// `classes` restricts what a single-segment name may resolve to (the
/// written `[…]` min-classes set takes precedence). `exclude` removes one
/// definition from every head search; the ancestors binder passes the
/// owning definition here, which permits `fieldset location : location`.
pub fn bind_static(
    model: &Model,
    site: DefId,
    name: &DottedName,
    classes: ClassSet,
    exclude: Option<DefId>,
) -> Result<DefId, BindError> {
    let classes = name.min_classes.unwrap_or(classes);
    let head_filter = if name.segments.len() > 1 {
        ClassSet::of(&[NameClass::Schema, NameClass::Fieldset, NameClass::Field])
    } else {
        classes
    };

    let head = match resolve_static_head(model, site, name, head_filter, exclude) {
        Some(def) => def,
        None => {
            return Err(BindError::Unresolved {
                name: name.original.to_string(),
            });
        }
    };

    let target = descend_static(model, head, &name.segments[1..]).ok_or_else(|| {
        BindError::Unresolved {
            name: name.original.to_string(),
        }
    })?;

    if name.segments.len() > 1 && !matches_classes(model.def(target).kind, classes) {
        return Err(BindError::WrongClass {
            name: name.original.to_string(),
            found: model.def(target).kind,
        });
    }
    trace!(name = %name.original, target = target.index(), "static bind");
    Ok(target)
}

fn resolve_static_head(
    model: &Model,
    site: DefId,
    name: &DottedName,
    head_filter: ClassSet,
    exclude: Option<DefId>,
) -> Option<DefId> {
    let head = name.head();

    if name.absolute {
        let schema = model.def(site).schema;
        return static_child(model, schema, head)
            .filter(|&d| Some(d) != exclude)
            .filter(|&d| matches_classes(model.def(d).kind, head_filter));
    }

    let mut scope = model.def(site).static_parent;
    while let Some(current) = scope {
        if let Some(found) = static_child(model, current, head)
            .filter(|&d| Some(d) != exclude)
            .filter(|&d| matches_classes(model.def(d).kind, head_filter))
        {
            return Some(found);
        }
        if model.def(current).kind == DefKind::Schema {
            // Last stop: the schema's import aliases.
            let data = model.schema_data(current);
            if let Some(&index) = data.alias_map.get(head) {
                let target = data.imports[index].target;
                if name.segments.len() > 1 || head_filter.contains(NameClass::Schema) {
                    return Some(target);
                }
            }
            return None;
        }
        scope = model.def(current).static_parent;
    }
    None
}

fn descend_static(model: &Model, mut current: DefId, rest: &[Name]) -> Option<DefId> {
    for segment in rest {
        current = static_child(model, current, segment)?;
    }
    Some(current)
}

// =============================================================================
// Dynamic binding
// =============================================================================

/// Dynamically bind `name` at `site`, returning the member path.
///
/// Absolute names start at the enclosing schema and never acquire.
/// `recursive` enables acquisition: on a miss the lookup retries at the
/// static parent, all the way up to the schema.
pub fn bind_dynamic(
    model: &Model,
    site: DefId,
    name: &DottedName,
    classes: ClassSet,
    recursive: bool,
) -> Result<MemberPath, BindError> {
    let classes = name.min_classes.unwrap_or(classes);

    let resolved = if name.absolute {
        resolve_dynamic_from(model, model.def(site).schema, name)
    } else {
        let mut scope = Some(site);
        let mut found = None;
        while let Some(current) = scope {
            if let Some(path) = resolve_dynamic_from(model, current, name) {
                found = Some(path);
                break;
            }
            if !recursive {
                break;
            }
            scope = model.def(current).static_parent;
        }
        found
    };

    let path = resolved.ok_or_else(|| BindError::Unresolved {
        name: name.original.to_string(),
    })?;

    if !matches_classes(model.def(path.target()).kind, classes) {
        return Err(BindError::WrongClass {
            name: name.original.to_string(),
            found: model.def(path.target()).kind,
        });
    }
    trace!(name = %name.original, target = path.target().index(), "dynamic bind");
    Ok(path)
}

fn resolve_dynamic_from(model: &Model, scope: DefId, name: &DottedName) -> Option<MemberPath> {
    let mut steps: Vec<(Name, DefId)> = Vec::with_capacity(name.segments.len());

    let head = name.head();
    let mut current = match lookup_step(model, scope, head) {
        Some(def) => def,
        None => {
            // Import aliases resolve at the schema level only.
            let scope_def = model.def(scope);
            if scope_def.kind != DefKind::Schema {
                return None;
            }
            let data = model.schema_data(scope);
            let &index = data.alias_map.get(head)?;
            data.imports[index].target
        }
    };
    steps.push((head.clone(), current));

    for segment in &name.segments[1..] {
        current = lookup_step(model, current, segment)?;
        steps.push((segment.clone(), current));
    }

    Some(MemberPath { steps })
}

/// One lookup step: the member table first, then statically contained
/// children dereferenced through their final implementor (mixed binding).
fn lookup_step(model: &Model, scope: DefId, name: &Name) -> Option<DefId> {
    if let Some(Member { def, .. }) = model.def(scope).members.get(name) {
        return Some(*def);
    }
    let child = static_child(model, scope, name)?;
    let child_def = model.def(child);
    if child_def.kind == DefKind::Deletion || child_def.kind == DefKind::Property {
        return None;
    }
    if child_def.kind.is_typed() {
        Some(model.final_implementor(child))
    } else {
        Some(child)
    }
}
