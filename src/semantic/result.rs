//! The compilation result
//!
//! What downstream DDL generators consume: the registry, the annotated
//! model, the realized toplevel fieldsets with their member paths, field
//! annotations, index resolutions, and the GUID map. Also hosts the
//! optional driver-specific type check (phase 8).

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::diag::{DiagCode, Diagnostics, ExitClass};
use crate::project::Registry;
use crate::syntax::SortDir;

use super::model::{DefId, DefKind, MemberPath, Model, Value};

/// Result of a full compiler run.
#[derive(Debug)]
pub struct Compilation {
    pub registry: Registry,
    /// `None` when loading failed before a model could be built
    model: Option<Model>,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    pub(super) fn new(registry: Registry, model: Option<Model>, diagnostics: Diagnostics) -> Self {
        Self {
            registry,
            model,
            diagnostics,
        }
    }

    /// True when the pipeline finished without errors.
    pub fn ok(&self) -> bool {
        self.model.is_some() && !self.diagnostics.has_errors()
    }

    pub fn exit_class(&self) -> ExitClass {
        self.diagnostics.exit_class()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn model_ref(&self) -> &Model {
        self.model
            .as_ref()
            .expect("query on a compilation that never built a model")
    }

    // =========================================================================
    // Toplevel fieldsets and member paths
    // =========================================================================

    /// Realized toplevel fieldsets, in definition order.
    pub fn toplevel_fieldsets(&self) -> Vec<DefId> {
        let model = self.model_ref();
        model
            .ids()
            .filter(|&id| {
                let def = model.def(id);
                def.kind == DefKind::Fieldset && def.toplevel
            })
            .collect()
    }

    /// Root-to-leaf paths of every realized field of a fieldset, depth
    /// first through embedded fieldsets. Paths are what generators name
    /// columns by; the same definition can occur on several paths.
    pub fn member_paths(&self, fieldset: DefId) -> Vec<MemberPath> {
        let model = self.model_ref();
        let mut out = Vec::new();
        let mut stack: FxHashSet<DefId> = FxHashSet::default();
        collect_paths(model, fieldset, &mut Vec::new(), &mut stack, &mut out);
        out
    }

    // =========================================================================
    // Field annotations
    // =========================================================================

    /// Resolved column type after defaulting (phase 7).
    pub fn field_type(&self, field: DefId) -> Option<&str> {
        self.model_ref().def(field).resolved_type.as_deref()
    }

    pub fn field_size(&self, field: DefId) -> Option<i64> {
        self.model_ref().effective_int(field, "size")
    }

    pub fn field_precision(&self, field: DefId) -> Option<i64> {
        self.model_ref().effective_int(field, "precision")
    }

    /// The referenced fieldset of a realized reference field.
    pub fn field_reference(&self, field: DefId) -> Option<DefId> {
        self.model_ref().reference_target(field)
    }

    // =========================================================================
    // Indexes
    // =========================================================================

    /// Outermost-level indexes of a fieldset, in source order.
    pub fn indexes_of(&self, fieldset: DefId) -> Vec<DefId> {
        let model = self.model_ref();
        model
            .def(fieldset)
            .body
            .iter()
            .copied()
            .filter(|&child| model.def(child).kind == DefKind::Index)
            .collect()
    }

    /// Resolved field paths of an index, with sort directions.
    pub fn index_fields(&self, index: DefId) -> Vec<(MemberPath, Option<SortDir>)> {
        let model = self.model_ref();
        let Some(&fields_prop) = model.def(index).properties.get("fields") else {
            return Vec::new();
        };
        model
            .def(fields_prop)
            .args
            .iter()
            .filter_map(|arg| match &arg.value {
                Value::Path(path) => Some((path.clone(), arg.sort)),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // GUID map
    // =========================================================================

    /// GUID → definition, for self-describing instances. Phase 7 already
    /// guaranteed pairwise distinctness.
    pub fn guid_map(&self) -> IndexMap<String, DefId> {
        let model = self.model_ref();
        let mut map = IndexMap::new();
        for id in model.ids() {
            if let Some(prop) = model.own_property(id, "guid") {
                if let [arg] = prop.args.as_slice() {
                    if let Some(value) = arg.value.as_str() {
                        map.entry(value.to_string()).or_insert(id);
                    }
                }
            }
        }
        map
    }

    /// The GUID map as JSON, keyed by GUID with qualified definition names
    /// as values.
    #[cfg(feature = "serialize")]
    pub fn guid_map_json(&self) -> serde_json::Result<String> {
        let model = self.model_ref();
        let map: IndexMap<String, String> = self
            .guid_map()
            .into_iter()
            .map(|(guid, id)| (guid, model.display_name(id)))
            .collect();
        serde_json::to_string_pretty(&map)
    }

    // =========================================================================
    // Phase 8: driver type checks
    // =========================================================================

    /// Run the optional driver-specific checks against a type registry.
    /// Produces a fresh diagnostics bag; the core pipeline is unaffected.
    pub fn check_types(&self, registry: &dyn TypeRegistry) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(model) = self.model.as_ref() else {
            return diags;
        };
        for id in model.ids() {
            let def = model.def(id);
            if def.kind != DefKind::Field || !def.realized {
                continue;
            }
            let Some(type_name) = def.resolved_type.as_deref() else {
                continue;
            };
            let Some(kind) = registry.kind(type_name) else {
                diags.error(
                    DiagCode::E0801,
                    def.file,
                    def.name_span,
                    format!(
                        "type \"{}\" of '{}' is unknown to the driver",
                        type_name,
                        model.display_name(id)
                    ),
                );
                continue;
            };
            match kind {
                TypeKind::RequiresSize if model.effective_int(id, "size").is_none() => {
                    diags.error(
                        DiagCode::E0802,
                        def.file,
                        def.name_span,
                        format!(
                            "type \"{}\" of '{}' requires a size",
                            type_name,
                            model.display_name(id)
                        ),
                    );
                }
                TypeKind::RequiresPrecision
                    if model.effective_int(id, "precision").is_none() =>
                {
                    diags.error(
                        DiagCode::E0803,
                        def.file,
                        def.name_span,
                        format!(
                            "type \"{}\" of '{}' requires a precision",
                            type_name,
                            model.display_name(id)
                        ),
                    );
                }
                _ => {}
            }
        }
        diags
    }
}

fn collect_paths(
    model: &Model,
    scope: DefId,
    prefix: &mut Vec<(crate::base::Name, DefId)>,
    visiting: &mut FxHashSet<DefId>,
    out: &mut Vec<MemberPath>,
) {
    if !visiting.insert(scope) {
        return;
    }
    for (name, member) in &model.def(scope).members {
        if !model.def(member.def).realized {
            continue;
        }
        prefix.push((name.clone(), member.def));
        match model.def(member.def).kind {
            DefKind::Field => out.push(MemberPath {
                steps: prefix.clone(),
            }),
            DefKind::Fieldset => collect_paths(model, member.def, prefix, visiting, out),
            _ => {}
        }
        prefix.pop();
    }
    visiting.remove(&scope);
}

/// How a driver classifies a column type (the phase-8 collaborator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    FixedSize,
    RequiresSize,
    RequiresPrecision,
    IdentifierCompatible,
}

/// Mapping from type name to kind, supplied by a database driver.
pub trait TypeRegistry {
    fn kind(&self, type_name: &str) -> Option<TypeKind>;
}
