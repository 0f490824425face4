//! Model population
//!
//! Converts the loaded registry into the definition arena. Three passes:
//! schema nodes first (so import tables can point at them), then import
//! tables, then bodies. The `:` ancestor list and the `->` arrow are
//! normalized here into `ancestors`/`references` property nodes so later
//! phases see a single representation.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::{FileId, Name};
use crate::project::Registry;
use crate::syntax::{Arg as AstArg, ArgValue, AstDefKind, DottedName, PropertyStmt, Stmt};

use super::model::{Arg, DefId, DefKind, Definition, Model, SchemaData, SchemaImport, Value};

/// Build the semantic model from the registry.
pub fn populate(registry: &Registry) -> Model {
    let mut model = Model::new();
    let mut file_to_def: FxHashMap<FileId, DefId> = FxHashMap::default();

    // Pass 1: schema nodes.
    for schema in registry.parsed() {
        let doc = schema.doc.as_ref().expect("parsed entries carry a doc");
        let id = model.next_id();
        let mut def = Definition::new(
            id,
            DefKind::Schema,
            Name::new(&doc.package_name()),
            schema.file,
            id,
        );
        def.original_name = doc.package_original.clone();
        def.span = doc.span;
        def.name_span = doc.package_span;
        def.schema_data = Some(Box::new(SchemaData {
            package: doc.package.clone(),
            package_name: doc.package_name(),
            origin: schema.origin.clone(),
            is_top: schema.is_top,
            imports: Vec::new(),
            alias_map: IndexMap::new(),
        }));
        model.alloc(def);
        file_to_def.insert(schema.file, id);
    }

    // Pass 2: import tables.
    for schema in registry.parsed() {
        let sid = file_to_def[&schema.file];
        let mut imports = Vec::new();
        let mut alias_map = IndexMap::new();
        for import in &schema.imports {
            let Some(&target) = file_to_def.get(&import.target) else {
                continue;
            };
            let index = imports.len();
            imports.push(SchemaImport {
                alias: import.alias.clone(),
                kind: import.kind,
                target,
                span: import.span,
            });
            alias_map.entry(import.alias.clone()).or_insert(index);
        }
        let data = model.schema_data_mut(sid);
        data.imports = imports;
        data.alias_map = alias_map;
    }

    // Pass 3: bodies.
    for schema in registry.parsed() {
        let doc = schema.doc.as_ref().expect("parsed entries carry a doc");
        let sid = file_to_def[&schema.file];
        for stmt in &doc.body {
            populate_stmt(&mut model, sid, sid, stmt, schema.file);
        }
    }

    model
}

fn ast_kind(kind: AstDefKind) -> DefKind {
    match kind {
        AstDefKind::Fieldset => DefKind::Fieldset,
        AstDefKind::Field => DefKind::Field,
        AstDefKind::Index => DefKind::Index,
        AstDefKind::Constraint => DefKind::Constraint,
    }
}

fn convert_arg(arg: &AstArg) -> Arg {
    let (value, sort) = match &arg.value {
        ArgValue::Str(s) => (Value::Str(s.clone()), None),
        ArgValue::Int(i) => (Value::Int(*i), None),
        ArgValue::Float(f) => (Value::Float(*f), None),
        ArgValue::Bool(b) => (Value::Bool(*b), None),
        ArgValue::None => (Value::None, None),
        ArgValue::All => (Value::All, None),
        ArgValue::Name(name) => (Value::Name(name.clone()), name.sort),
    };
    Arg {
        value,
        span: arg.span,
        sort,
    }
}

fn populate_stmt(model: &mut Model, schema: DefId, parent: DefId, stmt: &Stmt, file: FileId) {
    match stmt {
        // Imports were resolved by the loader; they are not definitions.
        Stmt::Import(_) => {}
        Stmt::Def(def_stmt) => {
            let id = model.next_id();
            let mut def = Definition::new(
                id,
                ast_kind(def_stmt.kind),
                def_stmt.name.clone(),
                file,
                schema,
            );
            def.original_name = def_stmt.original_name.clone();
            def.span = def_stmt.span;
            def.name_span = def_stmt.name_span;
            def.static_parent = Some(parent);
            def.written_modifiers = def_stmt.modifiers.clone();
            model.alloc(def);
            model.def_mut(parent).body.push(id);

            for child in &def_stmt.body {
                populate_stmt(model, schema, id, child, file);
            }

            if !def_stmt.ancestors.is_empty() {
                attach_name_args(model, id, file, "ancestors", &def_stmt.ancestors);
            }
            if let Some(reference) = &def_stmt.reference {
                attach_name_args(model, id, file, "references", std::slice::from_ref(reference));
            }
        }
        Stmt::Property(prop) => {
            populate_property(model, schema, parent, prop, file);
        }
        Stmt::Delete(del) => {
            let id = model.next_id();
            let mut def = Definition::new(id, DefKind::Deletion, Name::new(""), file, schema);
            def.original_name = del.target_original.clone();
            def.span = del.span;
            def.name_span = del.span;
            def.static_parent = Some(parent);
            def.delete_target = Some(del.target.clone());
            model.alloc(def);
            model.def_mut(parent).body.push(id);
        }
    }
}

fn populate_property(
    model: &mut Model,
    schema: DefId,
    parent: DefId,
    prop: &PropertyStmt,
    file: FileId,
) {
    let id = model.next_id();
    let mut def = Definition::new(id, DefKind::Property, prop.name.clone(), file, schema);
    def.original_name = prop.original_name.clone();
    def.span = prop.span;
    def.name_span = prop.span;
    def.static_parent = Some(parent);
    def.args = prop.args.iter().map(convert_arg).collect();
    model.alloc(def);
    let parent_def = model.def_mut(parent);
    parent_def.body.push(id);
    parent_def.properties.entry(prop.name.clone()).or_insert(id);
}

/// Fold the `:` ancestor list / `->` arrow into the matching property.
/// Sugar arguments go in front of any explicitly written ones, so
/// `fieldset b : a { ancestors c; }` lists `a` before `c`.
fn attach_name_args(
    model: &mut Model,
    owner: DefId,
    file: FileId,
    property: &str,
    names: &[DottedName],
) {
    let args: Vec<Arg> = names
        .iter()
        .map(|name| Arg {
            value: Value::Name(name.clone()),
            span: name.span,
            sort: name.sort,
        })
        .collect();

    if let Some(&existing) = model.def(owner).properties.get(property) {
        let existing_def = model.def_mut(existing);
        let mut merged = args;
        merged.append(&mut existing_def.args);
        existing_def.args = merged;
        return;
    }

    let id = model.next_id();
    let name = Name::new(property);
    let schema = model.def(owner).schema;
    let mut def = Definition::new(id, DefKind::Property, name.clone(), file, schema);
    def.span = names[0].span;
    def.name_span = names[0].span;
    def.static_parent = Some(owner);
    def.args = args;
    model.alloc(def);
    let owner_def = model.def_mut(owner);
    owner_def.body.push(id);
    owner_def.properties.insert(name, id);
}
