//! Graph Binder - fuses host bindings with extracted Python structure
//!
//! Binding runs in fixed passes, each depending on entities from the one
//! before:
//! 1. Core primitives
//! 2. Classes (loading their Python files through the cache)
//! 3. Fields
//! 4. Methods and operators
//! 5. Properties
//!
//! Any lookup that fails here is fatal: translation needs a sound graph.

pub mod type_table;

pub use type_table::{host_type, TypeTable};

use crate::bindings::{Bindings, MemberEntry};
use crate::cache::{SourceCache, SourceLocator};
use crate::graph::{
    FieldNode, FunctionNode, Graph, GraphBuilder, HostMethodRef, NodeId, NodeKind, NodeTag,
    ParameterNode, Primitive, PropertyNode, Type, GETTER_KEY, SETTER_KEY,
};
use crate::host::{HostDocument, HostMethod, MemberKey, TypeKey};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Module holding the primitive type nodes
pub const CORE_MODULE: &str = "@python.core";
/// Name of the implicit receiver parameter
pub const SELF_PARAM: &str = "self";
/// Name of a property setter's value parameter
pub const VALUE_PARAM: &str = "value";

/// Graph with every host binding resolved
#[derive(Debug, Clone)]
pub struct BoundGraph {
    pub graph: Graph,
    pub types: TypeTable,
    /// Field, method and property nodes per bound host member
    pub members: IndexMap<MemberKey, NodeId>,
    /// Operator functions per bound host method
    pub operators: IndexMap<MemberKey, NodeId>,
    /// Functions a host member is bound to, accessors included
    pub bound_functions: HashSet<NodeId>,
}

impl BoundGraph {
    pub fn member(&self, key: &MemberKey) -> Option<NodeId> {
        self.members.get(key).copied()
    }

    pub fn class(&self, key: &TypeKey) -> Option<NodeId> {
        self.types.class(key)
    }
}

/// Builds a [`BoundGraph`] from walked bindings
pub struct GraphBinder<'a> {
    builder: GraphBuilder,
    cache: &'a mut SourceCache,
    locator: &'a SourceLocator,
    types: TypeTable,
    members: IndexMap<MemberKey, NodeId>,
    operators: IndexMap<MemberKey, NodeId>,
    bound_functions: HashSet<NodeId>,
}

/// Where a bound function's Python source may live
struct SourceScope<'p> {
    document: &'p HostDocument,
    file: Option<&'p str>,
}

impl<'a> GraphBinder<'a> {
    pub fn new(cache: &'a mut SourceCache, locator: &'a SourceLocator) -> Self {
        Self {
            builder: GraphBuilder::new(),
            cache,
            locator,
            types: TypeTable::default(),
            members: IndexMap::new(),
            operators: IndexMap::new(),
            bound_functions: HashSet::new(),
        }
    }

    /// Run every binding pass and freeze the graph
    pub fn bind(mut self, bindings: &Bindings) -> Result<BoundGraph> {
        self.seed_core();
        self.bind_classes(bindings)?;
        self.bind_fields(bindings)?;
        self.bind_methods(bindings)?;
        self.bind_properties(bindings)?;

        let graph = self.builder.finalize();
        tracing::info!(
            "Bound graph: {} nodes, {} members, {} operators",
            graph.len(),
            self.members.len(),
            self.operators.len()
        );
        Ok(BoundGraph {
            graph,
            types: self.types,
            members: self.members,
            operators: self.operators,
            bound_functions: self.bound_functions,
        })
    }

    fn seed_core(&mut self) {
        let core = self.builder.get_or_add_module(CORE_MODULE);
        for primitive in [Primitive::Str, Primitive::Int, Primitive::Float, Primitive::Bool] {
            let node = self.builder.get_or_add_child(core, primitive.as_str(), || {
                NodeKind::PrimitiveType(primitive)
            });
            self.types.register_primitive(primitive, node);
        }
    }

    fn bind_classes(&mut self, bindings: &Bindings) -> Result<()> {
        for (key, entry) in &bindings.classes {
            let module = self.builder.get_or_add_module(&entry.binding.module);

            if let Some(file) = &entry.binding.file {
                let path = self.locator.locate(entry.document.directory(), file)?;
                let file_root = self.cache.get_or_extract(&mut self.builder, &path)?;
                self.builder.attach_source(module, file_root);
            }

            let class = self
                .builder
                .get_or_add_class(module, &entry.binding.class_path)?;
            self.builder.set_host_name(class, key.simple_name());
            self.types.register_class(key.clone(), class);

            tracing::debug!(
                "Bound class {} -> {}:{}",
                key,
                entry.binding.module,
                entry.binding.class_path
            );
        }
        Ok(())
    }

    fn owner(&self, key: &MemberKey) -> Result<NodeId> {
        self.types
            .class(&key.owner)
            .ok_or_else(|| Error::UnregisteredType(key.owner.to_string()))
    }

    fn bind_fields(&mut self, bindings: &Bindings) -> Result<()> {
        for (key, entry) in &bindings.fields {
            let class = self.owner(key)?;
            let name = entry.binding.name.as_deref().unwrap_or(&entry.member.name);
            let ty = self.types.resolve(&entry.member.ty);

            let field = match self.builder.child(class, name) {
                Some(existing) if self.builder.node(existing).tag() == NodeTag::Field => existing,
                _ => self
                    .builder
                    .add_child(class, name, NodeKind::Field(FieldNode::default())),
            };
            self.builder.set_type(field, ty);
            self.builder.set_host_name(field, &entry.member.name);
            self.members.insert(key.clone(), field);

            tracing::debug!("Bound field {}.{} : {}", key.owner, name, self.builder.type_name(ty));
        }
        Ok(())
    }

    fn bind_methods(&mut self, bindings: &Bindings) -> Result<()> {
        for (key, entry) in &bindings.methods {
            let scope = SourceScope {
                document: entry.document,
                file: entry
                    .binding
                    .file
                    .as_deref()
                    .or_else(|| bindings.class_file(&key.owner)),
            };
            let function = self.bind_function(key, entry, &entry.binding.function_path, Some(&scope))?;
            self.members.insert(key.clone(), function);
        }

        for (key, entry) in &bindings.operators {
            let path = entry.binding.operator.graph_key();
            let function = self.bind_function(key, entry, &path, None)?;
            self.operators.insert(key.clone(), function);
        }
        Ok(())
    }

    /// Bind one host method. Instance methods get a `self` receiver typed to
    /// the owning class; static methods use their first parameter's class.
    fn bind_function<B>(
        &mut self,
        key: &MemberKey,
        entry: &MemberEntry<'_, HostMethod, B>,
        path: &str,
        scope: Option<&SourceScope>,
    ) -> Result<NodeId> {
        let method = entry.member;
        let owner = self.owner(key)?;
        let mut names: Vec<String> = method.params.iter().map(|p| p.name.clone()).collect();
        let mut types: Vec<Type> = method
            .params
            .iter()
            .map(|p| self.types.resolve(&p.ty))
            .collect();

        let class = if method.is_static {
            match types.first().and_then(Type::as_class) {
                Some(class) => class,
                None => {
                    return Err(Error::AmbiguousStaticReceiver(format!(
                        "{}.{}",
                        key.owner, method.name
                    )))
                }
            }
        } else {
            names.insert(0, SELF_PARAM.to_string());
            types.insert(0, Type::Class(owner));
            owner
        };
        let return_type = self.types.resolve(&method.return_type);

        let local_name = path.rsplit('.').next().unwrap_or(path);
        let function = match scope {
            Some(scope) => self.find_source_function(class, path, scope)?,
            None => None,
        };
        let function = match function {
            Some(function) => {
                self.builder.link(class, local_name, function);
                self.type_parameters(function, &types);
                function
            }
            None => self.add_bodyless_function(class, local_name, &names, &types),
        };
        self.builder.set_return_type(function, return_type);
        self.builder.set_host_method(
            function,
            HostMethodRef {
                name: method.name.clone(),
                owner: key.owner.simple_name().to_string(),
                is_static: method.is_static,
            },
        );
        self.bound_functions.insert(function);

        tracing::debug!(
            "Bound method {}.{} -> {} ({})",
            key.owner,
            method.name,
            path,
            if self.builder.function(function).is_some_and(|f| f.definition.is_some()) {
                "with body"
            } else {
                "no body"
            }
        );
        Ok(function)
    }

    /// Python function at `path`, searched below the bound class first and
    /// then at the top of the bound file.
    fn find_source_function(&mut self, class: NodeId, path: &str, scope: &SourceScope) -> Result<Option<NodeId>> {
        if let Some(found) = self.builder.descendant(class, path) {
            if self.builder.function(found).is_some() {
                return Ok(Some(found));
            }
        }

        if let Some(file) = scope.file {
            let located = self.locator.locate(scope.document.directory(), file)?;
            let file_root = self.cache.get_or_extract(&mut self.builder, &located)?;
            if let Some(found) = self.builder.descendant(file_root, path) {
                if self.builder.function(found).is_some() {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    fn type_parameters(&mut self, function: NodeId, types: &[Type]) {
        let params: Vec<NodeId> = self
            .builder
            .parameters(function)
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();
        if params.len() != types.len() {
            tracing::warn!(
                "Parameter count mismatch for {}: Python has {}, host has {}",
                self.builder.name(function),
                params.len(),
                types.len()
            );
        }
        for (param, ty) in params.into_iter().zip(types) {
            self.builder.set_type(param, *ty);
        }
    }

    fn add_bodyless_function(&mut self, parent: NodeId, name: &str, params: &[String], types: &[Type]) -> NodeId {
        let function = self
            .builder
            .add_child(parent, name, NodeKind::Function(FunctionNode::default()));
        for (param, ty) in params.iter().zip(types) {
            self.builder.add_child(
                function,
                param,
                NodeKind::Parameter(ParameterNode {
                    ty: *ty,
                    default: None,
                }),
            );
        }
        function
    }

    fn bind_properties(&mut self, bindings: &Bindings) -> Result<()> {
        for (key, entry) in &bindings.properties {
            let class = self.owner(key)?;
            let property = entry.member;
            let binding = entry.binding;
            let name = binding.name.as_deref().unwrap_or(&property.name);
            let ty = self.types.resolve(&property.ty);

            let node = match self.builder.child(class, name) {
                Some(existing) if self.builder.node(existing).tag() == NodeTag::Property => existing,
                _ => self
                    .builder
                    .add_child(class, name, NodeKind::Property(PropertyNode::default())),
            };
            self.builder.set_type(node, ty);
            self.builder.set_host_name(node, &property.name);

            let scope = SourceScope {
                document: entry.document,
                file: binding
                    .file
                    .as_deref()
                    .or_else(|| bindings.class_file(&key.owner)),
            };

            // Static properties have no receiver parameter
            let (mut names, mut types) = if property.is_static {
                (Vec::new(), Vec::new())
            } else {
                (vec![SELF_PARAM.to_string()], vec![Type::Class(class)])
            };

            if property.getter.is_some() {
                let path = binding.getter_path.as_deref().unwrap_or(name);
                let getter = self.bind_accessor(class, node, GETTER_KEY, path, &names, &types, &scope)?;
                self.builder.set_return_type(getter, ty);
            }

            if property.setter.is_some() {
                names.push(VALUE_PARAM.to_string());
                types.push(ty);
                let path = binding.setter_path.as_deref().unwrap_or(name);
                let setter = self.bind_accessor(class, node, SETTER_KEY, path, &names, &types, &scope)?;
                self.builder.set_return_type(setter, Type::NONE);
            }

            self.members.insert(key.clone(), node);
            tracing::debug!("Bound property {}.{} : {}", key.owner, name, self.builder.type_name(ty));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_accessor(
        &mut self,
        class: NodeId,
        property: NodeId,
        accessor_key: &str,
        path: &str,
        names: &[String],
        types: &[Type],
        scope: &SourceScope,
    ) -> Result<NodeId> {
        let function = match self.find_source_function(class, path, scope)? {
            Some(function) => {
                self.builder.link(property, accessor_key, function);
                self.type_parameters(function, types);
                function
            }
            None => self.add_bodyless_function(property, accessor_key, names, types),
        };
        self.bound_functions.insert(function);
        Ok(function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingWalker;
    use crate::host::HostProject;
    use tempfile::TempDir;

    const VECTOR_PY: &str = "\
class Vector:
    def add(self, x):
        return self.value + x

    def scale(self, factor=2):
        return self.value * factor

    def get_length(self):
        return self.value

def combine(a, b):
    return a
";

    fn manifest(extra_members: &str) -> String {
        format!(
            r#"{{
            "documents": [{{
                "path": "Vector.cs",
                "namespaces": [{{
                    "name": "Geometry",
                    "types": [{{
                        "name": "Vector",
                        "bindings": [{{"kind": "class", "module": "shapes", "classPath": "Vector", "file": "vector.py"}}],
                        "members": [
                            {{"member": "field", "name": "Value", "type": "int",
                             "bindings": [{{"kind": "field", "name": "value"}}]}},
                            {{"member": "method", "name": "Add", "return_type": "int",
                             "params": [{{"name": "x", "type": "int"}}],
                             "bindings": [{{"kind": "method", "functionPath": "add", "generate": true}}]}},
                            {{"member": "method", "name": "Plus", "is_static": true, "return_type": "Vector",
                             "params": [{{"name": "a", "type": "Vector"}}, {{"name": "b", "type": "Vector"}}],
                             "bindings": [{{"kind": "operator", "operator": "Add"}}]}},
                            {{"member": "property", "name": "Length", "type": "int", "getter": {{}}, "setter": {{}},
                             "bindings": [{{"kind": "property", "getterPath": "get_length"}}]}}
                            {}
                        ]
                    }}]
                }}]
            }}]
        }}"#,
            extra_members
        )
    }

    fn bind(dir: &TempDir, manifest: &str) -> Result<BoundGraph> {
        std::fs::write(dir.path().join("vector.py"), VECTOR_PY).unwrap();
        let mut project: HostProject = serde_json::from_str(manifest).unwrap();
        project.documents[0].path = dir.path().join("Vector.cs");

        let bindings = BindingWalker::walk(&project);
        let mut cache = SourceCache::with_tree_sitter().unwrap();
        let locator = SourceLocator::default();
        GraphBinder::new(&mut cache, &locator).bind(&bindings)
    }

    fn member_key(index: usize) -> MemberKey {
        MemberKey {
            owner: TypeKey("Geometry.Vector".to_string()),
            index,
        }
    }

    #[test]
    fn test_passes_resolve_types() {
        let dir = TempDir::new().unwrap();
        let bound = bind(&dir, &manifest("")).unwrap();
        let graph = &bound.graph;

        let core = graph.module(CORE_MODULE).unwrap();
        assert_eq!(graph.children(core).count(), 4);
        assert!(bound.types.primitive_node(Primitive::Int).is_some());

        let vector = bound.class(&TypeKey("Geometry.Vector".to_string())).unwrap();
        assert_eq!(graph.descendant(graph.root(), "shapes.Vector"), Some(vector));
        assert!(graph.class(vector).unwrap().extracted);
        assert_eq!(graph.host_name(vector), "Vector");

        let field = bound.member(&member_key(0)).unwrap();
        assert_eq!(graph.member_type(field), Type::INT);
        assert_eq!(graph.host_name(field), "Value");

        // the extracted function is reused, body and all
        let add = bound.member(&member_key(1)).unwrap();
        assert_eq!(graph.child(vector, "add"), Some(add));
        let add_fn = graph.function(add).unwrap();
        assert!(add_fn.definition.is_some());
        assert_eq!(add_fn.return_type, Type::INT);
        assert_eq!(graph.parameter_types(add), vec![Type::Class(vector), Type::INT]);
        assert_eq!(graph.host_name(add), "Add");
        assert!(bound.bound_functions.contains(&add));

        // the other module-level function is still reachable through the module
        assert!(graph.descendant(graph.root(), "shapes.combine").is_some());
    }

    #[test]
    fn test_operator_and_property_functions() {
        let dir = TempDir::new().unwrap();
        let bound = bind(&dir, &manifest("")).unwrap();
        let graph = &bound.graph;
        let vector = bound.class(&TypeKey("Geometry.Vector".to_string())).unwrap();

        let plus = bound.operators[&member_key(2)];
        assert_eq!(graph.child(vector, "@operator.Add"), Some(plus));
        assert_eq!(graph.function(plus).unwrap().return_type, Type::Class(vector));
        assert_eq!(
            graph.parameter_types(plus),
            vec![Type::Class(vector), Type::Class(vector)]
        );
        assert!(graph.function(plus).unwrap().definition.is_none());

        let length = bound.member(&member_key(3)).unwrap();
        let getter = graph.child(length, GETTER_KEY).unwrap();
        let setter = graph.child(length, SETTER_KEY).unwrap();
        assert_eq!(getter, graph.child(vector, "get_length").unwrap());
        assert_eq!(graph.function(getter).unwrap().return_type, Type::INT);
        assert_eq!(graph.function(setter).unwrap().return_type, Type::NONE);
        let setter_params: Vec<&str> = graph.parameters(setter).into_iter().map(|(_, n, _)| n).collect();
        assert_eq!(setter_params, vec!["self", "value"]);
        assert_eq!(graph.parameter_types(setter), vec![Type::Class(vector), Type::INT]);
    }

    #[test]
    fn test_static_receiver_must_be_a_class() {
        let dir = TempDir::new().unwrap();
        let extra = r#", {"member": "method", "name": "Twice", "is_static": true, "return_type": "int",
                         "params": [{"name": "n", "type": "int"}],
                         "bindings": [{"kind": "method", "functionPath": "twice"}]}"#;
        let result = bind(&dir, &manifest(extra));
        assert!(matches!(result, Err(Error::AmbiguousStaticReceiver(_))));
    }

    #[test]
    fn test_static_free_function_binds_to_receiver_class() {
        let dir = TempDir::new().unwrap();
        let extra = r#", {"member": "method", "name": "Combine", "is_static": true, "return_type": "Vector",
                         "params": [{"name": "a", "type": "Vector"}, {"name": "b", "type": "Vector"}],
                         "bindings": [{"kind": "method", "functionPath": "combine", "generate": true}]}"#;
        let bound = bind(&dir, &manifest(extra)).unwrap();
        let graph = &bound.graph;
        let vector = bound.class(&TypeKey("Geometry.Vector".to_string())).unwrap();

        let combine = bound.member(&member_key(4)).unwrap();
        assert_eq!(graph.child(vector, "combine"), Some(combine));
        assert!(graph.function(combine).unwrap().definition.is_some());
        assert_eq!(graph.parameter_types(combine), vec![Type::Class(vector), Type::Class(vector)]);
        let host = graph.function(combine).unwrap().host.clone().unwrap();
        assert!(host.is_static);
        assert_eq!(host.owner, "Vector");
    }

    #[test]
    fn test_member_on_unbound_type_is_fatal() {
        let dir = TempDir::new().unwrap();
        let manifest = r#"{
            "documents": [{"path": "X.cs", "namespaces": [{"name": "", "types": [{
                "name": "Loose",
                "members": [{"member": "field", "name": "A", "type": "int", "bindings": [{"kind": "field"}]}]
            }]}]}]
        }"#;
        let result = bind(&dir, manifest);
        assert!(matches!(result, Err(Error::UnregisteredType(name)) if name == "Loose"));
    }

    #[test]
    fn test_missing_class_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let manifest = manifest("").replace("vector.py", "absent.py");
        assert!(matches!(bind(&dir, &manifest), Err(Error::SourceNotFound(_))));
    }
}
