//! Host type ↔ graph type correspondence

use crate::graph::{Graph, NodeId, Primitive, Type};
use crate::host::{HostTypeRef, TypeKey};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Host types registered while binding
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    primitives: IndexMap<Primitive, NodeId>,
    classes: IndexMap<TypeKey, NodeId>,
    /// Simple name → qualified keys, for manifests that omit namespaces
    simple_names: HashMap<String, Vec<TypeKey>>,
}

impl TypeTable {
    pub fn register_primitive(&mut self, primitive: Primitive, node: NodeId) {
        self.primitives.insert(primitive, node);
    }

    pub fn register_class(&mut self, key: TypeKey, node: NodeId) {
        let simple = self.simple_names.entry(key.simple_name().to_string()).or_default();
        if !simple.contains(&key) {
            simple.push(key.clone());
        }
        self.classes.insert(key, node);
    }

    pub fn primitive_node(&self, primitive: Primitive) -> Option<NodeId> {
        self.primitives.get(&primitive).copied()
    }

    pub fn class(&self, key: &TypeKey) -> Option<NodeId> {
        self.classes.get(key).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = (&TypeKey, NodeId)> {
        self.classes.iter().map(|(key, id)| (key, *id))
    }

    /// Look a named host type up by qualified name, or by simple name when
    /// that is unambiguous.
    pub fn class_by_name(&self, name: &str) -> Option<NodeId> {
        let key = TypeKey(name.to_string());
        if let Some(id) = self.class(&key) {
            return Some(id);
        }
        match self.simple_names.get(name).map(Vec::as_slice) {
            Some([only]) => self.class(only),
            _ => None,
        }
    }

    /// Graph type of a host type, `Unknown` when the type is not registered
    pub fn resolve(&self, ty: &HostTypeRef) -> Type {
        match ty {
            HostTypeRef::Void => Type::NONE,
            HostTypeRef::Bool => Type::BOOL,
            HostTypeRef::Int => Type::INT,
            HostTypeRef::Double => Type::FLOAT,
            HostTypeRef::String => Type::STR,
            HostTypeRef::Named(name) => self
                .class_by_name(name)
                .map(Type::Class)
                .unwrap_or(Type::Unknown),
        }
    }
}

/// Host spelling of a graph type. Unknown types become `object`.
pub fn host_type(graph: &Graph, ty: Type) -> HostTypeRef {
    match ty {
        Type::Unknown => HostTypeRef::Named("object".to_string()),
        Type::Primitive(Primitive::None) => HostTypeRef::Void,
        Type::Primitive(Primitive::Bool) => HostTypeRef::Bool,
        Type::Primitive(Primitive::Int) => HostTypeRef::Int,
        Type::Primitive(Primitive::Float) => HostTypeRef::Double,
        Type::Primitive(Primitive::Str) => HostTypeRef::String,
        Type::Class(id) => HostTypeRef::Named(graph.host_name(id).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_primitives_and_classes() {
        let mut table = TypeTable::default();
        table.register_class(TypeKey("Geometry.Vector".to_string()), NodeId(3));
        table.register_class(TypeKey("Geometry.Point".to_string()), NodeId(4));
        table.register_class(TypeKey("Other.Point".to_string()), NodeId(5));

        assert_eq!(table.resolve(&HostTypeRef::Int), Type::INT);
        assert_eq!(table.resolve(&HostTypeRef::Void), Type::NONE);
        assert_eq!(
            table.resolve(&HostTypeRef::Named("Geometry.Vector".to_string())),
            Type::Class(NodeId(3))
        );
        assert_eq!(
            table.resolve(&HostTypeRef::Named("Vector".to_string())),
            Type::Class(NodeId(3))
        );
        // ambiguous simple name
        assert_eq!(table.resolve(&HostTypeRef::Named("Point".to_string())), Type::Unknown);
        assert_eq!(
            table.resolve(&HostTypeRef::Named("Other.Point".to_string())),
            Type::Class(NodeId(5))
        );
        assert_eq!(table.resolve(&HostTypeRef::Named("Missing".to_string())), Type::Unknown);
    }
}
