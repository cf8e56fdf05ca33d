//! Entity Graph - in-memory model of Python entities and their types
//!
//! The graph is built in two phases. A [`GraphBuilder`] owns the arena while
//! extraction and binding add nodes and resolve type slots; `finalize` then
//! yields a read-only [`Graph`] that translation shares freely.

pub mod node;
pub mod types;

pub use node::{
    ClassNode, FieldNode, FunctionNode, HostMethodRef, ModuleNode, Node, NodeId, NodeKind, NodeTag, ParameterNode,
    PropertyNode, GETTER_KEY, SETTER_KEY,
};
pub use types::{Primitive, Type};

use crate::{Error, Result};
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_BUILDER: AtomicU32 = AtomicU32::new(0);

/// Identity of one [`GraphBuilder`]. Node ids are only meaningful inside
/// the builder that handed them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderId(u32);

/// Read-only entity graph
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Graph {
    /// The unnamed root whose children are modules
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct child by name
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id).children.get(name).copied()
    }

    /// Direct children in registration order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.node(id)
            .children
            .iter()
            .map(|(name, child)| (name.as_str(), *child))
    }

    /// Walk a dotted path (`Outer.Inner.method`) below `id`
    pub fn descendant(&self, id: NodeId, path: &str) -> Option<NodeId> {
        path.split('.')
            .try_fold(id, |current, part| self.child(current, part))
    }

    pub fn module(&self, name: &str) -> Option<NodeId> {
        self.child(self.root, name)
            .filter(|id| self.node(*id).tag() == NodeTag::Module)
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassNode> {
        match &self.node(id).kind {
            NodeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<&FunctionNode> {
        match &self.node(id).kind {
            NodeKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn parameter(&self, id: NodeId) -> Option<&ParameterNode> {
        match &self.node(id).kind {
            NodeKind::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    /// Parameters of a function, in order
    pub fn parameters(&self, function: NodeId) -> Vec<(NodeId, &str, &ParameterNode)> {
        self.children(function)
            .filter_map(|(name, id)| self.parameter(id).map(|p| (id, name, p)))
            .collect()
    }

    pub fn parameter_types(&self, function: NodeId) -> Vec<Type> {
        self.parameters(function)
            .into_iter()
            .map(|(_, _, p)| p.ty)
            .collect()
    }

    /// Type a member access on this node yields: a field's declared type,
    /// `Unknown` for any other member kind.
    pub fn member_type(&self, id: NodeId) -> Type {
        match &self.node(id).kind {
            NodeKind::Field(field) => field.ty,
            _ => Type::Unknown,
        }
    }

    /// Host name a member or class is bound to, falling back to its Python name
    pub fn host_name(&self, id: NodeId) -> &str {
        let bound = match &self.node(id).kind {
            NodeKind::Class(c) => c.host_name.as_deref(),
            NodeKind::Function(f) => f.host.as_ref().map(|h| h.name.as_str()),
            NodeKind::Field(f) => f.host_name.as_deref(),
            NodeKind::Property(p) => p.host_name.as_deref(),
            _ => None,
        };
        bound.unwrap_or_else(|| self.name(id))
    }

    /// Python-facing name of a type, `?` when unknown
    pub fn type_name(&self, ty: Type) -> String {
        match ty {
            Type::Unknown => "?".to_string(),
            Type::Primitive(p) => p.as_str().to_string(),
            Type::Class(id) => self.name(id).to_string(),
        }
    }

    /// Number of nodes per kind
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in &self.nodes {
            match node.tag() {
                NodeTag::Module => stats.modules += 1,
                NodeTag::Class => stats.classes += 1,
                NodeTag::Function => stats.functions += 1,
                NodeTag::Field => stats.fields += 1,
                NodeTag::Property => stats.properties += 1,
                NodeTag::Parameter => stats.parameters += 1,
                NodeTag::PrimitiveType => stats.primitives += 1,
            }
        }
        stats
    }
}

/// Statistics about an entity graph
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub modules: usize,
    pub classes: usize,
    pub functions: usize,
    pub fields: usize,
    pub properties: usize,
    pub parameters: usize,
    pub primitives: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Entity Graph Statistics:")?;
        writeln!(f, "  Modules: {}", self.modules)?;
        writeln!(f, "  Classes: {} (primitives: {})", self.classes, self.primitives)?;
        writeln!(f, "  Functions: {} (parameters: {})", self.functions, self.parameters)?;
        writeln!(f, "  Fields: {}, Properties: {}", self.fields, self.properties)
    }
}

/// Mutable graph under construction
#[derive(Debug)]
pub struct GraphBuilder {
    id: BuilderId,
    graph: Graph,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for GraphBuilder {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.graph
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        let root = Node::new("", NodeKind::Module(ModuleNode::default()));
        Self {
            id: BuilderId(NEXT_BUILDER.fetch_add(1, Ordering::Relaxed)),
            graph: Graph {
                nodes: vec![root],
                root: NodeId(0),
            },
        }
    }

    pub fn id(&self) -> BuilderId {
        self.id
    }

    /// Add a node that no parent references yet
    pub fn add_detached(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.graph.nodes.len() as u32);
        self.graph.nodes.push(Node::new(name, kind));
        id
    }

    /// Add a new node under `parent`, replacing any child of the same name
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let name = name.into();
        let id = self.add_detached(name.clone(), kind);
        self.link(parent, name, id);
        id
    }

    /// Reference an existing node from `parent` under `name`
    pub fn link(&mut self, parent: NodeId, name: impl Into<String>, child: NodeId) {
        self.node_mut(parent).children.insert(name.into(), child);
    }

    /// Existing child named `name`, or a new one built by `make`
    pub fn get_or_add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        make: impl FnOnce() -> NodeKind,
    ) -> NodeId {
        match self.child(parent, name) {
            Some(existing) => existing,
            None => self.add_child(parent, name, make()),
        }
    }

    pub fn get_or_add_module(&mut self, name: &str) -> NodeId {
        let root = self.root();
        self.get_or_add_child(root, name, || NodeKind::Module(ModuleNode::default()))
    }

    /// Resolve a dotted class path below `parent`, creating bare classes
    /// for every missing segment.
    pub fn get_or_add_class(&mut self, parent: NodeId, path: &str) -> Result<NodeId> {
        let mut current = parent;
        for part in path.split('.') {
            current = self.get_or_add_child(current, part, NodeKind::bare_class);
            if self.node(current).tag() != NodeTag::Class {
                return Err(Error::NodeNotFound(format!(
                    "`{}` in `{}` is a {}, not a class",
                    part,
                    path,
                    self.node(current).tag()
                )));
            }
        }
        Ok(current)
    }

    /// Merge the top-level entities extracted from a file into a module.
    /// Entities the module already has keep their node.
    pub fn attach_source(&mut self, module: NodeId, file_root: NodeId) {
        let entries: Vec<(String, NodeId)> = self
            .node(file_root)
            .children
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        let source = match &self.node(file_root).kind {
            NodeKind::Module(m) => m.source.clone(),
            _ => None,
        };

        let node = self.node_mut(module);
        for (name, id) in entries {
            node.children.entry(name).or_insert(id);
        }
        if let NodeKind::Module(m) = &mut node.kind {
            if m.source.is_none() {
                m.source = source;
            }
        }
    }

    /// Resolve the type slot of a parameter, field or property
    pub fn set_type(&mut self, id: NodeId, ty: Type) {
        let name = self.name(id).to_string();
        let slot = match &mut self.node_mut(id).kind {
            NodeKind::Parameter(p) => &mut p.ty,
            NodeKind::Field(f) => &mut f.ty,
            NodeKind::Property(p) => &mut p.ty,
            _ => return,
        };
        resolve_slot(slot, ty, &name);
    }

    pub fn set_return_type(&mut self, function: NodeId, ty: Type) {
        let name = self.name(function).to_string();
        if let NodeKind::Function(f) = &mut self.node_mut(function).kind {
            resolve_slot(&mut f.return_type, ty, &name);
        }
    }

    /// Record the host type or member a class, field or property is bound to
    pub fn set_host_name(&mut self, id: NodeId, host_name: impl Into<String>) {
        let host_name = Some(host_name.into());
        match &mut self.node_mut(id).kind {
            NodeKind::Class(c) => c.host_name = host_name,
            NodeKind::Field(f) => f.host_name = host_name,
            NodeKind::Property(p) => p.host_name = host_name,
            _ => {}
        }
    }

    /// Record the host method a function is bound to
    pub fn set_host_method(&mut self, function: NodeId, host: HostMethodRef) {
        if let NodeKind::Function(f) = &mut self.node_mut(function).kind {
            f.host = Some(host);
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.graph.nodes[id.index()]
    }

    /// Freeze the graph
    pub fn finalize(self) -> Graph {
        self.graph
    }
}

fn resolve_slot(slot: &mut Type, ty: Type, name: &str) {
    if !slot.is_unknown() && *slot != ty {
        tracing::warn!("Re-typing `{}`: {:?} -> {:?}", name, slot, ty);
    }
    *slot = ty;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function_kind() -> NodeKind {
        NodeKind::Function(FunctionNode::default())
    }

    #[test]
    fn test_distinct_class_paths_get_distinct_nodes() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("shapes");

        let a = builder.get_or_add_class(module, "Outer.A").unwrap();
        let b = builder.get_or_add_class(module, "Outer.B").unwrap();

        assert_ne!(a, b);
        assert_eq!(builder.descendant(module, "Outer.A"), Some(a));
        assert_eq!(builder.descendant(module, "Outer.B"), Some(b));
        assert_eq!(builder.descendant(module, "A"), None);
    }

    #[test]
    fn test_get_or_add_is_idempotent() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("shapes");
        assert_eq!(builder.get_or_add_module("shapes"), module);

        let first = builder.get_or_add_class(module, "Vector").unwrap();
        let second = builder.get_or_add_class(module, "Vector").unwrap();
        assert_eq!(first, second);

        let field = builder.get_or_add_child(first, "value", || NodeKind::Field(FieldNode::default()));
        let again = builder.get_or_add_child(first, "value", || NodeKind::Field(FieldNode::default()));
        assert_eq!(field, again);
    }

    #[test]
    fn test_same_method_name_under_two_classes() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("shapes");
        let circle = builder.get_or_add_class(module, "Circle").unwrap();
        let square = builder.get_or_add_class(module, "Square").unwrap();

        let circle_area = builder.add_child(circle, "area", function_kind());
        let square_area = builder.add_child(square, "area", function_kind());

        assert_ne!(circle_area, square_area);
        assert_eq!(builder.child(circle, "area"), Some(circle_area));
        assert_eq!(builder.child(square, "area"), Some(square_area));
    }

    #[test]
    fn test_class_path_through_function_fails() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("m");
        builder.add_child(module, "helper", function_kind());

        assert!(matches!(
            builder.get_or_add_class(module, "helper.Inner"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_type_slots_and_member_type() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("m");
        let class = builder.get_or_add_class(module, "Vector").unwrap();
        let field = builder.add_child(class, "value", NodeKind::Field(FieldNode::default()));
        let method = builder.add_child(class, "add", function_kind());
        let other = builder.add_child(class, "sub", function_kind());

        assert_eq!(builder.member_type(field), Type::Unknown);
        builder.set_type(field, Type::INT);
        builder.set_host_name(field, "Value");
        builder.set_host_method(
            other,
            HostMethodRef {
                name: "Subtract".to_string(),
                owner: "Vector".to_string(),
                is_static: true,
            },
        );

        let graph = builder.finalize();
        assert_eq!(graph.member_type(field), Type::INT);
        assert_eq!(graph.member_type(method), Type::Unknown);
        assert_eq!(graph.host_name(field), "Value");
        assert_eq!(graph.host_name(method), "add");
        assert_eq!(graph.host_name(other), "Subtract");
        assert_eq!(graph.type_name(Type::Class(class)), "Vector");
    }

    #[test]
    fn test_attach_source_keeps_existing_children() {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("m");
        let bare = builder.get_or_add_class(module, "Vector").unwrap();

        let file_root = builder.add_detached("vector", NodeKind::Module(ModuleNode::default()));
        let extracted = builder.add_child(file_root, "Vector", NodeKind::bare_class());
        let helper = builder.add_child(file_root, "helper", function_kind());

        builder.attach_source(module, file_root);

        assert_eq!(builder.child(module, "Vector"), Some(bare));
        assert_ne!(builder.child(module, "Vector"), Some(extracted));
        assert_eq!(builder.child(module, "helper"), Some(helper));
    }
}
