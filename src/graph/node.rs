//! Graph node types
//!
//! One tagged node type for every entity (module, class, function, field,
//! property, parameter, primitive). All of them share the same ordered,
//! name-keyed children map.

use super::types::{Primitive, Type};
use crate::python::{Expr, FunctionDef};
use crate::translator::TranslatorState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Children key of a property's getter function
pub const GETTER_KEY: &str = "get";
/// Children key of a property's setter function
pub const SETTER_KEY: &str = "set";

/// Index of a node inside its [`Graph`](super::Graph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named entity with ordered children
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub children: IndexMap<String, NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            children: IndexMap::new(),
        }
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Module(ModuleNode),
    Class(ClassNode),
    Function(FunctionNode),
    Field(FieldNode),
    Property(PropertyNode),
    Parameter(ParameterNode),
    PrimitiveType(Primitive),
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Module(_) => NodeTag::Module,
            NodeKind::Class(_) => NodeTag::Class,
            NodeKind::Function(_) => NodeTag::Function,
            NodeKind::Field(_) => NodeTag::Field,
            NodeKind::Property(_) => NodeTag::Property,
            NodeKind::Parameter(_) => NodeTag::Parameter,
            NodeKind::PrimitiveType(_) => NodeTag::PrimitiveType,
        }
    }

    /// Bare class registered without a Python body
    pub fn bare_class() -> Self {
        NodeKind::Class(ClassNode::default())
    }
}

/// Node kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Module,
    Class,
    Function,
    Field,
    Property,
    Parameter,
    PrimitiveType,
}

impl NodeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Module => "module",
            NodeTag::Class => "class",
            NodeTag::Function => "function",
            NodeTag::Field => "field",
            NodeTag::Property => "property",
            NodeTag::Parameter => "parameter",
            NodeTag::PrimitiveType => "primitive",
        }
    }
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleNode {
    /// File the module's children were extracted from
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassNode {
    /// Host type bound to this class
    pub host_name: Option<String>,
    /// True when the class came from a Python `class` statement
    pub extracted: bool,
}

/// A function. Its parameters are its children, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FunctionNode {
    pub return_type: Type,
    /// Python definition, absent for functions registered only from host bindings
    pub definition: Option<Arc<FunctionDef>>,
    /// Names visible where the function was defined
    pub scope: TranslatorState,
    /// Host method bound to this function
    pub host: Option<HostMethodRef>,
}

/// Host method a function is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMethodRef {
    pub name: String,
    /// Host type declaring the method
    pub owner: String,
    /// Static methods take the receiver as their first argument
    pub is_static: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FieldNode {
    pub ty: Type,
    pub host_name: Option<String>,
}

/// A property. Getter/setter functions live under [`GETTER_KEY`]/[`SETTER_KEY`].
#[derive(Debug, Clone, Default)]
pub struct PropertyNode {
    pub ty: Type,
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterNode {
    pub ty: Type,
    pub default: Option<Expr>,
}
