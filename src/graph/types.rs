//! Graph types
//!
//! A type is `Unknown`, a primitive, or nominally a bound class node.

use super::node::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    None,
    Int,
    Float,
    Bool,
    Str,
}

impl Primitive {
    /// Python spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::None => "None",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
        }
    }

    pub fn all() -> &'static [Primitive] {
        &[
            Primitive::None,
            Primitive::Int,
            Primitive::Float,
            Primitive::Bool,
            Primitive::Str,
        ]
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Primitive::Int | Primitive::Float)
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Type {
    #[default]
    Unknown,
    Primitive(Primitive),
    /// Nominal type of a class node
    Class(NodeId),
}

impl Type {
    pub const NONE: Type = Type::Primitive(Primitive::None);
    pub const INT: Type = Type::Primitive(Primitive::Int);
    pub const FLOAT: Type = Type::Primitive(Primitive::Float);
    pub const BOOL: Type = Type::Primitive(Primitive::Bool);
    pub const STR: Type = Type::Primitive(Primitive::Str);

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn as_class(&self) -> Option<NodeId> {
        match self {
            Type::Class(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}
