//! Binding descriptors
//!
//! A descriptor ties one host declaration to one coordinate in the entity
//! graph. In a host manifest they appear as `{"kind": "method", ...}` objects
//! in a declaration's `bindings` list.

use crate::python::BinaryOp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingDescriptor {
    Class(ClassBinding),
    Field(FieldBinding),
    Method(MethodBinding),
    Operator(OperatorBinding),
    Property(PropertyBinding),
}

impl BindingDescriptor {
    pub fn kind(&self) -> BindingKind {
        match self {
            BindingDescriptor::Class(_) => BindingKind::Class,
            BindingDescriptor::Field(_) => BindingKind::Field,
            BindingDescriptor::Method(_) => BindingKind::Method,
            BindingDescriptor::Operator(_) => BindingKind::Operator,
            BindingDescriptor::Property(_) => BindingKind::Property,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Class,
    Field,
    Method,
    Operator,
    Property,
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BindingKind::Class => "class",
            BindingKind::Field => "field",
            BindingKind::Method => "method",
            BindingKind::Operator => "operator",
            BindingKind::Property => "property",
        };
        write!(f, "{}", name)
    }
}

/// Binds a host type to `module` + dotted `classPath`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBinding {
    pub module: String,
    pub class_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Synthesize host methods for every unbound Python function of the class
    #[serde(default)]
    pub generate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBinding {
    /// Python attribute name, the host field name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBinding {
    /// Function name, dotted when it lives below the bound class
    pub function_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub generate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorBinding {
    pub operator: OperatorKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyBinding {
    /// Python property name, the host property name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub generate: bool,
}

/// Python operators a host operator method can implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
    LeftShift,
    RightShift,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Add => "Add",
            OperatorKind::Subtract => "Subtract",
            OperatorKind::Multiply => "Multiply",
            OperatorKind::Divide => "Divide",
            OperatorKind::FloorDivide => "FloorDivide",
            OperatorKind::Modulo => "Modulo",
            OperatorKind::Power => "Power",
            OperatorKind::LeftShift => "LeftShift",
            OperatorKind::RightShift => "RightShift",
            OperatorKind::BitwiseOr => "BitwiseOr",
            OperatorKind::BitwiseXor => "BitwiseXor",
            OperatorKind::BitwiseAnd => "BitwiseAnd",
        }
    }

    /// Reserved children key of the function implementing this operator
    pub fn graph_key(&self) -> String {
        format!("@operator.{}", self.as_str())
    }

    pub fn from_binary(op: BinaryOp) -> Option<Self> {
        Some(match op {
            BinaryOp::Add => OperatorKind::Add,
            BinaryOp::Sub => OperatorKind::Subtract,
            BinaryOp::Mul => OperatorKind::Multiply,
            BinaryOp::Div => OperatorKind::Divide,
            BinaryOp::FloorDiv => OperatorKind::FloorDivide,
            BinaryOp::Mod => OperatorKind::Modulo,
            BinaryOp::Pow => OperatorKind::Power,
            BinaryOp::LShift => OperatorKind::LeftShift,
            BinaryOp::RShift => OperatorKind::RightShift,
            BinaryOp::BitOr => OperatorKind::BitwiseOr,
            BinaryOp::BitXor => OperatorKind::BitwiseXor,
            BinaryOp::BitAnd => OperatorKind::BitwiseAnd,
            BinaryOp::MatMul => return None,
        })
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
