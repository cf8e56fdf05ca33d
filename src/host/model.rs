//! Host project model
//!
//! A compiled host project as the generator sees it: documents holding
//! namespaces, types and members, with binding descriptors on each
//! declaration. Manifests are JSON files produced by the host build.

use super::syntax::{Block, Expr};
use crate::bindings::BindingDescriptor;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documents: Vec<HostDocument>,
}

impl HostProject {
    /// Load a project manifest. Relative document paths are resolved
    /// against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut project: HostProject = serde_json::from_str(&contents)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for document in &mut project.documents {
            if document.path.is_relative() {
                document.path = base.join(&document.path);
            }
        }
        Ok(project)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every type in the project with its qualified name
    pub fn types(&self) -> Vec<(String, &HostType)> {
        let mut out = Vec::new();
        for document in &self.documents {
            for namespace in &document.namespaces {
                namespace.collect_types("", &mut out);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostDocument {
    /// Source path of the document, used to find colocated Python files
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usings: Vec<String>,
    #[serde(default)]
    pub namespaces: Vec<HostNamespace>,
}

impl HostDocument {
    /// Directory colocated Python sources are searched in
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostNamespace {
    pub name: String,
    #[serde(default)]
    pub types: Vec<HostType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<HostNamespace>,
}

impl HostNamespace {
    /// Dotted name below `parent`
    pub fn qualified_name(&self, parent: &str) -> String {
        qualify(parent, &self.name)
    }

    fn collect_types<'a>(&'a self, parent: &str, out: &mut Vec<(String, &'a HostType)>) {
        let name = self.qualified_name(parent);
        for ty in &self.types {
            out.push((qualify(&name, &ty.name), ty));
        }
        for namespace in &self.namespaces {
            namespace.collect_types(&name, out);
        }
    }
}

pub(crate) fn qualify(parent: &str, name: &str) -> String {
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => parent.to_string(),
        _ => format!("{}.{}", parent, name),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingDescriptor>,
    #[serde(default)]
    pub members: Vec<HostMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum HostMember {
    Field(HostField),
    Method(HostMethod),
    Property(HostProperty),
}

impl HostMember {
    pub fn name(&self) -> &str {
        match self {
            HostMember::Field(f) => &f.name,
            HostMember::Method(m) => &m.name,
            HostMember::Property(p) => &p.name,
        }
    }

    pub fn bindings(&self) -> &[BindingDescriptor] {
        match self {
            HostMember::Field(f) => &f.bindings,
            HostMember::Method(m) => &m.bindings,
            HostMember::Property(p) => &p.bindings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: HostTypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMethod {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub params: Vec<HostParam>,
    #[serde(default)]
    pub return_type: HostTypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Block>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingDescriptor>,
    /// Comment lines placed before the declaration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: HostTypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: HostTypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<Accessor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingDescriptor>,
}

/// `get`/`set` accessor, auto-implemented when it has no body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Block>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

/// Host type as written in a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HostTypeRef {
    #[default]
    Void,
    Bool,
    Int,
    Double,
    String,
    /// Any other type by (possibly qualified) name
    Named(String),
}

impl HostTypeRef {
    pub fn as_str(&self) -> &str {
        match self {
            HostTypeRef::Void => "void",
            HostTypeRef::Bool => "bool",
            HostTypeRef::Int => "int",
            HostTypeRef::Double => "double",
            HostTypeRef::String => "string",
            HostTypeRef::Named(name) => name,
        }
    }
}

impl From<String> for HostTypeRef {
    fn from(name: String) -> Self {
        match name.as_str() {
            "void" => HostTypeRef::Void,
            "bool" | "System.Boolean" => HostTypeRef::Bool,
            "int" | "System.Int32" => HostTypeRef::Int,
            "double" | "System.Double" => HostTypeRef::Double,
            "string" | "System.String" => HostTypeRef::String,
            _ => HostTypeRef::Named(name),
        }
    }
}

impl From<HostTypeRef> for String {
    fn from(ty: HostTypeRef) -> Self {
        ty.as_str().to_string()
    }
}

impl std::fmt::Display for HostTypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a host type: its namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey(pub String);

impl TypeKey {
    /// Last segment of the qualified name
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a host member: owning type plus position in its member list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey {
    pub owner: TypeKey,
    pub index: usize,
}
