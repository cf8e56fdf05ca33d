//! Diagnostic dump of resolved bindings and the bound graph
//!
//! Read-only view for logging and the `dump` command. Types are rendered by
//! name so the dump stays readable without node ids.

use crate::bindings::{BindingKind, Bindings};
use crate::graph::{Graph, GraphStats, NodeId, NodeKind, NodeTag};
use crate::mapper::BoundGraph;
use crate::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingRow {
    pub kind: BindingKind,
    /// Host symbol carrying the binding
    pub symbol: String,
    /// Graph coordinate it names
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    /// Dotted path from the graph root
    pub path: String,
    pub tag: NodeTag,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dump {
    pub bindings: Vec<BindingRow>,
    pub nodes: Vec<NodeRow>,
    pub stats: GraphStats,
}

impl Dump {
    pub fn new(bindings: &Bindings, bound: &BoundGraph) -> Self {
        Self {
            bindings: binding_rows(bindings),
            nodes: node_rows(&bound.graph),
            stats: bound.graph.stats(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Dump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bindings:")?;
        for row in &self.bindings {
            writeln!(f, "  [{}] {} -> {}", row.kind, row.symbol, row.target)?;
        }
        writeln!(f, "Graph:")?;
        for row in &self.nodes {
            write!(f, "  {} {}", row.tag, row.path)?;
            if let Some(ty) = &row.ty {
                write!(f, " : {}", ty)?;
            }
            if let Some(host) = &row.host_name {
                write!(f, " => {}", host)?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", self.stats)
    }
}

fn binding_rows(bindings: &Bindings) -> Vec<BindingRow> {
    let mut rows = Vec::new();
    for (key, entry) in &bindings.classes {
        rows.push(BindingRow {
            kind: BindingKind::Class,
            symbol: key.to_string(),
            target: format!("{}:{}", entry.binding.module, entry.binding.class_path),
        });
    }
    for (key, entry) in &bindings.fields {
        rows.push(BindingRow {
            kind: BindingKind::Field,
            symbol: format!("{}.{}", key.owner, entry.member.name),
            target: entry.binding.name.clone().unwrap_or_else(|| entry.member.name.clone()),
        });
    }
    for (key, entry) in &bindings.methods {
        rows.push(BindingRow {
            kind: BindingKind::Method,
            symbol: format!("{}.{}", key.owner, entry.member.name),
            target: entry.binding.function_path.clone(),
        });
    }
    for (key, entry) in &bindings.operators {
        rows.push(BindingRow {
            kind: BindingKind::Operator,
            symbol: format!("{}.{}", key.owner, entry.member.name),
            target: entry.binding.operator.graph_key(),
        });
    }
    for (key, entry) in &bindings.properties {
        let paths: Vec<&str> = [&entry.binding.getter_path, &entry.binding.setter_path]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        rows.push(BindingRow {
            kind: BindingKind::Property,
            symbol: format!("{}.{}", key.owner, entry.member.name),
            target: if paths.is_empty() {
                entry.member.name.clone()
            } else {
                paths.join(", ")
            },
        });
    }
    rows
}

/// Depth-first walk from the root. A node linked under several parents is
/// listed once, at its first path.
fn node_rows(graph: &Graph) -> Vec<NodeRow> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    for (name, child) in graph.children(graph.root()) {
        walk(graph, child, name.to_string(), &mut seen, &mut rows);
    }
    rows
}

fn walk(graph: &Graph, id: NodeId, path: String, seen: &mut HashSet<NodeId>, rows: &mut Vec<NodeRow>) {
    if !seen.insert(id) {
        return;
    }
    let node = graph.node(id);
    let bound_name = graph.host_name(id);
    rows.push(NodeRow {
        path: path.clone(),
        tag: node.tag(),
        ty: type_label(graph, id),
        host_name: (bound_name != node.name && node.tag() != NodeTag::Module).then(|| bound_name.to_string()),
    });

    // parameters are folded into the function's signature label
    if node.tag() == NodeTag::Function {
        return;
    }
    for (name, child) in graph.children(id) {
        walk(graph, child, format!("{}.{}", path, name), seen, rows);
    }
}

fn type_label(graph: &Graph, id: NodeId) -> Option<String> {
    match &graph.node(id).kind {
        NodeKind::Field(field) => Some(graph.type_name(field.ty)),
        NodeKind::Property(property) => Some(graph.type_name(property.ty)),
        NodeKind::Parameter(param) => Some(graph.type_name(param.ty)),
        NodeKind::Function(function) => {
            let params: Vec<String> = graph
                .parameters(id)
                .into_iter()
                .map(|(_, name, param)| format!("{}: {}", name, graph.type_name(param.ty)))
                .collect();
            Some(format!(
                "({}) -> {}",
                params.join(", "),
                graph.type_name(function.return_type)
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingWalker;
    use crate::cache::{SourceCache, SourceLocator};
    use crate::host::HostProject;
    use crate::mapper::GraphBinder;
    use tempfile::TempDir;

    #[test]
    fn test_dump_lists_bindings_and_typed_nodes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("counter.py"),
            "class Counter:\n    def bump(self, by):\n        return self.count + by\n",
        )
        .unwrap();
        let manifest = r#"{
            "documents": [{
                "path": "Counter.cs",
                "namespaces": [{
                    "name": "App",
                    "types": [{
                        "name": "Counter",
                        "bindings": [{"kind": "class", "module": "counter", "classPath": "Counter", "file": "counter.py"}],
                        "members": [
                            {"member": "field", "name": "Count", "type": "int",
                             "bindings": [{"kind": "field", "name": "count"}]},
                            {"member": "method", "name": "Bump", "return_type": "int",
                             "params": [{"name": "by", "type": "int"}],
                             "bindings": [{"kind": "method", "functionPath": "bump", "generate": true}]}
                        ]
                    }]
                }]
            }]
        }"#;
        let mut project: HostProject = serde_json::from_str(manifest).unwrap();
        project.documents[0].path = dir.path().join("Counter.cs");

        let bindings = BindingWalker::walk(&project);
        let mut cache = SourceCache::with_tree_sitter().unwrap();
        let locator = SourceLocator::default();
        let bound = GraphBinder::new(&mut cache, &locator).bind(&bindings).unwrap();
        let dump = Dump::new(&bindings, &bound);

        assert_eq!(
            dump.bindings.iter().map(|row| row.kind).collect::<Vec<_>>(),
            vec![BindingKind::Class, BindingKind::Field, BindingKind::Method]
        );
        assert_eq!(dump.bindings[0].target, "counter:Counter");

        let bump = dump.nodes.iter().find(|row| row.path == "counter.Counter.bump").unwrap();
        assert_eq!(bump.ty.as_deref(), Some("(self: Counter, by: int) -> int"));
        assert_eq!(bump.host_name.as_deref(), Some("Bump"));

        let count = dump.nodes.iter().find(|row| row.path == "counter.Counter.count").unwrap();
        assert_eq!(count.tag, NodeTag::Field);
        assert_eq!(count.ty.as_deref(), Some("int"));

        let text = dump.to_string();
        assert!(text.contains("[method] App.Counter.Bump -> bump"));
        assert!(dump.to_json().unwrap().contains("\"host_name\": \"Bump\""));
    }
}
