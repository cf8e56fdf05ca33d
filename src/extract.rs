//! Structure Extractor - Python files into entity graph nodes
//!
//! Walks the direct statement sequence of a block:
//! 1. `class` statements become Class nodes, their bodies extracted recursively
//! 2. `def` statements become Function nodes with Parameter children
//! 3. Everything else is skipped
//!
//! After a class body is extracted, the first parameter of each of its direct
//! functions is typed to the class.

use crate::graph::{
    ClassNode, FunctionNode, GraphBuilder, ModuleNode, NodeId, NodeKind, NodeTag, ParameterNode, Type,
};
use crate::python::{ClassDef, FunctionDef, Stmt};
use crate::translator::TranslatorState;
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Adds extracted nodes to a graph under construction
pub struct StructureExtractor<'g> {
    builder: &'g mut GraphBuilder,
}

impl<'g> StructureExtractor<'g> {
    pub fn new(builder: &'g mut GraphBuilder) -> Self {
        Self { builder }
    }

    /// Extract a parsed file into a new module node that no parent
    /// references yet. Returns the file root.
    pub fn extract_file(&mut self, name: &str, source: Option<PathBuf>, root: &Stmt) -> Result<NodeId> {
        let file_root = self
            .builder
            .add_detached(name, NodeKind::Module(ModuleNode { source }));
        self.extract_children(file_root, root, &TranslatorState::empty(), name)?;

        tracing::debug!(
            "Extracted {} top-level entities from {}",
            self.builder.children(file_root).count(),
            name
        );
        Ok(file_root)
    }

    fn extract_children(
        &mut self,
        parent: NodeId,
        block: &Stmt,
        state: &TranslatorState,
        context: &str,
    ) -> Result<()> {
        let Stmt::Suite(statements) = block else {
            return Err(Error::MalformedBlock(format!(
                "{} (found {})",
                context,
                block.kind_name()
            )));
        };

        for statement in statements {
            match statement {
                Stmt::ClassDef(def) => {
                    self.class(parent, def, state, context)?;
                }
                Stmt::FunctionDef(def) => {
                    self.function(parent, def, state);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn class(&mut self, parent: NodeId, def: &ClassDef, state: &TranslatorState, context: &str) -> Result<NodeId> {
        let class = self.builder.add_child(
            parent,
            &def.name,
            NodeKind::Class(ClassNode {
                host_name: None,
                extracted: true,
            }),
        );
        let context = format!("{}.{}", context, def.name);
        self.extract_children(class, &def.body, state, &context)?;

        let functions: Vec<NodeId> = self
            .builder
            .children(class)
            .filter(|(_, id)| self.builder.node(*id).tag() == NodeTag::Function)
            .map(|(_, id)| id)
            .collect();
        for function in functions {
            let receiver = self.builder.children(function).next().map(|(_, id)| id);
            if let Some(receiver) = receiver {
                self.builder.set_type(receiver, Type::Class(class));
            }
        }
        Ok(class)
    }

    fn function(&mut self, parent: NodeId, def: &FunctionDef, state: &TranslatorState) -> NodeId {
        let function = self.builder.add_child(
            parent,
            &def.name,
            NodeKind::Function(FunctionNode {
                return_type: Type::Unknown,
                definition: Some(Arc::new(def.clone())),
                scope: state.clone(),
                host: None,
            }),
        );
        for param in &def.params {
            self.builder.add_child(
                function,
                &param.name,
                NodeKind::Parameter(ParameterNode {
                    ty: Type::Unknown,
                    default: param.default.clone(),
                }),
            );
        }
        function
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::python::{Expr, Param, PythonParser, TreeSitterParser};
    use std::path::Path;

    fn extract(source: &str) -> (crate::graph::Graph, NodeId) {
        let parser = TreeSitterParser::new().unwrap();
        let ast = parser.parse(source, Path::new("test.py")).unwrap();
        let mut builder = GraphBuilder::new();
        let root = StructureExtractor::new(&mut builder)
            .extract_file("test", None, &ast)
            .unwrap();
        (builder.finalize(), root)
    }

    #[test]
    fn test_class_and_receiver_type() {
        let (graph, root) = extract(
            "import os\n\nclass Vector:\n    def add(self, x, y=2):\n        return self.value + x\n\n    def empty():\n        pass\n\ndef helper(a):\n    return a\n",
        );

        let names: Vec<&str> = graph.children(root).map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Vector", "helper"]);

        let vector = graph.child(root, "Vector").unwrap();
        assert!(graph.class(vector).unwrap().extracted);

        let add = graph.child(vector, "add").unwrap();
        let params = graph.parameters(add);
        assert_eq!(
            params.iter().map(|(_, name, _)| *name).collect::<Vec<_>>(),
            vec!["self", "x", "y"]
        );
        assert_eq!(graph.parameter_types(add), vec![Type::Class(vector), Type::Unknown, Type::Unknown]);
        assert_eq!(params[2].2.default, Some(Expr::int(2)));
        assert_eq!(graph.function(add).unwrap().return_type, Type::Unknown);
        assert!(graph.function(add).unwrap().definition.is_some());

        let empty = graph.child(vector, "empty").unwrap();
        assert!(graph.parameters(empty).is_empty());

        let helper = graph.child(root, "helper").unwrap();
        assert_eq!(graph.parameter_types(helper), vec![Type::Unknown]);
    }

    #[test]
    fn test_nested_classes_do_not_flatten() {
        let (graph, root) = extract(
            "class Outer:\n    class Inner:\n        def run(self):\n            pass\n    def run(self):\n        pass\n",
        );

        let outer = graph.child(root, "Outer").unwrap();
        let inner = graph.descendant(root, "Outer.Inner").unwrap();
        let inner_run = graph.child(inner, "run").unwrap();
        let outer_run = graph.child(outer, "run").unwrap();

        assert_ne!(inner_run, outer_run);
        assert_eq!(graph.parameter_types(inner_run), vec![Type::Class(inner)]);
        assert_eq!(graph.parameter_types(outer_run), vec![Type::Class(outer)]);
        assert!(graph.child(root, "Inner").is_none());
    }

    #[test]
    fn test_malformed_class_body_is_fatal() {
        let ast = Stmt::Suite(vec![Stmt::ClassDef(ClassDef {
            name: "Broken".to_string(),
            bases: Vec::new(),
            body: Box::new(Stmt::Pass),
        })]);
        let mut builder = GraphBuilder::new();
        let result = StructureExtractor::new(&mut builder).extract_file("broken", None, &ast);
        assert!(matches!(result, Err(Error::MalformedBlock(_))));

        let not_a_suite = Stmt::FunctionDef(FunctionDef {
            name: "f".to_string(),
            params: vec![Param::positional("a")],
            body: Box::new(Stmt::Suite(Vec::new())),
        });
        let result = StructureExtractor::new(&mut builder).extract_file("flat", None, &not_a_suite);
        assert!(matches!(result, Err(Error::MalformedBlock(_))));
    }
}
