//! Code Injector - splices translated bodies into host declarations
//!
//! Only members whose binding asks for generation are touched; everything
//! else is copied through unchanged, so hand-written and generated bodies
//! live side by side. Each document is rewritten into a new tree.

use crate::bindings::{BindingDescriptor, MethodBinding};
use crate::graph::{NodeId, Type, GETTER_KEY, SETTER_KEY};
use crate::host::model::qualify;
use crate::host::{
    Expr, HostDocument, HostMember, HostMethod, HostNamespace, HostProject, HostProperty, HostType,
    MemberKey, TypeKey,
};
use crate::mapper::{host_type, BoundGraph, VALUE_PARAM};
use crate::translator::{Translator, TranslatorState, TypedExpr};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct InjectorStats {
    /// Existing members whose bodies were replaced
    pub rewritten: usize,
    /// Methods synthesized for generate-flagged classes
    pub generated: usize,
    /// Diagnostic comments written into rewritten bodies
    pub diagnostics: usize,
}

impl fmt::Display for InjectorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Injector Stats:")?;
        writeln!(f, "  Rewritten: {}", self.rewritten)?;
        writeln!(f, "  Generated: {}", self.generated)?;
        writeln!(f, "  Diagnostics: {}", self.diagnostics)
    }
}

pub struct CodeInjector<'b> {
    bound: &'b BoundGraph,
    translator: Translator<'b>,
    stats: InjectorStats,
}

impl<'b> CodeInjector<'b> {
    pub fn new(bound: &'b BoundGraph) -> Self {
        Self {
            bound,
            translator: Translator::new(&bound.graph),
            stats: InjectorStats::default(),
        }
    }

    pub fn stats(&self) -> &InjectorStats {
        &self.stats
    }

    pub fn into_stats(self) -> InjectorStats {
        self.stats
    }

    /// Rewrite every document of `project`
    pub fn inject_project(&mut self, project: &HostProject) -> HostProject {
        HostProject {
            name: project.name.clone(),
            documents: project
                .documents
                .iter()
                .map(|document| self.inject_document(document))
                .collect(),
        }
    }

    pub fn inject_document(&mut self, document: &HostDocument) -> HostDocument {
        let mut output = document.clone();
        for namespace in &mut output.namespaces {
            self.inject_namespace(namespace, "");
        }
        output
    }

    fn inject_namespace(&mut self, namespace: &mut HostNamespace, parent: &str) {
        let name = namespace.qualified_name(parent);
        for ty in &mut namespace.types {
            let key = TypeKey(qualify(&name, &ty.name));
            self.inject_type(ty, &key);
        }
        for inner in &mut namespace.namespaces {
            self.inject_namespace(inner, &name);
        }
    }

    fn inject_type(&mut self, ty: &mut HostType, key: &TypeKey) {
        for (index, member) in ty.members.iter_mut().enumerate() {
            let member_key = MemberKey {
                owner: key.clone(),
                index,
            };
            let generates = match &*member {
                HostMember::Method(method) => method_generates(method),
                HostMember::Property(property) => property_generates(property),
                HostMember::Field(_) => false,
            };
            if !generates {
                continue;
            }
            match member {
                HostMember::Method(method) => self.rewrite_method(method, &member_key),
                HostMember::Property(property) => self.rewrite_property(property, &member_key),
                HostMember::Field(_) => {}
            }
        }

        if class_generates(ty) {
            self.generate_class_methods(ty, key);
        }
    }

    fn rewrite_method(&mut self, method: &mut HostMethod, key: &MemberKey) {
        let Some(function) = self.bound.member(key) else {
            tracing::warn!("No bound function for {}.{}", key.owner, method.name);
            return;
        };
        let host_names: Vec<String> = method.params.iter().map(|p| p.name.clone()).collect();
        let state = self.scope(function, !method.is_static, &host_names);

        let body = self.translator.translate_function(function, &state);
        self.stats.rewritten += 1;
        self.stats.diagnostics += body.diagnostics;
        method.body = Some(body.block);
        tracing::debug!("Rewrote {}.{}", key.owner, method.name);
    }

    fn rewrite_property(&mut self, property: &mut HostProperty, key: &MemberKey) {
        let Some(node) = self.bound.member(key) else {
            tracing::warn!("No bound property for {}.{}", key.owner, property.name);
            return;
        };
        let bound = self.bound;
        let graph = &bound.graph;
        let receiver = !property.is_static;

        let accessors = [
            (GETTER_KEY, property.getter.as_mut(), Vec::new()),
            (SETTER_KEY, property.setter.as_mut(), vec![VALUE_PARAM.to_string()]),
        ];
        for (accessor_key, accessor, host_names) in accessors {
            let (Some(accessor), Some(function)) = (accessor, graph.child(node, accessor_key)) else {
                continue;
            };
            let state = self.scope(function, receiver, &host_names);
            let body = self.translator.translate_function(function, &state);
            self.stats.diagnostics += body.diagnostics;
            accessor.body = Some(body.block);
        }

        self.stats.rewritten += 1;
        tracing::debug!("Rewrote property {}.{}", key.owner, property.name);
    }

    /// Synthesize a host method for every Python function of the bound class
    /// that no host member is bound to.
    fn generate_class_methods(&mut self, ty: &mut HostType, key: &TypeKey) {
        let Some(class) = self.bound.class(key) else {
            tracing::warn!("No bound class for {}", key);
            return;
        };
        let bound = self.bound;
        let graph = &bound.graph;
        let unbound: Vec<(String, NodeId)> = graph
            .children(class)
            .filter(|(_, id)| graph.function(*id).is_some() && !bound.bound_functions.contains(id))
            .map(|(name, id)| (name.to_string(), id))
            .collect();

        for (name, function) in unbound {
            let method = self.synthesize_method(&name, function, class);
            ty.members.push(HostMember::Method(method));
            self.stats.generated += 1;
            tracing::debug!("Generated {}.{}", key, name);
        }
    }

    fn synthesize_method(&mut self, name: &str, function: NodeId, class: NodeId) -> HostMethod {
        let bound = self.bound;
        let graph = &bound.graph;
        // functions whose first parameter is the class become instance methods
        let receiver = graph
            .parameter_types(function)
            .first()
            .is_some_and(|ty| *ty == Type::Class(class));

        let (params, comments) = match self.translator.signature(function, receiver) {
            Ok(params) => (params, Vec::new()),
            Err(diagnostics) => (Vec::new(), diagnostics.into_comments()),
        };
        let host_names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
        let state = self.scope(function, receiver, &host_names);
        let body = self.translator.translate_function(function, &state);
        self.stats.diagnostics += body.diagnostics + comments.len();

        HostMethod {
            name: name.to_string(),
            is_static: !receiver,
            is_constructor: false,
            params,
            return_type: host_type(graph, body.return_type),
            body: Some(body.block),
            bindings: vec![BindingDescriptor::Method(MethodBinding {
                function_path: name.to_string(),
                file: None,
                generate: true,
            })],
            comments,
        }
    }

    /// Starting scope of a bound function: the receiver as `this` when
    /// there is one, then the remaining Python parameters bound to the host
    /// parameter names by position.
    fn scope(&self, function: NodeId, receiver: bool, host_names: &[String]) -> TranslatorState {
        let graph = &self.bound.graph;
        let mut state = graph
            .function(function)
            .map(|f| f.scope.clone())
            .unwrap_or_default();

        let mut params = graph.parameters(function).into_iter();
        if receiver {
            if let Some((_, name, param)) = params.next() {
                state = state.with(name, TypedExpr::new(Expr::This, param.ty));
            }
        }
        for ((_, name, param), host_name) in params.zip(host_names) {
            state = state.with(name, TypedExpr::new(Expr::ident(host_name.clone()), param.ty));
        }
        state
    }
}

fn method_generates(method: &HostMethod) -> bool {
    method.bindings.iter().find_map(|binding| match binding {
        BindingDescriptor::Method(binding) => Some(binding.generate),
        _ => None,
    }) == Some(true)
}

fn property_generates(property: &HostProperty) -> bool {
    property.bindings.iter().find_map(|binding| match binding {
        BindingDescriptor::Property(binding) => Some(binding.generate),
        _ => None,
    }) == Some(true)
}

fn class_generates(ty: &HostType) -> bool {
    ty.bindings.iter().find_map(|binding| match binding {
        BindingDescriptor::Class(binding) => Some(binding.generate),
        _ => None,
    }) == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingWalker;
    use crate::cache::{SourceCache, SourceLocator};
    use crate::host::render::{render_block, render_document};
    use crate::mapper::GraphBinder;
    use tempfile::TempDir;

    const VECTOR_PY: &str = "\
class Vector:
    def add(self, x):
        return self.value + x

    def scale(self, factor=2):
        return self.value * factor

    def get_length(self):
        return self.value

    def set_length(self, v):
        self.value = v

    def broken(self):
        return self.value ** 2
";

    const MANIFEST: &str = r#"{
        "name": "Geometry",
        "documents": [{
            "path": "Vector.cs",
            "namespaces": [{
                "name": "Geometry",
                "types": [{
                    "name": "Vector",
                    "bindings": [{"kind": "class", "module": "shapes", "classPath": "Vector", "file": "vector.py", "generate": true}],
                    "members": [
                        {"member": "field", "name": "Value", "type": "int",
                         "bindings": [{"kind": "field", "name": "value"}]},
                        {"member": "method", "name": "Add", "return_type": "int",
                         "params": [{"name": "amount", "type": "int"}],
                         "bindings": [{"kind": "method", "functionPath": "add", "generate": true}]},
                        {"member": "method", "name": "Broken", "return_type": "int",
                         "bindings": [{"kind": "method", "functionPath": "broken"}]},
                        {"member": "property", "name": "Length", "type": "int", "getter": {}, "setter": {},
                         "bindings": [{"kind": "property", "getterPath": "get_length", "setterPath": "set_length", "generate": true}]}
                    ]
                }]
            }]
        }]
    }"#;

    fn project(dir: &TempDir) -> HostProject {
        std::fs::write(dir.path().join("vector.py"), VECTOR_PY).unwrap();
        let mut project: HostProject = serde_json::from_str(MANIFEST).unwrap();
        project.documents[0].path = dir.path().join("Vector.cs");
        project
    }

    fn bind(project: &HostProject) -> BoundGraph {
        let bindings = BindingWalker::walk(project);
        let mut cache = SourceCache::with_tree_sitter().unwrap();
        let locator = SourceLocator::default();
        GraphBinder::new(&mut cache, &locator).bind(&bindings).unwrap()
    }

    fn members(project: &HostProject) -> &[HostMember] {
        &project.documents[0].namespaces[0].types[0].members
    }

    #[test]
    fn test_generate_flag_rewrites_method_body() {
        let dir = TempDir::new().unwrap();
        let project = project(&dir);
        let bound = bind(&project);

        let mut injector = CodeInjector::new(&bound);
        let output = injector.inject_project(&project);

        let HostMember::Method(add) = &members(&output)[1] else {
            panic!("expected method");
        };
        assert_eq!(render_block(add.body.as_ref().unwrap()), "return this.Value + amount;\n");

        // not flagged for generation: left exactly as declared
        assert_eq!(members(&output)[2], members(&project)[2]);
    }

    #[test]
    fn test_property_accessors_are_rewritten() {
        let dir = TempDir::new().unwrap();
        let project = project(&dir);
        let bound = bind(&project);
        let output = CodeInjector::new(&bound).inject_project(&project);

        let HostMember::Property(length) = &members(&output)[3] else {
            panic!("expected property");
        };
        let getter = length.getter.as_ref().and_then(|a| a.body.as_ref()).unwrap();
        let setter = length.setter.as_ref().and_then(|a| a.body.as_ref()).unwrap();
        assert_eq!(render_block(getter), "return this.Value;\n");
        assert_eq!(render_block(setter), "this.Value = value;\n");
    }

    #[test]
    fn test_class_generation_adds_unbound_functions() {
        let dir = TempDir::new().unwrap();
        let project = project(&dir);
        let bound = bind(&project);
        let mut injector = CodeInjector::new(&bound);
        let output = injector.inject_project(&project);

        let generated: Vec<&HostMethod> = members(&output)[4..]
            .iter()
            .filter_map(|member| match member {
                HostMember::Method(method) => Some(method),
                _ => None,
            })
            .collect();
        let names: Vec<&str> = generated.iter().map(|m| m.name.as_str()).collect();
        // `broken` is bound (without generation) so it is not synthesized again
        assert_eq!(names, vec!["scale"]);

        let scale = generated[0];
        assert!(!scale.is_static);
        assert_eq!(scale.params.len(), 1);
        assert_eq!(scale.params[0].name, "factor");
        assert_eq!(scale.params[0].default, Some(Expr::int(2)));
        assert!(matches!(scale.bindings[0], BindingDescriptor::Method(MethodBinding { generate: true, .. })));
        // `factor` is untyped, so the product is too
        assert_eq!(scale.return_type, crate::host::HostTypeRef::Named("object".to_string()));

        let stats = injector.into_stats();
        assert_eq!(stats.rewritten, 2);
        assert_eq!(stats.generated, 1);

        let text = render_document(&output.documents[0]);
        assert!(text.contains("public partial class Vector"));
    }

    #[test]
    fn test_diagnostics_are_counted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vector.py"), VECTOR_PY).unwrap();
        let manifest = MANIFEST.replace(
            r#""bindings": [{"kind": "method", "functionPath": "broken"}]"#,
            r#""bindings": [{"kind": "method", "functionPath": "broken", "generate": true}]"#,
        );
        let mut project: HostProject = serde_json::from_str(&manifest).unwrap();
        project.documents[0].path = dir.path().join("Vector.cs");
        let bound = bind(&project);

        let mut injector = CodeInjector::new(&bound);
        let output = injector.inject_project(&project);
        let HostMember::Method(broken) = &members(&output)[2] else {
            panic!("expected method");
        };
        assert_eq!(
            broken.body.as_ref().unwrap().comments(),
            vec!["py2cs: Unsupported operator: **"]
        );
        assert_eq!(injector.stats().diagnostics, 1);
    }
}
