//! Binding Walker - collects binding descriptors from a host project
//!
//! One top-down pass: documents → namespaces → types → members. Each symbol
//! contributes at most one binding per kind; later duplicates are logged and
//! ignored. Cross-binding consistency is left to the graph binder.

use super::descriptor::{
    BindingDescriptor, BindingKind, ClassBinding, FieldBinding, MethodBinding, OperatorBinding,
    PropertyBinding,
};
use crate::host::model::qualify;
use crate::host::{HostDocument, HostField, HostMember, HostMethod, HostNamespace, HostProject, HostProperty, HostType, MemberKey, TypeKey};
use indexmap::IndexMap;
use std::collections::HashSet;

/// A bound host type
#[derive(Debug, Clone, Copy)]
pub struct ClassEntry<'p> {
    pub ty: &'p HostType,
    pub binding: &'p ClassBinding,
    pub document: &'p HostDocument,
}

/// A bound host member
#[derive(Debug)]
pub struct MemberEntry<'p, M, B> {
    pub member: &'p M,
    pub binding: &'p B,
    pub document: &'p HostDocument,
}

impl<M, B> Clone for MemberEntry<'_, M, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, B> Copy for MemberEntry<'_, M, B> {}

/// Every binding found in a project, keyed by host symbol
#[derive(Debug, Default)]
pub struct Bindings<'p> {
    pub classes: IndexMap<TypeKey, ClassEntry<'p>>,
    pub fields: IndexMap<MemberKey, MemberEntry<'p, HostField, FieldBinding>>,
    pub methods: IndexMap<MemberKey, MemberEntry<'p, HostMethod, MethodBinding>>,
    pub operators: IndexMap<MemberKey, MemberEntry<'p, HostMethod, OperatorBinding>>,
    pub properties: IndexMap<MemberKey, MemberEntry<'p, HostProperty, PropertyBinding>>,
}

impl<'p> Bindings<'p> {
    pub fn len(&self) -> usize {
        self.classes.len()
            + self.fields.len()
            + self.methods.len()
            + self.operators.len()
            + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source file named by the class binding of `owner`
    pub fn class_file(&self, owner: &TypeKey) -> Option<&'p str> {
        self.classes
            .get(owner)
            .and_then(|entry| entry.binding.file.as_deref())
    }
}

/// Walks a host project for bindings
pub struct BindingWalker<'p> {
    bindings: Bindings<'p>,
}

impl<'p> BindingWalker<'p> {
    /// Collect all bindings of `project`
    pub fn walk(project: &'p HostProject) -> Bindings<'p> {
        let mut walker = Self {
            bindings: Bindings::default(),
        };
        for document in &project.documents {
            for namespace in &document.namespaces {
                walker.walk_namespace(document, namespace, "");
            }
        }

        let bindings = walker.bindings;
        tracing::info!(
            "Collected {} bindings ({} classes, {} fields, {} methods, {} operators, {} properties)",
            bindings.len(),
            bindings.classes.len(),
            bindings.fields.len(),
            bindings.methods.len(),
            bindings.operators.len(),
            bindings.properties.len()
        );
        bindings
    }

    fn walk_namespace(&mut self, document: &'p HostDocument, namespace: &'p HostNamespace, parent: &str) {
        let name = namespace.qualified_name(parent);
        for ty in &namespace.types {
            self.walk_type(document, ty, TypeKey(qualify(&name, &ty.name)));
        }
        for inner in &namespace.namespaces {
            self.walk_namespace(document, inner, &name);
        }
    }

    fn walk_type(&mut self, document: &'p HostDocument, ty: &'p HostType, key: TypeKey) {
        for binding in first_of_each_kind(&key.0, &ty.bindings) {
            match binding {
                BindingDescriptor::Class(binding) => {
                    tracing::debug!("Class binding {} -> {}:{}", key, binding.module, binding.class_path);
                    self.bindings.classes.insert(
                        key.clone(),
                        ClassEntry {
                            ty,
                            binding,
                            document,
                        },
                    );
                }
                other => misplaced(&key.0, other),
            }
        }

        for (index, member) in ty.members.iter().enumerate() {
            let member_key = MemberKey {
                owner: key.clone(),
                index,
            };
            let label = format!("{}.{}", key, member.name());
            for binding in first_of_each_kind(&label, member.bindings()) {
                self.record(document, member, binding, member_key.clone(), &label);
            }
        }
    }

    fn record(
        &mut self,
        document: &'p HostDocument,
        member: &'p HostMember,
        binding: &'p BindingDescriptor,
        key: MemberKey,
        label: &str,
    ) {
        match (member, binding) {
            (HostMember::Field(field), BindingDescriptor::Field(binding)) => {
                tracing::debug!("Field binding {}", label);
                self.bindings.fields.insert(
                    key,
                    MemberEntry {
                        member: field,
                        binding,
                        document,
                    },
                );
            }
            (HostMember::Method(method), BindingDescriptor::Method(binding)) => {
                tracing::debug!("Method binding {} -> {}", label, binding.function_path);
                self.bindings.methods.insert(
                    key,
                    MemberEntry {
                        member: method,
                        binding,
                        document,
                    },
                );
            }
            (HostMember::Method(method), BindingDescriptor::Operator(binding)) => {
                tracing::debug!("Operator binding {} -> {}", label, binding.operator);
                self.bindings.operators.insert(
                    key,
                    MemberEntry {
                        member: method,
                        binding,
                        document,
                    },
                );
            }
            (HostMember::Property(property), BindingDescriptor::Property(binding)) => {
                tracing::debug!("Property binding {}", label);
                self.bindings.properties.insert(
                    key,
                    MemberEntry {
                        member: property,
                        binding,
                        document,
                    },
                );
            }
            (_, other) => misplaced(label, other),
        }
    }
}

fn first_of_each_kind<'a>(label: &str, bindings: &'a [BindingDescriptor]) -> Vec<&'a BindingDescriptor> {
    let mut seen: HashSet<BindingKind> = HashSet::new();
    bindings
        .iter()
        .filter(|binding| {
            let fresh = seen.insert(binding.kind());
            if !fresh {
                tracing::warn!("Ignoring duplicate {} binding on {}", binding.kind(), label);
            }
            fresh
        })
        .collect()
}

fn misplaced(label: &str, binding: &BindingDescriptor) {
    tracing::warn!("Ignoring {} binding on {}: wrong declaration kind", binding.kind(), label);
}
