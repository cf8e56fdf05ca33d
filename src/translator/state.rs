//! Translator scope
//!
//! A persistent linked list of name bindings. Extending a state shares the
//! parent's chain, so child scopes never disturb the scope they came from.

use super::diagnostics::{TranslateError, Translation};
use crate::graph::Type;
use crate::host::Expr;
use std::sync::Arc;

/// Host expression with its inferred graph type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub syntax: Expr,
    pub ty: Type,
}

impl TypedExpr {
    pub fn new(syntax: Expr, ty: Type) -> Self {
        Self { syntax, ty }
    }

    pub fn untyped(syntax: Expr) -> Self {
        Self::new(syntax, Type::Unknown)
    }
}

#[derive(Debug)]
struct Binding {
    name: String,
    value: TypedExpr,
    parent: Option<Arc<Binding>>,
}

/// Names visible to the translator
#[derive(Debug, Clone, Default)]
pub struct TranslatorState {
    head: Option<Arc<Binding>>,
}

impl TranslatorState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// New state with `name` bound, shadowing any outer binding
    pub fn with(&self, name: impl Into<String>, value: TypedExpr) -> Self {
        Self {
            head: Some(Arc::new(Binding {
                name: name.into(),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedExpr> {
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            if binding.name == name {
                return Some(&binding.value);
            }
            current = binding.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolve a name, failing with an unknown-name diagnostic
    pub fn lookup(&self, name: &str) -> Translation<TypedExpr> {
        self.get(name)
            .cloned()
            .ok_or_else(|| TranslateError::UnknownName(name.to_string()).into())
    }

    /// Visible names, innermost first, shadowed names omitted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let mut current = self.head.as_deref();
        while let Some(binding) = current {
            if !names.contains(&binding.name.as_str()) {
                names.push(&binding.name);
            }
            current = binding.parent.as_deref();
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}
