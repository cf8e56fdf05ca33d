//! Translator - Python function bodies into host syntax
//!
//! Translation threads a persistent [`TranslatorState`] of named, typed
//! values through each statement. Unsupported constructs never abort:
//! they turn into [`Diagnostics`] that end up as comments next to the
//! nearest statement that did translate.

mod block;
pub mod diagnostics;
mod expr;
mod locals;
pub(crate) mod ops;
pub mod state;
mod stmt;

pub use diagnostics::{Diagnostics, TranslateError, Translation, COMMENT_PREFIX};
pub use state::{TranslatorState, TypedExpr};

use crate::graph::{Graph, NodeId, Type};
use crate::host::{Block, Expr as HostExpr, HostParam, Statement, StatementKind};
use crate::mapper::host_type;
use crate::python::ParamKind;
use diagnostics::{collect, comment, optional};
use indexmap::IndexMap;

/// Translated function body
#[derive(Debug, Clone)]
pub struct FunctionBody {
    pub block: Block,
    /// Type every `return` agrees on: `None` without a returned value,
    /// `Unknown` when the returns disagree
    pub return_type: Type,
    /// Diagnostic comments written into `block`
    pub diagnostics: usize,
}

/// Translates against a read-only bound graph
pub struct Translator<'g> {
    graph: &'g Graph,
    /// Types of the returns seen in the current function body
    returns: Vec<Type>,
    /// Function-level locals and the types assigned to them so far
    hoisted: IndexMap<String, Vec<Type>>,
}

impl<'g> Translator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            returns: Vec::new(),
            hoisted: IndexMap::new(),
        }
    }

    /// Translate the Python body of `function`. Only the names in `state`
    /// are visible; parameters are not bound implicitly.
    pub fn translate_function(&mut self, function: NodeId, state: &TranslatorState) -> FunctionBody {
        self.returns.clear();
        let graph = self.graph;

        let block = match graph.function(function).and_then(|f| f.definition.as_deref()) {
            Some(definition) => {
                let names = locals::hoisted_locals(&definition.body, state);
                let scope = names.iter().fold(state.clone(), |scope, name| {
                    scope.with(name.clone(), TypedExpr::untyped(HostExpr::ident(name.clone())))
                });
                self.hoisted = names.into_iter().map(|name| (name, Vec::new())).collect();

                let mut block = self.translate_block(&definition.body, &scope);
                let declarations = self.hoisted.drain(..).map(|(name, types)| {
                    Statement::new(StatementKind::Declare {
                        ty: local_type(graph, &types),
                        name,
                    })
                });
                block.statements.splice(0..0, declarations);
                block
            }
            None => Block {
                statements: Vec::new(),
                trailing: vec![comment(&TranslateError::MissingBody(graph.name(function).to_string()))],
            },
        };

        let return_type = infer_return_type(&self.returns);
        let diagnostics = block
            .comments()
            .iter()
            .filter(|line| line.starts_with(COMMENT_PREFIX))
            .count();
        if diagnostics > 0 {
            tracing::warn!("{} diagnostics translating {}", diagnostics, graph.name(function));
        }

        FunctionBody {
            block,
            return_type,
            diagnostics,
        }
    }

    /// Host parameter list for a brand-new member, defaults included.
    /// `skip_receiver` drops the first parameter (the bound `self`).
    pub fn signature(&self, function: NodeId, skip_receiver: bool) -> Translation<Vec<HostParam>> {
        let graph = self.graph;
        let definition = graph.function(function).and_then(|f| f.definition.as_deref());
        let empty = TranslatorState::empty();

        let params = graph
            .parameters(function)
            .into_iter()
            .enumerate()
            .skip(usize::from(skip_receiver))
            .map(|(index, (_, name, param))| -> Translation<HostParam> {
                let kind = definition
                    .and_then(|d| d.params.get(index))
                    .map(|p| p.kind)
                    .unwrap_or(ParamKind::Positional);
                match kind {
                    ParamKind::VarArgs => {
                        return Err(TranslateError::UnsupportedParameter(format!("*{}", name)).into())
                    }
                    ParamKind::KwArgs => {
                        return Err(TranslateError::UnsupportedParameter(format!("**{}", name)).into())
                    }
                    ParamKind::Positional => {}
                }
                let default = optional(param.default.as_ref(), |value| self.translate_expr(value, &empty))?;
                Ok(HostParam {
                    name: name.to_string(),
                    ty: host_type(graph, param.ty),
                    default: default.map(|value| value.syntax),
                })
            });
        collect(params)
    }
}

/// Host type of a hoisted local: the type every assignment agrees on,
/// `object` otherwise
fn local_type(graph: &Graph, assigned: &[Type]) -> String {
    match infer_return_type(assigned) {
        Type::Unknown | Type::NONE => "object".to_string(),
        ty => host_type(graph, ty).to_string(),
    }
}

fn infer_return_type(returns: &[Type]) -> Type {
    match returns.split_first() {
        None => Type::NONE,
        Some((first, rest)) if rest.iter().all(|ty| ty == first) => *first,
        Some(_) => Type::Unknown,
    }
}
