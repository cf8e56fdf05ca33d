//! Statement translation
//!
//! `(statement, state) -> (result, state')`. Only local declarations extend
//! the scope seen by following statements; nested blocks get their own
//! child scope.

use super::diagnostics::{comment, join, optional, Diagnostics, TranslateError, Translation};
use super::ops;
use super::state::{TranslatorState, TypedExpr};
use super::Translator;
use crate::host::{Arg, ElseBranch, Expr as HostExpr, Statement, StatementKind};
use crate::python::{BinaryOp, Expr, IfTest, Stmt, WithItem};

/// Runtime primitive asserts are routed to
const ASSERT_CALL: &str = "System.Diagnostics.Debug.Assert";

/// Loop variable standing in for a target that did not translate
const PLACEHOLDER_NAME: &str = "_";

/// A failed statement header keeps its diagnostics on the statement and
/// continues with a placeholder, so the body is still translated.
fn recover<T>(result: Translation<T>, flagged: &mut Vec<String>, placeholder: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|diagnostics| {
        flagged.extend(diagnostics.into_comments());
        placeholder()
    })
}

impl<'g> Translator<'g> {
    /// Translate one statement. `Ok(None)` means the statement produces no
    /// host output (`pass`).
    pub fn translate_statement(
        &mut self,
        stmt: &Stmt,
        state: &TranslatorState,
    ) -> (Translation<Option<Statement>>, TranslatorState) {
        if let Stmt::Assign { targets, value } = stmt {
            return self.assign(targets, value, state);
        }

        let result = match stmt {
            // docstrings and other bare constants stay as comments
            Stmt::Expr(Expr::Constant(literal)) => Ok(Some(Statement::comment(literal.to_string().trim()))),
            Stmt::Expr(expr) => self
                .translate_expr(expr, state)
                .map(|typed| Some(Statement::expr(typed.syntax))),
            Stmt::AugAssign { target, op, value } => self.aug_assign(target, *op, value, state).map(Some),
            Stmt::Return(value) => Ok(Some(self.ret(value.as_ref(), state))),
            Stmt::If { tests, else_body } => self.if_chain(tests, else_body.as_deref(), state).map(Some),
            Stmt::While { test, body, else_body } => Ok(Some(self.while_loop(test, body, else_body.is_some(), state))),
            Stmt::For {
                target,
                iter,
                body,
                else_body,
            } => Ok(Some(self.for_loop(target, iter, body, else_body.is_some(), state))),
            Stmt::With { items, body } => Ok(Some(self.with(items, body, state))),
            Stmt::Raise { exc, cause } => self.raise(exc.as_ref(), cause.is_some(), state).map(Some),
            Stmt::Assert { test, msg } => self.assert(test, msg.as_ref(), state).map(Some),
            Stmt::Pass => Ok(None),
            Stmt::Break => Ok(Some(Statement::new(StatementKind::Break))),
            Stmt::Continue => Ok(Some(Statement::new(StatementKind::Continue))),
            Stmt::Assign { .. }
            | Stmt::Suite(_)
            | Stmt::ClassDef(_)
            | Stmt::FunctionDef(_)
            | Stmt::Unsupported(_) => Err(TranslateError::UnsupportedStatement(stmt.kind_name().to_string()).into()),
        };
        (result, state.clone())
    }

    fn assign(
        &mut self,
        targets: &[Expr],
        value: &Expr,
        state: &TranslatorState,
    ) -> (Translation<Option<Statement>>, TranslatorState) {
        let [target] = targets else {
            return (
                Err(TranslateError::AssignmentArity(targets.len()).into()),
                state.clone(),
            );
        };
        let value = self.translate_expr(value, state);

        match target {
            Expr::Name(name) if !state.contains(name) => match value {
                Ok(value) => {
                    let local = TypedExpr::new(HostExpr::ident(name.clone()), value.ty);
                    let statement = Statement::new(StatementKind::LocalDecl {
                        name: name.clone(),
                        value: value.syntax,
                    });
                    (Ok(Some(statement)), state.with(name.clone(), local))
                }
                Err(e) => (Err(e), state.clone()),
            },
            _ => {
                if let (Expr::Name(name), Ok(value)) = (target, &value) {
                    if let Some(assigned) = self.hoisted.get_mut(name) {
                        assigned.push(value.ty);
                    }
                }
                let result = join(self.assignment_target(target, state), value).map(|(target, value)| {
                    Some(Statement::expr(HostExpr::assign(target.syntax, None, value.syntax)))
                });
                (result, state.clone())
            }
        }
    }

    fn assignment_target(&self, target: &Expr, state: &TranslatorState) -> Translation<TypedExpr> {
        match target {
            Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. } => self.translate_expr(target, state),
            other => Err(TranslateError::AssignmentTarget(other.kind_name().to_string()).into()),
        }
    }

    fn aug_assign(&self, target: &Expr, op: BinaryOp, value: &Expr, state: &TranslatorState) -> Translation<Statement> {
        let operator = ops::binary_operator(op)
            .ok_or_else(|| Diagnostics::from(TranslateError::UnsupportedOperator(format!("{}=", op.symbol()))));
        let operands = join(self.assignment_target(target, state), self.translate_expr(value, state));
        let ((target, value), operator) = join(operands, operator)?;
        Ok(Statement::expr(HostExpr::assign(target.syntax, Some(operator), value.syntax)))
    }

    /// A failed return value still yields a bare return carrying the
    /// diagnostics, so control flow is kept.
    fn ret(&mut self, value: Option<&Expr>, state: &TranslatorState) -> Statement {
        let Some(value) = value else {
            self.returns.push(crate::graph::Type::NONE);
            return Statement::ret(None);
        };
        match self.translate_expr(value, state) {
            Ok(typed) => {
                self.returns.push(typed.ty);
                Statement::ret(Some(typed.syntax))
            }
            Err(e) => {
                self.returns.push(crate::graph::Type::Unknown);
                let mut statement = Statement::ret(None);
                statement.trailing = e.into_comments();
                statement
            }
        }
    }

    /// Folds the tests tail-first: every test but the last gets the rest of
    /// the chain as its `else if`.
    fn if_chain(&mut self, tests: &[IfTest], else_body: Option<&Stmt>, state: &TranslatorState) -> Translation<Statement> {
        let Some((first, rest)) = tests.split_first() else {
            return Err(TranslateError::UnsupportedStatement("if without a test".to_string()).into());
        };

        let mut flagged = Vec::new();
        let condition = recover(
            self.translate_expr(&first.test, state).map(|typed| typed.syntax),
            &mut flagged,
            || HostExpr::bool(false),
        );
        let then = self.translate_block(&first.body, state);
        let otherwise = if rest.is_empty() {
            else_body.map(|body| ElseBranch::Block {
                block: self.translate_block(body, state),
            })
        } else {
            Some(ElseBranch::If {
                statement: Box::new(self.if_chain(rest, else_body, state)?),
            })
        };

        let mut statement = Statement::new(StatementKind::If {
            condition,
            then,
            otherwise,
        });
        statement.leading = flagged;
        Ok(statement)
    }

    fn while_loop(&mut self, test: &Expr, body: &Stmt, has_else: bool, state: &TranslatorState) -> Statement {
        let mut flagged = Vec::new();
        let condition = recover(
            self.translate_expr(test, state).map(|typed| typed.syntax),
            &mut flagged,
            || HostExpr::bool(false),
        );
        let body = self.translate_block(body, state);
        let mut statement = Statement::new(StatementKind::While { condition, body });
        statement.leading = flagged;
        if has_else {
            statement.trailing.push(comment(&TranslateError::LoopElse("while".to_string())));
        }
        statement
    }

    fn for_loop(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &Stmt,
        has_else: bool,
        state: &TranslatorState,
    ) -> Statement {
        let mut flagged = Vec::new();
        let name = match target {
            Expr::Name(name) => Ok(name.clone()),
            other => Err(Diagnostics::from(TranslateError::ForTarget(other.kind_name().to_string()))),
        };
        let name = recover(name, &mut flagged, || PLACEHOLDER_NAME.to_string());
        let iterable = recover(
            self.translate_expr(iter, state).map(|typed| typed.syntax),
            &mut flagged,
            || HostExpr::ListInit {
                element_type: "object".to_string(),
                items: Vec::new(),
            },
        );

        let scope = state.with(name.clone(), TypedExpr::untyped(HostExpr::ident(name.clone())));
        let body = self.translate_block(body, &scope);
        let mut statement = Statement::new(StatementKind::ForEach { name, iterable, body });
        statement.leading = flagged;
        if has_else {
            statement.trailing.push(comment(&TranslateError::LoopElse("for".to_string())));
        }
        statement
    }

    /// Only a single context manager translates; any other count keeps the
    /// body under a placeholder resource.
    fn with(&mut self, items: &[WithItem], body: &Stmt, state: &TranslatorState) -> Statement {
        let mut flagged = Vec::new();
        let item = match items {
            [item] => Some(item),
            _ => {
                flagged.push(comment(&TranslateError::WithArity(items.len())));
                None
            }
        };

        let name = match item.and_then(|item| item.target.as_ref()) {
            None => None,
            Some(Expr::Name(name)) => Some(name.clone()),
            Some(other) => {
                flagged.push(comment(&TranslateError::WithTarget(other.kind_name().to_string())));
                None
            }
        };
        let resource = match item {
            Some(item) => recover(self.translate_expr(&item.context, state), &mut flagged, || {
                TypedExpr::untyped(HostExpr::null())
            }),
            None => TypedExpr::untyped(HostExpr::null()),
        };

        let scope = match &name {
            Some(name) => state.with(name.clone(), TypedExpr::new(HostExpr::ident(name.clone()), resource.ty)),
            None => state.clone(),
        };
        let body = self.translate_block(body, &scope);
        let mut statement = Statement::new(StatementKind::Using {
            name,
            resource: resource.syntax,
            body,
        });
        statement.leading = flagged;
        statement
    }

    fn raise(&self, exc: Option<&Expr>, has_cause: bool, state: &TranslatorState) -> Translation<Statement> {
        let value = optional(exc, |exc| self.translate_expr(exc, state))?;
        let mut statement = Statement::new(StatementKind::Throw {
            value: value.map(|typed| typed.syntax),
        });
        if has_cause {
            statement.trailing.push(comment(&TranslateError::RaiseCause));
        }
        Ok(statement)
    }

    fn assert(&self, test: &Expr, msg: Option<&Expr>, state: &TranslatorState) -> Translation<Statement> {
        let (test, msg) = join(
            self.translate_expr(test, state),
            optional(msg, |msg| self.translate_expr(msg, state)),
        )?;
        let mut args = vec![Arg::positional(test.syntax)];
        args.extend(msg.map(|msg| Arg::positional(msg.syntax)));
        Ok(Statement::expr(HostExpr::invoke(HostExpr::qualified(ASSERT_CALL), args)))
    }
}
