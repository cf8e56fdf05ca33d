//! Function-level locals
//!
//! Python locals live for the whole function while host locals end with
//! their block. A name first assigned inside a nested block is declared
//! once at the top of the function body and only assigned where Python
//! assigns it.

use super::state::TranslatorState;
use crate::python::{Expr, Stmt};

/// Names whose first assignment sits inside a nested block, in source order.
/// Names already in `state` and loop/`with` variables of an enclosing
/// statement are never hoisted.
pub(super) fn hoisted_locals(body: &Stmt, state: &TranslatorState) -> Vec<String> {
    let mut scan = Scan {
        state,
        seen: Vec::new(),
        hoisted: Vec::new(),
    };
    scan.block(body, 0, &[]);
    scan.hoisted
}

struct Scan<'s> {
    state: &'s TranslatorState,
    seen: Vec<String>,
    hoisted: Vec<String>,
}

impl Scan<'_> {
    fn block(&mut self, body: &Stmt, depth: usize, bound: &[String]) {
        let Stmt::Suite(statements) = body else {
            return;
        };
        for statement in statements {
            self.statement(statement, depth, bound);
        }
    }

    fn statement(&mut self, stmt: &Stmt, depth: usize, bound: &[String]) {
        match stmt {
            Stmt::Assign { targets, .. } => {
                if let [Expr::Name(name)] = targets.as_slice() {
                    self.assigned(name, depth, bound);
                }
            }
            Stmt::If { tests, else_body } => {
                for test in tests {
                    self.block(&test.body, depth + 1, bound);
                }
                if let Some(body) = else_body {
                    self.block(body, depth + 1, bound);
                }
            }
            // loop `else` clauses are not translated
            Stmt::While { body, .. } => self.block(body, depth + 1, bound),
            Stmt::For { target, body, .. } => {
                let mut inner = bound.to_vec();
                if let Expr::Name(name) = target {
                    inner.push(name.clone());
                }
                self.block(body, depth + 1, &inner);
            }
            Stmt::With { items, body } => {
                let mut inner = bound.to_vec();
                if let [item] = items.as_slice() {
                    if let Some(Expr::Name(name)) = &item.target {
                        inner.push(name.clone());
                    }
                }
                self.block(body, depth + 1, &inner);
            }
            _ => {}
        }
    }

    fn assigned(&mut self, name: &str, depth: usize, bound: &[String]) {
        if self.state.contains(name)
            || bound.iter().any(|b| b == name)
            || self.seen.iter().any(|s| s == name)
        {
            return;
        }
        self.seen.push(name.to_string());
        if depth > 0 {
            self.hoisted.push(name.to_string());
        }
    }
}
