//! Statement sequences and diagnostic placement

use super::diagnostics::{comment, TranslateError};
use super::state::TranslatorState;
use super::Translator;
use crate::host::Block;
use crate::python::Stmt;

impl<'g> Translator<'g> {
    /// Translate a statement sequence. Never fails: a failed statement's
    /// diagnostics become leading comments of the next translated statement,
    /// or trailing comments of the last one when nothing follows. A block
    /// with no statement at all keeps them as its own trailing comments.
    pub fn translate_block(&mut self, body: &Stmt, state: &TranslatorState) -> Block {
        let mut block = Block::default();
        let Stmt::Suite(statements) = body else {
            block
                .trailing
                .push(comment(&TranslateError::ExpectedSuite(body.kind_name().to_string())));
            return block;
        };

        let mut scope = state.clone();
        let mut pending: Vec<String> = Vec::new();
        for statement in statements {
            let (result, next) = self.translate_statement(statement, &scope);
            scope = next;
            match result {
                Ok(Some(mut translated)) => {
                    if !pending.is_empty() {
                        pending.append(&mut translated.leading);
                        translated.leading = std::mem::take(&mut pending);
                    }
                    block.statements.push(translated);
                }
                Ok(None) => {}
                Err(diagnostics) => pending.extend(diagnostics.into_comments()),
            }
        }

        if !pending.is_empty() {
            match block.statements.last_mut() {
                Some(last) => last.trailing.append(&mut pending),
                None => block.trailing.append(&mut pending),
            }
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::host::render::render_block;
    use crate::host::{Expr as HostExpr, StatementKind};
    use crate::python::Expr;
    use crate::translator::TypedExpr;

    #[test]
    fn test_diagnostics_attach_to_neighbours() {
        let graph = GraphBuilder::new().finalize();
        let mut translator = Translator::new(&graph);
        let state = TranslatorState::empty().with("a", TypedExpr::untyped(HostExpr::ident("a")));
        let body = Stmt::Suite(vec![
            Stmt::Expr(Expr::name("missing")),
            Stmt::Expr(Expr::name("a")),
            Stmt::Unsupported("try_statement".to_string()),
        ]);

        let block = translator.translate_block(&body, &state);
        assert_eq!(block.statements.len(), 1);
        assert_eq!(block.statements[0].leading, vec!["py2cs: Unknown name: missing".to_string()]);
        assert_eq!(
            block.statements[0].trailing,
            vec!["py2cs: Unsupported statement: try_statement".to_string()]
        );
        assert_eq!(
            render_block(&block),
            "// py2cs: Unknown name: missing\na;\n// py2cs: Unsupported statement: try_statement\n"
        );
    }

    #[test]
    fn test_empty_block_keeps_diagnostics() {
        let graph = GraphBuilder::new().finalize();
        let mut translator = Translator::new(&graph);
        let body = Stmt::Suite(vec![Stmt::Pass, Stmt::Unsupported("import_statement".to_string())]);

        let block = translator.translate_block(&body, &TranslatorState::empty());
        assert!(block.statements.is_empty());
        assert_eq!(block.trailing, vec!["py2cs: Unsupported statement: import_statement".to_string()]);

        let flat = translator.translate_block(&Stmt::Pass, &TranslatorState::empty());
        assert_eq!(flat.trailing, vec!["py2cs: Expected a statement sequence, found pass".to_string()]);
    }

    #[test]
    fn test_locals_flow_forward_but_not_out() {
        let graph = GraphBuilder::new().finalize();
        let mut translator = Translator::new(&graph);
        let state = TranslatorState::empty();
        let body = Stmt::Suite(vec![
            Stmt::Assign {
                targets: vec![Expr::name("x")],
                value: Expr::int(1),
            },
            Stmt::Return(Some(Expr::name("x"))),
        ]);

        let block = translator.translate_block(&body, &state);
        assert!(matches!(block.statements[0].kind, StatementKind::LocalDecl { .. }));
        assert!(block.statements[1].leading.is_empty());
        assert!(!state.contains("x"));
    }
}
