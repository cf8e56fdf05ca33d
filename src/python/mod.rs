//! Python front end
//!
//! The translator never sees tree-sitter nodes. Sources are lowered into the
//! owned AST in [`ast`] by a [`PythonParser`], which the cache receives as an
//! injectable collaborator.

pub mod ast;
pub mod parser;

pub use ast::{Argument, BinaryOp, BoolOp, ClassDef, CmpOp, DictEntry, Expr, FunctionDef, IfTest, Literal, Param, ParamKind, Stmt, UnaryOp, WithItem};
pub use parser::{PythonParser, TreeSitterParser};
