//! Host syntax tree
//!
//! The subset of C#-shaped syntax the translator produces. Statements carry
//! comment trivia so diagnostics can ride along with the nearest statement
//! that did translate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Not,
    Negate,
    Plus,
    BitNot,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    LeftShift,
    RightShift,
    BitOr,
    BitXor,
    BitAnd,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Is,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Is => "is",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }
}

/// Invocation argument, named when `name` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Expr,
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: Literal },
    Identifier { name: String },
    This,
    /// Dotted name such as `System.Diagnostics.Debug.Assert`
    QualifiedName { parts: Vec<String> },
    MemberAccess { target: Box<Expr>, name: String },
    Invocation { target: Box<Expr>, args: Vec<Arg> },
    ElementAccess { target: Box<Expr>, index: Box<Expr> },
    Unary { op: UnaryOperator, operand: Box<Expr> },
    Binary { op: BinaryOperator, left: Box<Expr>, right: Box<Expr> },
    Parenthesized { inner: Box<Expr> },
    /// `target = value`, or a compound assignment when `op` is set
    Assignment {
        target: Box<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        op: Option<BinaryOperator>,
        value: Box<Expr>,
    },
    Tuple { items: Vec<Expr> },
    /// `new List<T> { ... }`
    ListInit { element_type: String, items: Vec<Expr> },
    /// `new Dictionary<K, V> { { k, v }, ... }`
    DictInit {
        key_type: String,
        value_type: String,
        entries: Vec<(Expr, Expr)>,
    },
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal { value: Literal::Null }
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal { value: Literal::Bool(value) }
    }

    pub fn int(value: i64) -> Self {
        Expr::Literal { value: Literal::Int(value) }
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Literal { value: Literal::Str(value.into()) }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn qualified(path: &str) -> Self {
        Expr::QualifiedName {
            parts: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn member(target: Expr, name: impl Into<String>) -> Self {
        Expr::MemberAccess {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn invoke(target: Expr, args: Vec<Arg>) -> Self {
        Expr::Invocation {
            target: Box::new(target),
            args,
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Parenthesized {
            inner: Box::new(inner),
        }
    }

    pub fn assign(target: Expr, op: Option<BinaryOperator>, value: Expr) -> Self {
        Expr::Assignment {
            target: Box::new(target),
            op,
            value: Box::new(value),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal { .. })
    }
}

/// A statement with the comments attached around it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading: Vec<String>,
    pub kind: StatementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trailing: Vec<String>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            leading: Vec::new(),
            kind,
            trailing: Vec::new(),
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StatementKind::Expression { expr })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::new(StatementKind::Return { value })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(StatementKind::Comment { text: text.into() })
    }
}

/// `else` branch of an `if`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElseBranch {
    /// `else if (...)`
    If { statement: Box<Statement> },
    Block { block: Block },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementKind {
    Expression { expr: Expr },
    /// `var name = value;`
    LocalDecl { name: String, value: Expr },
    /// `ty name = default;`, assigned later
    Declare { ty: String, name: String },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    If {
        condition: Expr,
        then: Block,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        otherwise: Option<ElseBranch>,
    },
    While { condition: Expr, body: Block },
    /// `foreach (var name in iterable)`
    ForEach { name: String, iterable: Expr, body: Block },
    /// `using (var name = resource)`, or `using (resource)` without a name
    Using {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        resource: Expr,
        body: Block,
    },
    /// `throw value;`, bare `throw;` rethrows
    Throw {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expr>,
    },
    Break,
    Continue,
    /// A standalone `// text` line
    Comment { text: String },
}

/// `{ ... }` with comments that belong after the last statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trailing: Vec<String>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            trailing: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.trailing.is_empty()
    }

    /// Every comment in the block, nested blocks included
    pub fn comments(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_block_comments(self, &mut out);
        out
    }
}

fn collect_block_comments<'a>(block: &'a Block, out: &mut Vec<&'a str>) {
    for statement in &block.statements {
        collect_statement_comments(statement, out);
    }
    out.extend(block.trailing.iter().map(String::as_str));
}

fn collect_statement_comments<'a>(statement: &'a Statement, out: &mut Vec<&'a str>) {
    out.extend(statement.leading.iter().map(String::as_str));
    match &statement.kind {
        StatementKind::Comment { text } => out.push(text),
        StatementKind::If { then, otherwise, .. } => {
            collect_block_comments(then, out);
            match otherwise {
                Some(ElseBranch::If { statement }) => collect_statement_comments(statement, out),
                Some(ElseBranch::Block { block }) => collect_block_comments(block, out),
                None => {}
            }
        }
        StatementKind::While { body, .. }
        | StatementKind::ForEach { body, .. }
        | StatementKind::Using { body, .. } => collect_block_comments(body, out),
        _ => {}
    }
    out.extend(statement.trailing.iter().map(String::as_str));
}
