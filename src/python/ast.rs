//! Owned Python syntax tree
//!
//! Only the shapes the extractor and translator care about get their own
//! variant. Everything else lowers to an `Unsupported` node carrying the
//! grammar kind, so the translator can report it by name.

/// A Python statement.
///
/// Bodies are boxed statements rather than statement vectors: a body is
/// expected to be a [`Stmt::Suite`] and consumers check that shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Flat statement sequence (module body, block)
    Suite(Vec<Stmt>),
    ClassDef(ClassDef),
    FunctionDef(FunctionDef),
    /// Expression evaluated for its effect (including docstrings)
    Expr(Expr),
    /// `a = b`, or `a = b = c` with two targets
    Assign { targets: Vec<Expr>, value: Expr },
    /// `a += b`
    AugAssign { target: Expr, op: BinaryOp, value: Expr },
    Return(Option<Expr>),
    If { tests: Vec<IfTest>, else_body: Option<Box<Stmt>> },
    While { test: Expr, body: Box<Stmt>, else_body: Option<Box<Stmt>> },
    For { target: Expr, iter: Expr, body: Box<Stmt>, else_body: Option<Box<Stmt>> },
    With { items: Vec<WithItem>, body: Box<Stmt> },
    Raise { exc: Option<Expr>, cause: Option<Expr> },
    Assert { test: Expr, msg: Option<Expr> },
    Pass,
    Break,
    Continue,
    /// Any other statement, by grammar kind (`try_statement`, `import_statement`, ...)
    Unsupported(String),
}

impl Stmt {
    /// Short name used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Stmt::Suite(_) => "suite",
            Stmt::ClassDef(_) => "class definition",
            Stmt::FunctionDef(_) => "function definition",
            Stmt::Expr(_) => "expression statement",
            Stmt::Assign { .. } => "assignment",
            Stmt::AugAssign { .. } => "augmented assignment",
            Stmt::Return(_) => "return",
            Stmt::If { .. } => "if",
            Stmt::While { .. } => "while",
            Stmt::For { .. } => "for",
            Stmt::With { .. } => "with",
            Stmt::Raise { .. } => "raise",
            Stmt::Assert { .. } => "assert",
            Stmt::Pass => "pass",
            Stmt::Break => "break",
            Stmt::Continue => "continue",
            Stmt::Unsupported(kind) => kind,
        }
    }
}

/// `class Name(bases): body`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Expr>,
    pub body: Box<Stmt>,
}

/// `def name(params): body`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Expr>,
}

impl Param {
    pub fn positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Positional,
            default: None,
        }
    }
}

/// One `if`/`elif` arm
#[derive(Debug, Clone, PartialEq)]
pub struct IfTest {
    pub test: Expr,
    pub body: Box<Stmt>,
}

/// `context as target`
#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub context: Expr,
    pub target: Option<Expr>,
}

/// A Python expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Literal),
    Name(String),
    /// `value.attr`
    Attribute { value: Box<Expr>, attr: String },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    /// `left and right`, `left or right`
    BoolOp { op: BoolOp, left: Box<Expr>, right: Box<Expr> },
    /// A single comparison; chains lower to `Unsupported`
    Compare { op: CmpOp, left: Box<Expr>, right: Box<Expr> },
    Paren(Box<Expr>),
    List(Vec<Expr>),
    Dict(Vec<DictEntry>),
    Tuple(Vec<Expr>),
    /// `value[index]`
    Subscript { value: Box<Expr>, index: Box<Expr> },
    /// `lower:upper:step` inside a subscript
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call { func: Box<Expr>, args: Vec<Argument> },
    /// Any other expression, by grammar kind (`lambda`, `list_comprehension`, ...)
    Unsupported(String),
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant(Literal::Int(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Constant(Literal::Str(value.into()))
    }

    pub fn attr(value: Expr, attr: impl Into<String>) -> Self {
        Expr::Attribute {
            value: Box::new(value),
            attr: attr.into(),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Short name used in diagnostics
    pub fn kind_name(&self) -> &str {
        match self {
            Expr::Constant(_) => "constant",
            Expr::Name(_) => "name",
            Expr::Attribute { .. } => "attribute",
            Expr::Unary { .. } => "unary operation",
            Expr::Binary { .. } => "binary operation",
            Expr::BoolOp { .. } => "boolean operation",
            Expr::Compare { .. } => "comparison",
            Expr::Paren(_) => "parenthesized expression",
            Expr::List(_) => "list",
            Expr::Dict(_) => "dictionary",
            Expr::Tuple(_) => "tuple",
            Expr::Subscript { .. } => "subscript",
            Expr::Slice { .. } => "slice",
            Expr::Call { .. } => "call",
            Expr::Unsupported(kind) => kind,
        }
    }
}

/// `key: value`. Some front ends model entries as slices and may carry a
/// step component, which has no host meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
    pub step: Option<Expr>,
}

/// Call argument, positional when `name` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Int(i64),
    /// Integer literal that does not fit in 64 bits
    BigInt(String),
    Float(f64),
    /// Imaginary literal such as `2j`
    Complex(String),
    Str(String),
    Bytes(Vec<u8>),
    /// f-string source text
    FormattedStr(String),
    Ellipsis,
}

impl Literal {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::None => "None",
            Literal::Int(_) => "int",
            Literal::BigInt(_) => "big int",
            Literal::Float(_) => "float",
            Literal::Complex(_) => "complex",
            Literal::Str(_) => "str",
            Literal::Bytes(_) => "bytes",
            Literal::FormattedStr(_) => "f-string",
            Literal::Ellipsis => "Ellipsis",
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Int(v) => write!(f, "{}", v),
            Literal::BigInt(v) | Literal::Complex(v) | Literal::FormattedStr(v) => write!(f, "{}", v),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Str(v) => write!(f, "{}", v),
            Literal::Bytes(v) => write!(f, "{}", String::from_utf8_lossy(v)),
            Literal::Ellipsis => write!(f, "..."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    MatMul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinaryOp {
    /// Python spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::MatMul => "@",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "@" => BinaryOp::MatMul,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Pow,
            "<<" => BinaryOp::LShift,
            ">>" => BinaryOp::RShift,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&" => BinaryOp::BitAnd,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    /// Python spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}
