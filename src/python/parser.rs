//! Python parser
//!
//! Lowers tree-sitter-python syntax trees into the owned [`ast`](super::ast).
//! The parser sits behind the [`PythonParser`] trait so the source cache can
//! be given a different front end (or a counting fake in tests).

use super::ast::*;
use crate::{Error, Result};
use std::path::Path;
use std::sync::Mutex;
use tree_sitter::{Node, Parser};

/// A front end turning Python source text into a module [`Stmt::Suite`].
pub trait PythonParser: Send + Sync {
    /// Parse a whole file. Syntax errors are fatal.
    fn parse(&self, source: &str, path: &Path) -> Result<Stmt>;
}

/// Tree-sitter backed Python parser
pub struct TreeSitterParser {
    parser: Mutex<Parser>,
}

impl TreeSitterParser {
    /// Create a parser with the Python grammar loaded
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Adapter(format!("Failed to set language: {}", e)))?;

        Ok(Self {
            parser: Mutex::new(parser),
        })
    }
}

impl PythonParser for TreeSitterParser {
    fn parse(&self, source: &str, path: &Path) -> Result<Stmt> {
        let tree = {
            let mut parser = self
                .parser
                .lock()
                .map_err(|_| Error::Adapter("Python parser lock poisoned".to_string()))?;
            parser.parse(source, None)
        }
        .ok_or_else(|| Error::Parse {
            path: path.display().to_string(),
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => format!(
                    "syntax error at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            };
            return Err(Error::Parse {
                path: path.display().to_string(),
                message,
            });
        }

        let lowering = Lowering {
            source: source.as_bytes(),
        };
        Ok(lowering.suite(root))
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Named children without comment nodes
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

struct Lowering<'a> {
    source: &'a [u8],
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn field_text(&self, node: Node, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|n| self.text(n))
            .unwrap_or_default()
    }

    fn suite(&self, node: Node) -> Stmt {
        Stmt::Suite(named_children(node).into_iter().map(|c| self.stmt(c)).collect())
    }

    fn body(&self, node: Option<Node>) -> Box<Stmt> {
        match node {
            Some(block) if block.kind() == "block" => Box::new(self.suite(block)),
            Some(other) => Box::new(self.stmt(other)),
            None => Box::new(Stmt::Suite(Vec::new())),
        }
    }

    fn else_body(&self, node: Node) -> Option<Box<Stmt>> {
        node.child_by_field_name("alternative")
            .filter(|n| n.kind() == "else_clause")
            .map(|n| self.body(n.child_by_field_name("body")))
    }

    fn stmt(&self, node: Node) -> Stmt {
        match node.kind() {
            "class_definition" => Stmt::ClassDef(ClassDef {
                name: self.field_text(node, "name"),
                bases: node
                    .child_by_field_name("superclasses")
                    .map(|b| named_children(b).into_iter().map(|c| self.expr(c)).collect())
                    .unwrap_or_default(),
                body: self.body(node.child_by_field_name("body")),
            }),
            "function_definition" => Stmt::FunctionDef(FunctionDef {
                name: self.field_text(node, "name"),
                params: node
                    .child_by_field_name("parameters")
                    .map(|p| self.params(p))
                    .unwrap_or_default(),
                body: self.body(node.child_by_field_name("body")),
            }),
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(definition) => self.stmt(definition),
                None => Stmt::Unsupported(node.kind().to_string()),
            },
            "expression_statement" => self.expression_statement(node),
            "return_statement" => Stmt::Return(named_children(node).first().map(|c| self.expr(*c))),
            "if_statement" => self.if_statement(node),
            "while_statement" => Stmt::While {
                test: self.required_expr(node, "condition"),
                body: self.body(node.child_by_field_name("body")),
                else_body: self.else_body(node),
            },
            "for_statement" => Stmt::For {
                target: self.required_expr(node, "left"),
                iter: self.required_expr(node, "right"),
                body: self.body(node.child_by_field_name("body")),
                else_body: self.else_body(node),
            },
            "with_statement" => self.with_statement(node),
            "raise_statement" => {
                let cause = node.child_by_field_name("cause");
                let exc = named_children(node)
                    .into_iter()
                    .find(|c| Some(c.id()) != cause.map(|n| n.id()));
                Stmt::Raise {
                    exc: exc.map(|e| self.expr(e)),
                    cause: cause.map(|c| self.expr(c)),
                }
            }
            "assert_statement" => {
                let children = named_children(node);
                match children.as_slice() {
                    [test] => Stmt::Assert { test: self.expr(*test), msg: None },
                    [test, msg] => Stmt::Assert {
                        test: self.expr(*test),
                        msg: Some(self.expr(*msg)),
                    },
                    _ => Stmt::Unsupported(node.kind().to_string()),
                }
            }
            "pass_statement" => Stmt::Pass,
            "break_statement" => Stmt::Break,
            "continue_statement" => Stmt::Continue,
            "block" => self.suite(node),
            other => Stmt::Unsupported(other.to_string()),
        }
    }

    fn expression_statement(&self, node: Node) -> Stmt {
        let children = named_children(node);
        match children.as_slice() {
            [single] if single.kind() == "assignment" => self.assignment(*single),
            [single] if single.kind() == "augmented_assignment" => {
                let op = self
                    .field_text(*single, "operator")
                    .strip_suffix('=')
                    .and_then(BinaryOp::from_symbol);
                match op {
                    Some(op) => Stmt::AugAssign {
                        target: self.required_expr(*single, "left"),
                        op,
                        value: self.required_expr(*single, "right"),
                    },
                    None => Stmt::Unsupported("augmented_assignment".to_string()),
                }
            }
            [single] => Stmt::Expr(self.expr(*single)),
            many => Stmt::Expr(Expr::Tuple(many.iter().map(|c| self.expr(*c)).collect())),
        }
    }

    fn assignment(&self, node: Node) -> Stmt {
        let mut targets = vec![self.required_expr(node, "left")];
        let mut right = node.child_by_field_name("right");

        while let Some(inner) = right.filter(|r| r.kind() == "assignment") {
            targets.push(self.required_expr(inner, "left"));
            right = inner.child_by_field_name("right");
        }

        match right {
            Some(value) => Stmt::Assign {
                targets,
                value: self.expr(value),
            },
            // `x: int` declares without assigning
            None => Stmt::Unsupported("annotated declaration".to_string()),
        }
    }

    fn if_statement(&self, node: Node) -> Stmt {
        let mut tests = vec![IfTest {
            test: self.required_expr(node, "condition"),
            body: self.body(node.child_by_field_name("consequence")),
        }];
        let mut else_body = None;

        let mut cursor = node.walk();
        for clause in node.children_by_field_name("alternative", &mut cursor) {
            match clause.kind() {
                "elif_clause" => tests.push(IfTest {
                    test: self.required_expr(clause, "condition"),
                    body: self.body(clause.child_by_field_name("consequence")),
                }),
                "else_clause" => else_body = Some(self.body(clause.child_by_field_name("body"))),
                _ => {}
            }
        }

        Stmt::If { tests, else_body }
    }

    fn with_statement(&self, node: Node) -> Stmt {
        let mut items = Vec::new();
        for child in named_children(node) {
            if child.kind() != "with_clause" {
                continue;
            }
            for item in named_children(child) {
                let Some(value) = item.child_by_field_name("value") else {
                    continue;
                };
                if value.kind() == "as_pattern" {
                    let context = named_children(value)
                        .first()
                        .map(|c| self.expr(*c))
                        .unwrap_or_else(|| Expr::Unsupported("with_item".to_string()));
                    let target = value.child_by_field_name("alias").map(|alias| {
                        match named_children(alias).first() {
                            Some(inner) if alias.kind() == "as_pattern_target" => self.expr(*inner),
                            _ => self.expr(alias),
                        }
                    });
                    items.push(WithItem { context, target });
                } else {
                    items.push(WithItem {
                        context: self.expr(value),
                        target: None,
                    });
                }
            }
        }

        Stmt::With {
            items,
            body: self.body(node.child_by_field_name("body")),
        }
    }

    fn params(&self, node: Node) -> Vec<Param> {
        let mut params = Vec::new();
        for child in named_children(node) {
            let param = match child.kind() {
                "identifier" => Param::positional(self.text(child)),
                "typed_parameter" => match named_children(child).first() {
                    Some(inner) => self.splat_or_name(*inner),
                    None => continue,
                },
                "default_parameter" | "typed_default_parameter" => Param {
                    name: self.field_text(child, "name"),
                    kind: ParamKind::Positional,
                    default: child.child_by_field_name("value").map(|v| self.expr(v)),
                },
                "list_splat_pattern" | "dictionary_splat_pattern" => self.splat_or_name(child),
                _ => continue,
            };
            params.push(param);
        }
        params
    }

    fn splat_or_name(&self, node: Node) -> Param {
        let kind = match node.kind() {
            "list_splat_pattern" => ParamKind::VarArgs,
            "dictionary_splat_pattern" => ParamKind::KwArgs,
            _ => ParamKind::Positional,
        };
        let name = match kind {
            ParamKind::Positional => self.text(node),
            _ => named_children(node)
                .first()
                .map(|n| self.text(*n))
                .unwrap_or_default(),
        };
        Param {
            name,
            kind,
            default: None,
        }
    }

    fn required_expr(&self, node: Node, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.expr(child),
            None => Expr::Unsupported(format!("missing {}", field)),
        }
    }

    fn boxed(&self, node: Node, field: &str) -> Box<Expr> {
        Box::new(self.required_expr(node, field))
    }

    fn expr(&self, node: Node) -> Expr {
        match node.kind() {
            "identifier" => Expr::Name(self.text(node)),
            "true" => Expr::Name("True".to_string()),
            "false" => Expr::Name("False".to_string()),
            "none" => Expr::Constant(Literal::None),
            "ellipsis" => Expr::Constant(Literal::Ellipsis),
            "integer" => Expr::Constant(integer_literal(&self.text(node))),
            "float" => Expr::Constant(float_literal(&self.text(node))),
            "string" => Expr::Constant(self.string(node)),
            "concatenated_string" => Expr::Constant(self.concatenated_string(node)),
            "attribute" => Expr::Attribute {
                value: self.boxed(node, "object"),
                attr: self.field_text(node, "attribute"),
            },
            "subscript" => {
                let mut cursor = node.walk();
                let mut indices: Vec<Expr> = node
                    .children_by_field_name("subscript", &mut cursor)
                    .map(|c| self.expr(c))
                    .collect();
                let index = if indices.len() == 1 {
                    indices.remove(0)
                } else {
                    Expr::Tuple(indices)
                };
                Expr::Subscript {
                    value: self.boxed(node, "value"),
                    index: Box::new(index),
                }
            }
            "slice" => self.slice(node),
            "call" => {
                let args = match node.child_by_field_name("arguments") {
                    Some(list) if list.kind() == "argument_list" => self.arguments(list),
                    Some(other) => vec![Argument {
                        name: None,
                        value: Expr::Unsupported(other.kind().to_string()),
                    }],
                    None => Vec::new(),
                };
                Expr::Call {
                    func: self.boxed(node, "function"),
                    args,
                }
            }
            "binary_operator" => match BinaryOp::from_symbol(&self.field_text(node, "operator")) {
                Some(op) => Expr::Binary {
                    op,
                    left: self.boxed(node, "left"),
                    right: self.boxed(node, "right"),
                },
                None => Expr::Unsupported(node.kind().to_string()),
            },
            "unary_operator" => {
                let op = match self.field_text(node, "operator").as_str() {
                    "-" => UnaryOp::Neg,
                    "+" => UnaryOp::Pos,
                    "~" => UnaryOp::Invert,
                    _ => return Expr::Unsupported(node.kind().to_string()),
                };
                Expr::Unary {
                    op,
                    operand: self.boxed(node, "argument"),
                }
            }
            "not_operator" => Expr::Unary {
                op: UnaryOp::Not,
                operand: self.boxed(node, "argument"),
            },
            "boolean_operator" => {
                let op = match self.field_text(node, "operator").as_str() {
                    "and" => BoolOp::And,
                    "or" => BoolOp::Or,
                    _ => return Expr::Unsupported(node.kind().to_string()),
                };
                Expr::BoolOp {
                    op,
                    left: self.boxed(node, "left"),
                    right: self.boxed(node, "right"),
                }
            }
            "comparison_operator" => self.comparison(node),
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => Expr::Paren(Box::new(self.expr(*inner))),
                None => Expr::Tuple(Vec::new()),
            },
            "list" => Expr::List(named_children(node).into_iter().map(|c| self.expr(c)).collect()),
            "tuple" | "expression_list" => {
                Expr::Tuple(named_children(node).into_iter().map(|c| self.expr(c)).collect())
            }
            "dictionary" => {
                let mut entries = Vec::new();
                for child in named_children(node) {
                    if child.kind() != "pair" {
                        return Expr::Unsupported("dictionary unpacking".to_string());
                    }
                    entries.push(DictEntry {
                        key: self.required_expr(child, "key"),
                        value: self.required_expr(child, "value"),
                        step: None,
                    });
                }
                Expr::Dict(entries)
            }
            other => Expr::Unsupported(other.to_string()),
        }
    }

    fn arguments(&self, node: Node) -> Vec<Argument> {
        named_children(node)
            .into_iter()
            .map(|child| match child.kind() {
                "keyword_argument" => Argument {
                    name: Some(self.field_text(child, "name")),
                    value: self.required_expr(child, "value"),
                },
                "list_splat" | "dictionary_splat" => Argument {
                    name: None,
                    value: Expr::Unsupported(child.kind().to_string()),
                },
                _ => Argument {
                    name: None,
                    value: self.expr(child),
                },
            })
            .collect()
    }

    fn comparison(&self, node: Node) -> Expr {
        let mut operands = Vec::new();
        let mut tokens: Vec<&str> = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_named() {
                if child.kind() != "comment" {
                    operands.push(child);
                }
            } else {
                tokens.push(child.kind());
            }
        }

        let mut ops = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let pair = (tokens[i], tokens.get(i + 1).copied());
            let (op, width) = match pair {
                ("is", Some("not")) => (CmpOp::IsNot, 2),
                ("not", Some("in")) => (CmpOp::NotIn, 2),
                ("is not", _) => (CmpOp::IsNot, 1),
                ("not in", _) => (CmpOp::NotIn, 1),
                ("is", _) => (CmpOp::Is, 1),
                ("in", _) => (CmpOp::In, 1),
                ("==", _) => (CmpOp::Eq, 1),
                ("!=", _) | ("<>", _) => (CmpOp::NotEq, 1),
                ("<", _) => (CmpOp::Lt, 1),
                ("<=", _) => (CmpOp::LtE, 1),
                (">", _) => (CmpOp::Gt, 1),
                (">=", _) => (CmpOp::GtE, 1),
                _ => return Expr::Unsupported(node.kind().to_string()),
            };
            ops.push(op);
            i += width;
        }

        match (ops.as_slice(), operands.as_slice()) {
            ([op], [left, right]) => Expr::Compare {
                op: *op,
                left: Box::new(self.expr(*left)),
                right: Box::new(self.expr(*right)),
            },
            _ => Expr::Unsupported("chained comparison".to_string()),
        }
    }

    fn slice(&self, node: Node) -> Expr {
        let mut parts: [Option<Box<Expr>>; 3] = [None, None, None];
        let mut slot = 0;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == ":" {
                slot += 1;
            } else if child.is_named() && slot < 3 {
                parts[slot] = Some(Box::new(self.expr(child)));
            }
        }

        let [lower, upper, step] = parts;
        Expr::Slice { lower, upper, step }
    }

    fn string(&self, node: Node) -> Literal {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        let start = children.iter().find(|c| c.kind() == "string_start");
        let end = children.iter().find(|c| c.kind() == "string_end");

        let (Some(start), Some(end)) = (start, end) else {
            let text = self.text(node);
            return Literal::Str(text.trim_matches(['"', '\'']).to_string());
        };

        let prefix = self
            .text(*start)
            .trim_end_matches(['"', '\''])
            .to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&self.source[start.end_byte()..end.start_byte()]).into_owned();

        if prefix.contains('f') {
            Literal::FormattedStr(self.text(node))
        } else if prefix.contains('b') {
            if prefix.contains('r') {
                Literal::Bytes(raw.into_bytes())
            } else {
                Literal::Bytes(decode_escapes(&raw).into_bytes())
            }
        } else if prefix.contains('r') {
            Literal::Str(raw)
        } else {
            Literal::Str(decode_escapes(&raw))
        }
    }

    fn concatenated_string(&self, node: Node) -> Literal {
        let mut joined = String::new();
        for part in named_children(node) {
            match self.string(part) {
                Literal::Str(s) => joined.push_str(&s),
                other => return other,
            }
        }
        Literal::Str(joined)
    }
}

fn integer_literal(text: &str) -> Literal {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.ends_with('j') {
        return Literal::Complex(text.to_string());
    }

    let parsed = if let Some(hex) = cleaned.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(oct) = cleaned.strip_prefix("0o") {
        i64::from_str_radix(oct, 8)
    } else if let Some(bin) = cleaned.strip_prefix("0b") {
        i64::from_str_radix(bin, 2)
    } else {
        cleaned.parse::<i64>()
    };

    match parsed {
        Ok(value) => Literal::Int(value),
        Err(_) => Literal::BigInt(text.to_string()),
    }
}

fn float_literal(text: &str) -> Literal {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.ends_with(['j', 'J']) {
        return Literal::Complex(text.to_string());
    }
    Literal::Float(cleaned.parse::<f64>().unwrap_or(f64::NAN))
}

/// Decode Python backslash escapes in a non-raw string body
fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            // line continuation
            Some('\n') => {}
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Stmt> {
        let parser = TreeSitterParser::new().unwrap();
        match parser.parse(source, Path::new("test.py")).unwrap() {
            Stmt::Suite(stmts) => stmts,
            other => panic!("expected suite, got {:?}", other),
        }
    }

    fn function_body(stmt: &Stmt) -> &[Stmt] {
        match stmt {
            Stmt::FunctionDef(def) => match def.body.as_ref() {
                Stmt::Suite(body) => body,
                other => panic!("expected suite body, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_class_with_methods() {
        let stmts = parse(
            r#"
class Vector:
    """A vector."""
    def add(self, x, scale=2):
        return self.value + x

    def clear(self):
        pass
"#,
        );

        assert_eq!(stmts.len(), 1);
        let Stmt::ClassDef(class) = &stmts[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name, "Vector");

        let Stmt::Suite(body) = class.body.as_ref() else {
            panic!("expected suite");
        };
        assert_eq!(body.len(), 3);
        assert!(matches!(&body[0], Stmt::Expr(Expr::Constant(Literal::Str(s))) if s == "A vector."));

        let Stmt::FunctionDef(add) = &body[1] else {
            panic!("expected function");
        };
        let names: Vec<_> = add.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["self", "x", "scale"]);
        assert_eq!(add.params[2].default, Some(Expr::int(2)));

        let add_body = function_body(&body[1]);
        assert_eq!(
            add_body[0],
            Stmt::Return(Some(Expr::binary(
                BinaryOp::Add,
                Expr::attr(Expr::name("self"), "value"),
                Expr::name("x"),
            )))
        );
    }

    #[test]
    fn test_if_chain_and_assignments() {
        let stmts = parse(
            r#"
def f(a):
    if a:
        x = 1
    elif a is not None:
        a = b = 2
    else:
        a += 3
"#,
        );

        let body = function_body(&stmts[0]);
        let Stmt::If { tests, else_body } = &body[0] else {
            panic!("expected if");
        };
        assert_eq!(tests.len(), 2);
        assert!(else_body.is_some());
        assert!(matches!(&tests[1].test, Expr::Compare { op: CmpOp::IsNot, .. }));

        let Stmt::Suite(elif_body) = tests[1].body.as_ref() else {
            panic!("expected suite");
        };
        assert!(matches!(&elif_body[0], Stmt::Assign { targets, .. } if targets.len() == 2));

        let Some(else_body) = else_body else { unreachable!() };
        let Stmt::Suite(else_stmts) = else_body.as_ref() else {
            panic!("expected suite");
        };
        assert!(matches!(&else_stmts[0], Stmt::AugAssign { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_with_raise_assert() {
        let stmts = parse(
            r#"
def f(path):
    with open(path) as handle:
        assert handle, "missing"
    raise ValueError("bad")
"#,
        );

        let body = function_body(&stmts[0]);
        let Stmt::With { items, .. } = &body[0] else {
            panic!("expected with, got {:?}", body[0]);
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].target, Some(Expr::name("handle")));
        assert!(matches!(&items[0].context, Expr::Call { .. }));
        assert!(matches!(&body[1], Stmt::Raise { exc: Some(Expr::Call { .. }), cause: None }));
    }

    #[test]
    fn test_literals() {
        let stmts = parse("x = [0x10, 'a\\n', b'raw', 1.5, 2j, f'{x}', {'k': None}]\n");
        let Stmt::Assign { value: Expr::List(items), .. } = &stmts[0] else {
            panic!("expected list assignment");
        };
        assert_eq!(items[0], Expr::int(16));
        assert_eq!(items[1], Expr::str("a\n"));
        assert!(matches!(&items[2], Expr::Constant(Literal::Bytes(b)) if b == b"raw"));
        assert!(matches!(&items[3], Expr::Constant(Literal::Float(_))));
        assert!(matches!(&items[4], Expr::Constant(Literal::Complex(_))));
        assert!(matches!(&items[5], Expr::Constant(Literal::FormattedStr(_))));
        assert!(matches!(&items[6], Expr::Dict(entries) if entries.len() == 1));
    }

    #[test]
    fn test_unsupported_statement_kept_by_kind() {
        let stmts = parse("import os\n");
        assert_eq!(stmts[0], Stmt::Unsupported("import_statement".to_string()));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let parser = TreeSitterParser::new().unwrap();
        let result = parser.parse("def broken(:\n", Path::new("broken.py"));
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}
