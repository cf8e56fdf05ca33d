//! C#-style text rendering of host documents
//!
//! Comments are stored without their `//` marker and rendered one per line.
//! Binary expressions get parentheses wherever host precedence would
//! otherwise regroup the tree.

use super::model::{Accessor, HostDocument, HostMember, HostNamespace, HostType};
use super::syntax::{Arg, Block, ElseBranch, Expr, Literal, Statement, StatementKind, UnaryOperator, BinaryOperator};
use crate::bindings::BindingDescriptor;

const INDENT: &str = "    ";

/// Render a whole document
pub fn render_document(document: &HostDocument) -> String {
    let mut w = Writer::default();
    for using in &document.usings {
        w.line(&format!("using {};", using));
    }
    if !document.usings.is_empty() {
        w.blank();
    }
    for (i, namespace) in document.namespaces.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        w.namespace(namespace);
    }
    w.finish()
}

/// Render a block's statements without the surrounding braces
pub fn render_block(block: &Block) -> String {
    let mut w = Writer::default();
    w.statements(block);
    w.finish()
}

pub fn render_statement(statement: &Statement) -> String {
    let mut w = Writer::default();
    w.statement(statement);
    w.finish()
}

pub fn render_expr(expr: &Expr) -> String {
    expr_text(expr)
}

#[derive(Default)]
struct Writer {
    out: String,
    depth: usize,
}

impl Writer {
    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.line("//");
            } else {
                self.line(&format!("// {}", line));
            }
        }
        if text.is_empty() {
            self.line("//");
        }
    }

    fn comments(&mut self, lines: &[String]) {
        for line in lines {
            self.comment(line);
        }
    }

    fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn namespace(&mut self, namespace: &HostNamespace) {
        let named = !namespace.name.is_empty();
        if named {
            self.line(&format!("namespace {}", namespace.name));
            self.open();
        }
        let mut first = true;
        for ty in &namespace.types {
            if !first {
                self.blank();
            }
            first = false;
            self.host_type(ty);
        }
        for inner in &namespace.namespaces {
            if !first {
                self.blank();
            }
            first = false;
            self.namespace(inner);
        }
        if named {
            self.close();
        }
    }

    fn attributes(&mut self, bindings: &[BindingDescriptor]) {
        for binding in bindings {
            self.line(&attribute_text(binding));
        }
    }

    fn host_type(&mut self, ty: &HostType) {
        self.attributes(&ty.bindings);
        self.line(&format!("public partial class {}", ty.name));
        self.open();
        for (i, member) in ty.members.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            self.member(&ty.name, member);
        }
        self.close();
    }

    fn member(&mut self, type_name: &str, member: &HostMember) {
        self.attributes(member.bindings());
        match member {
            HostMember::Field(field) => {
                self.line(&format!("public {} {};", field.ty, field.name));
            }
            HostMember::Method(method) => {
                self.comments(&method.comments);
                let params: Vec<String> = method
                    .params
                    .iter()
                    .map(|p| match &p.default {
                        Some(default) => format!("{} {} = {}", p.ty, p.name, expr_text(default)),
                        None => format!("{} {}", p.ty, p.name),
                    })
                    .collect();
                let modifiers = if method.is_static { "public static" } else { "public" };
                let signature = if method.is_constructor {
                    format!("{} {}({})", modifiers, type_name, params.join(", "))
                } else {
                    format!(
                        "{} {} {}({})",
                        modifiers,
                        method.return_type,
                        method.name,
                        params.join(", ")
                    )
                };
                self.line(&signature);
                match &method.body {
                    Some(body) => self.block(body),
                    None => self.line("{ }"),
                }
            }
            HostMember::Property(property) => {
                let modifiers = if property.is_static { "public static" } else { "public" };
                self.line(&format!("{} {} {}", modifiers, property.ty, property.name));
                self.open();
                if let Some(getter) = &property.getter {
                    self.accessor("get", getter);
                }
                if let Some(setter) = &property.setter {
                    self.accessor("set", setter);
                }
                self.close();
            }
        }
    }

    fn accessor(&mut self, keyword: &str, accessor: &Accessor) {
        self.comments(&accessor.comments);
        match &accessor.body {
            Some(body) => {
                self.line(keyword);
                self.block(body);
            }
            None => self.line(&format!("{};", keyword)),
        }
    }

    fn block(&mut self, block: &Block) {
        self.open();
        self.statements(block);
        self.close();
    }

    fn statements(&mut self, block: &Block) {
        for statement in &block.statements {
            self.statement(statement);
        }
        self.comments(&block.trailing);
    }

    fn statement(&mut self, statement: &Statement) {
        self.comments(&statement.leading);
        self.statement_kind(&statement.kind, "");
        self.comments(&statement.trailing);
    }

    fn statement_kind(&mut self, kind: &StatementKind, prefix: &str) {
        match kind {
            StatementKind::Expression { expr } => self.line(&format!("{};", expr_text(expr))),
            StatementKind::LocalDecl { name, value } => {
                self.line(&format!("var {} = {};", name, expr_text(value)))
            }
            StatementKind::Declare { ty, name } => self.line(&format!("{} {} = default;", ty, name)),
            StatementKind::Return { value: Some(value) } => {
                self.line(&format!("return {};", expr_text(value)))
            }
            StatementKind::Return { value: None } => self.line("return;"),
            StatementKind::If {
                condition,
                then,
                otherwise,
            } => {
                self.line(&format!("{}if ({})", prefix, expr_text(condition)));
                self.block(then);
                match otherwise {
                    Some(ElseBranch::If { statement }) => {
                        self.comments(&statement.leading);
                        self.statement_kind(&statement.kind, "else ");
                        self.comments(&statement.trailing);
                    }
                    Some(ElseBranch::Block { block }) => {
                        self.line("else");
                        self.block(block);
                    }
                    None => {}
                }
            }
            StatementKind::While { condition, body } => {
                self.line(&format!("while ({})", expr_text(condition)));
                self.block(body);
            }
            StatementKind::ForEach {
                name,
                iterable,
                body,
            } => {
                self.line(&format!("foreach (var {} in {})", name, expr_text(iterable)));
                self.block(body);
            }
            StatementKind::Using {
                name,
                resource,
                body,
            } => {
                match name {
                    Some(name) => self.line(&format!("using (var {} = {})", name, expr_text(resource))),
                    None => self.line(&format!("using ({})", expr_text(resource))),
                }
                self.block(body);
            }
            StatementKind::Throw { value: Some(value) } => {
                self.line(&format!("throw {};", expr_text(value)))
            }
            StatementKind::Throw { value: None } => self.line("throw;"),
            StatementKind::Break => self.line("break;"),
            StatementKind::Continue => self.line("continue;"),
            StatementKind::Comment { text } => self.comment(text),
        }
    }
}

fn attribute_text(binding: &BindingDescriptor) -> String {
    fn named(args: &mut Vec<String>, file: &Option<String>, generate: bool, generate_name: &str) {
        if let Some(file) = file {
            args.push(format!("File = {}", string_literal(file)));
        }
        if generate {
            args.push(format!("{} = true", generate_name));
        }
    }

    let (name, args) = match binding {
        BindingDescriptor::Class(c) => {
            let mut args = vec![string_literal(&c.module), string_literal(&c.class_path)];
            named(&mut args, &c.file, c.generate, "GenerateMethods");
            ("PythonClass", args)
        }
        BindingDescriptor::Field(f) => {
            let mut args: Vec<String> = f.name.iter().map(|n| string_literal(n)).collect();
            named(&mut args, &f.file, false, "");
            ("PythonField", args)
        }
        BindingDescriptor::Method(m) => {
            let mut args = vec![string_literal(&m.function_path)];
            named(&mut args, &m.file, m.generate, "Generate");
            ("PythonMethod", args)
        }
        BindingDescriptor::Operator(o) => ("PythonOperator", vec![format!("PythonOperator.{}", o.operator)]),
        BindingDescriptor::Property(p) => {
            let mut args: Vec<String> = [&p.getter_path, &p.setter_path]
                .into_iter()
                .flatten()
                .map(|path| string_literal(path))
                .collect();
            named(&mut args, &p.file, p.generate, "Generate");
            ("PythonProperty", args)
        }
    };
    if args.is_empty() {
        format!("[{}]", name)
    } else {
        format!("[{}({})]", name, args.join(", "))
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Binding strength, higher binds tighter
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assignment { .. } => 1,
        Expr::Binary { op, .. } => match op {
            BinaryOperator::LogicalOr => 3,
            BinaryOperator::LogicalAnd => 4,
            BinaryOperator::BitOr => 5,
            BinaryOperator::BitXor => 6,
            BinaryOperator::BitAnd => 7,
            BinaryOperator::Equals | BinaryOperator::NotEquals => 8,
            BinaryOperator::LessThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanOrEqual
            | BinaryOperator::Is => 9,
            BinaryOperator::LeftShift | BinaryOperator::RightShift => 10,
            BinaryOperator::Add | BinaryOperator::Subtract => 11,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 12,
        },
        Expr::Unary { .. } => 13,
        _ => 14,
    }
}

fn wrapped(expr: &Expr, min: u8) -> String {
    let text = expr_text(expr);
    if precedence(expr) < min {
        format!("({})", text)
    } else {
        text
    }
}

fn args_text(args: &[Arg]) -> String {
    args.iter()
        .map(|arg| match &arg.name {
            Some(name) => format!("{}: {}", name, expr_text(&arg.value)),
            None => expr_text(&arg.value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn expr_text(expr: &Expr) -> String {
    match expr {
        Expr::Literal { value } => match value {
            Literal::Null => "null".to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Int(i) => i.to_string(),
            Literal::Str(s) => string_literal(s),
        },
        Expr::Identifier { name } => name.clone(),
        Expr::This => "this".to_string(),
        Expr::QualifiedName { parts } => parts.join("."),
        Expr::MemberAccess { target, name } => format!("{}.{}", wrapped(target, 14), name),
        Expr::Invocation { target, args } => {
            format!("{}({})", wrapped(target, 14), args_text(args))
        }
        Expr::ElementAccess { target, index } => {
            format!("{}[{}]", wrapped(target, 14), expr_text(index))
        }
        Expr::Unary { op, operand } => {
            let inner = wrapped(operand, 13);
            // `- -x` must not render as the decrement operator
            if matches!(op, UnaryOperator::Negate | UnaryOperator::Plus)
                && inner.starts_with(op.symbol())
            {
                format!("{}({})", op.symbol(), inner)
            } else {
                format!("{}{}", op.symbol(), inner)
            }
        }
        Expr::Binary { op, left, right } => {
            let own = precedence(expr);
            format!(
                "{} {} {}",
                wrapped(left, own),
                op.symbol(),
                wrapped(right, own + 1)
            )
        }
        Expr::Parenthesized { inner } => format!("({})", expr_text(inner)),
        Expr::Assignment { target, op, value } => {
            let symbol = match op {
                Some(op) => format!("{}=", op.symbol()),
                None => "=".to_string(),
            };
            format!("{} {} {}", expr_text(target), symbol, expr_text(value))
        }
        Expr::Tuple { items } => {
            let items: Vec<String> = items.iter().map(expr_text).collect();
            format!("({})", items.join(", "))
        }
        Expr::ListInit {
            element_type,
            items,
        } => {
            let items: Vec<String> = items.iter().map(expr_text).collect();
            if items.is_empty() {
                format!("new List<{}>()", element_type)
            } else {
                format!("new List<{}> {{ {} }}", element_type, items.join(", "))
            }
        }
        Expr::DictInit {
            key_type,
            value_type,
            entries,
        } => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{{ {}, {} }}", expr_text(k), expr_text(v)))
                .collect();
            if entries.is_empty() {
                format!("new Dictionary<{}, {}>()", key_type, value_type)
            } else {
                format!(
                    "new Dictionary<{}, {}> {{ {} }}",
                    key_type,
                    value_type,
                    entries.join(", ")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::model::{HostField, HostMethod, HostTypeRef};

    #[test]
    fn test_precedence_parentheses() {
        let sum = Expr::binary(BinaryOperator::Add, Expr::ident("a"), Expr::ident("b"));
        let product = Expr::binary(BinaryOperator::Multiply, sum.clone(), Expr::ident("c"));
        assert_eq!(render_expr(&product), "(a + b) * c");

        let right = Expr::binary(BinaryOperator::Subtract, Expr::ident("a"), sum);
        assert_eq!(render_expr(&right), "a - (a + b)");

        let mask = Expr::binary(
            BinaryOperator::Equals,
            Expr::binary(BinaryOperator::BitAnd, Expr::ident("a"), Expr::ident("b")),
            Expr::int(0),
        );
        assert_eq!(render_expr(&mask), "(a & b) == 0");

        let not_eq = Expr::unary(
            UnaryOperator::Not,
            Expr::binary(BinaryOperator::Equals, Expr::ident("a"), Expr::ident("b")),
        );
        assert_eq!(render_expr(&not_eq), "!(a == b)");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(render_expr(&Expr::str("say \"hi\"\n")), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_if_else_chain_and_comments() {
        let mut ret = Statement::ret(Some(Expr::int(1)));
        ret.trailing.push("py2cs: Unknown name: y".to_string());
        let inner = Statement::new(StatementKind::If {
            condition: Expr::ident("b"),
            then: Block::new(vec![ret]),
            otherwise: Some(ElseBranch::Block {
                block: Block::new(vec![Statement::ret(None)]),
            }),
        });
        let outer = Statement::new(StatementKind::If {
            condition: Expr::ident("a"),
            then: Block::new(vec![Statement::new(StatementKind::Break)]),
            otherwise: Some(ElseBranch::If {
                statement: Box::new(inner),
            }),
        });

        let text = render_statement(&outer);
        assert_eq!(
            text,
            "if (a)\n{\n    break;\n}\nelse if (b)\n{\n    return 1;\n    // py2cs: Unknown name: y\n}\nelse\n{\n    return;\n}\n"
        );
    }

    #[test]
    fn test_render_document() {
        let document = HostDocument {
            path: "Vector.cs".into(),
            usings: vec!["System".to_string()],
            namespaces: vec![HostNamespace {
                name: "Geometry".to_string(),
                types: vec![HostType {
                    name: "Vector".to_string(),
                    bindings: Vec::new(),
                    members: vec![
                        HostMember::Field(HostField {
                            name: "Value".to_string(),
                            ty: HostTypeRef::Int,
                            bindings: Vec::new(),
                        }),
                        HostMember::Method(HostMethod {
                            name: "Get".to_string(),
                            is_static: false,
                            is_constructor: false,
                            params: Vec::new(),
                            return_type: HostTypeRef::Int,
                            body: Some(Block::new(vec![Statement::ret(Some(Expr::member(
                                Expr::This,
                                "Value",
                            )))])),
                            bindings: Vec::new(),
                            comments: Vec::new(),
                        }),
                    ],
                }],
                namespaces: Vec::new(),
            }],
        };

        let text = render_document(&document);
        assert!(text.starts_with("using System;\n\nnamespace Geometry\n{\n"));
        assert!(text.contains("    public partial class Vector\n"));
        assert!(text.contains("        public int Value;\n"));
        assert!(text.contains("        public int Get()\n        {\n            return this.Value;\n        }\n"));
    }
}
