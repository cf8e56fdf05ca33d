//! Expression translation
//!
//! Every expression yields a host expression plus its graph type, or the
//! diagnostics of every failing sub-expression.

use super::diagnostics::{collect, join, Diagnostics, TranslateError, Translation};
use super::ops;
use super::state::{TranslatorState, TypedExpr};
use super::Translator;
use crate::graph::{NodeId, NodeKind, Type};
use crate::host::{Arg, BinaryOperator, Expr as HostExpr, UnaryOperator};
use crate::mapper::host_type;
use crate::bindings::OperatorKind;
use crate::python::{Argument, BinaryOp, CmpOp, DictEntry, Expr, Literal};

impl<'g> Translator<'g> {
    /// Translate one expression against `state`
    pub fn translate_expr(&self, expr: &Expr, state: &TranslatorState) -> Translation<TypedExpr> {
        match expr {
            Expr::Constant(literal) => self.literal(literal),
            Expr::Name(name) => match name.as_str() {
                "True" => Ok(TypedExpr::new(HostExpr::bool(true), Type::BOOL)),
                "False" => Ok(TypedExpr::new(HostExpr::bool(false), Type::BOOL)),
                _ => state.lookup(name),
            },
            Expr::Attribute { value, attr } => {
                let target = self.translate_expr(value, state)?;
                let member = self.member(&target, attr)?;
                Ok(self.member_access(target, member))
            }
            Expr::Unary { op, operand } => {
                let operand = self.translate_expr(operand, state)?;
                let ty = ops::unary_result(*op, operand.ty);
                Ok(TypedExpr::new(
                    HostExpr::unary(ops::unary_operator(*op), operand.syntax),
                    ty,
                ))
            }
            Expr::Binary { op, left, right } => {
                let operands = join(
                    self.translate_expr(left, state),
                    self.translate_expr(right, state),
                );
                let operator = ops::binary_operator(*op).ok_or_else(|| {
                    Diagnostics::from(TranslateError::UnsupportedOperator(op.symbol().to_string()))
                });
                let ((left, right), operator) = join(operands, operator)?;
                let ty = self.binary_type(*op, left.ty, right.ty);
                Ok(TypedExpr::new(
                    HostExpr::binary(operator, left.syntax, right.syntax),
                    ty,
                ))
            }
            Expr::BoolOp { op, left, right } => {
                let (left, right) = join(
                    self.translate_expr(left, state),
                    self.translate_expr(right, state),
                )?;
                Ok(TypedExpr::new(
                    HostExpr::binary(ops::bool_operator(*op), left.syntax, right.syntax),
                    Type::BOOL,
                ))
            }
            Expr::Compare { op, left, right } => self.compare(*op, left, right, state),
            Expr::Paren(inner) => {
                let inner = self.translate_expr(inner, state)?;
                Ok(TypedExpr::new(HostExpr::paren(inner.syntax), inner.ty))
            }
            Expr::List(items) => {
                let items = collect(items.iter().map(|item| self.translate_expr(item, state)))?;
                let element_type = self.common_host_type(items.iter().map(|item| item.ty));
                Ok(TypedExpr::untyped(HostExpr::ListInit {
                    element_type,
                    items: items.into_iter().map(|item| item.syntax).collect(),
                }))
            }
            Expr::Dict(entries) => self.dict(entries, state),
            Expr::Tuple(items) => {
                let items = collect(items.iter().map(|item| self.translate_expr(item, state)))?;
                Ok(TypedExpr::untyped(HostExpr::Tuple {
                    items: items.into_iter().map(|item| item.syntax).collect(),
                }))
            }
            Expr::Subscript { value, index } => {
                let (target, index) = join(
                    self.translate_expr(value, state),
                    self.translate_expr(index, state),
                )?;
                Ok(TypedExpr::untyped(HostExpr::ElementAccess {
                    target: Box::new(target.syntax),
                    index: Box::new(index.syntax),
                }))
            }
            Expr::Slice { .. } => Err(TranslateError::UnsupportedExpression("slice".to_string()).into()),
            Expr::Call { func, args } => self.call(func, args, state),
            Expr::Unsupported(kind) => Err(TranslateError::UnsupportedExpression(kind.clone()).into()),
        }
    }

    fn literal(&self, literal: &Literal) -> Translation<TypedExpr> {
        match literal {
            Literal::None => Ok(TypedExpr::new(HostExpr::null(), Type::NONE)),
            Literal::Int(value) => Ok(TypedExpr::new(HostExpr::int(*value), Type::INT)),
            Literal::Str(value) => Ok(TypedExpr::new(HostExpr::str(value.clone()), Type::STR)),
            other => Err(TranslateError::UnsupportedLiteral(format!("{} ({})", other.kind_name(), other)).into()),
        }
    }

    /// Resolve `attr` among the children of the target's class
    fn member(&self, target: &TypedExpr, attr: &str) -> Translation<NodeId> {
        match target.ty {
            Type::Unknown => Err(TranslateError::UntypedTarget(attr.to_string()).into()),
            Type::Primitive(primitive) => Err(TranslateError::PrimitiveTarget {
                ty: primitive.to_string(),
                member: attr.to_string(),
            }
            .into()),
            Type::Class(class) => self.graph.child(class, attr).ok_or_else(|| {
                TranslateError::UnknownMember {
                    class: self.graph.name(class).to_string(),
                    member: attr.to_string(),
                }
                .into()
            }),
        }
    }

    fn member_access(&self, target: TypedExpr, member: NodeId) -> TypedExpr {
        let name = self.graph.host_name(member).to_string();
        let syntax = match self.graph.function(member).and_then(|f| f.host.as_ref()) {
            Some(host) if host.is_static => HostExpr::member(HostExpr::ident(host.owner.clone()), name),
            _ => HostExpr::member(target.syntax, name),
        };
        TypedExpr::new(syntax, self.graph.member_type(member))
    }

    /// Operator bindings on the left operand's class take precedence over
    /// the primitive table.
    fn binary_type(&self, op: BinaryOp, left: Type, right: Type) -> Type {
        let bound = left.as_class().and_then(|class| {
            let kind = OperatorKind::from_binary(op)?;
            let function = self.graph.child(class, &kind.graph_key())?;
            self.graph.function(function).map(|f| f.return_type)
        });
        bound.unwrap_or_else(|| ops::binary_result(op, left, right))
    }

    fn compare(&self, op: CmpOp, left: &Expr, right: &Expr, state: &TranslatorState) -> Translation<TypedExpr> {
        let operands = join(
            self.translate_expr(left, state),
            self.translate_expr(right, state),
        );

        if op == CmpOp::IsNot {
            let (left, right) = operands?;
            let is = HostExpr::binary(BinaryOperator::Is, left.syntax, right.syntax);
            return Ok(TypedExpr::new(
                HostExpr::unary(UnaryOperator::Not, HostExpr::paren(is)),
                Type::BOOL,
            ));
        }

        let operator = ops::compare_operator(op)
            .ok_or_else(|| Diagnostics::from(TranslateError::UnsupportedOperator(op.symbol().to_string())));
        let ((left, right), operator) = join(operands, operator)?;
        Ok(TypedExpr::new(
            HostExpr::binary(operator, left.syntax, right.syntax),
            Type::BOOL,
        ))
    }

    fn dict(&self, entries: &[DictEntry], state: &TranslatorState) -> Translation<TypedExpr> {
        let entries = collect(entries.iter().map(|entry| {
            let pair = join(
                self.translate_expr(&entry.key, state),
                self.translate_expr(&entry.value, state),
            );
            let step = match entry.step {
                Some(_) => Err(Diagnostics::from(TranslateError::DictStep)),
                None => Ok(()),
            };
            join(pair, step).map(|(pair, _)| pair)
        }))?;

        let key_type = self.common_host_type(entries.iter().map(|(k, _)| k.ty));
        let value_type = self.common_host_type(entries.iter().map(|(_, v)| v.ty));
        Ok(TypedExpr::untyped(HostExpr::DictInit {
            key_type,
            value_type,
            entries: entries.into_iter().map(|(k, v)| (k.syntax, v.syntax)).collect(),
        }))
    }

    fn call(&self, func: &Expr, args: &[Argument], state: &TranslatorState) -> Translation<TypedExpr> {
        let callee = self.callee(func, state);
        let args = collect(args.iter().map(|arg| {
            self.translate_expr(&arg.value, state).map(|value| Arg {
                name: arg.name.clone(),
                value: value.syntax,
            })
        }));
        let ((target, function), mut args) = join(callee, args)?;

        let return_type = function
            .and_then(|id| self.graph.function(id))
            .map(|f| f.return_type)
            .unwrap_or(Type::Unknown);

        // static host methods take the receiver as their first argument
        let syntax = match (&target.syntax, function.and_then(|id| self.host_static(id))) {
            (HostExpr::MemberAccess { target: receiver, name }, Some(owner)) => {
                args.insert(0, Arg::positional((**receiver).clone()));
                HostExpr::invoke(HostExpr::member(HostExpr::ident(owner), name.clone()), args)
            }
            _ => HostExpr::invoke(target.syntax, args),
        };
        Ok(TypedExpr::new(syntax, return_type))
    }

    /// The callee expression, and the bound function it names if any
    fn callee(&self, func: &Expr, state: &TranslatorState) -> Translation<(TypedExpr, Option<NodeId>)> {
        match func {
            Expr::Attribute { value, attr } => {
                let target = self.translate_expr(value, state)?;
                let member = self.member(&target, attr)?;
                let function = self.graph.function(member).map(|_| member);
                let name = self.graph.host_name(member).to_string();
                let ty = self.graph.member_type(member);
                Ok((TypedExpr::new(HostExpr::member(target.syntax, name), ty), function))
            }
            other => Ok((self.translate_expr(other, state)?, None)),
        }
    }

    fn host_static(&self, function: NodeId) -> Option<String> {
        match &self.graph.node(function).kind {
            NodeKind::Function(f) => f
                .host
                .as_ref()
                .filter(|host| host.is_static)
                .map(|host| host.owner.clone()),
            _ => None,
        }
    }

    /// Host spelling of the type every item shares, `object` otherwise
    fn common_host_type(&self, mut types: impl Iterator<Item = Type>) -> String {
        let first = types.next().unwrap_or(Type::Unknown);
        let ty = if types.all(|ty| ty == first) { first } else { Type::Unknown };
        host_type(self.graph, ty).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FieldNode, GraphBuilder, Graph, HostMethodRef};
    use crate::host::render::render_expr;

    fn graph_with_vector() -> (Graph, NodeId) {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("shapes");
        let vector = builder.get_or_add_class(module, "Vector").unwrap();
        let field = builder.add_child(vector, "value", NodeKind::Field(FieldNode::default()));
        builder.set_type(field, Type::INT);
        builder.set_host_name(field, "Value");
        builder.add_child(vector, "scale", NodeKind::Function(Default::default()));
        (builder.finalize(), vector)
    }

    /// Vector with a bound instance method, a bound `-` operator and a
    /// static host method taking the receiver first
    fn graph_with_bound_functions() -> (Graph, NodeId) {
        let mut builder = GraphBuilder::new();
        let module = builder.get_or_add_module("shapes");
        let vector = builder.get_or_add_class(module, "Vector").unwrap();
        builder.set_host_name(vector, "Vector");

        let add = builder.add_child(vector, "add", NodeKind::Function(Default::default()));
        builder.set_return_type(add, Type::Class(vector));
        builder.set_host_method(
            add,
            HostMethodRef {
                name: "Add".to_string(),
                owner: "Vector".to_string(),
                is_static: false,
            },
        );

        let subtract = OperatorKind::from_binary(BinaryOp::Sub).unwrap().graph_key();
        let subtract = builder.add_child(vector, subtract, NodeKind::Function(Default::default()));
        builder.set_return_type(subtract, Type::FLOAT);

        let combine = builder.add_child(vector, "combine", NodeKind::Function(Default::default()));
        builder.set_return_type(combine, Type::Class(vector));
        builder.set_host_method(
            combine,
            HostMethodRef {
                name: "Combine".to_string(),
                owner: "Vector".to_string(),
                is_static: true,
            },
        );
        (builder.finalize(), vector)
    }

    fn render(result: Translation<TypedExpr>) -> (String, Type) {
        let typed = result.unwrap();
        (render_expr(&typed.syntax), typed.ty)
    }

    #[test]
    fn test_literals_and_names() {
        let graph = GraphBuilder::new().finalize();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty();

        assert_eq!(render(translator.translate_expr(&Expr::int(1), &state)), ("1".to_string(), Type::INT));
        assert_eq!(
            render(translator.translate_expr(&Expr::Constant(Literal::None), &state)),
            ("null".to_string(), Type::NONE)
        );
        assert_eq!(
            render(translator.translate_expr(&Expr::name("True"), &state)),
            ("true".to_string(), Type::BOOL)
        );

        let float = translator.translate_expr(&Expr::Constant(Literal::Float(1.5)), &state);
        assert!(matches!(
            float.unwrap_err().errors(),
            [TranslateError::UnsupportedLiteral(_)]
        ));
        let unknown = translator.translate_expr(&Expr::name("nope"), &state).unwrap_err();
        assert_eq!(unknown.errors(), &[TranslateError::UnknownName("nope".to_string())]);
    }

    #[test]
    fn test_bool_ops_keep_operand_order() {
        let graph = GraphBuilder::new().finalize();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty()
            .with("a", TypedExpr::untyped(HostExpr::ident("a")))
            .with("b", TypedExpr::untyped(HostExpr::ident("b")));

        for (op, expected) in [(crate::python::BoolOp::And, "a && b"), (crate::python::BoolOp::Or, "a || b")] {
            let expr = Expr::BoolOp {
                op,
                left: Box::new(Expr::name("a")),
                right: Box::new(Expr::name("b")),
            };
            assert_eq!(render(translator.translate_expr(&expr, &state)), (expected.to_string(), Type::BOOL));
        }
    }

    #[test]
    fn test_is_not_becomes_negated_is() {
        let graph = GraphBuilder::new().finalize();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty().with("x", TypedExpr::untyped(HostExpr::ident("x")));
        let expr = Expr::Compare {
            op: CmpOp::IsNot,
            left: Box::new(Expr::name("x")),
            right: Box::new(Expr::Constant(Literal::None)),
        };

        let typed = translator.translate_expr(&expr, &state).unwrap();
        assert!(matches!(
            &typed.syntax,
            HostExpr::Unary { op: UnaryOperator::Not, operand } if matches!(**operand, HostExpr::Parenthesized { .. })
        ));
        assert_eq!(render_expr(&typed.syntax), "!(x is null)");
        assert_eq!(typed.ty, Type::BOOL);
    }

    #[test]
    fn test_member_access_follows_target_type() {
        let (graph, vector) = graph_with_vector();
        let translator = Translator::new(&graph);
        let access = Expr::attr(Expr::name("self"), "value");

        let untyped = TranslatorState::empty().with("self", TypedExpr::untyped(HostExpr::This));
        let err = translator.translate_expr(&access, &untyped).unwrap_err();
        assert_eq!(err.errors(), &[TranslateError::UntypedTarget("value".to_string())]);

        let typed = TranslatorState::empty().with("self", TypedExpr::new(HostExpr::This, Type::Class(vector)));
        assert_eq!(
            render(translator.translate_expr(&access, &typed)),
            ("this.Value".to_string(), Type::INT)
        );

        let method = Expr::attr(Expr::name("self"), "scale");
        assert_eq!(
            render(translator.translate_expr(&method, &typed)),
            ("this.scale".to_string(), Type::Unknown)
        );

        let missing = translator
            .translate_expr(&Expr::attr(Expr::name("self"), "nope"), &typed)
            .unwrap_err();
        assert!(matches!(missing.errors(), [TranslateError::UnknownMember { .. }]));

        let primitive = TranslatorState::empty().with("n", TypedExpr::new(HostExpr::ident("n"), Type::INT));
        let err = translator
            .translate_expr(&Expr::attr(Expr::name("n"), "real"), &primitive)
            .unwrap_err();
        assert!(matches!(err.errors(), [TranslateError::PrimitiveTarget { .. }]));
    }

    #[test]
    fn test_binary_diagnostics_concatenate() {
        let graph = GraphBuilder::new().finalize();
        let translator = Translator::new(&graph);
        let expr = Expr::binary(BinaryOp::FloorDiv, Expr::name("a"), Expr::name("b"));

        let err = translator.translate_expr(&expr, &TranslatorState::empty()).unwrap_err();
        assert_eq!(
            err.errors(),
            &[
                TranslateError::UnknownName("a".to_string()),
                TranslateError::UnknownName("b".to_string()),
                TranslateError::UnsupportedOperator("//".to_string()),
            ]
        );
    }

    #[test]
    fn test_collections_and_calls() {
        let graph = GraphBuilder::new().finalize();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty().with("f", TypedExpr::untyped(HostExpr::ident("f")));

        let list = Expr::List(vec![Expr::int(1), Expr::int(2)]);
        assert_eq!(render(translator.translate_expr(&list, &state)).0, "new List<int> { 1, 2 }");

        let dict = Expr::Dict(vec![DictEntry {
            key: Expr::str("a"),
            value: Expr::int(1),
            step: None,
        }]);
        assert_eq!(
            render(translator.translate_expr(&dict, &state)).0,
            "new Dictionary<string, int> { { \"a\", 1 } }"
        );

        let stepped = Expr::Dict(vec![DictEntry {
            key: Expr::str("a"),
            value: Expr::int(1),
            step: Some(Expr::int(2)),
        }]);
        let err = translator.translate_expr(&stepped, &state).unwrap_err();
        assert_eq!(err.errors(), &[TranslateError::DictStep]);

        let call = Expr::Call {
            func: Box::new(Expr::name("f")),
            args: vec![
                Argument { name: None, value: Expr::int(1) },
                Argument { name: Some("key".to_string()), value: Expr::str("k") },
            ],
        };
        assert_eq!(render(translator.translate_expr(&call, &state)), ("f(1, key: \"k\")".to_string(), Type::Unknown));
    }

    #[test]
    fn test_bound_operator_types_binary_expression() {
        let (graph, vector) = graph_with_bound_functions();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty()
            .with("self", TypedExpr::new(HostExpr::This, Type::Class(vector)))
            .with("other", TypedExpr::new(HostExpr::ident("other"), Type::Class(vector)));

        let minus = Expr::binary(BinaryOp::Sub, Expr::name("self"), Expr::name("other"));
        assert_eq!(
            render(translator.translate_expr(&minus, &state)),
            ("this - other".to_string(), Type::FLOAT)
        );

        // no operator binding for `*` on Vector
        let times = Expr::binary(BinaryOp::Mul, Expr::name("self"), Expr::name("other"));
        assert_eq!(
            render(translator.translate_expr(&times, &state)),
            ("this * other".to_string(), Type::Unknown)
        );
    }

    #[test]
    fn test_calls_take_bound_return_type_and_static_receiver() {
        let (graph, vector) = graph_with_bound_functions();
        let translator = Translator::new(&graph);
        let state = TranslatorState::empty()
            .with("self", TypedExpr::new(HostExpr::This, Type::Class(vector)))
            .with("o", TypedExpr::new(HostExpr::ident("o"), Type::Class(vector)));

        let add = Expr::Call {
            func: Box::new(Expr::attr(Expr::name("self"), "add")),
            args: vec![Argument { name: None, value: Expr::int(1) }],
        };
        assert_eq!(
            render(translator.translate_expr(&add, &state)),
            ("this.Add(1)".to_string(), Type::Class(vector))
        );

        let combine = Expr::Call {
            func: Box::new(Expr::attr(Expr::name("self"), "combine")),
            args: vec![Argument { name: None, value: Expr::name("o") }],
        };
        assert_eq!(
            render(translator.translate_expr(&combine, &state)),
            ("Vector.Combine(this, o)".to_string(), Type::Class(vector))
        );

        // chained: the bound return type makes the result a Vector again
        let chained = Expr::Call {
            func: Box::new(Expr::attr(add, "add")),
            args: vec![Argument { name: None, value: Expr::int(2) }],
        };
        assert_eq!(
            render(translator.translate_expr(&chained, &state)),
            ("this.Add(1).Add(2)".to_string(), Type::Class(vector))
        );
    }
}
