//! Operator table
//!
//! Python operators with a direct host counterpart, and the result type of
//! each on primitive operands. Operators missing here are reported as
//! unsupported.

use crate::graph::{Primitive, Type};
use crate::host::{BinaryOperator, UnaryOperator};
use crate::python::{BinaryOp, BoolOp, CmpOp, UnaryOp};

pub(crate) fn unary_operator(op: UnaryOp) -> UnaryOperator {
    match op {
        UnaryOp::Not => UnaryOperator::Not,
        UnaryOp::Neg => UnaryOperator::Negate,
        UnaryOp::Pos => UnaryOperator::Plus,
        UnaryOp::Invert => UnaryOperator::BitNot,
    }
}

pub(crate) fn unary_result(op: UnaryOp, operand: Type) -> Type {
    match (op, operand.as_primitive()) {
        (UnaryOp::Not, _) => Type::BOOL,
        (UnaryOp::Neg | UnaryOp::Pos, Some(p)) if p.is_numeric() => operand,
        (UnaryOp::Invert, Some(Primitive::Int)) => Type::INT,
        _ => Type::Unknown,
    }
}

/// `//`, `**` and `@` have no single host operator
pub(crate) fn binary_operator(op: BinaryOp) -> Option<BinaryOperator> {
    Some(match op {
        BinaryOp::Add => BinaryOperator::Add,
        BinaryOp::Sub => BinaryOperator::Subtract,
        BinaryOp::Mul => BinaryOperator::Multiply,
        BinaryOp::Div => BinaryOperator::Divide,
        BinaryOp::Mod => BinaryOperator::Modulo,
        BinaryOp::LShift => BinaryOperator::LeftShift,
        BinaryOp::RShift => BinaryOperator::RightShift,
        BinaryOp::BitOr => BinaryOperator::BitOr,
        BinaryOp::BitXor => BinaryOperator::BitXor,
        BinaryOp::BitAnd => BinaryOperator::BitAnd,
        BinaryOp::FloorDiv | BinaryOp::Pow | BinaryOp::MatMul => return None,
    })
}

/// Result type of a binary operator on primitive operands
pub(crate) fn binary_result(op: BinaryOp, left: Type, right: Type) -> Type {
    let (Some(l), Some(r)) = (left.as_primitive(), right.as_primitive()) else {
        return Type::Unknown;
    };
    use Primitive::{Bool, Float, Int, Str};
    match op {
        BinaryOp::Add if l == Str && r == Str => Type::STR,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Mod => match (l, r) {
            (Int, Int) => Type::INT,
            (Int | Float, Int | Float) => Type::FLOAT,
            _ => Type::Unknown,
        },
        // true division always yields a float
        BinaryOp::Div if l.is_numeric() && r.is_numeric() => Type::FLOAT,
        BinaryOp::LShift | BinaryOp::RShift | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::BitAnd => {
            match (l, r) {
                (Int, Int) => Type::INT,
                (Bool, Bool) if !matches!(op, BinaryOp::LShift | BinaryOp::RShift) => Type::BOOL,
                _ => Type::Unknown,
            }
        }
        _ => Type::Unknown,
    }
}

pub(crate) fn bool_operator(op: BoolOp) -> BinaryOperator {
    match op {
        BoolOp::And => BinaryOperator::LogicalAnd,
        BoolOp::Or => BinaryOperator::LogicalOr,
    }
}

/// Comparisons with a direct host operator. `is not` is synthesized by the
/// caller; membership tests are unsupported.
pub(crate) fn compare_operator(op: CmpOp) -> Option<BinaryOperator> {
    Some(match op {
        CmpOp::Eq => BinaryOperator::Equals,
        CmpOp::NotEq => BinaryOperator::NotEquals,
        CmpOp::Lt => BinaryOperator::LessThan,
        CmpOp::LtE => BinaryOperator::LessThanOrEqual,
        CmpOp::Gt => BinaryOperator::GreaterThan,
        CmpOp::GtE => BinaryOperator::GreaterThanOrEqual,
        CmpOp::Is => BinaryOperator::Is,
        CmpOp::IsNot | CmpOp::In | CmpOp::NotIn => return None,
    })
}
