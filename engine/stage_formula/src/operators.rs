//! Operator implementations for the evaluator.
//!
//! The operator set is fixed, so dispatch is a plain `match` on the operator
//! enum rather than a trait object per operator.

use std::cmp::Ordering;

use stage_ir::{BinaryOp, UnaryOp, Value};

use crate::{EvalError, EvalResult};

/// Numeric view of an operand; numeric text and booleans coerce.
pub(crate) fn to_number(value: &Value) -> Result<f64, EvalError> {
    value.as_number().ok_or_else(|| EvalError::NotANumber {
        text: value.to_string(),
    })
}

/// Compare numerically when both sides coerce to numbers, else as text.
pub(crate) fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => Some(left.to_string().cmp(&right.to_string())),
    }
}

pub(crate) fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match op {
        UnaryOp::Neg => Ok(Value::Number(-to_number(operand)?)),
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

/// Apply a non-short-circuiting binary operator.
///
/// `and`/`or` are handled by the caller so that the right operand is only
/// evaluated when needed; passed here they combine truthiness.
pub(crate) fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Add => arith(left, right, |l, r| l + r),
        BinaryOp::Sub => arith(left, right, |l, r| l - r),
        BinaryOp::Mul => arith(left, right, |l, r| l * r),
        BinaryOp::Div => {
            let divisor = to_number(right)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(to_number(left)? / divisor))
        }
        BinaryOp::Pow => arith(left, right, f64::powf),
        BinaryOp::Eq => Ok(Value::Bool(compare(left, right) == Some(Ordering::Equal))),
        BinaryOp::NotEq => Ok(Value::Bool(compare(left, right) != Some(Ordering::Equal))),
        BinaryOp::Lt => Ok(Value::Bool(compare(left, right) == Some(Ordering::Less))),
        BinaryOp::LtEq => Ok(Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOp::Gt => Ok(Value::Bool(compare(left, right) == Some(Ordering::Greater))),
        BinaryOp::GtEq => Ok(Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

#[inline]
fn arith(left: &Value, right: &Value, op: fn(f64, f64) -> f64) -> EvalResult {
    Ok(Value::Number(op(to_number(left)?, to_number(right)?)))
}
