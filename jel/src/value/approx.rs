//! Error-bearing approximate numbers
//!
//! An `ApproximateNumber` carries a value and a maximum absolute error.
//! Arithmetic propagates the error bound; the lenient comparison family
//! consults it and yields graded fuzzy results, while the strict family
//! compares the central values exactly.

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::{FuzzyBoolean, Value};
use crate::JelResult;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproximateNumber {
    value: Decimal,
    max_error: Decimal,
}

impl ApproximateNumber {
    pub fn new(value: Decimal, max_error: Decimal) -> Self {
        ApproximateNumber {
            value,
            max_error: max_error.abs(),
        }
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn max_error(&self) -> Decimal {
        self.max_error
    }
}

/// Lift any numeric partner into an approximate number (exact values carry
/// a zero error bound)
fn promote(value: &Value) -> Option<ApproximateNumber> {
    match value {
        Value::Approximate(a) => Some(*a),
        Value::Number(n) => Some(ApproximateNumber::new(*n, Decimal::ZERO)),
        Value::Fraction(f) => Some(ApproximateNumber::new(f.to_decimal(), Decimal::ZERO)),
        _ => None,
    }
}

fn arithmetic(
    operator: Operator,
    left: &ApproximateNumber,
    right: &ApproximateNumber,
) -> JelResult<Value> {
    let (lv, le) = (left.value, left.max_error);
    let (rv, re) = (right.value, right.max_error);
    let (value, error) = match operator {
        Operator::Add => (lv + rv, le + re),
        Operator::Subtract => (lv - rv, le + re),
        Operator::Multiply => (lv * rv, (le * rv).abs() + (re * lv).abs()),
        Operator::Divide => {
            let value = lv
                .checked_div(rv)
                .ok_or_else(|| JelError::Construction("division by zero".to_string()))?;
            (value, (le * rv).abs() + (re * lv).abs())
        }
        _ => {
            return Err(JelError::unsupported(
                operator,
                "ApproximateNumber and ApproximateNumber",
            ))
        }
    };
    if error.is_zero() {
        Ok(Value::Number(value))
    } else {
        Ok(Value::Approximate(ApproximateNumber::new(value, error)))
    }
}

/// Graded equality: exact-true on identical values, exact-false when the
/// combined error is zero and the values differ, otherwise a truth state
/// proportional to `1 - 0.5 * |delta| / combined_error`, clamped
fn graded_equality(left: &ApproximateNumber, right: &ApproximateNumber) -> FuzzyBoolean {
    if left.value == right.value {
        return FuzzyBoolean::clearly_true();
    }
    let combined = left.max_error + right.max_error;
    if combined.is_zero() {
        return FuzzyBoolean::clearly_false();
    }
    let delta = (left.value - right.value).abs();
    let half = Decimal::new(5, 1);
    FuzzyBoolean::new(Decimal::ONE - half * delta / combined)
}

/// Graded ordering for `left < right`: clearly true/false when the error
/// intervals are disjoint, otherwise a state proportional to the overlap
fn graded_less(left: &ApproximateNumber, right: &ApproximateNumber) -> FuzzyBoolean {
    let combined = left.max_error + right.max_error;
    if combined.is_zero() {
        return FuzzyBoolean::from_bool(left.value < right.value);
    }
    let half = Decimal::new(5, 1);
    FuzzyBoolean::new(half + half * (right.value - left.value) / combined)
}

pub fn op(operator: Operator, left: &ApproximateNumber, right: &Value) -> JelResult<Value> {
    let right = promote(right).ok_or_else(|| {
        JelError::unsupported(
            operator,
            format!("ApproximateNumber and {}", right.type_name()),
        )
    })?;

    let result = match operator {
        Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
            return arithmetic(operator, left, &right)
        }
        Operator::Equal => Value::Fuzzy(graded_equality(left, &right)),
        Operator::NotEqual => Value::Fuzzy(graded_equality(left, &right).negate()),
        Operator::Less => Value::Fuzzy(graded_less(left, &right)),
        Operator::Greater => Value::Fuzzy(graded_less(&right, left)),
        Operator::LessEqual => Value::Fuzzy(graded_less(&right, left).negate()),
        Operator::GreaterEqual => Value::Fuzzy(graded_less(left, &right).negate()),
        Operator::StrictEqual => Value::Boolean(left.value == right.value),
        Operator::StrictNotEqual => Value::Boolean(left.value != right.value),
        Operator::StrictLess => Value::Boolean(left.value < right.value),
        Operator::StrictGreater => Value::Boolean(left.value > right.value),
        Operator::StrictLessEqual => Value::Boolean(left.value <= right.value),
        Operator::StrictGreaterEqual => Value::Boolean(left.value >= right.value),
        _ => {
            return Err(JelError::unsupported(
                operator,
                "ApproximateNumber and ApproximateNumber",
            ))
        }
    };
    Ok(result)
}

pub fn single_op(operator: Operator, operand: &ApproximateNumber) -> JelResult<Value> {
    match operator {
        Operator::Negate => Ok(Value::Approximate(ApproximateNumber::new(
            -operand.value,
            operand.max_error,
        ))),
        Operator::Abs => Ok(Value::Approximate(ApproximateNumber::new(
            operand.value.abs(),
            operand.max_error,
        ))),
        _ => Err(JelError::unsupported(operator, "ApproximateNumber")),
    }
}
