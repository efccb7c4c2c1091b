//! Ranges with optionally-unbounded ends

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::Value;
use crate::JelResult;
use std::cmp::Ordering;

/// A range between two comparable values; a missing bound is unbounded on
/// that side
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    min: Option<Box<Value>>,
    max: Option<Box<Value>>,
}

impl Range {
    pub fn new(min: Option<Value>, max: Option<Value>) -> Self {
        Range {
            min: min.map(Box::new),
            max: max.map(Box::new),
        }
    }

    pub fn min(&self) -> Option<&Value> {
        self.min.as_deref()
    }

    pub fn max(&self) -> Option<&Value> {
        self.max.as_deref()
    }

    /// Containment requires the value to be within both bounds when present;
    /// an absent bound never excludes
    pub fn contains(&self, value: &Value) -> JelResult<bool> {
        if let Some(min) = self.min() {
            if crate::dispatch::compare_values(value, min)? == Ordering::Less {
                return Ok(false);
            }
        }
        if let Some(max) = self.max() {
            if crate::dispatch::compare_values(value, max)? == Ordering::Greater {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The bound a best-effort ordering falls back to: the minimum when
    /// present, otherwise the maximum
    fn effective_bound(&self) -> Option<&Value> {
        self.min().or_else(|| self.max())
    }
}

fn bounds_equal(left: Option<&Value>, right: Option<&Value>) -> JelResult<bool> {
    match (left, right) {
        (None, None) => Ok(true),
        (Some(l), Some(r)) => {
            Ok(crate::dispatch::compare_values(l, r)? == Ordering::Equal)
        }
        _ => Ok(false),
    }
}

/// Strictly after: this range begins after the other ends. Unbounded sides
/// can never establish strict separation.
fn strictly_after(left: &Range, right_max: Option<&Value>) -> JelResult<bool> {
    match (left.min(), right_max) {
        (Some(min), Some(other)) => {
            Ok(crate::dispatch::compare_values(min, other)? == Ordering::Greater)
        }
        _ => Ok(false),
    }
}

fn strictly_before(left: &Range, right_min: Option<&Value>) -> JelResult<bool> {
    match (left.max(), right_min) {
        (Some(max), Some(other)) => {
            Ok(crate::dispatch::compare_values(max, other)? == Ordering::Less)
        }
        _ => Ok(false),
    }
}

/// Best-effort lenient ordering using whichever bound is defined on each
/// side; ranges with no bounds at all cannot be ordered
fn best_effort(left: &Range, right_bound: Option<&Value>) -> JelResult<Ordering> {
    match (left.effective_bound(), right_bound) {
        (Some(l), Some(r)) => crate::dispatch::compare_values(l, r),
        _ => Err(JelError::unsupported(
            "ordering",
            "an unbounded Range on both sides",
        )),
    }
}

pub fn op(operator: Operator, left: &Range, right: &Value) -> JelResult<Value> {
    // A range partner compares bound-to-bound; a scalar partner is treated
    // as the degenerate single-point range.
    let (right_min, right_max, right_effective) = match right {
        Value::Range(r) => (r.min(), r.max(), r.effective_bound()),
        scalar => (Some(scalar), Some(scalar), Some(scalar)),
    };

    let result = match operator {
        Operator::Equal | Operator::StrictEqual => {
            let equal = bounds_equal(left.min(), right_min)?
                && bounds_equal(left.max(), right_max)?;
            if operator == Operator::StrictEqual {
                Value::Boolean(equal)
            } else {
                Value::lenient(equal)
            }
        }
        Operator::NotEqual | Operator::StrictNotEqual => {
            let equal = bounds_equal(left.min(), right_min)?
                && bounds_equal(left.max(), right_max)?;
            if operator == Operator::StrictNotEqual {
                Value::Boolean(!equal)
            } else {
                Value::lenient(!equal)
            }
        }
        Operator::StrictGreater => Value::Boolean(strictly_after(left, right_max)?),
        Operator::StrictLess => Value::Boolean(strictly_before(left, right_min)?),
        Operator::StrictGreaterEqual => {
            let after = strictly_after(left, right_max)?;
            let touching = match (left.min(), right_max) {
                (Some(min), Some(other)) => {
                    crate::dispatch::compare_values(min, other)? != Ordering::Less
                }
                _ => false,
            };
            Value::Boolean(after || touching)
        }
        Operator::StrictLessEqual => {
            let before = strictly_before(left, right_min)?;
            let touching = match (left.max(), right_min) {
                (Some(max), Some(other)) => {
                    crate::dispatch::compare_values(max, other)? != Ordering::Greater
                }
                _ => false,
            };
            Value::Boolean(before || touching)
        }
        Operator::Greater => Value::lenient(best_effort(left, right_effective)? == Ordering::Greater),
        Operator::Less => Value::lenient(best_effort(left, right_effective)? == Ordering::Less),
        Operator::GreaterEqual => {
            Value::lenient(best_effort(left, right_effective)? != Ordering::Less)
        }
        Operator::LessEqual => {
            Value::lenient(best_effort(left, right_effective)? != Ordering::Greater)
        }
        _ => {
            return Err(JelError::unsupported(
                operator,
                format!("Range and {}", right.type_name()),
            ))
        }
    };
    Ok(result)
}

pub fn single_op(operator: Operator, operand: &Range) -> JelResult<Value> {
    match operator {
        Operator::Min => Ok(operand.min().cloned().unwrap_or(Value::Null)),
        Operator::Max => Ok(operand.max().cloned().unwrap_or(Value::Null)),
        _ => Err(JelError::unsupported(operator, "Range")),
    }
}
