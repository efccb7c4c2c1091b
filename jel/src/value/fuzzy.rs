//! Fuzzy booleans
//!
//! A graded truth value over the five-point lattice {0, 0.25, 0.5, 0.75, 1}.
//! The state is stored as a clamped decimal so graded comparison results
//! (approximate-number equality) land between lattice points without loss.

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::Value;
use crate::JelResult;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyBoolean {
    state: Decimal,
}

impl FuzzyBoolean {
    /// Build a fuzzy boolean, clamping the state into `[0, 1]`
    pub fn new(state: Decimal) -> Self {
        FuzzyBoolean {
            state: state.clamp(Decimal::ZERO, Decimal::ONE),
        }
    }

    pub fn clearly_false() -> Self {
        FuzzyBoolean {
            state: Decimal::ZERO,
        }
    }

    pub fn barely_false() -> Self {
        FuzzyBoolean {
            state: Decimal::new(25, 2),
        }
    }

    pub fn half_true() -> Self {
        FuzzyBoolean {
            state: Decimal::new(5, 1),
        }
    }

    pub fn barely_true() -> Self {
        FuzzyBoolean {
            state: Decimal::new(75, 2),
        }
    }

    pub fn clearly_true() -> Self {
        FuzzyBoolean { state: Decimal::ONE }
    }

    /// The five lattice points in ascending order
    pub fn lattice() -> [FuzzyBoolean; 5] {
        [
            Self::clearly_false(),
            Self::barely_false(),
            Self::half_true(),
            Self::barely_true(),
            Self::clearly_true(),
        ]
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::clearly_true()
        } else {
            Self::clearly_false()
        }
    }

    pub fn state(&self) -> Decimal {
        self.state
    }

    /// The derived exact boolean: true at and above the half-true point
    pub fn to_bool(&self) -> bool {
        self.state >= Decimal::new(5, 1)
    }

    pub fn negate(&self) -> Self {
        FuzzyBoolean {
            state: Decimal::ONE - self.state,
        }
    }
}

/// Binary operators with a fuzzy boolean on the left. Strict equality
/// compares lattice position; the lenient family compares the derived
/// boolean.
pub fn op(operator: Operator, left: &FuzzyBoolean, right: &Value) -> JelResult<Value> {
    let right_state = match right {
        Value::Fuzzy(r) => r.state(),
        Value::Boolean(b) => FuzzyBoolean::from_bool(*b).state(),
        _ => {
            return Err(JelError::unsupported(
                operator,
                format!("FuzzyBoolean and {}", right.type_name()),
            ))
        }
    };
    let right_bool = FuzzyBoolean::new(right_state).to_bool();

    let result = match operator {
        Operator::Equal => Value::lenient(left.to_bool() == right_bool),
        Operator::NotEqual => Value::lenient(left.to_bool() != right_bool),
        Operator::StrictEqual => Value::Boolean(left.state() == right_state),
        Operator::StrictNotEqual => Value::Boolean(left.state() != right_state),
        Operator::Less => Value::lenient(left.to_bool() < right_bool),
        Operator::Greater => Value::lenient(left.to_bool() > right_bool),
        Operator::LessEqual => Value::lenient(left.to_bool() <= right_bool),
        Operator::GreaterEqual => Value::lenient(left.to_bool() >= right_bool),
        Operator::StrictLess => Value::Boolean(left.state() < right_state),
        Operator::StrictGreater => Value::Boolean(left.state() > right_state),
        Operator::StrictLessEqual => Value::Boolean(left.state() <= right_state),
        Operator::StrictGreaterEqual => Value::Boolean(left.state() >= right_state),
        _ => {
            return Err(JelError::unsupported(
                operator,
                format!("FuzzyBoolean and {}", right.type_name()),
            ))
        }
    };
    Ok(result)
}

pub fn single_op(operator: Operator, operand: &FuzzyBoolean) -> JelResult<Value> {
    match operator {
        Operator::Not => Ok(Value::Fuzzy(operand.negate())),
        _ => Err(JelError::unsupported(operator, "FuzzyBoolean")),
    }
}
