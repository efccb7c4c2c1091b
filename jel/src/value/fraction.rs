//! Exact rational numbers
//!
//! The denominator is normalized to be positive at construction; a zero
//! denominator is a construction error. Arithmetic between fractions and
//! integers stays exact (cross-multiplication in 128-bit intermediates);
//! arithmetic with a non-integer number falls back to decimal evaluation.

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::{ApproximateNumber, Value};
use crate::JelResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    numerator: i64,
    denominator: i64,
}

impl Fraction {
    pub fn new(numerator: i64, denominator: i64) -> JelResult<Self> {
        if denominator == 0 {
            return Err(JelError::Construction(
                "Fraction denominator must not be zero".to_string(),
            ));
        }
        if denominator < 0 {
            Ok(Fraction {
                numerator: -numerator,
                denominator: -denominator,
            })
        } else {
            Ok(Fraction {
                numerator,
                denominator,
            })
        }
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }

    /// Reduce by the GCD; an integral result collapses to a plain number
    pub fn simplify(&self) -> Value {
        let g = gcd(self.numerator as i128, self.denominator as i128) as i64;
        let numerator = self.numerator / g;
        let denominator = self.denominator / g;
        if denominator == 1 {
            Value::Number(Decimal::from(numerator))
        } else {
            Value::Fraction(Fraction {
                numerator,
                denominator,
            })
        }
    }

    /// Exact ordering against another fraction by cross-multiplication
    pub fn compare(&self, other: &Fraction) -> Ordering {
        let left = self.numerator as i128 * other.denominator as i128;
        let right = other.numerator as i128 * self.denominator as i128;
        left.cmp(&right)
    }
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    if a == 0 {
        1
    } else {
        a
    }
}

/// Build a simplified value from raw 128-bit terms, falling back to a
/// construction error if the reduced terms still overflow 64 bits
fn from_terms(numerator: i128, denominator: i128) -> JelResult<Value> {
    if denominator == 0 {
        return Err(JelError::Construction("division by zero".to_string()));
    }
    let (numerator, denominator) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    let g = gcd(numerator, denominator);
    let (numerator, denominator) = (numerator / g, denominator / g);
    match (i64::try_from(numerator), i64::try_from(denominator)) {
        (Ok(n), Ok(d)) => Ok(Fraction {
            numerator: n,
            denominator: d,
        }
        .simplify()),
        _ => Err(JelError::Construction(
            "fraction terms exceed the representable range".to_string(),
        )),
    }
}

fn arithmetic(operator: Operator, left: &Fraction, right: &Fraction) -> JelResult<Value> {
    let (ln, ld) = (left.numerator as i128, left.denominator as i128);
    let (rn, rd) = (right.numerator as i128, right.denominator as i128);
    match operator {
        Operator::Add => from_terms(ln * rd + rn * ld, ld * rd),
        Operator::Subtract => from_terms(ln * rd - rn * ld, ld * rd),
        Operator::Multiply => from_terms(ln * rn, ld * rd),
        Operator::Divide => from_terms(ln * rd, ld * rn),
        Operator::Modulo => {
            if right.numerator == 0 {
                return Err(JelError::Construction("division by zero".to_string()));
            }
            let remainder = left.to_decimal() % right.to_decimal();
            Ok(Value::Number(remainder))
        }
        _ => Err(JelError::unsupported(operator, "Fraction and Fraction")),
    }
}

/// An integer-valued number promotes to an exact fraction; anything else
/// forces decimal evaluation
fn as_integer(number: &Decimal) -> Option<i64> {
    if number.fract().is_zero() {
        number.to_i64()
    } else {
        None
    }
}

pub fn op(operator: Operator, left: &Fraction, right: &Value) -> JelResult<Value> {
    match right {
        Value::Fraction(r) => {
            if operator.is_equality() || operator.is_ordering() {
                Ok(crate::dispatch::comparison(operator, left.compare(r)))
            } else {
                arithmetic(operator, left, r)
            }
        }
        Value::Number(n) => match as_integer(n) {
            Some(i) => {
                let promoted = Fraction {
                    numerator: i,
                    denominator: 1,
                };
                op(operator, left, &Value::Fraction(promoted))
            }
            None => crate::dispatch::decimal_op(operator, left.to_decimal(), *n),
        },
        Value::Approximate(_) => {
            let promoted = ApproximateNumber::new(left.to_decimal(), Decimal::ZERO);
            crate::value::approx::op(operator, &promoted, right)
        }
        _ => Err(JelError::unsupported(
            operator,
            format!("Fraction and {}", right.type_name()),
        )),
    }
}

pub fn single_op(operator: Operator, operand: &Fraction) -> JelResult<Value> {
    match operator {
        Operator::Negate => Ok(Value::Fraction(Fraction {
            numerator: -operand.numerator,
            denominator: operand.denominator,
        })),
        Operator::Abs => Ok(Value::Fraction(Fraction {
            numerator: operand.numerator.abs(),
            denominator: operand.denominator,
        })),
        _ => Err(JelError::unsupported(operator, "Fraction")),
    }
}
