//! The runtime value family
//!
//! `Value` is a closed sum over every type an expression can evaluate to.
//! Each composite variant exposes `serialization_properties()` (the ordered
//! constructor arguments sufficient to rebuild an equal instance) and a
//! `type_name()` used by dispatch errors, the method registry and
//! `instanceof`. `Display` prints canonical constructor-call source text
//! that parses back to an equal value.

pub mod approx;
pub mod calendar;
pub mod distribution;
pub mod fraction;
pub mod fuzzy;
pub mod range;
pub mod units;

pub use approx::ApproximateNumber;
pub use calendar::{Date, Duration, Time};
pub use distribution::{Distribution, DistributionPoint};
pub use fraction::Fraction;
pub use fuzzy::FuzzyBoolean;
pub use range::Range;
pub use units::{CompoundUnit, UnitValue};

use crate::ast::Node;
use crate::context::Context;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A lambda with its captured lexical context. Equality is by identity:
/// two lambdas are the same value only when they share body and capture.
#[derive(Clone)]
pub struct LambdaValue {
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub context: Rc<Context>,
}

impl PartialEq for LambdaValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body) && Rc::ptr_eq(&self.context, &other.context)
    }
}

impl fmt::Debug for LambdaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaValue")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(Decimal),
    String(String),
    Fraction(Fraction),
    Approximate(ApproximateNumber),
    Fuzzy(FuzzyBoolean),
    Range(Range),
    Distribution(Distribution),
    Unit(UnitValue),
    Date(Date),
    Time(Time),
    Duration(Duration),
    List(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
    Lambda(LambdaValue),
    Pattern(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Fraction(_) => "Fraction",
            Value::Approximate(_) => "ApproximateNumber",
            Value::Fuzzy(_) => "FuzzyBoolean",
            Value::Range(_) => "Range",
            Value::Distribution(_) => "Distribution",
            Value::Unit(_) => "UnitValue",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Duration(_) => "Duration",
            Value::List(_) => "List",
            Value::Dictionary(_) => "Dictionary",
            Value::Lambda(_) => "Lambda",
            Value::Pattern(_) => "Pattern",
        }
    }

    /// The lenient-family comparison result for an exact outcome
    pub fn lenient(value: bool) -> Value {
        Value::Fuzzy(FuzzyBoolean::from_bool(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The numeric magnitude of a transparent numeric value
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Fraction(f) => Some(f.to_decimal()),
            Value::Approximate(a) => Some(a.value()),
            _ => None,
        }
    }

    /// Truthiness for conditions and short-circuit logic. Null is falsy,
    /// numbers are falsy at zero, strings and lists at empty, fuzzy
    /// booleans at their derived boolean; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Fuzzy(f) => f.to_bool(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// The ordered constructor arguments that rebuild an equal instance
    pub fn serialization_properties(&self) -> Vec<Value> {
        match self {
            Value::Fraction(f) => vec![
                Value::Number(Decimal::from(f.numerator())),
                Value::Number(Decimal::from(f.denominator())),
            ],
            Value::Approximate(a) => {
                vec![Value::Number(a.value()), Value::Number(a.max_error())]
            }
            Value::Fuzzy(f) => vec![Value::Number(f.state())],
            Value::Range(r) => vec![
                r.min().cloned().unwrap_or(Value::Null),
                r.max().cloned().unwrap_or(Value::Null),
            ],
            Value::Distribution(d) => {
                let mut properties = Vec::new();
                for point in d.points() {
                    properties.push(Value::Number(point.value));
                    properties.push(Value::Number(point.share));
                }
                if let Some(average) = d.average() {
                    properties.push(Value::Number(average));
                }
                properties
            }
            Value::Unit(u) => vec![
                u.value().clone(),
                Value::String(u.unit().to_string()),
            ],
            Value::Date(d) => {
                let mut properties = vec![Value::Number(Decimal::from(d.year()))];
                if let Some(month) = d.month() {
                    properties.push(Value::Number(Decimal::from(month)));
                }
                if let Some(day) = d.day() {
                    properties.push(Value::Number(Decimal::from(day)));
                }
                properties
            }
            Value::Time(t) => vec![
                Value::Number(Decimal::from(t.hour())),
                Value::Number(Decimal::from(t.minute())),
                Value::Number(Decimal::from(t.second())),
            ],
            Value::Duration(d) => vec![
                Value::Number(Decimal::from(d.years)),
                Value::Number(Decimal::from(d.months)),
                Value::Number(Decimal::from(d.days)),
                Value::Number(Decimal::from(d.hours)),
                Value::Number(Decimal::from(d.minutes)),
                Value::Number(Decimal::from(d.seconds)),
            ],
            Value::List(items) => items.clone(),
            Value::Dictionary(entries) => {
                let mut properties = Vec::new();
                for (key, value) in entries {
                    properties.push(Value::String(key.clone()));
                    properties.push(value.clone());
                }
                properties
            }
            Value::Pattern(raw) => vec![Value::String(raw.clone())],
            other => vec![other.clone()],
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Decimal::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn constructor(f: &mut fmt::Formatter<'_>, name: &str, args: &[Value]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    write!(f, ")")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", quote(s)),
            Value::Lambda(lambda) => {
                if lambda.params.len() == 1 {
                    write!(f, "{} => {}", lambda.params[0], lambda.body)
                } else {
                    write!(f, "({}) => {}", lambda.params.join(", "), lambda.body)
                }
            }
            Value::Pattern(raw) => write!(f, "`{}`", raw),
            composite => constructor(
                f,
                composite.type_name(),
                &composite.serialization_properties(),
            ),
        }
    }
}
