//! Native value constructors
//!
//! The closed name-to-constructor registry behind calls like
//! `Fraction(1, 2)` or `UnitValue(5, "Meter")`. Canonical value text (the
//! `Display` form of every composite value) parses back through this
//! registry, which is what makes values round-trip to source.

use crate::error::JelError;
use crate::value::{
    ApproximateNumber, CompoundUnit, Date, Distribution, Duration, Fraction, FuzzyBoolean, Range,
    Time, UnitValue, Value,
};
use crate::JelResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn is_constructor(name: &str) -> bool {
    matches!(
        name,
        "Fraction"
            | "ApproximateNumber"
            | "FuzzyBoolean"
            | "Range"
            | "Distribution"
            | "UnitValue"
            | "Date"
            | "Time"
            | "Duration"
            | "List"
            | "Dictionary"
    )
}

fn arity_error(name: &str, expected: &str, got: usize) -> JelError {
    JelError::Construction(format!(
        "{} expects {} arguments, got {}",
        name, expected, got
    ))
}

fn decimal(name: &str, arg: &Value) -> JelResult<Decimal> {
    arg.as_decimal().ok_or_else(|| {
        JelError::Construction(format!(
            "{} expects numeric arguments, got {}",
            name,
            arg.type_name()
        ))
    })
}

fn integer(name: &str, arg: &Value) -> JelResult<i64> {
    decimal(name, arg)?
        .to_i64()
        .filter(|_| matches!(arg, Value::Number(n) if n.fract().is_zero()))
        .ok_or_else(|| {
            JelError::Construction(format!("{} expects integer arguments", name))
        })
}

pub fn construct(name: &str, args: &[Value]) -> JelResult<Value> {
    match name {
        "Fraction" => match args {
            [n, d] => Ok(Value::Fraction(Fraction::new(
                integer(name, n)?,
                integer(name, d)?,
            )?)),
            _ => Err(arity_error(name, "2", args.len())),
        },
        "ApproximateNumber" => match args {
            [value, max_error] => Ok(Value::Approximate(ApproximateNumber::new(
                decimal(name, value)?,
                decimal(name, max_error)?,
            ))),
            _ => Err(arity_error(name, "2", args.len())),
        },
        "FuzzyBoolean" => match args {
            [state] => Ok(Value::Fuzzy(FuzzyBoolean::new(decimal(name, state)?))),
            _ => Err(arity_error(name, "1", args.len())),
        },
        "Range" => match args {
            [min, max] => {
                let bound = |value: &Value| match value {
                    Value::Null => None,
                    other => Some(other.clone()),
                };
                Ok(Value::Range(Range::new(bound(min), bound(max))))
            }
            _ => Err(arity_error(name, "2", args.len())),
        },
        "Distribution" => {
            // Flat (value, share) pairs; an odd trailing argument is the
            // average.
            let (pair_args, average) = if args.len() % 2 == 1 {
                let (last, rest) = args.split_last().ok_or_else(|| {
                    arity_error(name, "at least 1", 0)
                })?;
                (rest, Some(decimal(name, last)?))
            } else {
                (args, None)
            };
            let mut points = Vec::with_capacity(pair_args.len() / 2);
            for pair in pair_args.chunks(2) {
                points.push((decimal(name, &pair[0])?, decimal(name, &pair[1])?));
            }
            Ok(Value::Distribution(Distribution::new(points, average)?))
        }
        "UnitValue" => match args {
            [value, Value::String(unit)] => Ok(Value::Unit(UnitValue::new(
                value.clone(),
                CompoundUnit::parse(unit)?,
            )?)),
            [_, other] => Err(JelError::Construction(format!(
                "UnitValue expects a unit name as its second argument, got {}",
                other.type_name()
            ))),
            _ => Err(arity_error(name, "2", args.len())),
        },
        "Date" => {
            let field = |arg: &Value| -> JelResult<i32> {
                Ok(integer(name, arg)? as i32)
            };
            match args {
                [year] => Ok(Value::Date(Date::new(field(year)?, None, None)?)),
                [year, month] => Ok(Value::Date(Date::new(
                    field(year)?,
                    Some(field(month)?),
                    None,
                )?)),
                [year, month, day] => Ok(Value::Date(Date::new(
                    field(year)?,
                    Some(field(month)?),
                    Some(field(day)?),
                )?)),
                _ => Err(arity_error(name, "1 to 3", args.len())),
            }
        }
        "Time" => match args {
            [hour, minute, second] => Ok(Value::Time(Time::new(
                integer(name, hour)?,
                integer(name, minute)?,
                integer(name, second)?,
            ))),
            _ => Err(arity_error(name, "3", args.len())),
        },
        "Duration" => match args {
            [years, months, days, hours, minutes, seconds] => {
                Ok(Value::Duration(Duration::new(
                    integer(name, years)?,
                    integer(name, months)?,
                    integer(name, days)?,
                    integer(name, hours)?,
                    integer(name, minutes)?,
                    integer(name, seconds)?,
                )))
            }
            _ => Err(arity_error(name, "6", args.len())),
        },
        "List" => Ok(Value::List(args.to_vec())),
        "Dictionary" => {
            if args.len() % 2 != 0 {
                return Err(JelError::Construction(
                    "Dictionary expects alternating key/value arguments".to_string(),
                ));
            }
            let mut entries = BTreeMap::new();
            for pair in args.chunks(2) {
                let Value::String(key) = &pair[0] else {
                    return Err(JelError::Construction(format!(
                        "Dictionary keys must be strings, got {}",
                        pair[0].type_name()
                    )));
                };
                entries.insert(key.clone(), pair[1].clone());
            }
            Ok(Value::Dictionary(entries))
        }
        _ => Err(JelError::unbound(name)),
    }
}
