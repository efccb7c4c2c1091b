//! Dimensioned values and unit conversion
//!
//! A `UnitValue` pairs a numeric value with a compound unit (base unit name
//! to exponent). Same-unit arithmetic is direct; cross-unit addition
//! converts the right operand into the left unit first, and multiplication
//! composes exponent maps. Conversion factors live in the database
//! collaborator and are reached through the session, so any step here can
//! suspend.
//!
//! The conversion search runs three tiers: the source unit's own conversion
//! table, then a hop through the quantity category's primary unit, then (for
//! compounds) normalization of every factor to its primary unit before
//! retrying. Exhausting all three is a conversion error, never a silent
//! null.

use crate::context::Session;
use crate::database::Resolution;
use crate::error::JelError;
use crate::exec::{Evaluation, PendingFetch};
use crate::operator::Operator;
use crate::value::Value;
use crate::JelResult;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// A multiset of base units: unit name to (non-zero) exponent. The map is
/// ordered so the canonical text form is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundUnit {
    factors: BTreeMap<String, i32>,
}

impl CompoundUnit {
    pub fn single(name: impl Into<String>) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(name.into(), 1);
        CompoundUnit { factors }
    }

    /// Parse the canonical form `Name`, `Name^exp` or `Name^exp*Name^exp*...`
    pub fn parse(text: &str) -> JelResult<Self> {
        let mut factors = BTreeMap::new();
        for segment in text.split('*') {
            let segment = segment.trim();
            if segment.is_empty() {
                return Err(JelError::Construction(format!(
                    "malformed unit '{}'",
                    text
                )));
            }
            let (name, exponent) = match segment.split_once('^') {
                Some((name, exp)) => {
                    let exponent: i32 = exp.parse().map_err(|_| {
                        JelError::Construction(format!("malformed unit exponent in '{}'", text))
                    })?;
                    (name, exponent)
                }
                None => (segment, 1),
            };
            if name.is_empty() || exponent == 0 {
                return Err(JelError::Construction(format!(
                    "malformed unit '{}'",
                    text
                )));
            }
            *factors.entry(name.to_string()).or_insert(0) += exponent;
        }
        factors.retain(|_, exp| *exp != 0);
        Ok(CompoundUnit { factors })
    }

    pub fn factors(&self) -> impl Iterator<Item = (&str, i32)> {
        self.factors.iter().map(|(name, exp)| (name.as_str(), *exp))
    }

    pub fn is_dimensionless(&self) -> bool {
        self.factors.is_empty()
    }

    /// The unit name when this is a single base unit with exponent 1
    pub fn simple_name(&self) -> Option<&str> {
        match self.factors.iter().next() {
            Some((name, 1)) if self.factors.len() == 1 => Some(name),
            _ => None,
        }
    }

    fn combined(&self, other: &CompoundUnit, sign: i32) -> CompoundUnit {
        let mut factors = self.factors.clone();
        for (name, exp) in &other.factors {
            *factors.entry(name.clone()).or_insert(0) += sign * exp;
        }
        factors.retain(|_, exp| *exp != 0);
        CompoundUnit { factors }
    }

    pub fn multiply(&self, other: &CompoundUnit) -> CompoundUnit {
        self.combined(other, 1)
    }

    pub fn divide(&self, other: &CompoundUnit) -> CompoundUnit {
        self.combined(other, -1)
    }
}

impl fmt::Display for CompoundUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, exp) in &self.factors {
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if *exp == 1 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{}^{}", name, exp)?;
            }
        }
        Ok(())
    }
}

/// A numeric value with a compound unit attached
#[derive(Debug, Clone, PartialEq)]
pub struct UnitValue {
    value: Box<Value>,
    unit: CompoundUnit,
}

impl UnitValue {
    pub fn new(value: Value, unit: CompoundUnit) -> JelResult<Self> {
        match value {
            Value::Number(_) | Value::Fraction(_) | Value::Approximate(_) => Ok(UnitValue {
                value: Box::new(value),
                unit,
            }),
            other => Err(JelError::Construction(format!(
                "a UnitValue requires a numeric value, not {}",
                other.type_name()
            ))),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn unit(&self) -> &CompoundUnit {
        &self.unit
    }

    pub fn magnitude(&self) -> Decimal {
        match &*self.value {
            Value::Number(n) => *n,
            Value::Fraction(f) => f.to_decimal(),
            Value::Approximate(a) => a.value(),
            _ => Decimal::ZERO,
        }
    }

    /// Multiply the inner numeric value by an exact factor, preserving its
    /// representation where possible
    pub fn scaled(&self, factor: Decimal, unit: CompoundUnit) -> UnitValue {
        let value = match &*self.value {
            Value::Number(n) => Value::Number(*n * factor),
            Value::Fraction(f) => Value::Number(f.to_decimal() * factor),
            Value::Approximate(a) => Value::Approximate(
                crate::value::ApproximateNumber::new(a.value() * factor, a.max_error() * factor),
            ),
            other => other.clone(),
        };
        UnitValue {
            value: Box::new(value),
            unit,
        }
    }
}

/// Outcome of a single metadata lookup through the session
enum Member {
    Ready(Value),
    Pending(PendingFetch),
    Missing,
}

/// Fetch one property of a database entity, treating an unbound name as an
/// absent property rather than a failure (the search has further tiers)
fn member(session: &Session, name: &str, property: &str) -> JelResult<Member> {
    match session.get_member(name, property) {
        Ok(Resolution::Ready(value)) => Ok(Member::Ready(value)),
        Ok(Resolution::Pending) => Ok(Member::Pending(PendingFetch::one(name))),
        Err(JelError::UnboundName { .. }) => Ok(Member::Missing),
        Err(other) => Err(other),
    }
}

/// A metadata lookup that may still be in flight
enum Lookup<T> {
    Ready(T),
    Pending(PendingFetch),
    Missing,
}

fn member_string(session: &Session, name: &str, property: &str) -> JelResult<Lookup<String>> {
    match member(session, name, property)? {
        Member::Ready(Value::String(s)) => Ok(Lookup::Ready(s)),
        Member::Ready(other) => Err(JelError::Conversion(format!(
            "malformed conversion rule: {}.{} is {}, expected a string",
            name,
            property,
            other.type_name()
        ))),
        Member::Pending(fetch) => Ok(Lookup::Pending(fetch)),
        Member::Missing => Ok(Lookup::Missing),
    }
}

enum Factor {
    Found(Decimal),
    Pending(PendingFetch),
    None,
}

/// Tier 1: a direct entry in either unit's conversion table. The target's
/// table is consulted inverted when the source carries no entry.
fn direct_factor(session: &Session, from: &str, to: &str) -> JelResult<Factor> {
    for (owner, other, invert) in [(from, to, false), (to, from, true)] {
        match member(session, owner, "convertsTo")? {
            Member::Ready(Value::Dictionary(table)) => {
                if let Some(entry) = table.get(other) {
                    let factor = entry.as_decimal().ok_or_else(|| {
                        JelError::Conversion(format!(
                            "malformed conversion rule: {} -> {} is {}, expected a number",
                            owner,
                            other,
                            entry.type_name()
                        ))
                    })?;
                    if factor.is_zero() {
                        return Err(JelError::Conversion(format!(
                            "malformed conversion rule: {} -> {} is zero",
                            owner, other
                        )));
                    }
                    let factor = if invert {
                        Decimal::ONE / factor
                    } else {
                        factor
                    };
                    return Ok(Factor::Found(factor));
                }
            }
            Member::Ready(other_value) => {
                return Err(JelError::Conversion(format!(
                    "malformed conversion rule: {}.convertsTo is {}, expected a dictionary",
                    owner,
                    other_value.type_name()
                )))
            }
            Member::Pending(fetch) => return Ok(Factor::Pending(fetch)),
            Member::Missing => {}
        }
    }
    Ok(Factor::None)
}

/// Tier 2: hop through the source's quantity category's primary unit
fn factor_via_primary(session: &Session, from: &str, to: &str) -> JelResult<Factor> {
    let category = match member_string(session, from, "quantityCategory")? {
        Lookup::Ready(category) => category,
        Lookup::Pending(fetch) => return Ok(Factor::Pending(fetch)),
        Lookup::Missing => return Ok(Factor::None),
    };
    let primary = match member_string(session, &category, "primaryUnit")? {
        Lookup::Ready(primary) => primary,
        Lookup::Pending(fetch) => return Ok(Factor::Pending(fetch)),
        Lookup::Missing => return Ok(Factor::None),
    };
    let inbound = if from == primary {
        Factor::Found(Decimal::ONE)
    } else {
        direct_factor(session, from, &primary)?
    };
    let outbound = if to == primary {
        Factor::Found(Decimal::ONE)
    } else {
        direct_factor(session, &primary, to)?
    };
    match (inbound, outbound) {
        (Factor::Found(a), Factor::Found(b)) => Ok(Factor::Found(a * b)),
        (Factor::Pending(a), Factor::Pending(b)) => Ok(Factor::Pending(a.merge(b))),
        (Factor::Pending(p), _) | (_, Factor::Pending(p)) => Ok(Factor::Pending(p)),
        _ => Ok(Factor::None),
    }
}

fn simple_factor(session: &Session, from: &str, to: &str) -> JelResult<Factor> {
    if from == to {
        return Ok(Factor::Found(Decimal::ONE));
    }
    match direct_factor(session, from, to)? {
        Factor::None => factor_via_primary(session, from, to),
        found => Ok(found),
    }
}

fn power(factor: Decimal, exponent: i32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..exponent.unsigned_abs() {
        result *= factor;
    }
    if exponent < 0 {
        Decimal::ONE / result
    } else {
        result
    }
}

/// Tier 3 groundwork: rewrite every factor of a compound unit into its
/// category's primary unit, accumulating the combined scale
fn normalize_to_primary(
    session: &Session,
    unit: &CompoundUnit,
) -> JelResult<Result<(CompoundUnit, Decimal), PendingFetch>> {
    let mut normalized = CompoundUnit::default();
    let mut scale = Decimal::ONE;
    let mut pending: Option<PendingFetch> = None;
    let stall = |pending: &mut Option<PendingFetch>, fetch: PendingFetch| {
        *pending = Some(match pending.take() {
            Some(existing) => existing.merge(fetch),
            None => fetch,
        });
    };
    for (name, exponent) in unit.factors() {
        let primary = match member_string(session, name, "quantityCategory")? {
            Lookup::Ready(category) => match member_string(session, &category, "primaryUnit")? {
                Lookup::Ready(primary) => Some(primary),
                Lookup::Pending(fetch) => {
                    stall(&mut pending, fetch);
                    None
                }
                Lookup::Missing => None,
            },
            Lookup::Pending(fetch) => {
                stall(&mut pending, fetch);
                None
            }
            Lookup::Missing => None,
        };
        let target = match primary {
            Some(primary) if primary != name => {
                match simple_factor(session, name, &primary)? {
                    Factor::Found(factor) => {
                        scale *= power(factor, exponent);
                        primary
                    }
                    Factor::Pending(fetch) => {
                        stall(&mut pending, fetch);
                        name.to_string()
                    }
                    Factor::None => name.to_string(),
                }
            }
            _ => name.to_string(),
        };
        normalized = normalized.multiply(&power_unit(&target, exponent));
    }
    match pending {
        Some(fetch) => Ok(Err(fetch)),
        None => Ok(Ok((normalized, scale))),
    }
}

fn power_unit(name: &str, exponent: i32) -> CompoundUnit {
    let mut unit = CompoundUnit::default();
    if exponent != 0 {
        unit.factors.insert(name.to_string(), exponent);
    }
    unit
}

/// Convert a unit value into a target unit through the three-tier search.
/// Exhausting every tier raises a conversion error.
pub fn convert(
    session: &Session,
    value: &UnitValue,
    target: &CompoundUnit,
) -> JelResult<Evaluation> {
    if value.unit() == target {
        return Ok(Evaluation::Ready(Value::Unit(value.clone())));
    }

    // Tiers 1 and 2 apply when both sides are single base units.
    if let (Some(from), Some(to)) = (value.unit().simple_name(), target.simple_name()) {
        match simple_factor(session, from, to)? {
            Factor::Found(factor) => {
                return Ok(Evaluation::Ready(Value::Unit(
                    value.scaled(factor, target.clone()),
                )))
            }
            Factor::Pending(fetch) => return Ok(Evaluation::Pending(fetch)),
            Factor::None => {}
        }
    }

    // Tier 3: normalize both sides onto primary units and compare.
    let source_normalized = match normalize_to_primary(session, value.unit())? {
        Ok(result) => result,
        Err(fetch) => return Ok(Evaluation::Pending(fetch)),
    };
    let target_normalized = match normalize_to_primary(session, target)? {
        Ok(result) => result,
        Err(fetch) => return Ok(Evaluation::Pending(fetch)),
    };
    let (source_unit, source_scale) = source_normalized;
    let (target_unit, target_scale) = target_normalized;
    if source_unit == target_unit && !target_scale.is_zero() {
        let factor = source_scale / target_scale;
        return Ok(Evaluation::Ready(Value::Unit(
            value.scaled(factor, target.clone()),
        )));
    }

    Err(JelError::Conversion(format!(
        "no conversion path from '{}' to '{}'",
        value.unit(),
        target
    )))
}

/// After multiplication or division, ask the database whether the composed
/// unit has a named alias. A missing alias keeps the compound form.
fn simplified(session: Option<&Session>, value: UnitValue) -> JelResult<Evaluation> {
    if value.unit().simple_name().is_some() || value.unit().is_dimensionless() {
        return Ok(Evaluation::Ready(Value::Unit(value)));
    }
    let Some(session) = session else {
        return Ok(Evaluation::Ready(Value::Unit(value)));
    };
    match member(session, &value.unit().to_string(), "unitName")? {
        Member::Ready(Value::String(name)) => {
            let renamed = UnitValue {
                value: value.value.clone(),
                unit: CompoundUnit::single(name),
            };
            Ok(Evaluation::Ready(Value::Unit(renamed)))
        }
        Member::Pending(fetch) => Ok(Evaluation::Pending(fetch)),
        _ => Ok(Evaluation::Ready(Value::Unit(value))),
    }
}

fn require_session<'a>(
    session: Option<&'a Session>,
    from: &CompoundUnit,
    to: &CompoundUnit,
) -> JelResult<&'a Session> {
    session.ok_or_else(|| {
        JelError::Conversion(format!(
            "no conversion path from '{}' to '{}' without a database session",
            from, to
        ))
    })
}

pub fn op(
    session: Option<&Session>,
    operator: Operator,
    left: &UnitValue,
    right: &Value,
) -> JelResult<Evaluation> {
    match right {
        Value::Unit(r) => {
            match operator {
                Operator::Add | Operator::Subtract => {
                    let aligned = if left.unit() == r.unit() {
                        r.clone()
                    } else {
                        let session = require_session(session, r.unit(), left.unit())?;
                        match convert(session, r, left.unit())? {
                            Evaluation::Ready(Value::Unit(converted)) => converted,
                            Evaluation::Ready(other) => {
                                return Err(JelError::Conversion(format!(
                                    "conversion produced {}, expected a unit value",
                                    other.type_name()
                                )))
                            }
                            pending @ Evaluation::Pending(_) => return Ok(pending),
                        }
                    };
                    let combined =
                        crate::dispatch::numeric_op(operator, left.value(), aligned.value())?;
                    Ok(Evaluation::Ready(Value::Unit(UnitValue::new(
                        combined,
                        left.unit().clone(),
                    )?)))
                }
                Operator::Multiply | Operator::Divide => {
                    let combined =
                        crate::dispatch::numeric_op(operator, left.value(), r.value())?;
                    let unit = match operator {
                        Operator::Multiply => left.unit().multiply(r.unit()),
                        _ => left.unit().divide(r.unit()),
                    };
                    if unit.is_dimensionless() {
                        return Ok(Evaluation::Ready(combined));
                    }
                    simplified(session, UnitValue::new(combined, unit)?)
                }
                _ if operator.is_equality() || operator.is_ordering() => {
                    let aligned = if left.unit() == r.unit() {
                        r.clone()
                    } else {
                        let session = require_session(session, r.unit(), left.unit())?;
                        match convert(session, r, left.unit())? {
                            Evaluation::Ready(Value::Unit(converted)) => converted,
                            Evaluation::Ready(_) => {
                                return Err(JelError::Conversion(
                                    "conversion produced a non-unit value".to_string(),
                                ))
                            }
                            pending @ Evaluation::Pending(_) => return Ok(pending),
                        }
                    };
                    let ordering = left.magnitude().cmp(&aligned.magnitude());
                    Ok(Evaluation::Ready(crate::dispatch::comparison(
                        operator, ordering,
                    )))
                }
                _ => Err(JelError::unsupported(operator, "UnitValue and UnitValue")),
            }
        }
        Value::Number(_) | Value::Fraction(_) | Value::Approximate(_) => match operator {
            Operator::Multiply | Operator::Divide => {
                let combined = crate::dispatch::numeric_op(operator, left.value(), right)?;
                Ok(Evaluation::Ready(Value::Unit(UnitValue::new(
                    combined,
                    left.unit().clone(),
                )?)))
            }
            _ => Err(JelError::unsupported(
                operator,
                format!("UnitValue and {}", right.type_name()),
            )),
        },
        _ => Err(JelError::unsupported(
            operator,
            format!("UnitValue and {}", right.type_name()),
        )),
    }
}

pub fn single_op(operator: Operator, operand: &UnitValue) -> JelResult<Value> {
    match operator {
        Operator::Negate | Operator::Abs => {
            let value = crate::dispatch::numeric_single_op(operator, operand.value())?;
            Ok(Value::Unit(UnitValue::new(value, operand.unit().clone())?))
        }
        _ => Err(JelError::unsupported(operator, "UnitValue")),
    }
}
