//! Runtime operator dispatch
//!
//! The two entry points `op` and `single_op` implement the polymorphic
//! operator protocol for the whole value family: null rules first, then a
//! closed match on the left operand's variant delegating to the per-type
//! modules, with the reversal table retrying primitive-left/composite-right
//! pairings swapped. `member` and `call_method` expose each type's declared
//! properties and methods through an explicit registry.

use crate::context::Context;
use crate::database::Resolution;
use crate::error::JelError;
use crate::exec::{Callable, Evaluation, PendingFetch};
use crate::operator::Operator;
use crate::value::{self, ApproximateNumber, Fraction, Value};
use crate::JelResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::rc::Rc;

/// Turn an exact ordering into the operator's result: lenient comparisons
/// yield a clearly-true/false fuzzy value, strict ones an exact boolean
pub(crate) fn comparison(operator: Operator, ordering: Ordering) -> Value {
    use Operator::*;
    match operator {
        Equal => Value::lenient(ordering == Ordering::Equal),
        NotEqual => Value::lenient(ordering != Ordering::Equal),
        Less => Value::lenient(ordering == Ordering::Less),
        Greater => Value::lenient(ordering == Ordering::Greater),
        LessEqual => Value::lenient(ordering != Ordering::Greater),
        GreaterEqual => Value::lenient(ordering != Ordering::Less),
        StrictEqual => Value::Boolean(ordering == Ordering::Equal),
        StrictNotEqual => Value::Boolean(ordering != Ordering::Equal),
        StrictLess => Value::Boolean(ordering == Ordering::Less),
        StrictGreater => Value::Boolean(ordering == Ordering::Greater),
        StrictLessEqual => Value::Boolean(ordering != Ordering::Greater),
        StrictGreaterEqual => Value::Boolean(ordering != Ordering::Less),
        _ => Value::Boolean(false),
    }
}

/// Plain decimal arithmetic and comparison
pub(crate) fn decimal_op(operator: Operator, left: Decimal, right: Decimal) -> JelResult<Value> {
    use Operator::*;
    let result = match operator {
        Add => Value::Number(left + right),
        Subtract => Value::Number(left - right),
        Multiply => Value::Number(left * right),
        Divide => Value::Number(
            left.checked_div(right)
                .ok_or_else(|| JelError::Construction("division by zero".to_string()))?,
        ),
        Modulo => {
            if right.is_zero() {
                return Err(JelError::Construction("division by zero".to_string()));
            }
            Value::Number(left % right)
        }
        _ if operator.is_equality() || operator.is_ordering() => {
            comparison(operator, left.cmp(&right))
        }
        _ => {
            return Err(JelError::unsupported(operator, "Number and Number"));
        }
    };
    Ok(result)
}

/// Arithmetic between two transparent numeric values, preserving exactness:
/// approximate partners propagate error bounds, fraction/integer pairings
/// stay rational, anything else evaluates in decimals
pub(crate) fn numeric_op(operator: Operator, left: &Value, right: &Value) -> JelResult<Value> {
    match (left, right) {
        (Value::Approximate(l), _) => value::approx::op(operator, l, right),
        (_, Value::Approximate(_)) => {
            let promoted = ApproximateNumber::new(
                left.as_decimal().ok_or_else(|| {
                    JelError::unsupported(
                        operator,
                        format!("{} and {}", left.type_name(), right.type_name()),
                    )
                })?,
                Decimal::ZERO,
            );
            value::approx::op(operator, &promoted, right)
        }
        (Value::Fraction(l), _) => value::fraction::op(operator, l, right),
        (Value::Number(l), Value::Fraction(_)) => {
            if l.fract().is_zero() {
                if let Some(i) = l.to_i64() {
                    let promoted = Fraction::new(i, 1)?;
                    return value::fraction::op(operator, &promoted, right);
                }
            }
            let r = right
                .as_decimal()
                .ok_or_else(|| JelError::unsupported(operator, "Number and Fraction"))?;
            decimal_op(operator, *l, r)
        }
        (Value::Number(l), Value::Number(r)) => decimal_op(operator, *l, *r),
        _ => Err(JelError::unsupported(
            operator,
            format!("{} and {}", left.type_name(), right.type_name()),
        )),
    }
}

pub(crate) fn numeric_single_op(operator: Operator, operand: &Value) -> JelResult<Value> {
    match operand {
        Value::Number(n) => match operator {
            Operator::Negate => Ok(Value::Number(-*n)),
            Operator::Abs => Ok(Value::Number(n.abs())),
            _ => Err(JelError::unsupported(operator, "Number")),
        },
        Value::Fraction(f) => value::fraction::single_op(operator, f),
        Value::Approximate(a) => value::approx::single_op(operator, a),
        _ => Err(JelError::unsupported(operator, operand.type_name())),
    }
}

/// A session-free exact ordering between two comparable values, used for
/// range bounds, sorting and containment
pub(crate) fn compare_values(left: &Value, right: &Value) -> JelResult<Ordering> {
    match (left, right) {
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        (Value::Boolean(l), Value::Boolean(r)) => Ok(l.cmp(r)),
        (Value::Date(l), Value::Date(r)) => Ok(l.compare(r)),
        (Value::Time(l), Value::Time(r)) => Ok(l.total_seconds().cmp(&r.total_seconds())),
        (Value::Duration(l), Value::Duration(r)) => {
            Ok(l.estimated_seconds().cmp(&r.estimated_seconds()))
        }
        (Value::Unit(l), Value::Unit(r)) if l.unit() == r.unit() => {
            Ok(l.magnitude().cmp(&r.magnitude()))
        }
        _ => match (left.as_decimal(), right.as_decimal()) {
            (Some(l), Some(r)) => Ok(l.cmp(&r)),
            _ => Err(JelError::unsupported(
                "ordering",
                format!("{} and {}", left.type_name(), right.type_name()),
            )),
        },
    }
}

fn null_rule(operator: Operator, left: &Value, right: &Value) -> JelResult<Value> {
    use Operator::*;
    let both_null = left.is_null() && right.is_null();
    match operator {
        Equal => Ok(Value::lenient(both_null)),
        NotEqual => Ok(Value::lenient(!both_null)),
        StrictEqual => Ok(Value::Boolean(both_null)),
        StrictNotEqual => Ok(Value::Boolean(!both_null)),
        _ if operator.is_ordering() => {
            if operator.is_strict_comparison() {
                Ok(Value::Boolean(false))
            } else {
                Ok(Value::lenient(false))
            }
        }
        _ => Err(JelError::unsupported(
            operator,
            format!("{} and {}", left.type_name(), right.type_name()),
        )),
    }
}

fn is_transparent(value: &Value) -> bool {
    matches!(
        value,
        Value::Boolean(_) | Value::Number(_) | Value::String(_)
    )
}

/// Apply a binary operator. Null rules come first; then the left operand's
/// variant owns the operation; a transparent primitive on the left retries
/// via the reversal table so composite types only implement the
/// "composite is left" half.
pub fn op(
    ctx: &Rc<Context>,
    operator: Operator,
    left: &Value,
    right: &Value,
) -> JelResult<Evaluation> {
    if left.is_null() || right.is_null() {
        return Ok(Evaluation::Ready(null_rule(operator, left, right)?));
    }

    let ready = |value: JelResult<Value>| value.map(Evaluation::Ready);
    match left {
        Value::Number(l) => match right {
            Value::Number(r) => ready(decimal_op(operator, *l, *r)),
            _ if !is_transparent(right) => reverse(ctx, operator, left, right),
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::Boolean(l) => match right {
            Value::Boolean(r) => match operator {
                Operator::Equal => ready(Ok(Value::lenient(l == r))),
                Operator::NotEqual => ready(Ok(Value::lenient(l != r))),
                Operator::StrictEqual => ready(Ok(Value::Boolean(l == r))),
                Operator::StrictNotEqual => ready(Ok(Value::Boolean(l != r))),
                _ => Err(pairing_error(operator, left, right)),
            },
            _ if !is_transparent(right) => reverse(ctx, operator, left, right),
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::String(l) => match right {
            Value::String(r) => match operator {
                Operator::Add => ready(Ok(Value::String(format!("{}{}", l, r)))),
                _ if operator.is_equality() || operator.is_ordering() => {
                    ready(Ok(comparison(operator, l.cmp(r))))
                }
                _ => Err(pairing_error(operator, left, right)),
            },
            _ if !is_transparent(right) => reverse(ctx, operator, left, right),
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::Fraction(l) => ready(value::fraction::op(operator, l, right)),
        Value::Approximate(l) => ready(value::approx::op(operator, l, right)),
        Value::Fuzzy(l) => ready(value::fuzzy::op(operator, l, right)),
        Value::Range(l) => ready(value::range::op(operator, l, right)),
        Value::Distribution(l) => ready(value::distribution::op(operator, l, right)),
        Value::Unit(l) => {
            value::units::op(ctx.session().map(|s| s.as_ref()), operator, l, right)
        }
        Value::Date(l) => ready(value::calendar::date_op(operator, l, right)),
        Value::Time(l) => ready(value::calendar::time_op(operator, l, right)),
        Value::Duration(l) => ready(value::calendar::duration_op(operator, l, right)),
        Value::List(items) => list_op(ctx, operator, items, right),
        Value::Dictionary(l) => match (operator, right) {
            (Operator::Equal, Value::Dictionary(r)) => ready(Ok(Value::lenient(l == r))),
            (Operator::NotEqual, Value::Dictionary(r)) => ready(Ok(Value::lenient(l != r))),
            (Operator::StrictEqual, Value::Dictionary(r)) => ready(Ok(Value::Boolean(l == r))),
            (Operator::StrictNotEqual, Value::Dictionary(r)) => {
                ready(Ok(Value::Boolean(l != r)))
            }
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::Pattern(l) => match (operator, right) {
            (Operator::Equal, Value::Pattern(r)) => ready(Ok(Value::lenient(l == r))),
            (Operator::NotEqual, Value::Pattern(r)) => ready(Ok(Value::lenient(l != r))),
            (Operator::StrictEqual, Value::Pattern(r)) => ready(Ok(Value::Boolean(l == r))),
            (Operator::StrictNotEqual, Value::Pattern(r)) => ready(Ok(Value::Boolean(l != r))),
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::Lambda(l) => match (operator, right) {
            (Operator::StrictEqual, Value::Lambda(r)) => ready(Ok(Value::Boolean(l == r))),
            (Operator::StrictNotEqual, Value::Lambda(r)) => ready(Ok(Value::Boolean(l != r))),
            _ => Err(pairing_error(operator, left, right)),
        },
        Value::Null => unreachable!("null operands are handled by the null rules"),
    }
}

fn pairing_error(operator: Operator, left: &Value, right: &Value) -> JelError {
    JelError::unsupported(
        operator,
        format!("{} and {}", left.type_name(), right.type_name()),
    )
}

/// Retry a primitive-left/composite-right pairing with operands swapped and
/// the mirrored operator
fn reverse(
    ctx: &Rc<Context>,
    operator: Operator,
    left: &Value,
    right: &Value,
) -> JelResult<Evaluation> {
    match operator.reversed() {
        Some(mirrored) => op(ctx, mirrored, right, left),
        None => Err(pairing_error(operator, left, right)),
    }
}

/// Apply a unary operator
pub fn single_op(ctx: &Rc<Context>, operator: Operator, operand: &Value) -> JelResult<Evaluation> {
    use Operator::*;
    if operand.is_null() && operator != Exists {
        return Err(JelError::unsupported(operator, "Null"));
    }
    let result = match operator {
        Negate | Abs => match operand {
            Value::Unit(u) => value::units::single_op(operator, u)?,
            Value::Duration(d) => value::calendar::duration_single_op(operator, d)?,
            _ => numeric_single_op(operator, operand)?,
        },
        Not => match operand {
            Value::Boolean(b) => Value::Boolean(!b),
            Value::Fuzzy(f) => value::fuzzy::single_op(operator, f)?,
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        Count => match operand {
            Value::List(items) => Value::Number(Decimal::from(items.len() as u64)),
            Value::Dictionary(entries) => Value::Number(Decimal::from(entries.len() as u64)),
            Value::String(s) => Value::Number(Decimal::from(s.chars().count() as u64)),
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        Exists => Value::Boolean(match operand {
            Value::Null => false,
            Value::List(items) => !items.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }),
        Max | Min => match operand {
            Value::List(items) => fold_extremum(items, operator == Max)?,
            Value::Range(r) => value::range::single_op(operator, r)?,
            Value::Distribution(d) => value::distribution::single_op(operator, d)?,
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        Avg => match operand {
            Value::List(items) => average(items)?,
            Value::Distribution(d) => value::distribution::single_op(operator, d)?,
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        Same => match operand {
            Value::List(items) => {
                Value::Boolean(items.windows(2).all(|pair| pair[0] == pair[1]))
            }
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        First => match operand {
            Value::List(items) => items.first().cloned().unwrap_or(Value::Null),
            _ => return Err(JelError::unsupported(operator, operand.type_name())),
        },
        _ => return Err(JelError::unsupported(operator, operand.type_name())),
    };
    let _ = ctx;
    Ok(Evaluation::Ready(result))
}

fn fold_extremum(items: &[Value], want_max: bool) -> JelResult<Value> {
    let mut best: Option<&Value> = None;
    for item in items {
        best = Some(match best {
            None => item,
            Some(current) => {
                let ordering = compare_values(item, current)?;
                let better = if want_max {
                    ordering == Ordering::Greater
                } else {
                    ordering == Ordering::Less
                };
                if better {
                    item
                } else {
                    current
                }
            }
        });
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn average(items: &[Value]) -> JelResult<Value> {
    if items.is_empty() {
        return Ok(Value::Null);
    }
    let mut sum = Decimal::ZERO;
    for item in items {
        sum += item.as_decimal().ok_or_else(|| {
            JelError::unsupported("avg", format!("a list containing {}", item.type_name()))
        })?;
    }
    Ok(Value::Number(sum / Decimal::from(items.len() as u64)))
}

/// Collection operators: the method-style infix words over lists. Lambda
/// bodies may suspend, so results propagate pending fetches.
fn list_op(
    ctx: &Rc<Context>,
    operator: Operator,
    items: &[Value],
    right: &Value,
) -> JelResult<Evaluation> {
    use Operator::*;
    match operator {
        Add => match right {
            Value::List(other) => {
                let mut combined = items.to_vec();
                combined.extend(other.iter().cloned());
                Ok(Evaluation::Ready(Value::List(combined)))
            }
            _ => Err(JelError::unsupported(
                operator,
                format!("List and {}", right.type_name()),
            )),
        },
        Equal | NotEqual | StrictEqual | StrictNotEqual => match right {
            Value::List(other) => {
                let equal = items == other.as_slice();
                let truth = match operator {
                    Equal => Value::lenient(equal),
                    NotEqual => Value::lenient(!equal),
                    StrictEqual => Value::Boolean(equal),
                    _ => Value::Boolean(!equal),
                };
                Ok(Evaluation::Ready(truth))
            }
            _ => Err(JelError::unsupported(
                operator,
                format!("List and {}", right.type_name()),
            )),
        },
        Map | Filter | Collect => {
            let Value::Lambda(lambda) = right else {
                return Err(JelError::unsupported(
                    operator,
                    format!("List and {}", right.type_name()),
                ));
            };
            let mut results = Vec::with_capacity(items.len());
            let mut pending: Option<PendingFetch> = None;
            for item in items {
                match lambda.invoke(ctx, std::slice::from_ref(item), &[])? {
                    Evaluation::Ready(value) => results.push((item, value)),
                    Evaluation::Pending(fetch) => {
                        pending = Some(match pending.take() {
                            Some(existing) => existing.merge(fetch),
                            None => fetch,
                        });
                    }
                }
            }
            if let Some(fetch) = pending {
                return Ok(Evaluation::Pending(fetch));
            }
            let collected = match operator {
                Map => results.into_iter().map(|(_, value)| value).collect(),
                Filter => results
                    .into_iter()
                    .filter(|(_, value)| value.is_truthy())
                    .map(|(item, _)| item.clone())
                    .collect(),
                // collect: map and drop the nulls
                _ => results
                    .into_iter()
                    .map(|(_, value)| value)
                    .filter(|value| !value.is_null())
                    .collect(),
            };
            Ok(Evaluation::Ready(Value::List(collected)))
        }
        Sort => {
            let Value::Lambda(lambda) = right else {
                return Err(JelError::unsupported(
                    operator,
                    format!("List and {}", right.type_name()),
                ));
            };
            let mut keyed = Vec::with_capacity(items.len());
            let mut pending: Option<PendingFetch> = None;
            for item in items {
                match lambda.invoke(ctx, std::slice::from_ref(item), &[])? {
                    Evaluation::Ready(key) => keyed.push((item.clone(), key)),
                    Evaluation::Pending(fetch) => {
                        pending = Some(match pending.take() {
                            Some(existing) => existing.merge(fetch),
                            None => fetch,
                        });
                    }
                }
            }
            if let Some(fetch) = pending {
                return Ok(Evaluation::Pending(fetch));
            }
            let mut error = None;
            keyed.sort_by(|(_, a), (_, b)| match compare_values(a, b) {
                Ok(ordering) => ordering,
                Err(e) => {
                    error.get_or_insert(e);
                    Ordering::Equal
                }
            });
            if let Some(e) = error {
                return Err(e);
            }
            Ok(Evaluation::Ready(Value::List(
                keyed.into_iter().map(|(item, _)| item).collect(),
            )))
        }
        At | Skip | Truncate => {
            let index = right
                .as_decimal()
                .filter(|n| n.fract().is_zero())
                .and_then(|n| n.to_usize())
                .ok_or_else(|| {
                    JelError::unsupported(
                        operator,
                        format!("List and {}", right.type_name()),
                    )
                })?;
            let result = match operator {
                At => items.get(index).cloned().unwrap_or(Value::Null),
                Skip => Value::List(items.iter().skip(index).cloned().collect()),
                _ => Value::List(items.iter().take(index).cloned().collect()),
            };
            Ok(Evaluation::Ready(result))
        }
        _ => Err(JelError::unsupported(
            operator,
            format!("List and {}", right.type_name()),
        )),
    }
}

/// Look up a declared property. A null receiver and a type lacking the
/// member raise distinct error kinds.
pub fn member(ctx: &Rc<Context>, object: &Value, name: &str) -> JelResult<Evaluation> {
    let _ = ctx;
    let found = match object {
        Value::Null => {
            return Err(JelError::UnboundName {
                name: name.to_string(),
                kind: crate::error::NameErrorKind::NullAccess,
            })
        }
        Value::Dictionary(entries) => entries.get(name).cloned(),
        Value::Fraction(f) => match name {
            "numerator" => Some(Value::Number(Decimal::from(f.numerator()))),
            "denominator" => Some(Value::Number(Decimal::from(f.denominator()))),
            _ => None,
        },
        Value::Approximate(a) => match name {
            "value" => Some(Value::Number(a.value())),
            "maxError" => Some(Value::Number(a.max_error())),
            _ => None,
        },
        Value::Fuzzy(f) => match name {
            "state" => Some(Value::Number(f.state())),
            _ => None,
        },
        Value::Range(r) => match name {
            "min" => Some(r.min().cloned().unwrap_or(Value::Null)),
            "max" => Some(r.max().cloned().unwrap_or(Value::Null)),
            _ => None,
        },
        Value::Distribution(d) => match name {
            "min" => Some(d.min_value().map(Value::Number).unwrap_or(Value::Null)),
            "max" => Some(d.max_value().map(Value::Number).unwrap_or(Value::Null)),
            "average" => Some(d.average().map(Value::Number).unwrap_or(Value::Null)),
            _ => None,
        },
        Value::Unit(u) => match name {
            "value" => Some(u.value().clone()),
            "unit" => Some(Value::String(u.unit().to_string())),
            _ => None,
        },
        Value::Date(d) => match name {
            "year" => Some(Value::Number(Decimal::from(d.year()))),
            "month" => Some(
                d.month()
                    .map(|m| Value::Number(Decimal::from(m)))
                    .unwrap_or(Value::Null),
            ),
            "day" => Some(
                d.day()
                    .map(|day| Value::Number(Decimal::from(day)))
                    .unwrap_or(Value::Null),
            ),
            _ => None,
        },
        Value::Time(t) => match name {
            "hour" => Some(Value::Number(Decimal::from(t.hour()))),
            "minute" => Some(Value::Number(Decimal::from(t.minute()))),
            "second" => Some(Value::Number(Decimal::from(t.second()))),
            _ => None,
        },
        Value::Duration(d) => match name {
            "years" => Some(Value::Number(Decimal::from(d.years))),
            "months" => Some(Value::Number(Decimal::from(d.months))),
            "days" => Some(Value::Number(Decimal::from(d.days))),
            "hours" => Some(Value::Number(Decimal::from(d.hours))),
            "minutes" => Some(Value::Number(Decimal::from(d.minutes))),
            "seconds" => Some(Value::Number(Decimal::from(d.seconds))),
            _ => None,
        },
        Value::String(s) => match name {
            "length" => Some(Value::Number(Decimal::from(s.chars().count() as u64))),
            _ => None,
        },
        _ => None,
    };
    match found {
        Some(value) => Ok(Evaluation::Ready(value)),
        None => Err(JelError::undeclared_member(object.type_name(), name)),
    }
}

/// The explicit method registry: `(type name, method name)` to behavior
pub fn call_method(
    ctx: &Rc<Context>,
    object: &Value,
    name: &str,
    args: &[Value],
) -> JelResult<Evaluation> {
    let expect_one = |args: &[Value]| -> JelResult<Value> {
        match args {
            [arg] => Ok(arg.clone()),
            _ => Err(JelError::Construction(format!(
                "{}.{} takes exactly one argument",
                object.type_name(),
                name
            ))),
        }
    };

    match (object, name) {
        (Value::Null, _) => Err(JelError::UnboundName {
            name: name.to_string(),
            kind: crate::error::NameErrorKind::NullAccess,
        }),
        (Value::Fraction(f), "simplify") => Ok(Evaluation::Ready(f.simplify())),
        (Value::Date(d), "simplify") => Ok(Evaluation::Ready(Value::Date(d.simplify()))),
        (Value::Range(r), "contains") => {
            let value = expect_one(args)?;
            Ok(Evaluation::Ready(Value::Boolean(r.contains(&value)?)))
        }
        (Value::Distribution(d), "getValue") => {
            let share = expect_one(args)?.as_decimal().ok_or_else(|| {
                JelError::Construction("Distribution.getValue takes a number".to_string())
            })?;
            Ok(Evaluation::Ready(
                d.get_value(share).map(Value::Number).unwrap_or(Value::Null),
            ))
        }
        (Value::Distribution(d), "getShare") => {
            let value = expect_one(args)?.as_decimal().ok_or_else(|| {
                JelError::Construction("Distribution.getShare takes a number".to_string())
            })?;
            Ok(Evaluation::Ready(
                d.get_share(value).map(Value::Number).unwrap_or(Value::Null),
            ))
        }
        (Value::Unit(u), "convertTo") => {
            let target = match expect_one(args)? {
                Value::String(name) => value::CompoundUnit::parse(&name)?,
                other => {
                    return Err(JelError::Construction(format!(
                        "UnitValue.convertTo takes a unit name, not {}",
                        other.type_name()
                    )))
                }
            };
            let session = ctx.session().ok_or_else(|| {
                JelError::Conversion(
                    "unit conversion requires a database session".to_string(),
                )
            })?;
            value::units::convert(session, u, &target)
        }
        (Value::Fuzzy(f), "negate") => Ok(Evaluation::Ready(Value::Fuzzy(f.negate()))),
        (Value::Lambda(lambda), "invoke") => lambda.invoke(ctx, args, &[]),
        _ => Err(JelError::undeclared_member(object.type_name(), name)),
    }
}

/// `instanceof`: the runtime type name (or a database entity's distinct
/// name) matches the designator exactly
pub fn instance_of(object: &Value, designator: &str) -> JelResult<Evaluation> {
    let name = entity_name(object);
    Ok(Evaluation::Ready(Value::Boolean(name == designator)))
}

/// `derivativeof`: walk the database's `extends` chain from the object's
/// type toward the designator
pub fn derivative_of(
    ctx: &Rc<Context>,
    object: &Value,
    designator: &str,
) -> JelResult<Evaluation> {
    const MAX_DEPTH: usize = 16;
    let mut current = entity_name(object).to_string();
    if current == designator {
        return Ok(Evaluation::Ready(Value::Boolean(true)));
    }
    let Some(session) = ctx.session() else {
        return Ok(Evaluation::Ready(Value::Boolean(false)));
    };
    for _ in 0..MAX_DEPTH {
        match session.get_member(&current, "extends") {
            Ok(Resolution::Ready(Value::String(parent))) => {
                if parent == designator {
                    return Ok(Evaluation::Ready(Value::Boolean(true)));
                }
                current = parent;
            }
            Ok(Resolution::Ready(_)) => return Ok(Evaluation::Ready(Value::Boolean(false))),
            Ok(Resolution::Pending) => {
                return Ok(Evaluation::Pending(PendingFetch::one(current)))
            }
            Err(JelError::UnboundName { .. }) => {
                return Ok(Evaluation::Ready(Value::Boolean(false)))
            }
            Err(other) => return Err(other),
        }
    }
    Ok(Evaluation::Ready(Value::Boolean(false)))
}

/// A database entity carries its own distinct name; every other value is
/// designated by its runtime type name
fn entity_name(object: &Value) -> &str {
    if let Value::Dictionary(members) = object {
        if let Some(Value::String(name)) = members.get("distinctName") {
            return name;
        }
    }
    object.type_name()
}
