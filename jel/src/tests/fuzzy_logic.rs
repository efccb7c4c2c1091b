use crate::engine::Jel;
use crate::value::{FuzzyBoolean, Value};
use rust_decimal::Decimal;

fn eval(text: &str) -> Value {
    Jel::new().evaluate(text).unwrap()
}

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

#[test]
fn test_double_negation_over_the_lattice() {
    for point in FuzzyBoolean::lattice() {
        assert_eq!(point.negate().negate(), point);
    }
}

#[test]
fn test_state_clamps() {
    assert_eq!(FuzzyBoolean::new(Decimal::from(7)).state(), Decimal::ONE);
    assert_eq!(FuzzyBoolean::new(Decimal::from(-1)).state(), Decimal::ZERO);
}

#[test]
fn test_derived_boolean() {
    assert!(FuzzyBoolean::half_true().to_bool());
    assert!(FuzzyBoolean::barely_true().to_bool());
    assert!(!FuzzyBoolean::barely_false().to_bool());
}

#[test]
fn test_lenient_equality_uses_the_derived_boolean() {
    assert_eq!(eval("FuzzyBoolean(0.75) == true"), Value::lenient(true));
    assert_eq!(eval("FuzzyBoolean(0.75) == FuzzyBoolean(1)"), Value::lenient(true));
    assert_eq!(eval("FuzzyBoolean(0.25) == true"), Value::lenient(false));
}

#[test]
fn test_strict_equality_compares_lattice_position() {
    assert_eq!(
        eval("FuzzyBoolean(0.75) === FuzzyBoolean(0.75)"),
        Value::Boolean(true)
    );
    assert_eq!(
        eval("FuzzyBoolean(0.75) === FuzzyBoolean(1)"),
        Value::Boolean(false)
    );
}

#[test]
fn test_lenient_ordering_uses_the_derived_boolean() {
    assert_eq!(
        eval("FuzzyBoolean(0.25) < FuzzyBoolean(0.75)"),
        Value::lenient(true)
    );
    // Both sides derive true, so neither is leniently less than the other.
    assert_eq!(
        eval("FuzzyBoolean(0.75) < FuzzyBoolean(1)"),
        Value::lenient(false)
    );
    assert_eq!(
        eval("FuzzyBoolean(0.75) >= FuzzyBoolean(1)"),
        Value::lenient(true)
    );
}

#[test]
fn test_strict_ordering_compares_lattice_position() {
    assert_eq!(
        eval("FuzzyBoolean(0.75) << FuzzyBoolean(1)"),
        Value::Boolean(true)
    );
    assert_eq!(
        eval("FuzzyBoolean(0.25) >> FuzzyBoolean(0.75)"),
        Value::Boolean(false)
    );
}

#[test]
fn test_not_operator() {
    assert_eq!(eval("!FuzzyBoolean(0.25)"), eval("FuzzyBoolean(0.75)"));
    assert_eq!(eval("!!FuzzyBoolean(0.25)"), eval("FuzzyBoolean(0.25)"));
}

#[test]
fn test_fuzzy_condition_uses_the_derived_boolean() {
    assert_eq!(eval("if FuzzyBoolean(0.75) then 1 else 2"), num(1));
    assert_eq!(eval("if FuzzyBoolean(0.25) then 1 else 2"), num(2));
}

#[test]
fn test_fuzzy_logic_folds_through_and_or() {
    // && and || return the deciding operand, so graded values flow through.
    assert_eq!(
        eval("FuzzyBoolean(0.75) && FuzzyBoolean(0.25)"),
        eval("FuzzyBoolean(0.25)")
    );
    assert_eq!(
        eval("FuzzyBoolean(0.25) || FuzzyBoolean(0.75)"),
        eval("FuzzyBoolean(0.75)")
    );
    assert_eq!(
        eval("FuzzyBoolean(0.25) && FuzzyBoolean(1)"),
        eval("FuzzyBoolean(0.25)")
    );
}

#[test]
fn test_graded_comparisons_from_approximate_numbers() {
    // Identical central values are clearly equal regardless of error.
    assert_eq!(
        eval("ApproximateNumber(5, 1) == ApproximateNumber(5, 2)"),
        Value::Fuzzy(FuzzyBoolean::clearly_true())
    );
    // A delta equal to the combined error bound grades to the half point.
    assert_eq!(
        eval("ApproximateNumber(5, 1) == ApproximateNumber(6, 0)"),
        Value::Fuzzy(FuzzyBoolean::half_true())
    );
    // The strict family ignores the error bound entirely.
    assert_eq!(
        eval("ApproximateNumber(5, 1) === ApproximateNumber(6, 0)"),
        Value::Boolean(false)
    );
}
