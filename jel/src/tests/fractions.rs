use crate::engine::Jel;
use crate::error::JelError;
use crate::value::{Fraction, Value};
use rust_decimal::Decimal;
use std::str::FromStr;

fn eval(text: &str) -> Value {
    Jel::new().evaluate(text).unwrap()
}

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

fn fraction(n: i64, d: i64) -> Value {
    Value::Fraction(Fraction::new(n, d).unwrap())
}

#[test]
fn test_half_plus_half_is_exactly_one() {
    assert_eq!(eval("Fraction(1, 2) + Fraction(1, 2)"), num(1));
}

#[test]
fn test_sign_normalizes_into_the_numerator() {
    let f = Fraction::new(1, -2).unwrap();
    assert_eq!(f.numerator(), -1);
    assert_eq!(f.denominator(), 2);
    assert_eq!(eval("Fraction(1, -2) == Fraction(-1, 2)"), Value::lenient(true));
}

#[test]
fn test_zero_denominator_is_a_construction_error() {
    assert!(matches!(
        Jel::new().evaluate("Fraction(1, 0)"),
        Err(JelError::Construction(_))
    ));
}

#[test]
fn test_thirds_stay_exact() {
    assert_eq!(eval("Fraction(1, 3) * 3"), num(1));
    assert_eq!(eval("Fraction(1, 3) + Fraction(1, 6)"), fraction(1, 2));
    assert_eq!(eval("Fraction(2, 3) / Fraction(4, 3)"), fraction(1, 2));
}

#[test]
fn test_integer_partners_promote() {
    assert_eq!(eval("Fraction(1, 4) + 1"), fraction(5, 4));
    assert_eq!(eval("Fraction(3, 2) - 1"), fraction(1, 2));
}

#[test]
fn test_non_integer_partners_fall_back_to_decimals() {
    assert_eq!(
        eval("Fraction(1, 2) + 0.25"),
        Value::Number(Decimal::from_str("0.75").unwrap())
    );
}

#[test]
fn test_cross_multiplied_comparison() {
    assert_eq!(eval("Fraction(1, 2) > Fraction(1, 3)"), Value::lenient(true));
    assert_eq!(eval("Fraction(1, 2) >> Fraction(1, 3)"), Value::Boolean(true));
    assert_eq!(
        eval("Fraction(2, 4) === Fraction(1, 2)"),
        Value::Boolean(true)
    );
}

#[test]
fn test_simplify() {
    assert_eq!(Fraction::new(4, 2).unwrap().simplify(), num(2));
    assert_eq!(Fraction::new(2, 4).unwrap().simplify(), fraction(1, 2));
    // Arithmetic results come back reduced.
    assert_eq!(eval("Fraction(1, 6) + Fraction(1, 6)"), fraction(1, 3));
}

#[test]
fn test_modulo_evaluates_in_decimals() {
    assert_eq!(
        eval("Fraction(7, 2) % 1"),
        Value::Number(Decimal::from_str("0.5").unwrap())
    );
}

#[test]
fn test_modulo_by_zero_is_a_construction_error() {
    assert!(matches!(
        Jel::new().evaluate("Fraction(1, 2) % 0"),
        Err(JelError::Construction(_))
    ));
    assert!(matches!(
        Jel::new().evaluate("Fraction(1, 2) % Fraction(0, 3)"),
        Err(JelError::Construction(_))
    ));
}

#[test]
fn test_negate_and_abs() {
    assert_eq!(eval("-Fraction(1, 2)"), fraction(-1, 2));
    assert_eq!(eval("abs Fraction(-1, 2)"), fraction(1, 2));
}

#[test]
fn test_members() {
    assert_eq!(eval("Fraction(3, 4).denominator"), num(4));
    assert_eq!(eval("Fraction(3, -4).numerator"), num(-3));
}

#[test]
fn test_constructor_requires_integers() {
    assert!(matches!(
        Jel::new().evaluate("Fraction(1.5, 2)"),
        Err(JelError::Construction(_))
    ));
}
