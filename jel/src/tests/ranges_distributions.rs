use crate::engine::Jel;
use crate::error::JelError;
use crate::value::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

fn eval(text: &str) -> Value {
    Jel::new().evaluate(text).unwrap()
}

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

fn dec(text: &str) -> Value {
    Value::Number(Decimal::from_str(text).unwrap())
}

#[test]
fn test_containment() {
    assert_eq!(eval("Range(1, 5).contains(3)"), Value::Boolean(true));
    assert_eq!(eval("Range(1, 5).contains(1)"), Value::Boolean(true));
    assert_eq!(eval("Range(1, 5).contains(6)"), Value::Boolean(false));
}

#[test]
fn test_an_absent_bound_never_excludes() {
    assert_eq!(eval("Range(null, 5).contains(-100)"), Value::Boolean(true));
    assert_eq!(eval("Range(1, null).contains(1000000)"), Value::Boolean(true));
    assert_eq!(eval("Range(null, null).contains(0)"), Value::Boolean(true));
}

#[test]
fn test_strict_separation() {
    assert_eq!(eval("Range(1, 5) >> Range(6, 10)"), Value::Boolean(false));
    assert_eq!(eval("Range(1, 5) << Range(6, 10)"), Value::Boolean(true));
    assert_eq!(eval("Range(6, 10) >> Range(1, 5)"), Value::Boolean(true));
}

#[test]
fn test_unbounded_sides_cannot_establish_strict_separation() {
    assert_eq!(eval("Range(null, 5) >> Range(1, 2)"), Value::Boolean(false));
    assert_eq!(eval("Range(6, 10) << Range(11, null)"), Value::Boolean(true));
    assert_eq!(eval("Range(6, null) << Range(11, null)"), Value::Boolean(false));
}

#[test]
fn test_lenient_ordering_is_best_effort() {
    assert_eq!(eval("Range(1, 5) < Range(6, 10)"), Value::lenient(true));
    assert_eq!(eval("Range(6, 10) >= Range(1, 5)"), Value::lenient(true));
}

#[test]
fn test_scalars_compare_as_degenerate_ranges() {
    assert_eq!(eval("Range(1, 5) << 6"), Value::Boolean(true));
    assert_eq!(eval("Range(1, 5) == Range(1, 5)"), Value::lenient(true));
    assert_eq!(eval("3 < Range(4, 9)"), Value::lenient(true));
}

#[test]
fn test_min_max_words_read_the_bounds() {
    assert_eq!(eval("min Range(1, 5)"), num(1));
    assert_eq!(eval("max Range(1, null)"), Value::Null);
}

#[test]
fn test_range_equality_includes_missing_bounds() {
    assert_eq!(eval("Range(null, 5) == Range(1, 5)"), Value::lenient(false));
    assert_eq!(eval("Range(null, 5) === Range(null, 5)"), Value::Boolean(true));
}

#[test]
fn test_distribution_value_interpolation() {
    assert_eq!(
        eval("Distribution(0, 0, 5, 0.5, 10, 1).getValue(0.25)"),
        dec("2.5")
    );
    assert_eq!(eval("Distribution(0, 0, 5, 0.5, 10, 1).getValue(0.5)"), num(5));
}

#[test]
fn test_distribution_value_clamps_outside_the_span() {
    assert_eq!(eval("Distribution(0, 0, 10, 1).getValue(2)"), num(10));
    assert_eq!(eval("Distribution(0, 0.2, 10, 1).getValue(0.1)"), num(0));
}

#[test]
fn test_distribution_share_interpolation() {
    assert_eq!(
        eval("Distribution(0, 0, 5, 0.5, 10, 1).getShare(7.5)"),
        dec("0.75")
    );
    // Values outside the covered span have no share.
    assert_eq!(eval("Distribution(0, 0, 10, 1).getShare(11)"), Value::Null);
}

#[test]
fn test_share_outside_unit_interval_is_rejected() {
    assert!(matches!(
        Jel::new().evaluate("Distribution(0, 2)"),
        Err(JelError::Construction(_))
    ));
    assert!(matches!(
        Jel::new().evaluate("Distribution(0, -0.5)"),
        Err(JelError::Construction(_))
    ));
}

#[test]
fn test_distribution_summary_words() {
    assert_eq!(eval("min Distribution(0, 0, 10, 1)"), num(0));
    assert_eq!(eval("max Distribution(0, 0, 10, 1)"), num(10));
    // An odd trailing constructor argument is the average.
    assert_eq!(eval("avg Distribution(0, 0, 10, 1, 4)"), num(4));
    assert_eq!(eval("avg Distribution(0, 0, 10, 1)"), Value::Null);
}

#[test]
fn test_lone_point_and_average_fallbacks() {
    assert_eq!(eval("Distribution(7, 0.5).getValue(0.9)"), num(7));
    assert_eq!(eval("Distribution(3).getValue(0.5)"), num(3));
}
