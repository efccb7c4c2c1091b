use crate::engine::Jel;
use crate::error::{JelError, NameErrorKind};
use crate::value::{Fraction, Value};
use rust_decimal::Decimal;

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
fn test_null_equality() {
    assert_eq!(eval("null == null"), Value::lenient(true));
    assert_eq!(eval("1 == null"), Value::lenient(false));
    assert_eq!(eval("null != 1"), Value::lenient(true));
    assert_eq!(eval("null === null"), Value::Boolean(true));
    assert_eq!(eval("null !== 1"), Value::Boolean(true));
}

#[test]
fn test_null_ordering_is_never_true() {
    assert_eq!(eval("null < 1"), Value::lenient(false));
    assert_eq!(eval("1 > null"), Value::lenient(false));
    assert_eq!(eval("null << 1"), Value::Boolean(false));
    assert_eq!(eval("null >== null"), Value::Boolean(false));
}

#[test]
fn test_null_arithmetic_is_unsupported() {
    assert!(matches!(
        Jel::new().evaluate("null + 1"),
        Err(JelError::UnsupportedOperator { .. })
    ));
}

#[test]
fn test_lenient_comparisons_yield_fuzzy_results() {
    assert_eq!(eval("1 < 2"), Value::lenient(true));
    assert_eq!(eval("2 <= 1"), Value::lenient(false));
}

#[test]
fn test_strict_comparisons_yield_exact_booleans() {
    assert_eq!(eval("1 << 2"), Value::Boolean(true));
    assert_eq!(eval("1 >== 2"), Value::Boolean(false));
    assert_eq!(eval("2 >>= 1"), Value::Boolean(true));
}

#[test]
fn test_reversal_of_symmetric_operators() {
    assert_eq!(eval("2 + Fraction(1, 4)"), fraction(9, 4));
    assert_eq!(eval("2 * Fraction(1, 4)"), fraction(1, 2));
    assert_eq!(eval("true == FuzzyBoolean(1)"), eval("FuzzyBoolean(1) == true"));
}

#[test]
fn test_reversal_mirrors_orderings() {
    // 1 < 3/2 retries as 3/2 > 1.
    assert_eq!(eval("1 < Fraction(3, 2)"), Value::lenient(true));
    assert_eq!(eval("2 >> Fraction(3, 2)"), Value::Boolean(true));
}

#[test]
fn test_non_reversible_pairing_is_an_error() {
    assert!(matches!(
        Jel::new().evaluate("3 - Fraction(1, 2)"),
        Err(JelError::UnsupportedOperator { .. })
    ));
}

#[test]
fn test_string_operators() {
    assert_eq!(eval("\"foo\" + \"bar\""), Value::from("foobar"));
    assert_eq!(eval("\"a\" < \"b\""), Value::lenient(true));
    assert_eq!(eval("\"a\" === \"a\""), Value::Boolean(true));
}

#[test]
fn test_boolean_pairings_support_equality_only() {
    assert_eq!(eval("true == true"), Value::lenient(true));
    assert!(matches!(
        Jel::new().evaluate("true + true"),
        Err(JelError::UnsupportedOperator { .. })
    ));
}

#[test]
fn test_member_access() {
    assert_eq!(eval("Fraction(1, 2).numerator"), num(1));
    assert_eq!(eval("\"abc\".length"), num(3));
    assert_eq!(eval("Range(1, null).max"), Value::Null);
    assert_eq!(eval("Dictionary(\"a\", 7).a"), num(7));
}

#[test]
fn test_member_errors_distinguish_their_cause() {
    match Jel::new().evaluate("null.x") {
        Err(JelError::UnboundName { kind, .. }) => {
            assert_eq!(kind, NameErrorKind::NullAccess)
        }
        other => panic!("expected a null-access error, got {:?}", other),
    }
    // Types without a property table report undeclared members too.
    for source in ["Fraction(1, 2).wrong", "List(1, 2).wrong", "true.wrong"] {
        match Jel::new().evaluate(source) {
            Err(JelError::UnboundName { kind, .. }) => {
                assert_eq!(kind, NameErrorKind::UndeclaredMember, "{}", source)
            }
            other => panic!("expected an undeclared-member error, got {:?}", other),
        }
    }
}

#[test]
fn test_method_registry() {
    assert_eq!(eval("Fraction(2, 4).simplify()"), fraction(1, 2));
    assert_eq!(eval("FuzzyBoolean(0.25).negate()"), eval("FuzzyBoolean(0.75)"));
    assert_eq!(eval("Range(1, 5).contains(3)"), Value::Boolean(true));
    assert!(matches!(
        Jel::new().evaluate("Fraction(1, 2).explode()"),
        Err(JelError::UnboundName { .. })
    ));
}

#[test]
fn test_instance_of() {
    assert_eq!(
        eval("Fraction(1, 2) instanceof Fraction"),
        Value::Boolean(true)
    );
    assert_eq!(eval("1 instanceof Fraction"), Value::Boolean(false));
    // A database entity is designated by its distinct name.
    assert_eq!(
        eval("Dictionary(\"distinctName\", \"Meter\") instanceof Meter"),
        Value::Boolean(true)
    );
}

#[test]
fn test_positional_list_operators() {
    assert_eq!(eval("List(1, 2, 3, 4) at 2"), num(3));
    assert_eq!(eval("List(1, 2) at 9"), Value::Null);
    assert_eq!(
        eval("List(1, 2, 3, 4) skip 2"),
        Value::List(vec![num(3), num(4)])
    );
    assert_eq!(
        eval("List(1, 2, 3, 4) truncate 2"),
        Value::List(vec![num(1), num(2)])
    );
}

#[test]
fn test_list_concatenation_and_equality() {
    assert_eq!(
        eval("List(1) + List(2, 3)"),
        Value::List(vec![num(1), num(2), num(3)])
    );
    assert_eq!(eval("List(1, 2) == List(1, 2)"), Value::lenient(true));
    assert_eq!(eval("List(1) === List(2)"), Value::Boolean(false));
}
