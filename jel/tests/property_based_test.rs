use jel::value::{FuzzyBoolean, Value};
use jel::Jel;
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_tokenizer_is_total(input in ".*") {
        // Any input tokenizes or reports a lex error; it never panics or
        // loops.
        let _ = jel::tokenizer::tokenize(&input);
    }

    #[test]
    fn prop_parser_is_total(input in ".*") {
        let _ = jel::parse(&input);
    }

    #[test]
    fn prop_number_literals_round_trip(n in -1_000_000i64..1_000_000) {
        let engine = Jel::new();
        let value = engine.evaluate(&n.to_string()).unwrap();
        let reparsed = engine.evaluate(&value.to_string()).unwrap();
        prop_assert_eq!(reparsed, value);
    }

    #[test]
    fn prop_fraction_sign_normalization(n in -1000i64..1000, d in 1i64..1000) {
        let engine = Jel::new();
        let plain = engine.evaluate(&format!("Fraction({}, {})", n, d)).unwrap();
        let flipped = engine.evaluate(&format!("Fraction({}, {})", -n, -d)).unwrap();
        prop_assert_eq!(plain, flipped);
    }

    #[test]
    fn prop_fraction_addition_is_exact(
        a in -100i64..100,
        b in 1i64..100,
        c in -100i64..100,
        d in 1i64..100,
    ) {
        let engine = Jel::new();
        let source = format!(
            "Fraction({}, {}) + Fraction({}, {}) == Fraction({}, {})",
            a, b, c, d,
            a * d + c * b,
            b * d,
        );
        prop_assert!(engine.evaluate(&source).unwrap().is_truthy());
    }

    #[test]
    fn prop_fraction_comparison_matches_decimals(
        a in -100i64..100,
        b in 1i64..100,
        c in -100i64..100,
        d in 1i64..100,
    ) {
        let engine = Jel::new();
        let expected = (a as f64 / b as f64) < (c as f64 / d as f64);
        let result = engine
            .evaluate(&format!("Fraction({}, {}) << Fraction({}, {})", a, b, c, d))
            .unwrap();
        prop_assert_eq!(result, Value::Boolean(expected));
    }

    #[test]
    fn prop_fuzzy_double_negation(state in 0i64..=100) {
        let fuzzy = FuzzyBoolean::new(Decimal::new(state, 2));
        prop_assert_eq!(fuzzy.negate().negate(), fuzzy);
    }

    #[test]
    fn prop_lenient_and_strict_comparisons_agree_on_numbers(
        a in -1000i64..1000,
        b in -1000i64..1000,
    ) {
        let engine = Jel::new();
        let lenient = engine.evaluate(&format!("{} < {}", a, b)).unwrap();
        let strict = engine.evaluate(&format!("{} << {}", a, b)).unwrap();
        prop_assert_eq!(lenient.is_truthy(), a < b);
        prop_assert_eq!(strict, Value::Boolean(a < b));
    }

    #[test]
    fn prop_range_contains_its_bounds(a in -1000i64..1000, b in -1000i64..1000) {
        let (lo, hi) = (a.min(b), a.max(b));
        let engine = Jel::new();
        let contains = |value: i64| {
            engine
                .evaluate(&format!("Range({}, {}).contains({})", lo, hi, value))
                .unwrap()
        };
        prop_assert_eq!(contains(lo), Value::Boolean(true));
        prop_assert_eq!(contains(hi), Value::Boolean(true));
        prop_assert_eq!(contains(hi + 1), Value::Boolean(false));
    }

    #[test]
    fn prop_date_simplify_is_idempotent(
        year in 1900i32..2100,
        month in -24i32..36,
        day in -60i32..90,
    ) {
        let date = jel::value::Date::new(year, Some(month), Some(day)).unwrap();
        let simplified = date.simplify();
        prop_assert_eq!(simplified.simplify(), simplified);
        let month = simplified.month().unwrap();
        prop_assert!((1..=12).contains(&month));
        prop_assert!(simplified.day().unwrap() >= 1);
    }
}
