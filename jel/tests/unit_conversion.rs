use jel::database::InMemoryDatabase;
use jel::value::{CompoundUnit, UnitValue, Value};
use jel::{Jel, JelError};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::str::FromStr;

fn entity(pairs: &[(&str, Value)]) -> Value {
    Value::Dictionary(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    )
}

fn table(pairs: &[(&str, &str)]) -> Value {
    Value::Dictionary(
        pairs
            .iter()
            .map(|(key, factor)| {
                (
                    key.to_string(),
                    Value::Number(Decimal::from_str(factor).unwrap()),
                )
            })
            .collect::<BTreeMap<_, _>>(),
    )
}

fn unit(magnitude: &str, name: &str) -> Value {
    Value::Unit(
        UnitValue::new(
            Value::Number(Decimal::from_str(magnitude).unwrap()),
            CompoundUnit::parse(name).unwrap(),
        )
        .unwrap(),
    )
}

/// Metric length metadata: direct tables for Kilometer and Centimeter, a
/// Length category anchored on Meter, and a Foot that declares its category
/// but no factors
fn length_database() -> InMemoryDatabase {
    let database = InMemoryDatabase::new();
    database.insert(
        "Kilometer",
        entity(&[
            ("convertsTo", table(&[("Meter", "1000")])),
            ("quantityCategory", Value::from("Length")),
        ]),
    );
    database.insert(
        "Centimeter",
        entity(&[
            ("convertsTo", table(&[("Meter", "0.01")])),
            ("quantityCategory", Value::from("Length")),
        ]),
    );
    database.insert(
        "Meter",
        entity(&[("quantityCategory", Value::from("Length"))]),
    );
    database.insert("Length", entity(&[("primaryUnit", Value::from("Meter"))]));
    database.insert(
        "Foot",
        entity(&[("quantityCategory", Value::from("Length"))]),
    );
    database
}

fn engine() -> Jel {
    Jel::with_database(Rc::new(length_database()))
}

#[test]
fn test_direct_table_conversion() {
    assert_eq!(
        engine()
            .evaluate("UnitValue(2, \"Kilometer\").convertTo(\"Meter\")")
            .unwrap(),
        unit("2000", "Meter")
    );
}

#[test]
fn test_inverted_table_conversion() {
    // Meter carries no table of its own; Kilometer's entry applies inverted.
    assert_eq!(
        engine()
            .evaluate("UnitValue(3000, \"Meter\").convertTo(\"Kilometer\")")
            .unwrap(),
        unit("3", "Kilometer")
    );
}

#[test]
fn test_conversion_through_the_primary_unit() {
    // Kilometer -> Meter directly, then Meter -> Centimeter inverted.
    assert_eq!(
        engine()
            .evaluate("UnitValue(2, \"Kilometer\").convertTo(\"Centimeter\")")
            .unwrap(),
        unit("200000", "Centimeter")
    );
}

#[test]
fn test_compound_units_normalize_factor_by_factor() {
    assert_eq!(
        engine()
            .evaluate("UnitValue(2, \"Kilometer^2\").convertTo(\"Meter^2\")")
            .unwrap(),
        unit("2000000", "Meter^2")
    );
}

#[test]
fn test_cross_unit_addition_converts_into_the_left_unit() {
    assert_eq!(
        engine()
            .evaluate("UnitValue(1, \"Kilometer\") + UnitValue(500, \"Meter\")")
            .unwrap(),
        unit("1.5", "Kilometer")
    );
}

#[test]
fn test_cross_unit_comparison() {
    assert_eq!(
        engine()
            .evaluate("UnitValue(1, \"Kilometer\") > UnitValue(999, \"Meter\")")
            .unwrap(),
        Value::lenient(true)
    );
    assert_eq!(
        engine()
            .evaluate("UnitValue(1, \"Kilometer\") === UnitValue(1000, \"Meter\")")
            .unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn test_composed_units_take_their_database_alias() {
    let database = length_database();
    database.insert(
        "Meter*Second^-1",
        entity(&[("unitName", Value::from("MetersPerSecond"))]),
    );
    let engine = Jel::with_database(Rc::new(database));
    assert_eq!(
        engine
            .evaluate("UnitValue(6, \"Meter\") / UnitValue(2, \"Second\")")
            .unwrap(),
        unit("3", "MetersPerSecond")
    );
}

#[test]
fn test_unaliased_compositions_keep_the_compound_form() {
    assert_eq!(
        engine()
            .evaluate("UnitValue(6, \"Meter\") / UnitValue(2, \"Second\")")
            .unwrap(),
        unit("3", "Meter*Second^-1")
    );
}

#[test]
fn test_exhausted_tiers_are_a_conversion_error() {
    // Foot declares its category but no factor reaches it.
    assert!(matches!(
        engine().evaluate("UnitValue(1, \"Meter\").convertTo(\"Foot\")"),
        Err(JelError::Conversion(_))
    ));
    assert!(matches!(
        engine().evaluate("UnitValue(1, \"Meter\") + UnitValue(1, \"Second\")"),
        Err(JelError::Conversion(_))
    ));
}

#[test]
fn test_zero_factor_is_a_malformed_rule() {
    let database = InMemoryDatabase::new();
    database.insert(
        "Broken",
        entity(&[("convertsTo", table(&[("Meter", "0")]))]),
    );
    let engine = Jel::with_database(Rc::new(database));
    assert!(matches!(
        engine.evaluate("UnitValue(1, \"Broken\").convertTo(\"Meter\")"),
        Err(JelError::Conversion(_))
    ));
}

#[test]
fn test_pending_metadata_suspends_and_resumes() {
    let database = InMemoryDatabase::new();
    database.stage(
        "Kilometer",
        entity(&[("convertsTo", table(&[("Meter", "1000")]))]),
    );
    let engine = Jel::with_database(Rc::new(database));

    // The metadata fetch is underway on the first pass; the driver advances
    // the collaborator and re-executes.
    assert_eq!(
        engine
            .evaluate("UnitValue(1, \"Kilometer\").convertTo(\"Meter\")")
            .unwrap(),
        unit("1000", "Meter")
    );
}

#[test]
fn test_identity_conversion_needs_no_metadata() {
    let engine = Jel::with_database(Rc::new(InMemoryDatabase::new()));
    assert_eq!(
        engine
            .evaluate("UnitValue(7, \"Parsec\").convertTo(\"Parsec\")")
            .unwrap(),
        unit("7", "Parsec")
    );
}
