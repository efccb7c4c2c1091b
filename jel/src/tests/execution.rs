use crate::database::{DatabaseSession, InMemoryDatabase, Resolution};
use crate::engine::Jel;
use crate::error::JelError;
use crate::value::Value;
use crate::JelResult;
use rust_decimal::Decimal;
use std::rc::Rc;

fn eval(text: &str) -> Value {
    Jel::new().evaluate(text).unwrap()
}

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

#[test]
fn test_with_scope() {
    assert_eq!(eval("with x = 2, y = x + 3: y * 2"), num(10));
}

#[test]
fn test_inner_binding_shadows_outer() {
    assert_eq!(eval("with x = 1: with x = 2: x"), num(2));
}

#[test]
fn test_condition_takes_the_truthy_branch() {
    assert_eq!(eval("if 2 > 1 then \"yes\" else \"no\""), Value::from("yes"));
    assert_eq!(eval("if 0 then \"yes\" else \"no\""), Value::from("no"));
}

#[test]
fn test_short_circuit_skips_the_right_operand() {
    // The guarded division would raise; short-circuiting never reaches it.
    assert_eq!(eval("false && (1 / 0)"), Value::Boolean(false));
    assert_eq!(eval("true || (1 / 0)"), Value::Boolean(true));
}

#[test]
fn test_logic_returns_the_deciding_operand() {
    assert_eq!(eval("0 && 1"), num(0));
    assert_eq!(eval("2 && 3"), num(3));
    assert_eq!(eval("null || 5"), num(5));
    assert_eq!(eval("\"left\" || \"right\""), Value::from("left"));
}

#[test]
fn test_division_by_zero() {
    assert!(matches!(
        Jel::new().evaluate("1 / 0"),
        Err(JelError::Construction(_))
    ));
    assert!(matches!(
        Jel::new().evaluate("5 % 0"),
        Err(JelError::Construction(_))
    ));
}

#[test]
fn test_lambda_call() {
    assert_eq!(eval("(x => x * 2)(21)"), num(42));
}

#[test]
fn test_lambda_named_arguments() {
    assert_eq!(eval("((a, b) => a - b)(b=1, a=10)"), num(9));
}

#[test]
fn test_unsupplied_parameter_binds_null() {
    assert_eq!(eval("(x => exists x)()"), Value::Boolean(false));
}

#[test]
fn test_lambda_captures_its_context() {
    assert_eq!(eval("with n = 10: (x => x + n)(5)"), num(15));
}

#[test]
fn test_list_indexing() {
    assert_eq!(eval("List(1, 2, 3)[1]"), num(2));
    assert_eq!(eval("List(1)[5]"), Value::Null);
    assert_eq!(eval("Dictionary(\"a\", 1)[\"a\"]"), num(1));
    assert_eq!(eval("Dictionary(\"a\", 1)[\"b\"]"), Value::Null);
}

#[test]
fn test_collection_pipeline() {
    assert_eq!(
        eval("List(1, 2, 3, 4) filter (x => x % 2 == 0) map (x => x * 10)"),
        Value::List(vec![num(20), num(40)])
    );
}

#[test]
fn test_collect_drops_nulls() {
    assert_eq!(
        eval("List(1, null, 3) collect (x => x)"),
        Value::List(vec![num(1), num(3)])
    );
}

#[test]
fn test_sort_by_key() {
    assert_eq!(
        eval("List(3, 1, 2) sort (x => x)"),
        Value::List(vec![num(1), num(2), num(3)])
    );
}

#[test]
fn test_aggregate_words() {
    assert_eq!(eval("first List(7, 8)"), num(7));
    assert_eq!(eval("count \"abc\""), num(3));
    assert_eq!(eval("same List(2, 2, 2)"), Value::Boolean(true));
    assert_eq!(eval("same List(2, 3)"), Value::Boolean(false));
    assert_eq!(eval("avg List(1, 2, 3)"), num(2));
    assert_eq!(eval("max List(3, 9, 4)"), num(9));
    assert_eq!(eval("min List(3, 9, 4)"), num(3));
}

#[test]
fn test_unbound_variable() {
    assert!(matches!(
        Jel::new().evaluate("nope"),
        Err(JelError::UnboundName { .. })
    ));
}

#[test]
fn test_reference_requires_a_session() {
    assert!(matches!(
        Jel::new().evaluate("@Revenue"),
        Err(JelError::Engine(_))
    ));
}

#[test]
fn test_published_reference_resolves() {
    let database = InMemoryDatabase::new();
    database.insert("Revenue", num(100));
    let engine = Jel::with_database(Rc::new(database));
    assert_eq!(engine.evaluate("@Revenue + 1").unwrap(), num(101));
}

#[test]
fn test_staged_references_resolve_after_a_drive() {
    let database = InMemoryDatabase::new();
    database.stage("a", num(2));
    database.stage("b", num(3));
    let engine = Jel::with_database(Rc::new(database));
    assert_eq!(engine.evaluate("@a + @b").unwrap(), num(5));
}

/// A collaborator that reports every fetch as underway but never completes
/// any of them
struct NeverReady;

impl DatabaseSession for NeverReady {
    fn resolve(&self, _name: &str) -> JelResult<Resolution> {
        Ok(Resolution::Pending)
    }

    fn get_member(&self, _name: &str, _property: &str) -> JelResult<Resolution> {
        Ok(Resolution::Pending)
    }

    fn advance(&self) -> JelResult<bool> {
        Ok(false)
    }
}

#[test]
fn test_no_progress_is_a_stall_error() {
    let engine = Jel::with_database(Rc::new(NeverReady));
    match engine.evaluate("@x + @y") {
        Err(JelError::Engine(message)) => {
            assert!(message.contains("stalled"), "{}", message);
            // Both outstanding names are reported, sorted.
            assert!(message.contains("x, y"), "{}", message);
        }
        other => panic!("expected a stall error, got {:?}", other),
    }
}

#[test]
fn test_prebound_context() {
    let engine = Jel::new();
    let mut frame = crate::context::Context::child_of(engine.context());
    frame.bind("x", num(4));
    let node = engine.parse("x * x").unwrap();
    assert_eq!(engine.run_in(&node, &Rc::new(frame)).unwrap(), num(16));
}
