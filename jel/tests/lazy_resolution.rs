use jel::database::{DatabaseSession, InMemoryDatabase, Resolution};
use jel::value::Value;
use jel::{Jel, JelError, JelResult};
use rust_decimal::Decimal;
use std::cell::Cell;
use std::rc::Rc;

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

/// Counts round trips so tests can assert how many drive cycles an
/// evaluation needed
struct CountingDatabase {
    inner: InMemoryDatabase,
    advances: Cell<usize>,
    resolves: Cell<usize>,
}

impl CountingDatabase {
    fn new(inner: InMemoryDatabase) -> Self {
        CountingDatabase {
            inner,
            advances: Cell::new(0),
            resolves: Cell::new(0),
        }
    }
}

impl DatabaseSession for CountingDatabase {
    fn resolve(&self, name: &str) -> JelResult<Resolution> {
        self.resolves.set(self.resolves.get() + 1);
        self.inner.resolve(name)
    }

    fn get_member(&self, name: &str, property: &str) -> JelResult<Resolution> {
        self.inner.get_member(name, property)
    }

    fn advance(&self) -> JelResult<bool> {
        self.advances.set(self.advances.get() + 1);
        self.inner.advance()
    }
}

#[test]
fn test_published_entries_need_no_drive() {
    let inner = InMemoryDatabase::new();
    inner.insert("a", num(2));
    let database = Rc::new(CountingDatabase::new(inner));
    let engine = Jel::with_database(Rc::clone(&database) as Rc<dyn DatabaseSession>);

    assert_eq!(engine.evaluate("@a * 3").unwrap(), num(6));
    assert_eq!(database.advances.get(), 0);
}

#[test]
fn test_independent_fetches_batch_into_one_round_trip() {
    let inner = InMemoryDatabase::new();
    inner.stage("a", num(1));
    inner.stage("b", num(2));
    inner.stage("c", num(3));
    let database = Rc::new(CountingDatabase::new(inner));
    let engine = Jel::with_database(Rc::clone(&database) as Rc<dyn DatabaseSession>);

    // All three names suspend on the first pass and publish together.
    assert_eq!(engine.evaluate("@a + @b + @c").unwrap(), num(6));
    assert_eq!(database.advances.get(), 1);
}

#[test]
fn test_session_memoizes_resolutions() {
    let inner = InMemoryDatabase::new();
    inner.insert("a", num(5));
    let database = Rc::new(CountingDatabase::new(inner));
    let engine = Jel::with_database(Rc::clone(&database) as Rc<dyn DatabaseSession>);

    assert_eq!(engine.evaluate("@a + @a").unwrap(), num(10));
    assert_eq!(database.resolves.get(), 1);

    // The cache spans evaluations within the session.
    assert_eq!(engine.evaluate("@a").unwrap(), num(5));
    assert_eq!(database.resolves.get(), 1);
}

#[test]
fn test_pending_branches_do_not_block_taken_branches() {
    let inner = InMemoryDatabase::new();
    inner.insert("cheap", num(1));
    inner.stage("expensive", num(2));
    let database = Rc::new(CountingDatabase::new(inner));
    let engine = Jel::with_database(Rc::clone(&database) as Rc<dyn DatabaseSession>);

    // The untaken branch is never executed, so nothing suspends.
    assert_eq!(
        engine.evaluate("if true then @cheap else @expensive").unwrap(),
        num(1)
    );
    assert_eq!(database.advances.get(), 0);
}

#[test]
fn test_unknown_names_fail_rather_than_suspend() {
    let engine = Jel::with_database(Rc::new(InMemoryDatabase::new()));
    assert!(matches!(
        engine.evaluate("@nowhere"),
        Err(JelError::UnboundName { .. })
    ));
}

#[test]
fn test_lambda_bodies_suspend_and_resume() {
    let database = InMemoryDatabase::new();
    database.stage("rate", num(3));
    let engine = Jel::with_database(Rc::new(database));

    assert_eq!(
        engine.evaluate("List(1, 2, 3) map (x => x * @rate)").unwrap(),
        Value::List(vec![num(3), num(6), num(9)])
    );
}

#[test]
fn test_re_execution_is_idempotent() {
    let database = InMemoryDatabase::new();
    database.insert("base", num(10));
    let engine = Jel::with_database(Rc::new(database));
    let node = engine.parse("with x = @base: x + x").unwrap();

    assert_eq!(engine.run(&node).unwrap(), num(20));
    assert_eq!(engine.run(&node).unwrap(), num(20));
}
