//! The database collaborator interface
//!
//! The engine never owns the knowledge database; it reaches it through this
//! trait. A lookup either answers immediately or reports that the fetch is
//! underway, in which case the driver asks the collaborator to make
//! progress (`advance`) and re-executes.

use crate::error::JelError;
use crate::value::Value;
use crate::JelResult;
use std::cell::RefCell;
use std::collections::HashMap;

/// The outcome of a single database lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The value is available now
    Ready(Value),
    /// The fetch is underway; retry after `advance`
    Pending,
}

/// A session with the external knowledge database.
///
/// `resolve` backs `@Name` references; `get_member` backs the unit
/// conversion metadata lookups. `advance` asks the collaborator to complete
/// outstanding fetches and reports whether anything progressed; a driver
/// seeing Pending with no progress must treat the evaluation as stalled.
pub trait DatabaseSession {
    fn resolve(&self, name: &str) -> JelResult<Resolution>;
    fn get_member(&self, name: &str, property: &str) -> JelResult<Resolution>;
    fn advance(&self) -> JelResult<bool>;
}

/// A databaseless session: every lookup is an unbound name. Used when an
/// expression is evaluated without a collaborator attached.
pub struct NoDatabase;

impl DatabaseSession for NoDatabase {
    fn resolve(&self, name: &str) -> JelResult<Resolution> {
        Err(JelError::unbound(name))
    }

    fn get_member(&self, name: &str, property: &str) -> JelResult<Resolution> {
        Err(JelError::undeclared_member(name, property))
    }

    fn advance(&self) -> JelResult<bool> {
        Ok(false)
    }
}

/// An in-memory database for tests and embedding.
///
/// Entries inserted with `insert` resolve immediately. Entries inserted
/// with `stage` answer Pending until `advance` publishes them, which models
/// the collaborator's asynchronous fetch cycle deterministically.
#[derive(Default)]
pub struct InMemoryDatabase {
    published: RefCell<HashMap<String, Value>>,
    staged: RefCell<HashMap<String, Value>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, value: Value) {
        self.published.borrow_mut().insert(name.into(), value);
    }

    pub fn stage(&self, name: impl Into<String>, value: Value) {
        self.staged.borrow_mut().insert(name.into(), value);
    }
}

impl DatabaseSession for InMemoryDatabase {
    fn resolve(&self, name: &str) -> JelResult<Resolution> {
        if let Some(value) = self.published.borrow().get(name) {
            return Ok(Resolution::Ready(value.clone()));
        }
        if self.staged.borrow().contains_key(name) {
            return Ok(Resolution::Pending);
        }
        Err(JelError::unbound(name))
    }

    fn get_member(&self, name: &str, property: &str) -> JelResult<Resolution> {
        let published = self.published.borrow();
        let Some(entity) = published.get(name) else {
            if self.staged.borrow().contains_key(name) {
                return Ok(Resolution::Pending);
            }
            return Err(JelError::unbound(name));
        };
        match entity {
            Value::Dictionary(members) => match members.get(property) {
                Some(value) => Ok(Resolution::Ready(value.clone())),
                None => Err(JelError::undeclared_member(name, property)),
            },
            _ => Err(JelError::undeclared_member(name, property)),
        }
    }

    fn advance(&self) -> JelResult<bool> {
        let mut staged = self.staged.borrow_mut();
        if staged.is_empty() {
            return Ok(false);
        }
        let mut published = self.published.borrow_mut();
        for (name, value) in staged.drain() {
            published.insert(name, value);
        }
        Ok(true)
    }
}
