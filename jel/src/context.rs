//! Lexical contexts and the database session
//!
//! A `Context` is an immutable binding frame: lookup walks the parent chain
//! innermost-first and frames never mutate their ancestors; `with` builds a
//! fresh child frame. The `Session` wraps the database collaborator and
//! owns the once-written resolution cache that makes re-execution after a
//! pending fetch cheap and idempotent.

use crate::database::{DatabaseSession, Resolution};
use crate::value::Value;
use crate::JelResult;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The engine-side handle on a database collaborator.
///
/// Resolved values are memoized per session, written at most once; the
/// cache is the only shared mutable state in the execution model.
pub struct Session {
    database: Rc<dyn DatabaseSession>,
    resolved: RefCell<HashMap<String, Value>>,
}

impl Session {
    pub fn new(database: Rc<dyn DatabaseSession>) -> Self {
        Session {
            database,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a named entity, consulting the cache first
    pub fn resolve(&self, name: &str) -> JelResult<Resolution> {
        if let Some(value) = self.resolved.borrow().get(name) {
            return Ok(Resolution::Ready(value.clone()));
        }
        let resolution = self.database.resolve(name)?;
        if let Resolution::Ready(value) = &resolution {
            self.resolved
                .borrow_mut()
                .entry(name.to_string())
                .or_insert_with(|| value.clone());
        }
        Ok(resolution)
    }

    /// Look up one property of a named entity (unit conversion metadata)
    pub fn get_member(&self, name: &str, property: &str) -> JelResult<Resolution> {
        let key = format!("{}.{}", name, property);
        if let Some(value) = self.resolved.borrow().get(&key) {
            return Ok(Resolution::Ready(value.clone()));
        }
        let resolution = self.database.get_member(name, property)?;
        if let Resolution::Ready(value) = &resolution {
            self.resolved
                .borrow_mut()
                .entry(key)
                .or_insert_with(|| value.clone());
        }
        Ok(resolution)
    }

    /// Ask the collaborator to complete outstanding fetches
    pub fn advance(&self) -> JelResult<bool> {
        self.database.advance()
    }
}

/// An immutable lexical binding frame
#[derive(Clone, Default)]
pub struct Context {
    locals: HashMap<String, Value>,
    parent: Option<Rc<Context>>,
    session: Option<Rc<Session>>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with_session(session: Rc<Session>) -> Self {
        Context {
            locals: HashMap::new(),
            parent: None,
            session: Some(session),
        }
    }

    /// A fresh empty child frame; the session handle is carried down
    /// unchanged
    pub fn child_of(parent: &Rc<Context>) -> Self {
        Context {
            locals: HashMap::new(),
            parent: Some(Rc::clone(parent)),
            session: parent.session.clone(),
        }
    }

    /// Bind a name in this frame. Frames are only mutated while they are
    /// being built (a `with` clause binding its assignments in order);
    /// once shared behind an `Rc` they are frozen.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    /// Innermost-first lookup along the parent chain
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.locals.get(name) {
            Some(value) => Some(value),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    pub fn session(&self) -> Option<&Rc<Session>> {
        self.session.as_ref()
    }
}
