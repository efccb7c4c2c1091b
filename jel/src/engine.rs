//! The engine facade
//!
//! `Jel` owns the parse-execute-drive cycle: parse source into an AST,
//! execute it, and on a pending result ask the database collaborator to
//! make progress before re-executing. A collaborator that reports no
//! progress while fetches are outstanding stalls the evaluation, which is
//! an error rather than a hang.

use crate::ast::Node;
use crate::context::{Context, Session};
use crate::database::DatabaseSession;
use crate::error::JelError;
use crate::exec::Evaluation;
use crate::value::Value;
use crate::JelResult;
use std::rc::Rc;

// Re-execution after each advance() round trip; a cycle count past this
// means the collaborator keeps reporting progress without ever resolving
// the requested names.
const MAX_DRIVE_CYCLES: usize = 10_000;

pub struct Jel {
    context: Rc<Context>,
    session: Option<Rc<Session>>,
}

impl Default for Jel {
    fn default() -> Self {
        Self::new()
    }
}

impl Jel {
    /// An engine without a database collaborator; references and unit
    /// conversions will fail, everything else works
    pub fn new() -> Self {
        Jel {
            context: Rc::new(Context::new()),
            session: None,
        }
    }

    /// An engine bound to a database collaborator for the lifetime of the
    /// session
    pub fn with_database(database: Rc<dyn DatabaseSession>) -> Self {
        let session = Rc::new(Session::new(database));
        Jel {
            context: Rc::new(Context::with_session(Rc::clone(&session))),
            session: Some(session),
        }
    }

    /// A child context of the engine root, for callers that pre-bind names
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    pub fn parse(&self, text: &str) -> JelResult<Node> {
        crate::parser::parse(text)
    }

    /// Parse and evaluate a complete expression
    pub fn evaluate(&self, text: &str) -> JelResult<Value> {
        let node = self.parse(text)?;
        self.run(&node)
    }

    /// Drive a parsed expression to completion: execute, and while the
    /// result is pending let the collaborator make progress and re-execute
    pub fn run(&self, node: &Node) -> JelResult<Value> {
        self.run_in(node, &self.context)
    }

    /// As `run`, against a caller-supplied context (which must descend from
    /// this engine's root to share its session)
    pub fn run_in(&self, node: &Node, ctx: &Rc<Context>) -> JelResult<Value> {
        for _ in 0..MAX_DRIVE_CYCLES {
            match node.execute(ctx)? {
                Evaluation::Ready(value) => return Ok(value),
                Evaluation::Pending(fetch) => {
                    let Some(session) = &self.session else {
                        return Err(JelError::Engine(format!(
                            "evaluation requires a database session for: {}",
                            fetch.describe()
                        )));
                    };
                    if !session.advance()? {
                        return Err(JelError::Engine(format!(
                            "evaluation stalled waiting for: {}",
                            fetch.describe()
                        )));
                    }
                }
            }
        }
        Err(JelError::Engine(
            "evaluation did not settle; the database session keeps reporting progress".to_string(),
        ))
    }
}
