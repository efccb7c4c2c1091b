//! The execution model
//!
//! `execute` returns `Ready(value)` or `Pending(fetches)`; the suspension
//! point is visible in the type. Execution is single-threaded, cooperative
//! and idempotent: a node never blocks, it reports the database names it is
//! still waiting for and the driver re-executes after the collaborator has
//! made progress. The session's once-written resolution cache makes the
//! re-execution cheap and deterministic.
//!
//! Pending states merge upward: a binary operator evaluates both operands
//! before combining, so fetches for independent subtrees are all requested
//! in one round trip.

use crate::ast::Node;
use crate::context::Context;
use crate::database::Resolution;
use crate::error::JelError;
use crate::operator::Operator;
use crate::value::{LambdaValue, Value};
use crate::JelResult;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeSet;
use std::rc::Rc;

/// The sorted, de-duplicated set of database names an evaluation still
/// requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    names: BTreeSet<String>,
}

impl PendingFetch {
    pub fn one(name: impl Into<String>) -> Self {
        let mut names = BTreeSet::new();
        names.insert(name.into());
        PendingFetch { names }
    }

    pub fn merge(mut self, other: PendingFetch) -> Self {
        self.names.extend(other.names);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn describe(&self) -> String {
        self.names
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The result of executing a node: a value, or a suspension carrying the
/// names still being fetched
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Ready(Value),
    Pending(PendingFetch),
}

impl Evaluation {
    pub fn ready(value: impl Into<Value>) -> Self {
        Evaluation::Ready(value.into())
    }
}

/// The invocation contract exposed to the translation collaborator: any
/// value that can run with positional and named arguments
pub trait Callable {
    fn invoke(
        &self,
        ctx: &Rc<Context>,
        args: &[Value],
        named: &[(String, Value)],
    ) -> JelResult<Evaluation>;
}

impl Callable for LambdaValue {
    /// Parameters bind named-first, then positionally; an unsupplied
    /// parameter binds null. The body runs against the captured lexical
    /// context, not the caller's.
    fn invoke(
        &self,
        _ctx: &Rc<Context>,
        args: &[Value],
        named: &[(String, Value)],
    ) -> JelResult<Evaluation> {
        let mut frame = Context::child_of(&self.context);
        for (index, param) in self.params.iter().enumerate() {
            let value = named
                .iter()
                .find(|(name, _)| name == param)
                .map(|(_, value)| value.clone())
                .or_else(|| args.get(index).cloned())
                .unwrap_or(Value::Null);
            frame.bind(param.clone(), value);
        }
        self.body.execute(&Rc::new(frame))
    }
}

/// Evaluate a slice of nodes, merging every pending fetch so independent
/// lookups are requested together
fn eval_all<'a, I>(nodes: I, ctx: &Rc<Context>) -> JelResult<Result<Vec<Value>, PendingFetch>>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut values = Vec::new();
    let mut pending: Option<PendingFetch> = None;
    for node in nodes {
        match node.execute(ctx)? {
            Evaluation::Ready(value) => values.push(value),
            Evaluation::Pending(fetch) => {
                pending = Some(match pending.take() {
                    Some(existing) => existing.merge(fetch),
                    None => fetch,
                });
            }
        }
    }
    match pending {
        Some(fetch) => Ok(Err(fetch)),
        None => Ok(Ok(values)),
    }
}

/// The right operand of `instanceof`/`derivativeof`: a bare identifier is
/// the type or category name itself, anything else must evaluate to a
/// string or a database entity carrying a `distinctName`
fn type_partner(node: &Node, ctx: &Rc<Context>) -> JelResult<Result<String, PendingFetch>> {
    if let Node::Variable(name) = node {
        return Ok(Ok(name.clone()));
    }
    match node.execute(ctx)? {
        Evaluation::Pending(fetch) => Ok(Err(fetch)),
        Evaluation::Ready(Value::String(name)) => Ok(Ok(name)),
        Evaluation::Ready(Value::Dictionary(members)) => match members.get("distinctName") {
            Some(Value::String(name)) => Ok(Ok(name.clone())),
            _ => Err(JelError::unsupported(
                "instanceof",
                "an entity without a distinctName",
            )),
        },
        Evaluation::Ready(other) => Err(JelError::unsupported(
            "instanceof",
            format!("a {} type designator", other.type_name()),
        )),
    }
}

impl Node {
    /// Execute this node against a context. Idempotent and side-effect-free
    /// apart from the session's resolution cache.
    pub fn execute(&self, ctx: &Rc<Context>) -> JelResult<Evaluation> {
        match self {
            Node::Literal(value) => Ok(Evaluation::Ready(value.clone())),

            Node::Variable(name) => match ctx.get(name) {
                Some(value) => Ok(Evaluation::Ready(value.clone())),
                None => Err(JelError::unbound(name)),
            },

            Node::Reference(name) => {
                let session = ctx
                    .session()
                    .ok_or_else(|| JelError::Engine(format!(
                        "reference '@{}' requires a database session",
                        name
                    )))?;
                match session.resolve(name)? {
                    Resolution::Ready(value) => Ok(Evaluation::Ready(value)),
                    Resolution::Pending => Ok(Evaluation::Pending(PendingFetch::one(name))),
                }
            }

            Node::Get { collection, key } => {
                let values = match eval_all([&**collection, &**key], ctx)? {
                    Ok(values) => values,
                    Err(fetch) => return Ok(Evaluation::Pending(fetch)),
                };
                let (collection, key) = (&values[0], &values[1]);
                index(collection, key)
            }

            Node::Operator { op, left, right } => match (op, right) {
                (Operator::Dot, Some(right)) => {
                    let object = match left.execute(ctx)? {
                        Evaluation::Ready(value) => value,
                        pending => return Ok(pending),
                    };
                    let Node::Variable(name) = &**right else {
                        return Err(JelError::Engine(
                            "a member name must be an identifier".to_string(),
                        ));
                    };
                    crate::dispatch::member(ctx, &object, name)
                }
                (Operator::And, Some(right)) => {
                    match left.execute(ctx)? {
                        Evaluation::Ready(value) if value.is_truthy() => right.execute(ctx),
                        other => Ok(other),
                    }
                }
                (Operator::Or, Some(right)) => {
                    match left.execute(ctx)? {
                        Evaluation::Ready(value) if !value.is_truthy() => right.execute(ctx),
                        other => Ok(other),
                    }
                }
                (Operator::InstanceOf, Some(right)) | (Operator::DerivativeOf, Some(right)) => {
                    let object = match left.execute(ctx)? {
                        Evaluation::Ready(value) => value,
                        pending => return Ok(pending),
                    };
                    let name = match type_partner(right, ctx)? {
                        Ok(name) => name,
                        Err(fetch) => return Ok(Evaluation::Pending(fetch)),
                    };
                    if *op == Operator::InstanceOf {
                        crate::dispatch::instance_of(&object, &name)
                    } else {
                        crate::dispatch::derivative_of(ctx, &object, &name)
                    }
                }
                (_, Some(right)) => {
                    let values = match eval_all([&**left, &**right], ctx)? {
                        Ok(values) => values,
                        Err(fetch) => return Ok(Evaluation::Pending(fetch)),
                    };
                    crate::dispatch::op(ctx, *op, &values[0], &values[1])
                }
                (_, None) => {
                    let operand = match left.execute(ctx)? {
                        Evaluation::Ready(value) => value,
                        pending => return Ok(pending),
                    };
                    crate::dispatch::single_op(ctx, *op, &operand)
                }
            },

            Node::Condition {
                condition,
                then,
                otherwise,
            } => match condition.execute(ctx)? {
                Evaluation::Ready(value) => {
                    if value.is_truthy() {
                        then.execute(ctx)
                    } else {
                        otherwise.execute(ctx)
                    }
                }
                pending => Ok(pending),
            },

            Node::Assignment(assignment) => assignment.expr.execute(ctx),

            Node::With { assignments, body } => {
                let mut frame = Context::child_of(ctx);
                for assignment in assignments {
                    let scope = Rc::new(frame.clone());
                    match assignment.expr.execute(&scope)? {
                        Evaluation::Ready(value) => frame.bind(assignment.name.clone(), value),
                        pending => return Ok(pending),
                    }
                }
                body.execute(&Rc::new(frame))
            }

            Node::Pattern(raw) => Ok(Evaluation::Ready(Value::Pattern(raw.clone()))),

            Node::Lambda { params, body } => Ok(Evaluation::Ready(Value::Lambda(LambdaValue {
                params: params.clone(),
                body: Rc::clone(body),
                context: Rc::clone(ctx),
            }))),

            Node::Call {
                callee,
                args,
                named,
            } => execute_call(ctx, callee, args, named),
        }
    }
}

fn index(collection: &Value, key: &Value) -> JelResult<Evaluation> {
    match (collection, key) {
        (Value::List(items), Value::Number(n)) => {
            let item = n
                .to_usize()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null);
            Ok(Evaluation::Ready(item))
        }
        (Value::Dictionary(entries), Value::String(name)) => Ok(Evaluation::Ready(
            entries.get(name).cloned().unwrap_or(Value::Null),
        )),
        _ => Err(JelError::unsupported(
            "[]",
            format!("{} and {}", collection.type_name(), key.type_name()),
        )),
    }
}

fn execute_call(
    ctx: &Rc<Context>,
    callee: &Node,
    args: &[Node],
    named: &[(String, Node)],
) -> JelResult<Evaluation> {
    // Method calls resolve the receiver first; the method name is never an
    // independently evaluated expression.
    if let Node::Operator {
        op: Operator::Dot,
        left,
        right: Some(right),
    } = callee
    {
        if let Node::Variable(method) = &**right {
            let object = match left.execute(ctx)? {
                Evaluation::Ready(value) => value,
                pending => return Ok(pending),
            };
            let arguments = match eval_all(args, ctx)? {
                Ok(values) => values,
                Err(fetch) => return Ok(Evaluation::Pending(fetch)),
            };
            return crate::dispatch::call_method(ctx, &object, method, &arguments);
        }
    }

    let arguments = match eval_all(args, ctx)? {
        Ok(values) => values,
        Err(fetch) => return Ok(Evaluation::Pending(fetch)),
    };
    let mut named_arguments = Vec::with_capacity(named.len());
    let mut pending: Option<PendingFetch> = None;
    for (name, node) in named {
        match node.execute(ctx)? {
            Evaluation::Ready(value) => named_arguments.push((name.clone(), value)),
            Evaluation::Pending(fetch) => {
                pending = Some(match pending.take() {
                    Some(existing) => existing.merge(fetch),
                    None => fetch,
                });
            }
        }
    }
    if let Some(fetch) = pending {
        return Ok(Evaluation::Pending(fetch));
    }

    // A bare identifier call is first a native constructor, then a bound
    // callable.
    if let Node::Variable(name) = callee {
        if crate::native::is_constructor(name) {
            if !named_arguments.is_empty() {
                return Err(JelError::Construction(format!(
                    "constructor {} takes no named arguments",
                    name
                )));
            }
            return Ok(Evaluation::Ready(crate::native::construct(
                name, &arguments,
            )?));
        }
    }

    let target = match callee.execute(ctx)? {
        Evaluation::Ready(value) => value,
        pending => return Ok(pending),
    };
    match target {
        Value::Lambda(lambda) => lambda.invoke(ctx, &arguments, &named_arguments),
        other => Err(JelError::unsupported(
            "()",
            format!("calling a {}", other.type_name()),
        )),
    }
}
