//! Abstract syntax tree
//!
//! Nodes are immutable trees without back-pointers. Each node exclusively
//! owns its children; lambda bodies are `Rc` so closures can share them with
//! the values they evaluate to. Equality is structural (used by the external
//! translation collaborator to merge pattern trees, never during
//! evaluation), and `Display` prints canonical source text that parses back
//! to an equal tree.

use crate::operator::Operator;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// A location in the source text, tracked for error reporting only.
/// Nodes do not carry spans; errors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

/// A single `name = expr` binding, as it appears in a `with` clause.
///
/// `meta` carries meta-assignments attached to the binding by the
/// translation collaborator; the surface grammar never produces them.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub expr: Box<Node>,
    pub meta: Vec<Assignment>,
}

impl Assignment {
    pub fn new(name: impl Into<String>, expr: Node) -> Self {
        Assignment {
            name: name.into(),
            expr: Box::new(expr),
            meta: Vec::new(),
        }
    }
}

/// An expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A literal value embedded in the tree
    Literal(Value),
    /// A name looked up in the lexical context chain
    Variable(String),
    /// `@Name`: a named database entry, resolved at evaluation time
    Reference(String),
    /// `collection[key]`
    Get {
        collection: Box<Node>,
        key: Box<Node>,
    },
    /// A unary or binary operator application. `right` is `None` for unary
    /// operators; for `.` the right side is statically a `Variable` carrying
    /// the member name.
    Operator {
        op: Operator,
        left: Box<Node>,
        right: Option<Box<Node>>,
    },
    /// `if cond then a else b`
    Condition {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    /// A bare `name = expr` at expression level
    Assignment(Assignment),
    /// `with a = x, b = y: body`; one child scope holding all bindings
    With {
        assignments: Vec<Assignment>,
        body: Box<Node>,
    },
    /// A backtick pattern literal, carried as raw text for the external
    /// translation collaborator
    Pattern(String),
    /// `(a, b) => body` or `a => body`
    Lambda { params: Vec<String>, body: Rc<Node> },
    /// `callee(arg, name=arg)`; the callee is a constructor name, a lambda
    /// or a `.`-access (method call)
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        named: Vec<(String, Node)>,
    },
}

impl Node {
    pub fn operator(op: Operator, left: Node, right: Node) -> Node {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    pub fn unary(op: Operator, operand: Node) -> Node {
        Node::Operator {
            op,
            left: Box::new(operand),
            right: None,
        }
    }

    pub fn member(left: Node, name: impl Into<String>) -> Node {
        Node::operator(Operator::Dot, left, Node::Variable(name.into()))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => write!(f, "{}", value),
            Node::Variable(name) => write!(f, "{}", name),
            Node::Reference(name) => write!(f, "@{}", name),
            Node::Get { collection, key } => write!(f, "{}[{}]", collection, key),
            Node::Operator { op, left, right } => match (op, right) {
                (Operator::Dot, Some(right)) => write!(f, "{}.{}", left, right),
                (_, Some(right)) => write!(f, "({} {} {})", left, op, right),
                (Operator::Not, None) => write!(f, "!{}", left),
                (Operator::Negate, None) => write!(f, "-{}", left),
                (_, None) => write!(f, "{} {}", op, left),
            },
            Node::Condition {
                condition,
                then,
                otherwise,
            } => write!(f, "if {} then {} else {}", condition, then, otherwise),
            Node::Assignment(assignment) => {
                write!(f, "{} = {}", assignment.name, assignment.expr)
            }
            Node::With { assignments, body } => {
                write!(f, "with ")?;
                for (i, assignment) in assignments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", assignment.name, assignment.expr)?;
                }
                write!(f, ": {}", body)
            }
            Node::Pattern(raw) => write!(f, "`{}`", raw),
            Node::Lambda { params, body } => {
                if params.len() == 1 {
                    write!(f, "{} => {}", params[0], body)
                } else {
                    write!(f, "({}) => {}", params.join(", "), body)
                }
            }
            Node::Call {
                callee,
                args,
                named,
            } => {
                write!(f, "{}(", callee)?;
                let mut first = true;
                for arg in args {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}", arg)?;
                }
                for (name, arg) in named {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{}={}", name, arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
