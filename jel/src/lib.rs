//! JEL, an embedded expression language for content-addressed knowledge
//! databases.
//!
//! The crate is the language engine: tokenizer, precedence-climbing parser,
//! AST with a cooperative suspend/resolve execution model (operands may be
//! fetched lazily from a database collaborator), the polymorphic operator
//! dispatch protocol, and the value family it dispatches over: fractions,
//! approximate numbers, fuzzy booleans, ranges, distributions, dimensioned
//! unit values and calendar types.
//!
//! ```
//! use jel::Jel;
//! use jel::value::Value;
//!
//! let engine = Jel::new();
//! let result = engine.evaluate("with x = 2, y = x + 3: y * 2").unwrap();
//! assert_eq!(result, Value::Number(10.into()));
//! ```

pub mod ast;
pub mod context;
pub mod database;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod exec;
pub mod native;
pub mod operator;
pub mod parser;
pub mod serializers;
pub mod tokenizer;
pub mod value;

#[cfg(test)]
mod tests;

pub use ast::Node;
pub use context::{Context, Session};
pub use database::{DatabaseSession, InMemoryDatabase, NoDatabase, Resolution};
pub use engine::Jel;
pub use error::JelError;
pub use exec::{Callable, Evaluation, PendingFetch};
pub use operator::Operator;
pub use parser::parse;
pub use value::Value;

/// Result type for all engine operations
pub type JelResult<T> = Result<T, JelError>;
