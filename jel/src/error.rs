use crate::ast::Span;
use std::fmt;

/// Detailed parse failure information with source location
#[derive(Debug, Clone)]
pub struct ParseDetails {
    pub message: String,
    pub token: String,
    pub span: Span,
    pub cause: Option<Box<JelError>>,
}

/// How a name lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameErrorKind {
    /// The name is not bound anywhere (variable, member or method)
    Unknown,
    /// The receiving type exists and is known, but does not declare this member
    UndeclaredMember,
    /// The receiver was null, so no member can be resolved
    NullAccess,
}

/// Error types for the JEL engine
#[derive(Debug, Clone)]
pub enum JelError {
    /// Illegal character or token; always fatal to the parse
    Lex { message: String, span: Span },

    /// Unexpected or malformed input, carrying the offending token and an
    /// optional underlying cause
    Parse(Box<ParseDetails>),

    /// A variable or member could not be resolved
    UnboundName {
        name: String,
        kind: NameErrorKind,
    },

    /// Operator not implemented for a runtime type pairing, or a null
    /// operand used outside (in)equality
    UnsupportedOperator { operator: String, operands: String },

    /// Unit conversion tiers exhausted, or a conversion rule in the
    /// database is malformed
    Conversion(String),

    /// Invalid value construction (zero denominator, bad date fields, ...)
    Construction(String),

    /// Engine/driver error without a more specific kind
    Engine(String),
}

impl JelError {
    /// Create a parse error with the offending token and its span
    pub fn parse(message: impl Into<String>, token: impl Into<String>, span: Span) -> Self {
        Self::Parse(Box::new(ParseDetails {
            message: message.into(),
            token: token.into(),
            span,
            cause: None,
        }))
    }

    /// Create a parse error chained onto an underlying cause
    pub fn parse_caused_by(
        message: impl Into<String>,
        token: impl Into<String>,
        span: Span,
        cause: JelError,
    ) -> Self {
        Self::Parse(Box::new(ParseDetails {
            message: message.into(),
            token: token.into(),
            span,
            cause: Some(Box::new(cause)),
        }))
    }

    /// Create an unbound-variable error
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundName {
            name: name.into(),
            kind: NameErrorKind::Unknown,
        }
    }

    /// Create an undeclared-member error for a known type
    pub fn undeclared_member(type_name: &str, member: &str) -> Self {
        Self::UnboundName {
            name: format!("{}.{}", type_name, member),
            kind: NameErrorKind::UndeclaredMember,
        }
    }

    /// Create an unsupported-operator error for a type pairing
    pub fn unsupported(operator: impl fmt::Display, operands: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            operands: operands.into(),
        }
    }
}

impl fmt::Display for JelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JelError::Lex { message, span } => {
                write!(f, "Lex error: {} at {}:{}", message, span.line, span.col)
            }
            JelError::Parse(details) => {
                write!(
                    f,
                    "Parse error: {} (at token '{}', {}:{})",
                    details.message, details.token, details.span.line, details.span.col
                )?;
                if let Some(cause) = &details.cause {
                    write!(f, "; caused by: {}", cause)?;
                }
                Ok(())
            }
            JelError::UnboundName { name, kind } => match kind {
                NameErrorKind::Unknown => write!(f, "Unbound name: '{}' is not defined", name),
                NameErrorKind::UndeclaredMember => {
                    write!(f, "Unbound name: '{}' is not declared on this type", name)
                }
                NameErrorKind::NullAccess => {
                    write!(f, "Unbound name: cannot access '{}' on null", name)
                }
            },
            JelError::UnsupportedOperator { operator, operands } => {
                write!(
                    f,
                    "Unsupported operator: '{}' is not defined for {}",
                    operator, operands
                )
            }
            JelError::Conversion(msg) => write!(f, "Conversion error: {}", msg),
            JelError::Construction(msg) => write!(f, "Construction error: {}", msg),
            JelError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for JelError {}
