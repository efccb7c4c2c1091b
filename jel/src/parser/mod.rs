//! Source text parsing
//!
//! `parse` tokenizes the whole input, then runs the precedence-climbing
//! expression parser over the token stream and requires it to consume
//! everything.

mod expressions;

use crate::ast::Node;
use crate::error::JelError;
use crate::tokenizer::{tokenize, TokenStream};
use crate::JelResult;

pub fn parse(text: &str) -> JelResult<Node> {
    let tokens = tokenize(text)?;
    let mut stream = TokenStream::new(tokens);
    let node = expressions::parse_expression(&mut stream, 0, &[])?;
    if !stream.at_end() {
        let token = stream.peek();
        return Err(JelError::parse(
            "unexpected input after the expression",
            token.describe(),
            token.span,
        ));
    }
    Ok(node)
}
