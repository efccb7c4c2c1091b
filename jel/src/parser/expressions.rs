//! Precedence-climbing expression parsing
//!
//! `parse_expression` folds left-associatively over the binary operator
//! table; `stops` holds the tokens that terminate a sub-expression without
//! being consumed (closing brackets, `,`, `:`, `then`, `else`), so nested
//! grammars compose without backtracking. The one speculative parse is the
//! lambda parameter list: `(a, b) => ...` and a plain parenthesized
//! expression are indistinguishable until the arrow, so the stream is
//! copied and rolled back on failure.

use crate::ast::{Assignment, Node};
use crate::error::JelError;
use crate::operator::Operator;
use crate::tokenizer::{Token, TokenKind, TokenStream};
use crate::value::Value;
use crate::JelResult;
use std::rc::Rc;

fn unexpected(message: &str, token: &Token) -> JelError {
    JelError::parse(message, token.describe(), token.span)
}

fn expect(stream: &mut TokenStream, operator: Operator) -> JelResult<Token> {
    let token = stream.next();
    if token.kind == TokenKind::Operator(operator) {
        Ok(token)
    } else {
        Err(unexpected(&format!("expected '{}'", operator), &token))
    }
}

fn expect_identifier(stream: &mut TokenStream, what: &str) -> JelResult<String> {
    let token = stream.next();
    match token.kind {
        TokenKind::Identifier(name) => Ok(name),
        _ => Err(unexpected(&format!("expected {}", what), &token)),
    }
}

fn with_stops(stops: &[Operator], extra: &[Operator]) -> Vec<Operator> {
    let mut combined = stops.to_vec();
    combined.extend_from_slice(extra);
    combined
}

pub(crate) fn parse_expression(
    stream: &mut TokenStream,
    min_prec: u8,
    stops: &[Operator],
) -> JelResult<Node> {
    let mut left = parse_prefix(stream, stops)?;

    loop {
        let token = stream.peek().clone();
        match &token.kind {
            TokenKind::Eof => break,
            TokenKind::Illegal(c) => {
                return Err(JelError::Lex {
                    message: format!("illegal character '{}'", c),
                    span: token.span,
                })
            }
            TokenKind::Operator(op) if stops.contains(op) => break,

            // Postfixes bind tightest: call, index, member access.
            TokenKind::Operator(Operator::OpenParen) => {
                stream.next();
                let (args, named) = parse_arguments(stream)?;
                left = Node::Call {
                    callee: Box::new(left),
                    args,
                    named,
                };
            }
            TokenKind::Operator(Operator::OpenBracket) => {
                stream.next();
                let key = parse_expression(stream, 0, &[Operator::CloseBracket])?;
                expect(stream, Operator::CloseBracket)?;
                left = Node::Get {
                    collection: Box::new(left),
                    key: Box::new(key),
                };
            }
            TokenKind::Operator(Operator::Dot) => {
                stream.next();
                let name = expect_identifier(stream, "a member name after '.'")?;
                left = Node::member(left, name);
            }

            TokenKind::Operator(Operator::Assign) => {
                if Operator::Assign.precedence().is_some_and(|p| p < min_prec) {
                    break;
                }
                let Node::Variable(name) = left else {
                    return Err(unexpected("invalid assignment target", &token));
                };
                stream.next();
                let expr = parse_expression(stream, 0, stops)?;
                left = Node::Assignment(Assignment::new(name, expr));
            }

            TokenKind::Operator(op) => match op.precedence() {
                Some(prec) if prec >= min_prec => {
                    let op = *op;
                    stream.next();
                    let right = parse_expression(stream, prec + 1, stops)?;
                    left = Node::operator(op, left, right);
                }
                _ => break,
            },

            TokenKind::Identifier(word) => match Operator::from_infix_word(word) {
                Some(op) => {
                    let prec = op.precedence().unwrap_or(Operator::UNARY_PRECEDENCE);
                    if prec < min_prec {
                        break;
                    }
                    stream.next();
                    let right = parse_expression(stream, prec + 1, stops)?;
                    left = Node::operator(op, left, right);
                }
                None => break,
            },

            _ => break,
        }
    }

    Ok(left)
}

fn parse_prefix(stream: &mut TokenStream, stops: &[Operator]) -> JelResult<Node> {
    let token = stream.next();
    match token.kind {
        TokenKind::Number(n) => Ok(Node::Literal(Value::Number(n))),
        TokenKind::StringLiteral(s) => Ok(Node::Literal(Value::String(s))),
        TokenKind::Pattern(raw) => Ok(Node::Pattern(raw)),

        TokenKind::Identifier(word) => match word.as_str() {
            "true" => Ok(Node::Literal(Value::Boolean(true))),
            "false" => Ok(Node::Literal(Value::Boolean(false))),
            "null" => Ok(Node::Literal(Value::Null)),
            _ => {
                if let Some(op) = Operator::from_unary_word(&word) {
                    let operand =
                        parse_expression(stream, Operator::UNARY_PRECEDENCE, stops)?;
                    return Ok(Node::unary(op, operand));
                }
                if stream.peek().kind == TokenKind::Operator(Operator::FatArrow) {
                    stream.next();
                    let body = parse_expression(stream, 0, stops)?;
                    return Ok(Node::Lambda {
                        params: vec![word],
                        body: Rc::new(body),
                    });
                }
                Ok(Node::Variable(word))
            }
        },

        TokenKind::Operator(Operator::Subtract) => {
            let operand = parse_expression(stream, Operator::UNARY_PRECEDENCE, stops)?;
            // A negated number literal folds, so printed values reparse to
            // the same node.
            match operand {
                Node::Literal(Value::Number(n)) => Ok(Node::Literal(Value::Number(-n))),
                other => Ok(Node::unary(Operator::Negate, other)),
            }
        }
        TokenKind::Operator(Operator::Not) => {
            let operand = parse_expression(stream, Operator::UNARY_PRECEDENCE, stops)?;
            Ok(Node::unary(Operator::Not, operand))
        }
        TokenKind::Operator(Operator::AtSign) => {
            let name = expect_identifier(stream, "a name after '@'")?;
            Ok(Node::Reference(name))
        }
        TokenKind::Operator(Operator::If) => parse_condition(stream, stops, &token),
        TokenKind::Operator(Operator::With) => parse_with(stream, stops, &token),
        TokenKind::Operator(Operator::OpenParen) => parse_parenthesized(stream, stops),

        TokenKind::Illegal(c) => Err(JelError::Lex {
            message: format!("illegal character '{}'", c),
            span: token.span,
        }),
        TokenKind::Eof => Err(unexpected("unexpected end of input", &token)),
        _ => Err(unexpected("unexpected token", &token)),
    }
}

/// `if <cond> then <expr> else <expr>`; the condition is boundary-delimited
/// by the keywords, not table-driven
fn parse_condition(
    stream: &mut TokenStream,
    stops: &[Operator],
    keyword: &Token,
) -> JelResult<Node> {
    let wrap = |cause: JelError, keyword: &Token| {
        JelError::parse_caused_by(
            "malformed if expression",
            keyword.describe(),
            keyword.span,
            cause,
        )
    };
    let condition = parse_expression(stream, 0, &[Operator::Then, Operator::Else])
        .map_err(|e| wrap(e, keyword))?;
    expect(stream, Operator::Then)?;
    let then = parse_expression(stream, 0, &with_stops(stops, &[Operator::Else]))
        .map_err(|e| wrap(e, keyword))?;
    expect(stream, Operator::Else)?;
    let otherwise = parse_expression(stream, 0, stops).map_err(|e| wrap(e, keyword))?;
    Ok(Node::Condition {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

/// `with name = expr {, name = expr} : body`; one child scope holds all the
/// bindings, in listed order
fn parse_with(stream: &mut TokenStream, stops: &[Operator], keyword: &Token) -> JelResult<Node> {
    let mut assignments = Vec::new();
    loop {
        let name = expect_identifier(stream, "a binding name in 'with'")?;
        expect(stream, Operator::Assign)?;
        let expr = parse_expression(stream, 0, &with_stops(stops, &[Operator::Comma, Operator::Colon]))
            .map_err(|e| {
                JelError::parse_caused_by(
                    "malformed with binding",
                    keyword.describe(),
                    keyword.span,
                    e,
                )
            })?;
        assignments.push(Assignment::new(name, expr));
        let separator = stream.next();
        match separator.kind {
            TokenKind::Operator(Operator::Comma) => continue,
            TokenKind::Operator(Operator::Colon) => break,
            _ => return Err(unexpected("expected ',' or ':' in 'with'", &separator)),
        }
    }
    let body = parse_expression(stream, 0, stops)?;
    Ok(Node::With {
        assignments,
        body: Box::new(body),
    })
}

/// A parenthesized expression, unless it turns out to be a lambda parameter
/// list followed by `=>`; the lambda parse is speculative and rolls the
/// stream back on failure
fn parse_parenthesized(stream: &mut TokenStream, stops: &[Operator]) -> JelResult<Node> {
    let snapshot = stream.copy();
    if let Some(params) = try_parse_params(stream) {
        let body = parse_expression(stream, 0, stops)?;
        return Ok(Node::Lambda {
            params,
            body: Rc::new(body),
        });
    }
    stream.restore(snapshot);

    let inner = parse_expression(stream, 0, &[Operator::CloseParen])?;
    expect(stream, Operator::CloseParen)?;
    Ok(inner)
}

/// Attempt `ident {, ident} ) =>` with the opening paren already consumed.
/// Returns the parameter names only when the whole shape matches.
fn try_parse_params(stream: &mut TokenStream) -> Option<Vec<String>> {
    let mut params = Vec::new();
    if stream.peek().kind == TokenKind::Operator(Operator::CloseParen) {
        stream.next();
    } else {
        loop {
            let token = stream.next();
            let TokenKind::Identifier(name) = token.kind else {
                return None;
            };
            params.push(name);
            let separator = stream.next();
            match separator.kind {
                TokenKind::Operator(Operator::Comma) => continue,
                TokenKind::Operator(Operator::CloseParen) => break,
                _ => return None,
            }
        }
    }
    let arrow = stream.next();
    if arrow.kind == TokenKind::Operator(Operator::FatArrow) {
        Some(params)
    } else {
        None
    }
}

/// Call arguments: positional expressions and `name=expr` named arguments,
/// with the opening paren already consumed
fn parse_arguments(stream: &mut TokenStream) -> JelResult<(Vec<Node>, Vec<(String, Node)>)> {
    let mut args = Vec::new();
    let mut named = Vec::new();
    if stream.peek().kind == TokenKind::Operator(Operator::CloseParen) {
        stream.next();
        return Ok((args, named));
    }
    loop {
        // Two-token lookahead through a stream copy distinguishes a named
        // argument from an expression starting with an identifier.
        let mut probe = stream.copy();
        let first = probe.next();
        let is_named = matches!(first.kind, TokenKind::Identifier(_))
            && probe.peek().kind == TokenKind::Operator(Operator::Assign);
        if is_named {
            let name = expect_identifier(stream, "an argument name")?;
            expect(stream, Operator::Assign)?;
            let value =
                parse_expression(stream, 0, &[Operator::Comma, Operator::CloseParen])?;
            named.push((name, value));
        } else {
            let value =
                parse_expression(stream, 0, &[Operator::Comma, Operator::CloseParen])?;
            args.push(value);
        }
        let separator = stream.next();
        match separator.kind {
            TokenKind::Operator(Operator::Comma) => continue,
            TokenKind::Operator(Operator::CloseParen) => break,
            _ => return Err(unexpected("expected ',' or ')' in arguments", &separator)),
        }
    }
    Ok((args, named))
}
