//! Source text tokenizer
//!
//! Turns JEL source into a stream of tokens. The scanner is total and
//! terminating: anything it does not recognize becomes an `Illegal` token,
//! which the parser raises as a lex error instead of looping.
//!
//! The resulting [`TokenStream`] supports `peek`/`next`/`last`/`copy`, so the
//! parser can speculate (lambda parameter lists) and roll back.

use crate::ast::Span;
use crate::error::JelError;
use crate::operator::Operator;
use crate::JelResult;
use rust_decimal::Decimal;
use std::rc::Rc;
use std::str::FromStr;

/// What a token is, together with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Decimal),
    Operator(Operator),
    Identifier(String),
    Pattern(String),
    StringLiteral(String),
    Illegal(char),
    Eof,
}

/// A single token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Source-shaped rendering, used in parse error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Operator(op) => op.to_string(),
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Pattern(raw) => format!("`{}`", raw),
            TokenKind::StringLiteral(s) => format!("\"{}\"", s),
            TokenKind::Illegal(c) => c.to_string(),
            TokenKind::Eof => "<end of input>".to_string(),
        }
    }
}

/// Multi-character operators, longest first so matching is greedy
/// (`>==` before `>=` before `>`). `>>=`/`<<=` are accepted spellings of
/// the strict comparisons and normalize to the same operators as `>==`/`<==`.
const SYMBOLS: &[(&str, Operator)] = &[
    (">==", Operator::StrictGreaterEqual),
    ("<==", Operator::StrictLessEqual),
    (">>=", Operator::StrictGreaterEqual),
    ("<<=", Operator::StrictLessEqual),
    ("===", Operator::StrictEqual),
    ("!==", Operator::StrictNotEqual),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    (">=", Operator::GreaterEqual),
    ("<=", Operator::LessEqual),
    (">>", Operator::StrictGreater),
    ("<<", Operator::StrictLess),
    ("&&", Operator::And),
    ("||", Operator::Or),
    ("=>", Operator::FatArrow),
    ("=", Operator::Assign),
    ("!", Operator::Not),
    (">", Operator::Greater),
    ("<", Operator::Less),
    ("+", Operator::Add),
    ("-", Operator::Subtract),
    ("*", Operator::Multiply),
    ("/", Operator::Divide),
    ("%", Operator::Modulo),
    (".", Operator::Dot),
    ("(", Operator::OpenParen),
    (")", Operator::CloseParen),
    ("[", Operator::OpenBracket),
    ("]", Operator::CloseBracket),
    (",", Operator::Comma),
    (":", Operator::Colon),
    ("@", Operator::AtSign),
];

struct Scanner {
    input: Vec<char>,
    position: usize,
    line: usize,
    col: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.position += 1;
    }

    fn here(&self) -> (usize, usize, usize) {
        (self.position, self.line, self.col)
    }

    fn span_from(&self, start: (usize, usize, usize)) -> Span {
        Span {
            start: start.0,
            end: self.position,
            line: start.1,
            col: start.2,
        }
    }

    /// Does the remaining input start with this exact symbol?
    fn matches(&self, symbol: &str) -> bool {
        symbol
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn skip_whitespace_and_comments(&mut self) -> JelResult<()> {
        loop {
            match self.current() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(ch) = self.current() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek(1) == Some('*') => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match self.current() {
                            Some('*') if self.peek(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                            None => {
                                return Err(JelError::Lex {
                                    message: "unterminated block comment".to_string(),
                                    span: self.span_from(start),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_number(&mut self) -> JelResult<TokenKind> {
        let start = self.here();
        let mut text = String::new();
        let mut scientific = false;

        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                text.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek(1)
                    .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                scientific = true;
                text.push(ch);
                self.advance();
                if let Some(sign) = self.current() {
                    if sign == '+' || sign == '-' {
                        text.push(sign);
                        self.advance();
                    }
                }
            } else {
                break;
            }
        }

        let parsed = if scientific {
            Decimal::from_scientific(&text)
        } else {
            Decimal::from_str(&text)
        };
        match parsed {
            Ok(value) => Ok(TokenKind::Number(value)),
            Err(_) => Err(JelError::Lex {
                message: format!("invalid number literal '{}'", text),
                span: self.span_from(start),
            }),
        }
    }

    fn read_identifier(&mut self) -> TokenKind {
        let mut name = String::new();
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        match Operator::from_reserved_word(&name) {
            Some(op) => TokenKind::Operator(op),
            None => TokenKind::Identifier(name),
        }
    }

    /// Read a quoted string. `\n` and `\t` are the escape table; any other
    /// escaped character passes through literally.
    fn read_string(&mut self, quote: char) -> JelResult<TokenKind> {
        let start = self.here();
        self.advance();
        let mut text = String::new();
        loop {
            match self.current() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral(text));
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => text.push(other),
                        None => {
                            return Err(JelError::Lex {
                                message: "unterminated string literal".to_string(),
                                span: self.span_from(start),
                            })
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
                None => {
                    return Err(JelError::Lex {
                        message: "unterminated string literal".to_string(),
                        span: self.span_from(start),
                    })
                }
            }
        }
    }

    fn read_pattern(&mut self) -> JelResult<TokenKind> {
        let start = self.here();
        self.advance();
        let mut raw = String::new();
        loop {
            match self.current() {
                Some('`') => {
                    self.advance();
                    return Ok(TokenKind::Pattern(raw));
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
                None => {
                    return Err(JelError::Lex {
                        message: "unterminated pattern literal".to_string(),
                        span: self.span_from(start),
                    })
                }
            }
        }
    }

    fn next_token(&mut self) -> JelResult<Token> {
        self.skip_whitespace_and_comments()?;
        let start = self.here();

        let kind = match self.current() {
            None => TokenKind::Eof,
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.read_identifier(),
            Some('"') => self.read_string('"')?,
            Some('\'') => self.read_string('\'')?,
            Some('`') => self.read_pattern()?,
            Some(ch) => {
                let mut matched = None;
                for (symbol, op) in SYMBOLS {
                    if self.matches(symbol) {
                        for _ in 0..symbol.chars().count() {
                            self.advance();
                        }
                        matched = Some(TokenKind::Operator(*op));
                        break;
                    }
                }
                match matched {
                    Some(kind) => kind,
                    None => {
                        self.advance();
                        TokenKind::Illegal(ch)
                    }
                }
            }
        };

        Ok(Token {
            kind,
            span: self.span_from(start),
        })
    }
}

/// Tokenize a complete source text. Terminates on any input; unrecognized
/// characters become `Illegal` tokens rather than failing here, so that the
/// parser reports them with full context.
pub fn tokenize(text: &str) -> JelResult<Vec<Token>> {
    let mut scanner = Scanner::new(text);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// A reusable cursor over a token sequence.
///
/// `copy` is cheap (the token buffer is shared), which is what makes the
/// parser's speculative lambda-parameter parse affordable.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Rc<[Token]>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens: tokens.into(),
            position: 0,
        }
    }

    /// The next token without consuming it
    pub fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    /// Consume and return the next token
    pub fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// The most recently consumed token, if any
    pub fn last(&self) -> Option<&Token> {
        if self.position == 0 {
            None
        } else {
            self.tokens.get(self.position - 1)
        }
    }

    /// A snapshot of the stream for speculative parsing
    pub fn copy(&self) -> TokenStream {
        self.clone()
    }

    /// Roll back to a previously taken snapshot
    pub fn restore(&mut self, snapshot: TokenStream) {
        *self = snapshot;
    }

    /// True once every real token has been consumed
    pub fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}
