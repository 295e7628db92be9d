use std::fmt;

use tracing::debug;

use crate::{
    ast::Node,
    token::{Position, Token, TokenKind},
};

/// One recursive-descent function per grammar production.
pub mod mini;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parses an EOF-terminated token sequence into its top-level nodes.
pub fn parse(tokens: &[Token]) -> Result<Vec<Node>> {
    Parser::new().parse(tokens)
}

/// The cursor capabilities mini-parsers are written against.
///
/// Mini-parsers only ever see a `Context`, so they can be driven by
/// [`Parser`] or by any other token source.
pub trait Context<'tok> {
    /// Returns the token under the cursor. Fails at the EOF token.
    fn current(&self) -> Result<&'tok Token>;

    /// Returns the token after the current one, which may be the EOF token.
    /// Fails past the end of the sequence.
    fn peek(&self) -> Result<&'tok Token>;

    /// Moves the cursor `n` tokens forward. Fails if that would move past
    /// the EOF token.
    fn advance(&mut self, n: usize) -> Result<()>;

    /// Whether the cursor sits at the EOF token.
    fn eof(&self) -> bool;

    /// Position of the token under the cursor (the EOF token included).
    fn position(&self) -> Position;

    /// Index of the token under the cursor.
    fn cursor(&self) -> usize;

    fn enter_module(&mut self, name: &'tok str);

    fn leave_module(&mut self);

    /// Innermost module being parsed, if any.
    fn module(&self) -> Option<&'tok str>;

    /// Builds an error positioned at the cursor.
    fn fail(&self, kind: ErrorKind) -> Error {
        self.fail_at(kind, self.position())
    }

    fn fail_at(&self, kind: ErrorKind, pos: Position) -> Error {
        Error {
            kind,
            pos,
            cursor: self.cursor(),
        }
    }

    /// Builds a free-form error positioned at the cursor.
    fn fail_with(&self, message: fmt::Arguments<'_>) -> Error {
        self.fail(ErrorKind::Custom(message.to_string()))
    }

    /// Checks whether the current token has the given kind and literal.
    fn at(&self, kind: TokenKind, literal: &str) -> bool {
        self.current().is_ok_and(|t| t.is(kind, literal))
    }

    /// Checks whether the current token is spelled `literal`. String tokens
    /// never match since their literal is the quoted text.
    fn at_literal(&self, literal: &str) -> bool {
        self.current()
            .is_ok_and(|t| t.kind != TokenKind::String && &*t.literal == literal)
    }

    /// Consumes and returns the current token if it has the given kind.
    fn expect(&mut self, kind: TokenKind) -> Result<&'tok Token> {
        let token = self.current()?;
        if token.kind != kind {
            return Err(self.fail(ErrorKind::Unexpected {
                expected: kind,
                actual: token.kind,
                literal: token.literal.clone(),
            }));
        }
        self.advance(1)?;
        Ok(token)
    }

    /// Consumes and returns the current token if it is spelled `literal`.
    fn expect_literal(&mut self, literal: &str) -> Result<&'tok Token> {
        let token = self.current()?;
        if !self.at_literal(literal) {
            return Err(self.fail(ErrorKind::UnexpectedLiteral {
                expected: literal.into(),
                actual: token.literal.clone(),
            }));
        }
        self.advance(1)?;
        Ok(token)
    }

    /// Consumes and returns the current token if it has any of the given
    /// kinds.
    fn expect_multiple(&mut self, kinds: &[TokenKind]) -> Result<&'tok Token> {
        let token = self.current()?;
        if !kinds.contains(&token.kind) {
            return Err(self.fail(ErrorKind::UnexpectedAny {
                expected: Box::from(kinds),
                actual: token.kind,
                literal: token.literal.clone(),
            }));
        }
        self.advance(1)?;
        Ok(token)
    }
}

/// Cursor over a token sequence. Comments are dropped when the tokens are
/// loaded; the cursor and module stack are reset on every parse.
#[derive(Default)]
pub struct Parser<'tok> {
    tokens: Vec<&'tok Token>,
    cursor: usize,
    modules: Vec<&'tok str>,
}

impl<'tok> Parser<'tok> {
    pub fn new() -> Parser<'tok> {
        Parser::default()
    }

    /// Parses top-level statements until the EOF token. The first error
    /// aborts the whole parse.
    pub fn parse(&mut self, tokens: &'tok [Token]) -> Result<Vec<Node>> {
        let nodes = self.parse_with(tokens, mini::parse_top_level)?;
        debug!(nodes = nodes.len(), "parsed program");
        Ok(nodes)
    }

    /// Loads `tokens` and runs `f` until the EOF token, collecting what it
    /// produces.
    pub fn parse_with<T>(
        &mut self,
        tokens: &'tok [Token],
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.load(tokens)?;
        let mut items = Vec::new();
        while !self.eof() {
            items.push(f(self)?);
        }
        Ok(items)
    }

    fn load(&mut self, tokens: &'tok [Token]) -> Result<()> {
        self.cursor = 0;
        self.modules.clear();
        self.tokens.clear();
        self.tokens
            .extend(tokens.iter().filter(|t| !t.kind.is_trivia()));
        match self.tokens.last() {
            None => Err(self.fail(ErrorKind::EmptyTokenStream)),
            Some(last) if !last.is_eof() => Err(self.fail_at(ErrorKind::MissingEof, last.pos)),
            Some(_) => Ok(()),
        }
    }
}

impl<'tok> Context<'tok> for Parser<'tok> {
    fn current(&self) -> Result<&'tok Token> {
        match self.tokens.get(self.cursor).copied() {
            Some(token) if !token.is_eof() => Ok(token),
            _ => Err(self.fail(ErrorKind::UnexpectedEof)),
        }
    }

    fn peek(&self) -> Result<&'tok Token> {
        self.tokens
            .get(self.cursor + 1)
            .copied()
            .ok_or_else(|| self.fail(ErrorKind::UnexpectedEof))
    }

    fn advance(&mut self, n: usize) -> Result<()> {
        if self.cursor + n >= self.tokens.len() {
            return Err(self.fail(ErrorKind::UnexpectedEof));
        }
        self.cursor += n;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.tokens.get(self.cursor).is_none_or(|t| t.is_eof())
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.cursor)
            .or(self.tokens.last())
            .map_or_else(Position::default, |t| t.pos)
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn enter_module(&mut self, name: &'tok str) {
        self.modules.push(name);
    }

    fn leave_module(&mut self) {
        self.modules.pop();
    }

    fn module(&self) -> Option<&'tok str> {
        self.modules.last().copied()
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{pos}: {kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub pos: Position,
    /// Index of the offending token, comments excluded.
    pub cursor: usize,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("empty token stream")]
    EmptyTokenStream,
    #[error("token stream is not terminated by an end of file token")]
    MissingEof,
    #[error("expected {expected}, but got {actual} {literal:?}")]
    Unexpected {
        expected: TokenKind,
        actual: TokenKind,
        literal: Box<str>,
    },
    #[error("expected one of {}, but got {actual} {literal:?}", kind_list(.expected))]
    UnexpectedAny {
        expected: Box<[TokenKind]>,
        actual: TokenKind,
        literal: Box<str>,
    },
    #[error("expected {expected:?}, but got {actual:?}")]
    UnexpectedLiteral { expected: Box<str>, actual: Box<str> },
    #[error("unexpected {actual} {literal:?} in {context}")]
    UnexpectedToken {
        context: &'static str,
        actual: TokenKind,
        literal: Box<str>,
    },
    #[error("only declarations that can be linked may be exported")]
    ExportWithoutLinkability,
    #[error("declared or linked functions can not have a body")]
    BodyOnExternal,
    #[error("function requires a body unless it is declared or linked")]
    MissingBody,
    #[error("{0} is not allowed inside meta(...)")]
    DisallowedInMeta(&'static str),
    #[error("meta(...) requires a numeric literal, but got {0}")]
    NonNumericMeta(TokenKind),
    #[error("invalid number {0:?}")]
    InvalidNumber(Box<str>),
    #[error("{0}")]
    Custom(String),
}

fn kind_list(kinds: &[TokenKind]) -> String {
    let names: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
    format!("[{}]", names.join(", "))
}
