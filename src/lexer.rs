use tracing::{debug, trace};

use crate::{
    token::{
        Position, Span, Token, TokenKind, BASE_INSTRUCTIONS, BINARY_OPERATORS, BOOL_CONSTANTS,
        COMMENT_MARKER, KEYWORDS, SEPARATORS, SIZED_TYPE_PREFIXES, TYPE_NAMES,
    },
    util::Attempt,
};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string into a new buffer.
pub fn lex(src: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() + 1));
    lex_into(src, &mut tokens)?;
    Ok(tokens)
}

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// The buffer is left empty if lexing fails.
pub fn lex_into(src: &str, tokens: &mut Vec<Token>) -> Result<(), Error> {
    assert_eq!(tokens.len(), 0, "must pass clean tokens buffer");
    let result = Lexer::new(src).lex(tokens);
    if result.is_err() {
        tokens.clear();
    }
    result
}

/// A recognizer inspects the current character and either produces a token,
/// declines with [`Attempt::NoMatch`], or fails the whole scan.
///
/// Recognizers may advance freely before declining; the lexer rewinds to
/// the start of the lexeme before trying the next one.
type Recognizer = fn(&mut Lexer<'_>, char) -> Result<Attempt<Token>, Error>;

/// Order matters: fixed vocabularies must be tried before identifiers,
/// which accept any word.
static RECOGNIZERS: &[Recognizer] = &[
    comment,
    string,
    number,
    separator,
    binary_operator,
    keyword,
    type_name,
    base_instruction,
    bool_constant,
    identifier,
];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{pos}: illegal character {found:?}")]
    IllegalCharacter { found: char, pos: Position },
    #[error("{pos}: unterminated string literal")]
    UnterminatedString { pos: Position },
    #[error("{pos}: malformed float literal {literal:?}, expected digits after '.'")]
    MalformedFloat { literal: Box<str>, pos: Position },
    #[error("{pos}: invalid sized type {literal:?}")]
    InvalidSizedType { literal: Box<str>, pos: Position },
    #[error("{pos}: slice {start}..{end} is out of bounds for an input of {len} bytes")]
    SliceOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
        pos: Position,
    },
    #[error("{pos}: lexeme of {len} bytes is longer than the 4 GiB limit")]
    LexemeTooLong { len: usize, pos: Position },
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::IllegalCharacter { pos, .. }
            | Error::UnterminatedString { pos }
            | Error::MalformedFloat { pos, .. }
            | Error::InvalidSizedType { pos, .. }
            | Error::SliceOutOfBounds { pos, .. }
            | Error::LexemeTooLong { pos, .. } => *pos,
        }
    }
}

/// The dywoq lexer
struct Lexer<'src> {
    src: &'src str,
    /// Where the next character will be read.
    pos: Position,
    /// Start of the lexeme being scanned.
    mark: Position,
}

impl Lexer<'_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self, tokens: &mut Vec<Token>) -> Result<(), Error> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.current() else {
                break;
            };
            let token = self.scan_token(c)?;
            trace!(kind = %token.kind, literal = &*token.literal, pos = %token.pos, "token");
            tokens.push(token);
        }
        tokens.push(Token::eof(self.pos));
        debug!(tokens = tokens.len(), bytes = self.src.len(), "scanned source");
        Ok(())
    }

    /// Runs the recognizers over the current character.
    fn scan_token(&mut self, c: char) -> Result<Token, Error> {
        self.mark = self.pos;
        for recognizer in RECOGNIZERS {
            match recognizer(self, c)? {
                Attempt::Matched(token) => return Ok(token),
                Attempt::NoMatch => self.rewind(),
            }
        }
        Err(Error::IllegalCharacter {
            found: c,
            pos: self.mark,
        })
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }
}

fn comment(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    if c != COMMENT_MARKER {
        return Ok(Attempt::NoMatch);
    }
    l.advance_while(|c| c != '\n');
    l.produce(TokenKind::Comment).map(Attempt::Matched)
}

/// The produced literal is the raw text between the quotes. Escapes are
/// kept verbatim; the escape marker only protects the next character from
/// being read as a closing quote.
fn string(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    if c != '"' {
        return Ok(Attempt::NoMatch);
    }
    l.advance();
    let lo = l.pos.offset;
    loop {
        match l.current() {
            // Input exhausted or a raw line break: the string never closes.
            None | Some('\n') => return Err(Error::UnterminatedString { pos: l.mark }),
            Some('"') => break,
            Some('\\') => {
                l.advance();
                if l.advance().is_none() {
                    return Err(Error::UnterminatedString { pos: l.mark });
                }
            }
            Some(_) => {
                l.advance();
            }
        }
    }
    let hi = l.pos.offset;
    l.advance(); // closing quote
    l.produce_spanned(TokenKind::String, lo, hi).map(Attempt::Matched)
}

fn number(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    if !c.is_ascii_digit() {
        return Ok(Attempt::NoMatch);
    }
    l.advance_while(|c| c.is_ascii_digit());
    if l.current() != Some('.') {
        return l.produce(TokenKind::Integer).map(Attempt::Matched);
    }
    if !l.peek().is_some_and(|c| c.is_ascii_digit()) {
        l.advance(); // report the dot as part of the literal
        return Err(Error::MalformedFloat {
            literal: l.substr()?.into(),
            pos: l.mark,
        });
    }
    l.advance();
    l.advance_while(|c| c.is_ascii_digit());
    l.produce(TokenKind::Float).map(Attempt::Matched)
}

fn separator(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    single_char(l, c, TokenKind::Separator, SEPARATORS.contains(&c))
}

fn binary_operator(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    single_char(l, c, TokenKind::BinaryOperator, BINARY_OPERATORS.contains_key(&c))
}

fn keyword(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    vocabulary_word(l, c, TokenKind::Keyword, |w| KEYWORDS.contains(w))
}

fn base_instruction(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    vocabulary_word(l, c, TokenKind::BaseInstruction, |w| BASE_INSTRUCTIONS.contains(w))
}

fn bool_constant(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    vocabulary_word(l, c, TokenKind::BoolConstant, |w| BOOL_CONSTANTS.contains_key(w))
}

/// Besides the plain type names, words shaped like a sized type (`i`, `u`
/// or `f` followed only by digits) must name one of the known widths.
fn type_name(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    if !is_word_start(c) {
        return Ok(Attempt::NoMatch);
    }
    let word = l.word()?;
    if TYPE_NAMES.contains(word) {
        return l.produce(TokenKind::TypeName).map(Attempt::Matched);
    }
    if is_sized_type_shaped(word) {
        return Err(Error::InvalidSizedType {
            literal: word.into(),
            pos: l.mark,
        });
    }
    Ok(Attempt::NoMatch)
}

fn identifier(l: &mut Lexer<'_>, c: char) -> Result<Attempt<Token>, Error> {
    if !is_word_start(c) {
        return Ok(Attempt::NoMatch);
    }
    l.word()?;
    l.produce(TokenKind::Identifier).map(Attempt::Matched)
}

fn single_char(
    l: &mut Lexer<'_>,
    c: char,
    kind: TokenKind,
    accepted: bool,
) -> Result<Attempt<Token>, Error> {
    if !accepted {
        return Ok(Attempt::NoMatch);
    }
    debug_assert_eq!(l.current(), Some(c));
    l.advance();
    l.produce(kind).map(Attempt::Matched)
}

fn vocabulary_word(
    l: &mut Lexer<'_>,
    c: char,
    kind: TokenKind,
    contains: impl Fn(&str) -> bool,
) -> Result<Attempt<Token>, Error> {
    if !is_word_start(c) {
        return Ok(Attempt::NoMatch);
    }
    let word = l.word()?;
    if contains(word) {
        l.produce(kind).map(Attempt::Matched)
    } else {
        Ok(Attempt::NoMatch)
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_sized_type_shaped(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(prefix) = chars.next() else {
        return false;
    };
    let width = chars.as_str();
    SIZED_TYPE_PREFIXES.contains(&prefix)
        && !width.is_empty()
        && width.bytes().all(|b| b.is_ascii_digit())
}

impl<'src> Lexer<'src> {
    /// Constructs a new lexer with the default state.
    fn new(src: &'src str) -> Lexer<'src> {
        Lexer {
            src,
            pos: Position::default(),
            mark: Position::default(),
        }
    }

    /// Returns the character under the cursor.
    fn current(&self) -> Option<char> {
        self.src[self.pos.offset..].chars().next()
    }

    /// Returns the character after the current one.
    fn peek(&self) -> Option<char> {
        let mut rest = self.src[self.pos.offset..].chars();
        rest.next()?;
        rest.next()
    }

    /// Consumes the current character, tracking line and column.
    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.current().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Moves the cursor back to the start of the current lexeme.
    fn rewind(&mut self) {
        self.pos = self.mark;
    }

    /// Consumes a `[alpha_][alnum_]*` word starting at the current lexeme.
    fn word(&mut self) -> Result<&'src str, Error> {
        self.advance();
        self.advance_while(is_word_continue);
        self.substr()
    }

    /// Returns `src[start..end]`, failing instead of panicking when the
    /// bounds are inverted, past the end, or not on a char boundary.
    fn slice(&self, start: usize, end: usize) -> Result<&'src str, Error> {
        let src = self.src;
        let out_of_bounds = || Error::SliceOutOfBounds {
            start,
            end,
            len: src.len(),
            pos: self.mark,
        };
        if start > end || end > src.len() {
            return Err(out_of_bounds());
        }
        src.get(start..end).ok_or_else(out_of_bounds)
    }

    /// Returns the text of the current lexeme.
    fn substr(&self) -> Result<&'src str, Error> {
        self.slice(self.mark.offset, self.pos.offset)
    }

    /// Produces a token whose literal is the whole current lexeme.
    fn produce(&self, kind: TokenKind) -> Result<Token, Error> {
        self.produce_spanned(kind, self.mark.offset, self.pos.offset)
    }

    /// Produces a token positioned at the current lexeme whose literal is
    /// `src[lo..hi]`.
    fn produce_spanned(&self, kind: TokenKind, lo: usize, hi: usize) -> Result<Token, Error> {
        let literal = self.slice(lo, hi)?;
        let span = self.span_of(lo, hi)?;
        Ok(Token::new(kind, literal, self.mark, span))
    }

    /// Spans are limited to `u32::MAX` bytes.
    fn span_of(&self, lo: usize, hi: usize) -> Result<Span, Error> {
        Span::new_of_bounds(lo..hi).ok_or(Error::LexemeTooLong {
            len: hi.saturating_sub(lo),
            pos: self.mark,
        })
    }
}
