use std::{fmt, ops::Range};

use serde::Serialize;

use crate::ast::BinaryOperator;

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Box<str>,
    #[serde(flatten)]
    pub pos: Position,
    #[serde(skip)]
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<Box<str>>, pos: Position, span: Span) -> Token {
        Token {
            kind,
            literal: literal.into(),
            pos,
            span,
        }
    }

    /// The synthetic token terminating every scanned sequence.
    pub fn eof(pos: Position) -> Token {
        let span = Span::new_of_length(pos.offset, 0);
        Token::new(TokenKind::Eof, "", pos, span)
    }

    /// Byte bounds of [`Token::literal`] in the source.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is(&self, kind: TokenKind, literal: &str) -> bool {
        self.kind == kind && &*self.literal == literal
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, {}, {})",
            self.kind, self.literal, self.pos, self.span
        )
    }
}

/// Source position of the first character of a lexeme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-based.
    pub line: u32,
    /// 1-based, counted in chars.
    pub column: u32,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Position {
    pub const fn new(line: u32, column: u32, offset: usize) -> Position {
        Position {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    /// Returns `None` if the bounds are inverted or the length doesn't fit
    /// in a `u32`.
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Option<Span> {
        let len = u32::try_from(hi.checked_sub(lo)?).ok()?;
        Some(Self::new_of_length(lo, len))
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns the substring of `src` delimited by this span.
    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    TypeName,
    Separator,
    Identifier,
    Integer,
    Float,
    String,
    /// Fixed-vocabulary opcode mnemonic, such as `mov`.
    BaseInstruction,
    BoolConstant,
    BinaryOperator,
    /// `#` up to the end of the line. Produced by the lexer, dropped by the
    /// parser.
    Comment,
    /// Reserved for consumers that want to represent unrecognized input as a
    /// token. The lexer reports illegal characters as errors instead.
    Illegal,
    Eof,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Keyword => "keyword",
            TypeName => "type name",
            Separator => "separator",
            Identifier => "identifier",
            Integer => "integer",
            Float => "float",
            String => "string",
            BaseInstruction => "base instruction",
            BoolConstant => "bool constant",
            BinaryOperator => "binary operator",
            Comment => "comment",
            Illegal => "illegal",
            Eof => "end of file",
        }
    }

    pub fn is_trivia(self) -> bool {
        self == TokenKind::Comment
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const COMMENT_MARKER: char = '#';

pub static KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "export",
    "declare",
    "link",
    "consteval",
    "copy",
    "meta",
};

pub static TYPE_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "i8", "i16", "i32", "i64",
    "u8", "u16", "u32", "u64",
    "f32", "f64",
    "str",
    "bool",
    "void",
};

/// Leading letters of the sized type names (`i32`, `u8`, `f64`, ...).
pub static SIZED_TYPE_PREFIXES: phf::Set<char> = phf::phf_set! { 'i', 'u', 'f' };

pub static BASE_INSTRUCTIONS: phf::Set<&'static str> = phf::phf_set! {
    "mov",
    "add",
    "sub",
    "mul",
    "div",
    "ret",
    "write",
    "store",
};

pub static BOOL_CONSTANTS: phf::Map<&'static str, bool> = phf::phf_map! {
    "true" => true,
    "false" => false,
};

pub static SEPARATORS: phf::Set<char> = phf::phf_set! {
    ',', '(', ')', ':', ';', '[', ']', '{', '}',
};

pub static BINARY_OPERATORS: phf::Map<char, BinaryOperator> = phf::phf_map! {
    '+' => BinaryOperator::Add,
    '-' => BinaryOperator::Sub,
    '*' => BinaryOperator::Mul,
    '/' => BinaryOperator::Div,
};

/// Serializes a token as pretty JSON. A missing token yields `<nil>`.
pub fn to_json(token: Option<&Token>) -> String {
    let Some(token) = token else {
        return crate::ast::NIL.to_string();
    };
    serde_json::to_string_pretty(token).unwrap_or_else(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vocabularies_are_disjoint() {
        for word in KEYWORDS.iter() {
            assert!(!TYPE_NAMES.contains(word), "{word}");
            assert!(!BASE_INSTRUCTIONS.contains(word), "{word}");
            assert!(!BOOL_CONSTANTS.contains_key(word), "{word}");
        }
        for word in BASE_INSTRUCTIONS.iter() {
            assert!(!TYPE_NAMES.contains(word), "{word}");
        }
    }

    #[test]
    fn test_span_substr() {
        let src = "mov x, 10;";
        let span = Span::new_of_bounds(7..9).unwrap();
        assert_eq!(span.substr(src), "10");
        assert_eq!(span.to_string(), "7..9");
    }

    #[test]
    fn test_span_bounds_limits() {
        assert_eq!(Span::new_of_bounds(3..2), None);
        assert_eq!(Span::new_of_bounds(5..5).map(|s| s.len), Some(0));
        #[cfg(target_pointer_width = "64")]
        {
            let max = u32::MAX as usize;
            assert_eq!(Span::new_of_bounds(1..max + 1).map(|s| s.len), Some(u32::MAX));
            assert_eq!(Span::new_of_bounds(0..max + 1), None);
        }
    }

    #[test]
    fn test_to_json() {
        let token = Token::new(
            TokenKind::BaseInstruction,
            "mov",
            Position::new(2, 3, 10),
            Span::new_of_length(10, 3),
        );
        let expected = indoc::indoc! {r#"
            {
              "kind": "base_instruction",
              "literal": "mov",
              "line": 2,
              "column": 3,
              "offset": 10
            }"#};
        assert_eq!(to_json(Some(&token)), expected);
        assert_eq!(to_json(None), "<nil>");
    }
}
