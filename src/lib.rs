/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// Numeric type descriptors, used to annotate `meta(...)` values with the
/// narrowest type able to hold them.
pub mod meta;

pub mod ast;
pub mod token;
pub mod util;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] lexer::Error),
    #[error(transparent)]
    Parse(#[from] parser::Error),
}

impl Error {
    pub fn position(&self) -> token::Position {
        match self {
            Error::Lex(error) => error.position(),
            Error::Parse(error) => error.pos,
        }
    }
}

/// Lexes and parses `src` as a whole program.
pub fn parse_source(src: &str) -> Result<Vec<ast::Node>, Error> {
    let tokens = lexer::lex(src)?;
    Ok(parser::parse(&tokens)?)
}
