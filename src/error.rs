//! error types of the fragment parser and of the template compiler

use std::io;

use thiserror::Error;

/// failure of the go fragment parser; never escapes the `*_or_bad` and
/// `equal_*_str` entry points, which turn it into a `Bad` sentinel instead
#[derive(PartialEq, Debug, Clone, Error)]
pub enum ParseError {
    #[error("at {at}: unexpected characters {text:?}")]
    Lex { at: usize, text: String },

    #[error("at {at}: unexpected {found}, expected {expected}")]
    Unexpected {
        at: usize,
        found: String,
        expected: &'static str,
    },

    #[error("at {at}: nesting deeper than {limit} levels")]
    TooDeep { at: usize, limit: u32 },

    #[error("fragment holds no {0}")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
#[error("at {at}: {kind}")]
pub struct CompileError {
    /// byte offset into the template
    pub at: usize,
    pub kind: CompileErrorKind,
}

#[derive(Debug, Error)]
pub enum CompileErrorKind {
    #[error("unexpected end of template")]
    UnexpectedEnd,

    #[error("unexpected {0}")]
    Unexpected(String),

    #[error("unterminated list")]
    UnterminatedList,

    #[error("unterminated literal {0}")]
    UnterminatedLiteral(String),

    #[error("unknown tag {0}")]
    UnknownTag(String),

    #[error("unknown wildcard `${0}`")]
    UnknownWildcard(String),

    #[error("named wildcards are not implemented (`${name}:{kind}`)")]
    NamedWildcard { name: String, kind: String },

    #[error("`{tag}` takes {expected} operands, got {got}")]
    Arity {
        tag: String,
        expected: &'static str,
        got: usize,
    },

    #[error("`$...` only stands among call arguments or block statements")]
    MisplacedEllipsis,

    #[error("unconsumed input after template, starting with {0} (forgot to wrap the forms into a list?)")]
    Trailing(String),

    #[error("lists nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("cannot read template: {0}")]
    Io(#[from] io::Error),
}

impl CompileError {
    pub(crate) fn new(at: usize, kind: CompileErrorKind) -> Self {
        Self { at, kind }
    }
}
