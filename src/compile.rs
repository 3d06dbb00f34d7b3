//! template compilation
//!
//! A template is one s-expression: an atom (identifier, literal, `$`
//! wildcard) or a list whose head is a tag from the tables below.

use std::io::Read;
use std::mem;

use phf::{phf_map, Map};
use tracing::trace;

use crate::ast::{LitKind, Op};
use crate::error::{CompileError, CompileErrorKind};
use crate::pattern::{Form, Pattern, Tag};
use crate::scan::{Scanner, Token, TokenKind};

type Result<T> = std::result::Result<T, CompileError>;

// tag tables {{{
pub const OP_TAGS: Map<&'static str, Tag> = phf_map! {
    "+" => Tag::Op(Op::Add),
    "-" => Tag::Op(Op::Sub),
    "*" => Tag::Op(Op::Mul),
    "/" => Tag::Op(Op::Quo),
    "%" => Tag::Op(Op::Rem),
    "&" => Tag::Op(Op::And),
    "|" => Tag::Op(Op::Or),
    "^" => Tag::Op(Op::Xor),
    "<<" => Tag::Op(Op::Shl),
    ">>" => Tag::Op(Op::Shr),
    "&^" => Tag::Op(Op::AndNot),
    "&&" => Tag::Op(Op::LAnd),
    "||" => Tag::Op(Op::LOr),
    "<-" => Tag::Op(Op::Arrow),
    "++" => Tag::Op(Op::Inc),
    "--" => Tag::Op(Op::Dec),
    "==" => Tag::Op(Op::Eql),
    "<" => Tag::Op(Op::Lss),
    ">" => Tag::Op(Op::Gtr),
    "=" => Tag::Op(Op::Assign),
    "!" => Tag::Op(Op::Not),
    "!=" => Tag::Op(Op::Neq),
    "<=" => Tag::Op(Op::Leq),
    ">=" => Tag::Op(Op::Geq),
    "." => Tag::Form(Form::Member),
};

pub const KEYWORD_TAGS: Map<&'static str, Tag> = phf_map! {
    "call" => Tag::Form(Form::Call),
    "callstmt" => Tag::Form(Form::CallStmt),
    "block" => Tag::Form(Form::Block),
    "deref" => Tag::Form(Form::Deref),
    "array_type" => Tag::Form(Form::ArrayType),
    "slice_type" => Tag::Form(Form::SliceType),
};

pub const WILDCARDS: Map<&'static str, Tag> = phf_map! {
    "id" => Tag::AnyIdent,
    "int" => Tag::AnyLit(LitKind::Int),
    "float" => Tag::AnyLit(LitKind::Float),
    "imag" => Tag::AnyLit(LitKind::Imag),
    "char" => Tag::AnyLit(LitKind::Char),
    "str" => Tag::AnyLit(LitKind::String),
};

/// operand count bounds of a list tag, and their wording for errors
fn arity(tag: Tag) -> (usize, usize, &'static str) {
    use Op::*;
    match tag {
        Tag::Op(Add | Sub | Xor | And | Arrow) => (1, 2, "1 or 2"),
        Tag::Op(Not | Inc | Dec) => (1, 1, "1"),
        Tag::Op(_) => (2, 2, "2"),
        Tag::Form(Form::Deref | Form::SliceType) => (1, 1, "1"),
        Tag::Form(Form::Member | Form::ArrayType) => (2, 2, "2"),
        Tag::Form(Form::Call | Form::CallStmt) => (1, usize::MAX, "at least 1"),
        _ => (0, usize::MAX, "any number of"),
    }
}

/// deepest list nesting a template may have
const MAX_DEPTH: usize = 100;

/// the lists whose operands are sibling sequences, where `$...` may appear
fn takes_sequence(tag: Tag) -> bool {
    matches!(tag, Tag::Form(Form::Call | Form::CallStmt | Form::Block))
}
// }}}

/// Turns templates into [`Pattern`]s.
///
/// The token buffer and the read buffer are kept between calls, so one
/// compiler should be reused for many templates; it is not meant to be
/// shared between threads while compiling.
#[derive(Default)]
pub struct Compiler {
    tokens: Vec<Token>,
    at: usize,
    depth: usize,
    text: String,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&mut self, template: &str) -> Result<Pattern> {
        self.tokens.clear();
        self.at = 0;
        self.depth = 0;
        let mut scanner = Scanner::new(template);
        loop {
            let tok = scanner.next().unwrap_or(Token(template.len(), TokenKind::End));
            let end = TokenKind::End == tok.1;
            self.tokens.push(tok);
            if end {
                break;
            }
        }

        let mut pattern = Pattern::default();
        let root = self.form(&mut pattern)?;
        if Tag::Ellipsis == pattern.tag(root) {
            return Err(CompileError::new(0, CompileErrorKind::MisplacedEllipsis));
        }

        let Token(at, tok) = self.next();
        if TokenKind::End != tok {
            return Err(CompileError::new(at, CompileErrorKind::Trailing(tok.to_string())));
        }

        pattern.set_root(root);
        trace!(nodes = pattern.len(), template, "compiled template");
        Ok(pattern)
    }

    /// Reads the whole template from `reader` then compiles it.
    pub fn compile_reader(&mut self, mut reader: impl Read) -> Result<Pattern> {
        let mut text = mem::take(&mut self.text);
        text.clear();
        let r = match reader.read_to_string(&mut text) {
            Ok(_) => self.compile(&text),
            Err(e) => Err(CompileError::new(0, e.into())),
        };
        self.text = text;
        r
    }

    fn next(&mut self) -> Token {
        let tok = self.tokens[self.at].clone();
        if self.at + 1 < self.tokens.len() {
            self.at += 1;
        }
        tok
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.at].1
    }

    fn form(&mut self, pattern: &mut Pattern) -> Result<usize> {
        let Token(at, tok) = self.next();
        match tok {
            TokenKind::Open => self.list(at, pattern),
            TokenKind::Word(word) => self.word(at, word, pattern),
            TokenKind::Lit(kind, text) => Ok(pattern.push_leaf(Tag::Lit(kind), Some(text))),

            TokenKind::Unterminated(text) => {
                Err(CompileError::new(at, CompileErrorKind::UnterminatedLiteral(text)))
            }
            TokenKind::End => Err(CompileError::new(at, CompileErrorKind::UnexpectedEnd)),
            tok => Err(CompileError::new(at, CompileErrorKind::Unexpected(tok.to_string()))),
        }
    }

    fn word(&mut self, at: usize, word: String, pattern: &mut Pattern) -> Result<usize> {
        let Some(name) = word.strip_prefix('$') else {
            return Ok(pattern.push_leaf(Tag::Ident, Some(word)));
        };
        if "..." == name {
            return Ok(pattern.push_leaf(Tag::Ellipsis, None));
        }

        if let TokenKind::Colon = self.peek() {
            self.next();
            let kind = match self.next() {
                Token(_, TokenKind::Word(kind)) => kind,
                Token(at, TokenKind::End) => {
                    return Err(CompileError::new(at, CompileErrorKind::UnexpectedEnd))
                }
                Token(at, tok) => {
                    return Err(CompileError::new(at, CompileErrorKind::Unexpected(tok.to_string())))
                }
            };
            if !name.is_empty() {
                return Err(CompileError::new(
                    at,
                    CompileErrorKind::NamedWildcard {
                        name: name.to_string(),
                        kind,
                    },
                ));
            }
            // `$:kind` is the unnamed `$kind`
            return self.wildcard(at, &kind, pattern);
        }

        self.wildcard(at, name, pattern)
    }

    fn wildcard(&self, at: usize, kind: &str, pattern: &mut Pattern) -> Result<usize> {
        match WILDCARDS.get(kind) {
            Some(&tag) => Ok(pattern.push_leaf(tag, None)),
            None => Err(CompileError::new(
                at,
                CompileErrorKind::UnknownWildcard(kind.to_string()),
            )),
        }
    }

    fn list(&mut self, open: usize, pattern: &mut Pattern) -> Result<usize> {
        if MAX_DEPTH <= self.depth {
            return Err(CompileError::new(open, CompileErrorKind::TooDeep(MAX_DEPTH)));
        }
        self.depth += 1;
        let r = self.list_operands(open, pattern);
        self.depth -= 1;
        r
    }

    fn list_operands(&mut self, open: usize, pattern: &mut Pattern) -> Result<usize> {
        let Token(at, head) = self.next();
        let (tag, spelling) = match head {
            TokenKind::Operator(op) => match OP_TAGS.get(op.as_str()) {
                Some(&tag) => (tag, op),
                None => return Err(CompileError::new(at, CompileErrorKind::UnknownTag(op))),
            },
            TokenKind::Word(word) => match KEYWORD_TAGS.get(word.as_str()) {
                Some(&tag) => (tag, word),
                None => return Err(CompileError::new(at, CompileErrorKind::UnknownTag(word))),
            },
            TokenKind::End => {
                return Err(CompileError::new(open, CompileErrorKind::UnterminatedList))
            }
            tok => {
                return Err(CompileError::new(at, CompileErrorKind::Unexpected(tok.to_string())))
            }
        };

        let mut subs = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Close => {
                    self.next();
                    break;
                }
                TokenKind::End => {
                    return Err(CompileError::new(open, CompileErrorKind::UnterminatedList))
                }
                _ => {}
            }
            let sub_at = self.tokens[self.at].0;
            let sub = self.form(pattern)?;
            let callee = subs.is_empty() && matches!(tag, Tag::Form(Form::Call | Form::CallStmt));
            if Tag::Ellipsis == pattern.tag(sub) && (callee || !takes_sequence(tag)) {
                return Err(CompileError::new(sub_at, CompileErrorKind::MisplacedEllipsis));
            }
            subs.push(sub);
        }

        let (min, max, expected) = arity(tag);
        if subs.len() < min || max < subs.len() {
            return Err(CompileError::new(
                open,
                CompileErrorKind::Arity {
                    tag: spelling,
                    expected,
                    got: subs.len(),
                },
            ));
        }

        Ok(pattern.push_list(tag, &subs))
    }
}

/// Compiles a single template with a throwaway [`Compiler`].
pub fn compile(template: &str) -> Result<Pattern> {
    Compiler::new().compile(template)
}
