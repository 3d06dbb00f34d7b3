//! template scanning

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::iter::{self, Peekable};
use std::str::CharIndices;

use crate::ast::LitKind;

#[derive(PartialEq, Debug, Clone)]
pub enum TokenKind {
    Unknown(String),
    Open,
    Close,
    /// identifiers, tag keywords and `$` wildcards alike
    Word(String),
    /// verbatim source text
    Lit(LitKind, String),
    /// a char or string literal missing its closing quote
    Unterminated(String),
    Operator(String),
    Colon,
    End,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            TokenKind::Unknown(tok) => write!(f, "token '{tok}'"),
            TokenKind::Open => write!(f, "open '('"),
            TokenKind::Close => write!(f, "close ')'"),
            TokenKind::Word(w) => write!(f, "word '{w}'"),
            TokenKind::Lit(kind, text) => write!(f, "{kind} {text}"),
            TokenKind::Unterminated(text) => write!(f, "unterminated literal {text}"),
            TokenKind::Operator(op) => write!(f, "operator '{op}'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::End => write!(f, "end of template"),
        }
    }
}

/// a token and the byte offset it starts at
#[derive(PartialEq, Debug, Clone)]
pub struct Token(pub usize, pub TokenKind);

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || '_' == c || '$' == c
}

fn is_word_continue(c: char) -> bool {
    is_word_start(c) || c.is_ascii_digit() || '.' == c
}

fn is_operator(c: char) -> bool {
    "+-*/%&|^<>=!.~".contains(c)
}

/// note: this is an infinite iterator (`next()` is never `None`)
pub struct Scanner<'a> {
    source: &'a str,
    stream: Peekable<CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            stream: source.char_indices().peekable(),
        }
    }

    /// byte offset of the next unread char
    fn offset(&mut self) -> usize {
        self.stream.peek().map_or(self.source.len(), |c| c.0)
    }

    fn eat_while(&mut self, f: impl Fn(char) -> bool) {
        while self.stream.next_if(|c| f(c.1)).is_some() {}
    }

    fn eat(&mut self, f: impl Fn(char) -> bool) -> bool {
        self.stream.next_if(|c| f(c.1)).is_some()
    }

    fn number(&mut self, first: char) -> LitKind {
        let mut kind = LitKind::Int;

        let radix = match (first, self.stream.peek().map(|c| c.1)) {
            ('0', Some('x' | 'X')) => 16,
            ('0', Some('b' | 'B')) => 2,
            ('0', Some('o' | 'O')) => 8,
            _ => 10,
        };

        if 10 != radix {
            self.stream.next();
            self.eat_while(|c| c.is_digit(radix) || '_' == c);
        } else {
            if '.' == first {
                kind = LitKind::Float;
            }
            self.eat_while(|c| c.is_ascii_digit() || '_' == c);
            if LitKind::Int == kind && self.eat(|c| '.' == c) {
                kind = LitKind::Float;
                self.eat_while(|c| c.is_ascii_digit() || '_' == c);
            }
            if self.eat(|c| 'e' == c || 'E' == c) {
                kind = LitKind::Float;
                self.eat(|c| '+' == c || '-' == c);
                self.eat_while(|c| c.is_ascii_digit() || '_' == c);
            }
        }

        if self.eat(|c| 'i' == c) {
            kind = LitKind::Imag;
        }
        kind
    }

    /// false when the input ends (or the line, for interpreted literals)
    /// before the closing quote
    fn quoted(&mut self, quote: char) -> bool {
        let raw = '`' == quote;
        while let Some((_, c)) = self.stream.next() {
            match c {
                c if c == quote => return true,
                '\\' if !raw => {
                    if self.stream.next_if(|c| '\n' != c.1).is_none() {
                        return false;
                    }
                }
                '\n' if !raw => return false,
                _ => {}
            }
        }
        false
    }

    /// skips a comment whose leading `/` was consumed; false when the `/`
    /// did not open one
    fn comment(&mut self) -> bool {
        match self.stream.peek().map(|c| c.1) {
            Some('/') => {
                self.stream.find(|c| '\n' == c.1);
                true
            }
            Some('*') => {
                self.stream.next();
                let mut star = false;
                for (_, c) in self.stream.by_ref() {
                    if star && '/' == c {
                        break;
                    }
                    star = '*' == c;
                }
                true
            }
            _ => false,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        use TokenKind::*;

        let Some((at, c)) = self.stream.find(|c| !c.1.is_whitespace()) else {
            return Some(Token(self.source.len(), End));
        };

        let tok = match c {
            '(' => Open,
            ')' => Close,
            ':' => Colon,

            '/' if self.comment() => return self.next(),

            c if is_word_start(c) => {
                self.eat_while(is_word_continue);
                Word(self.source[at..self.offset()].to_string())
            }

            c if c.is_ascii_digit()
                || ('.' == c && self.stream.peek().is_some_and(|c| c.1.is_ascii_digit())) =>
            {
                let kind = self.number(c);
                Lit(kind, self.source[at..self.offset()].to_string())
            }

            '\'' | '"' | '`' => {
                let closed = self.quoted(c);
                let text = self.source[at..self.offset()].to_string();
                if closed {
                    Lit(if '\'' == c { LitKind::Char } else { LitKind::String }, text)
                } else {
                    Unterminated(text.trim_end().to_string())
                }
            }

            c if is_operator(c) => {
                self.eat_while(is_operator);
                Operator(self.source[at..self.offset()].to_string())
            }

            c => Unknown(iter::once(c).collect()),
        };

        Some(Token(at, tok))
    }
}

#[test]
fn test() {
    use insta::assert_snapshot;

    fn t(template: &str) -> String {
        Scanner::new(template)
            .take_while(|tok| TokenKind::End != tok.1)
            .map(|Token(at, tok)| format!("{at} {tok}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    assert_snapshot!(t("(call f $... x)"), @r"
    0 open '('
    1 word 'call'
    6 word 'f'
    8 word '$...'
    13 word 'x'
    14 close ')'
    ");

    assert_snapshot!(t("(&^ 0x1F 1.5e3 2i .5) // trailing\n(<- ch) /* block */ $a:int"), @r"
    0 open '('
    1 operator '&^'
    4 int 0x1F
    9 float 1.5e3
    15 imaginary 2i
    18 float .5
    20 close ')'
    34 open '('
    35 operator '<-'
    38 word 'ch'
    40 close ')'
    54 word '$a'
    56 ':'
    57 word 'int'
    ");

    assert_snapshot!(t(r#"'\'' "a\"b" `raw` "open"#), @r#"
    0 char '\''
    5 string "a\"b"
    12 string `raw`
    18 unterminated literal "open
    "#);

    assert_snapshot!(t("(. x y) [@]"), @r"
    0 open '('
    1 operator '.'
    3 word 'x'
    5 word 'y'
    6 close ')'
    8 token '['
    9 token '@'
    10 token ']'
    ");

    assert_eq!(
        Some(Token(3, TokenKind::End)),
        Scanner::new("   ").next(),
    );
}
