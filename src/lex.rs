//! go source lexing

use std::fmt::{Display, Formatter, Result as FmtResult};

use logos::Logos;
use phf::{phf_map, Map};

use crate::ast::{LitKind, Op};
use crate::error::ParseError;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

pub const KEYWORDS: Map<&'static str, Keyword> = phf_map! {
    "break" => Keyword::Break,
    "case" => Keyword::Case,
    "chan" => Keyword::Chan,
    "const" => Keyword::Const,
    "continue" => Keyword::Continue,
    "default" => Keyword::Default,
    "defer" => Keyword::Defer,
    "else" => Keyword::Else,
    "fallthrough" => Keyword::Fallthrough,
    "for" => Keyword::For,
    "func" => Keyword::Func,
    "go" => Keyword::Go,
    "goto" => Keyword::Goto,
    "if" => Keyword::If,
    "import" => Keyword::Import,
    "interface" => Keyword::Interface,
    "map" => Keyword::Map,
    "package" => Keyword::Package,
    "range" => Keyword::Range,
    "return" => Keyword::Return,
    "select" => Keyword::Select,
    "struct" => Keyword::Struct,
    "switch" => Keyword::Switch,
    "type" => Keyword::Type,
    "var" => Keyword::Var,
};

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains_key(word)
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let name = KEYWORDS
            .entries()
            .find_map(|(name, kw)| (kw == self).then_some(*name))
            .unwrap_or("?");
        f.write_str(name)
    }
}

impl Display for LitKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(match self {
            LitKind::Int => "int",
            LitKind::Float => "float",
            LitKind::Imag => "imaginary",
            LitKind::Char => "char",
            LitKind::String => "string",
        })
    }
}

// raw tokens {{{
fn block_comment(lex: &mut logos::Lexer<Raw>) -> Option<bool> {
    let end = lex.remainder().find("*/")?;
    let newline = lex.remainder()[..end].contains('\n');
    lex.bump(end + 2);
    Some(newline)
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+|//[^\n]*")]
enum Raw {
    #[token("\n")]
    Newline,

    /// true when the comment spans a newline, which then acts as one
    #[token("/*", block_comment)]
    BlockComment(bool),

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Word,

    #[regex(r"[0-9][0-9_]*|0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+")]
    Int,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?")]
    Float,

    #[regex(r"[0-9][0-9_]*i")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9][0-9_]*)?i")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9][0-9_]*i")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9][0-9_]*)?i")]
    Imag,

    #[regex(r"'([^'\\\n]|\\[^\n][0-9a-fA-F]*)'")]
    Char,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    #[regex(r"`[^`]*`")]
    Str,

    #[token("+", |_| Op::Add)]
    #[token("-", |_| Op::Sub)]
    #[token("*", |_| Op::Mul)]
    #[token("/", |_| Op::Quo)]
    #[token("%", |_| Op::Rem)]
    #[token("&", |_| Op::And)]
    #[token("|", |_| Op::Or)]
    #[token("^", |_| Op::Xor)]
    #[token("<<", |_| Op::Shl)]
    #[token(">>", |_| Op::Shr)]
    #[token("&^", |_| Op::AndNot)]
    #[token("&&", |_| Op::LAnd)]
    #[token("||", |_| Op::LOr)]
    #[token("<-", |_| Op::Arrow)]
    #[token("++", |_| Op::Inc)]
    #[token("--", |_| Op::Dec)]
    #[token("==", |_| Op::Eql)]
    #[token("<", |_| Op::Lss)]
    #[token(">", |_| Op::Gtr)]
    #[token("=", |_| Op::Assign)]
    #[token("!", |_| Op::Not)]
    #[token("~", |_| Op::Tilde)]
    #[token("!=", |_| Op::Neq)]
    #[token("<=", |_| Op::Leq)]
    #[token(">=", |_| Op::Geq)]
    #[token(":=", |_| Op::Define)]
    #[token("+=", |_| Op::AddAssign)]
    #[token("-=", |_| Op::SubAssign)]
    #[token("*=", |_| Op::MulAssign)]
    #[token("/=", |_| Op::QuoAssign)]
    #[token("%=", |_| Op::RemAssign)]
    #[token("&=", |_| Op::AndAssign)]
    #[token("|=", |_| Op::OrAssign)]
    #[token("^=", |_| Op::XorAssign)]
    #[token("<<=", |_| Op::ShlAssign)]
    #[token(">>=", |_| Op::ShrAssign)]
    #[token("&^=", |_| Op::AndNotAssign)]
    Operator(Op),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
}
// }}}

// tokens {{{
#[derive(PartialEq, Debug, Clone)]
pub enum Tok {
    Ident(String),
    Lit(LitKind, String),
    Keyword(Keyword),
    Op(Op),
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    /// explicit, or inserted at a newline
    Semi,
    Colon,
    Dot,
    Ellipsis,
    End,
}

impl Tok {
    /// whether a newline right after this token terminates the statement
    fn ends_statement(&self) -> bool {
        use Keyword::*;
        match self {
            Tok::Ident(_) | Tok::Lit(..) => true,
            Tok::Keyword(Break | Continue | Fallthrough | Return) => true,
            Tok::Op(Op::Inc | Op::Dec) => true,
            Tok::RParen | Tok::RBrack | Tok::RBrace => true,
            _ => false,
        }
    }
}

impl Display for Tok {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Tok::Ident(name) => write!(f, "identifier '{name}'"),
            Tok::Lit(kind, text) => write!(f, "{kind} {text}"),
            Tok::Keyword(kw) => write!(f, "keyword '{kw}'"),
            Tok::Op(op) => write!(f, "operator '{op}'"),
            Tok::LParen => write!(f, "'('"),
            Tok::RParen => write!(f, "')'"),
            Tok::LBrack => write!(f, "'['"),
            Tok::RBrack => write!(f, "']'"),
            Tok::LBrace => write!(f, "'{{'"),
            Tok::RBrace => write!(f, "'}}'"),
            Tok::Comma => write!(f, "','"),
            Tok::Semi => write!(f, "';'"),
            Tok::Colon => write!(f, "':'"),
            Tok::Dot => write!(f, "'.'"),
            Tok::Ellipsis => write!(f, "'...'"),
            Tok::End => write!(f, "end of input"),
        }
    }
}

/// a token and the byte offset it starts at
#[derive(PartialEq, Debug, Clone)]
pub struct Token(pub usize, pub Tok);
// }}}

/// Tokenizes the whole source, inserting the semicolons Go leaves implicit.
/// The result always ends with [`Tok::End`].
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Raw::lexer(source);
    let mut r = Vec::new();
    let mut semi_pending = false;

    while let Some(raw) = lexer.next() {
        let at = lexer.span().start;
        let Ok(raw) = raw else {
            return Err(ParseError::Lex {
                at,
                text: lexer.slice().to_owned(),
            });
        };
        let text = lexer.slice();

        let tok = match raw {
            Raw::Newline | Raw::BlockComment(true) => {
                if semi_pending {
                    r.push(Token(at, Tok::Semi));
                    semi_pending = false;
                }
                continue;
            }
            Raw::BlockComment(false) => continue,

            Raw::Word => match KEYWORDS.get(text) {
                Some(&kw) => Tok::Keyword(kw),
                None => Tok::Ident(text.to_owned()),
            },
            Raw::Int => Tok::Lit(LitKind::Int, text.to_owned()),
            Raw::Float => Tok::Lit(LitKind::Float, text.to_owned()),
            Raw::Imag => Tok::Lit(LitKind::Imag, text.to_owned()),
            Raw::Char => Tok::Lit(LitKind::Char, text.to_owned()),
            Raw::Str => Tok::Lit(LitKind::String, text.to_owned()),
            Raw::Operator(op) => Tok::Op(op),

            Raw::LParen => Tok::LParen,
            Raw::RParen => Tok::RParen,
            Raw::LBrack => Tok::LBrack,
            Raw::RBrack => Tok::RBrack,
            Raw::LBrace => Tok::LBrace,
            Raw::RBrace => Tok::RBrace,
            Raw::Comma => Tok::Comma,
            Raw::Semi => Tok::Semi,
            Raw::Colon => Tok::Colon,
            Raw::Dot => Tok::Dot,
            Raw::Ellipsis => Tok::Ellipsis,
        };

        semi_pending = tok.ends_statement();
        r.push(Token(at, tok));
    }

    let end = source.len();
    if semi_pending {
        r.push(Token(end, Tok::Semi));
    }
    r.push(Token(end, Tok::End));
    Ok(r)
}

#[test]
fn test() {
    use insta::assert_snapshot;

    fn t(source: &str) -> String {
        match lex(source) {
            Ok(tokens) => tokens
                .iter()
                .map(|Token(at, tok)| format!("{at} {tok}"))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => e.to_string(),
        }
    }

    assert_snapshot!(t("x"), @r"
    0 identifier 'x'
    1 ';'
    1 end of input
    ");

    assert_snapshot!(t("func return"), @r"
    0 keyword 'func'
    5 keyword 'return'
    11 ';'
    11 end of input
    ");

    assert_snapshot!(t("f(a, b...)\n/* c */ x++ /* d\n */ y"), @r"
    0 identifier 'f'
    1 '('
    2 identifier 'a'
    3 ','
    5 identifier 'b'
    6 '...'
    9 ')'
    10 ';'
    19 identifier 'x'
    20 operator '++'
    23 ';'
    32 identifier 'y'
    33 ';'
    33 end of input
    ");

    assert_snapshot!(t(r#"1 1.0 .5e3 0x1F 2i 0.i 'a' '\377' "s" `r`"#), @r#"
    0 int 1
    2 float 1.0
    6 float .5e3
    11 int 0x1F
    16 imaginary 2i
    19 imaginary 0.i
    23 char 'a'
    27 char '\377'
    34 string "s"
    38 string `r`
    41 ';'
    41 end of input
    "#);

    assert_snapshot!(t("x := y // trailing\nz"), @r"
    0 identifier 'x'
    2 operator ':='
    5 identifier 'y'
    18 ';'
    19 identifier 'z'
    20 ';'
    20 end of input
    ");

    assert_snapshot!(t("x @ y"), @r#"at 2: unexpected characters "@""#);
    assert_snapshot!(t("/* never closed"), @r#"at 0: unexpected characters "/*""#);
}
