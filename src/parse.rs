//! recursive descent parser for go source fragments
//!
//! Covers the expression, statement and declaration grammar of Go minus type
//! parameters. Statement and declaration fragments are parsed inside a small
//! file scaffold, and error offsets are reported relative to the fragment.

use std::mem;

use tracing::debug;

use crate::ast::*;
use crate::error::ParseError;
use crate::lex::{lex, Keyword, Tok, Token};

type Result<T> = std::result::Result<T, ParseError>;

const STMT_SCAFFOLD: &str = "package main;func main() {";
const DECL_SCAFFOLD: &str = "package main;";

/// deepest tree a fragment may produce; chains of binary operators or of
/// selectors, calls and indexing count one level per link
const MAX_NEST_LEV: u32 = 100;

#[derive(PartialEq, Clone, Copy)]
enum Mode {
    Basic,
    /// statement position, where `label:` may appear
    Label,
    /// `for` header, where `range` may appear
    Range,
}

struct Parser {
    tokens: Vec<Token>,
    at: usize,
    /// negative inside control clause headers, where `T{` opens the body
    /// instead of a composite literal
    expr_lev: i32,
    nest_lev: u32,
}

// token stream {{{
impl Parser {
    fn new(source: &str) -> Result<Self> {
        Ok(Self {
            tokens: lex(source)?,
            at: 0,
            expr_lev: 0,
            nest_lev: 0,
        })
    }

    fn deeper(&mut self) -> Result<()> {
        self.nest_lev += 1;
        if MAX_NEST_LEV < self.nest_lev {
            return Err(ParseError::TooDeep {
                at: self.tokens[self.at].0,
                limit: MAX_NEST_LEV,
            });
        }
        Ok(())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.deeper()?;
        let r = f(self);
        self.nest_lev -= 1;
        r
    }

    /// the stream always ends with `Tok::End`, and the cursor never moves past it
    fn peek(&self) -> &Tok {
        &self.tokens[self.at].1
    }

    fn peek_nth(&self, n: usize) -> &Tok {
        &self.tokens[(self.at + n).min(self.tokens.len() - 1)].1
    }

    fn peek_op(&self) -> Option<Op> {
        match self.peek() {
            Tok::Op(op) => Some(*op),
            _ => None,
        }
    }

    fn peek_kw(&self) -> Option<Keyword> {
        match self.peek() {
            Tok::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    fn bump(&mut self) {
        if self.at + 1 < self.tokens.len() {
            self.at += 1;
        }
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        let r = self.peek() == tok;
        if r {
            self.bump();
        }
        r
    }

    fn eat_op(&mut self, op: Op) -> bool {
        self.eat(&Tok::Op(op))
    }

    fn eat_kw(&mut self, kw: Keyword) -> bool {
        self.eat(&Tok::Keyword(kw))
    }

    fn expect(&mut self, tok: Tok, expected: &'static str) -> Result<()> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_kw(&mut self, kw: Keyword, expected: &'static str) -> Result<()> {
        self.expect(Tok::Keyword(kw), expected)
    }

    /// a closing `)` or `}` may stand in for the semicolon
    fn expect_semi(&mut self) -> Result<()> {
        match self.peek() {
            Tok::Semi => {
                self.bump();
                Ok(())
            }
            Tok::RParen | Tok::RBrace | Tok::End => Ok(()),
            _ => Err(self.unexpected("';'")),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        self.unexpected_at(self.at, expected)
    }

    fn unexpected_at(&self, index: usize, expected: &'static str) -> ParseError {
        let Token(at, found) = &self.tokens[index];
        ParseError::Unexpected {
            at: *at,
            found: found.to_string(),
            expected,
        }
    }

    fn ident(&mut self) -> Result<Ident> {
        match self.peek() {
            Tok::Ident(name) => {
                let r = Ident::new(name.clone());
                self.bump();
                Ok(r)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn ident_list(&mut self) -> Result<Vec<Ident>> {
        let mut r = vec![self.ident()?];
        while self.eat(&Tok::Comma) {
            r.push(self.ident()?);
        }
        Ok(r)
    }

    fn basic_lit(&mut self) -> Result<BasicLit> {
        match self.peek() {
            Tok::Lit(kind, value) => {
                let r = BasicLit {
                    kind: *kind,
                    value: value.clone(),
                };
                self.bump();
                Ok(r)
            }
            _ => Err(self.unexpected("literal")),
        }
    }
}
// }}}

// expressions {{{
fn is_type_name(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) => true,
        Expr::Selector { x, .. } => matches!(**x, Expr::Ident(_)),
        _ => false,
    }
}

fn is_literal_type(x: &Expr) -> bool {
    is_type_name(x)
        || matches!(
            x,
            Expr::ArrayType { .. } | Expr::SliceType(_) | Expr::StructType(_) | Expr::MapType { .. }
        )
}

fn starts_type(tok: &Tok) -> bool {
    use Keyword::*;
    matches!(
        tok,
        Tok::Ident(_)
            | Tok::LBrack
            | Tok::LParen
            | Tok::Keyword(Struct | Interface | Map | Chan | Func)
            | Tok::Op(Op::Mul | Op::Arrow)
    )
}

impl Parser {
    fn expr(&mut self) -> Result<Expr> {
        self.nested(|p| p.binary_expr(1))
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut r = vec![self.expr()?];
        while self.eat(&Tok::Comma) {
            r.push(self.expr()?);
        }
        Ok(r)
    }

    fn binary_expr(&mut self, prec1: u8) -> Result<Expr> {
        let outer = self.nest_lev;
        let mut x = self.unary_expr()?;
        while let Some(op) = self.peek_op() {
            let prec = op.precedence();
            if prec < prec1 {
                break;
            }
            self.bump();
            let y = self.binary_expr(prec + 1)?;
            x = Expr::Binary {
                op,
                x: Box::new(x),
                y: Box::new(y),
            };
            self.deeper()?;
        }
        self.nest_lev = outer;
        Ok(x)
    }

    fn unary_expr(&mut self) -> Result<Expr> {
        match self.peek_op() {
            Some(op @ (Op::Add | Op::Sub | Op::Not | Op::Xor | Op::And | Op::Tilde)) => {
                self.bump();
                let x = self.nested(Self::unary_expr)?;
                Ok(Expr::Unary {
                    op,
                    x: Box::new(x),
                })
            }

            Some(Op::Arrow) => {
                self.bump();
                if self.eat_kw(Keyword::Chan) {
                    let value = self.ty()?;
                    return Ok(Expr::ChanType {
                        dir: ChanDir::Recv,
                        value: Box::new(value),
                    });
                }
                let x = self.nested(Self::unary_expr)?;
                Ok(Expr::Unary {
                    op: Op::Arrow,
                    x: Box::new(x),
                })
            }

            Some(Op::Mul) => {
                self.bump();
                Ok(Expr::Star(Box::new(self.nested(Self::unary_expr)?)))
            }

            _ => self.primary_expr(),
        }
    }

    fn primary_expr(&mut self) -> Result<Expr> {
        let outer = self.nest_lev;
        let mut x = self.operand()?;
        loop {
            match self.peek() {
                Tok::Dot => {
                    self.bump();
                    if self.eat(&Tok::LParen) {
                        let ty = if self.eat_kw(Keyword::Type) {
                            None
                        } else {
                            Some(Box::new(self.ty()?))
                        };
                        self.expect(Tok::RParen, "')'")?;
                        x = Expr::TypeAssert {
                            x: Box::new(x),
                            ty,
                        };
                    } else {
                        let sel = self.ident()?;
                        x = Expr::Selector {
                            x: Box::new(x),
                            sel,
                        };
                    }
                }
                Tok::LBrack => x = self.index_or_slice(x)?,
                Tok::LParen => x = self.call(x)?,
                Tok::LBrace if is_literal_type(&x) && (self.expr_lev >= 0 || !is_type_name(&x)) => {
                    x = self.composite_lit(Some(x))?
                }
                _ => {
                    self.nest_lev = outer;
                    return Ok(x);
                }
            }
            self.deeper()?;
        }
    }

    fn operand(&mut self) -> Result<Expr> {
        match self.peek() {
            Tok::Ident(_) => Ok(Expr::Ident(self.ident()?)),
            Tok::Lit(..) => Ok(Expr::BasicLit(self.basic_lit()?)),

            Tok::LParen => {
                self.bump();
                self.expr_lev += 1;
                let x = self.expr()?;
                self.expr_lev -= 1;
                self.expect(Tok::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(x)))
            }

            Tok::Keyword(Keyword::Func) => {
                self.bump();
                let ty = self.signature()?;
                if !matches!(self.peek(), Tok::LBrace) {
                    return Ok(Expr::FuncType(ty));
                }
                let outer = mem::replace(&mut self.expr_lev, 0);
                let body = self.block()?;
                self.expr_lev = outer;
                Ok(Expr::FuncLit { ty, body })
            }

            Tok::LBrack
            | Tok::Keyword(Keyword::Struct | Keyword::Interface | Keyword::Map | Keyword::Chan) => {
                self.ty()
            }

            _ => Err(self.unexpected("operand")),
        }
    }

    fn index_or_slice(&mut self, x: Expr) -> Result<Expr> {
        let start = self.at;
        self.expect(Tok::LBrack, "'['")?;
        self.expr_lev += 1;

        let mut index: [Option<Box<Expr>>; 3] = [None, None, None];
        let mut colons = 0;
        if !matches!(self.peek(), Tok::Colon) {
            index[0] = Some(Box::new(self.expr()?));
        }
        while colons < 2 && self.eat(&Tok::Colon) {
            colons += 1;
            if !matches!(self.peek(), Tok::Colon | Tok::RBrack) {
                index[colons] = Some(Box::new(self.expr()?));
            }
        }

        self.expr_lev -= 1;
        self.expect(Tok::RBrack, "']'")?;

        let [low, high, max] = index;
        if 0 == colons {
            let Some(index) = low else {
                return Err(self.unexpected_at(start + 1, "index"));
            };
            return Ok(Expr::Index {
                x: Box::new(x),
                index,
            });
        }
        if 2 == colons && (high.is_none() || max.is_none()) {
            return Err(self.unexpected_at(start, "middle and final index of a 3-index slice"));
        }
        Ok(Expr::Slice {
            x: Box::new(x),
            low,
            high,
            max,
            slice3: 2 == colons,
        })
    }

    fn call(&mut self, fun: Expr) -> Result<Expr> {
        self.expect(Tok::LParen, "'('")?;
        self.expr_lev += 1;
        let mut args = Vec::new();
        let mut spread = false;
        while !matches!(self.peek(), Tok::RParen) {
            args.push(self.expr()?);
            spread = self.eat(&Tok::Ellipsis);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect(Tok::RParen, "')'")?;
        Ok(Expr::Call {
            fun: Box::new(fun),
            args,
            spread,
        })
    }

    fn composite_lit(&mut self, ty: Option<Expr>) -> Result<Expr> {
        self.expect(Tok::LBrace, "'{'")?;
        self.expr_lev += 1;
        let mut elts = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::End) {
            elts.push(self.element()?);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expr_lev -= 1;
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Expr::CompositeLit {
            ty: ty.map(Box::new),
            elts,
        })
    }

    fn element(&mut self) -> Result<Expr> {
        let key = self.element_value()?;
        if !self.eat(&Tok::Colon) {
            return Ok(key);
        }
        let value = self.element_value()?;
        Ok(Expr::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// elements of a nested composite literal may elide their type
    fn element_value(&mut self) -> Result<Expr> {
        if matches!(self.peek(), Tok::LBrace) {
            self.nested(|p| p.composite_lit(None))
        } else {
            self.expr()
        }
    }
}
// }}}

// types {{{
impl Parser {
    fn ty(&mut self) -> Result<Expr> {
        self.nested(Self::type_expr)
    }

    fn type_expr(&mut self) -> Result<Expr> {
        match self.peek() {
            Tok::Ident(_) => {
                let x = Expr::Ident(self.ident()?);
                if !self.eat(&Tok::Dot) {
                    return Ok(x);
                }
                let sel = self.ident()?;
                Ok(Expr::Selector {
                    x: Box::new(x),
                    sel,
                })
            }

            Tok::LBrack => {
                self.bump();
                if self.eat(&Tok::RBrack) {
                    return Ok(Expr::SliceType(Box::new(self.ty()?)));
                }
                let len = if self.eat(&Tok::Ellipsis) {
                    Expr::Ellipsis(None)
                } else {
                    self.expr_lev += 1;
                    let len = self.expr()?;
                    self.expr_lev -= 1;
                    len
                };
                self.expect(Tok::RBrack, "']'")?;
                let elt = self.ty()?;
                Ok(Expr::ArrayType {
                    len: Box::new(len),
                    elt: Box::new(elt),
                })
            }

            Tok::Keyword(Keyword::Struct) => self.struct_type(),
            Tok::Keyword(Keyword::Interface) => self.interface_type(),

            Tok::Keyword(Keyword::Map) => {
                self.bump();
                self.expect(Tok::LBrack, "'['")?;
                let key = self.ty()?;
                self.expect(Tok::RBrack, "']'")?;
                let value = self.ty()?;
                Ok(Expr::MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }

            Tok::Keyword(Keyword::Chan) => {
                self.bump();
                let dir = if self.eat_op(Op::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.ty()?;
                Ok(Expr::ChanType {
                    dir,
                    value: Box::new(value),
                })
            }

            Tok::Op(Op::Arrow) => {
                self.bump();
                self.expect_kw(Keyword::Chan, "'chan'")?;
                let value = self.ty()?;
                Ok(Expr::ChanType {
                    dir: ChanDir::Recv,
                    value: Box::new(value),
                })
            }

            Tok::Keyword(Keyword::Func) => {
                self.bump();
                Ok(Expr::FuncType(self.signature()?))
            }

            Tok::Op(Op::Mul) => {
                self.bump();
                Ok(Expr::Star(Box::new(self.ty()?)))
            }

            Tok::LParen => {
                self.bump();
                let ty = self.ty()?;
                self.expect(Tok::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(ty)))
            }

            _ => Err(self.unexpected("type")),
        }
    }

    fn struct_type(&mut self) -> Result<Expr> {
        self.expect_kw(Keyword::Struct, "'struct'")?;
        self.expect(Tok::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::End) {
            fields.push(self.field_decl()?);
            self.expect_semi()?;
        }
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Expr::StructType(fields))
    }

    fn field_decl(&mut self) -> Result<Field> {
        let (names, ty) = match self.peek() {
            Tok::Op(Op::Mul) => (vec![], self.ty()?),
            Tok::Ident(_) => {
                let first = self.ident()?;
                match self.peek() {
                    Tok::Dot => {
                        self.bump();
                        let sel = self.ident()?;
                        let ty = Expr::Selector {
                            x: Box::new(Expr::Ident(first)),
                            sel,
                        };
                        (vec![], ty)
                    }
                    Tok::Lit(LitKind::String, _) | Tok::Semi | Tok::RBrace => {
                        (vec![], Expr::Ident(first))
                    }
                    _ => {
                        let mut names = vec![first];
                        while self.eat(&Tok::Comma) {
                            names.push(self.ident()?);
                        }
                        (names, self.ty()?)
                    }
                }
            }
            _ => return Err(self.unexpected("field")),
        };

        let tag = if matches!(self.peek(), Tok::Lit(LitKind::String, _)) {
            Some(self.basic_lit()?)
        } else {
            None
        };
        Ok(Field { names, ty, tag })
    }

    fn interface_type(&mut self) -> Result<Expr> {
        self.expect_kw(Keyword::Interface, "'interface'")?;
        self.expect(Tok::LBrace, "'{'")?;
        let mut methods = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::End) {
            let named = matches!((self.peek(), self.peek_nth(1)), (Tok::Ident(_), Tok::LParen));
            let method = if named {
                let name = self.ident()?;
                Field {
                    names: vec![name],
                    ty: Expr::FuncType(self.signature()?),
                    tag: None,
                }
            } else {
                Field {
                    names: vec![],
                    ty: self.ty()?,
                    tag: None,
                }
            };
            methods.push(method);
            self.expect_semi()?;
        }
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Expr::InterfaceType(methods))
    }

    fn signature(&mut self) -> Result<FuncType> {
        let params = self.parameters()?;
        let results = if matches!(self.peek(), Tok::LParen) {
            self.parameters()?
        } else if starts_type(self.peek()) {
            vec![Field {
                names: vec![],
                ty: self.ty()?,
                tag: None,
            }]
        } else {
            vec![]
        };
        Ok(FuncType { params, results })
    }

    fn param_type(&mut self) -> Result<Expr> {
        if self.eat(&Tok::Ellipsis) {
            Ok(Expr::Ellipsis(Some(Box::new(self.ty()?))))
        } else {
            self.ty()
        }
    }

    /// `(a, b int, c string)` and `(int, string)` are both valid, so names
    /// and types are told apart only once the whole list is read
    fn parameters(&mut self) -> Result<Vec<Field>> {
        let start = self.at;
        self.expect(Tok::LParen, "'('")?;

        let mut entries: Vec<(Option<Ident>, Option<Expr>)> = Vec::new();
        while !matches!(self.peek(), Tok::RParen) {
            let entry = if matches!(self.peek(), Tok::Ident(_)) {
                let name = self.ident()?;
                match self.peek() {
                    Tok::Dot => {
                        self.bump();
                        let sel = self.ident()?;
                        let ty = Expr::Selector {
                            x: Box::new(Expr::Ident(name)),
                            sel,
                        };
                        (None, Some(ty))
                    }
                    Tok::Comma | Tok::RParen => (Some(name), None),
                    _ => (Some(name), Some(self.param_type()?)),
                }
            } else {
                (None, Some(self.param_type()?))
            };
            entries.push(entry);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RParen, "')'")?;

        if !entries.iter().any(|(n, t)| n.is_some() && t.is_some()) {
            return Ok(entries
                .into_iter()
                .filter_map(|entry| match entry {
                    (_, Some(ty)) => Some(ty),
                    (Some(name), None) => Some(Expr::Ident(name)),
                    (None, None) => None,
                })
                .map(|ty| Field {
                    names: vec![],
                    ty,
                    tag: None,
                })
                .collect());
        }

        let mut r = Vec::new();
        let mut names = Vec::new();
        for entry in entries {
            match entry {
                (Some(name), None) => names.push(name),
                (Some(name), Some(ty)) => {
                    names.push(name);
                    r.push(Field {
                        names: mem::take(&mut names),
                        ty,
                        tag: None,
                    });
                }
                _ => return Err(self.unexpected_at(start, "parameters all named or all unnamed")),
            }
        }
        if !names.is_empty() {
            return Err(self.unexpected_at(start, "a type after the last parameter name"));
        }
        Ok(r)
    }
}
// }}}

// statements {{{
impl Parser {
    fn block(&mut self) -> Result<Block> {
        self.expect(Tok::LBrace, "'{'")?;
        let list = self.stmt_list()?;
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Block { list })
    }

    fn stmt_list(&mut self) -> Result<Vec<Stmt>> {
        let mut r = Vec::new();
        while !matches!(
            self.peek(),
            Tok::RBrace | Tok::End | Tok::Keyword(Keyword::Case | Keyword::Default)
        ) {
            r.push(self.stmt()?);
        }
        Ok(r)
    }

    fn stmt(&mut self) -> Result<Stmt> {
        self.nested(Self::statement)
    }

    fn statement(&mut self) -> Result<Stmt> {
        use Keyword::*;

        let stmt = match self.peek() {
            Tok::Semi => {
                self.bump();
                return Ok(Stmt::Empty);
            }

            Tok::Keyword(Const | Type | Var) => Stmt::Decl(self.gen_decl()?),

            Tok::Ident(_)
            | Tok::Lit(..)
            | Tok::LParen
            | Tok::LBrack
            | Tok::Op(_)
            | Tok::Keyword(Func | Struct | Map | Chan | Interface) => {
                let stmt = self.simple_stmt(Mode::Label)?;
                if let Stmt::Labeled { .. } = stmt {
                    return Ok(stmt);
                }
                stmt
            }

            Tok::Keyword(Go) => {
                self.bump();
                Stmt::Go(self.call_expr("function call after 'go'")?)
            }
            Tok::Keyword(Defer) => {
                self.bump();
                Stmt::Defer(self.call_expr("function call after 'defer'")?)
            }

            Tok::Keyword(Return) => {
                self.bump();
                let results = if matches!(self.peek(), Tok::Semi | Tok::RBrace) {
                    vec![]
                } else {
                    self.expr_list()?
                };
                Stmt::Return(results)
            }

            Tok::Keyword(kw @ (Break | Continue | Goto | Fallthrough)) => {
                let kind = match kw {
                    Break => BranchKind::Break,
                    Continue => BranchKind::Continue,
                    Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                self.bump();
                let labeled = matches!(self.peek(), Tok::Ident(_));
                let label = if BranchKind::Fallthrough != kind && labeled {
                    Some(self.ident()?)
                } else {
                    None
                };
                Stmt::Branch { kind, label }
            }

            Tok::LBrace => Stmt::Block(self.block()?),
            Tok::Keyword(If) => self.if_stmt()?,
            Tok::Keyword(Switch) => self.switch_stmt()?,
            Tok::Keyword(Select) => self.select_stmt()?,
            Tok::Keyword(For) => self.for_stmt()?,

            _ => return Err(self.unexpected("statement")),
        };

        self.expect_semi()?;
        Ok(stmt)
    }

    fn call_expr(&mut self, expected: &'static str) -> Result<Expr> {
        let start = self.at;
        let x = self.expr()?;
        if !matches!(x, Expr::Call { .. }) {
            return Err(self.unexpected_at(start, expected));
        }
        Ok(x)
    }

    fn simple_stmt(&mut self, mode: Mode) -> Result<Stmt> {
        let start = self.at;

        if Mode::Range == mode && self.eat_kw(Keyword::Range) {
            let x = self.expr()?;
            return Ok(Stmt::Range {
                key: None,
                value: None,
                tok: None,
                x,
                body: Block::default(),
            });
        }

        let mut lhs = self.expr_list()?;

        if let Some(op) = self.peek_op().filter(|op| op.is_assign()) {
            self.bump();
            if Mode::Range == mode
                && matches!(op, Op::Define | Op::Assign)
                && self.eat_kw(Keyword::Range)
            {
                let x = self.expr()?;
                if lhs.len() > 2 {
                    return Err(self.unexpected_at(start, "at most 2 range variables"));
                }
                let mut lhs = lhs.into_iter();
                return Ok(Stmt::Range {
                    key: lhs.next(),
                    value: lhs.next(),
                    tok: Some(op),
                    x,
                    body: Block::default(),
                });
            }
            let rhs = self.expr_list()?;
            return Ok(Stmt::Assign { lhs, op, rhs });
        }

        if lhs.len() > 1 {
            return Err(self.unexpected("':=' or '='"));
        }
        let Some(x) = lhs.pop() else {
            return Err(self.unexpected_at(start, "expression"));
        };

        match self.peek() {
            Tok::Colon if Mode::Label == mode => {
                let Expr::Ident(label) = x else {
                    return Err(self.unexpected("';'"));
                };
                self.bump();
                let stmt = if matches!(self.peek(), Tok::RBrace) {
                    Stmt::Empty
                } else {
                    self.stmt()?
                };
                Ok(Stmt::Labeled {
                    label,
                    stmt: Box::new(stmt),
                })
            }

            Tok::Op(Op::Arrow) => {
                self.bump();
                let value = self.expr()?;
                Ok(Stmt::Send { chan: x, value })
            }

            Tok::Op(op @ (Op::Inc | Op::Dec)) => {
                let op = *op;
                self.bump();
                Ok(Stmt::IncDec { x, op })
            }

            _ => Ok(Stmt::Expr(x)),
        }
    }

    fn header_expr(
        &self,
        stmt: Option<Stmt>,
        start: usize,
        expected: &'static str,
    ) -> Result<Option<Expr>> {
        match stmt {
            None => Ok(None),
            Some(Stmt::Expr(x)) => Ok(Some(x)),
            Some(_) => Err(self.unexpected_at(start, expected)),
        }
    }

    fn if_stmt(&mut self) -> Result<Stmt> {
        self.expect_kw(Keyword::If, "'if'")?;
        let outer = mem::replace(&mut self.expr_lev, -1);

        let mut init = None;
        if !matches!(self.peek(), Tok::Semi) {
            init = Some(self.simple_stmt(Mode::Basic)?);
        }
        let start = self.at;
        let cond = if self.eat(&Tok::Semi) {
            Some(self.simple_stmt(Mode::Basic)?)
        } else {
            init.take()
        };
        self.expr_lev = outer;

        let Some(cond) = self.header_expr(cond, start, "condition expression")? else {
            return Err(self.unexpected("condition expression"));
        };
        let body = self.block()?;

        let els = if self.eat_kw(Keyword::Else) {
            let els = match self.peek() {
                Tok::Keyword(Keyword::If) => self.nested(Self::if_stmt)?,
                Tok::LBrace => Stmt::Block(self.block()?),
                _ => return Err(self.unexpected("'if' or block after 'else'")),
            };
            Some(Box::new(els))
        } else {
            None
        };

        Ok(Stmt::If {
            init: init.map(Box::new),
            cond,
            body,
            els,
        })
    }

    fn switch_stmt(&mut self) -> Result<Stmt> {
        self.expect_kw(Keyword::Switch, "'switch'")?;
        let outer = mem::replace(&mut self.expr_lev, -1);

        let (mut init, mut tag) = (None, None);
        let mut start = self.at;
        if !matches!(self.peek(), Tok::LBrace) {
            if !matches!(self.peek(), Tok::Semi) {
                tag = Some(self.simple_stmt(Mode::Basic)?);
            }
            if self.eat(&Tok::Semi) {
                init = tag.take();
                start = self.at;
                if !matches!(self.peek(), Tok::LBrace) {
                    tag = Some(self.simple_stmt(Mode::Basic)?);
                }
            }
        }
        self.expr_lev = outer;

        let type_switch = tag.as_ref().is_some_and(is_type_switch_guard);

        self.expect(Tok::LBrace, "'{'")?;
        let mut body = Vec::new();
        while matches!(self.peek(), Tok::Keyword(Keyword::Case | Keyword::Default)) {
            body.push(self.case_clause()?);
        }
        self.expect(Tok::RBrace, "'}'")?;

        let init = init.map(Box::new);
        match tag {
            Some(assign) if type_switch => Ok(Stmt::TypeSwitch {
                init,
                assign: Box::new(assign),
                body,
            }),
            tag => Ok(Stmt::Switch {
                init,
                tag: self.header_expr(tag, start, "switch expression")?,
                body,
            }),
        }
    }

    fn case_clause(&mut self) -> Result<CaseClause> {
        let list = if self.eat_kw(Keyword::Case) {
            Some(self.expr_list()?)
        } else {
            self.expect_kw(Keyword::Default, "'case' or 'default'")?;
            None
        };
        self.expect(Tok::Colon, "':'")?;
        let body = self.stmt_list()?;
        Ok(CaseClause { list, body })
    }

    fn select_stmt(&mut self) -> Result<Stmt> {
        self.expect_kw(Keyword::Select, "'select'")?;
        self.expect(Tok::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while matches!(self.peek(), Tok::Keyword(Keyword::Case | Keyword::Default)) {
            let comm = if self.eat_kw(Keyword::Case) {
                Some(Box::new(self.simple_stmt(Mode::Basic)?))
            } else {
                self.bump();
                None
            };
            self.expect(Tok::Colon, "':'")?;
            let body = self.stmt_list()?;
            clauses.push(CommClause { comm, body });
        }
        self.expect(Tok::RBrace, "'}'")?;
        Ok(Stmt::Select(clauses))
    }

    fn for_stmt(&mut self) -> Result<Stmt> {
        self.expect_kw(Keyword::For, "'for'")?;
        let outer = mem::replace(&mut self.expr_lev, -1);

        let (mut init, mut cond, mut post) = (None, None, None);
        let mut start = self.at;
        if !matches!(self.peek(), Tok::LBrace) {
            if !matches!(self.peek(), Tok::Semi) {
                cond = Some(self.simple_stmt(Mode::Range)?);
            }
            let is_range = matches!(cond, Some(Stmt::Range { .. }));
            if !is_range && self.eat(&Tok::Semi) {
                init = cond.take();
                start = self.at;
                if !matches!(self.peek(), Tok::Semi) {
                    cond = Some(self.simple_stmt(Mode::Basic)?);
                }
                self.expect(Tok::Semi, "';'")?;
                if !matches!(self.peek(), Tok::LBrace) {
                    post = Some(self.simple_stmt(Mode::Basic)?);
                }
            }
        }
        self.expr_lev = outer;

        let body = self.block()?;

        if let Some(Stmt::Range { key, value, tok, x, .. }) = cond {
            return Ok(Stmt::Range {
                key,
                value,
                tok,
                x,
                body,
            });
        }
        Ok(Stmt::For {
            init: init.map(Box::new),
            cond: self.header_expr(cond, start, "loop condition")?,
            post: post.map(Box::new),
            body,
        })
    }
}

fn is_type_switch_guard(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Expr(Expr::TypeAssert { ty: None, .. }) => true,
        Stmt::Assign {
            lhs,
            op: Op::Define,
            rhs,
        } => lhs.len() == 1 && matches!(rhs.as_slice(), [Expr::TypeAssert { ty: None, .. }]),
        _ => false,
    }
}
// }}}

// declarations {{{
impl Parser {
    fn gen_decl(&mut self) -> Result<GenDecl> {
        let keyword = match self.peek_kw() {
            Some(Keyword::Import) => DeclKeyword::Import,
            Some(Keyword::Const) => DeclKeyword::Const,
            Some(Keyword::Type) => DeclKeyword::Type,
            Some(Keyword::Var) => DeclKeyword::Var,
            _ => return Err(self.unexpected("declaration")),
        };
        self.bump();

        let mut specs = Vec::new();
        if self.eat(&Tok::LParen) {
            while !matches!(self.peek(), Tok::RParen | Tok::End) {
                specs.push(self.spec(keyword)?);
                self.expect_semi()?;
            }
            self.expect(Tok::RParen, "')'")?;
        } else {
            specs.push(self.spec(keyword)?);
        }
        Ok(GenDecl { keyword, specs })
    }

    fn spec(&mut self, keyword: DeclKeyword) -> Result<Spec> {
        match keyword {
            DeclKeyword::Import => {
                let name = match self.peek() {
                    Tok::Ident(_) => Some(self.ident()?),
                    Tok::Dot => {
                        self.bump();
                        Some(Ident::new("."))
                    }
                    _ => None,
                };
                if !matches!(self.peek(), Tok::Lit(LitKind::String, _)) {
                    return Err(self.unexpected("import path"));
                }
                let path = self.basic_lit()?;
                Ok(Spec::Import { name, path })
            }

            DeclKeyword::Type => {
                let name = self.ident()?;
                let alias = self.eat_op(Op::Assign);
                let ty = self.ty()?;
                Ok(Spec::Type { name, alias, ty })
            }

            DeclKeyword::Const | DeclKeyword::Var => {
                let names = self.ident_list()?;
                let ty = match self.peek() {
                    Tok::Op(Op::Assign) | Tok::Semi | Tok::RParen | Tok::End => None,
                    _ => Some(self.ty()?),
                };
                let values = if self.eat_op(Op::Assign) {
                    self.expr_list()?
                } else {
                    vec![]
                };
                Ok(Spec::Value { names, ty, values })
            }
        }
    }

    fn func_decl(&mut self) -> Result<FuncDecl> {
        self.expect_kw(Keyword::Func, "'func'")?;
        let recv = if matches!(self.peek(), Tok::LParen) {
            Some(self.parameters()?)
        } else {
            None
        };
        let name = self.ident()?;
        let ty = self.signature()?;
        let body = if matches!(self.peek(), Tok::LBrace) {
            Some(self.block()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            ty,
            body,
        })
    }

    fn decl(&mut self) -> Result<Decl> {
        let decl = match self.peek_kw() {
            Some(Keyword::Func) => Decl::Func(self.func_decl()?),
            _ => Decl::Gen(self.gen_decl()?),
        };
        self.expect_semi()?;
        Ok(decl)
    }

    fn file(&mut self) -> Result<File> {
        self.expect_kw(Keyword::Package, "package clause")?;
        let package = self.ident()?;
        self.expect_semi()?;
        let mut decls = Vec::new();
        while !matches!(self.peek(), Tok::End) {
            decls.push(self.decl()?);
        }
        Ok(File { package, decls })
    }
}
// }}}

// entry points {{{
/// offsets past the scaffold prefix are moved back onto the fragment
fn unscaffold(e: ParseError, prefix: usize) -> ParseError {
    match e {
        ParseError::Lex { at, text } => ParseError::Lex {
            at: at.saturating_sub(prefix),
            text,
        },
        ParseError::Unexpected { at, found, expected } => ParseError::Unexpected {
            at: at.saturating_sub(prefix),
            found,
            expected,
        },
        ParseError::TooDeep { at, limit } => ParseError::TooDeep {
            at: at.saturating_sub(prefix),
            limit,
        },
        missing => missing,
    }
}

/// Parses a single expression; only an (automatic) semicolon may follow it.
pub fn parse_expr(source: &str) -> Result<Expr> {
    let mut p = Parser::new(source)?;
    let x = p.expr()?;
    p.eat(&Tok::Semi);
    p.expect(Tok::End, "end of input")?;
    Ok(x)
}

pub fn parse_file(source: &str) -> Result<File> {
    Parser::new(source)?.file()
}

/// Parses the fragment as the body of a function and returns its first
/// statement.
pub fn parse_stmt(source: &str) -> Result<Stmt> {
    let file = parse_file(&format!("{STMT_SCAFFOLD}{source}\n}}"))
        .map_err(|e| unscaffold(e, STMT_SCAFFOLD.len()))?;
    match file.decls.into_iter().next() {
        Some(Decl::Func(FuncDecl {
            body: Some(Block { list }),
            ..
        })) => list.into_iter().next().ok_or(ParseError::Missing("statement")),
        _ => Err(ParseError::Missing("statement")),
    }
}

/// Parses the fragment at file scope and returns its first declaration.
pub fn parse_decl(source: &str) -> Result<Decl> {
    let file = parse_file(&format!("{DECL_SCAFFOLD}{source}\n"))
        .map_err(|e| unscaffold(e, DECL_SCAFFOLD.len()))?;
    file.decls
        .into_iter()
        .next()
        .ok_or(ParseError::Missing("declaration"))
}

pub fn expr_or_bad(source: &str) -> Expr {
    parse_expr(source).unwrap_or_else(|e| {
        debug!(error = %e, source, "expression fragment does not parse");
        Expr::Bad
    })
}

pub fn stmt_or_bad(source: &str) -> Stmt {
    parse_stmt(source).unwrap_or_else(|e| {
        debug!(error = %e, source, "statement fragment does not parse");
        Stmt::Bad
    })
}

pub fn decl_or_bad(source: &str) -> Decl {
    parse_decl(source).unwrap_or_else(|e| {
        debug!(error = %e, source, "declaration fragment does not parse");
        Decl::Bad
    })
}
// }}}
