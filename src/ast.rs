//! syntax tree node model
//!
//! The tree is built once by [`crate::parse`] and only ever read afterward.
//! Nodes carry no positions and no comments: two fragments that differ only
//! in layout produce identical trees.
//!
//! None of the node enums derive `PartialEq`; structural comparison goes
//! through [`crate::equal`], which knows that `Bad` is equal to nothing.

use std::fmt::{Display, Formatter, Result as FmtResult};

// leaves {{{
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// `value` is the exact source text, quotes and prefixes included.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String,
}

/// operator and assignment tokens that end up stored in the tree
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Op {
    Add,    // +
    Sub,    // -
    Mul,    // *
    Quo,    // /
    Rem,    // %
    And,    // &
    Or,     // |
    Xor,    // ^
    Shl,    // <<
    Shr,    // >>
    AndNot, // &^
    LAnd,   // &&
    LOr,    // ||
    Arrow,  // <-
    Inc,    // ++
    Dec,    // --
    Eql,    // ==
    Lss,    // <
    Gtr,    // >
    Assign, // =
    Not,    // !
    Tilde,  // ~
    Neq,    // !=
    Leq,    // <=
    Geq,    // >=
    Define, // :=

    AddAssign,    // +=
    SubAssign,    // -=
    MulAssign,    // *=
    QuoAssign,    // /=
    RemAssign,    // %=
    AndAssign,    // &=
    OrAssign,     // |=
    XorAssign,    // ^=
    ShlAssign,    // <<=
    ShrAssign,    // >>=
    AndNotAssign, // &^=
}

impl Op {
    pub fn as_str(self) -> &'static str {
        use Op::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Quo => "/",
            Rem => "%",
            And => "&",
            Or => "|",
            Xor => "^",
            Shl => "<<",
            Shr => ">>",
            AndNot => "&^",
            LAnd => "&&",
            LOr => "||",
            Arrow => "<-",
            Inc => "++",
            Dec => "--",
            Eql => "==",
            Lss => "<",
            Gtr => ">",
            Assign => "=",
            Not => "!",
            Tilde => "~",
            Neq => "!=",
            Leq => "<=",
            Geq => ">=",
            Define => ":=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            QuoAssign => "/=",
            RemAssign => "%=",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            AndNotAssign => "&^=",
        }
    }

    /// binding power as a binary operator, 0 when it is not one
    pub fn precedence(self) -> u8 {
        use Op::*;
        match self {
            LOr => 1,
            LAnd => 2,
            Eql | Neq | Lss | Leq | Gtr | Geq => 3,
            Add | Sub | Or | Xor => 4,
            Mul | Quo | Rem | Shl | Shr | And | AndNot => 5,
            _ => 0,
        }
    }

    pub fn is_assign(self) -> bool {
        use Op::*;
        matches!(
            self,
            Assign
                | Define
                | AddAssign
                | SubAssign
                | MulAssign
                | QuoAssign
                | RemAssign
                | AndAssign
                | OrAssign
                | XorAssign
                | ShlAssign
                | ShrAssign
                | AndNotAssign
        )
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}
// }}}

// expressions {{{
#[derive(Debug, Clone)]
pub enum Expr {
    /// stands for a fragment that failed to parse
    Bad,
    Ident(Ident),
    /// `...` as an array length or the `...T` of a variadic parameter
    Ellipsis(Option<Box<Expr>>),
    BasicLit(BasicLit),
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
        slice3: bool,
    },
    /// `ty` is none for the `x.(type)` of a type switch
    TypeAssert {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        spread: bool,
    },
    /// either a dereference or a pointer type
    Star(Box<Expr>),
    Unary {
        op: Op,
        x: Box<Expr>,
    },
    Binary {
        op: Op,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        len: Box<Expr>,
        elt: Box<Expr>,
    },
    SliceType(Box<Expr>),
    StructType(Vec<Field>),
    FuncType(FuncType),
    InterfaceType(Vec<Field>),
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
}

/// one group of a parameter, result, struct field or interface method list;
/// `x, y int` is a single field with two names
#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

#[derive(Debug, Clone, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}
// }}}

// statements {{{
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub list: Vec<Stmt>,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// `list` is none for the `default` clause
#[derive(Debug, Clone)]
pub struct CaseClause {
    pub list: Option<Vec<Expr>>,
    pub body: Vec<Stmt>,
}

/// `comm` is none for the `default` clause
#[derive(Debug, Clone)]
pub struct CommClause {
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    /// stands for a fragment that failed to parse
    Bad,
    Decl(GenDecl),
    Empty,
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    /// an expression in statement position, most often a call
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        op: Op,
    },
    Assign {
        lhs: Vec<Expr>,
        op: Op,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Block,
        els: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        body: Vec<CaseClause>,
    },
    /// `assign` is either `x := y.(type)` or the bare `y.(type)`
    TypeSwitch {
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        body: Vec<CaseClause>,
    },
    Select(Vec<CommClause>),
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    /// `tok` is `:=` or `=`, none for a bare `for range x`
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        tok: Option<Op>,
        x: Expr,
        body: Block,
    },
}
// }}}

// declarations {{{
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum DeclKeyword {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import {
        name: Option<Ident>,
        path: BasicLit,
    },
    Value {
        names: Vec<Ident>,
        ty: Option<Expr>,
        values: Vec<Expr>,
    },
    Type {
        name: Ident,
        alias: bool,
        ty: Expr,
    },
}

#[derive(Debug, Clone)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<Vec<Field>>,
    pub name: Ident,
    pub ty: FuncType,
    pub body: Option<Block>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    /// stands for a fragment that failed to parse
    Bad,
    Gen(GenDecl),
    Func(FuncDecl),
}

#[derive(Debug, Clone)]
pub struct File {
    pub package: Ident,
    pub decls: Vec<Decl>,
}
// }}}

// borrowed view {{{
/// any of the three syntactic categories, borrowed
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Decl(&'a Decl),
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(value: &'a Expr) -> Self {
        Node::Expr(value)
    }
}

impl<'a> From<&'a Stmt> for Node<'a> {
    fn from(value: &'a Stmt) -> Self {
        Node::Stmt(value)
    }
}

impl<'a> From<&'a Decl> for Node<'a> {
    fn from(value: &'a Decl) -> Self {
        Node::Decl(value)
    }
}

impl Node<'_> {
    pub fn is_bad(&self) -> bool {
        matches!(
            self,
            Node::Expr(Expr::Bad) | Node::Stmt(Stmt::Bad) | Node::Decl(Decl::Bad)
        )
    }
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn kind(&self) -> &'static str {
        use Expr::*;
        match self {
            Bad => "bad expression",
            Ident(_) => "identifier",
            Ellipsis(_) => "ellipsis",
            BasicLit(_) => "literal",
            FuncLit { .. } => "function literal",
            CompositeLit { .. } => "composite literal",
            Paren(_) => "parenthesized expression",
            Selector { .. } => "selector",
            Index { .. } => "index expression",
            Slice { .. } => "slice expression",
            TypeAssert { .. } => "type assertion",
            Call { .. } => "call",
            Star(_) => "star expression",
            Unary { .. } => "unary expression",
            Binary { .. } => "binary expression",
            KeyValue { .. } => "key-value pair",
            ArrayType { .. } => "array type",
            SliceType(_) => "slice type",
            StructType(_) => "struct type",
            FuncType(_) => "function type",
            InterfaceType(_) => "interface type",
            MapType { .. } => "map type",
            ChanType { .. } => "channel type",
        }
    }
}

impl Stmt {
    pub fn kind(&self) -> &'static str {
        use Stmt::*;
        match self {
            Bad => "bad statement",
            Decl(_) => "declaration statement",
            Empty => "empty statement",
            Labeled { .. } => "labeled statement",
            Expr(_) => "expression statement",
            Send { .. } => "send statement",
            IncDec { .. } => "increment/decrement statement",
            Assign { .. } => "assignment",
            Go(_) => "go statement",
            Defer(_) => "defer statement",
            Return(_) => "return statement",
            Branch { .. } => "branch statement",
            Block(_) => "block",
            If { .. } => "if statement",
            Switch { .. } => "switch statement",
            TypeSwitch { .. } => "type switch statement",
            Select(_) => "select statement",
            For { .. } => "for statement",
            Range { .. } => "range statement",
        }
    }
}

impl Decl {
    pub fn kind(&self) -> &'static str {
        match self {
            Decl::Bad => "bad declaration",
            Decl::Gen(gen) => match gen.keyword {
                DeclKeyword::Import => "import declaration",
                DeclKeyword::Const => "const declaration",
                DeclKeyword::Type => "type declaration",
                DeclKeyword::Var => "var declaration",
            },
            Decl::Func(_) => "function declaration",
        }
    }
}
// }}}
