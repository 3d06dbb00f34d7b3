//! compiled patterns and matching them against syntax trees

use std::fmt::{Display, Formatter, Result as FmtResult};

#[cfg(not(feature = "strict-coverage"))]
use tracing::warn;

use crate::ast::{Decl, Expr, LitKind, Node, Op, Stmt};

/// structural list tags, as opposed to operator tags
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Form {
    Call,
    CallStmt,
    Deref,
    Block,
    /// `.`
    Member,
    ArrayType,
    SliceType,
}

impl Form {
    pub fn as_str(self) -> &'static str {
        match self {
            Form::Call => "call",
            Form::CallStmt => "callstmt",
            Form::Deref => "deref",
            Form::Block => "block",
            Form::Member => ".",
            Form::ArrayType => "array_type",
            Form::SliceType => "slice_type",
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Tag {
    /// exactly this identifier, its name is the node value
    Ident,
    /// exactly this literal, its source text is the node value
    Lit(LitKind),
    /// `$id`
    AnyIdent,
    /// `$int`, `$float`, `$imag`, `$char`, `$str`
    AnyLit(LitKind),
    /// `$...`
    Ellipsis,
    Op(Op),
    Form(Form),
}

fn wildcard_name(kind: LitKind) -> &'static str {
    match kind {
        LitKind::Int => "int",
        LitKind::Float => "float",
        LitKind::Imag => "imag",
        LitKind::Char => "char",
        LitKind::String => "str",
    }
}

#[derive(Debug, Clone, Copy)]
struct PatNode {
    tag: Tag,
    /// index in `Pattern::values`, meaningful for `Tag::Ident` and `Tag::Lit`
    value: usize,
    /// range in `Pattern::subs`
    first: usize,
    count: usize,
}

/// A compiled template.
///
/// Nodes live in one flat table and refer to their sub-patterns through a
/// flat index table, so a pattern is cheap to clone and can be shared
/// between threads. Nothing changes once it is built.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    nodes: Vec<PatNode>,
    subs: Vec<usize>,
    values: Vec<String>,
    root: usize,
}

// building {{{
impl Pattern {
    pub(crate) fn push_leaf(&mut self, tag: Tag, value: Option<String>) -> usize {
        let value = match value {
            Some(v) => {
                self.values.push(v);
                self.values.len() - 1
            }
            None => 0,
        };
        self.nodes.push(PatNode {
            tag,
            value,
            first: self.subs.len(),
            count: 0,
        });
        self.nodes.len() - 1
    }

    /// sub-patterns must already be pushed
    pub(crate) fn push_list(&mut self, tag: Tag, subs: &[usize]) -> usize {
        let first = self.subs.len();
        self.subs.extend_from_slice(subs);
        self.nodes.push(PatNode {
            tag,
            value: 0,
            first,
            count: subs.len(),
        });
        self.nodes.len() - 1
    }

    pub(crate) fn set_root(&mut self, root: usize) {
        self.root = root;
    }

    pub(crate) fn tag(&self, at: usize) -> Tag {
        self.nodes[at].tag
    }

    /// number of pattern nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn subs_of(&self, at: usize) -> &[usize] {
        let node = &self.nodes[at];
        &self.subs[node.first..node.first + node.count]
    }

    fn value_of(&self, at: usize) -> &str {
        &self.values[self.nodes[at].value]
    }

    fn is_ellipsis(&self, at: usize) -> bool {
        Tag::Ellipsis == self.nodes[at].tag
    }
}
// }}}

// matching {{{
#[cfg(not(feature = "strict-coverage"))]
fn uncovered(kind: &'static str) -> bool {
    warn!(kind, "no template form covers this node kind");
    false
}

#[cfg(feature = "strict-coverage")]
fn uncovered(kind: &'static str) -> bool {
    panic!("no template form covers a {kind}")
}

impl Pattern {
    /// Whether the node matches. An expression used as a statement is tried
    /// as the expression itself, so `(call f)` matches both `f()` forms.
    pub fn matches<'a>(&self, node: impl Into<Node<'a>>) -> bool {
        let node = node.into();
        if self.nodes.is_empty() || node.is_bad() {
            return false;
        }
        match node {
            Node::Expr(x) => self.expr_at(self.root, x),
            Node::Stmt(s) => self.stmt_at(self.root, s),
            Node::Decl(d) => self.decl_at(self.root, d),
        }
    }

    pub fn match_expr(&self, x: &Expr) -> bool {
        self.matches(x)
    }

    pub fn match_stmt(&self, s: &Stmt) -> bool {
        self.matches(s)
    }

    pub fn match_decl(&self, d: &Decl) -> bool {
        self.matches(d)
    }

    fn unary_at(&self, at: usize, tag: Tag, x: &Expr) -> bool {
        self.tag(at) == tag && matches!(self.subs_of(at), &[p] if self.expr_at(p, x))
    }

    fn binary_at(&self, at: usize, tag: Tag, x: &Expr, y: &Expr) -> bool {
        self.tag(at) == tag
            && matches!(self.subs_of(at), &[p, q] if self.expr_at(p, x) && self.expr_at(q, y))
    }

    fn expr_at(&self, at: usize, x: &Expr) -> bool {
        let tag = self.tag(at);
        match x {
            Expr::Bad => false,

            Expr::Paren(inner) => self.expr_at(at, inner),

            Expr::Ident(id) => match tag {
                Tag::Ident => self.value_of(at) == id.name,
                Tag::AnyIdent => true,
                _ => false,
            },

            Expr::BasicLit(lit) => match tag {
                Tag::Lit(kind) => kind == lit.kind && self.value_of(at) == lit.value,
                Tag::AnyLit(kind) => kind == lit.kind,
                _ => false,
            },

            Expr::Call { fun, args, .. } => {
                Tag::Form(Form::Call) == tag && self.call_at(at, fun, args)
            }

            Expr::Unary { op, x } => self.unary_at(at, Tag::Op(*op), x),
            Expr::Binary { op, x, y } => self.binary_at(at, Tag::Op(*op), x, y),

            Expr::Selector { x, sel } => {
                Tag::Form(Form::Member) == tag
                    && matches!(self.subs_of(at), &[p, q]
                        if self.expr_at(p, x) && self.ident_at(q, &sel.name))
            }

            Expr::Star(x) => self.unary_at(at, Tag::Form(Form::Deref), x),
            Expr::ArrayType { len, elt } => {
                self.binary_at(at, Tag::Form(Form::ArrayType), len, elt)
            }
            Expr::SliceType(elt) => self.unary_at(at, Tag::Form(Form::SliceType), elt),

            Expr::Ellipsis(_)
            | Expr::FuncLit { .. }
            | Expr::CompositeLit { .. }
            | Expr::Index { .. }
            | Expr::Slice { .. }
            | Expr::TypeAssert { .. }
            | Expr::KeyValue { .. }
            | Expr::StructType(_)
            | Expr::FuncType(_)
            | Expr::InterfaceType(_)
            | Expr::MapType { .. }
            | Expr::ChanType { .. } => uncovered(x.kind()),
        }
    }

    /// the member of a selector is a bare identifier, not an expression
    fn ident_at(&self, at: usize, name: &str) -> bool {
        match self.tag(at) {
            Tag::Ident => self.value_of(at) == name,
            Tag::AnyIdent => true,
            _ => false,
        }
    }

    fn call_at(&self, at: usize, fun: &Expr, args: &[Expr]) -> bool {
        let Some((&callee, rest)) = self.subs_of(at).split_first() else {
            return false;
        };
        self.expr_at(callee, fun) && self.sequence(rest, args, Self::expr_at)
    }

    fn stmt_at(&self, at: usize, s: &Stmt) -> bool {
        let tag = self.tag(at);
        match s {
            Stmt::Bad => false,

            Stmt::Expr(Expr::Call { fun, args, .. }) => {
                matches!(tag, Tag::Form(Form::Call | Form::CallStmt)) && self.call_at(at, fun, args)
            }
            Stmt::Expr(x) => self.expr_at(at, x),

            Stmt::Block(block) => {
                Tag::Form(Form::Block) == tag
                    && self.sequence(self.subs_of(at), &block.list, Self::stmt_at)
            }

            Stmt::IncDec { x, op } => self.unary_at(at, Tag::Op(*op), x),
            Stmt::Send { chan, value } => self.binary_at(at, Tag::Op(Op::Arrow), chan, value),

            Stmt::Assign {
                lhs,
                op: Op::Assign,
                rhs,
            } if 1 == lhs.len() && 1 == rhs.len() => {
                self.binary_at(at, Tag::Op(Op::Assign), &lhs[0], &rhs[0])
            }

            Stmt::Assign { .. }
            | Stmt::Decl(_)
            | Stmt::Empty
            | Stmt::Labeled { .. }
            | Stmt::Go(_)
            | Stmt::Defer(_)
            | Stmt::Return(_)
            | Stmt::Branch { .. }
            | Stmt::If { .. }
            | Stmt::Switch { .. }
            | Stmt::TypeSwitch { .. }
            | Stmt::Select(_)
            | Stmt::For { .. }
            | Stmt::Range { .. } => uncovered(s.kind()),
        }
    }

    fn decl_at(&self, _at: usize, d: &Decl) -> bool {
        match d {
            Decl::Bad => false,
            Decl::Gen(_) | Decl::Func(_) => uncovered(d.kind()),
        }
    }

    /// Matches sibling nodes against sub-patterns in a single forward pass.
    ///
    /// A `$...` absorbs siblings until the sub-pattern right after it matches
    /// one; that first fit is final and never revisited, so `$... 1 x`
    /// rejects `1, 1, x`. A trailing `$...` takes whatever is left.
    fn sequence<T>(
        &self,
        mut pats: &[usize],
        items: &[T],
        one: fn(&Self, usize, &T) -> bool,
    ) -> bool {
        for item in items {
            let Some((&p, rest)) = pats.split_first() else {
                return false;
            };
            if self.is_ellipsis(p) {
                let Some((&next, after)) = rest.split_first() else {
                    return true;
                };
                if one(self, next, item) {
                    pats = after;
                }
            } else if one(self, p, item) {
                pats = rest;
            } else {
                return false;
            }
        }
        match pats {
            [] => true,
            &[p] => self.is_ellipsis(p),
            _ => false,
        }
    }
}
// }}}

// rendering {{{
impl Pattern {
    fn fmt_at(&self, at: usize, f: &mut Formatter) -> FmtResult {
        let head = match self.tag(at) {
            Tag::Ident | Tag::Lit(_) => return f.write_str(self.value_of(at)),
            Tag::AnyIdent => return f.write_str("$id"),
            Tag::AnyLit(kind) => return write!(f, "${}", wildcard_name(kind)),
            Tag::Ellipsis => return f.write_str("$..."),
            Tag::Op(op) => op.as_str(),
            Tag::Form(form) => form.as_str(),
        };
        write!(f, "({head}")?;
        for &sub in self.subs_of(at) {
            f.write_str(" ")?;
            self.fmt_at(sub, f)?;
        }
        f.write_str(")")
    }
}

/// renders the canonical template text, which compiles back to an
/// equivalent pattern
impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if self.nodes.is_empty() {
            return Ok(());
        }
        self.fmt_at(self.root, f)
    }
}
// }}}
