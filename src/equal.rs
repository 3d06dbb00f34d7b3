//! structural equality
//!
//! Every function dispatches on the left operand with an exhaustive `match`,
//! so a new node kind does not compile until it is handled here. `Bad`
//! sentinels are equal to nothing, not even another `Bad`.

use crate::ast::*;
use crate::parse::{decl_or_bad, expr_or_bad, stmt_or_bad};

// helpers {{{
fn opt_eq<T>(a: &Option<T>, b: &Option<T>, eq: impl Fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => eq(a, b),
        _ => false,
    }
}

fn slice_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| eq(a, b))
}

fn boxed_expr(a: &Box<Expr>, b: &Box<Expr>) -> bool {
    equal_expr(a, b)
}

fn boxed_stmt(a: &Box<Stmt>, b: &Box<Stmt>) -> bool {
    equal_stmt(a, b)
}

fn exprs(a: &[Expr], b: &[Expr]) -> bool {
    slice_eq(a, b, equal_expr)
}

fn stmts(a: &[Stmt], b: &[Stmt]) -> bool {
    slice_eq(a, b, equal_stmt)
}

fn block(a: &Block, b: &Block) -> bool {
    stmts(&a.list, &b.list)
}

fn field(a: &Field, b: &Field) -> bool {
    a.names == b.names && equal_expr(&a.ty, &b.ty) && a.tag == b.tag
}

fn fields(a: &[Field], b: &[Field]) -> bool {
    slice_eq(a, b, field)
}

fn func_type(a: &FuncType, b: &FuncType) -> bool {
    fields(&a.params, &b.params) && fields(&a.results, &b.results)
}

fn case_clause(a: &CaseClause, b: &CaseClause) -> bool {
    opt_eq(&a.list, &b.list, |a, b| exprs(a, b)) && stmts(&a.body, &b.body)
}

fn comm_clause(a: &CommClause, b: &CommClause) -> bool {
    opt_eq(&a.comm, &b.comm, boxed_stmt) && stmts(&a.body, &b.body)
}

fn spec(a: &Spec, b: &Spec) -> bool {
    match a {
        Spec::Import { name, path } => {
            let Spec::Import { name: b_name, path: b_path } = b else {
                return false;
            };
            name == b_name && path == b_path
        }
        Spec::Value { names, ty, values } => {
            let Spec::Value {
                names: b_names,
                ty: b_ty,
                values: b_values,
            } = b
            else {
                return false;
            };
            names == b_names && opt_eq(ty, b_ty, equal_expr) && exprs(values, b_values)
        }
        Spec::Type { name, alias, ty } => {
            let Spec::Type {
                name: b_name,
                alias: b_alias,
                ty: b_ty,
            } = b
            else {
                return false;
            };
            name == b_name && alias == b_alias && equal_expr(ty, b_ty)
        }
    }
}

fn gen_decl(a: &GenDecl, b: &GenDecl) -> bool {
    a.keyword == b.keyword && slice_eq(&a.specs, &b.specs, spec)
}

fn func_decl(a: &FuncDecl, b: &FuncDecl) -> bool {
    opt_eq(&a.recv, &b.recv, |a, b| fields(a, b))
        && a.name == b.name
        && func_type(&a.ty, &b.ty)
        && opt_eq(&a.body, &b.body, block)
}
// }}}

/// Compares two possibly absent nodes: two absent nodes are equal, a present
/// node never equals an absent one, and nodes of different categories never
/// equal each other.
pub fn equal(a: Option<Node>, b: Option<Node>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Node::Expr(a)), Some(Node::Expr(b))) => equal_expr(a, b),
        (Some(Node::Stmt(a)), Some(Node::Stmt(b))) => equal_stmt(a, b),
        (Some(Node::Decl(a)), Some(Node::Decl(b))) => equal_decl(a, b),
        _ => false,
    }
}

pub fn equal_expr(a: &Expr, b: &Expr) -> bool {
    match a {
        Expr::Bad => false,

        Expr::Ident(a) => matches!(b, Expr::Ident(b) if a == b),
        Expr::BasicLit(a) => matches!(b, Expr::BasicLit(b) if a == b),

        Expr::Ellipsis(elt) => {
            let Expr::Ellipsis(b_elt) = b else {
                return false;
            };
            opt_eq(elt, b_elt, boxed_expr)
        }

        Expr::FuncLit { ty, body } => {
            let Expr::FuncLit { ty: b_ty, body: b_body } = b else {
                return false;
            };
            func_type(ty, b_ty) && block(body, b_body)
        }

        Expr::CompositeLit { ty, elts } => {
            let Expr::CompositeLit { ty: b_ty, elts: b_elts } = b else {
                return false;
            };
            opt_eq(ty, b_ty, boxed_expr) && exprs(elts, b_elts)
        }

        Expr::Paren(x) => matches!(b, Expr::Paren(b_x) if equal_expr(x, b_x)),

        Expr::Selector { x, sel } => {
            let Expr::Selector { x: b_x, sel: b_sel } = b else {
                return false;
            };
            equal_expr(x, b_x) && sel == b_sel
        }

        Expr::Index { x, index } => {
            let Expr::Index { x: b_x, index: b_index } = b else {
                return false;
            };
            equal_expr(x, b_x) && equal_expr(index, b_index)
        }

        Expr::Slice {
            x,
            low,
            high,
            max,
            slice3,
        } => {
            let Expr::Slice {
                x: b_x,
                low: b_low,
                high: b_high,
                max: b_max,
                slice3: b_slice3,
            } = b
            else {
                return false;
            };
            equal_expr(x, b_x)
                && opt_eq(low, b_low, boxed_expr)
                && opt_eq(high, b_high, boxed_expr)
                && opt_eq(max, b_max, boxed_expr)
                && slice3 == b_slice3
        }

        Expr::TypeAssert { x, ty } => {
            let Expr::TypeAssert { x: b_x, ty: b_ty } = b else {
                return false;
            };
            equal_expr(x, b_x) && opt_eq(ty, b_ty, boxed_expr)
        }

        Expr::Call { fun, args, spread } => {
            let Expr::Call {
                fun: b_fun,
                args: b_args,
                spread: b_spread,
            } = b
            else {
                return false;
            };
            equal_expr(fun, b_fun) && exprs(args, b_args) && spread == b_spread
        }

        Expr::Star(x) => matches!(b, Expr::Star(b_x) if equal_expr(x, b_x)),

        Expr::Unary { op, x } => {
            let Expr::Unary { op: b_op, x: b_x } = b else {
                return false;
            };
            op == b_op && equal_expr(x, b_x)
        }

        Expr::Binary { op, x, y } => {
            let Expr::Binary {
                op: b_op,
                x: b_x,
                y: b_y,
            } = b
            else {
                return false;
            };
            op == b_op && equal_expr(x, b_x) && equal_expr(y, b_y)
        }

        Expr::KeyValue { key, value } => {
            let Expr::KeyValue {
                key: b_key,
                value: b_value,
            } = b
            else {
                return false;
            };
            equal_expr(key, b_key) && equal_expr(value, b_value)
        }

        Expr::ArrayType { len, elt } => {
            let Expr::ArrayType { len: b_len, elt: b_elt } = b else {
                return false;
            };
            equal_expr(len, b_len) && equal_expr(elt, b_elt)
        }

        Expr::SliceType(elt) => matches!(b, Expr::SliceType(b_elt) if equal_expr(elt, b_elt)),

        Expr::StructType(a) => matches!(b, Expr::StructType(b) if fields(a, b)),
        Expr::FuncType(a) => matches!(b, Expr::FuncType(b) if func_type(a, b)),
        Expr::InterfaceType(a) => matches!(b, Expr::InterfaceType(b) if fields(a, b)),

        Expr::MapType { key, value } => {
            let Expr::MapType {
                key: b_key,
                value: b_value,
            } = b
            else {
                return false;
            };
            equal_expr(key, b_key) && equal_expr(value, b_value)
        }

        Expr::ChanType { dir, value } => {
            let Expr::ChanType {
                dir: b_dir,
                value: b_value,
            } = b
            else {
                return false;
            };
            dir == b_dir && equal_expr(value, b_value)
        }
    }
}

pub fn equal_stmt(a: &Stmt, b: &Stmt) -> bool {
    match a {
        Stmt::Bad => false,

        Stmt::Decl(a) => matches!(b, Stmt::Decl(b) if gen_decl(a, b)),
        Stmt::Empty => matches!(b, Stmt::Empty),

        Stmt::Labeled { label, stmt } => {
            let Stmt::Labeled {
                label: b_label,
                stmt: b_stmt,
            } = b
            else {
                return false;
            };
            label == b_label && equal_stmt(stmt, b_stmt)
        }

        Stmt::Expr(x) => matches!(b, Stmt::Expr(b_x) if equal_expr(x, b_x)),

        Stmt::Send { chan, value } => {
            let Stmt::Send {
                chan: b_chan,
                value: b_value,
            } = b
            else {
                return false;
            };
            equal_expr(chan, b_chan) && equal_expr(value, b_value)
        }

        Stmt::IncDec { x, op } => {
            let Stmt::IncDec { x: b_x, op: b_op } = b else {
                return false;
            };
            op == b_op && equal_expr(x, b_x)
        }

        Stmt::Assign { lhs, op, rhs } => {
            let Stmt::Assign {
                lhs: b_lhs,
                op: b_op,
                rhs: b_rhs,
            } = b
            else {
                return false;
            };
            op == b_op && exprs(lhs, b_lhs) && exprs(rhs, b_rhs)
        }

        Stmt::Go(call) => matches!(b, Stmt::Go(b_call) if equal_expr(call, b_call)),
        Stmt::Defer(call) => matches!(b, Stmt::Defer(b_call) if equal_expr(call, b_call)),
        Stmt::Return(results) => matches!(b, Stmt::Return(b_results) if exprs(results, b_results)),

        Stmt::Branch { kind, label } => {
            let Stmt::Branch {
                kind: b_kind,
                label: b_label,
            } = b
            else {
                return false;
            };
            kind == b_kind && label == b_label
        }

        Stmt::Block(a) => matches!(b, Stmt::Block(b) if block(a, b)),

        Stmt::If {
            init,
            cond,
            body,
            els,
        } => {
            let Stmt::If {
                init: b_init,
                cond: b_cond,
                body: b_body,
                els: b_els,
            } = b
            else {
                return false;
            };
            opt_eq(init, b_init, boxed_stmt)
                && equal_expr(cond, b_cond)
                && block(body, b_body)
                && opt_eq(els, b_els, boxed_stmt)
        }

        Stmt::Switch { init, tag, body } => {
            let Stmt::Switch {
                init: b_init,
                tag: b_tag,
                body: b_body,
            } = b
            else {
                return false;
            };
            opt_eq(init, b_init, boxed_stmt)
                && opt_eq(tag, b_tag, equal_expr)
                && slice_eq(body, b_body, case_clause)
        }

        Stmt::TypeSwitch { init, assign, body } => {
            let Stmt::TypeSwitch {
                init: b_init,
                assign: b_assign,
                body: b_body,
            } = b
            else {
                return false;
            };
            opt_eq(init, b_init, boxed_stmt)
                && equal_stmt(assign, b_assign)
                && slice_eq(body, b_body, case_clause)
        }

        Stmt::Select(clauses) => {
            matches!(b, Stmt::Select(b_clauses) if slice_eq(clauses, b_clauses, comm_clause))
        }

        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            let Stmt::For {
                init: b_init,
                cond: b_cond,
                post: b_post,
                body: b_body,
            } = b
            else {
                return false;
            };
            opt_eq(init, b_init, boxed_stmt)
                && opt_eq(cond, b_cond, equal_expr)
                && opt_eq(post, b_post, boxed_stmt)
                && block(body, b_body)
        }

        Stmt::Range {
            key,
            value,
            tok,
            x,
            body,
        } => {
            let Stmt::Range {
                key: b_key,
                value: b_value,
                tok: b_tok,
                x: b_x,
                body: b_body,
            } = b
            else {
                return false;
            };
            tok == b_tok
                && opt_eq(key, b_key, equal_expr)
                && opt_eq(value, b_value, equal_expr)
                && equal_expr(x, b_x)
                && block(body, b_body)
        }
    }
}

pub fn equal_decl(a: &Decl, b: &Decl) -> bool {
    match a {
        Decl::Bad => false,
        Decl::Gen(a) => matches!(b, Decl::Gen(b) if gen_decl(a, b)),
        Decl::Func(a) => matches!(b, Decl::Func(b) if func_decl(a, b)),
    }
}

/// Parses both fragments as expressions first; a fragment that does not parse
/// becomes `Expr::Bad` and so compares unequal.
pub fn equal_expr_str(a: &str, b: &str) -> bool {
    equal_expr(&expr_or_bad(a), &expr_or_bad(b))
}

pub fn equal_stmt_str(a: &str, b: &str) -> bool {
    equal_stmt(&stmt_or_bad(a), &stmt_or_bad(b))
}

pub fn equal_decl_str(a: &str, b: &str) -> bool {
    equal_decl(&decl_or_bad(a), &decl_or_bad(b))
}
