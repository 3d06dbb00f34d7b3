//! Structural equality and s-expression template matching over Go syntax
//! trees.
//!
//! ```
//! use astmatch::{compile, equal_expr_str, expr_or_bad};
//!
//! assert!(!equal_expr_str("x", "(x)"));
//!
//! let pattern = compile("(call f $... 1)").unwrap();
//! assert!(pattern.matches(&expr_or_bad("f(a, b, 1)")));
//! ```

pub mod ast;
pub mod compile;
pub mod equal;
pub mod error;
pub mod lex;
pub mod parse;
pub mod pattern;
pub mod scan;

#[cfg(test)]
mod tests;

pub use compile::{compile, Compiler};
pub use equal::{
    equal, equal_decl, equal_decl_str, equal_expr, equal_expr_str, equal_stmt, equal_stmt_str,
};
pub use error::{CompileError, CompileErrorKind, ParseError};
pub use parse::{
    decl_or_bad, expr_or_bad, parse_decl, parse_expr, parse_file, parse_stmt, stmt_or_bad,
};
pub use pattern::Pattern;
