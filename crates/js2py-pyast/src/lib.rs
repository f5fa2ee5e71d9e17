//! Python syntax tree and source renderer
//!
//! The transformer builds a [`Module`]; [`emit_module`] renders it to
//! Python source with precedence-aware parenthesization, `elif` folding and
//! f-strings, and optionally appends runtime helper snippets.

pub mod ast;
mod emit;
mod module_path;
mod unparse;

pub use ast::*;
pub use emit::{emit_module, EmitOptions, EmitResult};
pub use module_path::module_path;
pub use unparse::{float_literal, string_literal, unparse, unparse_expr};
