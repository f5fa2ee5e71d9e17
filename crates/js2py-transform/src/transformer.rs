//! Entry points of the lowering pass.

use js2py_pyast as py;
use swc_common::{Span, Spanned};
use swc_ecma_ast as ast;

use crate::context::TransformContext;
use crate::error::TransformError;
use crate::kind::{expr_kind, stmt_kind};

/// Lowers an SWC program into a Python module.
///
/// The per-kind rules live in `stmt`, `expr`, `function`, `class` and
/// `module_decl`; every recursive step goes back through
/// [`Transformer::transform_stmt`] or [`Transformer::transform_expr`] so the
/// nesting limit applies uniformly.
pub struct Transformer<'a> {
    ctx: TransformContext<'a>,
}

impl<'a> Transformer<'a> {
    pub fn new(context: TransformContext<'a>) -> Self {
        Self { ctx: context }
    }

    pub fn context(&self) -> &TransformContext<'a> {
        &self.ctx
    }

    pub fn diagnostics(&self) -> &[String] {
        self.ctx.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.ctx.into_diagnostics()
    }

    pub fn transform_program(&mut self, program: &ast::Program) -> Result<py::Module, TransformError> {
        log::debug!("transforming {}", self.ctx.source_name());

        let mut body = Vec::new();
        match program {
            ast::Program::Module(module) => {
                for item in &module.body {
                    match item {
                        ast::ModuleItem::Stmt(stmt) => body.extend(self.transform_stmt(stmt)?),
                        ast::ModuleItem::ModuleDecl(decl) => {
                            body.extend(self.lower_module_decl(decl)?)
                        }
                    }
                }
            }
            ast::Program::Script(script) => {
                for stmt in &script.body {
                    body.extend(self.transform_stmt(stmt)?);
                }
            }
        }

        log::debug!(
            "transformed {}: {} statement(s), {} diagnostic(s)",
            self.ctx.source_name(),
            body.len(),
            self.ctx.diagnostics().len()
        );
        Ok(py::Module::new(body))
    }

    pub fn transform_stmt(&mut self, stmt: &ast::Stmt) -> Result<Vec<py::Stmt>, TransformError> {
        self.ctx.enter(stmt_kind(stmt), stmt.span())?;
        let result = self.lower_stmt(stmt);
        self.ctx.leave();
        result
    }

    pub fn transform_expr(&mut self, expr: &ast::Expr) -> Result<py::Expr, TransformError> {
        self.ctx.enter(expr_kind(expr), expr.span())?;
        let result = self.lower_expr(expr);
        self.ctx.leave();
        result
    }

    pub(crate) fn lower_body(&mut self, stmts: &[ast::Stmt]) -> Result<Vec<py::Stmt>, TransformError> {
        let mut body = Vec::new();
        for stmt in stmts {
            body.extend(self.transform_stmt(stmt)?);
        }
        Ok(body)
    }

    pub(crate) fn note(&mut self, message: &str, span: Span) {
        self.ctx.note(message, span);
    }

    pub(crate) fn error(
        &self,
        message: impl Into<String>,
        kind: &'static str,
        span: Span,
    ) -> TransformError {
        self.ctx.error(message, kind, span)
    }

    pub(crate) fn unsupported_statement(&self, kind: &'static str, span: Span) -> TransformError {
        TransformError::unsupported_statement(kind, span, self.ctx.position(span))
    }

    pub(crate) fn unsupported_expression(&self, kind: &'static str, span: Span) -> TransformError {
        TransformError::unsupported_expression(kind, span, self.ctx.position(span))
    }

    /// Text of a string literal. Lone surrogates have no Python spelling.
    pub(crate) fn str_value(&self, s: &ast::Str) -> Result<String, TransformError> {
        s.value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error("String literal contains unpaired surrogates.", "Literal", s.span))
    }
}
