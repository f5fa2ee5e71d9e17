//! Functions, arrows and their parameter lists.

use js2py_pyast as py;
use swc_common::{Span, Spanned};
use swc_ecma_ast as ast;

use crate::error::TransformError;
use crate::kind::pat_kind;
use crate::transformer::Transformer;

impl<'a> Transformer<'a> {
    pub(crate) fn lower_function(
        &mut self,
        name: &str,
        function: &ast::Function,
    ) -> Result<py::FunctionDef, TransformError> {
        self.check_plain_function(function.is_async, function.is_generator, function.span)?;

        let args = self.lower_parameters(function.params.iter().map(|param| &param.pat))?;
        let body = match &function.body {
            Some(body) => self.lower_body(&body.stmts)?,
            None => Vec::new(),
        };

        Ok(py::FunctionDef {
            name: name.to_string(),
            args,
            body,
            decorators: Vec::new(),
        })
    }

    /// `const name = (...) => body` as a `def`.
    pub(crate) fn lower_arrow_def(
        &mut self,
        name: &str,
        arrow: &ast::ArrowExpr,
    ) -> Result<py::FunctionDef, TransformError> {
        self.check_plain_function(arrow.is_async, arrow.is_generator, arrow.span)?;

        let args = self.lower_parameters(arrow.params.iter())?;
        let body = match &*arrow.body {
            ast::BlockStmtOrExpr::BlockStmt(block) => self.lower_body(&block.stmts)?,
            ast::BlockStmtOrExpr::Expr(expr) => vec![py::Stmt::Return(Some(self.transform_expr(expr)?))],
        };

        Ok(py::FunctionDef {
            name: name.to_string(),
            args,
            body,
            decorators: Vec::new(),
        })
    }

    /// An arrow anywhere else must be a single expression.
    pub(crate) fn lower_lambda(&mut self, arrow: &ast::ArrowExpr) -> Result<py::Expr, TransformError> {
        self.check_plain_function(arrow.is_async, arrow.is_generator, arrow.span)?;

        let body = match &*arrow.body {
            ast::BlockStmtOrExpr::Expr(expr) => expr,
            ast::BlockStmtOrExpr::BlockStmt(_) => {
                return Err(self.error(
                    "Arrow functions with block bodies are not supported in expression context.",
                    "ArrowFunctionExpression",
                    arrow.span,
                ))
            }
        };

        let args = self.lower_parameters(arrow.params.iter())?;
        let body = self.transform_expr(body)?;
        Ok(py::Expr::Lambda {
            args,
            body: Box::new(body),
        })
    }

    fn check_plain_function(
        &self,
        is_async: bool,
        is_generator: bool,
        span: Span,
    ) -> Result<(), TransformError> {
        if is_async {
            return Err(self.error("Async functions are not supported.", "FunctionExpression", span));
        }
        if is_generator {
            return Err(self.error("Generator functions are not supported.", "FunctionExpression", span));
        }
        Ok(())
    }

    /// Lower a JavaScript parameter list.
    ///
    /// Python rejects a parameter without a default after one with a
    /// default, so that ordering is an error here rather than something to
    /// reorder. Destructuring patterns whose leaves are all plain
    /// identifiers flatten into positional parameters.
    pub(crate) fn lower_parameters<'p>(
        &mut self,
        params: impl IntoIterator<Item = &'p ast::Pat>,
    ) -> Result<py::Arguments, TransformError> {
        let mut arguments = py::Arguments::default();

        for pat in params {
            match pat {
                ast::Pat::Ident(binding) => {
                    self.push_positional(&mut arguments, &binding.id.sym, binding.id.span)?
                }
                ast::Pat::Assign(assign) => {
                    let binding = match &*assign.left {
                        ast::Pat::Ident(binding) => binding,
                        other => return Err(self.unsupported_param(pat_kind(other), other.span())),
                    };
                    self.check_after_rest(&arguments, assign.span)?;
                    let default = self.transform_expr(&assign.right)?;
                    arguments.args.push(py::Arg::new(&*binding.id.sym));
                    arguments.defaults.push(default);
                }
                ast::Pat::Rest(rest) => {
                    if arguments.vararg.is_some() {
                        return Err(self.error(
                            "Multiple rest parameters are not supported.",
                            "RestElement",
                            rest.span,
                        ));
                    }
                    match &*rest.arg {
                        ast::Pat::Ident(binding) => {
                            arguments.vararg = Some(py::Arg::new(&*binding.id.sym))
                        }
                        other => {
                            return Err(self.error(
                                "Rest parameter must be an identifier.",
                                pat_kind(other),
                                other.span(),
                            ))
                        }
                    }
                }
                ast::Pat::Object(_) | ast::Pat::Array(_) => {
                    let mut leaves = Vec::new();
                    if !collect_identifier_leaves(pat, &mut leaves) {
                        return Err(self.unsupported_param(pat_kind(pat), pat.span()));
                    }
                    for (name, span) in leaves {
                        self.push_positional(&mut arguments, name, span)?;
                    }
                }
                other => return Err(self.unsupported_param(pat_kind(other), other.span())),
            }
        }

        Ok(arguments)
    }

    fn push_positional(
        &self,
        arguments: &mut py::Arguments,
        name: &str,
        span: Span,
    ) -> Result<(), TransformError> {
        self.check_after_rest(arguments, span)?;
        if !arguments.defaults.is_empty() {
            return Err(self.error(
                "Parameters without defaults cannot follow parameters with defaults.",
                "Identifier",
                span,
            ));
        }
        arguments.args.push(py::Arg::new(name));
        Ok(())
    }

    fn check_after_rest(&self, arguments: &py::Arguments, span: Span) -> Result<(), TransformError> {
        if arguments.vararg.is_some() {
            return Err(self.error("Parameters cannot follow a rest parameter.", "Identifier", span));
        }
        Ok(())
    }

    fn unsupported_param(&self, kind: &'static str, span: Span) -> TransformError {
        self.error(format!("Unsupported parameter pattern: {}", kind), kind, span)
    }
}

/// Collect the leaves of a pattern built only from identifiers. Defaults,
/// holes and rest elements make the pattern non-flat.
fn collect_identifier_leaves<'p>(pat: &'p ast::Pat, leaves: &mut Vec<(&'p str, Span)>) -> bool {
    match pat {
        ast::Pat::Ident(binding) => {
            leaves.push((&*binding.id.sym, binding.id.span));
            true
        }
        ast::Pat::Array(array) => array.elems.iter().all(|elem| match elem {
            Some(elem) => collect_identifier_leaves(elem, leaves),
            None => false,
        }),
        ast::Pat::Object(object) => object.props.iter().all(|prop| match prop {
            ast::ObjectPatProp::KeyValue(kv) => collect_identifier_leaves(&kv.value, leaves),
            ast::ObjectPatProp::Assign(assign) if assign.value.is_none() => {
                leaves.push((&*assign.key.id.sym, assign.key.id.span));
                true
            }
            _ => false,
        }),
        _ => false,
    }
}
