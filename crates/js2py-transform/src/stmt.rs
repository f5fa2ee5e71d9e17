//! Statement lowering.

use js2py_pyast as py;
use swc_common::Spanned;
use swc_ecma_ast as ast;

use crate::error::TransformError;
use crate::expr::unparen;
use crate::kind::{decl_kind, expr_kind, pat_kind, stmt_kind};
use crate::transformer::Transformer;

const DO_WHILE_NOTE: &str = "do/while loop lowered to while; ensure side effects are compatible.";
const FALLTHROUGH_NOTE: &str =
    "switch case falls through to the next case; fallthrough is not preserved.";

/// Holds a switch discriminant that is not safe to evaluate once per case.
const SWITCH_VALUE_NAME: &str = "__switch_value";

impl<'a> Transformer<'a> {
    pub(crate) fn lower_stmt(&mut self, stmt: &ast::Stmt) -> Result<Vec<py::Stmt>, TransformError> {
        match stmt {
            // Python has no bare blocks; bindings already live in the enclosing function
            ast::Stmt::Block(block) => self.lower_body(&block.stmts),
            ast::Stmt::Empty(_) => Ok(Vec::new()),
            ast::Stmt::Decl(decl) => self.lower_decl(decl),
            ast::Stmt::Expr(expr_stmt) => self.lower_expr_stmt(&expr_stmt.expr),
            ast::Stmt::Return(ret) => {
                let value = match &ret.arg {
                    Some(arg) => Some(self.transform_expr(arg)?),
                    None => None,
                };
                Ok(vec![py::Stmt::Return(value)])
            }
            ast::Stmt::If(if_stmt) => {
                let test = self.transform_expr(&if_stmt.test)?;
                let body = self.transform_stmt(&if_stmt.cons)?;
                let orelse = match &if_stmt.alt {
                    Some(alt) => self.transform_stmt(alt)?,
                    None => Vec::new(),
                };
                Ok(vec![py::Stmt::If { test, body, orelse }])
            }
            ast::Stmt::For(for_stmt) => self.lower_for(for_stmt),
            ast::Stmt::ForIn(for_in) => {
                let stmt = self.lower_for_each(&for_in.left, &for_in.right, &for_in.body)?;
                Ok(vec![stmt])
            }
            ast::Stmt::ForOf(for_of) if !for_of.is_await => {
                let stmt = self.lower_for_each(&for_of.left, &for_of.right, &for_of.body)?;
                Ok(vec![stmt])
            }
            ast::Stmt::While(while_stmt) => {
                let test = self.transform_expr(&while_stmt.test)?;
                let body = self.transform_stmt(&while_stmt.body)?;
                Ok(vec![py::Stmt::While { test, body }])
            }
            ast::Stmt::DoWhile(do_while) => self.lower_do_while(do_while),
            ast::Stmt::Switch(switch) => self.lower_switch(switch),
            ast::Stmt::Try(try_stmt) => self.lower_try(try_stmt),
            ast::Stmt::Throw(throw) => {
                let value = self.transform_expr(&throw.arg)?;
                Ok(vec![py::Stmt::Raise(Some(value))])
            }
            ast::Stmt::Break(brk) if brk.label.is_none() => Ok(vec![py::Stmt::Break]),
            ast::Stmt::Continue(cont) if cont.label.is_none() => Ok(vec![py::Stmt::Continue]),
            other => Err(self.unsupported_statement(stmt_kind(other), other.span())),
        }
    }

    pub(crate) fn lower_decl(&mut self, decl: &ast::Decl) -> Result<Vec<py::Stmt>, TransformError> {
        match decl {
            ast::Decl::Fn(fn_decl) => {
                let def = self.lower_function(&fn_decl.ident.sym, &fn_decl.function)?;
                Ok(vec![py::Stmt::FunctionDef(def)])
            }
            ast::Decl::Class(class_decl) => {
                let def = self.lower_class(&class_decl.ident.sym, &class_decl.class)?;
                Ok(vec![py::Stmt::ClassDef(def)])
            }
            ast::Decl::Var(var_decl) => self.lower_var_decl(var_decl),
            other => Err(self.unsupported_statement(decl_kind(other), other.span())),
        }
    }

    fn lower_var_decl(&mut self, var_decl: &ast::VarDecl) -> Result<Vec<py::Stmt>, TransformError> {
        if var_decl.decls.is_empty() {
            return Err(self.error("Empty VariableDeclaration.", "VariableDeclaration", var_decl.span));
        }

        let mut stmts = Vec::with_capacity(var_decl.decls.len());
        for declarator in &var_decl.decls {
            stmts.push(self.lower_declarator(declarator)?);
        }
        Ok(stmts)
    }

    /// `var f = () => ...` and friends become named definitions; every
    /// other declarator is a plain assignment.
    fn lower_declarator(&mut self, declarator: &ast::VarDeclarator) -> Result<py::Stmt, TransformError> {
        let name = match &declarator.name {
            ast::Pat::Ident(binding) => binding.id.sym.to_string(),
            other => {
                return Err(self.error(
                    "Unsupported assignment target.",
                    pat_kind(other),
                    other.span(),
                ))
            }
        };

        let init = declarator.init.as_deref().map(unparen);
        log::trace!("lowering declarator {}", name);

        match init {
            Some(ast::Expr::Arrow(arrow)) => Ok(py::Stmt::FunctionDef(self.lower_arrow_def(&name, arrow)?)),
            Some(ast::Expr::Fn(fn_expr)) => {
                Ok(py::Stmt::FunctionDef(self.lower_function(&name, &fn_expr.function)?))
            }
            Some(ast::Expr::Class(class_expr)) => {
                Ok(py::Stmt::ClassDef(self.lower_class(&name, &class_expr.class)?))
            }
            Some(value) => {
                let value = self.transform_expr(value)?;
                Ok(py::Stmt::assign(py::Expr::name(name), value))
            }
            None => Ok(py::Stmt::assign(py::Expr::name(name), py::Expr::none())),
        }
    }

    /// Assignments, updates and sequences only exist as statements in Python.
    fn lower_expr_stmt(&mut self, expr: &ast::Expr) -> Result<Vec<py::Stmt>, TransformError> {
        match unparen(expr) {
            ast::Expr::Assign(assign) => Ok(vec![self.lower_assign(assign)?]),
            ast::Expr::Update(update) => Ok(vec![self.lower_update(update)?]),
            ast::Expr::Seq(seq) => {
                let mut stmts = Vec::new();
                for item in &seq.exprs {
                    stmts.extend(self.lower_expr_stmt(item)?);
                }
                Ok(stmts)
            }
            other => Ok(vec![py::Stmt::expr(self.transform_expr(other)?)]),
        }
    }

    fn lower_assign(&mut self, assign: &ast::AssignExpr) -> Result<py::Stmt, TransformError> {
        let target = self.lower_assign_target(&assign.left)?;
        let op = match assign.op {
            ast::AssignOp::Assign => {
                // `a = b = c` becomes one multi-target assignment
                let mut targets = vec![target];
                let mut value = &*assign.right;
                while let ast::Expr::Assign(inner) = unparen(value) {
                    if inner.op != ast::AssignOp::Assign {
                        break;
                    }
                    targets.push(self.lower_assign_target(&inner.left)?);
                    value = &inner.right;
                }
                let value = self.transform_expr(value)?;
                return Ok(py::Stmt::Assign { targets, value });
            }
            ast::AssignOp::AddAssign => py::Operator::Add,
            ast::AssignOp::SubAssign => py::Operator::Sub,
            ast::AssignOp::MulAssign => py::Operator::Mult,
            ast::AssignOp::DivAssign => py::Operator::Div,
            other => {
                return Err(self.error(
                    format!("Assignment operator '{}' is not supported.", other),
                    "AssignmentExpression",
                    assign.span,
                ))
            }
        };
        let value = self.transform_expr(&assign.right)?;
        Ok(py::Stmt::AugAssign { target, op, value })
    }

    fn lower_assign_target(&mut self, target: &ast::AssignTarget) -> Result<py::Expr, TransformError> {
        match target {
            ast::AssignTarget::Simple(ast::SimpleAssignTarget::Ident(binding)) => {
                Ok(py::Expr::name(&*binding.id.sym))
            }
            ast::AssignTarget::Simple(ast::SimpleAssignTarget::Member(member)) => {
                self.lower_member(member)
            }
            ast::AssignTarget::Simple(ast::SimpleAssignTarget::Paren(paren)) => {
                let target = self.transform_expr(&paren.expr)?;
                if target.is_store_target() {
                    Ok(target)
                } else {
                    Err(self.error("Unsupported assignment target.", "ParenthesizedExpression", paren.span))
                }
            }
            ast::AssignTarget::Simple(other) => {
                Err(self.error("Unsupported assignment target.", "Expression", other.span()))
            }
            ast::AssignTarget::Pat(pat) => {
                let kind = match pat {
                    ast::AssignTargetPat::Array(_) => "ArrayPattern",
                    ast::AssignTargetPat::Object(_) => "ObjectPattern",
                    ast::AssignTargetPat::Invalid(_) => "Invalid",
                };
                Err(self.error("Unsupported assignment target.", kind, pat.span()))
            }
        }
    }

    fn lower_update(&mut self, update: &ast::UpdateExpr) -> Result<py::Stmt, TransformError> {
        let target = self.transform_expr(&update.arg)?;
        if !target.is_store_target() {
            return Err(self.error("Unsupported assignment target.", "UpdateExpression", update.span));
        }
        let op = match update.op {
            ast::UpdateOp::PlusPlus => py::Operator::Add,
            ast::UpdateOp::MinusMinus => py::Operator::Sub,
        };
        Ok(py::Stmt::AugAssign {
            target,
            op,
            value: py::Expr::int(1),
        })
    }

    /// `for (init; test; update) body` becomes `init; while test: body; update`.
    fn lower_for(&mut self, for_stmt: &ast::ForStmt) -> Result<Vec<py::Stmt>, TransformError> {
        let mut stmts = match &for_stmt.init {
            Some(ast::VarDeclOrExpr::VarDecl(var_decl)) => self.lower_var_decl(var_decl)?,
            Some(ast::VarDeclOrExpr::Expr(expr)) => self.lower_expr_stmt(expr)?,
            None => Vec::new(),
        };

        let test = match &for_stmt.test {
            Some(test) => self.transform_expr(test)?,
            None => py::Expr::bool(true),
        };

        let mut body = self.transform_stmt(&for_stmt.body)?;
        if let Some(update) = &for_stmt.update {
            let update = self.lower_expr_stmt(update)?;
            // `continue` must still run the update before the next test
            insert_before_continue(&mut body, &update);
            body.extend(update);
        }

        stmts.push(py::Stmt::While { test, body });
        Ok(stmts)
    }

    fn lower_for_each(
        &mut self,
        left: &ast::ForHead,
        right: &ast::Expr,
        body: &ast::Stmt,
    ) -> Result<py::Stmt, TransformError> {
        let target = match left {
            ast::ForHead::VarDecl(var_decl) => match var_decl.decls.as_slice() {
                [declarator] => match &declarator.name {
                    ast::Pat::Ident(binding) => py::Expr::name(&*binding.id.sym),
                    other => {
                        return Err(self.error("Unsupported for-loop target.", pat_kind(other), other.span()))
                    }
                },
                _ => {
                    return Err(self.error(
                        "For-in/of supports a single declarator.",
                        "VariableDeclaration",
                        var_decl.span,
                    ))
                }
            },
            ast::ForHead::Pat(pat) => match &**pat {
                ast::Pat::Ident(binding) => py::Expr::name(&*binding.id.sym),
                ast::Pat::Expr(expr) => match unparen(expr) {
                    ast::Expr::Member(member) => self.lower_member(member)?,
                    other => {
                        return Err(self.error(
                            "Unsupported for-loop target.",
                            expr_kind(other),
                            other.span(),
                        ))
                    }
                },
                other => {
                    return Err(self.error("Unsupported for-loop target.", pat_kind(other), other.span()))
                }
            },
            ast::ForHead::UsingDecl(using) => {
                return Err(self.error("Unsupported for-loop target.", "UsingDeclaration", using.span))
            }
        };

        let iter = self.transform_expr(right)?;
        let body = self.transform_stmt(body)?;
        Ok(py::Stmt::For { target, iter, body })
    }

    /// Body once, then `while test: body`.
    fn lower_do_while(&mut self, do_while: &ast::DoWhileStmt) -> Result<Vec<py::Stmt>, TransformError> {
        self.note(DO_WHILE_NOTE, do_while.span);

        let body = self.transform_stmt(&do_while.body)?;
        // The unrolled copy sits outside any loop
        if contains_loop_control(&body, &|stmt| matches!(stmt, py::Stmt::Break | py::Stmt::Continue)) {
            return Err(self.error(
                "break/continue directly inside a do/while body is not supported.",
                "DoWhileStatement",
                do_while.span,
            ));
        }
        let test = self.transform_expr(&do_while.test)?;

        let mut stmts = body.clone();
        stmts.push(py::Stmt::While { test, body });
        Ok(stmts)
    }

    /// An `if`/`elif` chain over `discriminant == test`, `default` last.
    /// A discriminant other than a name or constant is evaluated once into
    /// a temporary.
    fn lower_switch(&mut self, switch: &ast::SwitchStmt) -> Result<Vec<py::Stmt>, TransformError> {
        let mut stmts = Vec::new();
        let mut discriminant = self.transform_expr(&switch.discriminant)?;
        if !switch.cases.is_empty() && !matches!(discriminant, py::Expr::Name(_) | py::Expr::Constant(_)) {
            stmts.push(py::Stmt::assign(py::Expr::name(SWITCH_VALUE_NAME), discriminant));
            discriminant = py::Expr::name(SWITCH_VALUE_NAME);
        }
        let last = switch.cases.len().saturating_sub(1);

        let mut branches: Vec<(py::Expr, Vec<py::Stmt>)> = Vec::new();
        let mut default_body: Option<Vec<py::Stmt>> = None;
        // Tests of empty cases that share the next case's body
        let mut pending_tests: Vec<py::Expr> = Vec::new();
        let mut pending_default = false;

        for (index, case) in switch.cases.iter().enumerate() {
            let cons = flatten_blocks(&case.cons);
            let test = match &case.test {
                Some(test) => Some(py::Expr::compare(
                    discriminant.clone(),
                    py::CmpOp::Eq,
                    self.transform_expr(test)?,
                )),
                None => None,
            };

            if cons.is_empty() && index < last {
                match test {
                    Some(test) => pending_tests.push(test),
                    None => pending_default = true,
                }
                continue;
            }

            if index < last && !cons.is_empty() && !cons.iter().any(|stmt| ends_case(stmt)) {
                self.note(FALLTHROUGH_NOTE, case.span);
            }

            let mut body = Vec::new();
            for stmt in cons {
                if matches!(stmt, ast::Stmt::Break(brk) if brk.label.is_none()) {
                    break;
                }
                body.extend(self.transform_stmt(stmt)?);
            }
            // The if/elif chain has no loop for a nested break to leave
            if contains_loop_control(&body, &|stmt| matches!(stmt, py::Stmt::Break)) {
                return Err(self.error(
                    "break nested inside a switch case is not supported.",
                    "SwitchCase",
                    case.span,
                ));
            }

            if pending_default {
                default_body = Some(body.clone());
                pending_default = false;
            }
            match test {
                Some(test) => {
                    pending_tests.push(test);
                    let test = join_tests(std::mem::take(&mut pending_tests));
                    branches.push((test, body));
                }
                None => {
                    // Grouped tests reach the default body anyway
                    pending_tests.clear();
                    default_body = Some(body);
                }
            }
        }

        let mut chain = default_body.unwrap_or_default();
        for (test, body) in branches.into_iter().rev() {
            chain = vec![py::Stmt::If {
                test,
                body,
                orelse: chain,
            }];
        }
        stmts.extend(chain);
        Ok(stmts)
    }

    fn lower_try(&mut self, try_stmt: &ast::TryStmt) -> Result<Vec<py::Stmt>, TransformError> {
        let body = self.lower_body(&try_stmt.block.stmts)?;

        let mut handlers = Vec::new();
        if let Some(handler) = &try_stmt.handler {
            let name = match &handler.param {
                Some(ast::Pat::Ident(binding)) => Some(binding.id.sym.to_string()),
                Some(other) => {
                    return Err(self.error(
                        "Catch parameter must be an Identifier.",
                        pat_kind(other),
                        other.span(),
                    ))
                }
                None => None,
            };
            let type_ = name.as_ref().map(|_| py::Expr::name("Exception"));
            let body = self.lower_body(&handler.body.stmts)?;
            handlers.push(py::ExceptHandler { type_, name, body });
        }

        let finalbody = match &try_stmt.finalizer {
            Some(finalizer) => self.lower_body(&finalizer.stmts)?,
            None => Vec::new(),
        };

        Ok(vec![py::Stmt::Try {
            body,
            handlers,
            finalbody,
        }])
    }
}

/// Case bodies written as `case 1: { ...; break; }` expose their `break`.
fn flatten_blocks(stmts: &[ast::Stmt]) -> Vec<&ast::Stmt> {
    let mut flat = Vec::new();
    for stmt in stmts {
        match stmt {
            ast::Stmt::Block(block) => flat.extend(flatten_blocks(&block.stmts)),
            other => flat.push(other),
        }
    }
    flat
}

/// Control never reaches the next case past this statement.
fn ends_case(stmt: &ast::Stmt) -> bool {
    matches!(
        stmt,
        ast::Stmt::Break(_) | ast::Stmt::Return(_) | ast::Stmt::Throw(_) | ast::Stmt::Continue(_)
    )
}

fn join_tests(mut tests: Vec<py::Expr>) -> py::Expr {
    if tests.len() == 1 {
        if let Some(test) = tests.pop() {
            return test;
        }
    }
    py::Expr::BoolOp {
        op: py::BoolOperator::Or,
        values: tests,
    }
}

/// Looks for a statement bound to the innermost enclosing loop, skipping
/// nested loops and definitions.
fn contains_loop_control(body: &[py::Stmt], is_control: &dyn Fn(&py::Stmt) -> bool) -> bool {
    body.iter().any(|stmt| match stmt {
        py::Stmt::If { body, orelse, .. } => {
            contains_loop_control(body, is_control) || contains_loop_control(orelse, is_control)
        }
        py::Stmt::Try {
            body,
            handlers,
            finalbody,
        } => {
            contains_loop_control(body, is_control)
                || handlers
                    .iter()
                    .any(|handler| contains_loop_control(&handler.body, is_control))
                || contains_loop_control(finalbody, is_control)
        }
        other => is_control(other),
    })
}

/// Put a copy of `update` in front of every `continue` that targets the
/// loop owning `body`.
fn insert_before_continue(body: &mut Vec<py::Stmt>, update: &[py::Stmt]) {
    let mut index = 0;
    while index < body.len() {
        if matches!(body[index], py::Stmt::Continue) {
            body.splice(index..index, update.iter().cloned());
            index += update.len() + 1;
            continue;
        }
        match &mut body[index] {
            py::Stmt::If { body: inner, orelse, .. } => {
                insert_before_continue(inner, update);
                insert_before_continue(orelse, update);
            }
            py::Stmt::Try {
                body: inner,
                handlers,
                finalbody,
            } => {
                insert_before_continue(inner, update);
                for handler in handlers.iter_mut() {
                    insert_before_continue(&mut handler.body, update);
                }
                insert_before_continue(finalbody, update);
            }
            _ => {}
        }
        index += 1;
    }
}
