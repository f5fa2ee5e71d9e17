//! One-pass scope builder over the SWC syntax tree.
//!
//! The builder matches on the node kinds that open scopes or introduce
//! bindings. Every other kind goes through `walk_stmt_children` /
//! `walk_expr_children`, which recurse into all structural children, so
//! the walk never stops at a construct it has no rule for.

use js2py_diagnostics::{LineIndex, Position};
use swc_common::{Span, Spanned, DUMMY_SP};
use swc_ecma_ast::*;

use crate::issue::{AnalysisIssue, IssueCode};
use crate::scope::{Binding, BindingKind, NodeRef, ScopeId, ScopeTree, ScopeType};

pub(crate) struct ScopeBuilder<'a> {
    tree: ScopeTree,
    current: ScopeId,
    issues: Vec<AnalysisIssue>,
    lines: Option<&'a LineIndex>,
}

impl<'a> ScopeBuilder<'a> {
    pub(crate) fn new(root: NodeRef, lines: Option<&'a LineIndex>) -> Self {
        Self {
            tree: ScopeTree::with_root(root),
            current: ScopeId(0),
            issues: Vec::new(),
            lines,
        }
    }

    pub(crate) fn finish(self) -> (ScopeTree, Vec<AnalysisIssue>) {
        (self.tree, self.issues)
    }

    fn position(&self, span: Span) -> Option<Position> {
        if span == DUMMY_SP {
            return None;
        }
        self.lines.and_then(|lines| lines.position(span.lo.0))
    }

    fn issue(&mut self, code: IssueCode, message: impl Into<String>, span: Span) {
        let issue = AnalysisIssue {
            code,
            message: message.into(),
            position: self.position(span),
            span,
        };
        log::debug!("analysis issue: {}", issue);
        self.issues.push(issue);
    }

    /// Run `f` with a fresh child scope as the current scope.
    fn with_scope(&mut self, scope_type: ScopeType, node: NodeRef, f: impl FnOnce(&mut Self)) {
        let scope = self.tree.create_scope(scope_type, node, self.current);
        let parent = std::mem::replace(&mut self.current, scope);
        f(self);
        self.current = parent;
    }

    /// `var` goes to the nearest function or global scope, everything
    /// else to the current scope.
    fn declare(&mut self, ident: &Ident, kind: BindingKind, node: NodeRef) {
        let target = if kind == BindingKind::Var {
            self.tree.hoisting_target(self.current)
        } else {
            self.current
        };
        let binding = Binding {
            name: ident.sym.to_string(),
            kind,
            position: self.position(ident.span),
            span: ident.span,
            node,
        };
        self.tree.declare(target, binding);
    }

    fn declare_pattern(&mut self, pat: &Pat, kind: BindingKind, node: NodeRef, unsupported: IssueCode) {
        match pat {
            Pat::Ident(binding) => self.declare(&binding.id, kind, node),
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.declare_pattern(elem, kind, node, unsupported);
                }
            }
            Pat::Rest(rest) => self.declare_pattern(&rest.arg, kind, node, unsupported),
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.visit_prop_name(&kv.key);
                            self.declare_pattern(&kv.value, kind, node, unsupported);
                        }
                        ObjectPatProp::Assign(assign) => {
                            self.declare(&assign.key.id, kind, node);
                            if let Some(value) = &assign.value {
                                self.visit_expr(value);
                            }
                        }
                        ObjectPatProp::Rest(rest) => {
                            self.declare_pattern(&rest.arg, kind, node, unsupported)
                        }
                    }
                }
            }
            Pat::Assign(assign) => {
                self.declare_pattern(&assign.left, kind, node, unsupported);
                self.visit_expr(&assign.right);
            }
            Pat::Expr(_) | Pat::Invalid(_) => {
                let message = match unsupported {
                    IssueCode::UnsupportedParamPattern => {
                        format!("Unsupported parameter pattern: {}", pattern_kind(pat))
                    }
                    _ => format!("Unsupported binding pattern: {}", pattern_kind(pat)),
                };
                self.issue(unsupported, message, pat.span());
            }
        }
    }

    fn declare_param(&mut self, pat: &Pat) {
        let node = NodeRef::new(pattern_kind(pat), pat.span());
        self.declare_pattern(
            pat,
            BindingKind::Parameter,
            node,
            IssueCode::UnsupportedParamPattern,
        );
    }

    pub(crate) fn visit_program(&mut self, program: &Program) {
        match program {
            Program::Module(module) => {
                for item in &module.body {
                    match item {
                        ModuleItem::ModuleDecl(decl) => self.visit_module_decl(decl),
                        ModuleItem::Stmt(stmt) => self.visit_stmt(stmt),
                    }
                }
            }
            Program::Script(script) => self.visit_stmts(&script.body),
        }
    }

    fn visit_module_decl(&mut self, decl: &ModuleDecl) {
        match decl {
            ModuleDecl::Import(import) => {
                let node = NodeRef::new("ImportDeclaration", import.span);
                for specifier in &import.specifiers {
                    let local = match specifier {
                        ImportSpecifier::Named(named) => &named.local,
                        ImportSpecifier::Default(default) => &default.local,
                        ImportSpecifier::Namespace(namespace) => &namespace.local,
                    };
                    self.declare(local, BindingKind::Import, node);
                }
            }
            ModuleDecl::ExportDecl(export) => self.visit_decl(&export.decl),
            ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                DefaultDecl::Fn(fn_expr) => {
                    let node = NodeRef::new("FunctionDeclaration", fn_expr.function.span);
                    if let Some(ident) = &fn_expr.ident {
                        self.declare(ident, BindingKind::Function, node);
                    }
                    self.visit_function(&fn_expr.function, node, None);
                }
                DefaultDecl::Class(class_expr) => {
                    if let Some(ident) = &class_expr.ident {
                        let node = NodeRef::new("ClassDeclaration", class_expr.class.span);
                        self.declare(ident, BindingKind::Class, node);
                    }
                    self.visit_class(&class_expr.class, None);
                }
                DefaultDecl::TsInterfaceDecl(_) => {}
            },
            ModuleDecl::ExportDefaultExpr(export) => self.visit_expr(&export.expr),
            // Re-exports and TypeScript-only forms bind nothing
            _ => {}
        }
    }

    fn visit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.visit_block(block),
            Stmt::With(with) => {
                self.issue(
                    IssueCode::WithStatement,
                    "`with` statement changes scope resolution dynamically.",
                    with.span,
                );
                self.visit_expr(&with.obj);
                self.visit_stmt(&with.body);
            }
            Stmt::Try(try_stmt) => {
                self.visit_block(&try_stmt.block);
                if let Some(handler) = &try_stmt.handler {
                    self.visit_catch(handler);
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    self.visit_block(finalizer);
                }
            }
            Stmt::Decl(decl) => self.visit_decl(decl),
            Stmt::For(for_stmt) => {
                match &for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var)) => self.visit_var_decl(var),
                    Some(VarDeclOrExpr::Expr(expr)) => self.visit_expr(expr),
                    None => {}
                }
                if let Some(test) = &for_stmt.test {
                    self.visit_expr(test);
                }
                if let Some(update) = &for_stmt.update {
                    self.visit_expr(update);
                }
                self.visit_stmt(&for_stmt.body);
            }
            Stmt::ForIn(for_in) => {
                self.visit_for_head(&for_in.left);
                self.visit_expr(&for_in.right);
                self.visit_stmt(&for_in.body);
            }
            Stmt::ForOf(for_of) => {
                self.visit_for_head(&for_of.left);
                self.visit_expr(&for_of.right);
                self.visit_stmt(&for_of.body);
            }
            other => self.walk_stmt_children(other),
        }
    }

    fn walk_stmt_children(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr_stmt) => self.visit_expr(&expr_stmt.expr),
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.visit_expr(arg);
                }
            }
            Stmt::Labeled(labeled) => self.visit_stmt(&labeled.body),
            Stmt::If(if_stmt) => {
                self.visit_expr(&if_stmt.test);
                self.visit_stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.visit_stmt(alt);
                }
            }
            Stmt::Switch(switch) => {
                self.visit_expr(&switch.discriminant);
                for case in &switch.cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test);
                    }
                    self.visit_stmts(&case.cons);
                }
            }
            Stmt::Throw(throw) => self.visit_expr(&throw.arg),
            Stmt::While(while_stmt) => {
                self.visit_expr(&while_stmt.test);
                self.visit_stmt(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.visit_stmt(&do_while.body);
                self.visit_expr(&do_while.test);
            }
            // empty, debugger, break, continue
            _ => {}
        }
    }

    fn visit_for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::VarDecl(var) => self.visit_var_decl(var),
            ForHead::UsingDecl(using) => self.visit_declarators(&using.decls, BindingKind::Const),
            ForHead::Pat(pat) => self.walk_pat_expressions(pat),
        }
    }

    fn visit_block(&mut self, block: &BlockStmt) {
        let node = NodeRef::new("BlockStatement", block.span);
        self.with_scope(ScopeType::Block, node, |this| this.visit_stmts(&block.stmts));
    }

    fn visit_catch(&mut self, catch: &CatchClause) {
        let node = NodeRef::new("CatchClause", catch.span);
        self.with_scope(ScopeType::Catch, node, |this| {
            if let Some(param) = &catch.param {
                this.declare_pattern(
                    param,
                    BindingKind::CatchParameter,
                    node,
                    IssueCode::UnsupportedPattern,
                );
            }
            this.visit_stmts(&catch.body.stmts);
        });
    }

    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Fn(fn_decl) => {
                let node = NodeRef::new("FunctionDeclaration", fn_decl.function.span);
                self.declare(&fn_decl.ident, BindingKind::Function, node);
                self.visit_function(&fn_decl.function, node, None);
            }
            Decl::Class(class_decl) => {
                let node = NodeRef::new("ClassDeclaration", class_decl.class.span);
                self.declare(&class_decl.ident, BindingKind::Class, node);
                self.visit_class(&class_decl.class, None);
            }
            Decl::Var(var) => self.visit_var_decl(var),
            Decl::Using(using) => self.visit_declarators(&using.decls, BindingKind::Const),
            // TypeScript declarations have no runtime bindings
            _ => {}
        }
    }

    fn visit_var_decl(&mut self, var: &VarDecl) {
        let kind = match var.kind {
            VarDeclKind::Var => BindingKind::Var,
            VarDeclKind::Let => BindingKind::Let,
            VarDeclKind::Const => BindingKind::Const,
        };
        self.visit_declarators(&var.decls, kind);
    }

    fn visit_declarators(&mut self, decls: &[VarDeclarator], kind: BindingKind) {
        for declarator in decls {
            let node = NodeRef::new("VariableDeclarator", declarator.span);
            self.declare_pattern(&declarator.name, kind, node, IssueCode::UnsupportedPattern);
            if let Some(init) = &declarator.init {
                self.visit_expr(init);
            }
        }
    }

    /// Parameters and the top-level body share the function's scope.
    fn visit_function(&mut self, function: &Function, node: NodeRef, own_name: Option<&Ident>) {
        self.with_scope(ScopeType::Function, node, |this| {
            if let Some(ident) = own_name {
                this.declare(ident, BindingKind::Function, node);
            }
            for param in &function.params {
                this.declare_param(&param.pat);
            }
            if let Some(body) = &function.body {
                this.visit_stmts(&body.stmts);
            }
        });
    }

    fn visit_arrow(&mut self, arrow: &ArrowExpr) {
        let node = NodeRef::new("ArrowFunctionExpression", arrow.span);
        self.with_scope(ScopeType::Function, node, |this| {
            for param in &arrow.params {
                this.declare_param(param);
            }
            match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => this.visit_stmts(&block.stmts),
                BlockStmtOrExpr::Expr(expr) => this.visit_expr(expr),
            }
        });
    }

    fn visit_class(&mut self, class: &Class, own_name: Option<&Ident>) {
        // The heritage clause is evaluated outside the class body
        if let Some(super_class) = &class.super_class {
            self.visit_expr(super_class);
        }
        let node = NodeRef::new("ClassBody", class.span);
        self.with_scope(ScopeType::Class, node, |this| {
            if let Some(ident) = own_name {
                this.declare(ident, BindingKind::Class, NodeRef::new("ClassExpression", class.span));
            }
            for member in &class.body {
                this.visit_class_member(member);
            }
        });
    }

    fn visit_class_member(&mut self, member: &ClassMember) {
        match member {
            ClassMember::Constructor(ctor) => {
                let node = NodeRef::new("MethodDefinition", ctor.span);
                self.with_scope(ScopeType::Function, node, |this| {
                    for param in &ctor.params {
                        if let ParamOrTsParamProp::Param(param) = param {
                            this.declare_param(&param.pat);
                        }
                    }
                    if let Some(body) = &ctor.body {
                        this.visit_stmts(&body.stmts);
                    }
                });
            }
            ClassMember::Method(method) => {
                self.visit_prop_name(&method.key);
                let node = NodeRef::new("MethodDefinition", method.span);
                self.visit_function(&method.function, node, None);
            }
            ClassMember::PrivateMethod(method) => {
                let node = NodeRef::new("MethodDefinition", method.span);
                self.visit_function(&method.function, node, None);
            }
            ClassMember::ClassProp(prop) => {
                self.visit_prop_name(&prop.key);
                if let Some(value) = &prop.value {
                    self.visit_expr(value);
                }
            }
            ClassMember::PrivateProp(prop) => {
                if let Some(value) = &prop.value {
                    self.visit_expr(value);
                }
            }
            ClassMember::AutoAccessor(accessor) => {
                if let Some(value) = &accessor.value {
                    self.visit_expr(value);
                }
            }
            ClassMember::StaticBlock(block) => {
                let node = NodeRef::new("StaticBlock", block.span);
                self.with_scope(ScopeType::Function, node, |this| {
                    this.visit_stmts(&block.body.stmts)
                });
            }
            ClassMember::Empty(_) | ClassMember::TsIndexSignature(_) => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Fn(fn_expr) => {
                let node = NodeRef::new("FunctionExpression", fn_expr.function.span);
                self.visit_function(&fn_expr.function, node, fn_expr.ident.as_ref());
            }
            Expr::Arrow(arrow) => self.visit_arrow(arrow),
            Expr::Class(class_expr) => self.visit_class(&class_expr.class, class_expr.ident.as_ref()),
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &call.callee {
                    if let Expr::Ident(ident) = &**callee {
                        if &*ident.sym == "eval" {
                            self.issue(
                                IssueCode::EvalCall,
                                "Use of eval makes static analysis unreliable.",
                                call.span,
                            );
                        }
                    }
                }
                self.walk_expr_children(expr);
            }
            other => self.walk_expr_children(other),
        }
    }

    fn walk_expr_children(&mut self, expr: &Expr) {
        match expr {
            Expr::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.visit_expr(&elem.expr);
                }
            }
            Expr::Object(object) => {
                for prop in &object.props {
                    self.visit_prop(prop);
                }
            }
            Expr::Unary(unary) => self.visit_expr(&unary.arg),
            Expr::Update(update) => self.visit_expr(&update.arg),
            Expr::Bin(bin) => {
                self.visit_expr(&bin.left);
                self.visit_expr(&bin.right);
            }
            Expr::Assign(assign) => {
                self.visit_assign_target(&assign.left);
                self.visit_expr(&assign.right);
            }
            Expr::Member(member) => self.visit_member(member),
            Expr::SuperProp(super_prop) => {
                if let SuperProp::Computed(computed) = &super_prop.prop {
                    self.visit_expr(&computed.expr);
                }
            }
            Expr::Cond(cond) => {
                self.visit_expr(&cond.test);
                self.visit_expr(&cond.cons);
                self.visit_expr(&cond.alt);
            }
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &call.callee {
                    self.visit_expr(callee);
                }
                self.visit_args(&call.args);
            }
            Expr::New(new) => {
                self.visit_expr(&new.callee);
                if let Some(args) = &new.args {
                    self.visit_args(args);
                }
            }
            Expr::Seq(seq) => {
                for expr in &seq.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Tpl(tpl) => {
                for expr in &tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.visit_expr(&tagged.tag);
                for expr in &tagged.tpl.exprs {
                    self.visit_expr(expr);
                }
            }
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &yield_expr.arg {
                    self.visit_expr(arg);
                }
            }
            Expr::Await(await_expr) => self.visit_expr(&await_expr.arg),
            Expr::Paren(paren) => self.visit_expr(&paren.expr),
            Expr::OptChain(chain) => self.visit_opt_chain(chain),
            Expr::TsAs(ts) => self.visit_expr(&ts.expr),
            Expr::TsNonNull(ts) => self.visit_expr(&ts.expr),
            Expr::TsTypeAssertion(ts) => self.visit_expr(&ts.expr),
            Expr::TsConstAssertion(ts) => self.visit_expr(&ts.expr),
            Expr::TsSatisfies(ts) => self.visit_expr(&ts.expr),
            Expr::TsInstantiation(ts) => self.visit_expr(&ts.expr),
            Expr::Fn(_) | Expr::Arrow(_) | Expr::Class(_) => self.visit_expr(expr),
            // identifiers, literals, `this`, meta properties
            _ => {}
        }
    }

    fn visit_args(&mut self, args: &[ExprOrSpread]) {
        for arg in args {
            self.visit_expr(&arg.expr);
        }
    }

    fn visit_member(&mut self, member: &MemberExpr) {
        self.visit_expr(&member.obj);
        if let MemberProp::Computed(computed) = &member.prop {
            self.visit_expr(&computed.expr);
        }
    }

    fn visit_opt_chain(&mut self, chain: &OptChainExpr) {
        match &*chain.base {
            OptChainBase::Member(member) => self.visit_member(member),
            OptChainBase::Call(call) => {
                self.visit_expr(&call.callee);
                self.visit_args(&call.args);
            }
        }
    }

    fn visit_prop_name(&mut self, name: &PropName) {
        if let PropName::Computed(computed) = name {
            self.visit_expr(&computed.expr);
        }
    }

    fn visit_prop(&mut self, prop: &PropOrSpread) {
        let prop = match prop {
            PropOrSpread::Spread(spread) => return self.visit_expr(&spread.expr),
            PropOrSpread::Prop(prop) => prop,
        };
        match &**prop {
            Prop::Shorthand(_) => {}
            Prop::KeyValue(kv) => {
                self.visit_prop_name(&kv.key);
                self.visit_expr(&kv.value);
            }
            Prop::Assign(assign) => self.visit_expr(&assign.value),
            Prop::Getter(getter) => {
                self.visit_prop_name(&getter.key);
                let node = NodeRef::new("FunctionExpression", getter.span);
                self.with_scope(ScopeType::Function, node, |this| {
                    if let Some(body) = &getter.body {
                        this.visit_stmts(&body.stmts);
                    }
                });
            }
            Prop::Setter(setter) => {
                self.visit_prop_name(&setter.key);
                let node = NodeRef::new("FunctionExpression", setter.span);
                self.with_scope(ScopeType::Function, node, |this| {
                    this.declare_param(&setter.param);
                    if let Some(body) = &setter.body {
                        this.visit_stmts(&body.stmts);
                    }
                });
            }
            Prop::Method(method) => {
                self.visit_prop_name(&method.key);
                let node = NodeRef::new("FunctionExpression", method.function.span);
                self.visit_function(&method.function, node, None);
            }
        }
    }

    fn visit_assign_target(&mut self, target: &AssignTarget) {
        match target {
            AssignTarget::Simple(simple) => match simple {
                SimpleAssignTarget::Member(member) => self.visit_member(member),
                SimpleAssignTarget::SuperProp(super_prop) => {
                    if let SuperProp::Computed(computed) = &super_prop.prop {
                        self.visit_expr(&computed.expr);
                    }
                }
                SimpleAssignTarget::Paren(paren) => self.visit_expr(&paren.expr),
                SimpleAssignTarget::OptChain(chain) => self.visit_opt_chain(chain),
                // identifiers and TypeScript wrappers
                _ => {}
            },
            AssignTarget::Pat(pat) => match pat {
                AssignTargetPat::Array(array) => {
                    for elem in array.elems.iter().flatten() {
                        self.walk_pat_expressions(elem);
                    }
                }
                AssignTargetPat::Object(object) => self.walk_object_pat_expressions(&object.props),
                AssignTargetPat::Invalid(_) => {}
            },
        }
    }

    /// Expressions inside a pattern that declares nothing
    /// (assignment targets, bare `for (x in o)` heads).
    fn walk_pat_expressions(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(_) | Pat::Invalid(_) => {}
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.walk_pat_expressions(elem);
                }
            }
            Pat::Rest(rest) => self.walk_pat_expressions(&rest.arg),
            Pat::Object(object) => self.walk_object_pat_expressions(&object.props),
            Pat::Assign(assign) => {
                self.walk_pat_expressions(&assign.left);
                self.visit_expr(&assign.right);
            }
            Pat::Expr(expr) => self.visit_expr(expr),
        }
    }

    fn walk_object_pat_expressions(&mut self, props: &[ObjectPatProp]) {
        for prop in props {
            match prop {
                ObjectPatProp::KeyValue(kv) => {
                    self.visit_prop_name(&kv.key);
                    self.walk_pat_expressions(&kv.value);
                }
                ObjectPatProp::Assign(assign) => {
                    if let Some(value) = &assign.value {
                        self.visit_expr(value);
                    }
                }
                ObjectPatProp::Rest(rest) => self.walk_pat_expressions(&rest.arg),
            }
        }
    }
}

fn pattern_kind(pat: &Pat) -> &'static str {
    match pat {
        Pat::Ident(_) => "Identifier",
        Pat::Array(_) => "ArrayPattern",
        Pat::Rest(_) => "RestElement",
        Pat::Object(_) => "ObjectPattern",
        Pat::Assign(_) => "AssignmentPattern",
        Pat::Invalid(_) => "Invalid",
        Pat::Expr(_) => "Expression",
    }
}
