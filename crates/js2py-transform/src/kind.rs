//! ESTree names for SWC nodes.
//!
//! Messages name nodes the way JavaScript tooling does (`IfStatement`,
//! `ArrowFunctionExpression`), independent of how SWC splits its enums.

use swc_ecma_ast as ast;

pub fn stmt_kind(stmt: &ast::Stmt) -> &'static str {
    match stmt {
        ast::Stmt::Block(_) => "BlockStatement",
        ast::Stmt::Empty(_) => "EmptyStatement",
        ast::Stmt::Debugger(_) => "DebuggerStatement",
        ast::Stmt::With(_) => "WithStatement",
        ast::Stmt::Return(_) => "ReturnStatement",
        ast::Stmt::Labeled(_) => "LabeledStatement",
        ast::Stmt::Break(_) => "BreakStatement",
        ast::Stmt::Continue(_) => "ContinueStatement",
        ast::Stmt::If(_) => "IfStatement",
        ast::Stmt::Switch(_) => "SwitchStatement",
        ast::Stmt::Throw(_) => "ThrowStatement",
        ast::Stmt::Try(_) => "TryStatement",
        ast::Stmt::While(_) => "WhileStatement",
        ast::Stmt::DoWhile(_) => "DoWhileStatement",
        ast::Stmt::For(_) => "ForStatement",
        ast::Stmt::ForIn(_) => "ForInStatement",
        ast::Stmt::ForOf(_) => "ForOfStatement",
        ast::Stmt::Decl(decl) => decl_kind(decl),
        ast::Stmt::Expr(_) => "ExpressionStatement",
    }
}

pub fn decl_kind(decl: &ast::Decl) -> &'static str {
    match decl {
        ast::Decl::Class(_) => "ClassDeclaration",
        ast::Decl::Fn(_) => "FunctionDeclaration",
        ast::Decl::Var(_) => "VariableDeclaration",
        ast::Decl::Using(_) => "UsingDeclaration",
        _ => "TSDeclaration",
    }
}

pub fn expr_kind(expr: &ast::Expr) -> &'static str {
    match expr {
        ast::Expr::This(_) => "ThisExpression",
        ast::Expr::Array(_) => "ArrayExpression",
        ast::Expr::Object(_) => "ObjectExpression",
        ast::Expr::Fn(_) => "FunctionExpression",
        ast::Expr::Unary(_) => "UnaryExpression",
        ast::Expr::Update(_) => "UpdateExpression",
        ast::Expr::Bin(bin) => match bin.op {
            ast::BinaryOp::LogicalAnd
            | ast::BinaryOp::LogicalOr
            | ast::BinaryOp::NullishCoalescing => "LogicalExpression",
            _ => "BinaryExpression",
        },
        ast::Expr::Assign(_) => "AssignmentExpression",
        ast::Expr::Member(_) | ast::Expr::SuperProp(_) => "MemberExpression",
        ast::Expr::Cond(_) => "ConditionalExpression",
        ast::Expr::Call(_) => "CallExpression",
        ast::Expr::New(_) => "NewExpression",
        ast::Expr::Seq(_) => "SequenceExpression",
        ast::Expr::Ident(_) => "Identifier",
        ast::Expr::Lit(_) => "Literal",
        ast::Expr::Tpl(_) => "TemplateLiteral",
        ast::Expr::TaggedTpl(_) => "TaggedTemplateExpression",
        ast::Expr::Arrow(_) => "ArrowFunctionExpression",
        ast::Expr::Class(_) => "ClassExpression",
        ast::Expr::Yield(_) => "YieldExpression",
        ast::Expr::MetaProp(_) => "MetaProperty",
        ast::Expr::Await(_) => "AwaitExpression",
        ast::Expr::Paren(_) => "ParenthesizedExpression",
        ast::Expr::PrivateName(_) => "PrivateIdentifier",
        ast::Expr::OptChain(_) => "ChainExpression",
        ast::Expr::Invalid(_) => "Invalid",
        // JSX and TypeScript nodes; the ES parser never produces them
        _ => "UnknownExpression",
    }
}

pub fn pat_kind(pat: &ast::Pat) -> &'static str {
    match pat {
        ast::Pat::Ident(_) => "Identifier",
        ast::Pat::Array(_) => "ArrayPattern",
        ast::Pat::Rest(_) => "RestElement",
        ast::Pat::Object(_) => "ObjectPattern",
        ast::Pat::Assign(_) => "AssignmentPattern",
        ast::Pat::Invalid(_) => "Invalid",
        ast::Pat::Expr(expr) => expr_kind(expr),
    }
}

pub fn module_decl_kind(decl: &ast::ModuleDecl) -> &'static str {
    match decl {
        ast::ModuleDecl::Import(_) => "ImportDeclaration",
        ast::ModuleDecl::ExportDecl(_) | ast::ModuleDecl::ExportNamed(_) => {
            "ExportNamedDeclaration"
        }
        ast::ModuleDecl::ExportDefaultDecl(_) | ast::ModuleDecl::ExportDefaultExpr(_) => {
            "ExportDefaultDeclaration"
        }
        ast::ModuleDecl::ExportAll(_) => "ExportAllDeclaration",
        _ => "TSModuleDeclaration",
    }
}

pub fn class_member_kind(member: &ast::ClassMember) -> &'static str {
    match member {
        ast::ClassMember::Constructor(_) | ast::ClassMember::Method(_) => "MethodDefinition",
        ast::ClassMember::PrivateMethod(_) => "ClassPrivateMethod",
        ast::ClassMember::ClassProp(_) => "ClassProperty",
        ast::ClassMember::PrivateProp(_) => "ClassPrivateProperty",
        ast::ClassMember::StaticBlock(_) => "StaticBlock",
        ast::ClassMember::AutoAccessor(_) => "AccessorProperty",
        ast::ClassMember::Empty(_) => "EmptyStatement",
        _ => "TSIndexSignature",
    }
}
