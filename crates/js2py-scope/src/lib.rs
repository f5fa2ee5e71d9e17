//! Lexical scope analysis for JavaScript programs
//!
//! Walks an SWC `Program` once and records a tree of scopes (global,
//! function, block, class, catch) together with the bindings each scope
//! introduces. `var` declarations are hoisted to the nearest function or
//! global scope; `let`, `const` and `class` stay where they are written.
//! Constructs that defeat static resolution (`eval`, `with`) are reported
//! as issues without stopping the walk.
//!
//! ```ignore
//! let parsed = js2py_parser::parse_program(source, SourceType::Script);
//! let analysis = analyze_bindings(program, "app.js", Some(&parsed.lines));
//! for scope in analysis.flatten_scopes() {
//!     println!("{} {}", scope.id(), scope.scope_type().as_str());
//! }
//! ```

mod builder;
mod issue;
mod scope;

use js2py_diagnostics::LineIndex;
use swc_common::Spanned;
use swc_ecma_ast::Program;

use builder::ScopeBuilder;

pub use issue::{AnalysisIssue, IssueCode};
pub use scope::{
    Binding, BindingKind, DepthFirst, NodeRef, Scope, ScopeId, ScopeShape, ScopeTree, ScopeType,
};

/// Scope tree and issues for one source file.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub source_name: String,
    pub scopes: ScopeTree,
    pub issues: Vec<AnalysisIssue>,
}

impl AnalysisResult {
    pub fn root_scope(&self) -> &Scope {
        self.scopes.root()
    }

    /// All scopes, parent before children, children in source order.
    pub fn flatten_scopes(&self) -> Vec<&Scope> {
        self.scopes.iter_depth_first().collect()
    }

    pub fn shape(&self) -> ScopeShape {
        self.scopes.shape()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Build the scope tree for `program`.
///
/// `lines` resolves spans to positions; without it bindings and issues
/// carry no position.
pub fn analyze_bindings(
    program: &Program,
    source_name: &str,
    lines: Option<&LineIndex>,
) -> AnalysisResult {
    log::debug!("analyzing scopes of {}", source_name);

    let mut builder = ScopeBuilder::new(NodeRef::new("Program", program.span()), lines);
    builder.visit_program(program);
    let (scopes, issues) = builder.finish();

    log::debug!(
        "{}: {} scope(s), {} issue(s)",
        source_name,
        scopes.len(),
        issues.len()
    );

    AnalysisResult {
        source_name: source_name.to_string(),
        scopes,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use js2py_diagnostics::Position;
    use js2py_parser::{parse_program, SourceType};

    fn analyze_as(source: &str, source_type: SourceType) -> AnalysisResult {
        let parsed = parse_program(source, source_type);
        assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
        let program = parsed.program.as_ref().unwrap();
        analyze_bindings(program, "test.js", Some(&parsed.lines))
    }

    fn analyze(source: &str) -> AnalysisResult {
        analyze_as(source, SourceType::Script)
    }

    fn child<'a>(result: &'a AnalysisResult, scope: &Scope, index: usize) -> &'a Scope {
        result.scopes.get(scope.children()[index]).unwrap()
    }

    fn kinds(scope: &Scope, name: &str) -> Vec<BindingKind> {
        scope.lookup(name).iter().map(|b| b.kind).collect()
    }

    #[test]
    fn test_var_in_nested_blocks_hoists_to_function() {
        let result = analyze("function f() { if (x) { { var deep = 1; } } }");
        let root = result.root_scope();
        let function = child(&result, root, 0);
        assert_eq!(function.scope_type(), ScopeType::Function);
        assert_eq!(kinds(function, "deep"), vec![BindingKind::Var]);

        let outer_block = child(&result, function, 0);
        let inner_block = child(&result, outer_block, 0);
        assert_eq!(outer_block.scope_type(), ScopeType::Block);
        assert_eq!(inner_block.scope_type(), ScopeType::Block);
        assert!(!outer_block.declares("deep"));
        assert!(!inner_block.declares("deep"));
        assert!(!root.declares("deep"));
    }

    #[test]
    fn test_let_and_const_stay_in_block() {
        let result = analyze("function f() { if (c) { let a = 1; const b = 2; } }");
        let function = child(&result, result.root_scope(), 0);
        let block = child(&result, function, 0);

        assert_eq!(kinds(block, "a"), vec![BindingKind::Let]);
        assert_eq!(kinds(block, "b"), vec![BindingKind::Const]);
        assert!(!function.declares("a"));
        assert!(!function.declares("b"));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let source = "var a; function f(x) { let y; try { g(); } catch (e) { var z; } }\nclass K { m() {} }";
        let parsed = parse_program(source, SourceType::Script);
        let program = parsed.program.as_ref().unwrap();

        let first = analyze_bindings(program, "a.js", Some(&parsed.lines));
        let second = analyze_bindings(program, "a.js", Some(&parsed.lines));
        assert_eq!(first.shape(), second.shape());
        assert_eq!(first.scopes.len(), second.scopes.len());
    }

    #[test]
    fn test_eval_is_flagged_once_and_walk_continues() {
        let result = analyze("eval(x);\nfunction g() { var y = 1; }");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].code, IssueCode::EvalCall);
        assert_eq!(
            result.issues[0].message,
            "Use of eval makes static analysis unreliable."
        );
        assert_eq!(result.issues[0].position, Some(Position::new(1, 1)));

        let function = child(&result, result.root_scope(), 0);
        assert_eq!(kinds(function, "y"), vec![BindingKind::Var]);
    }

    #[test]
    fn test_member_eval_is_not_flagged() {
        let result = analyze("window.eval(x); obj.run(eval);");
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_with_statement_is_flagged() {
        let result = analyze("with (obj) { var z = 1; }");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].code, IssueCode::WithStatement);
        assert_eq!(result.issues[0].code.as_str(), "WITH_STATEMENT");
        assert_eq!(kinds(result.root_scope(), "z"), vec![BindingKind::Var]);
    }

    #[test]
    fn test_function_body_shares_parameter_scope() {
        let result = analyze("function f(a) { var b; }");
        let root = result.root_scope();
        assert_eq!(root.children().len(), 1);
        assert_eq!(kinds(root, "f"), vec![BindingKind::Function]);

        let function = child(&result, root, 0);
        assert!(function.children().is_empty());
        assert_eq!(function.node().kind, "FunctionDeclaration");
        assert_eq!(kinds(function, "a"), vec![BindingKind::Parameter]);
        assert_eq!(kinds(function, "b"), vec![BindingKind::Var]);
    }

    #[test]
    fn test_named_function_expression_binds_inside() {
        let result = analyze("var g = function inner() { return inner; };");
        let root = result.root_scope();
        assert_eq!(kinds(root, "g"), vec![BindingKind::Var]);
        assert!(!root.declares("inner"));

        let function = child(&result, root, 0);
        assert_eq!(function.node().kind, "FunctionExpression");
        assert_eq!(kinds(function, "inner"), vec![BindingKind::Function]);
    }

    #[test]
    fn test_arrow_function_scope() {
        let result = analyze("const double = (x) => x * 2;");
        let root = result.root_scope();
        assert_eq!(kinds(root, "double"), vec![BindingKind::Const]);

        let arrow = child(&result, root, 0);
        assert_eq!(arrow.scope_type(), ScopeType::Function);
        assert_eq!(arrow.node().kind, "ArrowFunctionExpression");
        assert_eq!(kinds(arrow, "x"), vec![BindingKind::Parameter]);
    }

    #[test]
    fn test_class_scopes() {
        let source = r#"
            class Animal extends Base {
                constructor(name) { this.name = name; }
                speak() { let sound; }
                static create() {}
            }
        "#;
        let result = analyze(source);
        let root = result.root_scope();
        assert_eq!(kinds(root, "Animal"), vec![BindingKind::Class]);

        let class = child(&result, root, 0);
        assert_eq!(class.scope_type(), ScopeType::Class);
        assert_eq!(class.children().len(), 3);

        let ctor = child(&result, class, 0);
        assert_eq!(ctor.scope_type(), ScopeType::Function);
        assert_eq!(kinds(ctor, "name"), vec![BindingKind::Parameter]);

        let speak = child(&result, class, 1);
        assert_eq!(kinds(speak, "sound"), vec![BindingKind::Let]);
    }

    #[test]
    fn test_named_class_expression_binds_inside() {
        let result = analyze("var K = class Inner {};");
        let root = result.root_scope();
        assert!(!root.declares("Inner"));
        let class = child(&result, root, 0);
        assert_eq!(kinds(class, "Inner"), vec![BindingKind::Class]);
    }

    #[test]
    fn test_catch_scope() {
        let result = analyze("try { a(); } catch (err) { var v; let w; } finally { b(); }");
        let root = result.root_scope();
        assert_eq!(root.children().len(), 3);

        let try_block = child(&result, root, 0);
        let catch = child(&result, root, 1);
        let finally = child(&result, root, 2);
        assert_eq!(try_block.scope_type(), ScopeType::Block);
        assert_eq!(catch.scope_type(), ScopeType::Catch);
        assert_eq!(finally.scope_type(), ScopeType::Block);

        assert!(catch.children().is_empty());
        assert_eq!(kinds(catch, "err"), vec![BindingKind::CatchParameter]);
        assert_eq!(kinds(catch, "w"), vec![BindingKind::Let]);
        assert_eq!(kinds(root, "v"), vec![BindingKind::Var]);
    }

    #[test]
    fn test_destructuring_declarations() {
        let result = analyze("var {a, b: [c, , ...d], e = fallback()} = obj;");
        let root = result.root_scope();
        for name in ["a", "c", "d", "e"] {
            assert_eq!(kinds(root, name), vec![BindingKind::Var], "{}", name);
        }
        assert!(!root.declares("b"));
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_parameter_patterns() {
        let result = analyze("function f(a, b = 2, {c}, [d], ...rest) {}");
        let function = child(&result, result.root_scope(), 0);
        assert_eq!(
            function.names_of_kind(BindingKind::Parameter),
            vec!["a", "b", "c", "d", "rest"]
        );
    }

    #[test]
    fn test_for_head_declarations() {
        let result = analyze("for (let i = 0; i < 3; i++) { var seen = i; }\nfor (var k in obj) {}");
        let root = result.root_scope();
        assert_eq!(kinds(root, "i"), vec![BindingKind::Let]);
        assert_eq!(kinds(root, "k"), vec![BindingKind::Var]);
        assert_eq!(kinds(root, "seen"), vec![BindingKind::Var]);
        assert_eq!(child(&result, root, 0).scope_type(), ScopeType::Block);
    }

    #[test]
    fn test_imports_and_exports() {
        let source = r#"
            import fs from 'fs';
            import * as path from 'path';
            import { join, resolve as r } from 'path';
            export function load() {}
            export const version = 1;
            export default class Widget {}
        "#;
        let result = analyze_as(source, SourceType::Module);
        let root = result.root_scope();

        assert_eq!(
            root.names_of_kind(BindingKind::Import),
            vec!["fs", "join", "path", "r"]
        );
        assert!(!root.declares("resolve"));
        assert_eq!(kinds(root, "load"), vec![BindingKind::Function]);
        assert_eq!(kinds(root, "version"), vec![BindingKind::Const]);
        assert_eq!(kinds(root, "Widget"), vec![BindingKind::Class]);
    }

    #[test]
    fn test_flatten_order_matches_ids() {
        let result = analyze("function a() { function b() {} }\nfunction c() {}");
        let order: Vec<ScopeId> = result.flatten_scopes().iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![ScopeId(0), ScopeId(1), ScopeId(2), ScopeId(3)]);

        let root = result.root_scope();
        assert_eq!(root.parent(), None);
        assert_eq!(root.scope_type(), ScopeType::Global);
        assert_eq!(result.scopes.get(ScopeId(2)).unwrap().parent(), Some(ScopeId(1)));
        assert_eq!(result.scopes.get(ScopeId(3)).unwrap().parent(), Some(ScopeId(0)));
    }

    #[test]
    fn test_resolve_through_scopes() {
        let result = analyze("var top; function f() { { let inner; } }");
        let block_id = ScopeId(2);
        assert_eq!(result.scopes.get(block_id).unwrap().scope_type(), ScopeType::Block);
        assert_eq!(
            result.scopes.resolve(block_id, "top").map(Scope::id),
            Some(ScopeId(0))
        );
        assert_eq!(
            result.scopes.resolve(block_id, "inner").map(Scope::id),
            Some(block_id)
        );
        assert!(result.scopes.resolve(ScopeId(1), "inner").is_none());
    }

    #[test]
    fn test_binding_positions() {
        let result = analyze("var a = 1;\nfunction f(param) {}");
        let root = result.root_scope();
        assert_eq!(root.lookup("a")[0].position, Some(Position::new(1, 5)));
        assert_eq!(root.lookup("a")[0].node.kind, "VariableDeclarator");

        let function = child(&result, root, 0);
        assert_eq!(function.lookup("param")[0].position, Some(Position::new(2, 12)));
    }

    #[test]
    fn test_redeclared_var_keeps_both_bindings() {
        let result = analyze("var x = 1; var x = 2;");
        assert_eq!(result.root_scope().lookup("x").len(), 2);
    }

    #[test]
    fn test_typical_programs() {
        let cases: [(&str, &str, &[&str], &[&str]); 5] = [
            (
                "function hello(name) { console.log('Hello, ' + name); }\nhello('world');",
                "hello",
                &["name"],
                &[],
            ),
            (
                "function add(a, b) { return a + b; }\nvar result = add(1, 2);\nconsole.log(result);",
                "add",
                &["a", "b"],
                &[],
            ),
            (
                "function classify(x) {\n  var label;\n  if (x > 0) { label = 'positive'; } else if (x < 0) { label = 'negative'; } else { label = 'zero'; }\n  return label;\n}",
                "classify",
                &["x"],
                &["label"],
            ),
            (
                "function sum(arr) {\n  var total = 0;\n  for (var i = 0; i < arr.length; i++) { total += arr[i]; }\n  var j = 0;\n  while (j < 1) { j++; }\n  return total;\n}",
                "sum",
                &["arr"],
                &["total", "i"],
            ),
            (
                "function grade(score) {\n  var letter;\n  switch (score) {\n    case 90: letter = 'A'; break;\n    case 80: letter = 'B'; break;\n    default: letter = 'F';\n  }\n  return letter;\n}",
                "grade",
                &["score"],
                &["letter"],
            ),
        ];

        for (source, function_name, params, locals) in cases {
            let result = analyze(source);
            assert!(!result.has_issues(), "{}", function_name);

            let root = result.root_scope();
            assert!(root.declares(function_name));
            let function = child(&result, root, 0);
            assert_eq!(function.node().kind, "FunctionDeclaration");

            let param_names = function.names_of_kind(BindingKind::Parameter);
            let local_names = function.names_of_kind(BindingKind::Var);
            for param in params {
                assert!(param_names.contains(param), "{}: {}", function_name, param);
            }
            for local in locals {
                assert!(local_names.contains(local), "{}: {}", function_name, local);
            }
        }
    }
}
