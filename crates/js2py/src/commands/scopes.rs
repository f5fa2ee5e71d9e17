//! Scopes command - print the scope tree of a file

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use js2py_diagnostics::{DiagnosticEmitter, SimpleEmitter, SourceCache};
use js2py_scope::{AnalysisResult, Scope};
use serde_json::Value;

use super::Context;
use crate::frontend::{run_frontend, FrontendOptions};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ScopesArgs {
    /// JavaScript file to analyze
    pub input: PathBuf,

    /// Parse the input as an ES module
    #[arg(long)]
    pub module: bool,
}

pub fn run(args: ScopesArgs, context: &Context) -> Result<bool> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let source_name = args.input.display().to_string();

    let options = FrontendOptions::new(source_name.clone(), context.source_type(args.module));
    let mut sources = SourceCache::new();
    let frontend = run_frontend(&source, &options, &mut sources)?;

    let Some(analysis) = &frontend.analysis else {
        let stderr = std::io::stderr();
        let mut emitter = SimpleEmitter::new(stderr.lock()).with_default_file(source_name);
        emitter.emit_all(&frontend.parse.to_diagnostics(), &sources)?;
        return Ok(false);
    };

    match context.format {
        OutputFormat::Text => print!("{}", render_text(analysis)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&render_json(analysis))?)
        }
    }
    Ok(true)
}

/// One line per scope, depth-first, followed by its bindings. Analysis
/// issues follow the tree.
fn render_text(analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    for scope in analysis.flatten_scopes() {
        let indent = "  ".repeat(analysis.scopes.depth(scope.id()));
        let _ = writeln!(
            out,
            "{}{} {} ({})",
            indent,
            scope.id(),
            scope.scope_type().as_str(),
            scope.node().kind
        );
        for (name, bindings) in scope.bindings() {
            let kinds: Vec<_> = bindings.iter().map(|b| b.kind.as_str()).collect();
            let position = bindings
                .first()
                .and_then(|b| b.position)
                .map(|p| format!(" [{}:{}]", p.line, p.column))
                .unwrap_or_default();
            let _ = writeln!(out, "{}  {}: {}{}", indent, name, kinds.join(", "), position);
        }
    }
    for issue in &analysis.issues {
        let _ = writeln!(out, "issue {}", issue);
    }
    out
}

fn scope_json(analysis: &AnalysisResult, scope: &Scope) -> Value {
    let bindings: Vec<Value> = scope
        .bindings()
        .values()
        .flatten()
        .map(|binding| {
            serde_json::json!({
                "name": binding.name,
                "kind": binding.kind.as_str(),
                "node": binding.node.kind,
                "line": binding.position.map(|p| p.line),
                "column": binding.position.map(|p| p.column),
            })
        })
        .collect();
    let children: Vec<Value> = scope
        .children()
        .iter()
        .filter_map(|id| analysis.scopes.get(*id))
        .map(|child| scope_json(analysis, child))
        .collect();

    serde_json::json!({
        "id": scope.id().to_string(),
        "type": scope.scope_type().as_str(),
        "node": scope.node().kind,
        "bindings": bindings,
        "children": children,
    })
}

fn render_json(analysis: &AnalysisResult) -> Value {
    let issues: Vec<Value> = analysis
        .issues
        .iter()
        .map(|issue| {
            serde_json::json!({
                "code": issue.code.as_str(),
                "message": issue.message,
                "line": issue.position.map(|p| p.line),
                "column": issue.position.map(|p| p.column),
            })
        })
        .collect();

    serde_json::json!({
        "source": analysis.source_name,
        "scopes": scope_json(analysis, analysis.root_scope()),
        "issues": issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use js2py_parser::{parse_program, SourceType};
    use js2py_scope::analyze_bindings;

    fn analyze(source: &str) -> AnalysisResult {
        let parsed = parse_program(source, SourceType::Script);
        let program = parsed.program.as_ref().unwrap();
        analyze_bindings(program, "test.js", Some(&parsed.lines))
    }

    #[test]
    fn test_text_tree() {
        let analysis = analyze("var a = 1;\nfunction f(x) {\n  let y = x;\n}");
        assert_eq!(
            render_text(&analysis),
            "S0 global (Program)\n\
             \x20 a: var [1:5]\n\
             \x20 f: function [2:10]\n\
             \x20 S1 function (FunctionDeclaration)\n\
             \x20   x: parameter [2:12]\n\
             \x20   y: let [3:7]\n"
        );
    }

    #[test]
    fn test_text_lists_issues() {
        let analysis = analyze("eval(s);");
        let text = render_text(&analysis);
        assert!(text.ends_with(
            "issue EVAL_CALL: Use of eval makes static analysis unreliable. (line 1, column 1)\n"
        ));
    }

    #[test]
    fn test_json_tree() {
        let analysis = analyze("try { run(); } catch (err) { var v; }");
        let json = render_json(&analysis);

        assert_eq!(json["source"], "test.js");
        let root = &json["scopes"];
        assert_eq!(root["type"], "global");
        assert_eq!(root["bindings"][0]["name"], "v");
        assert_eq!(root["bindings"][0]["kind"], "var");

        let kinds: Vec<_> = root["children"]
            .as_array()
            .unwrap()
            .iter()
            .map(|child| child["type"].as_str().unwrap().to_string())
            .collect();
        assert!(kinds.contains(&"catch".to_string()));
        assert!(json["issues"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_run_reports_parse_failure() {
        let dir = crate::commands::testing::temp_dir("scopes-bad");
        let input = dir.join("bad.js");
        fs::write(&input, "function (").unwrap();

        let args = ScopesArgs {
            input,
            module: false,
        };
        let ok = run(args, &crate::commands::testing::context()).unwrap();
        assert!(!ok);
        fs::remove_dir_all(&dir).ok();
    }
}
