//! Convert command - translate one JavaScript file to Python

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use js2py_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticEmitter, Diagnostics, SimpleEmitter, SourceCache,
};
use js2py_pyast::{emit_module, EmitOptions};

use super::Context;
use crate::config::RuntimeMode;
use crate::frontend::{note_diagnostics, run_frontend, FrontendOptions};
use crate::OutputFormat;

const RUNTIME_NOTICE: &str = "Runtime bundling is not implemented yet; skipping.";

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// JavaScript file to translate
    pub input: PathBuf,

    /// Output path (defaults to the input path with a .py extension)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Append runtime helpers to the output
    #[arg(long, value_enum)]
    pub runtime: Option<RuntimeMode>,

    /// Fail on analysis warnings and transform notes; disable tolerant parsing
    #[arg(long)]
    pub strict: bool,

    /// Parse the input as an ES module
    #[arg(long)]
    pub module: bool,

    /// Persist parse artifacts in this directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Everything a conversion produced, before it is reported.
struct Conversion {
    source_name: String,
    output: Option<PathBuf>,
    diagnostics: Diagnostics,
    sources: SourceCache,
    transform_error: Option<String>,
    success: bool,
}

pub fn run(args: ConvertArgs, context: &Context) -> Result<bool> {
    let conversion = convert(&args, context)?;

    match context.format {
        OutputFormat::Text => {
            let stderr = std::io::stderr();
            let mut emitter =
                SimpleEmitter::new(stderr.lock()).with_default_file(conversion.source_name.clone());
            emitter.emit_all(&conversion.diagnostics, &conversion.sources)?;

            if let Some(error) = &conversion.transform_error {
                eprintln!("Transformation failed: {}", error);
            }
            match &conversion.output {
                Some(output) if !context.quiet => {
                    if context.use_color {
                        println!("{} {}", console::style("Wrote").green().bold(), output.display());
                    } else {
                        println!("Wrote {}", output.display());
                    }
                }
                _ => {}
            }
        }
        OutputFormat::Json => {
            let diagnostics: Vec<_> = conversion
                .diagnostics
                .iter()
                .map(|diag| {
                    let location = conversion.sources.location(diag.span);
                    serde_json::json!({
                        "code": diag.code.as_str(),
                        "severity": diag.severity.as_str(),
                        "message": diag.message,
                        "line": location.as_ref().map(|l| l.line),
                        "column": location.as_ref().map(|l| l.column),
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "type": "convert",
                "input": conversion.source_name,
                "output": conversion.output.as_ref().map(|p| p.display().to_string()),
                "success": conversion.success,
                "errors": conversion.diagnostics.error_count(),
                "warnings": conversion.diagnostics.warning_count(),
                "notes": conversion.diagnostics.info_count(),
                "transform_error": conversion.transform_error,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(conversion.success)
}

/// Where the Python file goes: `--out`, then `convert.out_dir`, then next
/// to the input.
fn output_path(args: &ConvertArgs, context: &Context) -> PathBuf {
    if let Some(out) = &args.out {
        return out.clone();
    }
    let file_name = args.input.with_extension("py");
    match (&context.config.convert.out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}

fn write_output(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, source).with_context(|| format!("failed to write {}", path.display()))
}

fn convert(args: &ConvertArgs, context: &Context) -> Result<Conversion> {
    let settings = &context.config.convert;
    let strict = args.strict || settings.strict;
    let runtime = args.runtime.unwrap_or(settings.runtime);
    let source_name = args.input.display().to_string();

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let options = FrontendOptions {
        source_name: source_name.clone(),
        tolerant: !strict,
        analyze: true,
        source_type: context.source_type(args.module),
        cache_dir: args.cache_dir.clone().or_else(|| settings.cache_dir.clone()),
    };
    let mut sources = SourceCache::new();
    let frontend = run_frontend(&source, &options, &mut sources)?;

    let mut diagnostics = frontend.diagnostics();
    let parse_failed = !frontend.parse.errors.is_empty();
    let analysis_issues = diagnostics.warning_count();

    let mut output = None;
    let mut transform_error = None;
    let mut success = false;

    match frontend.transform() {
        None => log::info!("{}: no program produced, nothing to convert", source_name),
        Some(Err(error)) => transform_error = Some(error.to_string()),
        Some(Ok(result)) => {
            diagnostics.extend(note_diagnostics(&result.diagnostics));
            if runtime == RuntimeMode::Include {
                diagnostics
                    .push(Diagnostic::info(DiagnosticCode::RuntimeNotice, RUNTIME_NOTICE).build());
            }

            let emit_options = EmitOptions {
                include_runtime: runtime == RuntimeMode::Include,
                runtime_snippets: Vec::new(),
                trailing_newline: context.config.emit.trailing_newline,
                indent: context.config.emit.indent,
            };
            let emitted = emit_module(&result.module, &emit_options);

            let path = output_path(args, context);
            write_output(&path, &emitted.source)?;
            log::info!("wrote {}", path.display());

            let strict_failure = strict && (analysis_issues > 0 || !result.diagnostics.is_empty());
            success = !parse_failed && !strict_failure;
            output = Some(path);
        }
    }

    Ok(Conversion {
        source_name,
        output,
        diagnostics,
        sources,
        transform_error,
        success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, temp_dir};

    fn args(input: PathBuf) -> ConvertArgs {
        ConvertArgs {
            input,
            out: None,
            runtime: None,
            strict: false,
            module: false,
            cache_dir: None,
        }
    }

    #[test]
    fn test_converts_next_to_input() {
        let dir = temp_dir("convert-basic");
        let input = dir.join("add.js");
        fs::write(&input, "function add(a,b){return a+b;}\nvar result = add(1,2);").unwrap();

        let conversion = convert(&args(input), &context()).unwrap();
        assert!(conversion.success);
        assert!(conversion.diagnostics.is_empty());

        let output = conversion.output.unwrap();
        assert_eq!(output, dir.join("add.py"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "def add(a, b):\n    return a + b\nresult = add(1, 2)\n"
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = temp_dir("convert-missing");
        let err = convert(&args(dir.join("nope.js")), &context()).err().unwrap();
        assert!(err.to_string().starts_with("failed to read"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_out_creates_parent_directories() {
        let dir = temp_dir("convert-out");
        let input = dir.join("a.js");
        fs::write(&input, "var a = 1;").unwrap();

        let mut convert_args = args(input);
        convert_args.out = Some(dir.join("build/py/a.py"));
        let conversion = convert(&convert_args, &context()).unwrap();

        assert!(conversion.success);
        assert_eq!(fs::read_to_string(dir.join("build/py/a.py")).unwrap(), "a = 1\n");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_parse_error_fails_without_output() {
        let dir = temp_dir("convert-parse-error");
        let input = dir.join("bad.js");
        fs::write(&input, "var = ;").unwrap();

        let mut convert_args = args(input);
        convert_args.strict = true;
        let conversion = convert(&convert_args, &context()).unwrap();

        assert!(!conversion.success);
        assert!(conversion.output.is_none());
        assert!(conversion.diagnostics.has_errors());
        assert!(!dir.join("bad.py").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_transform_failure_is_reported() {
        let dir = temp_dir("convert-transform-error");
        let input = dir.join("pow.js");
        fs::write(&input, "x = a ** b;").unwrap();

        let conversion = convert(&args(input), &context()).unwrap();
        assert!(!conversion.success);
        assert!(conversion.output.is_none());
        assert_eq!(
            conversion.transform_error.as_deref(),
            Some("Unsupported binary operator: ** (line 1, column 5)")
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_warnings_fail_only_in_strict_mode() {
        let dir = temp_dir("convert-strict");
        let input = dir.join("dyn.js");
        fs::write(&input, "var code = 'x';\neval(code);").unwrap();

        let conversion = convert(&args(input.clone()), &context()).unwrap();
        assert!(conversion.success);
        assert_eq!(conversion.diagnostics.warning_count(), 1);

        let mut strict_args = args(input);
        strict_args.strict = true;
        let conversion = convert(&strict_args, &context()).unwrap();
        assert!(!conversion.success);
        assert!(conversion.output.is_some());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_notes_fail_in_strict_config() {
        let dir = temp_dir("convert-strict-config");
        let input = dir.join("loop.js");
        fs::write(&input, "do { i++; } while (i < 3);").unwrap();

        let mut ctx = context();
        ctx.config.convert.strict = true;
        let conversion = convert(&args(input), &ctx).unwrap();
        assert!(!conversion.success);
        assert_eq!(conversion.diagnostics.info_count(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_runtime_include_is_noticed() {
        let dir = temp_dir("convert-runtime");
        let input = dir.join("a.js");
        fs::write(&input, "var a = 1;").unwrap();

        let mut convert_args = args(input);
        convert_args.runtime = Some(RuntimeMode::Include);
        let conversion = convert(&convert_args, &context()).unwrap();

        assert!(conversion.success);
        let notice = conversion.diagnostics.iter().next().unwrap();
        assert_eq!(notice.code, DiagnosticCode::RuntimeNotice);
        assert_eq!(notice.message, RUNTIME_NOTICE);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_controls_output_and_layout() {
        let dir = temp_dir("convert-config");
        let input = dir.join("mod.js");
        fs::write(&input, "export function f() { if (x) { return 1; } }").unwrap();

        let mut ctx = context();
        ctx.config.convert.module = true;
        ctx.config.convert.out_dir = Some(dir.join("out"));
        ctx.config.emit.indent = 2;
        let conversion = convert(&args(input), &ctx).unwrap();

        assert!(conversion.success);
        assert_eq!(
            fs::read_to_string(dir.join("out/mod.py")).unwrap(),
            "def f():\n  if x:\n    return 1\n"
        );
        fs::remove_dir_all(&dir).ok();
    }
}
