//! Check command - parse, analyze and transform without writing output

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use js2py_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticEmitter, Diagnostics, JsonEmitter, SourceCache,
    TerminalEmitter,
};
use walkdir::WalkDir;

use super::Context;
use crate::frontend::{note_diagnostics, run_frontend, FrontendOptions};
use crate::OutputFormat;

const EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File or directory to check
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Parse inputs as ES modules (`.mjs` files always are)
    #[arg(long)]
    pub module: bool,
}

/// Diagnostics for every checked file, sharing one source cache.
struct CheckReport {
    files: usize,
    diagnostics: Diagnostics,
    sources: SourceCache,
}

impl CheckReport {
    fn passed(&self, strict: bool) -> bool {
        !self.diagnostics.has_errors() && !(strict && self.diagnostics.warning_count() > 0)
    }
}

pub fn run(args: CheckArgs, context: &Context) -> Result<bool> {
    let strict = args.strict || context.config.convert.strict;

    if context.format == OutputFormat::Text && context.verbose > 0 && !context.quiet {
        println!("Checking {}...", args.path.display());
    }

    let report = check(&args, context)?;
    let errors = report.diagnostics.error_count();
    let warnings = report.diagnostics.warning_count();
    let passed = report.passed(strict);

    match context.format {
        OutputFormat::Text => {
            let stderr = std::io::stderr();
            let mut emitter = TerminalEmitter::new(stderr.lock(), context.use_color);
            emitter.emit_all(&report.diagnostics, &report.sources)?;

            if context.quiet {
                return Ok(passed);
            }
            if !report.diagnostics.is_empty() {
                println!();
            }

            // Print summary
            if errors > 0 {
                if context.use_color {
                    println!(
                        "{}: {} error(s), {} warning(s)",
                        console::style("Check failed").red().bold(),
                        errors,
                        warnings
                    );
                } else {
                    println!("Check failed: {} error(s), {} warning(s)", errors, warnings);
                }
            } else if warnings > 0 && strict {
                if context.use_color {
                    println!(
                        "{}: {} warning(s) (strict mode)",
                        console::style("Check failed").yellow().bold(),
                        warnings
                    );
                } else {
                    println!("Check failed: {} warning(s) (strict mode)", warnings);
                }
            } else if warnings > 0 {
                if context.use_color {
                    println!("{}: {} warning(s)", console::style("Check passed").yellow(), warnings);
                } else {
                    println!("Check passed: {} warning(s)", warnings);
                }
            } else if context.use_color {
                println!(
                    "{} - {} file(s) checked",
                    console::style("All checks passed!").green().bold(),
                    report.files
                );
            } else {
                println!("All checks passed! - {} file(s) checked", report.files);
            }
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(std::io::stdout().lock());
            emitter.emit_all(&report.diagnostics, &report.sources)?;

            let summary = serde_json::json!({
                "type": "summary",
                "success": passed,
                "files_checked": report.files,
                "errors": errors,
                "warnings": warnings,
                "notes": report.diagnostics.info_count(),
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    Ok(passed)
}

fn has_js_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// A single file as given, or every JavaScript file under a directory,
/// skipping `node_modules`, in a stable order.
fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow!("Path not found: {}", path.display()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules");
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
        if entry.file_type().is_file() && has_js_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn check(args: &CheckArgs, context: &Context) -> Result<CheckReport> {
    let strict = args.strict || context.config.convert.strict;
    let files = collect_files(&args.path)?;
    log::debug!("checking {} file(s) under {}", files.len(), args.path.display());

    let mut sources = SourceCache::new();
    let mut diagnostics = Diagnostics::new();

    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let is_mjs = file.extension().map(|ext| ext == "mjs").unwrap_or(false);
        let options = FrontendOptions {
            source_name: file.display().to_string(),
            tolerant: !strict,
            analyze: true,
            source_type: context.source_type(args.module || is_mjs),
            cache_dir: context.config.convert.cache_dir.clone(),
        };
        let frontend = run_frontend(&source, &options, &mut sources)?;
        diagnostics.extend(frontend.diagnostics());
        if !frontend.has_program() {
            log::info!("{}: parse produced no program", file.display());
        }

        match frontend.transform() {
            None => {}
            Some(Ok(result)) => diagnostics.extend(note_diagnostics(&result.diagnostics)),
            Some(Err(error)) => diagnostics.push(frontend.transform_error_diagnostic(&error)),
        }
    }

    if files.is_empty() {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::InternalError,
                format!("No JavaScript files found in {}", args.path.display()),
            )
            .build(),
        );
    }

    Ok(CheckReport {
        files: files.len(),
        diagnostics,
        sources,
    })
}
