//! Parse and analyze one source file, and turn every stage's findings
//! into diagnostics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use js2py_diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, SourceCache, Span};
use js2py_parser::swc_ecma_ast::Program;
use js2py_parser::{parse_js, persist_parse, ParseOptions, ParseResult, SourceType};
use js2py_scope::{analyze_bindings, AnalysisIssue, AnalysisResult, IssueCode};
use js2py_transform::{TransformError, TransformResult};

#[derive(Debug, Clone)]
pub struct FrontendOptions {
    pub source_name: String,
    /// Keep the program when the parser recovered from errors
    pub tolerant: bool,
    pub analyze: bool,
    pub source_type: SourceType,
    /// Where to persist the parse artifact, if anywhere
    pub cache_dir: Option<PathBuf>,
}

impl FrontendOptions {
    pub fn new(source_name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            source_name: source_name.into(),
            tolerant: true,
            analyze: true,
            source_type,
            cache_dir: None,
        }
    }
}

#[derive(Debug)]
pub struct FrontEndResult {
    pub parse: ParseResult,
    pub analysis: Option<AnalysisResult>,
}

impl FrontEndResult {
    pub fn has_program(&self) -> bool {
        self.parse.has_program()
    }

    pub fn program(&self) -> Option<&Program> {
        self.parse.program.as_ref()
    }

    /// Parse errors as errors, analysis issues as warnings.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = self.parse.to_diagnostics();
        if let Some(analysis) = &self.analysis {
            for issue in &analysis.issues {
                diagnostics.push(self.issue_diagnostic(issue));
            }
        }
        diagnostics
    }

    /// Lower the program; `None` when parsing produced nothing.
    pub fn transform(&self) -> Option<Result<TransformResult, TransformError>> {
        let program = self.program()?;
        Some(js2py_transform::transform_program(
            program,
            &self.parse.source_name,
            Some(&self.parse.lines),
        ))
    }

    pub fn transform_error_diagnostic(&self, error: &TransformError) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::UnsupportedConstruct, error.message.clone())
            .with_span(self.span(error.span.lo.0, error.span.hi.0))
            .build()
    }

    fn issue_diagnostic(&self, issue: &AnalysisIssue) -> Diagnostic {
        let code = match issue.code {
            IssueCode::EvalCall => DiagnosticCode::EvalCall,
            IssueCode::WithStatement => DiagnosticCode::WithStatement,
            IssueCode::UnsupportedPattern => DiagnosticCode::UnsupportedPattern,
            IssueCode::UnsupportedParamPattern => DiagnosticCode::UnsupportedParamPattern,
        };
        Diagnostic::warning(code, issue.message.clone())
            .with_span(self.span(issue.span.lo.0, issue.span.hi.0))
            .build()
    }

    fn span(&self, lo: u32, hi: u32) -> Span {
        self.parse.lines.span(self.parse.file_id, lo, hi)
    }
}

/// Transformer notes as info diagnostics. The notes already carry their
/// location in the message, so they have no span.
pub fn note_diagnostics(notes: &[String]) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    for note in notes {
        diagnostics.push(Diagnostic::info(DiagnosticCode::LossyLowering, note.clone()).build());
    }
    diagnostics
}

/// Parse `source`, analyze it when a program exists and `analyze` is set,
/// and persist the parse artifact when a cache directory is configured.
pub fn run_frontend(
    source: &str,
    options: &FrontendOptions,
    cache: &mut SourceCache,
) -> Result<FrontEndResult> {
    let parse_options = ParseOptions {
        source_type: options.source_type,
        tolerant: options.tolerant,
    };
    let parse = parse_js(source, &options.source_name, parse_options, cache);

    if let Some(cache_dir) = &options.cache_dir {
        let path = persist_parse(cache_dir, &parse)
            .with_context(|| format!("failed to cache parse of {}", options.source_name))?;
        log::debug!("cached parse artifact at {}", path.display());
    }

    let analysis = match &parse.program {
        Some(program) if options.analyze => Some(analyze_bindings(
            program,
            &options.source_name,
            Some(&parse.lines),
        )),
        _ => None,
    };

    Ok(FrontEndResult { parse, analysis })
}
