//! JavaScript parser wrapper using SWC
//!
//! This crate provides a high-level interface to parse ES5/ES2015+ source code
//! into an SWC `Program`, either as a classic script or as an ES module, and
//! collects recoverable syntax errors instead of failing outright.

pub mod cache;

use js2py_diagnostics::{
    Diagnostic, DiagnosticCode, Diagnostics, FileId, LineIndex, Position, SourceCache, Span,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use swc_common::{input::StringInput, sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, Syntax};

pub use cache::{load_artifact, persist_parse, CacheError, ParseArtifact};

// Re-export AST types for consumers that need to inspect the AST
pub use swc_ecma_ast;

// Re-export Spanned trait for getting spans from AST nodes
pub use swc_common::Spanned;

/// Goal symbol for the parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Classic script, no `import`/`export`
    #[default]
    Script,
    /// ES module
    Module,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Script => "script",
            SourceType::Module => "module",
        }
    }
}

/// Options controlling a single parse.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub source_type: SourceType,
    /// Keep the program when the parser recovered from errors.
    pub tolerant: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            tolerant: true,
        }
    }
}

/// A syntax error reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub description: String,
    pub position: Option<Position>,
    pub span: Span,
}

/// Result of parsing a JavaScript file.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed program; `None` when parsing failed or a strict parse
    /// reported errors.
    pub program: Option<Program>,
    pub errors: Vec<ParseError>,
    /// The file ID in the source cache
    pub file_id: FileId,
    /// Resolves positions of nodes in `program`
    pub lines: LineIndex,
    /// SHA-256 of the source text, hex encoded
    pub source_hash: String,
    pub source_name: String,
    pub source_type: SourceType,
}

impl ParseResult {
    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Number of top-level statements and module items.
    pub fn statement_count(&self) -> usize {
        match &self.program {
            Some(Program::Module(module)) => module.body.len(),
            Some(Program::Script(script)) => script.body.len(),
            None => 0,
        }
    }

    /// Parse errors as error diagnostics.
    pub fn to_diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        for error in &self.errors {
            diagnostics.push(
                Diagnostic::error(DiagnosticCode::ParseError, error.description.clone())
                    .with_span(error.span)
                    .build(),
            );
        }
        diagnostics
    }
}

/// Hex-encoded SHA-256 of the source, used as the cache key.
pub fn hash_source(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Parse JavaScript source, registering it in the source cache.
///
/// Fatal syntax errors never panic or return `Err`: they are reported in
/// `ParseResult::errors` with `program` left empty.
pub fn parse_js(
    source: &str,
    source_name: &str,
    options: ParseOptions,
    cache: &mut SourceCache,
) -> ParseResult {
    let file_id = cache.add_file(source_name, source.to_string());

    // SWC source map (separate from our cache, used internally by SWC)
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(source_name.to_string())),
        source.to_string(),
    );
    let lines = LineIndex::new(source, source_file.start_pos.0);

    let lexer = Lexer::new(
        Syntax::Es(EsSyntax::default()),
        EsVersion::Es2022,
        StringInput::from(&*source_file),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let to_error = |span: swc_common::Span, description: String| ParseError {
        description,
        position: lines.position(span.lo.0),
        span: lines.span(file_id, span.lo.0, span.hi.0),
    };

    let parsed = match options.source_type {
        SourceType::Script => parser.parse_script().map(Program::Script),
        SourceType::Module => parser.parse_module().map(Program::Module),
    };

    let mut errors = Vec::new();
    let mut program = match parsed {
        Ok(program) => Some(program),
        Err(e) => {
            errors.push(to_error(e.span(), e.kind().msg().to_string()));
            None
        }
    };

    for error in parser.take_errors() {
        errors.push(to_error(error.span(), error.kind().msg().to_string()));
    }

    if !options.tolerant && !errors.is_empty() {
        log::debug!(
            "{}: discarding program after {} error(s) in strict mode",
            source_name,
            errors.len()
        );
        program = None;
    }

    log::debug!(
        "parsed {} as {} ({} error(s))",
        source_name,
        options.source_type.as_str(),
        errors.len()
    );

    ParseResult {
        program,
        errors,
        file_id,
        lines,
        source_hash: hash_source(source),
        source_name: source_name.to_string(),
        source_type: options.source_type,
    }
}

/// Parse with a throwaway source cache.
pub fn parse_program(source: &str, source_type: SourceType) -> ParseResult {
    let mut cache = SourceCache::new();
    let options = ParseOptions {
        source_type,
        tolerant: true,
    };
    parse_js(source, "<input>", options, &mut cache)
}
