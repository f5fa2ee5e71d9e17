//! Diagnostic types for translation errors, warnings, and notes.

use crate::position::Span;
use serde::{Deserialize, Serialize};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Note about a lossy but accepted lowering
    Info,
    /// Translation proceeded but the result needs review
    Warning,
    /// No usable output for this input
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Upper-case label used by the line-oriented CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic codes organized by the phase that produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Parse errors (P001-P099)
    /// Syntax error reported by the parser
    ParseError,

    // Analysis issues (A001-A099)
    /// Direct call to `eval`
    EvalCall,
    /// `with` statement
    WithStatement,
    /// Declaration pattern that cannot be decomposed
    UnsupportedPattern,
    /// Parameter pattern that cannot be decomposed
    UnsupportedParamPattern,

    // Transformation (T001-T099)
    /// Construct with no Python lowering
    UnsupportedConstruct,
    /// Construct lowered with a documented approximation
    LossyLowering,

    // Notices (N001-N099)
    /// Runtime bundling placeholder
    RuntimeNotice,

    // Internal errors (I001-I099)
    /// I/O or other driver failure
    InternalError,
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 9] = [
        Self::ParseError,
        Self::EvalCall,
        Self::WithStatement,
        Self::UnsupportedPattern,
        Self::UnsupportedParamPattern,
        Self::UnsupportedConstruct,
        Self::LossyLowering,
        Self::RuntimeNotice,
        Self::InternalError,
    ];

    /// Get the numbered code string (e.g., "A001").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "P001",

            Self::EvalCall => "A001",
            Self::WithStatement => "A002",
            Self::UnsupportedPattern => "A003",
            Self::UnsupportedParamPattern => "A004",

            Self::UnsupportedConstruct => "T001",
            Self::LossyLowering => "T002",

            Self::RuntimeNotice => "N001",

            Self::InternalError => "I001",
        }
    }

    /// Stable short identifier (e.g., "EVAL_CALL").
    pub fn name(&self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::EvalCall => "EVAL_CALL",
            Self::WithStatement => "WITH_STATEMENT",
            Self::UnsupportedPattern => "UNSUPPORTED_PATTERN",
            Self::UnsupportedParamPattern => "UNSUPPORTED_PARAM_PATTERN",
            Self::UnsupportedConstruct => "UNSUPPORTED_CONSTRUCT",
            Self::LossyLowering => "LOSSY_LOWERING",
            Self::RuntimeNotice => "RUNTIME_NOTICE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Look a code up by numbered form or short identifier, ignoring case.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.iter().copied().find(|c| {
            c.as_str().eq_ignore_ascii_case(code) || c.name().eq_ignore_ascii_case(code)
        })
    }

    /// Get the default severity for this code.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ParseError | Self::UnsupportedConstruct | Self::InternalError => Severity::Error,

            Self::EvalCall
            | Self::WithStatement
            | Self::UnsupportedPattern
            | Self::UnsupportedParamPattern => Severity::Warning,

            Self::LossyLowering | Self::RuntimeNotice => Severity::Info,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A translation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    /// Short message (single line)
    pub message: String,
    /// Longer explanation (optional)
    pub explanation: Option<String>,
    /// Primary span (where the problem is)
    pub span: Span,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Error, message)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Warning, message)
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Info, message)
    }

    /// Create a diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, code.default_severity(), message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_info(&self) -> bool {
        self.severity == Severity::Info
    }
}

/// Builder for constructing diagnostics fluently.
pub struct DiagnosticBuilder {
    inner: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            inner: Diagnostic {
                code,
                severity,
                message: message.into(),
                explanation: None,
                span: Span::DUMMY,
            },
        }
    }

    /// Set the primary span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.inner.span = span;
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.explanation = Some(help.into());
        self
    }

    /// Override the severity chosen at construction.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.inner.severity = severity;
        self
    }

    pub fn build(self) -> Diagnostic {
        self.inner
    }
}

/// Collection of diagnostics with summary statistics.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_warning()).count()
    }

    pub fn info_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_info()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
