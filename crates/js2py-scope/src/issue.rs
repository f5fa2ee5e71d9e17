//! Issues raised while building the scope tree.

use js2py_diagnostics::Position;
use swc_common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    EvalCall,
    WithStatement,
    UnsupportedPattern,
    UnsupportedParamPattern,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::EvalCall => "EVAL_CALL",
            IssueCode::WithStatement => "WITH_STATEMENT",
            IssueCode::UnsupportedPattern => "UNSUPPORTED_PATTERN",
            IssueCode::UnsupportedParamPattern => "UNSUPPORTED_PARAM_PATTERN",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisIssue {
    pub code: IssueCode,
    pub message: String,
    pub position: Option<Position>,
    pub span: Span,
}

impl std::fmt::Display for AnalysisIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.code,
            self.message,
            Position::suffix(self.position)
        )
    }
}
