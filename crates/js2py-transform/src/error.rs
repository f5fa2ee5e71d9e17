//! Fatal lowering errors.

use js2py_diagnostics::Position;
use swc_common::Span;
use thiserror::Error;

/// Aborts a transformation. No partial output survives it.
///
/// `kind` is the ESTree name of the offending node; `position` is set when
/// the caller supplied a line index.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}{}", location_suffix(.position))]
pub struct TransformError {
    pub message: String,
    pub kind: &'static str,
    pub span: Span,
    pub position: Option<Position>,
}

impl TransformError {
    pub fn new(
        message: impl Into<String>,
        kind: &'static str,
        span: Span,
        position: Option<Position>,
    ) -> Self {
        Self {
            message: message.into(),
            kind,
            span,
            position,
        }
    }

    /// A statement with no lowering rule.
    pub fn unsupported_statement(kind: &'static str, span: Span, position: Option<Position>) -> Self {
        Self::new(
            format!("Unsupported statement node: {}", kind),
            kind,
            span,
            position,
        )
    }

    /// An expression with no lowering rule.
    pub fn unsupported_expression(
        kind: &'static str,
        span: Span,
        position: Option<Position>,
    ) -> Self {
        Self::new(
            format!("Unsupported expression node: {}", kind),
            kind,
            span,
            position,
        )
    }
}

fn location_suffix(position: &Option<Position>) -> String {
    Position::suffix(*position)
}
