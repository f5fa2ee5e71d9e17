//! Per-run state for one transformation.

use js2py_diagnostics::{LineIndex, Position};
use swc_common::Span;

use crate::error::TransformError;

/// Deepest statement/expression nesting lowered before giving up.
pub const MAX_DEPTH: usize = 512;

/// State threaded through the lowering functions of one run.
///
/// Nothing here is shared between runs, so separate transformations can
/// proceed on separate threads over the same syntax tree.
#[derive(Debug)]
pub struct TransformContext<'a> {
    /// Name of the input, for logs
    source_name: String,
    /// Resolves node spans; without it messages carry no location
    lines: Option<&'a LineIndex>,
    /// Soft diagnostics in the order they were recorded
    diagnostics: Vec<String>,
    /// Current nesting of `transform_stmt`/`transform_expr` calls
    depth: usize,
    max_depth: usize,
}

impl<'a> TransformContext<'a> {
    pub fn new(source_name: impl Into<String>, lines: Option<&'a LineIndex>) -> Self {
        Self {
            source_name: source_name.into(),
            lines,
            diagnostics: Vec::new(),
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    /// Lower the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.diagnostics
    }

    pub fn position(&self, span: Span) -> Option<Position> {
        self.lines.and_then(|lines| lines.position(span.lo.0))
    }

    /// Record a soft diagnostic, suffixed with the node's location.
    pub fn note(&mut self, message: &str, span: Span) {
        let diagnostic = format!("{}{}", message, Position::suffix(self.position(span)));
        log::debug!("{}: {}", self.source_name, diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&self, message: impl Into<String>, kind: &'static str, span: Span) -> TransformError {
        TransformError::new(message, kind, span, self.position(span))
    }

    pub(crate) fn enter(&mut self, kind: &'static str, span: Span) -> Result<(), TransformError> {
        if self.depth >= self.max_depth {
            return Err(self.error("Maximum nesting depth exceeded.", kind, span));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
