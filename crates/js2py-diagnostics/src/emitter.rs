//! Diagnostic emitters for different output formats.

use crate::diagnostic::{Diagnostic, Diagnostics, Severity};
use crate::position::Span;
use crate::source_cache::{SourceCache, SourceFile};
use console::{Style, StyledObject};
use std::io::Write;

/// Trait for emitting diagnostics in various formats.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()>;

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &Diagnostics, cache: &SourceCache) -> std::io::Result<()> {
        for diag in diagnostics.iter() {
            self.emit(diag, cache)?;
        }
        Ok(())
    }

    /// Emit a summary line.
    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()>;
}

/// Human-readable output for `js2py check`.
///
/// ```text
/// warning A001 EVAL_CALL: Use of eval makes static analysis unreliable.
///   at app.js (line 3, column 1)
///    3 | eval(code);
///      | ^^^^
///   help: Replace eval with an explicit dispatch table
/// ```
///
/// Transform notes carry their position in the message and have no span,
/// so they print as the header line alone.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Self { writer, colored }
    }

    fn paint<D: std::fmt::Display>(&self, style: Style, value: D) -> StyledObject<D> {
        style.force_styling(self.colored).apply_to(value)
    }

    fn severity_style(severity: Severity) -> Style {
        match severity {
            Severity::Error => Style::new().red().bold(),
            Severity::Warning => Style::new().yellow().bold(),
            Severity::Info => Style::new().cyan(),
        }
    }

    /// The source line under `span` with carets beneath the spanned bytes.
    fn write_snippet(&mut self, file: &SourceFile, span: Span, style: Style) -> std::io::Result<()> {
        let (line, column) = file.line_column(span.start);
        let Some(text) = file.line_text(line) else {
            return Ok(());
        };
        let number = line.to_string();
        let gutter = " ".repeat(number.len());
        let indent = (column - 1) as usize;
        // Multi-line spans stop at the end of the first line
        let carets = (span.width() as usize).min(text.len().saturating_sub(indent)).max(1);

        let bar = self.paint(Style::new().dim(), "|").to_string();
        let number = self.paint(Style::new().dim(), number).to_string();
        let carets = self.paint(style, "^".repeat(carets)).to_string();
        writeln!(self.writer, "   {} {} {}", number, bar, text)?;
        writeln!(self.writer, "   {} {} {}{}", gutter, bar, " ".repeat(indent), carets)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let style = Self::severity_style(diagnostic.severity);
        let heading = format!(
            "{} {} {}",
            diagnostic.severity.as_str(),
            diagnostic.code.as_str(),
            diagnostic.code.name()
        );
        let heading = self.paint(style.clone(), heading).to_string();
        writeln!(self.writer, "{}: {}", heading, diagnostic.message)?;

        if let Some(location) = cache.location(diagnostic.span) {
            writeln!(self.writer, "  at {} ({})", location.file, location.position())?;
            if let Some(file) = cache.get_file(diagnostic.span.file_id) {
                self.write_snippet(file, diagnostic.span, style)?;
            }
        }

        if let Some(help) = &diagnostic.explanation {
            let label = self.paint(Style::new().green(), "help:").to_string();
            writeln!(self.writer, "  {} {}", label, help)?;
        }
        Ok(())
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let counts = [
            (diagnostics.error_count(), "error"),
            (diagnostics.warning_count(), "warning"),
            (diagnostics.info_count(), "note"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, word)| format!("{} {}{}", count, word, if *count == 1 { "" } else { "s" }))
            .collect();
        if parts.is_empty() {
            return writeln!(self.writer, "no diagnostics");
        }

        let worst = diagnostics
            .iter()
            .map(|diag| diag.severity)
            .max()
            .unwrap_or(Severity::Info);
        let line = self.paint(Self::severity_style(worst), parts.join(", ")).to_string();
        writeln!(self.writer, "{}", line)
    }
}

/// JSON output for tooling integration.
pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let loc = cache.location(diagnostic.span);

        let json = serde_json::json!({
            "code": diagnostic.code.as_str(),
            "name": diagnostic.code.name(),
            "severity": diagnostic.severity.as_str(),
            "message": diagnostic.message,
            "location": loc.map(|l| serde_json::json!({
                "file": l.file,
                "line": l.line,
                "column": l.column,
            })),
            "span": if diagnostic.span.is_dummy() {
                serde_json::Value::Null
            } else {
                serde_json::json!({
                    "start": diagnostic.span.start,
                    "end": diagnostic.span.end,
                })
            },
            "help": diagnostic.explanation,
        });

        serde_json::to_writer(&mut self.writer, &json)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let summary = serde_json::json!({
            "type": "summary",
            "errors": diagnostics.error_count(),
            "warnings": diagnostics.warning_count(),
            "infos": diagnostics.info_count(),
            "total": diagnostics.len(),
        });
        serde_json::to_writer(&mut self.writer, &summary)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Line-oriented output: `WARNING app.js:3:1: message`.
///
/// Diagnostics without a span are attributed to `default_file` when set.
pub struct SimpleEmitter<W: Write> {
    writer: W,
    default_file: Option<String>,
}

impl<W: Write> SimpleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            default_file: None,
        }
    }

    pub fn with_default_file(mut self, file: impl Into<String>) -> Self {
        self.default_file = Some(file.into());
        self
    }
}

impl<W: Write> DiagnosticEmitter for SimpleEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let label = diagnostic.severity.label();

        match (cache.location(diagnostic.span), &self.default_file) {
            (Some(loc), _) => writeln!(
                self.writer,
                "{} {}:{}:{}: {}",
                label, loc.file, loc.line, loc.column, diagnostic.message
            ),
            (None, Some(file)) => {
                writeln!(self.writer, "{} {}: {}", label, file, diagnostic.message)
            }
            (None, None) => writeln!(self.writer, "{}: {}", label, diagnostic.message),
        }
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{} error(s), {} warning(s), {} note(s)",
            diagnostics.error_count(),
            diagnostics.warning_count(),
            diagnostics.info_count()
        )
    }
}
