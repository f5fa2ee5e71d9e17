//! Diagnostic infrastructure for the js2py JavaScript to Python translator.
//!
//! This crate provides structured error reporting with:
//! - Source location tracking (file, line, column)
//! - Line indexes that turn parser byte positions into line/column pairs
//! - Diagnostic codes shared by the parser, analyzer and transformer
//! - Multiple output formats (terminal, JSON, simple text)
//!
//! # Example
//!
//! ```
//! use js2py_diagnostics::{
//!     Diagnostic, DiagnosticCode, SourceCache, Span,
//!     TerminalEmitter, DiagnosticEmitter,
//! };
//!
//! let mut cache = SourceCache::new();
//! let file_id = cache.add_file("app.js", "eval(code);".to_string());
//!
//! let diag = Diagnostic::warning(DiagnosticCode::EvalCall, "Use of eval makes static analysis unreliable.")
//!     .with_span(Span::new(file_id, 0, 4))
//!     .with_help("Replace eval with an explicit dispatch table")
//!     .build();
//!
//! let stderr = std::io::stderr();
//! let mut emitter = TerminalEmitter::new(stderr.lock(), false);
//! emitter.emit(&diag, &cache).unwrap();
//! ```

pub mod diagnostic;
pub mod emitter;
pub mod position;
pub mod source_cache;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Diagnostics, Severity};
pub use emitter::{DiagnosticEmitter, JsonEmitter, SimpleEmitter, TerminalEmitter};
pub use position::{FileId, LineIndex, Location, Position, Span};
pub use source_cache::{SourceCache, SourceFile};
