//! Source positions: parser byte offsets, file-relative spans and the
//! 1-based line/column pairs shown to users.
//!
//! SWC numbers bytes across its whole source map, so a file's first byte
//! sits at a non-zero base. [`LineIndex`] strips that base; everything
//! else in this module is relative to the start of one file.

use serde::{Deserialize, Serialize};

/// Index of a file registered in a [`SourceCache`](crate::SourceCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// No file; carried by diagnostics that report their location in the
    /// message text instead.
    pub const DUMMY: FileId = FileId(u32::MAX);
}

/// A file-relative byte range, `start` inclusive and `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file_id: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span {
        file_id: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    pub fn new(file_id: FileId, start: u32, end: u32) -> Self {
        Self { file_id, start, end }
    }

    pub fn is_dummy(&self) -> bool {
        self.file_id == FileId::DUMMY
    }

    /// Width in bytes; at least 1 so a caret always has something to mark.
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start).max(1)
    }
}

/// A 1-based line and column in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The suffix appended to messages that carry a location,
    /// e.g. `" (line 3, column 5)"`.
    pub fn suffix(position: Option<Position>) -> String {
        match position {
            Some(pos) => format!(" ({})", pos),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A [`Position`] in a named file. Displays as `file:line:column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Maps the parser's absolute byte positions to line/column pairs.
///
/// The parser numbers bytes across its whole source map, so every file
/// starts at some `base` offset. The index subtracts it before looking up
/// the line table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    base: u32,
    len: u32,
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str, base: u32) -> Self {
        Self {
            base,
            len: source.len() as u32,
            line_starts: compute_line_starts(source),
        }
    }

    /// First absolute position of the file.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of lines in the indexed source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// File-relative byte offset for an absolute position.
    pub fn offset(&self, pos: u32) -> u32 {
        pos.saturating_sub(self.base).min(self.len)
    }

    /// Resolve an absolute position. Positions before the file start
    /// (including the parser's dummy position) have no location.
    pub fn position(&self, pos: u32) -> Option<Position> {
        if pos < self.base {
            return None;
        }
        let (line, column) = line_column(&self.line_starts, self.offset(pos));
        Some(Position::new(line, column))
    }

    /// Convert an absolute `lo..hi` range into a file-relative [`Span`].
    pub fn span(&self, file_id: FileId, lo: u32, hi: u32) -> Span {
        if lo < self.base {
            return Span::DUMMY;
        }
        Span::new(file_id, self.offset(lo), self.offset(hi.max(lo)))
    }
}

/// Compute the byte offset where each line starts.
pub(crate) fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut starts = vec![0];
    for (i, c) in source.char_indices() {
        if c == '\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// Binary search the line containing `offset`; both results are 1-based.
pub(crate) fn line_column(line_starts: &[u32], offset: u32) -> (u32, u32) {
    let line_idx = match line_starts.binary_search(&offset) {
        Ok(idx) => idx,
        Err(idx) => idx.saturating_sub(1),
    };
    let line_start = line_starts.get(line_idx).copied().unwrap_or(0);
    let line = (line_idx + 1) as u32;
    let column = (offset - line_start + 1).max(1);
    (line, column)
}
