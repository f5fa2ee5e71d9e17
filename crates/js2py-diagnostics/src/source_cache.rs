//! Source file cache for diagnostic rendering.

use crate::position::{compute_line_starts, line_column};
use crate::position::{FileId, Location, Span};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A cached source file with line information.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub source: String,
    /// Byte offsets where each line starts
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, path: PathBuf, source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            id,
            path,
            source,
            line_starts,
        }
    }

    /// Get the line and column for a file-relative byte offset.
    pub fn line_column(&self, offset: u32) -> (u32, u32) {
        line_column(&self.line_starts, offset.min(self.source.len() as u32))
    }

    /// Get the text of a specific line (1-indexed).
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }

        let idx = (line - 1) as usize;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&e| e as usize)
            .unwrap_or(self.source.len());

        let text = self.source.get(start..end)?;
        Some(text.trim_end_matches('\n').trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Cache of source files for diagnostic rendering.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<FileId, SourceFile>,
    path_to_id: HashMap<PathBuf, FileId>,
    next_id: u32,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the cache, returning its FileId.
    /// If the path was already added, the existing FileId is returned.
    pub fn add_file(&mut self, path: impl AsRef<Path>, source: String) -> FileId {
        let path = path.as_ref().to_path_buf();

        if let Some(&id) = self.path_to_id.get(&path) {
            return id;
        }

        let id = FileId(self.next_id);
        self.next_id += 1;

        let file = SourceFile::new(id, path.clone(), source);
        self.files.insert(id, file);
        self.path_to_id.insert(path, id);

        id
    }

    pub fn get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(&id)
    }

    /// Resolve a span to a Location with file path, line, and column.
    pub fn location(&self, span: Span) -> Option<Location> {
        if span.is_dummy() {
            return None;
        }

        let file = self.files.get(&span.file_id)?;
        let (line, column) = file.line_column(span.start);

        Some(Location {
            file: file.path.to_string_lossy().into_owned(),
            line,
            column,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let mut cache = SourceCache::new();
        let id = cache.add_file("test.js", "hello\nworld\n".to_string());

        let file = cache.get_file(id).unwrap();

        assert_eq!(file.line_column(0), (1, 1));
        assert_eq!(file.line_column(4), (1, 5));
        assert_eq!(file.line_column(6), (2, 1));
        assert_eq!(file.line_column(7), (2, 2));
    }

    #[test]
    fn test_line_text() {
        let mut cache = SourceCache::new();
        let id = cache.add_file("test.js", "line one\r\nline two\nline three".to_string());

        let file = cache.get_file(id).unwrap();

        assert_eq!(file.line_text(1), Some("line one"));
        assert_eq!(file.line_text(2), Some("line two"));
        assert_eq!(file.line_text(3), Some("line three"));
        assert_eq!(file.line_text(4), None);
        assert_eq!(file.line_text(0), None);
    }

    #[test]
    fn test_same_path_reuses_id() {
        let mut cache = SourceCache::new();
        let first = cache.add_file("a.js", "1".to_string());
        let second = cache.add_file("a.js", "2".to_string());
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_location() {
        let mut cache = SourceCache::new();
        let id = cache.add_file("test.js", "var x = 42;\nvar y = 100;".to_string());

        let loc = cache.location(Span::new(id, 4, 5)).unwrap();
        assert_eq!((loc.line, loc.column), (1, 5));

        let loc = cache.location(Span::new(id, 16, 17)).unwrap();
        assert_eq!((loc.line, loc.column), (2, 5));
        assert_eq!(loc.to_string(), "test.js:2:5");

        assert!(cache.location(Span::DUMMY).is_none());
    }
}
