//! Persisted parse artifacts, keyed by source hash.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ParseError, ParseResult, SourceType};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cache artifact {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What a parse run leaves on disk for later runs and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseArtifact {
    pub source_name: String,
    pub source_hash: String,
    pub source_type: SourceType,
    pub errors: Vec<ParseError>,
    /// Top-level statement count, zero when no program was produced
    pub statements: usize,
}

impl From<&ParseResult> for ParseArtifact {
    fn from(result: &ParseResult) -> Self {
        Self {
            source_name: result.source_name.clone(),
            source_hash: result.source_hash.clone(),
            source_type: result.source_type,
            errors: result.errors.clone(),
            statements: result.statement_count(),
        }
    }
}

fn artifact_path(cache_dir: &Path, source_hash: &str) -> PathBuf {
    cache_dir.join(format!("{}.json", source_hash))
}

/// Write `<cache_dir>/<source_hash>.json`, creating the directory if needed.
pub fn persist_parse(cache_dir: &Path, result: &ParseResult) -> Result<PathBuf, CacheError> {
    fs::create_dir_all(cache_dir).map_err(|source| CacheError::Io {
        path: cache_dir.to_path_buf(),
        source,
    })?;

    let path = artifact_path(cache_dir, &result.source_hash);
    let artifact = ParseArtifact::from(result);
    let json = serde_json::to_string_pretty(&artifact).map_err(|source| CacheError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| CacheError::Io {
        path: path.clone(),
        source,
    })?;

    log::debug!("wrote parse artifact {}", path.display());
    Ok(path)
}

/// Read back the artifact stored for `source_hash`.
pub fn load_artifact(cache_dir: &Path, source_hash: &str) -> Result<ParseArtifact, CacheError> {
    let path = artifact_path(cache_dir, source_hash);
    let text = fs::read_to_string(&path).map_err(|source| CacheError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CacheError::Json { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_program;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "js2py-parser-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_persist_and_load() {
        let dir = temp_dir("persist");
        let result = parse_program("var a = 1;\nvar b = 2;", SourceType::Script);

        let path = persist_parse(&dir, &result).unwrap();
        assert!(path.ends_with(format!("{}.json", result.source_hash)));

        let artifact = load_artifact(&dir, &result.source_hash).unwrap();
        assert_eq!(artifact.statements, 2);
        assert_eq!(artifact.source_type, SourceType::Script);
        assert!(artifact.errors.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_errors_are_persisted() {
        let dir = temp_dir("errors");
        let result = parse_program("var = ;", SourceType::Script);
        persist_parse(&dir, &result).unwrap();

        let artifact = load_artifact(&dir, &result.source_hash).unwrap();
        assert_eq!(artifact.statements, 0);
        assert_eq!(artifact.errors, result.errors);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = temp_dir("missing");
        let err = load_artifact(&dir, "deadbeef").unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }
}
