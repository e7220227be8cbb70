//! Error types for transcript and scale table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading source data.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Encoding Errors ===
    /// Configured encoding label is not known to `encoding_rs`.
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// File bytes are not valid in any of the attempted encodings.
    #[error("cannot decode {path} as {attempted}")]
    Decode { path: PathBuf, attempted: String },

    // === Scale Table Errors ===
    /// Delimiter must be a single ASCII character.
    #[error("invalid CSV delimiter '{delimiter}'")]
    InvalidDelimiter { delimiter: char },

    /// Failed to parse the table header.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Required column not found in the table header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Explicit item column list has the wrong length.
    #[error("{scale} needs {expected} item columns, {found} configured")]
    ItemColumnCount {
        scale: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::Decode {
            path: PathBuf::from("/data/1 张三.txt"),
            attempted: "UTF-8, gb18030".to_string(),
        };
        assert_eq!(err.to_string(), "cannot decode /data/1 张三.txt as UTF-8, gb18030");
    }
}
