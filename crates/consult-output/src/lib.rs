//! Dataset writers.
//!
//! - **JSON**: the whole [`Dataset`] as one pretty-printed document
//! - **JSONL**: one patient per line, with meta and stats in a sibling
//!   `<stem>.stats.json`

mod common;
mod error;
mod json;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use consult_model::Dataset;

pub use error::{OutputError, Result};
pub use json::{write_dataset_json, write_dataset_jsonl};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// `.jsonl` and `.ndjson` paths are JSON Lines, anything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson") => {
                OutputFormat::Jsonl
            }
            _ => OutputFormat::Json,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Writes `dataset` to `path` and returns every file written.
pub fn write_dataset(path: &Path, dataset: &Dataset, format: OutputFormat) -> Result<Vec<PathBuf>> {
    match format {
        OutputFormat::Json => {
            write_dataset_json(path, dataset)?;
            Ok(vec![path.to_path_buf()])
        }
        OutputFormat::Jsonl => {
            let stats_path = write_dataset_jsonl(path, dataset)?;
            Ok(vec![path.to_path_buf(), stats_path])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.jsonl")), OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_path(Path::new("b.NDJSON")), OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_path(Path::new("b.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("b")), OutputFormat::Json);
    }

    #[test]
    fn format_parsing() {
        assert_eq!("JSONL".parse::<OutputFormat>(), Ok(OutputFormat::Jsonl));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
