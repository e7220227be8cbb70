//! Configuration options for a dataset build.
//!
//! Options can be loaded from a TOML file; every key is optional and falls
//! back to the defaults below.
//!
//! ```toml
//! [transcripts]
//! encoding = "utf-8"
//! fallback_encodings = ["gb18030"]
//!
//! [scales]
//! id_column = "序号"
//! gad7_prefix = "G"
//! phq9_prefix = "P"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::DEFAULT_SCHEMA_VERSION;
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub transcripts: TranscriptOptions,
    pub scales: ScaleOptions,
    pub output: OutputOptions,
}

impl PipelineOptions {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| ModelError::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content, path)
    }
}

/// How transcript files are found and decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptOptions {
    /// File extension without the dot, matched case-insensitively.
    pub extension: String,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Primary text encoding label (WHATWG names such as `utf-8`, `gb18030`).
    pub encoding: String,
    /// Encodings tried in order when the primary one fails.
    pub fallback_encodings: Vec<String>,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
            recursive: true,
            encoding: "utf-8".to_string(),
            fallback_encodings: Vec::new(),
        }
    }
}

/// Column contract of the scale table.
///
/// Item columns are resolved either from the explicit lists or, when those
/// are absent, as the header starting with `<prefix><n>.` for item `n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleOptions {
    pub id_column: String,
    pub gad7_prefix: String,
    pub phq9_prefix: String,
    pub gad7_columns: Option<Vec<String>>,
    pub phq9_columns: Option<Vec<String>>,
    /// Highest valid score for a single item.
    pub max_item_score: u8,
    pub encoding: String,
    pub delimiter: char,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            id_column: "序号".to_string(),
            gad7_prefix: "G".to_string(),
            phq9_prefix: "P".to_string(),
            gad7_columns: None,
            phq9_columns: None,
            max_item_score: 3,
            encoding: "utf-8".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    pub schema_version: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
        }
    }
}
