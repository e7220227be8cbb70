use serde::{Deserialize, Serialize};

use crate::patient::Patient;

pub const DEFAULT_SCHEMA_VERSION: &str = "0.2";

/// The assembled output handed to the dataset writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub dataset_meta: DatasetMeta,
    pub stats: Stats,
    pub patients: Vec<Patient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub schema_version: String,
    pub patient_centered: bool,
    pub source_dir: String,
    /// Local date of the run, `YYYY-MM-DD`.
    pub date_processing: String,
}

/// Run-wide counters and the per-file diagnostics collected along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_files: usize,
    pub converted_files: usize,
    pub failed_files: usize,
    pub patients_with_keywords: usize,
    pub patients_with_gender: usize,
    pub patients_with_age: usize,
    pub patients_with_scales: usize,
    pub total_visits: usize,
    pub errors: Vec<ErrorRecord>,
}

impl Stats {
    pub fn record_error(&mut self, file: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ErrorRecord {
            file: file.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: String,
    pub message: String,
}
