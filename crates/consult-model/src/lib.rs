//! Data model for the patient-centered outpatient dialogue dataset.
//!
//! One [`Patient`] per distinct sequence number, owning its scale records and
//! an ordered list of visits. Each visit holds the verbatim dialogue text and
//! its speaker turns. [`Stats`] accumulates run-wide counters and per-file
//! diagnostics.

pub mod dataset;
pub mod enums;
pub mod error;
pub mod ids;
pub mod options;
pub mod patient;
pub mod scale;

pub use dataset::{DEFAULT_SCHEMA_VERSION, Dataset, DatasetMeta, ErrorRecord, Stats};
pub use enums::{Gender, Respondent, Role};
pub use error::{ModelError, Result};
pub use ids::{PatientId, SequenceNumber, VisitId};
pub use options::{OutputOptions, PipelineOptions, ScaleOptions, TranscriptOptions};
pub use patient::{Dialogue, Patient, Turn, Visit};
pub use scale::{
    GAD7_ITEM_COUNT, Gad7Scores, ItemScores, PHQ9_ITEM_COUNT, Phq9Scores, ScaleRecord, Severity,
};
