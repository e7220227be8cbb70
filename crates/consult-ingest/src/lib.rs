//! Source data ingestion for the outpatient dialogue dataset.
//!
//! # Features
//!
//! - **Transcript Discovery**: Find transcript files under a source folder
//! - **Text Decoding**: Strict decoding with a configured encoding and fallbacks
//! - **Scale Table Loading**: Read GAD-7/PHQ-9 item scores keyed by sequence number
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use consult_ingest::{list_transcript_files, load_scale_table, TextDecoder};
//! use consult_model::PipelineOptions;
//!
//! let options = PipelineOptions::default();
//! let files = list_transcript_files(Path::new("dialogues"), &options.transcripts)?;
//! let scales = load_scale_table(Path::new("score.csv"), &options.scales)?;
//! let decoder = TextDecoder::from_labels("utf-8", &["gb18030"])?;
//! let text = decoder.read_to_string(&files[0])?;
//! ```

mod decode;
mod discovery;
mod error;
mod scale;

// === Error Types ===
pub use error::{IngestError, Result};

// === Text Decoding ===
pub use decode::TextDecoder;

// === File Discovery ===
pub use discovery::list_transcript_files;

// === Scale Table ===
pub use scale::{ScaleRowError, ScaleTable, load_scale_table, parse_scale_table};
