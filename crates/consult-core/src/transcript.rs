//! Per-file transcript parsing.
//!
//! Parsing one file touches no shared state: the result is handed to the
//! [`PatientAssembler`](crate::assemble::PatientAssembler), which owns all
//! cross-file merging.

use std::path::Path;

use consult_ingest::{IngestError, TextDecoder};
use consult_model::Turn;
use thiserror::Error;

use crate::filename::{FilenameMetadata, FilenameParseError, parse_filename};
use crate::header::{extract_keywords, split_sections};
use crate::redact::redact_value;
use crate::segment::segment_visits;
use crate::turns::normalize_turns;

/// Why a single transcript file was skipped.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error(transparent)]
    FilenameParse(#[from] FilenameParseError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl TranscriptError {
    /// Short category for log lines that must not carry file contents.
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptError::FilenameParse(_) => "filename",
            TranscriptError::Ingest(IngestError::Decode { .. }) => "decode",
            TranscriptError::Ingest(_) => "read",
        }
    }
}

/// Everything recovered from one transcript file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTranscript {
    /// File name including extension, as recorded on each visit.
    pub source_file: String,
    pub metadata: FilenameMetadata,
    pub keywords: Vec<String>,
    pub visits: Vec<ParsedVisit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVisit {
    pub content: String,
    pub turns: Vec<Turn>,
}

/// Parses already-decoded transcript text.
///
/// `source_file` is the file name with extension; the extension is ignored
/// when reading patient metadata.
pub fn parse_transcript(source_file: &str, text: &str) -> Result<ParsedTranscript, TranscriptError> {
    let stem = Path::new(source_file)
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_else(|| source_file.into());
    let metadata = parse_filename(&stem)?;

    let sections = split_sections(text);
    let keywords = extract_keywords(&sections.header);
    let body = sections.body_text();
    let visits = segment_visits(&body)
        .map(|content| {
            let turns = normalize_turns(&content);
            ParsedVisit { content, turns }
        })
        .collect();

    Ok(ParsedTranscript {
        source_file: source_file.to_string(),
        metadata,
        keywords,
        visits,
    })
}

/// Reads, decodes, and parses the transcript at `path`.
///
/// The filename is checked before the file is read.
pub fn read_transcript(path: &Path, decoder: &TextDecoder) -> Result<ParsedTranscript, TranscriptError> {
    let source_file = source_file_name(path);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_filename(&stem)?;

    let text = decoder.read_to_string(path)?;
    let parsed = parse_transcript(&source_file, &text)?;
    tracing::debug!(
        file = redact_value(&source_file),
        visits = parsed.visits.len(),
        "parsed transcript"
    );
    Ok(parsed)
}

/// The file name recorded in errors and on each visit.
pub fn source_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
