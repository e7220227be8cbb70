//! Transcript parsing and patient-centered dataset assembly.
//!
//! Each transcript file is parsed on its own ([`parse_transcript`]) into
//! filename metadata, header keywords, and visits of speaker turns. The
//! [`PatientAssembler`] then merges files by sequence number and joins the
//! scale table. [`run_pipeline`] wires the stages together.

pub mod assemble;
pub mod filename;
pub mod header;
pub mod pipeline;
pub mod redact;
pub mod segment;
pub mod transcript;
pub mod turns;

pub use assemble::{MergeWarning, PatientAssembler};
pub use filename::{FilenameMetadata, FilenameParseError, parse_filename};
pub use header::{TranscriptSections, extract_keywords, split_sections};
pub use pipeline::{PipelineRequest, PipelineRun, run_pipeline};
pub use segment::{BOUNDARY_RULES, BoundaryRule, VisitSegments, is_boundary, segment_visits};
pub use transcript::{
    ParsedTranscript, ParsedVisit, TranscriptError, parse_transcript, read_transcript,
};
pub use turns::{ROLE_TABLE, SpeakerTag, TagPattern, TagRule, normalize_turns, resolve_speaker_tag};
