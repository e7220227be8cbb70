//! Patient-centered assembly of parsed transcripts.
//!
//! Files are folded in one at a time. Patients keep first-seen order, visits
//! keep file order then in-file order, and every counter in [`Stats`] is
//! updated as files arrive.

use std::collections::HashMap;
use std::fmt;

use consult_ingest::ScaleTable;
use consult_model::{
    Dataset, DatasetMeta, Dialogue, Patient, PatientId, SequenceNumber, Stats, Visit, VisitId,
};

use crate::redact::redact_value;
use crate::transcript::{ParsedTranscript, TranscriptError};

/// A non-fatal finding from joining transcripts with the scale table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// A patient has no scale row under any of their sequence numbers.
    MissingScale { patient_id: PatientId },
    /// A scale row matched no transcript file.
    UnmatchedScaleRow { sequence: SequenceNumber },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::MissingScale { patient_id } => {
                write!(f, "no scale record for patient {patient_id}")
            }
            MergeWarning::UnmatchedScaleRow { sequence } => {
                write!(f, "scale row {sequence} matches no transcript")
            }
        }
    }
}

/// Builds the patient list from parsed transcripts and a scale table.
#[derive(Debug)]
pub struct PatientAssembler<'a> {
    scales: &'a ScaleTable,
    patients: Vec<Patient>,
    /// Sequence numbers of each patient, primary first.
    sequences: Vec<Vec<SequenceNumber>>,
    /// Every known sequence number, primary or alias, to its patient slot.
    index: HashMap<SequenceNumber, usize>,
    stats: Stats,
}

impl<'a> PatientAssembler<'a> {
    pub fn new(scales: &'a ScaleTable) -> Self {
        Self {
            scales,
            patients: Vec::new(),
            sequences: Vec::new(),
            index: HashMap::new(),
            stats: Stats::default(),
        }
    }

    /// Records scale rows that were skipped while loading the table.
    pub fn record_scale_errors(&mut self) {
        let source = self.scales.source.display().to_string();
        for error in &self.scales.errors {
            self.stats.record_error(source.clone(), error.to_string());
        }
    }

    /// Folds in the outcome of parsing one file.
    pub fn add(&mut self, source_file: &str, outcome: Result<ParsedTranscript, TranscriptError>) {
        self.stats.total_files += 1;
        match outcome {
            Ok(parsed) => {
                self.merge(parsed);
                self.stats.converted_files += 1;
            }
            Err(error) => {
                let message = error.to_string();
                tracing::warn!(
                    file = redact_value(source_file),
                    kind = error.kind(),
                    error = redact_value(&message),
                    "skipped transcript"
                );
                self.stats.failed_files += 1;
                self.stats.record_error(source_file, message);
            }
        }
    }

    fn merge(&mut self, parsed: ParsedTranscript) {
        let ParsedTranscript {
            source_file,
            metadata,
            keywords,
            visits,
        } = parsed;

        let slot = match metadata
            .sequences()
            .find_map(|sequence| self.index.get(&sequence).copied())
        {
            Some(slot) => slot,
            None => {
                let primary = metadata.primary;
                self.patients
                    .push(Patient::new(primary.patient_id(), metadata.name.clone()));
                self.sequences.push(vec![primary]);
                self.patients.len() - 1
            }
        };
        for sequence in metadata.sequences() {
            if self.index.get(&sequence).is_some_and(|&known| known != slot) {
                tracing::warn!(
                    file = redact_value(&source_file),
                    %sequence,
                    "sequence number already belongs to another patient"
                );
                continue;
            }
            self.index.insert(sequence, slot);
            if !self.sequences[slot].contains(&sequence) {
                self.sequences[slot].push(sequence);
            }
        }

        let key = self.sequences[slot][0];
        let patient = &mut self.patients[slot];
        let stats = &mut self.stats;

        if patient.gender.is_none() && metadata.gender.is_some() {
            patient.gender = metadata.gender;
            stats.patients_with_gender += 1;
        }
        if patient.age.is_none() && metadata.age.is_some() {
            patient.age = metadata.age;
            stats.patients_with_age += 1;
        }

        let had_keywords = !patient.keywords.is_empty();
        patient.merge_keywords(&keywords);
        if !had_keywords && !patient.keywords.is_empty() {
            stats.patients_with_keywords += 1;
        }

        let added = visits.len();
        for visit in visits {
            let visit_id = VisitId::for_position(key, patient.visits.len());
            patient.visits.push(Visit {
                visit_id,
                dialogue: Dialogue {
                    source_file: source_file.clone(),
                    content: visit.content,
                    turns: visit.turns,
                },
            });
        }
        stats.total_visits += added;

        if patient.scales.is_empty() {
            let record = self.sequences[slot]
                .iter()
                .find_map(|&sequence| self.scales.get(sequence));
            if let Some(record) = record {
                patient.scales.push(record.clone());
                stats.patients_with_scales += 1;
            }
        }

        tracing::debug!(
            file = redact_value(&source_file),
            patient_id = %patient.patient_id,
            visits = added,
            "merged transcript"
        );
    }

    /// Finishes assembly, returning the dataset and the merge warnings.
    pub fn finish(self, dataset_meta: DatasetMeta) -> (Dataset, Vec<MergeWarning>) {
        let mut warnings = Vec::new();
        for patient in &self.patients {
            if patient.scales.is_empty() {
                warnings.push(MergeWarning::MissingScale {
                    patient_id: patient.patient_id.clone(),
                });
            }
        }
        for &sequence in self.scales.records.keys() {
            if !self.index.contains_key(&sequence) {
                warnings.push(MergeWarning::UnmatchedScaleRow { sequence });
            }
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let dataset = Dataset {
            dataset_meta,
            stats: self.stats,
            patients: self.patients,
        };
        (dataset, warnings)
    }
}
