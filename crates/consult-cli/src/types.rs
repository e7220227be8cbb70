use std::path::PathBuf;

use consult_core::PipelineRun;
use consult_model::{Patient, Severity};
use consult_output::OutputFormat;

/// Result of `consult-dataset build`.
#[derive(Debug)]
pub struct BuildResult {
    pub run: PipelineRun,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Files written; empty on a dry run.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

impl BuildResult {
    pub fn has_errors(&self) -> bool {
        self.run.dataset.stats.has_errors()
    }
}

/// Patients per severity band, one count per scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityRow {
    pub severity: Severity,
    pub gad7: usize,
    pub phq9: usize,
}

/// Counts every patient's first scale record into its GAD-7 and PHQ-9 bands.
pub fn severity_distribution(patients: &[Patient]) -> Vec<SeverityRow> {
    let mut rows: Vec<SeverityRow> = Severity::ALL
        .iter()
        .map(|&severity| SeverityRow {
            severity,
            gad7: 0,
            phq9: 0,
        })
        .collect();
    for record in patients.iter().filter_map(|patient| patient.scales.first()) {
        let gad7 = record.gad7_severity();
        let phq9 = record.phq9_severity();
        for row in &mut rows {
            if row.severity == gad7 {
                row.gad7 += 1;
            }
            if row.severity == phq9 {
                row.phq9 += 1;
            }
        }
    }
    rows
}

/// One row of `consult-dataset parse-name` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub input: String,
    pub outcome: Result<consult_core::FilenameMetadata, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_model::{ScaleRecord, SequenceNumber};

    #[test]
    fn distribution_counts_each_scale() {
        let mut mild = Patient::new(SequenceNumber::new(1).patient_id(), "甲");
        // GAD-7 total 7 (mild), PHQ-9 total 9 (mild).
        mild.scales.push(ScaleRecord::self_reported([1; 7], [1; 9]));
        let mut severe = Patient::new(SequenceNumber::new(2).patient_id(), "乙");
        // GAD-7 total 21 (severe), PHQ-9 total 0 (minimal).
        severe.scales.push(ScaleRecord::self_reported([3; 7], [0; 9]));
        let unscored = Patient::new(SequenceNumber::new(3).patient_id(), "丙");

        let rows = severity_distribution(&[mild, severe, unscored]);
        assert_eq!(rows.len(), Severity::ALL.len());
        let total_gad7: usize = rows.iter().map(|row| row.gad7).sum();
        let total_phq9: usize = rows.iter().map(|row| row.phq9).sum();
        assert_eq!(total_gad7, 2);
        assert_eq!(total_phq9, 2);

        let find = |severity| rows.iter().find(|row| row.severity == severity).unwrap();
        assert_eq!(find(Severity::Mild).gad7, 1);
        assert_eq!(find(Severity::Mild).phq9, 1);
        assert_eq!(find(Severity::Severe).gad7, 1);
        assert_eq!(find(Severity::Minimal).phq9, 1);
    }
}
