//! End-to-end dataset build.
//!
//! Stages run in order, each inside its own span:
//!
//! 1. **scales** - load the scale table (fatal on header problems)
//! 2. **transcripts** - discover, decode, and parse every transcript file
//! 3. **assemble** - merge parsed files into patients and join scale records
//!
//! Writing the dataset is left to the caller.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use consult_ingest::{TextDecoder, list_transcript_files, load_scale_table};
use consult_model::{Dataset, DatasetMeta, PipelineOptions};
use tracing::info_span;

use crate::assemble::{MergeWarning, PatientAssembler};
use crate::transcript::{read_transcript, source_file_name};

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub source_dir: PathBuf,
    pub scale_path: PathBuf,
    pub options: PipelineOptions,
}

/// The assembled dataset plus what the run found along the way.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub dataset: Dataset,
    pub warnings: Vec<MergeWarning>,
    /// Records loaded from the scale table.
    pub scale_records: usize,
    pub elapsed: Duration,
}

/// Runs discovery, parsing, and assembly.
///
/// Fails only when an input as a whole is unusable: a missing source
/// directory, an unreadable scale table, or an unknown encoding label.
/// Problems with single files or rows end up in the dataset stats.
pub fn run_pipeline(request: &PipelineRequest) -> Result<PipelineRun> {
    let started = Instant::now();
    let options = &request.options;

    let scales = {
        let _span = info_span!("scales").entered();
        load_scale_table(&request.scale_path, &options.scales).with_context(|| {
            format!("load scale table {}", request.scale_path.display())
        })?
    };

    let decoder = TextDecoder::from_labels(
        &options.transcripts.encoding,
        options.transcripts.fallback_encodings.as_slice(),
    )
    .context("resolve transcript encodings")?;

    let outcomes: Vec<_> = {
        let _span = info_span!("transcripts").entered();
        let files = list_transcript_files(&request.source_dir, &options.transcripts)
            .with_context(|| format!("list transcripts in {}", request.source_dir.display()))?;
        tracing::info!(count = files.len(), "discovered transcript files");
        files
            .iter()
            .map(|path| (source_file_name(path), read_transcript(path, &decoder)))
            .collect()
    };

    let _span = info_span!("assemble").entered();
    let mut assembler = PatientAssembler::new(&scales);
    assembler.record_scale_errors();
    for (source_file, outcome) in outcomes {
        assembler.add(&source_file, outcome);
    }

    let (dataset, warnings) = assembler.finish(DatasetMeta {
        schema_version: options.output.schema_version.clone(),
        patient_centered: true,
        source_dir: request.source_dir.display().to_string(),
        date_processing: chrono::Local::now().format("%Y-%m-%d").to_string(),
    });

    tracing::info!(
        files = dataset.stats.total_files,
        converted = dataset.stats.converted_files,
        failed = dataset.stats.failed_files,
        patients = dataset.patients.len(),
        visits = dataset.stats.total_visits,
        warnings = warnings.len(),
        "dataset assembled"
    );

    Ok(PipelineRun {
        dataset,
        warnings,
        scale_records: scales.len(),
        elapsed: started.elapsed(),
    })
}
