//! JSON and JSON Lines dataset writers.

use std::io::Write;
use std::path::{Path, PathBuf};

use consult_model::{Dataset, DatasetMeta, Stats};
use serde::Serialize;

use crate::common::{create_writer, stats_sibling, write_error, write_pretty_json};
use crate::error::{OutputError, Result};

/// Meta and stats of a JSONL dataset, written beside the patient lines.
#[derive(Debug, Serialize)]
struct DatasetSummary<'a> {
    dataset_meta: &'a DatasetMeta,
    stats: &'a Stats,
}

/// Writes the whole dataset as one pretty-printed JSON document.
pub fn write_dataset_json(path: &Path, dataset: &Dataset) -> Result<()> {
    write_pretty_json(path, dataset)?;
    tracing::debug!(path = %path.display(), patients = dataset.patients.len(), "wrote dataset json");
    Ok(())
}

/// Writes one patient per line, plus `<stem>.stats.json` holding the meta
/// and stats. Returns the stats file path.
pub fn write_dataset_jsonl(path: &Path, dataset: &Dataset) -> Result<PathBuf> {
    let stats_path = stats_sibling(path)?;
    let mut writer = create_writer(path)?;
    for patient in &dataset.patients {
        serde_json::to_writer(&mut writer, patient).map_err(|source| OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer
            .write_all(b"\n")
            .map_err(|source| write_error(path, source))?;
    }
    writer.flush().map_err(|source| write_error(path, source))?;

    write_pretty_json(
        &stats_path,
        &DatasetSummary {
            dataset_meta: &dataset.dataset_meta,
            stats: &dataset.stats,
        },
    )?;
    tracing::debug!(
        path = %path.display(),
        stats = %stats_path.display(),
        patients = dataset.patients.len(),
        "wrote dataset jsonl"
    );
    Ok(stats_path)
}
