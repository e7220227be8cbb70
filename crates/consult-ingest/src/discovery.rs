//! Transcript file discovery.

use std::path::{Path, PathBuf};

use consult_model::TranscriptOptions;

use crate::error::{IngestError, Result};

/// Lists transcript files under `dir` with the configured extension.
///
/// Returns files sorted by path so runs are reproducible. Symlinked
/// directories are not followed.
pub fn list_transcript_files(dir: &Path, options: &TranscriptOptions) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let extension = options.extension.trim_start_matches('.');
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;

        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| IngestError::DirectoryRead {
                path: path.clone(),
                source: e,
            })?;

            if file_type.is_dir() {
                if options.recursive {
                    pending.push(path);
                }
                continue;
            }

            if file_type.is_symlink() && path.is_dir() {
                continue;
            }
            if has_extension(&path, extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
