use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{OutputError, Result};

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

pub fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|source| write_error(path, source))?;
    Ok(BufWriter::new(file))
}

pub fn write_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `value` as pretty JSON followed by a newline.
pub fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = create_writer(path)?;
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|source| write_error(path, source))
}

/// `<dir>/<stem>.stats.json` next to `path`.
pub fn stats_sibling(path: &Path) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| OutputError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    let mut name = stem.to_os_string();
    name.push(".stats.json");
    Ok(path.with_file_name(name))
}
