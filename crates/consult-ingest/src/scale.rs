//! Scale table loading.
//!
//! The table holds one row per patient sequence number with seven GAD-7 and
//! nine PHQ-9 item columns. Header problems are fatal; a bad row is recorded
//! and skipped so the rest of the table still loads.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use consult_model::{
    GAD7_ITEM_COUNT, PHQ9_ITEM_COUNT, ScaleOptions, ScaleRecord, SequenceNumber,
};
use csv::{ReaderBuilder, StringRecord};

use crate::decode::TextDecoder;
use crate::error::{IngestError, Result};

/// A row that could not be turned into a [`ScaleRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRowError {
    /// 1-based line number in the source file.
    pub row: u64,
    pub sequence: Option<SequenceNumber>,
    pub message: String,
}

impl fmt::Display for ScaleRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sequence {
            Some(sequence) => write!(f, "row {} (sequence {}): {}", self.row, sequence, self.message),
            None => write!(f, "row {}: {}", self.row, self.message),
        }
    }
}

/// Scale records keyed by sequence number, plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ScaleTable {
    pub source: PathBuf,
    pub records: BTreeMap<SequenceNumber, ScaleRecord>,
    pub errors: Vec<ScaleRowError>,
    /// Non-empty data rows seen, including skipped ones.
    pub row_count: usize,
}

impl ScaleTable {
    pub fn get(&self, sequence: SequenceNumber) -> Option<&ScaleRecord> {
        self.records.get(&sequence)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads and parses the scale table at `path`.
pub fn load_scale_table(path: &Path, options: &ScaleOptions) -> Result<ScaleTable> {
    let decoder = TextDecoder::from_labels(&options.encoding, &[] as &[&str])?;
    let text = decoder.read_to_string(path)?;
    parse_scale_table(&text, path, options)
}

/// Parses scale table text already read from `source`.
pub fn parse_scale_table(text: &str, source: &Path, options: &ScaleOptions) -> Result<ScaleTable> {
    if !options.delimiter.is_ascii() {
        return Err(IngestError::InvalidDelimiter {
            delimiter: options.delimiter,
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter as u8)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::CsvParse {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();

    let columns = ScaleColumns::resolve(&headers, source, options)?;
    tracing::debug!(
        path = %source.display(),
        id_column = columns.id,
        gad7 = ?columns.gad7,
        phq9 = ?columns.phq9,
        "resolved scale columns"
    );

    let mut table = ScaleTable {
        source: source.to_path_buf(),
        ..ScaleTable::default()
    };

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let row = e
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(fallback_line);
                table.row_count += 1;
                table.errors.push(ScaleRowError {
                    row,
                    sequence: None,
                    message: format!("malformed row: {e}"),
                });
                continue;
            }
        };
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        table.row_count += 1;
        let row = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(fallback_line);

        match columns.read_row(&record, &headers, options.max_item_score) {
            Ok((sequence, scale)) => {
                if table.records.contains_key(&sequence) {
                    table.errors.push(ScaleRowError {
                        row,
                        sequence: Some(sequence),
                        message: "duplicate sequence number, first row kept".to_string(),
                    });
                    continue;
                }
                table.records.insert(sequence, scale);
            }
            Err((sequence, message)) => {
                table.errors.push(ScaleRowError {
                    row,
                    sequence,
                    message,
                });
            }
        }
    }

    for error in &table.errors {
        tracing::warn!(path = %source.display(), row = error.row, "skipped scale row: {}", error.message);
    }
    tracing::info!(
        path = %source.display(),
        rows = table.row_count,
        records = table.records.len(),
        skipped = table.errors.len(),
        "scale table loaded"
    );
    Ok(table)
}

/// Column indexes for the id and the item scores.
#[derive(Debug)]
struct ScaleColumns {
    id: usize,
    gad7: [usize; GAD7_ITEM_COUNT],
    phq9: [usize; PHQ9_ITEM_COUNT],
}

type RowFailure = (Option<SequenceNumber>, String);

impl ScaleColumns {
    fn resolve(headers: &[String], source: &Path, options: &ScaleOptions) -> Result<Self> {
        let id_column = normalize_header(&options.id_column);
        let id = headers
            .iter()
            .position(|header| *header == id_column)
            .ok_or_else(|| IngestError::MissingColumn {
                column: options.id_column.clone(),
                path: source.to_path_buf(),
            })?;
        let gad7 = resolve_items::<GAD7_ITEM_COUNT>(
            "GAD-7",
            headers,
            source,
            &options.gad7_prefix,
            options.gad7_columns.as_deref(),
        )?;
        let phq9 = resolve_items::<PHQ9_ITEM_COUNT>(
            "PHQ-9",
            headers,
            source,
            &options.phq9_prefix,
            options.phq9_columns.as_deref(),
        )?;
        Ok(Self { id, gad7, phq9 })
    }

    fn read_row(
        &self,
        record: &StringRecord,
        headers: &[String],
        max_item_score: u8,
    ) -> std::result::Result<(SequenceNumber, ScaleRecord), RowFailure> {
        let raw_id = record.get(self.id).unwrap_or("").trim();
        if raw_id.is_empty() {
            return Err((None, "missing sequence number".to_string()));
        }
        let sequence = parse_sequence_cell(raw_id)
            .ok_or_else(|| (None, format!("invalid sequence number '{raw_id}'")))?;

        let mut problems = Vec::new();
        let gad7 = read_items(record, headers, &self.gad7, max_item_score, &mut problems);
        let phq9 = read_items(record, headers, &self.phq9, max_item_score, &mut problems);
        if !problems.is_empty() {
            return Err((Some(sequence), problems.join("; ")));
        }
        Ok((sequence, ScaleRecord::self_reported(gad7, phq9)))
    }
}

fn resolve_items<const N: usize>(
    scale: &'static str,
    headers: &[String],
    source: &Path,
    prefix: &str,
    explicit: Option<&[String]>,
) -> Result<[usize; N]> {
    let mut indexes = [0usize; N];
    match explicit {
        Some(columns) => {
            if columns.len() != N {
                return Err(IngestError::ItemColumnCount {
                    scale,
                    expected: N,
                    found: columns.len(),
                });
            }
            for (slot, column) in indexes.iter_mut().zip(columns) {
                let wanted = normalize_header(column);
                *slot = headers
                    .iter()
                    .position(|header| *header == wanted)
                    .ok_or_else(|| IngestError::MissingColumn {
                        column: column.clone(),
                        path: source.to_path_buf(),
                    })?;
            }
        }
        None => {
            for (item, slot) in indexes.iter_mut().enumerate() {
                let number = item + 1;
                *slot = headers
                    .iter()
                    .position(|header| is_item_header(header, prefix, number))
                    .ok_or_else(|| IngestError::MissingColumn {
                        column: format!("{prefix}{number}."),
                        path: source.to_path_buf(),
                    })?;
            }
        }
    }
    Ok(indexes)
}

/// `G3`, `G3. 在过去2个星期…`, `G3．…`, `G3、…` all name GAD-7 item 3.
fn is_item_header(header: &str, prefix: &str, number: usize) -> bool {
    let Some(rest) = header.strip_prefix(prefix) else {
        return false;
    };
    let Some(tail) = rest.strip_prefix(number.to_string().as_str()) else {
        return false;
    };
    tail.is_empty() || tail.starts_with(['.', '．', '、', ' ', '_', ':', '：'])
}

fn read_items<const N: usize>(
    record: &StringRecord,
    headers: &[String],
    indexes: &[usize; N],
    max_item_score: u8,
    problems: &mut Vec<String>,
) -> [u8; N] {
    let mut items = [0u8; N];
    for (slot, &index) in items.iter_mut().zip(indexes) {
        let column = headers.get(index).map(String::as_str).unwrap_or("?");
        let raw = record.get(index).unwrap_or("").trim();
        if raw.is_empty() {
            problems.push(format!("missing value in column '{column}'"));
            continue;
        }
        match parse_score(raw) {
            Some(score) if score <= u32::from(max_item_score) => {
                // Bounded by max_item_score, which is a u8.
                *slot = score as u8;
            }
            Some(score) => problems.push(format!(
                "value {score} in column '{column}' exceeds maximum {max_item_score}"
            )),
            None => problems.push(format!("non-numeric value '{raw}' in column '{column}'")),
        }
    }
    items
}

/// Integers, or integral decimals as written by spreadsheet exports.
fn parse_score(raw: &str) -> Option<u32> {
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_sequence_cell(raw: &str) -> Option<SequenceNumber> {
    if let Ok(sequence) = SequenceNumber::parse(raw) {
        return Some(sequence);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < 9.0e15 {
        Some(SequenceNumber::new(value as u64))
    } else {
        None
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
