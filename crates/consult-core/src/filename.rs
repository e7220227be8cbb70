//! Patient identity and demographics from transcript filenames.
//!
//! Filenames look like `10086，张三 男 34岁`: a sequence number (or several,
//! separated by `，`), optional separators, then free text. The free text is
//! matched against three templates in order, first match wins:
//!
//! 1. `name gender age` (`34` or `34岁`)
//! 2. `name gender`
//! 3. anything else is the name

use std::sync::LazyLock;

use consult_model::{Gender, SequenceNumber};
use regex::Regex;
use thiserror::Error;

static BASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\s*[，,、]\s*\d+)*)[\s，,、]*(.*)$").expect("valid base pattern")
});

static SEQUENCE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[，,、]\s*").expect("valid separator pattern"));

static NAME_GENDER_AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)[\s，,、]+(?P<gender>男|女)[\s，,、]*(?P<age>\d{1,3})\s*岁?$")
        .expect("valid name/gender/age pattern")
});

static NAME_GENDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)[\s，,、]+(?P<gender>男|女)$").expect("valid name/gender pattern")
});

const FIELD_SEPARATORS: &[char] = &['，', ',', '、'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameParseError {
    #[error("filename does not start with a sequence number")]
    MissingSequence,
    #[error("filename has no patient name after the sequence number")]
    MissingName,
    #[error("sequence number '{raw}' in filename is out of range")]
    InvalidSequence { raw: String },
}

/// Metadata recovered from one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameMetadata {
    /// First sequence number in the prefix, the patient key.
    pub primary: SequenceNumber,
    /// Further sequence numbers in the prefix, deduplicated.
    pub aliases: Vec<SequenceNumber>,
    pub name: String,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

impl FilenameMetadata {
    /// The primary sequence number followed by the aliases.
    pub fn sequences(&self) -> impl Iterator<Item = SequenceNumber> + '_ {
        std::iter::once(self.primary).chain(self.aliases.iter().copied())
    }
}

/// Parses a filename stem (extension already removed).
pub fn parse_filename(stem: &str) -> Result<FilenameMetadata, FilenameParseError> {
    let caps = BASE_PATTERN
        .captures(stem)
        .ok_or(FilenameParseError::MissingSequence)?;

    let mut parsed = SEQUENCE_SEPARATOR.split(&caps[1]).map(|raw| {
        SequenceNumber::parse(raw).map_err(|_| FilenameParseError::InvalidSequence {
            raw: raw.to_string(),
        })
    });
    let primary = parsed.next().ok_or(FilenameParseError::MissingSequence)??;
    let mut aliases = Vec::new();
    for sequence in parsed {
        let sequence = sequence?;
        if sequence != primary && !aliases.contains(&sequence) {
            aliases.push(sequence);
        }
    }

    let rest = trim_field(&caps[2]);
    if rest.is_empty() {
        return Err(FilenameParseError::MissingName);
    }

    let (name, gender, age) = split_demographics(rest);
    Ok(FilenameMetadata {
        primary,
        aliases,
        name,
        gender,
        age,
    })
}

fn split_demographics(rest: &str) -> (String, Option<Gender>, Option<u32>) {
    if let Some(caps) = NAME_GENDER_AGE.captures(rest) {
        let name = trim_field(&caps["name"]);
        if let (Ok(gender), Ok(age)) = (caps["gender"].parse::<Gender>(), caps["age"].parse()) {
            if !name.is_empty() {
                return (name.to_string(), Some(gender), Some(age));
            }
        }
    }
    if let Some(caps) = NAME_GENDER.captures(rest) {
        let name = trim_field(&caps["name"]);
        if let Ok(gender) = caps["gender"].parse::<Gender>() {
            if !name.is_empty() {
                return (name.to_string(), Some(gender), None);
            }
        }
    }
    (rest.to_string(), None, None)
}

fn trim_field(value: &str) -> &str {
    value.trim_matches(|ch: char| ch.is_whitespace() || FIELD_SEPARATORS.contains(&ch))
}
