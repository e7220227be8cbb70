use serde::{Deserialize, Serialize};

use crate::enums::{Gender, Role};
use crate::ids::{PatientId, VisitId};
use crate::scale::ScaleRecord;

/// A patient with every visit and scale record discovered for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: PatientId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub scales: Vec<ScaleRecord>,
    pub visits: Vec<Visit>,
}

impl Patient {
    pub fn new(patient_id: PatientId, name: impl Into<String>) -> Self {
        Self {
            patient_id,
            name: name.into(),
            gender: None,
            age: None,
            keywords: Vec::new(),
            scales: Vec::new(),
            visits: Vec::new(),
        }
    }

    /// Appends keywords not already present, keeping first-seen order.
    ///
    /// Returns the number of keywords added.
    pub fn merge_keywords<I, S>(&mut self, keywords: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if !self.keywords.iter().any(|existing| existing == keyword) {
                self.keywords.push(keyword.to_string());
                added += 1;
            }
        }
        added
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub visit_id: VisitId,
    pub dialogue: Dialogue,
}

/// Verbatim visit text plus its speaker turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub source_file: String,
    pub content: String,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_note: Option<String>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            speaker_note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.speaker_note = Some(note.into());
        self
    }
}
