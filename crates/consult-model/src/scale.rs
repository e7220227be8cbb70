//! GAD-7 / PHQ-9 scale records.
//!
//! Item arrays are fixed length and the total is derived on construction, so
//! a record can never carry a total that disagrees with its items.

use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::enums::Respondent;

pub const GAD7_ITEM_COUNT: usize = 7;
pub const PHQ9_ITEM_COUNT: usize = 9;

/// Ordered per-question scores of one scale plus their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemScores<const N: usize> {
    items: [u8; N],
    total: u32,
}

pub type Gad7Scores = ItemScores<GAD7_ITEM_COUNT>;
pub type Phq9Scores = ItemScores<PHQ9_ITEM_COUNT>;

impl<const N: usize> ItemScores<N> {
    pub fn new(items: [u8; N]) -> Self {
        let total = items.iter().map(|&item| u32::from(item)).sum();
        Self { items, total }
    }

    pub fn items(&self) -> &[u8; N] {
        &self.items
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

impl<const N: usize> Serialize for ItemScores<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ItemScores", 2)?;
        state.serialize_field("items", &self.items[..])?;
        state.serialize_field("total", &self.total)?;
        state.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for ItemScores<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            items: Vec<u8>,
            total: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        let found = raw.items.len();
        let items: [u8; N] = raw
            .items
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {N} items, found {found}")))?;
        let scores = Self::new(items);
        if scores.total != raw.total {
            return Err(D::Error::custom(format!(
                "total {} does not match item sum {}",
                raw.total, scores.total
            )));
        }
        Ok(scores)
    }
}

/// One patient's matched scale row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleRecord {
    pub respondent_role: Respondent,
    #[serde(rename = "GAD-7")]
    pub gad7: Gad7Scores,
    #[serde(rename = "PHQ-9")]
    pub phq9: Phq9Scores,
}

impl ScaleRecord {
    pub fn self_reported(gad7: [u8; GAD7_ITEM_COUNT], phq9: [u8; PHQ9_ITEM_COUNT]) -> Self {
        Self {
            respondent_role: Respondent::SelfReport,
            gad7: ItemScores::new(gad7),
            phq9: ItemScores::new(phq9),
        }
    }

    pub fn gad7_severity(&self) -> Severity {
        Severity::for_gad7(self.gad7.total())
    }

    pub fn phq9_severity(&self) -> Severity {
        Severity::for_phq9(self.phq9.total())
    }
}

/// Conventional screening bands for scale totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Minimal,
        Severity::Mild,
        Severity::Moderate,
        Severity::ModeratelySevere,
        Severity::Severe,
    ];

    /// PHQ-9: 0-4, 5-9, 10-14, 15-19, 20-27.
    pub fn for_phq9(total: u32) -> Self {
        match total {
            0..=4 => Severity::Minimal,
            5..=9 => Severity::Mild,
            10..=14 => Severity::Moderate,
            15..=19 => Severity::ModeratelySevere,
            _ => Severity::Severe,
        }
    }

    /// GAD-7 has no "moderately severe" band: 0-4, 5-9, 10-14, 15-21.
    pub fn for_gad7(total: u32) -> Self {
        match total {
            0..=4 => Severity::Minimal,
            5..=9 => Severity::Mild,
            10..=14 => Severity::Moderate,
            _ => Severity::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minimal => "Minimal",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::ModeratelySevere => "Moderately severe",
            Severity::Severe => "Severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
