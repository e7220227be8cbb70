#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Leading numeric token of a transcript filename; joins files and scale rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parses a run of ASCII digits (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::InvalidSequence(raw.to_string()));
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidSequence(raw.to_string()))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn patient_id(self) -> PatientId {
        PatientId::from_sequence(self)
    }
}

impl FromStr for SequenceNumber {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `P-xxxxxx`, the six-digit zero-padded sequence number.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    pub fn from_sequence(sequence: SequenceNumber) -> Self {
        Self(format!("P-{:06}", sequence.value()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `V-xxxxxx-n` where `n` is the 1-based visit ordinal within the patient.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    /// Id for the visit at zero-based `position` in the patient's list.
    pub fn for_position(sequence: SequenceNumber, position: usize) -> Self {
        Self(format!("V-{:06}-{}", sequence.value(), position + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_id_is_zero_padded() {
        assert_eq!(SequenceNumber::new(42).patient_id().as_str(), "P-000042");
        assert_eq!(SequenceNumber::new(10086).patient_id().as_str(), "P-010086");
    }

    #[test]
    fn wide_sequences_are_not_truncated() {
        assert_eq!(
            SequenceNumber::new(12_345_678).patient_id().as_str(),
            "P-12345678"
        );
    }

    #[test]
    fn visit_ordinal_starts_at_one() {
        let sequence = SequenceNumber::new(7);
        assert_eq!(VisitId::for_position(sequence, 0).as_str(), "V-000007-1");
        assert_eq!(VisitId::for_position(sequence, 11).as_str(), "V-000007-12");
    }

    #[test]
    fn sequence_rejects_non_digits() {
        assert!(SequenceNumber::parse("").is_err());
        assert!(SequenceNumber::parse("12a").is_err());
        assert!(SequenceNumber::parse("-3").is_err());
        assert_eq!(SequenceNumber::parse(" 0042 ").unwrap().value(), 42);
    }
}
