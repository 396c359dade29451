//! The canonical structured transcript and its JSON artifact format.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors producing or loading a transcript.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no valid cues found in transcript")]
    Empty,

    #[error("duplicate event id '{0}' in transcript")]
    DuplicateEvent(String),

    #[error("utterance '{0}' ends before it starts")]
    InvalidRange(String),

    #[error("invalid transcript artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// One normalized speaker turn.
///
/// Immutable once constructed; the JSON artifact is the ordered array of
/// these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceRecord {
    /// Stable speaker identifier.
    pub speaker_id: String,

    /// Source-assigned event identifier, unique within a transcript.
    pub event_id: String,

    /// Start offset from recording start, in milliseconds.
    #[serde(rename = "startTime")]
    pub start_ms: u64,

    /// End offset from recording start, in milliseconds.
    #[serde(rename = "endTime")]
    pub end_ms: u64,

    /// Consolidated utterance text.
    pub text: String,
}

impl UtteranceRecord {
    /// Duration of the turn in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Ordered, immutable collection of utterance records for one meeting, with
/// a derived per-speaker view.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    records: Vec<UtteranceRecord>,
    speaker_index: BTreeMap<String, Vec<usize>>,
}

impl TranscriptStore {
    /// Build a store from records, sorting them into canonical
    /// `(start, event id)` order and validating invariants.
    pub fn new(mut records: Vec<UtteranceRecord>) -> Result<Self, ParseError> {
        if records.is_empty() {
            return Err(ParseError::Empty);
        }

        records.sort_by(|a, b| {
            (a.start_ms, a.event_id.as_str()).cmp(&(b.start_ms, b.event_id.as_str()))
        });

        let mut seen = HashSet::new();
        for record in &records {
            if record.start_ms > record.end_ms {
                return Err(ParseError::InvalidRange(record.event_id.clone()));
            }
            if !seen.insert(record.event_id.as_str()) {
                return Err(ParseError::DuplicateEvent(record.event_id.clone()));
            }
        }

        let mut speaker_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            speaker_index
                .entry(record.speaker_id.clone())
                .or_default()
                .push(index);
        }

        Ok(Self {
            records,
            speaker_index,
        })
    }

    /// Records in chronological order.
    pub fn records(&self) -> &[UtteranceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct speaker ids, in sorted order.
    pub fn speakers(&self) -> impl Iterator<Item = &str> {
        self.speaker_index.keys().map(String::as_str)
    }

    /// All of one speaker's turns, in chronological order.
    pub fn speaker_records(&self, speaker_id: &str) -> impl Iterator<Item = &UtteranceRecord> {
        self.speaker_index
            .get(speaker_id)
            .into_iter()
            .flatten()
            .map(move |&index| &self.records[index])
    }

    /// Serialize to the JSON interchange artifact (the ordered record array).
    pub fn to_json(&self, pretty: bool) -> Result<String, ParseError> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.records)?
        } else {
            serde_json::to_string(&self.records)?
        };
        Ok(json)
    }

    /// Load a store from the JSON interchange artifact, re-validating all
    /// invariants so a hand-edited artifact cannot produce an invalid store.
    pub fn from_json(artifact: &str) -> Result<Self, ParseError> {
        let records: Vec<UtteranceRecord> = serde_json::from_str(artifact)?;
        Self::new(records)
    }
}
