//! The mutable accumulator threaded through a pipeline run.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accumulator state for one pipeline run.
///
/// Created empty at run start, mutated in place by each node, and either
/// discarded after the run or serialized into the failure snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// Speaker ids seen so far.
    pub speakers: BTreeSet<String>,

    /// Accumulated transcript text not yet fed to keyword extraction.
    pub text_window: String,

    /// Guard-visible flag: the window hit its size bound with transcript
    /// still unconsumed.
    pub window_full: bool,

    /// Index of the next unconsumed record in the transcript store.
    pub cursor: usize,

    /// Distinct extracted terms, in extraction order.
    pub keywords: Vec<String>,

    /// Researched definition per keyword. Keys are always a subset of
    /// `keywords`.
    pub research_notes: BTreeMap<String, String>,

    /// Final artifact; set once by the summarize node, never cleared.
    pub summary: Option<MeetingSummary>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keywords that have no research note yet, in extraction order.
    pub fn unresolved_keywords(&self) -> Vec<&str> {
        self.keywords
            .iter()
            .filter(|k| !self.research_notes.contains_key(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Append a keyword unless an equal term (case-insensitive) is already
    /// present. Returns whether the term was added.
    pub fn push_keyword(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let lowered = term.to_lowercase();
        if self.keywords.iter().any(|k| k.to_lowercase() == lowered) {
            return false;
        }
        self.keywords.push(term.to_string());
        true
    }

    /// Serialize the state for failure reports. Falls back to a debug dump
    /// if serialization itself fails.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// The final meeting summary artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSummary {
    /// Key discussion points.
    pub key_points: Vec<String>,

    /// Action items captured from the discussion.
    pub action_items: Vec<String>,

    /// Term definitions assembled from the research notes.
    pub glossary: BTreeMap<String, String>,

    /// When the summary was produced.
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keyword_dedups_case_insensitively() {
        let mut state = PipelineState::new();
        assert!(state.push_keyword("Kubernetes"));
        assert!(!state.push_keyword("kubernetes"));
        assert!(!state.push_keyword("  KUBERNETES  "));
        assert!(state.push_keyword("Helm"));
        assert_eq!(state.keywords, vec!["Kubernetes", "Helm"]);
    }

    #[test]
    fn push_keyword_ignores_blank_terms() {
        let mut state = PipelineState::new();
        assert!(!state.push_keyword("   "));
        assert!(state.keywords.is_empty());
    }

    #[test]
    fn unresolved_keywords_preserve_extraction_order() {
        let mut state = PipelineState::new();
        state.push_keyword("alpha");
        state.push_keyword("beta");
        state.push_keyword("gamma");
        state
            .research_notes
            .insert("beta".to_string(), "a note".to_string());

        assert_eq!(state.unresolved_keywords(), vec!["alpha", "gamma"]);
    }

    #[test]
    fn snapshot_is_valid_json() {
        let mut state = PipelineState::new();
        state.speakers.insert("Alice".to_string());
        state.push_keyword("roadmap");

        let snapshot: serde_json::Value =
            serde_json::from_str(&state.snapshot_json()).expect("snapshot parses");
        assert_eq!(snapshot["keywords"][0], "roadmap");
    }
}
