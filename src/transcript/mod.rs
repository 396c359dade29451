//! Transcript module for recap
//!
//! Normalizes raw WebVTT-style caption cues into an ordered, immutable
//! transcript store.

mod cue;
mod normalizer;
mod store;

pub use cue::{parse_cues, ParseWarning, RawCue};
pub use normalizer::{normalize, NormalizerOptions, DEFAULT_MERGE_GAP_MS};
pub use store::{ParseError, TranscriptStore, UtteranceRecord};
