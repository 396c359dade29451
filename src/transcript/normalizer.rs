//! Cue normalization: collate fragments, merge adjacent turns, order
//! canonically.

use crate::transcript::cue::{parse_cues, ParseWarning, RawCue};
use crate::transcript::store::{ParseError, TranscriptStore, UtteranceRecord};

/// Gap below which adjacent same-speaker records are merged, in milliseconds.
pub const DEFAULT_MERGE_GAP_MS: u64 = 1000;

/// Tunable normalization policy.
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    /// Maximum silence between two same-speaker records for them to be
    /// merged into one utterance.
    pub merge_gap_ms: u64,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            merge_gap_ms: DEFAULT_MERGE_GAP_MS,
        }
    }
}

/// Normalize raw caption text into a [`TranscriptStore`].
///
/// Malformed cues are skipped and reported as warnings; an input with no
/// valid cues at all is a [`ParseError::Empty`].
pub fn normalize(
    input: &str,
    options: &NormalizerOptions,
) -> Result<(TranscriptStore, Vec<ParseWarning>), ParseError> {
    let (cues, mut warnings) = parse_cues(input);
    if cues.is_empty() {
        return Err(ParseError::Empty);
    }

    let records = collate_fragments(cues, &mut warnings);
    let records = merge_adjacent(records, options.merge_gap_ms);

    let store = TranscriptStore::new(records)?;
    tracing::debug!(
        records = store.len(),
        skipped = warnings.len(),
        "normalized transcript"
    );
    Ok((store, warnings))
}

/// Collate cue fragments sharing an event id into single records.
///
/// Fragments are joined in sequence order; duplicate sequence numbers are
/// dropped with a warning. The record spans from the earliest fragment start
/// to the latest fragment end.
fn collate_fragments(mut cues: Vec<RawCue>, warnings: &mut Vec<ParseWarning>) -> Vec<UtteranceRecord> {
    cues.sort_by(|a, b| {
        (a.event_id.as_str(), a.sequence).cmp(&(b.event_id.as_str(), b.sequence))
    });

    let mut records: Vec<UtteranceRecord> = Vec::new();
    let mut last_key: Option<(String, u32)> = None;

    for cue in cues {
        if let Some((event, sequence)) = &last_key {
            if *event == cue.event_id && *sequence == cue.sequence {
                warnings.push(ParseWarning {
                    line: cue.line,
                    reason: format!(
                        "duplicate fragment {}-{} dropped",
                        cue.event_id, cue.sequence
                    ),
                });
                continue;
            }
        }

        match records.last_mut() {
            Some(current) if current.event_id == cue.event_id => {
                current.start_ms = current.start_ms.min(cue.start_ms);
                current.end_ms = current.end_ms.max(cue.end_ms);
                current.text.push(' ');
                current.text.push_str(&cue.text);
            }
            _ => records.push(UtteranceRecord {
                speaker_id: cue.speaker.clone(),
                event_id: cue.event_id.clone(),
                start_ms: cue.start_ms,
                end_ms: cue.end_ms,
                text: cue.text.clone(),
            }),
        }

        last_key = Some((cue.event_id, cue.sequence));
    }

    records
}

/// Merge chronologically adjacent records from the same speaker whose gap is
/// within `merge_gap_ms`. The earlier record's event id is kept.
fn merge_adjacent(mut records: Vec<UtteranceRecord>, merge_gap_ms: u64) -> Vec<UtteranceRecord> {
    records.sort_by(|a, b| {
        (a.start_ms, a.event_id.as_str()).cmp(&(b.start_ms, b.event_id.as_str()))
    });

    let mut iter = records.into_iter();
    let mut merged = Vec::new();
    let mut current = match iter.next() {
        Some(first) => first,
        None => return merged,
    };

    for record in iter {
        let gap = record.start_ms.saturating_sub(current.end_ms);
        if record.speaker_id == current.speaker_id && gap <= merge_gap_ms {
            current.end_ms = current.end_ms.max(record.end_ms);
            current.text.push(' ');
            current.text.push_str(&record.text);
        } else {
            merged.push(current);
            current = record;
        }
    }

    merged.push(current);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue_block(event: &str, seq: u32, start: &str, end: &str, speaker: &str, text: &str) -> String {
        format!("meeting/{event}-{seq}\n{start} --> {end}\n<v {speaker}>{text}</v>\n\n")
    }

    #[test]
    fn merges_contiguous_same_speaker_cues() {
        let input = cue_block("1", 0, "00:00:00.000", "00:00:02.000", "A", "Hello team")
            + &cue_block("2", 0, "00:00:02.000", "00:00:03.000", "A", "let's begin");

        let (store, warnings) = normalize(&input, &NormalizerOptions::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(store.len(), 1);

        let record = &store.records()[0];
        assert_eq!(record.speaker_id, "A");
        assert_eq!(record.start_ms, 0);
        assert_eq!(record.end_ms, 3000);
        assert_eq!(record.text, "Hello team let's begin");
    }

    #[test]
    fn does_not_merge_across_speakers_or_long_gaps() {
        let input = cue_block("1", 0, "00:00:00.000", "00:00:02.000", "A", "first")
            + &cue_block("2", 0, "00:00:02.200", "00:00:03.000", "B", "second")
            + &cue_block("3", 0, "00:00:10.000", "00:00:11.000", "B", "much later");

        let (store, _) = normalize(&input, &NormalizerOptions::default()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn collates_fragments_of_one_event_in_sequence_order() {
        // Fragments arrive out of order; speaker changes between events so the
        // adjacency merge stays out of the way.
        let input = cue_block("5", 1, "00:00:03.000", "00:00:04.000", "A", "of the sentence")
            + &cue_block("9", 0, "00:00:10.000", "00:00:11.000", "B", "unrelated")
            + &cue_block("5", 0, "00:00:02.000", "00:00:03.000", "A", "the start");

        let (store, warnings) = normalize(&input, &NormalizerOptions::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(store.len(), 2);

        let record = &store.records()[0];
        assert_eq!(record.event_id, "5");
        assert_eq!(record.start_ms, 2000);
        assert_eq!(record.end_ms, 4000);
        assert_eq!(record.text, "the start of the sentence");
    }

    #[test]
    fn duplicate_fragments_are_dropped_with_warning() {
        let input = cue_block("1", 0, "00:00:00.000", "00:00:01.000", "A", "once")
            + &cue_block("1", 0, "00:00:00.000", "00:00:01.000", "A", "once")
            + &cue_block("2", 0, "00:00:05.000", "00:00:06.000", "B", "other");

        let (store, warnings) = normalize(&input, &NormalizerOptions::default()).unwrap();
        assert_eq!(store.records()[0].text, "once");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].reason.contains("duplicate fragment"));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert!(matches!(
            normalize("", &NormalizerOptions::default()),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            normalize("WEBVTT\n\n", &NormalizerOptions::default()),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn all_malformed_cues_is_a_parse_error() {
        let input = "garbage/not-a-cue\nstill garbage\n";
        assert!(matches!(
            normalize(input, &NormalizerOptions::default()),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn zero_merge_gap_still_merges_overlapping_cues() {
        let input = cue_block("1", 0, "00:00:00.000", "00:00:02.000", "A", "over")
            + &cue_block("2", 0, "00:00:01.500", "00:00:03.000", "A", "lapping");

        let options = NormalizerOptions { merge_gap_ms: 0 };
        let (store, _) = normalize(&input, &options).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].text, "over lapping");
    }
}
