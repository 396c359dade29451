//! The fixed node set and its execution contracts.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::config::Settings;
use crate::llm::prompts::{build_keyword_prompt, build_research_prompt, build_summary_prompt};
use crate::llm::LanguageModel;
use crate::pipeline::state::{MeetingSummary, PipelineState};
use crate::transcript::TranscriptStore;

/// Accumulated text window size (characters) before extraction runs.
pub const DEFAULT_WINDOW_CHARS: usize = 4000;

/// Maximum distinct keywords per run.
pub const DEFAULT_MAX_KEYWORDS: usize = 24;

/// Step bound guarding against miswired graph cycles.
pub const DEFAULT_MAX_STEPS: usize = 256;

/// The closed set of pipeline nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    SpeakerDetect,
    TextAccumulate,
    KeywordExtract,
    Research,
    Summarize,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpeakerDetect => "SpeakerDetect",
            Self::TextAccumulate => "TextAccumulate",
            Self::KeywordExtract => "KeywordExtract",
            Self::Research => "Research",
            Self::Summarize => "Summarize",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configurable pipeline policies.
#[derive(Debug, Clone)]
pub struct PipelineLimits {
    pub window_chars: usize,
    pub max_keywords: usize,
    pub max_steps: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            window_chars: DEFAULT_WINDOW_CHARS,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl PipelineLimits {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            window_chars: settings.pipeline.window_chars,
            max_keywords: settings.pipeline.max_keywords,
            max_steps: settings.pipeline.max_steps,
        }
    }
}

/// Run one node against the state. Each node is a pure function of
/// `(state, store)` apart from its capability calls.
pub async fn run_node(
    kind: NodeKind,
    state: &mut PipelineState,
    store: &TranscriptStore,
    model: &dyn LanguageModel,
    limits: &PipelineLimits,
) -> Result<()> {
    match kind {
        NodeKind::SpeakerDetect => speaker_detect(state, store),
        NodeKind::TextAccumulate => text_accumulate(state, store, limits),
        NodeKind::KeywordExtract => keyword_extract(state, model, limits).await,
        NodeKind::Research => research(state, model).await,
        NodeKind::Summarize => summarize(state, store, model).await,
    }
}

/// Record every speaker in the transcript. Idempotent.
fn speaker_detect(state: &mut PipelineState, store: &TranscriptStore) -> Result<()> {
    for speaker in store.speakers() {
        state.speakers.insert(speaker.to_string());
    }
    Ok(())
}

/// Append the next chronological slice of the transcript to the text window,
/// stopping at the window bound. Sets `window_full` when it stops early with
/// transcript still unconsumed.
fn text_accumulate(
    state: &mut PipelineState,
    store: &TranscriptStore,
    limits: &PipelineLimits,
) -> Result<()> {
    if store.is_empty() {
        anyhow::bail!("transcript store is empty");
    }
    if state.cursor >= store.len() {
        anyhow::bail!("transcript is already fully accumulated");
    }

    state.window_full = false;
    while state.cursor < store.len() {
        let record = &store.records()[state.cursor];
        let line = format!("[{}] {}", record.speaker_id, record.text);

        // An oversized single record is still consumed into an empty window.
        if !state.text_window.is_empty()
            && state.text_window.len() + line.len() + 1 > limits.window_chars
        {
            state.window_full = true;
            break;
        }

        if !state.text_window.is_empty() {
            state.text_window.push('\n');
        }
        state.text_window.push_str(&line);
        state.cursor += 1;
    }

    tracing::debug!(
        cursor = state.cursor,
        window_len = state.text_window.len(),
        window_full = state.window_full,
        "accumulated transcript text"
    );
    Ok(())
}

/// Extract distinct terms from the text window via the capability, then clear
/// the window. On failure the window is left untouched.
async fn keyword_extract(
    state: &mut PipelineState,
    model: &dyn LanguageModel,
    limits: &PipelineLimits,
) -> Result<()> {
    let window = state.text_window.trim();
    if !window.is_empty() && state.keywords.len() < limits.max_keywords {
        let prompt = build_keyword_prompt(window, limits.max_keywords);
        let response = model
            .generate(&prompt)
            .await
            .context("keyword extraction call failed")?;

        let mut added = 0usize;
        for term in parse_term_lines(&response) {
            if state.keywords.len() >= limits.max_keywords {
                break;
            }
            if state.push_keyword(&term) {
                added += 1;
            }
        }
        tracing::debug!(added, total = state.keywords.len(), "extracted keywords");
    }

    // Only a successful (or trivially skipped) extraction consumes the window.
    state.text_window.clear();
    state.window_full = false;
    Ok(())
}

/// Research every keyword that has no note yet. Per-keyword failures are
/// recorded as placeholder notes, never propagated.
async fn research(state: &mut PipelineState, model: &dyn LanguageModel) -> Result<()> {
    let pending: Vec<String> = state
        .unresolved_keywords()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for term in pending {
        let prompt = build_research_prompt(&term);
        let note = match model.generate(&prompt).await {
            Ok(text) => collapse_whitespace(&text),
            Err(err) => {
                tracing::warn!(term = %term, error = %err, "keyword research failed");
                format!("(research unavailable: {err})")
            }
        };
        state.research_notes.insert(term, note);
    }

    Ok(())
}

/// Produce the final summary. Requires the whole transcript to have been
/// accumulated and extracted.
async fn summarize(
    state: &mut PipelineState,
    store: &TranscriptStore,
    model: &dyn LanguageModel,
) -> Result<()> {
    if state.cursor < store.len() || !state.text_window.trim().is_empty() {
        anyhow::bail!("summarize invoked before the transcript was fully accumulated");
    }

    let transcript = render_transcript(store);
    let prompt = build_summary_prompt(&transcript, &state.keywords);
    let response = model
        .generate(&prompt)
        .await
        .context("summary generation call failed")?;

    let (key_points, action_items) = parse_summary_sections(&response);
    if key_points.is_empty() && action_items.is_empty() {
        anyhow::bail!("summary response contained no usable content");
    }

    state.summary = Some(MeetingSummary {
        key_points,
        action_items,
        glossary: state.research_notes.clone(),
        generated_at: Utc::now(),
    });
    Ok(())
}

fn render_transcript(store: &TranscriptStore) -> String {
    let mut transcript = String::new();
    for record in store.records() {
        transcript.push('[');
        transcript.push_str(&record.speaker_id);
        transcript.push_str("] ");
        transcript.push_str(&record.text);
        transcript.push('\n');
    }
    transcript
}

/// Parse one-term-per-line extractor output, tolerating stray bullets and
/// numbering.
fn parse_term_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .map(|term| term.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == ','))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a sectioned summary response into key points and action items.
///
/// A response without recognizable headings is treated as a flat list of key
/// points.
fn parse_summary_sections(response: &str) -> (Vec<String>, Vec<String>) {
    #[derive(PartialEq)]
    enum Section {
        KeyPoints,
        ActionItems,
        Other,
    }

    let mut key_points = Vec::new();
    let mut action_items = Vec::new();
    let mut section = Section::Other;
    let mut saw_heading = false;

    for line in response.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            saw_heading = true;
            let heading = line.trim_start_matches('#').trim().to_lowercase();
            section = if heading.contains("key point") || heading.contains("summary") {
                Section::KeyPoints
            } else if heading.contains("action") {
                Section::ActionItems
            } else {
                Section::Other
            };
            continue;
        }

        let item = strip_list_marker(line).trim();
        if item.is_empty() || item.eq_ignore_ascii_case("none") {
            continue;
        }

        match section {
            Section::KeyPoints => key_points.push(item.to_string()),
            Section::ActionItems => action_items.push(item.to_string()),
            Section::Other if !saw_heading => key_points.push(item.to_string()),
            Section::Other => {}
        }
    }

    (key_points, action_items)
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        return rest.trim();
    }
    // Numbered list: "3. item"
    if let Some((number, rest)) = line.split_once(". ") {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            return rest.trim();
        }
    }
    line
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
