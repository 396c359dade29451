//! Deterministic prompt builders for the pipeline nodes.

/// Build the keyword extraction prompt for an accumulated text window.
pub fn build_keyword_prompt(window: &str, max_terms: usize) -> String {
    format!(
        "You extract notable terminology from meeting transcripts.\n\
\n\
List up to {max_terms} distinct technical terms, product names, or project-specific \
phrases mentioned in the excerpt below.\n\
\n\
Rules:\n\
- One term per line, nothing else (no numbering, no bullets).\n\
- Only terms that actually appear in the excerpt.\n\
- Skip everyday words and speaker names.\n\
\n\
Excerpt:\n\
{window}"
    )
}

/// Build the research prompt for a single extracted term.
pub fn build_research_prompt(term: &str) -> String {
    format!(
        "Define the term '{term}' as it is commonly used in a professional or \
technical meeting context.\n\
\n\
Rules:\n\
- Answer in one or two plain sentences.\n\
- No preamble, no markdown formatting."
    )
}

/// Build the final summary prompt over the full transcript and glossary terms.
pub fn build_summary_prompt(transcript: &str, keywords: &[String]) -> String {
    let terms = if keywords.is_empty() {
        "(none)".to_string()
    } else {
        keywords.join(", ")
    };

    format!(
        "You are an assistant that writes concise, factual meeting summaries.\n\
\n\
Return Markdown with exactly these sections:\n\
1. ## Key Points (3-6 bullets)\n\
2. ## Action Items\n\
\n\
Rules:\n\
- Use only information present in the transcript.\n\
- If a section has no content, write '- None'.\n\
- Keep each bullet short and concrete.\n\
\n\
Terms already identified: {terms}\n\
\n\
Transcript:\n\
{transcript}"
    )
}
