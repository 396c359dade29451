//! Terminal rendering of the summary artifact.

use crate::pipeline::state::MeetingSummary;

/// Render a summary for terminal output.
pub fn render_summary_text(summary: &MeetingSummary) -> String {
    let mut output = String::new();

    output.push_str("Key Points\n");
    if summary.key_points.is_empty() {
        output.push_str("  (none)\n");
    }
    for point in &summary.key_points {
        output.push_str(&format!("  - {}\n", point));
    }

    output.push_str("\nAction Items\n");
    if summary.action_items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &summary.action_items {
        output.push_str(&format!("  - {}\n", item));
    }

    if !summary.glossary.is_empty() {
        output.push_str("\nGlossary\n");
        for (term, definition) in &summary.glossary {
            output.push_str(&format!("  {}: {}\n", term, definition));
        }
    }

    output.push_str(&format!(
        "\nGenerated at {}\n",
        summary.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}
