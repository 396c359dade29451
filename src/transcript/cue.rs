//! Raw caption cue parsing.
//!
//! Meeting platforms emit WebVTT-style caption files where each cue block
//! carries an identifier line (`channel/<event>-<sequence>`), a timecode line
//! (`HH:MM:SS.mmm --> HH:MM:SS.mmm`), and a `<v Speaker>` voice span that may
//! run across several lines before closing with `</v>`.

/// One parsed caption cue, before collation and merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCue {
    /// Source-assigned event identifier; fragments of one utterance share it.
    pub event_id: String,
    /// Fragment sequence number within the event.
    pub sequence: u32,
    /// Start offset from recording start, in milliseconds.
    pub start_ms: u64,
    /// End offset from recording start, in milliseconds.
    pub end_ms: u64,
    /// Speaker name from the voice span.
    pub speaker: String,
    /// Cue text with whitespace collapsed.
    pub text: String,
    /// 1-based line number where the cue block starts.
    pub line: usize,
}

/// A non-fatal problem encountered while parsing cues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number where the offending cue block starts.
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Parse raw caption text into cues, skipping malformed blocks.
///
/// Each skipped block is reported as a [`ParseWarning`]; file headers
/// (`WEBVTT`, `NOTE`, `STYLE`) are ignored silently.
pub fn parse_cues(input: &str) -> (Vec<RawCue>, Vec<ParseWarning>) {
    let mut cues = Vec::new();
    let mut warnings = Vec::new();

    for block in split_blocks(input) {
        if is_header_block(&block) {
            continue;
        }
        match parse_block(&block) {
            Ok(mut cue) => {
                cue.line = block.line;
                cues.push(cue);
            }
            Err(reason) => warnings.push(ParseWarning {
                line: block.line,
                reason,
            }),
        }
    }

    (cues, warnings)
}

/// A run of non-blank lines, with the line number where it starts.
struct Block<'a> {
    line: usize,
    lines: Vec<&'a str>,
}

fn split_blocks(input: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block<'_>> = None;

    for (index, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        current
            .get_or_insert_with(|| Block {
                line: index + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }

    blocks
}

fn is_header_block(block: &Block<'_>) -> bool {
    block
        .lines
        .first()
        .map(|first| {
            first.starts_with("WEBVTT") || first.starts_with("NOTE") || first.starts_with("STYLE")
        })
        .unwrap_or(true)
}

fn parse_block(block: &Block<'_>) -> Result<RawCue, String> {
    let mut identifier: Option<(String, u32)> = None;
    let mut times: Option<(u64, u64)> = None;
    let mut speaker: Option<String> = None;
    let mut text = String::new();

    for line in &block.lines {
        if let Some(id) = parse_identifier(line) {
            identifier = Some(id);
        } else if line.contains("-->") {
            times = Some(parse_timecode_line(line)?);
        } else if let Some(rest) = line.strip_prefix("<v ") {
            let (name, after) = rest
                .split_once('>')
                .ok_or_else(|| "unterminated voice span tag".to_string())?;
            speaker = Some(name.trim().to_string());
            append_text(&mut text, strip_voice_close(after));
        } else if speaker.is_some() {
            // Continuation of a multi-line voice span.
            append_text(&mut text, strip_voice_close(line));
        } else {
            return Err(format!("unrecognized cue line '{}'", line));
        }
    }

    let (event_id, sequence) = identifier.ok_or_else(|| "cue has no identifier line".to_string())?;
    let (start_ms, end_ms) = times.ok_or_else(|| "cue has no timecode line".to_string())?;
    let speaker = speaker.ok_or_else(|| "cue has no speaker voice span".to_string())?;

    if start_ms > end_ms {
        return Err(format!("cue {} starts after it ends", event_id));
    }
    if speaker.is_empty() {
        return Err("cue speaker name is empty".to_string());
    }
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(format!("cue {} has no text", event_id));
    }

    Ok(RawCue {
        event_id,
        sequence,
        start_ms,
        end_ms,
        speaker,
        text,
        line: 0,
    })
}

/// Parse an identifier line of the form `channel/<event>-<sequence>`.
fn parse_identifier(line: &str) -> Option<(String, u32)> {
    let (channel, tail) = line.split_once('/')?;
    if channel.is_empty() || !channel.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }
    let (event, sequence) = tail.split_once('-')?;
    if event.is_empty() || !event.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let sequence: u32 = sequence.parse().ok()?;
    Some((event.to_string(), sequence))
}

fn parse_timecode_line(line: &str) -> Result<(u64, u64), String> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| "malformed timecode line".to_string())?;
    // Cue settings (position, alignment) may trail the end timestamp.
    let end = rest.trim().split_whitespace().next().unwrap_or("");

    let start_ms = parse_timestamp_ms(start.trim())
        .ok_or_else(|| format!("invalid start timestamp '{}'", start.trim()))?;
    let end_ms =
        parse_timestamp_ms(end).ok_or_else(|| format!("invalid end timestamp '{}'", end))?;
    Ok((start_ms, end_ms))
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into milliseconds.
fn parse_timestamp_ms(value: &str) -> Option<u64> {
    let (clock, millis) = value.rsplit_once('.')?;
    if millis.len() != 3 || !millis.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let mut seconds = 0u64;
    for part in &parts {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        seconds = seconds * 60 + part.parse::<u64>().ok()?;
    }

    Some(seconds * 1000 + millis)
}

fn strip_voice_close(fragment: &str) -> &str {
    fragment
        .split_once("</v>")
        .map(|(before, _)| before)
        .unwrap_or(fragment)
        .trim()
}

fn append_text(text: &mut String, fragment: &str) {
    for word in fragment.split_whitespace() {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
WEBVTT

16778e0b/108-0
00:00:01.000 --> 00:00:02.500
<v Alice Johnson>Hello everyone,</v>

16778e0b/108-1
00:00:02.500 --> 00:00:04.000
<v Alice Johnson>thanks for joining.</v>
";

    #[test]
    fn parses_simple_cues() {
        let (cues, warnings) = parse_cues(SAMPLE);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        assert_eq!(cues.len(), 2);

        assert_eq!(cues[0].event_id, "108");
        assert_eq!(cues[0].sequence, 0);
        assert_eq!(cues[0].start_ms, 1000);
        assert_eq!(cues[0].end_ms, 2500);
        assert_eq!(cues[0].speaker, "Alice Johnson");
        assert_eq!(cues[0].text, "Hello everyone,");
        assert_eq!(cues[1].sequence, 1);
    }

    #[test]
    fn collects_multi_line_voice_spans() {
        let input = "\
abc/5-0
00:00:01.000 --> 00:00:03.000
<v Bob>This sentence keeps
going on the next line</v>
";
        let (cues, warnings) = parse_cues(input);
        assert!(warnings.is_empty());
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "This sentence keeps going on the next line");
    }

    #[test]
    fn malformed_cue_is_skipped_with_warning() {
        let input = "\
abc/1-0
not a timecode at all
<v Carol>hello</v>

abc/2-0
00:00:05.000 --> 00:00:06.000
<v Carol>still here</v>
";
        let (cues, warnings) = parse_cues(input);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].event_id, "2");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 1);
        assert!(warnings[0].reason.contains("unrecognized cue line"));
    }

    #[test]
    fn rejects_cue_with_reversed_times() {
        let input = "\
abc/3-0
00:00:09.000 --> 00:00:04.000
<v Dave>backwards</v>
";
        let (cues, warnings) = parse_cues(input);
        assert!(cues.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].reason.contains("starts after it ends"));
    }

    #[test]
    fn timestamp_parsing_handles_hours_and_minutes_forms() {
        assert_eq!(parse_timestamp_ms("00:00:01.000"), Some(1000));
        assert_eq!(parse_timestamp_ms("01:02:03.450"), Some(3_723_450));
        assert_eq!(parse_timestamp_ms("02:03.450"), Some(123_450));
        assert_eq!(parse_timestamp_ms("nonsense"), None);
        assert_eq!(parse_timestamp_ms("00:00:01"), None);
    }
}
