//! CLI command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::llm::build_model;
use crate::pipeline::{render_summary_text, Executor, Graph, PipelineLimits};
use crate::transcript::{normalize, NormalizerOptions, TranscriptStore};

/// Normalize a raw caption file into the structured JSON transcript artifact.
pub fn parse_transcript(
    settings: &Settings,
    input: &Path,
    output: Option<PathBuf>,
    pretty: bool,
    force: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let options = NormalizerOptions {
        merge_gap_ms: settings.parser.merge_gap_ms,
    };
    let (store, warnings) = normalize(&raw, &options)
        .with_context(|| format!("Failed to parse transcript: {}", input.display()))?;

    for warning in &warnings {
        tracing::warn!("skipped cue at {}", warning);
    }

    let artifact = store.to_json(pretty)?;
    match output {
        Some(path) => {
            write_output(&path, &artifact, force)?;
            println!(
                "Parsed {} utterances from {} speakers -> {}",
                store.len(),
                store.speakers().count(),
                path.display()
            );
        }
        None => println!("{}", artifact),
    }

    Ok(())
}

/// Run the summary pipeline over a caption file or transcript artifact.
pub async fn summarize_transcript(
    settings: &Settings,
    input: &Path,
    json: bool,
    output: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let store = load_store(settings, input)?;
    let model = build_model(settings)?;

    let graph = Graph::standard();
    let limits = PipelineLimits::from_settings(settings);

    // Ctrl-C stops the run at the next graph edge; an in-flight model call
    // is awaited to completion first.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.store(true, Ordering::Relaxed);
        }
    });

    let executor = Executor::new(&graph, model.as_ref(), limits).with_cancel_flag(cancel);
    let state = executor.run(&store).await?;

    let summary = state
        .summary
        .context("pipeline finished without producing a summary")?;

    let rendered = if json {
        serde_json::to_string_pretty(&summary)?
    } else {
        render_summary_text(&summary)
    };

    match output {
        Some(path) => {
            write_output(&path, &rendered, force)?;
            println!("Summary written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// List speakers with turn counts and total speaking time.
pub fn list_speakers(settings: &Settings, input: &Path) -> Result<()> {
    let store = load_store(settings, input)?;

    println!("{:<24} {:>6} {:>10}", "Speaker", "Turns", "Time");
    for speaker in store.speakers() {
        let turns: Vec<_> = store.speaker_records(speaker).collect();
        let total_ms: u64 = turns.iter().map(|r| r.duration_ms()).sum();
        println!(
            "{:<24} {:>6} {:>10}",
            speaker,
            turns.len(),
            format_duration_ms(total_ms)
        );
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let content = toml::to_string_pretty(settings)?;
            println!("{}", content);
        }
        ConfigCommand::Path => {
            println!("{}", Settings::config_path()?.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Config written to {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

/// Load a transcript store from either a raw caption file or a previously
/// parsed JSON artifact.
fn load_store(settings: &Settings, input: &Path) -> Result<TranscriptStore> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    let is_artifact = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_artifact {
        return TranscriptStore::from_json(&raw)
            .with_context(|| format!("Failed to load transcript artifact: {}", input.display()));
    }

    let options = NormalizerOptions {
        merge_gap_ms: settings.parser.merge_gap_ms,
    };
    let (store, warnings) = normalize(&raw, &options)
        .with_context(|| format!("Failed to parse transcript: {}", input.display()))?;
    for warning in &warnings {
        tracing::warn!("skipped cue at {}", warning);
    }

    Ok(store)
}

fn write_output(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Output file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(())
}

fn format_duration_ms(ms: u64) -> String {
    let secs = ms / 1000;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_handles_hours() {
        assert_eq!(format_duration_ms(59_000), "0:59");
        assert_eq!(format_duration_ms(61_500), "1:01");
        assert_eq!(format_duration_ms(3_661_000), "1:01:01");
    }

    #[test]
    fn write_output_refuses_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_output(&path, "first", false).unwrap();
        let err = write_output(&path, "second", false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        write_output(&path, "second", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
