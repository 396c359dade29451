//! recap - Structured transcripts and AI-powered recaps from meeting caption files
//!
//! Entry point for the recap CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recap::cli::{Cli, Commands};
use recap::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            recap::cli::completions::print(shell);
        }
        command => {
            // Load configuration only for runtime commands.
            let settings = Settings::load()?;

            match command {
                Commands::Parse {
                    input,
                    output,
                    pretty,
                    force,
                } => {
                    recap::cli::commands::parse_transcript(&settings, &input, output, pretty, force)?;
                }
                Commands::Summarize {
                    input,
                    json,
                    output,
                    force,
                } => {
                    recap::cli::commands::summarize_transcript(
                        &settings, &input, json, output, force,
                    )
                    .await?;
                }
                Commands::Speakers { input } => {
                    recap::cli::commands::list_speakers(&settings, &input)?;
                }
                Commands::Config(config_cmd) => {
                    recap::cli::commands::config_command(&settings, config_cmd)?;
                }
                Commands::Completions { .. } => unreachable!(),
            }
        }
    }

    Ok(())
}
