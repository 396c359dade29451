//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// recap - Structured transcripts and AI-powered recaps from meeting caption files
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a raw caption file into the structured JSON transcript
    Parse {
        /// Input caption file (WebVTT-style cues)
        input: PathBuf,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON artifact
        #[arg(long)]
        pretty: bool,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Run the summary pipeline over a caption file or transcript artifact
    Summarize {
        /// Input file: raw captions (.vtt) or a parsed transcript (.json)
        input: PathBuf,

        /// Emit the summary as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// List speakers with turn counts and speaking time
    Speakers {
        /// Input file: raw captions (.vtt) or a parsed transcript (.json)
        input: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
