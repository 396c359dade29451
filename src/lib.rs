//! recap - Turn raw meeting caption files into structured transcripts and AI-powered recaps
//!
//! The transcript module normalizes WebVTT-style caption cues into an ordered,
//! immutable transcript; the pipeline module runs a small guarded graph of
//! processing nodes over it to produce key points, action items, and a
//! researched glossary.

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod transcript;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "recap";
