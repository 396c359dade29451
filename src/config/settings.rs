//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::{DEFAULT_MAX_KEYWORDS, DEFAULT_MAX_STEPS, DEFAULT_WINDOW_CHARS};
use crate::transcript::DEFAULT_MERGE_GAP_MS;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Transcript normalization settings
    #[serde(default)]
    pub parser: ParserSettings,

    /// Pipeline policy settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// LLM settings
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Maximum silence (milliseconds) between same-speaker cues for them to
    /// be merged into one utterance
    #[serde(default = "default_merge_gap_ms")]
    pub merge_gap_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Accumulated text window size (characters) before keyword extraction runs
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,

    /// Maximum distinct keywords extracted per run
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Step bound guarding against miswired graph cycles
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini, ollama)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name (empty = provider default)
    #[serde(default)]
    pub model: String,

    /// API endpoint (for local/custom providers)
    #[serde(default)]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions

fn default_merge_gap_ms() -> u64 {
    DEFAULT_MERGE_GAP_MS
}

fn default_window_chars() -> usize {
    DEFAULT_WINDOW_CHARS
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    45
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            merge_gap_ms: default_merge_gap_ms(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            window_chars: default_window_chars(),
            max_keywords: default_max_keywords(),
            max_steps: default_max_steps(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parser: ParserSettings::default(),
            pipeline: PipelineSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("RECAP_GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "recap", "recap")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policies() {
        let settings = Settings::default();
        assert_eq!(settings.parser.merge_gap_ms, 1000);
        assert_eq!(settings.pipeline.window_chars, 4000);
        assert_eq!(settings.pipeline.max_keywords, 24);
        assert_eq!(settings.pipeline.max_steps, 256);
        assert_eq!(settings.llm.provider, "gemini");
        assert_eq!(settings.llm.timeout_secs, 45);
    }

    #[test]
    fn partial_config_fills_missing_sections_with_defaults() {
        let settings: Settings = toml::from_str(
            "[pipeline]\nwindow_chars = 1234\n\n[llm]\nprovider = \"ollama\"\n",
        )
        .unwrap();

        assert_eq!(settings.pipeline.window_chars, 1234);
        assert_eq!(settings.pipeline.max_steps, 256);
        assert_eq!(settings.parser.merge_gap_ms, 1000);
        assert_eq!(settings.llm.provider, "ollama");
    }
}
