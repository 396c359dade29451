use anyhow::Result;
use async_trait::async_trait;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::llm::ollama::OllamaClient;

/// The external augmentation capability: prompt in, generated text out.
///
/// Backends may be local or hosted; the pipeline never sees anything beyond
/// this contract. Timeouts are a backend concern and surface as ordinary
/// errors.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build a model backend from runtime settings.
pub fn build_model(settings: &Settings) -> Result<Box<dyn LanguageModel>> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiClient::from_settings(settings)?)),
        "ollama" => Ok(Box::new(OllamaClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini, ollama",
            other
        ),
    }
}
