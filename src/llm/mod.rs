//! Language-model capability layer for recap
//!
//! The pipeline's extraction, research, and summary nodes consume a single
//! request/response capability; concrete backends (hosted Gemini, local
//! Ollama) are selected by configuration.

mod client;
mod gemini;
mod ollama;
pub mod prompts;

pub use client::{build_model, LanguageModel};
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
