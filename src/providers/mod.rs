//! Provider module for AskVerse
//!
//! This module contains the text-generation provider abstraction, the Gemini
//! and Ollama implementations, a scripted provider for tests, and the
//! image-generation URL builder.

pub mod base;
pub mod fake;
pub mod gemini;
pub mod image;
pub mod ollama;

pub use base::{CompletionRequest, CompletionResponse, Provider, TokenUsage};
pub use fake::{FakeGate, FakeProvider, FakeReply};
pub use gemini::GeminiProvider;
pub use image::{ImageEndpoint, DEFAULT_IMAGE_ENDPOINT};
pub use ollama::OllamaProvider;

use crate::config::ProviderConfig;
use crate::error::{AskverseError, Result};

/// Provider types accepted in configuration
pub const PROVIDER_TYPES: [&str; 2] = ["gemini", "ollama"];

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration; `provider_type` selects the backend
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if the provider type is unknown, credentials are missing,
/// or initialization fails
///
/// # Examples
///
/// ```
/// use askverse::config::ProviderConfig;
/// use askverse::providers::create_provider;
///
/// let config = ProviderConfig {
///     provider_type: "ollama".to_string(),
///     ..Default::default()
/// };
/// let provider = create_provider(&config).unwrap();
/// assert_eq!(provider.name(), "ollama");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::new(config.gemini.clone())?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        other => Err(AskverseError::Provider(format!(
            "Unknown provider type: {}. Must be one of: {}",
            other,
            PROVIDER_TYPES.join(", ")
        ))
        .into()),
    }
}
