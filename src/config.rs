//! Configuration management for AskVerse
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AskverseError, Result};
use crate::providers::{DEFAULT_IMAGE_ENDPOINT, PROVIDER_TYPES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Main configuration structure for AskVerse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Text-generation provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chat session behavior
    #[serde(default)]
    pub session: SessionConfig,

    /// Image generation settings
    #[serde(default)]
    pub images: ImagesConfig,

    /// Where history and images are stored
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which text-generation provider to use and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to send questions to
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable for tests and proxies)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// API key; prefer `ASKVERSE_GEMINI_API_KEY` over writing it to disk
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP request timeout
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key: None,
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reveal answers one character at a time
    #[serde(default = "default_typing_effect")]
    pub typing_effect: bool,
}

fn default_typing_effect() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing_effect: default_typing_effect(),
        }
    }
}

/// Image generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Base URL the prompt is appended to
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,
}

fn default_image_endpoint() -> String {
    DEFAULT_IMAGE_ENDPOINT.to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_image_endpoint(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sled database directory; the platform data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AskverseError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AskverseError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("ASKVERSE_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(api_key) = std::env::var("ASKVERSE_GEMINI_API_KEY") {
            self.provider.gemini.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("ASKVERSE_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("ASKVERSE_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("ASKVERSE_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("ASKVERSE_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Session overrides
        if let Ok(typing) = std::env::var("ASKVERSE_TYPING_EFFECT") {
            match typing.parse::<bool>() {
                Ok(v) => {
                    self.session.typing_effect = v;
                    tracing::debug!(typing_effect = v, "Env override: ASKVERSE_TYPING_EFFECT");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for ASKVERSE_TYPING_EFFECT: {}", typing);
                }
            }
        }

        // Storage override
        if let Ok(store) = std::env::var(crate::storage::STORE_PATH_ENV) {
            self.storage.path = Some(PathBuf::from(store));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(provider) = &cli.provider {
            self.provider.provider_type = provider.clone();
        }

        if cli.no_typing {
            self.session.typing_effect = false;
        }

        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set. A missing Gemini API key
    /// is not checked here; it is reported when the provider is created.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(AskverseError::Config("Provider type cannot be empty".to_string()).into());
        }

        if !PROVIDER_TYPES.contains(&self.provider.provider_type.as_str()) {
            return Err(AskverseError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                PROVIDER_TYPES.join(", ")
            ))
            .into());
        }

        if self.provider.gemini.model.trim().is_empty() {
            return Err(
                AskverseError::Config("gemini.model cannot be empty".to_string()).into(),
            );
        }

        if Url::parse(&self.provider.gemini.api_base).is_err() {
            return Err(AskverseError::Config(format!(
                "gemini.api_base is not a valid URL: {}",
                self.provider.gemini.api_base
            ))
            .into());
        }

        if self.provider.gemini.timeout_seconds == 0 {
            return Err(AskverseError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.ollama.host.trim().is_empty() {
            return Err(AskverseError::Config("ollama.host cannot be empty".to_string()).into());
        }

        if self.provider.ollama.model.trim().is_empty() {
            return Err(
                AskverseError::Config("ollama.model cannot be empty".to_string()).into(),
            );
        }

        crate::providers::ImageEndpoint::new(&self.images.endpoint)?;

        Ok(())
    }
}
