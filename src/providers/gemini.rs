//! Gemini provider implementation for AskVerse
//!
//! Calls the Generative Language `generateContent` endpoint with the question
//! as the only content part and returns the text of the first candidate.

use crate::config::GeminiConfig;
use crate::error::{AskverseError, Result};
use crate::providers::{CompletionRequest, CompletionResponse, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use askverse::config::GeminiConfig;
/// use askverse::providers::{CompletionRequest, GeminiProvider, Provider};
///
/// # async fn example() -> askverse::error::Result<()> {
/// let config = GeminiConfig {
///     api_key: Some("my-key".to_string()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config)?;
/// let completion = provider.complete(&CompletionRequest::new("2+2?")).await?;
/// println!("{}", completion.text);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

/// Error envelope returned by the API on failure
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when no API key is configured, or a
    /// provider error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AskverseError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("askverse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AskverseError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.content,
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Gemini request failed: {}", e);
                AskverseError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AskverseError::Provider(format!("Failed to read Gemini response: {}", e))
        })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => format!(
                    "{} {}: {}",
                    envelope.error.code, envelope.error.status, envelope.error.message
                ),
                Err(_) => text,
            };
            tracing::warn!("Gemini returned error {}: {}", status, detail);
            return Err(AskverseError::Provider(format!(
                "Gemini returned error {}: {}",
                status, detail
            ))
            .into());
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!("Failed to parse Gemini response: {}", e);
            AskverseError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let completion = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                AskverseError::Provider("Gemini response contained no candidate text".to_string())
            })?;

        let response = match parsed.usage_metadata {
            Some(usage) => CompletionResponse::with_usage(
                completion,
                TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count),
            ),
            None => CompletionResponse::new(completion),
        };

        Ok(response)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}
