//! Ollama provider implementation for AskVerse
//!
//! Sends each question as a single user message to an Ollama server's
//! `/api/chat` endpoint with streaming disabled.

use crate::config::OllamaConfig;
use crate::error::{AskverseError, Result};
use crate::providers::{CompletionRequest, CompletionResponse, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use askverse::config::OllamaConfig;
/// use askverse::providers::{CompletionRequest, OllamaProvider, Provider};
///
/// # async fn example() -> askverse::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let completion = provider.complete(&CompletionRequest::new("Hello!")).await?;
/// println!("{}", completion.text);
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

/// Request structure for Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// Message structure for Ollama API
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::config::OllamaConfig;
    /// use askverse::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("askverse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AskverseError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama provider: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Get the configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));

        let body = OllamaRequest {
            model: &self.config.model,
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: request.content.clone(),
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Ollama request failed: {}", e);
                AskverseError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Ollama returned error {}: {}", status, error_text);
            return Err(AskverseError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse Ollama response: {}", e);
            AskverseError::Provider(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            ollama_response.done,
            ollama_response.prompt_eval_count,
            ollama_response.eval_count
        );

        let text = ollama_response.message.content;
        let response = if ollama_response.prompt_eval_count > 0 || ollama_response.eval_count > 0 {
            let usage = TokenUsage::new(
                ollama_response.prompt_eval_count,
                ollama_response.eval_count,
            );
            CompletionResponse::with_usage(text, usage)
        } else {
            CompletionResponse::new(text)
        };

        Ok(response)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OllamaProvider {
        OllamaProvider::new(OllamaConfig {
            host: server.uri(),
            model: "llama3.2:latest".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new(OllamaConfig::default()).unwrap();
        assert_eq!(provider.host(), "http://localhost:11434");
        assert_eq!(provider.model(), "llama3.2:latest");
        assert_eq!(provider.name(), "ollama");
    }

    #[tokio::test]
    async fn test_complete_sends_single_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "model": "llama3.2:latest",
                "messages": [{"role": "user", "content": "2+2?"}],
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "4"},
                "done": true,
                "prompt_eval_count": 7,
                "eval_count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider_for(&server)
            .complete(&CompletionRequest::new("2+2?"))
            .await
            .unwrap();

        assert_eq!(response.text, "4");
        assert_eq!(response.usage, Some(TokenUsage::new(7, 1)));
    }

    #[tokio::test]
    async fn test_complete_without_counts_has_no_usage() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "hi"},
                "done": true
            })))
            .mount(&server)
            .await;

        let response = provider_for(&server)
            .complete(&CompletionRequest::new("hello"))
            .await
            .unwrap();
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_complete_error_status_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&CompletionRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_complete_malformed_body_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = provider_for(&server)
            .complete(&CompletionRequest::new("hello"))
            .await;
        assert!(result.is_err());
    }
}
