//! Base provider trait and common types for AskVerse
//!
//! This module defines the Provider trait that text-generation backends
//! implement, along with the request and response types exchanged with them.
//! Each question is sent on its own: there is no conversational context.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single completion request
///
/// Carries the literal question text as its only content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The question exactly as submitted
    pub content: String,
}

impl CompletionRequest {
    /// Create a new request
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::providers::CompletionRequest;
    ///
    /// let request = CompletionRequest::new("2+2?");
    /// assert_eq!(request.content, "2+2?");
    /// ```
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with text and optional token usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// The completion text
    pub text: String,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::providers::CompletionResponse;
    ///
    /// let response = CompletionResponse::new("4");
    /// assert_eq!(response.text, "4");
    /// assert!(response.usage.is_none());
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage: Some(usage),
        }
    }
}

/// Provider trait for text-generation backends
///
/// A provider answers one request with one completion, or fails. It makes
/// exactly one attempt; retrying is not its concern.
///
/// # Examples
///
/// ```no_run
/// use askverse::providers::{CompletionRequest, CompletionResponse, Provider};
/// use askverse::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
///         Ok(CompletionResponse::new(request.content.clone()))
///     }
///
///     fn name(&self) -> &str {
///         "echo"
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate a completion for a single request
    ///
    /// # Errors
    ///
    /// Returns error if the call fails, the remote reports an error, or the
    /// response does not contain completion text
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Short provider identifier ("gemini", "ollama", ...)
    fn name(&self) -> &str;

    /// The model requests are sent to
    ///
    /// # Default Implementation
    ///
    /// Returns an empty string for providers without a model notion.
    fn model(&self) -> String {
        String::new()
    }
}
