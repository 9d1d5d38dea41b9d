//! Scripted in-process provider
//!
//! `FakeProvider` answers from a queue of replies instead of a network
//! service. Gated replies stay pending until the test releases them, which
//! makes overlapping submissions deterministic.

use crate::error::{AskverseError, Result};
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// One scripted reply
#[derive(Debug)]
pub enum FakeReply {
    /// Answer immediately with this text
    Text(String),
    /// Fail immediately with this message
    Error(String),
    /// Wait for the paired [`FakeGate`] to be released
    Gated(oneshot::Receiver<std::result::Result<String, String>>),
}

/// Release handle for a gated reply
#[derive(Debug)]
pub struct FakeGate {
    sender: oneshot::Sender<std::result::Result<String, String>>,
}

impl FakeGate {
    /// Complete the gated call with `text`
    pub fn answer(self, text: impl Into<String>) {
        let _ = self.sender.send(Ok(text.into()));
    }

    /// Complete the gated call with an error
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.sender.send(Err(message.into()));
    }
}

/// Provider that replays a script
///
/// # Examples
///
/// ```
/// use askverse::providers::{CompletionRequest, FakeProvider, Provider};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = FakeProvider::new();
/// provider.push_text("4");
///
/// let response = provider.complete(&CompletionRequest::new("2+2?")).await.unwrap();
/// assert_eq!(response.text, "4");
/// assert_eq!(provider.calls(), vec!["2+2?".to_string()]);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct FakeProvider {
    script: Mutex<VecDeque<FakeReply>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    /// Create a provider with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that answers each call with the next text
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for answer in answers {
            provider.push_text(answer);
        }
        provider
    }

    /// Queue an immediate answer
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(FakeReply::Text(text.into()));
    }

    /// Queue an immediate failure
    pub fn push_error(&self, message: impl Into<String>) {
        self.push(FakeReply::Error(message.into()));
    }

    /// Queue a reply that waits for the returned gate
    pub fn push_gated(&self) -> FakeGate {
        let (sender, receiver) = oneshot::channel();
        self.push(FakeReply::Gated(receiver));
        FakeGate { sender }
    }

    fn push(&self, reply: FakeReply) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
    }

    /// Contents of every request received, in arrival order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.content.clone());
        }

        let next = self
            .script
            .lock()
            .map_err(|_| AskverseError::Provider("Fake script lock poisoned".to_string()))?
            .pop_front();

        let outcome = match next {
            Some(FakeReply::Text(text)) => Ok(text),
            Some(FakeReply::Error(message)) => Err(message),
            Some(FakeReply::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err("gate dropped".to_string())),
            None => Err("no scripted reply".to_string()),
        };

        outcome
            .map(CompletionResponse::new)
            .map_err(|message| AskverseError::Provider(message).into())
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order() {
        let provider = FakeProvider::with_answers(["one", "two"]);

        let first = provider.complete(&CompletionRequest::new("a")).await.unwrap();
        let second = provider.complete(&CompletionRequest::new("b")).await.unwrap();

        assert_eq!(first.text, "one");
        assert_eq!(second.text, "two");
        assert_eq!(provider.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_error_and_exhausted_script() {
        let provider = FakeProvider::new();
        provider.push_error("boom");

        let err = provider
            .complete(&CompletionRequest::new("q"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));

        assert!(provider.complete(&CompletionRequest::new("q")).await.is_err());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_gated_reply_waits_for_release() {
        let provider = std::sync::Arc::new(FakeProvider::new());
        let gate = provider.push_gated();

        let task = {
            let provider = provider.clone();
            tokio::spawn(async move { provider.complete(&CompletionRequest::new("slow")).await })
        };

        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.answer("done");
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.text, "done");
    }

    #[tokio::test]
    async fn test_dropped_gate_fails() {
        let provider = FakeProvider::new();
        drop(provider.push_gated());
        assert!(provider.complete(&CompletionRequest::new("q")).await.is_err());
    }
}
