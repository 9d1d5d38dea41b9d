//! Chat session against a mocked Gemini endpoint
//!
//! The provider is real; only the remote service is replaced by wiremock.

use std::sync::Arc;

use askverse::config::GeminiConfig;
use askverse::providers::{GeminiProvider, Provider};
use askverse::session::{ChatSession, SubmitOutcome, FALLBACK_ANSWER};
use askverse::storage::{ChatExchange, MemoryStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> ChatSession {
    let provider = GeminiProvider::new(GeminiConfig {
        api_base: server.uri(),
        api_key: Some("integration-key".to_string()),
        model: "gemini-test".to_string(),
        ..Default::default()
    })
    .expect("provider builds with a key");
    let provider: Arc<dyn Provider> = Arc::new(provider);
    ChatSession::new(provider, Arc::new(MemoryStore::new()), false)
}

#[tokio::test]
async fn test_question_sent_verbatim_and_answer_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "integration-key"))
        .and(body_json(json!({
            "contents": [{ "parts": [{ "text": "  2+2?  " }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "4" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 4, "candidatesTokenCount": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let outcome = session.submit_question("  2+2?  ").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Answered(ChatExchange::new("  2+2?  ", "4"))
    );
    assert_eq!(session.state().displayed_answer, "4");
    assert!(!session.state().busy);
}

#[tokio::test]
async fn test_remote_error_becomes_fallback_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    let outcome = session.submit_question("hello?").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(ChatExchange::new("hello?", FALLBACK_ANSWER))
    );
    assert_eq!(session.state().answer, FALLBACK_ANSWER);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_malformed_payload_becomes_fallback_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let session = session_for(&server);
    let outcome = session.submit_question("anything").await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    assert_eq!(session.state().displayed_answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn test_unreachable_service_becomes_fallback_answer() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let provider = GeminiProvider::new(GeminiConfig {
        api_base: uri,
        api_key: Some("integration-key".to_string()),
        timeout_seconds: 2,
        ..Default::default()
    })
    .unwrap();
    let session = ChatSession::new(Arc::new(provider), Arc::new(MemoryStore::new()), false);

    let outcome = session.submit_question("is anyone there?").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
}
