//! Test utilities for AskVerse
//!
//! Stores pre-seeded with chats, temporary sled databases, a config that
//! needs no network, and assertion helpers.

use crate::config::Config;
use crate::error::Result;
use crate::session::ChatLog;
use crate::storage::{ChatExchange, MemoryStore, SledStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Open a sled store inside a fresh temporary directory
///
/// Keep the returned directory alive for as long as the store is used.
pub fn temp_sled_store() -> (SledStore, TempDir) {
    let dir = temp_dir();
    let store = SledStore::open(dir.path().join("store")).expect("Failed to open sled store");
    (store, dir)
}

/// In-memory store whose history holds `(question, answer)` pairs in order
pub fn seeded_store(exchanges: &[(&str, &str)]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut log = ChatLog::load(store.clone());
    for (question, answer) in exchanges {
        log.record(ChatExchange::new(*question, *answer));
    }
    store
}

/// Default config pointing at Ollama, which needs no API key to build
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.provider.provider_type = "ollama".to_string();
    config
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', got Ok", expected),
        Err(e) => {
            let message = format!("{:#}", e);
            assert!(
                message.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AskverseError;
    use crate::storage::KeyValueStore;

    #[test]
    fn test_seeded_store_keeps_order() {
        let store = seeded_store(&[("q1", "a1"), ("q2", "a2")]);
        let log = ChatLog::load(store);
        assert_eq!(
            log.history(),
            &[ChatExchange::new("q1", "a1"), ChatExchange::new("q2", "a2")]
        );
    }

    #[test]
    fn test_temp_sled_store_is_writable() {
        let (store, _dir) = temp_sled_store();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_offline_config_validates() {
        offline_config().validate().unwrap();
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(AskverseError::Config("invalid".to_string()).into());
        assert_error_contains(result, "invalid");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_panics_on_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "anything");
    }
}
