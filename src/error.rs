//! Error types for AskVerse
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for AskVerse operations
///
/// Covers configuration loading, provider calls, persistence, and the
/// interactive terminal. Request failures never reach the user as errors:
/// the session substitutes a fallback answer instead.
#[derive(Error, Debug)]
pub enum AskverseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, malformed payloads, remote errors)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Interactive terminal errors
    #[error("Readline error: {0}")]
    Readline(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for AskVerse operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = AskverseError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = AskverseError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = AskverseError::MissingCredentials("gemini".to_string());
        assert_eq!(error.to_string(), "Missing credentials for provider: gemini");
    }

    #[test]
    fn test_storage_error_display() {
        let error = AskverseError::Storage("flush failed".to_string());
        assert_eq!(error.to_string(), "Storage error: flush failed");
    }

    #[test]
    fn test_readline_error_display() {
        let error = AskverseError::Readline("terminal closed".to_string());
        assert_eq!(error.to_string(), "Readline error: terminal closed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AskverseError = io_error.into();
        assert!(matches!(error, AskverseError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: AskverseError = json_error.into();
        assert!(matches!(error, AskverseError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: AskverseError = yaml_error.into();
        assert!(matches!(error, AskverseError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AskverseError>();
    }
}
