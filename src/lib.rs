//! AskVerse - conversational assistant library
//!
//! This library provides the client-side session behind the `askverse`
//! terminal app: questions sent to a text-generation provider, answers
//! revealed one character at a time, and a persisted history, pinned set,
//! and image gallery.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Request lifecycle, reveal animation, chat log, and the
//!   session controller that coordinates them
//! - `gallery`: Image generation flow and the capped gallery
//! - `providers`: Text-generation providers (Gemini, Ollama) and the image endpoint
//! - `storage`: Key-value stores and persisted collections
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and terminal view
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use askverse::{create_provider, ChatSession, Config, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = Arc::from(create_provider(&config.provider)?);
//!     let session = ChatSession::new(provider, Arc::new(MemoryStore::new()), false);
//!     session.submit_question("What is the capital of France?").await;
//!     println!("{}", session.state().answer);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gallery;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{AskverseError, Result};
pub use gallery::ImageGallery;
pub use providers::{create_provider, ImageEndpoint, Provider};
pub use session::{ChatSession, SessionState, SubmitOutcome};
pub use storage::{ChatExchange, GeneratedImage, KeyValueStore, MemoryStore, SledStore};

#[cfg(test)]
pub mod test_utils;
