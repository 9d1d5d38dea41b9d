//! Chat history and pinned chats
//!
//! Both collections are loaded once at construction and rewritten in full
//! after every mutation. Write failures are logged and otherwise ignored;
//! the in-memory collection stays authoritative for the session.

use crate::storage::{ChatExchange, KeyValueStore, PersistedCollection, StorageKey};
use std::sync::Arc;

/// Prompt shown before a chat is deleted
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this chat?";

/// A yes/no gate at the UI boundary
///
/// Implemented for closures so callers can pass `|_| true` in tests or a
/// readline prompt in the terminal.
pub trait Confirmation {
    /// Ask `prompt` and return the user's answer
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// History log and pinned set
pub struct ChatLog {
    history: Vec<ChatExchange>,
    pinned: Vec<ChatExchange>,
    history_store: PersistedCollection<ChatExchange>,
    pinned_store: PersistedCollection<ChatExchange>,
}

impl ChatLog {
    /// Load history and pinned chats from `store`
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let history_store = PersistedCollection::new(store.clone(), StorageKey::ChatHistory);
        let pinned_store = PersistedCollection::new(store, StorageKey::PinnedChats);

        Self {
            history: history_store.load_logged(),
            pinned: pinned_store.load_logged(),
            history_store,
            pinned_store,
        }
    }

    /// All recorded exchanges, oldest first
    pub fn history(&self) -> &[ChatExchange] {
        &self.history
    }

    /// Pinned exchanges in pin order
    pub fn pinned(&self) -> &[ChatExchange] {
        &self.pinned
    }

    /// Append an exchange to the history
    pub fn record(&mut self, exchange: ChatExchange) {
        self.history.push(exchange);
        save_logged(&self.history_store, &self.history);
    }

    /// Whether an equal exchange is pinned
    pub fn is_pinned(&self, exchange: &ChatExchange) -> bool {
        self.pinned.contains(exchange)
    }

    /// Unpin the exchange if pinned, otherwise pin it
    ///
    /// Returns whether the exchange is pinned afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use askverse::session::ChatLog;
    /// use askverse::storage::{ChatExchange, MemoryStore};
    ///
    /// let mut log = ChatLog::load(Arc::new(MemoryStore::new()));
    /// let exchange = ChatExchange::new("2+2?", "4");
    ///
    /// assert!(log.toggle_pin(&exchange));
    /// assert!(!log.toggle_pin(&exchange));
    /// assert!(log.pinned().is_empty());
    /// ```
    pub fn toggle_pin(&mut self, exchange: &ChatExchange) -> bool {
        let pinned = match self.pinned.iter().position(|p| p == exchange) {
            Some(index) => {
                self.pinned.remove(index);
                false
            }
            None => {
                self.pinned.push(exchange.clone());
                true
            }
        };
        save_logged(&self.pinned_store, &self.pinned);
        pinned
    }

    /// Delete every history entry equal to `exchange` once confirmed
    ///
    /// Returns the number of entries removed; zero when the user declines.
    /// Equal duplicates are all removed. Pinned chats are never touched.
    pub fn delete(&mut self, exchange: &ChatExchange, confirmation: &dyn Confirmation) -> usize {
        if !confirmation.confirm(DELETE_CONFIRMATION_PROMPT) {
            tracing::debug!("Chat deletion declined");
            return 0;
        }

        let before = self.history.len();
        self.history.retain(|entry| entry != exchange);
        let removed = before - self.history.len();

        if removed > 1 {
            tracing::info!(removed, "Deleted duplicate chats sharing the same question and answer");
        }
        save_logged(&self.history_store, &self.history);
        removed
    }
}

fn save_logged(collection: &PersistedCollection<ChatExchange>, items: &[ChatExchange]) {
    if let Err(e) = collection.save(items) {
        tracing::warn!(key = %collection.key(), "Failed to persist collection: {:#}", e);
    }
}
