use serde::{Deserialize, Serialize};
use std::fmt;

/// One question/answer pair
///
/// Identity is structural: two exchanges are the same chat when both the
/// question and the answer are equal. Pin and delete lookups rely on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatExchange {
    /// The question exactly as submitted
    pub question: String,
    /// The completion text, or the fallback answer for a failed request
    pub answer: String,
}

impl ChatExchange {
    /// Create a new exchange
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::storage::ChatExchange;
    ///
    /// let exchange = ChatExchange::new("2+2?", "4");
    /// assert_eq!(exchange.question, "2+2?");
    /// assert_eq!(exchange, ChatExchange::new("2+2?", "4"));
    /// ```
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Short label used when listing exchanges
    ///
    /// The first 40 characters of the question followed by an ellipsis.
    pub fn title(&self) -> String {
        let head: String = self.question.chars().take(40).collect();
        format!("{}...", head)
    }
}

/// A generated image reference
///
/// Serialized with the `imageUrl` field name so stored galleries keep the
/// shape they had in browser storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// The prompt exactly as entered
    pub prompt: String,
    /// URL the image can be fetched from
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl GeneratedImage {
    /// Create a new gallery entry
    pub fn new(prompt: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: image_url.into(),
        }
    }
}

/// Logical keys under which collections are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Ordered chat history
    ChatHistory,
    /// User-curated pinned chats
    PinnedChats,
    /// Newest-first image gallery
    GeneratedImages,
    /// Terminal palette preference
    DarkMode,
}

impl StorageKey {
    /// The literal key string used in the backing store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatHistory => "chatHistory",
            Self::PinnedChats => "pinnedChats",
            Self::GeneratedImages => "generatedImages",
            Self::DarkMode => "darkMode",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
