//! Whole-document persistence of ordered collections
//!
//! A [`PersistedCollection`] reads a JSON array from a [`KeyValueStore`] at
//! startup and rewrites the entire array after every mutation. Loading never
//! fails: absent, unreadable, or malformed data yields an empty collection,
//! and the [`LoadStatus`] records which case occurred for diagnostics.

use super::{KeyValueStore, StorageKey};
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Why a load produced the items it did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// A valid sequence was stored
    Loaded,
    /// Nothing was stored under the key
    Absent,
    /// A value was stored but is not a valid sequence of the element type
    Corrupt(String),
    /// The backing store could not be read
    Unavailable(String),
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => write!(f, "loaded"),
            Self::Absent => write!(f, "absent"),
            Self::Corrupt(reason) => write!(f, "corrupt ({})", reason),
            Self::Unavailable(reason) => write!(f, "unavailable ({})", reason),
        }
    }
}

/// Result of [`PersistedCollection::load`]
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// The loaded items, empty unless `status` is [`LoadStatus::Loaded`]
    pub items: Vec<T>,
    /// How the items were obtained
    pub status: LoadStatus,
}

impl<T> Loaded<T> {
    fn empty(status: LoadStatus) -> Self {
        Self {
            items: Vec::new(),
            status,
        }
    }
}

/// An ordered sequence of `T` persisted under a fixed key
pub struct PersistedCollection<T> {
    store: Arc<dyn KeyValueStore>,
    key: StorageKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> PersistedCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a collection to `key` in `store`
    pub fn new(store: Arc<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// The key this collection is stored under
    pub fn key(&self) -> StorageKey {
        self.key
    }

    /// Load the stored sequence
    ///
    /// Never fails. Anything other than a valid JSON array of `T` produces
    /// an empty sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use askverse::storage::{ChatExchange, LoadStatus, MemoryStore, PersistedCollection, StorageKey};
    ///
    /// let history: PersistedCollection<ChatExchange> =
    ///     PersistedCollection::new(Arc::new(MemoryStore::new()), StorageKey::ChatHistory);
    /// let loaded = history.load();
    /// assert!(loaded.items.is_empty());
    /// assert_eq!(loaded.status, LoadStatus::Absent);
    /// ```
    pub fn load(&self) -> Loaded<T> {
        let raw = match self.store.get_bytes(self.key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Loaded::empty(LoadStatus::Absent),
            Err(e) => return Loaded::empty(LoadStatus::Unavailable(e.to_string())),
        };

        match serde_json::from_slice::<Vec<T>>(&raw) {
            Ok(items) => Loaded {
                items,
                status: LoadStatus::Loaded,
            },
            Err(e) => Loaded::empty(LoadStatus::Corrupt(e.to_string())),
        }
    }

    /// Load and log the outcome
    ///
    /// Used by owners at startup so absent and corrupt data are
    /// distinguishable in the logs without changing behavior.
    pub fn load_logged(&self) -> Vec<T> {
        let loaded = self.load();
        match &loaded.status {
            LoadStatus::Loaded => {
                tracing::debug!(key = %self.key, count = loaded.items.len(), "Loaded collection")
            }
            LoadStatus::Absent => tracing::debug!(key = %self.key, "No stored collection"),
            LoadStatus::Corrupt(_) | LoadStatus::Unavailable(_) => {
                tracing::warn!(key = %self.key, status = %loaded.status, "Starting with empty collection")
            }
        }
        loaded.items
    }

    /// Serialize and write the full sequence, replacing any previous value
    pub fn save(&self, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(self.key.as_str(), &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ChatExchange, GeneratedImage, MemoryStore, SledStore};

    fn memory_collection<T: Serialize + DeserializeOwned>(
        key: StorageKey,
    ) -> (Arc<MemoryStore>, PersistedCollection<T>) {
        let store = Arc::new(MemoryStore::new());
        let collection = PersistedCollection::new(store.clone() as Arc<dyn KeyValueStore>, key);
        (store, collection)
    }

    #[test]
    fn test_load_absent_key_is_empty() {
        let (_store, history) = memory_collection::<ChatExchange>(StorageKey::ChatHistory);
        let loaded = history.load();
        assert!(loaded.items.is_empty());
        assert_eq!(loaded.status, LoadStatus::Absent);
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let (_store, history) = memory_collection::<ChatExchange>(StorageKey::ChatHistory);
        let items = vec![
            ChatExchange::new("first", "1"),
            ChatExchange::new("second", "2"),
            ChatExchange::new("first", "1"),
        ];

        history.save(&items).expect("save failed");
        let loaded = history.load();

        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.items, items);
    }

    #[test]
    fn test_load_unparsable_value_is_empty_and_corrupt() {
        let (store, history) = memory_collection::<ChatExchange>(StorageKey::ChatHistory);
        store.set("chatHistory", "{not json").unwrap();

        let loaded = history.load();
        assert!(loaded.items.is_empty());
        assert!(matches!(loaded.status, LoadStatus::Corrupt(_)));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let (store, history) = memory_collection::<ChatExchange>(StorageKey::ChatHistory);
        store
            .set("chatHistory", r#"{"question":"not an array","answer":"x"}"#)
            .unwrap();
        assert!(matches!(history.load().status, LoadStatus::Corrupt(_)));

        store.set("chatHistory", r#"[{"question":"missing answer"}]"#).unwrap();
        let loaded = history.load();
        assert!(loaded.items.is_empty());
        assert!(matches!(loaded.status, LoadStatus::Corrupt(_)));
    }

    #[test]
    fn test_load_reads_browser_format() {
        let (store, gallery) = memory_collection::<GeneratedImage>(StorageKey::GeneratedImages);
        store
            .set(
                "generatedImages",
                r#"[{"prompt":"a cat","imageUrl":"https://image.pollinations.ai/prompt/a%20cat"}]"#,
            )
            .unwrap();

        let loaded = gallery.load();
        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.items[0].prompt, "a cat");
    }

    #[test]
    fn test_save_overwrites_whole_collection() {
        let (_store, pinned) = memory_collection::<ChatExchange>(StorageKey::PinnedChats);
        pinned
            .save(&[ChatExchange::new("a", "1"), ChatExchange::new("b", "2")])
            .unwrap();
        pinned.save(&[ChatExchange::new("c", "3")]).unwrap();

        assert_eq!(pinned.load().items, vec![ChatExchange::new("c", "3")]);
    }

    #[test]
    fn test_collections_do_not_share_keys() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let history = PersistedCollection::<ChatExchange>::new(store.clone(), StorageKey::ChatHistory);
        let pinned = PersistedCollection::<ChatExchange>::new(store, StorageKey::PinnedChats);

        history.save(&[ChatExchange::new("q", "a")]).unwrap();
        assert_eq!(pinned.load().status, LoadStatus::Absent);
    }

    #[test]
    fn test_roundtrip_through_sled() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store: Arc<dyn KeyValueStore> =
            Arc::new(SledStore::open(dir.path().join("store")).expect("open failed"));
        let gallery = PersistedCollection::<GeneratedImage>::new(store, StorageKey::GeneratedImages);

        let items = vec![GeneratedImage::new("a dog", "u2"), GeneratedImage::new("a cat", "u1")];
        gallery.save(&items).unwrap();
        assert_eq!(gallery.load().items, items);
    }
}
