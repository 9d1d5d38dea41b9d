//! Generated image gallery
//!
//! Newest-first, capped at [`GALLERY_CAPACITY`] entries, persisted under
//! `generatedImages` after every change.

use crate::providers::ImageEndpoint;
use crate::storage::{GeneratedImage, KeyValueStore, PersistedCollection, StorageKey};
use std::sync::Arc;

/// Maximum number of images kept; the oldest are dropped on overflow
pub const GALLERY_CAPACITY: usize = 10;

/// Image generation flow and its gallery
pub struct ImageGallery {
    endpoint: ImageEndpoint,
    images: Vec<GeneratedImage>,
    store: PersistedCollection<GeneratedImage>,
    current: Option<String>,
    preview: Option<GeneratedImage>,
}

impl ImageGallery {
    /// Load the gallery from `store`
    pub fn load(store: Arc<dyn KeyValueStore>, endpoint: ImageEndpoint) -> Self {
        let store = PersistedCollection::new(store, StorageKey::GeneratedImages);
        let mut images = store.load_logged();
        images.truncate(GALLERY_CAPACITY);

        Self {
            endpoint,
            images,
            store,
            current: None,
            preview: None,
        }
    }

    /// Generate an image for `prompt`
    ///
    /// Blank prompts are ignored. Otherwise the new image is put first,
    /// the gallery is cut back to [`GALLERY_CAPACITY`], and the image
    /// becomes the current one.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use askverse::gallery::ImageGallery;
    /// use askverse::providers::{ImageEndpoint, DEFAULT_IMAGE_ENDPOINT};
    /// use askverse::storage::MemoryStore;
    ///
    /// let endpoint = ImageEndpoint::new(DEFAULT_IMAGE_ENDPOINT).unwrap();
    /// let mut gallery = ImageGallery::load(Arc::new(MemoryStore::new()), endpoint);
    ///
    /// let image = gallery.generate("a cat").unwrap();
    /// assert!(image.image_url.contains("a%20cat"));
    /// assert_eq!(gallery.current_image_url(), Some(image.image_url.as_str()));
    /// assert!(gallery.generate("  ").is_none());
    /// ```
    pub fn generate(&mut self, prompt: &str) -> Option<GeneratedImage> {
        if prompt.trim().is_empty() {
            tracing::debug!("Ignoring blank image prompt");
            return None;
        }

        let image = GeneratedImage::new(prompt, self.endpoint.url_for(prompt));
        self.images.insert(0, image.clone());
        if self.images.len() > GALLERY_CAPACITY {
            let dropped = self.images.len() - GALLERY_CAPACITY;
            self.images.truncate(GALLERY_CAPACITY);
            tracing::debug!(dropped, "Dropped oldest images");
        }
        self.save();

        self.current = Some(image.image_url.clone());
        tracing::debug!(url = %image.image_url, "Generated image");
        Some(image)
    }

    /// Remove the image at `index` (0-based, newest first)
    ///
    /// Out-of-range indexes are ignored and return `None`.
    pub fn delete_image(&mut self, index: usize) -> Option<GeneratedImage> {
        if index >= self.images.len() {
            tracing::debug!(index, len = self.images.len(), "No image at index");
            return None;
        }

        let removed = self.images.remove(index);
        if self.preview.as_ref() == Some(&removed) {
            self.preview = None;
        }
        self.save();
        Some(removed)
    }

    /// Set or clear the image shown at full size
    pub fn select_for_preview(&mut self, image: Option<GeneratedImage>) {
        self.preview = image;
    }

    /// The image shown at full size
    pub fn preview(&self) -> Option<&GeneratedImage> {
        self.preview.as_ref()
    }

    /// URL of the most recently generated image this session
    pub fn current_image_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Gallery contents, newest first
    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    /// The endpoint URLs are built from
    pub fn endpoint(&self) -> &ImageEndpoint {
        &self.endpoint
    }

    fn save(&self) {
        if let Err(e) = self.store.save(&self.images) {
            tracing::warn!("Failed to persist gallery: {:#}", e);
        }
    }
}
