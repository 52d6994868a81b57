//! Domain types for remote image handling.

use std::sync::Arc;

/// Unique identifier for a cached image, derived from its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub String);

impl ImageId {
    /// Creates a new `ImageId` from any string-like input.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates an `ImageId` from a URL by hashing it.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        Self::from_bytes(url.as_bytes())
    }

    /// Creates an `ImageId` from in-memory content.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let result = Sha256::digest(bytes);
        Self(hex::encode(&result[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an image in the loading pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Loading has not started.
    #[default]
    NotStarted,
    /// Being fetched or decoded.
    Loading,
    /// Ready for display.
    Ready,
    /// Failed; the placeholder is shown instead.
    Failed(String),
}

impl ImageStatus {
    /// Returns true if the image is ready.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if loading is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if loading hasn't started yet.
    #[must_use]
    pub const fn is_not_started(&self) -> bool {
        matches!(self, Self::NotStarted)
    }
}

/// A decoded image and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Cache key.
    pub id: ImageId,
    /// Decoded pixels.
    pub image: Arc<image::DynamicImage>,
    /// Origin of the pixels.
    pub source: ImageSource,
}

/// Where an image was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// In-memory LRU cache.
    MemoryCache,
    /// Downloaded from network.
    Network,
    /// Decoded from a local file or in-memory bytes.
    Local,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
            Self::Local => write!(f, "local"),
        }
    }
}
