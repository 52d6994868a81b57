//! Port definition for image caching.

use std::sync::Arc;

use crate::domain::entities::ImageId;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while loading a displayable image.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// Failed to decode image.
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// I/O error while reading a local image.
    #[error("IO error: {0}")]
    IoError(String),
    /// Network error during download.
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Port for image caching operations.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Attempts to get an image from the cache.
    async fn get(&self, id: &ImageId) -> Option<Arc<image::DynamicImage>>;

    /// Stores an image in the cache.
    async fn put(&self, id: ImageId, image: Arc<image::DynamicImage>);
}
