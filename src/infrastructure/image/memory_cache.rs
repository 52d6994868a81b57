//! In-memory LRU image cache implementation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::ImageId;
use crate::domain::ports::ImageCachePort;

/// Default maximum number of images to cache in memory.
pub const DEFAULT_CACHE_SIZE: usize = 64;

/// In-memory LRU cache for decoded images.
pub struct MemoryImageCache {
    cache: RwLock<LruCache<ImageId, Arc<image::DynamicImage>>>,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(cap)),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, id: &ImageId) -> Option<Arc<image::DynamicImage>> {
        let mut cache = self.cache.write().await;
        let hit = cache.get(id).cloned();
        trace!(id = %id, hit = hit.is_some(), "Memory cache lookup");
        hit
    }

    async fn put(&self, id: ImageId, image: Arc<image::DynamicImage>) {
        let mut cache = self.cache.write().await;
        debug!(id = %id, "Storing image in memory cache");
        cache.put(id, image);
    }
}
