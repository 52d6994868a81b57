//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Async image loading pipeline for remote and bundled images

pub mod loader;
pub mod memory_cache;

pub use loader::{ImageLoadedEvent, ImageLoader, ImageLoaderConfig, ImageLocation, decode_bytes};
pub use memory_cache::MemoryImageCache;
