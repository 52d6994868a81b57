//! Async image loading orchestrator.
//!
//! Two tiers: Memory -> Network. Bundled templates and picked photos skip
//! the network and are decoded directly.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{RwLock, Semaphore, mpsc};
use tracing::{debug, error, warn};

use crate::domain::entities::{ImageId, ImageSource, LoadedImage};
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort};

use super::memory_cache::MemoryImageCache;

/// Longest edge kept after decoding; larger images are downscaled.
const MAX_DECODED_EDGE: u32 = 1024;

/// Message sent when an image finishes loading.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The image ID.
    pub id: ImageId,
    /// The loaded image, or the failure text.
    pub result: Result<LoadedImage, String>,
}

/// Where to read an image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// Remote URL.
    Remote(String),
    /// Local file.
    Local(PathBuf),
    /// Already-read bytes, such as a picked photo.
    Memory(Bytes),
}

impl ImageLocation {
    /// Returns the cache key for this location.
    #[must_use]
    pub fn id(&self) -> ImageId {
        match self {
            Self::Remote(url) => ImageId::from_url(url),
            Self::Local(path) => ImageId::from_url(&format!("file://{}", path.display())),
            Self::Memory(bytes) => ImageId::from_bytes(bytes),
        }
    }
}

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum images in memory cache.
    pub memory_cache_size: usize,
    /// Maximum concurrent downloads.
    pub max_concurrent_downloads: usize,
    /// Request timeout, if any.
    pub timeout: Option<Duration>,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: 64,
            max_concurrent_downloads: 4,
            timeout: None,
        }
    }
}

/// Orchestrates image loading from memory, disk, and network.
pub struct ImageLoader {
    request_tx: mpsc::UnboundedSender<LoaderCommand>,
    config: ImageLoaderConfig,
}

#[derive(Debug)]
enum LoaderCommand {
    Load { id: ImageId, location: ImageLocation },
    CancelAll,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState {
    handle: ImageLoaderHandle,
    semaphore: Arc<Semaphore>,
    request_rx: mpsc::UnboundedReceiver<LoaderCommand>,
}

impl ImageLoader {
    /// Creates a new image loader and spawns its worker.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        config: ImageLoaderConfig,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> CacheResult<Self> {
        let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_size));

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| CacheError::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_downloads.max(1)));
        let pending_loads = Arc::new(RwLock::new(HashSet::new()));

        let worker_state = WorkerState {
            handle: ImageLoaderHandle {
                memory_cache,
                pending_loads,
                event_tx: event_tx.clone(),
                http_client,
            },
            semaphore,
            request_rx,
        };

        tokio::spawn(Self::run_worker_loop(worker_state));

        Ok(Self {
            request_tx,
            config,
        })
    }

    /// Worker loop to handle load requests and throttling.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut queue: VecDeque<(ImageId, ImageLocation)> = VecDeque::new();

        loop {
            tokio::select! {
                cmd = state.request_rx.recv() => {
                    match cmd {
                        Some(LoaderCommand::Load { id, location }) => {
                            if !queue.iter().any(|(qid, _)| *qid == id) {
                                queue.push_front((id, location));
                            }
                        }
                        Some(LoaderCommand::CancelAll) => {
                            queue.clear();
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !queue.is_empty() => {
                    if let Some((id, location)) = queue.pop_front() {
                        let handle = state.handle.clone();

                        tokio::spawn(async move {
                            {
                                let mut pending = handle.pending_loads.write().await;
                                if !pending.insert(id.clone()) {
                                    return;
                                }
                            }

                            let result = handle.load_image(&id, &location).await;

                            handle.pending_loads.write().await.remove(&id);

                            if let Err(e) = &result {
                                warn!(id = %id, error = %e, "Image load failed");
                            }
                            let _ = handle.event_tx.send(ImageLoadedEvent { id, result });
                            drop(permit);
                        });
                    }
                }
            }
        }
    }

    /// Starts loading an image asynchronously.
    /// The result will be sent via the event channel.
    pub fn load_async(&self, location: ImageLocation) -> ImageId {
        let id = location.id();
        if let Err(e) = self.request_tx.send(LoaderCommand::Load {
            id: id.clone(),
            location,
        }) {
            error!("Failed to send load request: {}", e);
        }
        id
    }

    /// Drops every queued load. Loads already running still report back.
    pub fn cancel_all(&self) {
        if let Err(e) = self.request_tx.send(LoaderCommand::CancelAll) {
            error!("Failed to send cancel all request: {}", e);
        }
    }
}

/// Decodes encoded image bytes off the async runtime.
///
/// # Errors
/// Returns `CacheError::DecodeError` if the bytes are not a supported image.
pub async fn decode_bytes(bytes: Bytes) -> CacheResult<image::DynamicImage> {
    tokio::task::spawn_blocking(move || decode_and_fit(&bytes))
        .await
        .map_err(|e| CacheError::DecodeError(format!("Decode task panicked: {e}")))?
}

fn decode_and_fit(bytes: &[u8]) -> CacheResult<image::DynamicImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CacheError::DecodeError(format!("Failed to decode image: {e}")))?;

    if img.width() > MAX_DECODED_EDGE || img.height() > MAX_DECODED_EDGE {
        Ok(img.resize(
            MAX_DECODED_EDGE,
            MAX_DECODED_EDGE,
            image::imageops::FilterType::Triangle,
        ))
    } else {
        Ok(img)
    }
}

/// Internal handle for async loading tasks.
#[derive(Clone)]
struct ImageLoaderHandle {
    memory_cache: Arc<MemoryImageCache>,
    pending_loads: Arc<RwLock<HashSet<ImageId>>>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    http_client: reqwest::Client,
}

impl ImageLoaderHandle {
    async fn load_image(
        &self,
        id: &ImageId,
        location: &ImageLocation,
    ) -> Result<LoadedImage, String> {
        if let Some(img) = self.memory_cache.get(id).await {
            return Ok(LoadedImage {
                id: id.clone(),
                image: img,
                source: ImageSource::MemoryCache,
            });
        }

        let bytes = match location {
            ImageLocation::Remote(url) => self.download(url).await,
            ImageLocation::Local(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|e| CacheError::IoError(format!("{}: {e}", path.display()))),
            ImageLocation::Memory(bytes) => Ok(bytes.clone()),
        }
        .map_err(|e| e.to_string())?;

        let img = Arc::new(decode_bytes(bytes).await.map_err(|e| e.to_string())?);
        self.memory_cache.put(id.clone(), img.clone()).await;

        let source = match location {
            ImageLocation::Remote(_) => ImageSource::Network,
            ImageLocation::Local(_) | ImageLocation::Memory(_) => ImageSource::Local,
        };
        debug!(id = %id, %source, "Image loaded");

        Ok(LoadedImage {
            id: id.clone(),
            image: img,
            source,
        })
    }

    async fn download(&self, url: &str) -> CacheResult<Bytes> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::NetworkError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_decode_downscales_large_images() {
        let img = decode_bytes(Bytes::from(png_bytes(2048, 512))).await.unwrap();
        assert_eq!(img.width(), MAX_DECODED_EDGE);
        assert_eq!(img.height(), 256);
    }

    #[tokio::test]
    async fn test_decode_rejects_garbage() {
        let result = decode_bytes(Bytes::from_static(b"not an image")).await;
        assert!(matches!(result, Err(CacheError::DecodeError(_))));
    }

    #[tokio::test]
    async fn test_local_file_load_reports_through_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AI_CBI_Female.png");
        std::fs::write(&path, png_bytes(8, 4)).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = ImageLoader::new(ImageLoaderConfig::default(), &tx).unwrap();

        let id = loader.load_async(ImageLocation::Local(path));
        let event = rx.recv().await.unwrap();

        assert_eq!(event.id, id);
        assert_eq!(event.result.unwrap().image.width(), 8);

        loader.load_async(ImageLocation::Local(dir.path().join("AI_CBI_Female.png")));
        let cached = rx.recv().await.unwrap().result.unwrap();
        assert_eq!(cached.source, ImageSource::MemoryCache);
    }

    #[tokio::test]
    async fn test_missing_file_reports_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = ImageLoader::new(ImageLoaderConfig::default(), &tx).unwrap();

        loader.load_async(ImageLocation::Local(PathBuf::from("/nonexistent/AI_CBI_Male.png")));
        let event = rx.recv().await.unwrap();

        assert!(event.result.is_err());
    }
}
