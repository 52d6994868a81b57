//! Infrastructure layer with external service adapters.

/// Face-swap, history and download HTTP adapters.
pub mod api;
/// `ffmpeg` camera adapter.
pub mod camera;
/// Application configuration.
pub mod config;
/// Image loading and caching.
pub mod image;

pub use api::{FaceSwapClient, HistoryClient, HttpDownloader, build_http_client};
pub use camera::FfmpegCamera;
pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager};
pub use image::{ImageLoadedEvent, ImageLoader, ImageLoaderConfig, ImageLocation};
