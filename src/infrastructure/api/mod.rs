//! Adapters for the remote face-swap and history services.

pub mod client;
pub mod downloader;
pub mod dto;

pub use client::{FaceSwapClient, HistoryClient, build_http_client};
pub use downloader::HttpDownloader;
