//! Result download port definition.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::errors::DownloadError;

/// Port for saving a remote image locally.
#[async_trait]
pub trait DownloadPort: Send + Sync {
    /// Downloads `url` and stores it under `file_name`, returning the final path.
    ///
    /// An existing file is never overwritten; a numbered name is chosen instead.
    async fn download(&self, url: &str, file_name: &str) -> Result<PathBuf, DownloadError>;
}
