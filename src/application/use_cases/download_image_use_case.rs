//! Image download use case.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::DownloadRequest;
use crate::domain::errors::DownloadError;
use crate::domain::ports::DownloadPort;

/// Saves a remote image into the download directory.
#[derive(Clone)]
pub struct DownloadImageUseCase {
    download_port: Arc<dyn DownloadPort>,
}

impl DownloadImageUseCase {
    /// Creates new download use case.
    #[must_use]
    pub const fn new(download_port: Arc<dyn DownloadPort>) -> Self {
        Self { download_port }
    }

    /// Executes the download.
    ///
    /// # Errors
    /// Returns error if fetching or writing fails.
    pub async fn execute(&self, request: DownloadRequest) -> Result<PathBuf, DownloadError> {
        match self
            .download_port
            .download(&request.url, &request.file_name)
            .await
        {
            Ok(path) => {
                info!(path = %path.display(), "Image downloaded");
                Ok(path)
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Image download failed");
                Err(e)
            }
        }
    }
}
