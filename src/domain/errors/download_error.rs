//! Result download error types.

use std::path::PathBuf;

use thiserror::Error;

/// Download error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DownloadError {
    #[error("download failed: HTTP {status}")]
    Status { status: u16 },

    #[error("download failed: {message}")]
    Network { message: String },

    #[error("failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
}
