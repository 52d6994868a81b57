//! Download DTOs.

/// File name for a freshly generated result.
pub const RESULT_FILE_NAME: &str = "face-swap-result.jpg";
/// File name for an image saved from the history overlay.
pub const OVERLAY_FILE_NAME: &str = "faceswap-image.jpg";

/// A remote image to save locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Image URL.
    pub url: String,
    /// Preferred local file name.
    pub file_name: String,
}

impl DownloadRequest {
    /// Creates new download request.
    #[must_use]
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
        }
    }

    /// Creates request for a swap result.
    #[must_use]
    pub fn for_result(url: impl Into<String>) -> Self {
        Self::new(url, RESULT_FILE_NAME)
    }
}
