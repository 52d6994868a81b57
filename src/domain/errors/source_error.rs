//! Source and target image selection errors.

use thiserror::Error;

/// Errors raised while accepting a local image.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The picked file is not an image.
    #[error("Please upload a valid image file (JPG, PNG)")]
    NotAnImage {
        /// Name of the rejected file.
        file_name: String,
    },

    /// The picked file could not be read.
    #[error("failed to read {file_name}: {message}")]
    Unreadable {
        /// Name of the file.
        file_name: String,
        /// I/O failure text.
        message: String,
    },

    /// A captured frame could not be turned into a still image.
    #[error("failed to encode captured frame: {0}")]
    Encode(String),
}

impl SourceError {
    /// Creates not-an-image error.
    #[must_use]
    pub fn not_an_image(file_name: impl Into<String>) -> Self {
        Self::NotAnImage {
            file_name: file_name.into(),
        }
    }

    /// Creates unreadable file error.
    #[must_use]
    pub fn unreadable(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreadable {
            file_name: file_name.into(),
            message: message.into(),
        }
    }
}
