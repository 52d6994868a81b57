//! Camera capture error types.

use thiserror::Error;

/// Camera error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CameraError {
    #[error("Unable to access the camera. Make sure camera access is allowed. ({message})")]
    AccessDenied { message: String },

    #[error("camera stream ended: {message}")]
    StreamEnded { message: String },

    #[error("no frame available yet, try again")]
    NoFrame,

    #[error("camera is not active")]
    NotActive,

    #[error("failed to decode camera frame: {0}")]
    Decode(String),
}

impl CameraError {
    /// Creates access denied error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates stream ended error.
    #[must_use]
    pub fn stream_ended(message: impl Into<String>) -> Self {
        Self::StreamEnded {
            message: message.into(),
        }
    }

    /// Returns whether capture can simply be retried.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoFrame)
    }
}
