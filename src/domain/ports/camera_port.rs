//! Camera port definition.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::errors::CameraError;

/// Which camera to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera.
    #[default]
    User,
    /// Back camera.
    Environment,
}

impl FacingMode {
    /// Returns the other facing mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    /// Returns the label of the control that switches away from this mode.
    #[must_use]
    pub const fn switch_label(self) -> &'static str {
        match self {
            Self::User => "Back camera",
            Self::Environment => "Front camera",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// A live video-only stream from one camera.
///
/// Dropping a stream must not leave the device open; callers still stop it
/// explicitly so release happens at a known point.
pub trait CameraStream: Send {
    /// Returns the facing mode the stream was opened with.
    fn facing(&self) -> FacingMode;

    /// Returns the most recent complete frame as encoded image bytes.
    fn latest_frame(&self) -> Option<Bytes>;

    /// Returns true until stopped or the source ends.
    fn is_live(&mut self) -> bool;

    /// Stops the stream and releases the device. Idempotent.
    fn stop(&mut self);
}

/// Port for opening camera streams.
#[async_trait]
pub trait CameraPort: Send + Sync {
    /// Opens a stream for `facing`.
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>, CameraError>;
}
