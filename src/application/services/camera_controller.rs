//! Camera session lifecycle.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::domain::entities::SourceImage;
use crate::domain::errors::CameraError;
use crate::domain::ports::{CameraPort, CameraStream, FacingMode};

/// A live camera stream, stopped when dropped.
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
}

impl CameraSession {
    /// Wraps an opened stream.
    #[must_use]
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream }
    }

    /// Returns facing mode.
    #[must_use]
    pub fn facing(&self) -> FacingMode {
        self.stream.facing()
    }

    /// Returns the most recent frame.
    #[must_use]
    pub fn latest_frame(&self) -> Option<Bytes> {
        self.stream.latest_frame()
    }

    /// Returns true while the stream is running.
    pub fn is_live(&mut self) -> bool {
        self.stream.is_live()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stream.stop();
        debug!(facing = %self.stream.facing(), "Camera session released");
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("facing", &self.stream.facing())
            .finish_non_exhaustive()
    }
}

/// Owns at most one camera session at a time.
///
/// Every operation that opens a stream releases the previous one first.
pub struct CameraController {
    camera: Arc<dyn CameraPort>,
    session: Option<CameraSession>,
    facing: FacingMode,
}

impl CameraController {
    /// Creates controller with no open session.
    #[must_use]
    pub fn new(camera: Arc<dyn CameraPort>) -> Self {
        Self {
            camera,
            session: None,
            facing: FacingMode::default(),
        }
    }

    /// Returns the facing mode used for the next open.
    #[must_use]
    pub const fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Returns true if a session is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the most recent frame of the open session.
    #[must_use]
    pub fn latest_frame(&self) -> Option<Bytes> {
        self.session.as_ref().and_then(CameraSession::latest_frame)
    }

    /// Returns true while the open session still produces frames.
    pub fn is_live(&mut self) -> bool {
        self.session.as_mut().is_some_and(CameraSession::is_live)
    }

    /// Opens a stream at the current facing mode.
    ///
    /// # Errors
    /// Returns error if the device cannot be opened; no session remains.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        self.stop();
        self.open().await
    }

    /// Switches between front and back camera.
    ///
    /// # Errors
    /// Returns error if the new device cannot be opened; no session remains.
    pub async fn toggle_facing(&mut self) -> Result<FacingMode, CameraError> {
        self.stop();
        self.facing = self.facing.toggled();
        info!(facing = %self.facing, "Switching camera");
        self.open().await?;
        Ok(self.facing)
    }

    /// Takes a still from the open stream and closes the session.
    ///
    /// The session stays open when no frame has arrived yet.
    ///
    /// # Errors
    /// Returns error if no session is open or the frame cannot be decoded.
    pub fn capture(&mut self) -> Result<SourceImage, CameraError> {
        let session = self.session.as_mut().ok_or(CameraError::NotActive)?;
        if !session.is_live() {
            self.stop();
            return Err(CameraError::stream_ended("camera stopped producing frames"));
        }

        let frame = session.latest_frame().ok_or(CameraError::NoFrame)?;
        let decoded =
            image::load_from_memory(&frame).map_err(|e| CameraError::Decode(e.to_string()))?;
        let still =
            SourceImage::from_capture(&decoded).map_err(|e| CameraError::Decode(e.to_string()))?;

        info!(
            width = decoded.width(),
            height = decoded.height(),
            "Captured still from camera"
        );
        self.stop();
        Ok(still)
    }

    /// Releases the open session, if any.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(facing = %session.facing(), "Stopping camera");
            drop(session);
        }
    }

    async fn open(&mut self) -> Result<(), CameraError> {
        match self.camera.open(self.facing).await {
            Ok(stream) => {
                info!(facing = %self.facing, "Camera stream opened");
                self.session = Some(CameraSession::new(stream));
                Ok(())
            }
            Err(e) => {
                warn!(facing = %self.facing, error = %e, "Unable to open camera");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for CameraController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraController")
            .field("facing", &self.facing)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
