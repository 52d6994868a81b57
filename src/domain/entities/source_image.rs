//! Source and custom target image value object.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

use crate::domain::errors::SourceError;

/// File name given to stills taken from the camera.
pub const CAMERA_CAPTURE_FILE_NAME: &str = "camera-capture.jpg";

/// Where an image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Picked from the filesystem.
    File(PathBuf),
    /// Captured from a live camera stream.
    Camera,
}

/// An image the user picked, ready to be sent as a multipart file.
#[derive(Clone)]
pub struct SourceImage {
    bytes: Bytes,
    file_name: String,
    mime: &'static str,
    origin: ImageOrigin,
}

impl SourceImage {
    /// Accepts a picked file, rejecting anything that is not an image.
    ///
    /// The MIME type comes from the file extension, falling back to the
    /// content's magic bytes.
    ///
    /// # Errors
    /// Returns `SourceError::NotAnImage` when neither identifies an image.
    pub fn from_file(path: &Path, bytes: impl Into<Bytes>) -> Result<Self, SourceError> {
        let bytes = bytes.into();
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().to_string());

        let format = path
            .extension()
            .and_then(ImageFormat::from_extension)
            .or_else(|| image::guess_format(&bytes).ok())
            .ok_or_else(|| SourceError::not_an_image(&file_name))?;

        Ok(Self {
            bytes,
            file_name,
            mime: format.to_mime_type(),
            origin: ImageOrigin::File(path.to_path_buf()),
        })
    }

    /// Rasterizes a captured frame into a JPEG still.
    ///
    /// # Errors
    /// Returns error if JPEG encoding fails.
    pub fn from_capture(frame: &DynamicImage) -> Result<Self, SourceError> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(frame.to_rgb8())
            .write_to(&mut buffer, ImageFormat::Jpeg)
            .map_err(|e| SourceError::Encode(e.to_string()))?;

        Ok(Self {
            bytes: Bytes::from(buffer.into_inner()),
            file_name: CAMERA_CAPTURE_FILE_NAME.to_string(),
            mime: ImageFormat::Jpeg.to_mime_type(),
            origin: ImageOrigin::Camera,
        })
    }

    /// Returns raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns file name sent with the upload.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns MIME type.
    #[must_use]
    pub const fn mime(&self) -> &'static str {
        self.mime
    }

    /// Returns origin.
    #[must_use]
    pub const fn origin(&self) -> &ImageOrigin {
        &self.origin
    }

    /// Returns size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if there are no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("origin", &self.origin)
            .finish()
    }
}
