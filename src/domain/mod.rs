//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{HistoryEntry, SourceImage, SwapResult, TargetSelection, TargetStyle};
pub use errors::{CameraError, DownloadError, HistoryError, SourceError, SwapError};
pub use ports::{CameraPort, DownloadPort, FaceSwapPort, HistoryPort};
