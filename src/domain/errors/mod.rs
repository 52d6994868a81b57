//! Domain error types.

mod camera_error;
mod download_error;
mod history_error;
mod source_error;
mod swap_error;

pub use camera_error::CameraError;
pub use download_error::DownloadError;
pub use history_error::HistoryError;
pub use source_error::SourceError;
pub use swap_error::SwapError;
