//! Data transfer objects for the application layer.

mod download_dto;

pub use download_dto::{DownloadRequest, OVERLAY_FILE_NAME, RESULT_FILE_NAME};
