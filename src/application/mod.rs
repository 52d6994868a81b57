//! Application layer with use cases, screen-state services, and DTOs.

/// Data transfer objects.
pub mod dto;
/// Screen-state services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::DownloadRequest;
pub use services::{CameraController, CaptureWorkflow, HistoryGallery};
pub use use_cases::{DownloadImageUseCase, FetchHistoryUseCase, SubmitSwapUseCase};
