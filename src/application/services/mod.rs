//! Application services holding screen state.

pub mod camera_controller;
pub mod capture_workflow;
pub mod history_gallery;

pub use camera_controller::{CameraController, CameraSession};
pub use capture_workflow::{CapturePhase, CaptureWorkflow};
pub use history_gallery::{GalleryStatus, HistoryGallery, Overlay, ScrollGate, ScrollLock};
