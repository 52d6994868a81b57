mod camera_port;
mod download_port;
mod face_swap_port;
mod history_port;
mod image_cache_port;

pub use camera_port::{CameraPort, CameraStream, FacingMode};
pub use download_port::DownloadPort;
pub use face_swap_port::{
    FaceSwapPort, SOURCE_IMAGE_FIELD, SwapRequest, TARGET_IMAGE_FIELD, TARGET_TYPE_FIELD,
};
pub use history_port::HistoryPort;
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort};
