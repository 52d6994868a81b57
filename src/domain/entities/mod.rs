//! Domain entity definitions.

mod history_entry;
mod image;
mod source_image;
mod swap_result;
mod target;

pub use history_entry::{
    DATE_ERROR, HistoryEntry, INVALID_DATE, TIMESTAMP_SHIFT_HOURS, UNKNOWN_DATE,
    display_timestamp, entries_from_payload, shifted_timestamp,
};
pub use image::{ImageId, ImageSource, ImageStatus, LoadedImage};
pub use source_image::{CAMERA_CAPTURE_FILE_NAME, ImageOrigin, SourceImage};
pub use swap_result::SwapResult;
pub use target::{EffectiveTarget, TargetSelection, TargetStyle};
