mod file_explorer;
mod image_view;
mod status_bar;

pub use file_explorer::{FileExplorerAction, FileExplorerComponent, is_image_path};
pub use image_view::{
    GALLERY_ERROR_LABEL, ImageManager, ImageSlot, ImageView, OVERLAY_ERROR_LABEL,
    PREVIEW_ERROR_LABEL,
};
pub use status_bar::{StatusBar, StatusLevel, StatusMessage};
