//! UI screens.

mod app;
mod capture_screen;
mod history_screen;

pub use app::{App, AppServices, AppSettings};
pub use capture_screen::{
    CaptureKeyResult, CaptureScreen, CaptureScreenState, PickPurpose, SOURCE_HINT, STYLE_NOTE,
    TEMPLATE_CAPTION, read_image_file,
};
pub use history_screen::{EMPTY_MESSAGE, HistoryKeyResult, HistoryScreen, HistoryScreenState};
