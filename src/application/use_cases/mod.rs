//! Use case implementations.

mod download_image_use_case;
mod fetch_history_use_case;
mod submit_swap_use_case;

pub use download_image_use_case::DownloadImageUseCase;
pub use fetch_history_use_case::FetchHistoryUseCase;
pub use submit_swap_use_case::SubmitSwapUseCase;
