//! Camera adapters.

pub mod ffmpeg;
pub mod mjpeg;

pub use ffmpeg::{FfmpegCamera, FfmpegStream};
pub use mjpeg::MjpegSplitter;
