//! Application configuration.

pub mod app_config;
/// Command-line flags.
pub mod args;
/// Config file location and persistence.
pub mod storage;

pub use app_config::{AppConfig, CameraConfig, LogLevel, StartScreen, UiConfig};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
