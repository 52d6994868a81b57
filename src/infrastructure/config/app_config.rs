//! Application configuration.

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::ports::FacingMode;

const APP_NAME: &str = "faceswap-tui";
const APP_QUALIFIER: &str = "id";
const APP_ORGANIZATION: &str = "incoe";

/// Default face-swap endpoint.
pub const DEFAULT_SWAP_URL: &str = "https://portal2.incoe.astra.co.id/api/face-swap";
/// Default history listing endpoint.
pub const DEFAULT_HISTORY_URL: &str = "https://portal4.incoe.astra.co.id:4433/get_data_faceswap";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Screen shown at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartScreen {
    /// Capture and submit.
    #[default]
    Capture,
    /// History gallery.
    History,
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Face-swap endpoint.
    #[serde(default = "default_swap_url")]
    pub swap_url: String,

    /// History listing endpoint.
    #[serde(default = "default_history_url")]
    pub history_url: String,

    /// Where downloads are written. Falls back to the user's download dir.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Directory holding the template previews.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Enable mouse support.
    #[serde(default = "default_true")]
    pub mouse: bool,

    /// Request timeout in seconds, 0 disables it.
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// Camera configuration.
    #[serde(default)]
    pub camera: CameraConfig,

    /// UI configuration.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffmpeg input format (`v4l2`, `avfoundation`, `dshow`).
    #[serde(default = "default_input_format")]
    pub input_format: String,

    /// Device used for the front (`user`) camera.
    #[serde(default = "default_front_device")]
    pub front_device: String,

    /// Device used for the back (`environment`) camera.
    #[serde(default = "default_back_device")]
    pub back_device: String,
}

impl CameraConfig {
    /// Returns the device for `facing`.
    #[must_use]
    pub fn device_for(&self, facing: FacingMode) -> &str {
        match facing {
            FacingMode::User => &self.front_device,
            FacingMode::Environment => &self.back_device,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            input_format: default_input_format(),
            front_device: default_front_device(),
            back_device: default_back_device(),
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Timestamp format string (chrono format).
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Render images inline. When off, only labels are shown.
    #[serde(default = "default_true")]
    pub image_preview: bool,

    /// Screen shown at startup.
    #[serde(default)]
    pub start_screen: StartScreen,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            image_preview: true,
            start_screen: StartScreen::default(),
        }
    }
}

fn default_swap_url() -> String {
    DEFAULT_SWAP_URL.to_string()
}

fn default_history_url() -> String {
    DEFAULT_HISTORY_URL.to_string()
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_input_format() -> String {
    if cfg!(target_os = "macos") {
        "avfoundation".to_string()
    } else if cfg!(windows) {
        "dshow".to_string()
    } else {
        "v4l2".to_string()
    }
}

fn default_front_device() -> String {
    "/dev/video0".to_string()
}

fn default_back_device() -> String {
    "/dev/video2".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_true() -> bool {
    true
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(swap_url) = args.swap_url {
            self.swap_url = swap_url;
        }
        if let Some(history_url) = args.history_url {
            self.history_url = history_url;
        }
        if let Some(download_dir) = args.download_dir {
            self.download_dir = Some(download_dir);
        }
        if let Some(assets_dir) = args.assets_dir {
            self.assets_dir = assets_dir;
        }
        if let Some(mouse) = args.mouse {
            self.mouse = mouse;
        }
        if args.history {
            self.ui.start_screen = StartScreen::History;
        }
    }

    /// Returns the request timeout, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Returns the directory downloads are written to.
    #[must_use]
    pub fn effective_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(PathBuf::from)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("faceswap-tui.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            swap_url: default_swap_url(),
            history_url: default_history_url(),
            download_dir: None,
            assets_dir: default_assets_dir(),
            log_level: LogLevel::Info,
            mouse: true,
            request_timeout_secs: 0,
            camera: CameraConfig::default(),
            ui: UiConfig::default(),
        }
    }
}
