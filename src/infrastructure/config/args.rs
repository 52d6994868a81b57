use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line flags layered over the config file.
#[derive(Debug, Parser)]
#[command(
    name = "faceswap-tui",
    version,
    about = "Swap faces from your terminal and browse earlier results",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Face-swap endpoint.
    #[arg(long, value_name = "URL", env = "FACESWAP_URL")]
    pub swap_url: Option<String>,

    /// History listing endpoint.
    #[arg(long, value_name = "URL", env = "FACESWAP_HISTORY_URL")]
    pub history_url: Option<String>,

    /// Directory downloads are written to.
    #[arg(long, value_name = "PATH")]
    pub download_dir: Option<PathBuf>,

    /// Directory holding the template previews.
    #[arg(long, value_name = "PATH")]
    pub assets_dir: Option<PathBuf>,

    /// Enable mouse support.
    #[arg(long)]
    pub mouse: Option<bool>,

    /// Start on the history screen.
    #[arg(long)]
    pub history: bool,
}
