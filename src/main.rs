use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use faceswap_tui::application::use_cases::{
    DownloadImageUseCase, FetchHistoryUseCase, SubmitSwapUseCase,
};
use faceswap_tui::infrastructure::{
    AppConfig, CliArgs, ConfigError, FaceSwapClient, FfmpegCamera, HistoryClient, HttpDownloader,
    StorageManager, build_http_client,
};
use faceswap_tui::presentation::widgets::ImageManager;
use faceswap_tui::presentation::{App, AppServices, AppSettings};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: CliArgs) -> (AppConfig, Option<ConfigError>) {
    let loaded =
        StorageManager::new().and_then(|storage| storage.load_config(args.config.as_deref()));
    let (mut config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    config.merge_with_args(args);
    (config, load_error)
}

fn create_services(config: &AppConfig) -> Result<AppServices> {
    let http = build_http_client(config.request_timeout()).map_err(|e| eyre!(e))?;

    let swap_client = Arc::new(FaceSwapClient::new(http.clone(), config.swap_url.clone()));
    let history_client = Arc::new(HistoryClient::new(http.clone(), config.history_url.clone()));
    let downloader = Arc::new(HttpDownloader::new(http, config.effective_download_dir()));
    let camera = Arc::new(FfmpegCamera::new(config.camera.clone()));

    Ok(AppServices {
        submit_swap: SubmitSwapUseCase::new(swap_client),
        fetch_history: FetchHistoryUseCase::new(history_client),
        download_image: DownloadImageUseCase::new(downloader),
        camera,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (config, load_error) = load_config(CliArgs::parse());
    init_logging(&config)?;
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    info!(
        version = faceswap_tui::VERSION,
        swap_url = %config.swap_url,
        history_url = %config.history_url,
        "Starting {}",
        faceswap_tui::NAME
    );

    let services = create_services(&config)?;
    let settings = AppSettings::from_config(&config);

    let mut terminal = ratatui::init();

    let image_manager = if settings.previews {
        ImageManager::new()
    } else {
        ImageManager::halfblocks()
    };

    let result = match App::new(services, settings, image_manager) {
        Ok(app) => app.run(&mut terminal).await,
        Err(e) => Err(e),
    };

    ratatui::restore();

    result
}
