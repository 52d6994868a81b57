//! Main application orchestrator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::layout::{Constraint, Layout};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::application::dto::DownloadRequest;
use crate::application::use_cases::{
    DownloadImageUseCase, FetchHistoryUseCase, SubmitSwapUseCase,
};
use crate::domain::entities::{HistoryEntry, SourceImage, SwapResult};
use crate::domain::errors::{DownloadError, HistoryError, SourceError, SwapError};
use crate::domain::ports::{CameraPort, SwapRequest};
use crate::infrastructure::config::{AppConfig, StartScreen};
use crate::infrastructure::image::{
    ImageLoadedEvent, ImageLoader, ImageLoaderConfig, ImageLocation, decode_bytes,
};
use crate::presentation::events::{EventHandler, EventResult, MouseAction};
use crate::presentation::ui::{
    CaptureKeyResult, CaptureScreen, CaptureScreenState, HistoryKeyResult, HistoryScreen,
    HistoryScreenState, PickPurpose, read_image_file,
};
use crate::presentation::widgets::{ImageManager, StatusBar, StatusMessage};

const CAMERA_TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum Action {
    SwapFinished {
        generation: u64,
        outcome: Result<SwapResult, SwapError>,
    },
    HistoryLoaded {
        generation: u64,
        outcome: Result<Vec<HistoryEntry>, HistoryError>,
    },
    Downloaded(Result<PathBuf, DownloadError>),
    FilePicked {
        generation: u64,
        purpose: PickPurpose,
        outcome: Result<SourceImage, SourceError>,
    },
    CameraFrame {
        generation: u64,
        frame: Option<Arc<image::DynamicImage>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppState {
    Running,
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraCommand {
    Start,
    ToggleFacing,
}

enum CurrentScreen {
    Capture(Box<CaptureScreenState>),
    History(Box<HistoryScreenState>),
}

/// Settings the screens are built from.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Directory holding the template previews.
    pub assets_dir: PathBuf,
    /// chrono format for history timestamps.
    pub timestamp_format: String,
    /// Render images inline.
    pub previews: bool,
    /// Capture mouse input.
    pub mouse: bool,
    /// Screen shown first.
    pub start_screen: StartScreen,
    /// Request timeout for image loads.
    pub timeout: Option<Duration>,
}

impl AppSettings {
    /// Extracts the UI settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            assets_dir: config.assets_dir.clone(),
            timestamp_format: config.ui.timestamp_format.clone(),
            previews: config.ui.image_preview,
            mouse: config.mouse,
            start_screen: config.ui.start_screen,
            timeout: config.request_timeout(),
        }
    }
}

/// Use cases and adapters the app drives.
pub struct AppServices {
    /// Face swap submission.
    pub submit_swap: SubmitSwapUseCase,
    /// History listing.
    pub fetch_history: FetchHistoryUseCase,
    /// Result downloads.
    pub download_image: DownloadImageUseCase,
    /// Camera device access.
    pub camera: Arc<dyn CameraPort>,
}

/// Terminal application: one screen at a time plus a status bar.
pub struct App {
    state: AppState,
    screen: CurrentScreen,
    services: AppServices,
    settings: AppSettings,
    image_loader: ImageLoader,
    image_rx: mpsc::UnboundedReceiver<ImageLoadedEvent>,
    image_manager: ImageManager,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    status: Option<StatusMessage>,
    pending_camera: Option<CameraCommand>,
    generation: u64,
}

impl App {
    /// Creates the app and mounts the start screen.
    ///
    /// # Errors
    /// Returns error if the image loader cannot be created.
    pub fn new(
        services: AppServices,
        settings: AppSettings,
        image_manager: ImageManager,
    ) -> color_eyre::Result<Self> {
        let (image_tx, image_rx) = mpsc::unbounded_channel();
        let image_loader = ImageLoader::new(
            ImageLoaderConfig {
                timeout: settings.timeout,
                ..ImageLoaderConfig::default()
            },
            &image_tx,
        )?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            state: AppState::Running,
            screen: CurrentScreen::Capture(Box::new(CaptureScreenState::new(
                services.camera.clone(),
                settings.assets_dir.clone(),
                settings.previews,
            ))),
            services,
            settings,
            image_loader,
            image_rx,
            image_manager,
            action_tx,
            action_rx,
            status: None,
            pending_camera: None,
            generation: 0,
        };
        if app.settings.start_screen == StartScreen::History {
            app.mount_history();
        }
        Ok(app)
    }

    /// Runs the event loop until the user quits.
    ///
    /// # Errors
    /// Returns error if the terminal cannot be drawn.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        if self.settings.mouse {
            crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
        }

        let result = self.run_event_loop(terminal).await;

        if self.settings.mouse {
            crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
        }
        info!("Application exiting normally");
        result
    }

    async fn run_event_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();
        let mut camera_interval = interval(CAMERA_TICK_RATE);

        self.draw(terminal)?;

        while self.state != AppState::Exiting {
            let terminal_event = terminal_events.next();

            tokio::select! {
                biased;

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                    self.draw(terminal)?;
                }

                Some(event) = self.image_rx.recv() => {
                    self.handle_image_loaded(&event);
                    self.draw(terminal)?;
                }

                Some(Ok(event)) = terminal_event => {
                    if self.handle_terminal_event(event) == EventResult::Exit {
                        self.state = AppState::Exiting;
                    }
                    self.draw(terminal)?;
                    if let Some(command) = self.pending_camera.take() {
                        self.run_camera_command(command).await;
                        self.draw(terminal)?;
                    }
                }

                _ = camera_interval.tick() => {
                    if self.poll_camera() {
                        self.draw(terminal)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.prepare_images();
        terminal.draw(|frame| self.render(frame))?;
        self.request_images();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let [body, footer] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

        let (hints, alert) = match &mut self.screen {
            CurrentScreen::Capture(state) => {
                frame.render_stateful_widget(CaptureScreen, body, state);
                (state.hints(), state.alert())
            }
            CurrentScreen::History(state) => {
                frame.render_stateful_widget(HistoryScreen, body, state);
                (state.hints(), state.alert())
            }
        };

        let message = alert.or_else(|| self.status.clone());
        frame.render_widget(StatusBar::new(hints).message(message.as_ref()), footer);
    }

    fn prepare_images(&mut self) {
        match &mut self.screen {
            CurrentScreen::Capture(state) => self.image_manager.prepare(&mut state.slots_mut()),
            CurrentScreen::History(state) => {
                self.image_manager.prepare(&mut state.visible_slots_mut());
            }
        }
    }

    fn request_images(&mut self) {
        let loads: Vec<ImageLocation> = match &mut self.screen {
            CurrentScreen::Capture(state) => state
                .slots_mut()
                .into_iter()
                .filter_map(|slot| slot.take_pending_load())
                .collect(),
            CurrentScreen::History(state) => state.pending_loads(),
        };
        for location in loads {
            self.image_loader.load_async(location);
        }
    }

    fn handle_image_loaded(&mut self, event: &ImageLoadedEvent) {
        let applied = match &mut self.screen {
            CurrentScreen::Capture(state) => state
                .slots_mut()
                .into_iter()
                .fold(false, |applied, slot| slot.apply(&event.id, &event.result) | applied),
            CurrentScreen::History(state) => state.apply_loaded(event),
        };
        if !applied {
            debug!(id = %event.id, "Image result for an unmounted slot");
        }
    }

    fn handle_terminal_event(&mut self, event: Event) -> EventResult {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => match EventHandler::mouse_action(&mouse) {
                Some(action) => self.handle_mouse(action),
                None => EventResult::Continue,
            },
            _ => EventResult::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        if !EventHandler::is_actionable(&key) {
            return EventResult::Continue;
        }
        if EventHandler::is_force_quit(&key) {
            return EventResult::Exit;
        }
        self.status = None;

        let result = match &mut self.screen {
            CurrentScreen::Capture(state) => match state.handle_key(key) {
                CaptureKeyResult::Consumed => EventResult::Continue,
                CaptureKeyResult::Quit => EventResult::Exit,
                CaptureKeyResult::SwitchScreen => EventResult::SwitchScreen,
                CaptureKeyResult::StartCamera => {
                    self.pending_camera = Some(CameraCommand::Start);
                    self.status = Some(StatusMessage::info("Starting camera..."));
                    EventResult::Continue
                }
                CaptureKeyResult::ToggleFacing => {
                    self.pending_camera = Some(CameraCommand::ToggleFacing);
                    EventResult::Continue
                }
                CaptureKeyResult::ReadFile(purpose, path) => {
                    self.read_picked(purpose, path);
                    EventResult::Continue
                }
                CaptureKeyResult::Submit(request) => {
                    self.submit(request);
                    EventResult::Continue
                }
                CaptureKeyResult::Download(request) => {
                    self.download(request);
                    EventResult::Continue
                }
                CaptureKeyResult::Notice(message) => {
                    self.status = Some(message);
                    EventResult::Continue
                }
            },
            CurrentScreen::History(state) => match state.handle_key(key) {
                HistoryKeyResult::Consumed => EventResult::Continue,
                HistoryKeyResult::Quit => EventResult::Exit,
                HistoryKeyResult::SwitchScreen => EventResult::SwitchScreen,
                HistoryKeyResult::Refresh => {
                    self.refresh_history();
                    EventResult::Continue
                }
                HistoryKeyResult::Download(request) => {
                    self.download(request);
                    EventResult::Continue
                }
            },
        };

        if result == EventResult::SwitchScreen {
            self.switch_screen();
            return EventResult::Continue;
        }
        result
    }

    fn handle_mouse(&mut self, action: MouseAction) -> EventResult {
        if let CurrentScreen::History(state) = &mut self.screen {
            if let HistoryKeyResult::Download(request) = state.handle_mouse(action) {
                self.download(request);
            }
        }
        EventResult::Continue
    }

    fn switch_screen(&mut self) {
        match self.screen {
            CurrentScreen::Capture(_) => self.mount_history(),
            CurrentScreen::History(_) => self.mount_capture(),
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.image_loader.cancel_all();
        self.generation += 1;
        self.generation
    }

    fn mount_capture(&mut self) {
        self.next_generation();
        info!("Showing capture screen");
        self.screen = CurrentScreen::Capture(Box::new(CaptureScreenState::new(
            self.services.camera.clone(),
            self.settings.assets_dir.clone(),
            self.settings.previews,
        )));
    }

    fn mount_history(&mut self) {
        self.next_generation();
        info!("Showing history screen");
        self.screen = CurrentScreen::History(Box::new(HistoryScreenState::new(
            self.settings.timestamp_format.clone(),
            self.settings.previews,
        )));
        self.refresh_history();
    }

    fn refresh_history(&mut self) {
        let CurrentScreen::History(state) = &mut self.screen else {
            return;
        };
        if !state.begin_fetch() {
            return;
        }

        let generation = self.generation;
        let fetch_history = self.services.fetch_history.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = fetch_history.execute().await;
            let _ = tx.send(Action::HistoryLoaded {
                generation,
                outcome,
            });
        });
    }

    fn submit(&self, request: SwapRequest) {
        let generation = self.generation;
        let submit_swap = self.services.submit_swap.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = submit_swap.execute(request).await;
            let _ = tx.send(Action::SwapFinished {
                generation,
                outcome,
            });
        });
    }

    fn read_picked(&self, purpose: PickPurpose, path: PathBuf) {
        debug!(path = %path.display(), ?purpose, "Reading picked file");
        let generation = self.generation;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = read_image_file(path).await;
            let _ = tx.send(Action::FilePicked {
                generation,
                purpose,
                outcome,
            });
        });
    }

    fn download(&mut self, request: DownloadRequest) {
        self.status = Some(StatusMessage::info(format!(
            "Downloading {}...",
            request.file_name
        )));
        let download_image = self.services.download_image.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = download_image.execute(request).await;
            let _ = tx.send(Action::Downloaded(outcome));
        });
    }

    async fn run_camera_command(&mut self, command: CameraCommand) {
        let CurrentScreen::Capture(state) = &mut self.screen else {
            return;
        };
        match command {
            CameraCommand::Start => state.start_camera().await,
            CameraCommand::ToggleFacing => state.toggle_facing().await,
        }
        if self
            .status
            .as_ref()
            .is_some_and(|s| s.text == "Starting camera...")
        {
            self.status = None;
        }
    }

    /// Starts decoding the newest camera frame. Returns true when a redraw is due.
    fn poll_camera(&mut self) -> bool {
        let CurrentScreen::Capture(state) = &mut self.screen else {
            return false;
        };
        let was_active = state.camera_active();
        let Some(frame) = state.poll_frame() else {
            return was_active != state.camera_active();
        };

        let generation = self.generation;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let frame = match decode_bytes(frame).await {
                Ok(image) => Some(Arc::new(image)),
                Err(e) => {
                    warn!(error = %e, "Dropping undecodable camera frame");
                    None
                }
            };
            let _ = tx.send(Action::CameraFrame { generation, frame });
        });
        false
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::SwapFinished {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!("Dropping swap result for an unmounted screen");
                    return;
                }
                if let CurrentScreen::Capture(state) = &mut self.screen {
                    state.finish_submit(outcome);
                }
            }
            Action::HistoryLoaded {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!("Dropping history for an unmounted screen");
                    return;
                }
                if let CurrentScreen::History(state) = &mut self.screen {
                    state.finish_fetch(outcome);
                }
            }
            Action::Downloaded(outcome) => match outcome {
                Ok(path) => {
                    self.status = Some(StatusMessage::success(format!(
                        "Saved {}",
                        path.display()
                    )));
                }
                Err(e) => {
                    error!(error = %e, "Download failed");
                    self.status = Some(StatusMessage::error(e.to_string()));
                }
            },
            Action::FilePicked {
                generation,
                purpose,
                outcome,
            } => {
                if generation != self.generation {
                    debug!("Dropping picked file for an unmounted screen");
                    return;
                }
                if let CurrentScreen::Capture(state) = &mut self.screen {
                    state.apply_picked(purpose, outcome);
                }
            }
            Action::CameraFrame { generation, frame } => {
                if generation != self.generation {
                    return;
                }
                if let CurrentScreen::Capture(state) = &mut self.screen {
                    state.apply_camera_frame(frame);
                }
            }
        }
    }
}
