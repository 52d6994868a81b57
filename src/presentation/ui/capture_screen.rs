//! Capture and submit screen.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget, Wrap},
};
use tracing::{debug, warn};

use crate::application::dto::DownloadRequest;
use crate::application::services::{CameraController, CapturePhase, CaptureWorkflow};
use crate::domain::entities::{SourceImage, SwapResult, TargetStyle};
use crate::domain::errors::{CameraError, SourceError, SwapError};
use crate::domain::ports::{CameraPort, SwapRequest};
use crate::infrastructure::image::ImageLocation;
use crate::presentation::events::EventHandler;
use crate::presentation::widgets::{
    FileExplorerAction, FileExplorerComponent, ImageSlot, ImageView, PREVIEW_ERROR_LABEL,
    StatusMessage,
};

/// Hint shown under the source preview.
pub const SOURCE_HINT: &str = "Supports JPG, PNG (max 5 faces)";
/// Note shown under the style list.
pub const STYLE_NOTE: &str = "*Style selection will only apply when a single face is detected";
/// Caption above a template preview.
pub const TEMPLATE_CAPTION: &str = "This is how your face will be styled";

/// What the open file picker is choosing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPurpose {
    /// The photo whose face is swapped.
    Source,
    /// A custom target photo.
    Target,
}

/// Outcome of a key press the app must act on.
#[derive(Debug)]
pub enum CaptureKeyResult {
    /// Handled locally.
    Consumed,
    /// Exit the application.
    Quit,
    /// Go to the history screen.
    SwitchScreen,
    /// Open the camera.
    StartCamera,
    /// Switch front/back camera.
    ToggleFacing,
    /// Read this picked file off the UI task, then hand it to [`CaptureScreenState::apply_picked`].
    ReadFile(PickPurpose, PathBuf),
    /// Send this request.
    Submit(SwapRequest),
    /// Save the result image.
    Download(DownloadRequest),
    /// Show a transient message.
    Notice(StatusMessage),
}

/// Capture screen state.
pub struct CaptureScreenState {
    workflow: CaptureWorkflow,
    camera: CameraController,
    explorer: Option<(PickPurpose, FileExplorerComponent)>,
    source_slot: ImageSlot,
    target_slot: ImageSlot,
    camera_slot: ImageSlot,
    result_slot: ImageSlot,
    assets_dir: PathBuf,
    previews: bool,
    decoding_frame: bool,
    last_frame: Option<Bytes>,
}

impl CaptureScreenState {
    /// Creates screen state; no camera is opened.
    #[must_use]
    pub fn new(camera: Arc<dyn CameraPort>, assets_dir: PathBuf, previews: bool) -> Self {
        Self {
            workflow: CaptureWorkflow::new(),
            camera: CameraController::new(camera),
            explorer: None,
            source_slot: ImageSlot::new(PREVIEW_ERROR_LABEL),
            target_slot: ImageSlot::new(PREVIEW_ERROR_LABEL),
            camera_slot: ImageSlot::new(PREVIEW_ERROR_LABEL),
            result_slot: ImageSlot::new(PREVIEW_ERROR_LABEL),
            assets_dir,
            previews,
            decoding_frame: false,
            last_frame: None,
        }
    }

    /// Returns the workflow.
    #[must_use]
    pub const fn workflow(&self) -> &CaptureWorkflow {
        &self.workflow
    }

    /// Returns true while the camera holds a stream.
    #[must_use]
    pub const fn camera_active(&self) -> bool {
        self.camera.is_active()
    }

    /// Returns the alert to show, if any.
    #[must_use]
    pub fn alert(&self) -> Option<StatusMessage> {
        match self.workflow.phase() {
            CapturePhase::Error(message) => Some(StatusMessage::error(message.clone())),
            CapturePhase::Submitting => Some(StatusMessage::info("Processing...")),
            _ => None,
        }
    }

    /// Returns key hints for the current mode.
    #[must_use]
    pub fn hints(&self) -> &'static str {
        if self.explorer.is_some() {
            "[Enter] Select [Esc] Cancel"
        } else if self.workflow.is_camera_active() {
            "[Space] Capture [f] Flip [Esc] Stop"
        } else if self.workflow.result().is_some() {
            "[o] Photo [c] Camera [Enter] Swap [d] Download [r] Reset [Tab] History [q] Quit"
        } else {
            "[o] Photo [c] Camera [t] Target [Enter] Swap [Tab] History [q] Quit"
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> CaptureKeyResult {
        if let Some((purpose, explorer)) = self.explorer.as_mut() {
            let purpose = *purpose;
            match explorer.handle_key(key) {
                FileExplorerAction::SelectFile(path) => {
                    self.explorer = None;
                    return CaptureKeyResult::ReadFile(purpose, path);
                }
                FileExplorerAction::Close => self.explorer = None,
                FileExplorerAction::None => {}
            }
            return CaptureKeyResult::Consumed;
        }

        if self.workflow.is_camera_active() {
            return self.handle_camera_key(key);
        }

        if EventHandler::is_quit_event(&key) {
            return CaptureKeyResult::Quit;
        }
        if EventHandler::is_switch_event(&key) {
            return CaptureKeyResult::SwitchScreen;
        }

        match key.code {
            KeyCode::Esc => {
                self.workflow.dismiss_error();
                CaptureKeyResult::Consumed
            }
            KeyCode::Char('o') => self.open_picker(PickPurpose::Source),
            KeyCode::Char('t') => self.open_picker(PickPurpose::Target),
            KeyCode::Char('c') => {
                if self.workflow.is_submitting() {
                    CaptureKeyResult::Consumed
                } else {
                    CaptureKeyResult::StartCamera
                }
            }
            KeyCode::Char('x') => {
                self.workflow.remove_custom_target();
                self.refresh_target_slot();
                CaptureKeyResult::Consumed
            }
            KeyCode::Char('u') => {
                if !self.workflow.toggle_custom_target() {
                    return CaptureKeyResult::Notice(StatusMessage::info(
                        "Upload a custom target first with [t]",
                    ));
                }
                self.refresh_target_slot();
                CaptureKeyResult::Consumed
            }
            KeyCode::Left | KeyCode::Char('[') => self.cycle_style(false),
            KeyCode::Right | KeyCode::Char(']') => self.cycle_style(true),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                self.select_style(TargetStyle::ALL[index])
            }
            KeyCode::Enter | KeyCode::Char('s') => self.submit(),
            KeyCode::Char('d') => self
                .workflow
                .result()
                .map_or(CaptureKeyResult::Consumed, |result| {
                    CaptureKeyResult::Download(DownloadRequest::for_result(&result.result_url))
                }),
            KeyCode::Char('r') => {
                self.reset();
                CaptureKeyResult::Consumed
            }
            _ => CaptureKeyResult::Consumed,
        }
    }

    fn handle_camera_key(&mut self, key: KeyEvent) -> CaptureKeyResult {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => self.capture(),
            KeyCode::Char('f') => CaptureKeyResult::ToggleFacing,
            KeyCode::Esc => {
                self.stop_camera();
                CaptureKeyResult::Consumed
            }
            _ if EventHandler::is_quit_event(&key) => CaptureKeyResult::Quit,
            _ if EventHandler::is_switch_event(&key) => CaptureKeyResult::SwitchScreen,
            _ => CaptureKeyResult::Consumed,
        }
    }

    fn open_picker(&mut self, purpose: PickPurpose) -> CaptureKeyResult {
        if self.workflow.is_submitting() {
            return CaptureKeyResult::Consumed;
        }
        let title = match purpose {
            PickPurpose::Source => "Select your photo",
            PickPurpose::Target => "Select target photo",
        };
        self.explorer = Some((purpose, FileExplorerComponent::in_pictures(title)));
        CaptureKeyResult::Consumed
    }

    /// Stores a picked file as the source or the custom target.
    ///
    /// Non-image files produce a local validation error and leave every
    /// selection, including the last result, as it was.
    pub fn apply_picked(&mut self, purpose: PickPurpose, picked: Result<SourceImage, SourceError>) {
        let image = match picked {
            Ok(image) => image,
            Err(e) => {
                self.workflow.fail(e.to_string());
                return;
            }
        };
        match purpose {
            PickPurpose::Source => {
                self.workflow.select_source(image);
                self.refresh_source_slot();
            }
            PickPurpose::Target => {
                self.workflow.set_custom_target(image);
                self.refresh_target_slot();
            }
        }
    }

    fn select_style(&mut self, style: TargetStyle) -> CaptureKeyResult {
        if !self.workflow.target().predefined_enabled() {
            return CaptureKeyResult::Notice(StatusMessage::info(
                "Predefined styles are disabled while a custom target is used",
            ));
        }
        if self.workflow.select_style(style) {
            self.refresh_target_slot();
        }
        CaptureKeyResult::Consumed
    }

    fn cycle_style(&mut self, forward: bool) -> CaptureKeyResult {
        let current = self.workflow.target().style();
        let next = if forward {
            current.next()
        } else {
            current.previous()
        };
        self.select_style(next)
    }

    fn submit(&mut self) -> CaptureKeyResult {
        match self.workflow.begin_submit() {
            Ok(Some(request)) => CaptureKeyResult::Submit(request),
            Ok(None) => CaptureKeyResult::Consumed,
            Err(e) => {
                debug!(error = %e, "Submission not sent");
                CaptureKeyResult::Consumed
            }
        }
    }

    /// Records the swap outcome.
    pub fn finish_submit(&mut self, outcome: Result<SwapResult, SwapError>) {
        if !self.workflow.finish_submit(outcome) {
            return;
        }
        let location = self
            .workflow
            .result()
            .map(|r| ImageLocation::Remote(r.result_url.clone()));
        self.result_slot.set_location(location);
    }

    /// Opens the camera at the current facing mode.
    pub async fn start_camera(&mut self) {
        if !self.workflow.enter_camera() {
            return;
        }
        self.reset_frame_state();
        if let Err(e) = self.camera.start().await {
            self.camera_failed(&e);
        }
    }

    /// Switches between front and back camera.
    pub async fn toggle_facing(&mut self) {
        if !self.workflow.is_camera_active() {
            return;
        }
        self.reset_frame_state();
        if let Err(e) = self.camera.toggle_facing().await {
            self.camera_failed(&e);
        }
    }

    fn camera_failed(&mut self, e: &CameraError) {
        self.camera.stop();
        self.workflow.leave_camera();
        self.workflow.fail(e.to_string());
    }

    fn capture(&mut self) -> CaptureKeyResult {
        match self.camera.capture() {
            Ok(still) => {
                self.workflow.leave_camera();
                self.workflow.select_source(still);
                self.reset_frame_state();
                self.refresh_source_slot();
                CaptureKeyResult::Consumed
            }
            Err(e) if e.is_transient() => {
                CaptureKeyResult::Notice(StatusMessage::info(e.to_string()))
            }
            Err(e) => {
                self.camera_failed(&e);
                self.reset_frame_state();
                CaptureKeyResult::Consumed
            }
        }
    }

    /// Stops the camera and returns to the previous selection.
    pub fn stop_camera(&mut self) {
        self.camera.stop();
        self.workflow.leave_camera();
        self.reset_frame_state();
    }

    fn reset_frame_state(&mut self) {
        self.camera_slot.clear();
        self.last_frame = None;
        self.decoding_frame = false;
    }

    /// Returns a new camera frame to decode, if one arrived since the last call.
    ///
    /// A stream that died while previewing ends camera mode with an error.
    pub fn poll_frame(&mut self) -> Option<Bytes> {
        if !self.workflow.is_camera_active() {
            return None;
        }
        if !self.camera.is_live() {
            warn!("Camera stream ended while previewing");
            self.camera_failed(&CameraError::stream_ended("the camera stopped sending frames"));
            self.reset_frame_state();
            return None;
        }
        if self.decoding_frame {
            return None;
        }
        let frame = self.camera.latest_frame()?;
        if self.last_frame.as_ref() == Some(&frame) {
            return None;
        }
        self.last_frame = Some(frame.clone());
        self.decoding_frame = true;
        Some(frame)
    }

    /// Shows a decoded camera frame.
    pub fn apply_camera_frame(&mut self, frame: Option<Arc<image::DynamicImage>>) {
        self.decoding_frame = false;
        if !self.workflow.is_camera_active() {
            return;
        }
        if let Some(frame) = frame {
            self.camera_slot.set_image(frame);
        }
    }

    /// Clears everything and returns to the initial state.
    pub fn reset(&mut self) {
        self.camera.stop();
        self.workflow.reset();
        self.explorer = None;
        self.reset_frame_state();
        self.source_slot.clear();
        self.target_slot.clear();
        self.result_slot.clear();
    }

    fn refresh_source_slot(&mut self) {
        let location = self
            .workflow
            .source()
            .map(|s| ImageLocation::Memory(s.bytes().clone()));
        self.source_slot.set_location(location);
    }

    fn refresh_target_slot(&mut self) {
        let target = self.workflow.target();
        let location = if target.uses_custom() {
            target
                .custom()
                .map(|c| ImageLocation::Memory(c.bytes().clone()))
        } else {
            target
                .template_preview()
                .map(|asset| ImageLocation::Local(self.assets_dir.join(asset)))
        };
        self.target_slot.set_location(location);
    }

    /// Returns mutable access to every image slot.
    pub fn slots_mut(&mut self) -> [&mut ImageSlot; 4] {
        [
            &mut self.source_slot,
            &mut self.target_slot,
            &mut self.camera_slot,
            &mut self.result_slot,
        ]
    }
}

/// Reads and validates a picked file.
///
/// # Errors
/// Returns `SourceError` when the file cannot be read or is not an image.
pub async fn read_image_file(path: PathBuf) -> Result<SourceImage, SourceError> {
    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| SourceError::unreadable(&file_name, e.to_string()))?;
    SourceImage::from_file(&path, bytes)
}

/// Capture screen widget.
pub struct CaptureScreen;

impl CaptureScreen {
    fn panel(title: &str, focused: bool) -> Block<'_> {
        let color = if focused { Color::Yellow } else { Color::DarkGray };
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {title} "),
                Style::default().add_modifier(Modifier::BOLD),
            ))
    }

    fn render_source(state: &mut CaptureScreenState, area: Rect, buf: &mut Buffer) {
        let camera = state.workflow.is_camera_active();
        let title = if camera {
            format!("Camera ({})", state.camera.facing())
        } else {
            "Your Photo".to_string()
        };
        let block = Self::panel(&title, camera || state.workflow.source().is_none());
        let inner = block.inner(area);
        block.render(area, buf);

        let [image_area, info_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).areas(inner);

        let info = if camera {
            vec![
                Line::from(format!("[f] {}", state.camera.facing().switch_label())),
                Line::from("[Space] Capture  [Esc] Cancel"),
            ]
        } else {
            let name = state
                .workflow
                .source()
                .map_or_else(|| "No photo selected".to_string(), |s| s.file_name().to_string());
            vec![
                Line::from(name),
                Line::styled(SOURCE_HINT, Style::default().fg(Color::DarkGray)),
            ]
        };
        Paragraph::new(info).render(info_area, buf);

        let slot = if camera {
            &mut state.camera_slot
        } else {
            &mut state.source_slot
        };
        let empty = if camera {
            "Starting camera..."
        } else {
            "[o] Upload photo  [c] Use camera"
        };
        ImageView::new()
            .empty_text(empty)
            .previews_enabled(state.previews)
            .render(image_area, buf, slot);
    }

    fn render_target(state: &mut CaptureScreenState, area: Rect, buf: &mut Buffer) {
        let block = Self::panel("Target", false);
        let inner = block.inner(area);
        block.render(area, buf);

        let target = state.workflow.target();
        let enabled = target.predefined_enabled();
        let rows = TargetStyle::ALL.len() as u16 + 3;
        let [list_area, image_area] =
            Layout::vertical([Constraint::Length(rows), Constraint::Min(3)]).areas(inner);

        let mut lines: Vec<Line> = TargetStyle::ALL
            .iter()
            .enumerate()
            .map(|(i, style)| {
                let selected = *style == target.style();
                let marker = if selected { "(*)" } else { "( )" };
                let mut text_style = Style::default();
                if !enabled {
                    text_style = text_style.fg(Color::DarkGray);
                } else if selected {
                    text_style = text_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                }
                Line::styled(format!("{} {marker} {}", i + 1, style.label()), text_style)
            })
            .collect();

        let custom = match target.custom() {
            Some(image) => format!(
                "[u] Custom target: {} ({})",
                if target.uses_custom() { "on" } else { "off" },
                image.file_name()
            ),
            None => "[t] Upload custom target".to_string(),
        };
        lines.push(Line::styled(STYLE_NOTE, Style::default().fg(Color::DarkGray)));
        lines.push(Line::from(""));
        lines.push(Line::styled(custom, Style::default().fg(Color::Cyan)));
        Paragraph::new(lines).render(list_area, buf);

        let template_shown = !target.uses_custom() && target.style() != TargetStyle::Default;
        let empty = if target.uses_custom() || template_shown {
            ""
        } else {
            "No template"
        };
        let image_area = if template_shown {
            let [caption_area, rest] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(2)]).areas(image_area);
            Paragraph::new(Line::styled(
                TEMPLATE_CAPTION,
                Style::default().fg(Color::DarkGray),
            ))
            .render(caption_area, buf);
            rest
        } else {
            image_area
        };
        ImageView::new()
            .empty_text(empty)
            .previews_enabled(state.previews)
            .render(image_area, buf, &mut state.target_slot);
    }

    fn render_result(state: &mut CaptureScreenState, area: Rect, buf: &mut Buffer) {
        let block = Self::panel("Result", state.workflow.result().is_some());
        let inner = block.inner(area);
        block.render(area, buf);

        let [info_area, image_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(inner);

        let info: Vec<Line> = match (state.workflow.phase(), state.workflow.result()) {
            (CapturePhase::Submitting, _) => vec![Line::styled(
                "Processing...",
                Style::default().fg(Color::Cyan),
            )],
            (_, Some(result)) => {
                let mut lines = vec![Line::styled(
                    result.faces_label(),
                    Style::default().fg(Color::Green),
                )];
                if let Some(label) = result.target_label() {
                    lines.push(Line::from(label));
                }
                if !result.message.is_empty() {
                    lines.push(Line::styled(
                        result.message.clone(),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                lines
            }
            _ => vec![Line::styled(
                "Press [Enter] to swap",
                Style::default().fg(Color::DarkGray),
            )],
        };
        Paragraph::new(info)
            .wrap(Wrap { trim: true })
            .render(info_area, buf);

        ImageView::new()
            .previews_enabled(state.previews)
            .render(image_area, buf, &mut state.result_slot);
    }
}

impl StatefulWidget for CaptureScreen {
    type State = CaptureScreenState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [source_area, target_area, result_area] = Layout::horizontal([
            Constraint::Percentage(36),
            Constraint::Percentage(28),
            Constraint::Percentage(36),
        ])
        .areas(area);

        Self::render_source(state, source_area, buf);
        Self::render_target(state, target_area, buf);
        Self::render_result(state, result_area, buf);

        if let Some((_, explorer)) = state.explorer.as_mut() {
            let [popup] = Layout::horizontal([Constraint::Percentage(60)])
                .flex(Flex::Center)
                .areas(area);
            let [popup] = Layout::vertical([Constraint::Percentage(70)])
                .flex(Flex::Center)
                .areas(popup);
            explorer.render(popup, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockCameraPort;
    use crate::domain::ports::{TARGET_IMAGE_FIELD, TARGET_TYPE_FIELD};
    use crossterm::event::KeyModifiers;
    use std::io::Cursor;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn jpeg_frame() -> Bytes {
        let mut out = Vec::new();
        image::DynamicImage::new_rgb8(8, 8)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)
            .unwrap();
        Bytes::from(out)
    }

    fn screen(camera: Arc<MockCameraPort>) -> CaptureScreenState {
        CaptureScreenState::new(camera, PathBuf::from("assets"), true)
    }

    fn photo(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, jpeg_frame()).unwrap();
        path
    }

    async fn pick(state: &mut CaptureScreenState, purpose: PickPurpose, path: PathBuf) {
        state.apply_picked(purpose, read_image_file(path).await);
    }

    fn swap_result(url: &str) -> SwapResult {
        SwapResult {
            result_url: url.to_string(),
            face_count: 2,
            target_used: None,
            message: "ok".to_string(),
        }
    }

    #[test]
    fn test_submit_without_source_sends_nothing() {
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));

        let result = state.handle_key(key(KeyCode::Enter));

        assert!(matches!(result, CaptureKeyResult::Consumed));
        assert_eq!(
            state.alert().map(|m| m.text),
            Some("Please select an image first".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_image_file_is_rejected_locally() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));

        pick(&mut state, PickPurpose::Source, path).await;

        assert!(state.workflow().source().is_none());
        assert_eq!(
            state.alert().map(|m| m.text),
            Some("Please upload a valid image file (JPG, PNG)".to_string())
        );
    }

    #[tokio::test]
    async fn test_custom_target_supersedes_style() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        pick(&mut state, PickPurpose::Source, photo(&dir, "me.jpg")).await;

        state.handle_key(key(KeyCode::Char('2')));
        pick(&mut state, PickPurpose::Target, photo(&dir, "target.jpg")).await;
        let ignored = state.handle_key(key(KeyCode::Char('3')));

        assert!(matches!(ignored, CaptureKeyResult::Notice(_)));
        match state.handle_key(key(KeyCode::Enter)) {
            CaptureKeyResult::Submit(request) => {
                let fields = request.field_names();
                assert!(fields.contains(&TARGET_IMAGE_FIELD));
                assert!(!fields.contains(&TARGET_TYPE_FIELD));
            }
            other => panic!("expected submit, got {other:?}"),
        }

        assert!(matches!(
            state.handle_key(key(KeyCode::Enter)),
            CaptureKeyResult::Consumed
        ));
    }

    #[tokio::test]
    async fn test_default_style_sends_no_target_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        pick(&mut state, PickPurpose::Source, photo(&dir, "me.jpg")).await;

        match state.handle_key(key(KeyCode::Char('s'))) {
            CaptureKeyResult::Submit(request) => {
                assert_eq!(request.field_names(), vec!["source_image"]);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_camera_twice_keeps_one_stream() {
        let camera = Arc::new(MockCameraPort::with_frame(Some(jpeg_frame())));
        let mut state = screen(camera.clone());

        state.start_camera().await;
        state.start_camera().await;

        assert_eq!(camera.live_streams(), 1);
        assert!(state.workflow().is_camera_active());
    }

    #[tokio::test]
    async fn test_capture_releases_camera_and_selects_source() {
        let camera = Arc::new(MockCameraPort::with_frame(Some(jpeg_frame())));
        let mut state = screen(camera.clone());
        state.start_camera().await;

        assert!(state.poll_frame().is_some());
        assert!(state.poll_frame().is_none());

        state.handle_key(key(KeyCode::Char(' ')));

        assert_eq!(camera.live_streams(), 0);
        assert_eq!(
            state.workflow().source().map(SourceImage::file_name),
            Some("camera-capture.jpg")
        );
        assert_eq!(state.workflow().phase(), &CapturePhase::Previewing);
    }

    #[tokio::test]
    async fn test_denied_camera_shows_error_and_leaves_camera_mode() {
        let camera = Arc::new(MockCameraPort::denied());
        let mut state = screen(camera.clone());

        state.start_camera().await;

        assert!(!state.workflow().is_camera_active());
        assert!(state.alert().is_some());
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_unmount_releases_camera() {
        let camera = Arc::new(MockCameraPort::with_frame(Some(jpeg_frame())));
        let mut state = screen(camera.clone());
        state.start_camera().await;

        drop(state);

        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_escape_stops_camera() {
        let camera = Arc::new(MockCameraPort::with_frame(Some(jpeg_frame())));
        let mut state = screen(camera.clone());
        state.start_camera().await;

        state.handle_key(key(KeyCode::Esc));

        assert_eq!(camera.live_streams(), 0);
        assert_eq!(state.workflow().phase(), &CapturePhase::Idle);
    }

    #[tokio::test]
    async fn test_result_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        pick(&mut state, PickPurpose::Source, photo(&dir, "me.jpg")).await;
        let CaptureKeyResult::Submit(_) = state.handle_key(key(KeyCode::Enter)) else {
            panic!("expected submit");
        };

        state.finish_submit(Ok(swap_result("https://x/r.jpg")));

        match state.handle_key(key(KeyCode::Char('d'))) {
            CaptureKeyResult::Download(request) => {
                assert_eq!(request.url, "https://x/r.jpg");
                assert_eq!(request.file_name, "face-swap-result.jpg");
            }
            other => panic!("expected download, got {other:?}"),
        }

        state.handle_key(key(KeyCode::Char('r')));
        assert_eq!(state.workflow().phase(), &CapturePhase::Idle);
        assert!(state.workflow().source().is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        pick(&mut state, PickPurpose::Source, photo(&dir, "me.jpg")).await;
        state.handle_key(key(KeyCode::Enter));

        state.finish_submit(Err(SwapError::from_status(
            422,
            Some("too many faces".to_string()),
        )));

        assert_eq!(state.alert().map(|m| m.text), Some("too many faces".to_string()));
        assert!(state.workflow().source().is_some());
    }

    #[tokio::test]
    async fn test_result_survives_errors_and_new_picks() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        pick(&mut state, PickPurpose::Source, photo(&dir, "me.jpg")).await;
        state.handle_key(key(KeyCode::Enter));
        state.finish_submit(Ok(swap_result("https://x/first.jpg")));
        let shown = state.result_slot.id().cloned();

        state.handle_key(key(KeyCode::Enter));
        state.finish_submit(Err(SwapError::network("boom")));
        pick(&mut state, PickPurpose::Source, notes).await;
        state.handle_key(key(KeyCode::Esc));
        pick(&mut state, PickPurpose::Source, photo(&dir, "other.jpg")).await;

        assert_eq!(
            state.workflow().result().map(|r| r.result_url.as_str()),
            Some("https://x/first.jpg")
        );
        assert!(shown.is_some());
        assert_eq!(state.result_slot.id().cloned(), shown);
        match state.handle_key(key(KeyCode::Char('d'))) {
            CaptureKeyResult::Download(request) => assert_eq!(request.url, "https://x/first.jpg"),
            other => panic!("expected download, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_pick_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));

        pick(&mut state, PickPurpose::Source, dir.path().join("missing.jpg")).await;

        assert!(state.workflow().source().is_none());
        assert!(
            state
                .alert()
                .is_some_and(|m| m.text.starts_with("failed to read missing.jpg"))
        );
    }

    #[test]
    fn test_target_panel_shows_style_note_and_template_caption() {
        let mut state = screen(Arc::new(MockCameraPort::with_frame(None)));
        state.handle_key(key(KeyCode::Char('2')));
        let area = Rect::new(0, 0, 200, 30);
        let mut buf = Buffer::empty(area);

        CaptureScreen.render(area, &mut buf, &mut state);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("*Style selection will only apply"));
        assert!(text.contains(TEMPLATE_CAPTION));
    }
}
