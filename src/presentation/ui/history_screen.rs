//! History gallery screen.

use std::ops::Range;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, StatefulWidget, Widget},
};
use tracing::debug;

use crate::application::dto::DownloadRequest;
use crate::application::services::HistoryGallery;
use crate::domain::entities::HistoryEntry;
use crate::domain::errors::HistoryError;
use crate::infrastructure::image::{ImageLoadedEvent, ImageLocation};
use crate::presentation::events::{EventHandler, MouseAction};
use crate::presentation::widgets::{
    GALLERY_ERROR_LABEL, ImageSlot, ImageView, OVERLAY_ERROR_LABEL, StatusMessage,
};

const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 14;

/// Shown when a successful fetch returned nothing.
pub const EMPTY_MESSAGE: &str = "No images found. Try refreshing or check back later.";

/// Outcome of an input event the app must act on.
#[derive(Debug, PartialEq, Eq)]
pub enum HistoryKeyResult {
    /// Handled locally.
    Consumed,
    /// Exit the application.
    Quit,
    /// Go to the capture screen.
    SwitchScreen,
    /// Re-run the listing fetch.
    Refresh,
    /// Save an image.
    Download(DownloadRequest),
}

/// History screen state.
pub struct HistoryScreenState {
    gallery: HistoryGallery,
    thumbs: Vec<ImageSlot>,
    overlay_image: ImageSlot,
    timestamp_format: String,
    previews: bool,
    columns: usize,
    row_offset: usize,
    visible: Range<usize>,
    card_rects: Vec<(usize, Rect)>,
    overlay_rect: Option<Rect>,
}

impl HistoryScreenState {
    /// Creates an empty screen; the caller starts the first fetch.
    #[must_use]
    pub fn new(timestamp_format: impl Into<String>, previews: bool) -> Self {
        Self {
            gallery: HistoryGallery::new(),
            thumbs: Vec::new(),
            overlay_image: ImageSlot::new(OVERLAY_ERROR_LABEL),
            timestamp_format: timestamp_format.into(),
            previews,
            columns: 1,
            row_offset: 0,
            visible: 0..0,
            card_rects: Vec::new(),
            overlay_rect: None,
        }
    }

    /// Returns the gallery.
    #[must_use]
    pub const fn gallery(&self) -> &HistoryGallery {
        &self.gallery
    }

    /// Returns the alert to show, if any.
    #[must_use]
    pub fn alert(&self) -> Option<StatusMessage> {
        self.gallery
            .error()
            .map(|e| StatusMessage::error(format!("Failed to load history: {e}")))
    }

    /// Returns key hints for the current mode.
    #[must_use]
    pub fn hints(&self) -> &'static str {
        if self.gallery.overlay().is_some() {
            "[d] Download [Esc] Close"
        } else {
            "[Enter] Open [d] Download [r] Refresh [Tab] Capture [q] Quit"
        }
    }

    /// Marks a fetch as started. Returns false while one is in flight.
    pub fn begin_fetch(&mut self) -> bool {
        self.gallery.begin_fetch()
    }

    /// Applies a fetch outcome. Success rebuilds every thumbnail.
    pub fn finish_fetch(&mut self, outcome: Result<Vec<HistoryEntry>, HistoryError>) {
        let succeeded = outcome.is_ok();
        self.gallery.finish_fetch(outcome);
        if !succeeded {
            return;
        }
        self.thumbs = self.gallery.entries().iter().map(thumb_slot).collect();
        self.overlay_image.clear();
        self.row_offset = 0;
        debug!(count = self.thumbs.len(), "Gallery rebuilt");
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> HistoryKeyResult {
        if self.gallery.overlay().is_some() {
            return match key.code {
                KeyCode::Esc => {
                    self.close_overlay();
                    HistoryKeyResult::Consumed
                }
                KeyCode::Char('d') => self
                    .gallery
                    .overlay_download()
                    .map_or(HistoryKeyResult::Consumed, HistoryKeyResult::Download),
                _ if EventHandler::is_quit_event(&key) => HistoryKeyResult::Quit,
                _ => HistoryKeyResult::Consumed,
            };
        }

        if EventHandler::is_quit_event(&key) {
            return HistoryKeyResult::Quit;
        }
        if EventHandler::is_switch_event(&key) {
            return HistoryKeyResult::SwitchScreen;
        }

        match key.code {
            KeyCode::Char('r') => HistoryKeyResult::Refresh,
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j' | 'l') => {
                self.gallery.select_next();
                self.keep_selection_visible();
                HistoryKeyResult::Consumed
            }
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k' | 'h') => {
                self.gallery.select_previous();
                self.keep_selection_visible();
                HistoryKeyResult::Consumed
            }
            KeyCode::Enter => {
                if self.gallery.open_selected() {
                    self.sync_overlay_image();
                }
                HistoryKeyResult::Consumed
            }
            KeyCode::Char('d') => self
                .gallery
                .download_selected()
                .map_or(HistoryKeyResult::Consumed, HistoryKeyResult::Download),
            _ => HistoryKeyResult::Consumed,
        }
    }

    /// Handles wheel and click input.
    pub fn handle_mouse(&mut self, action: MouseAction) -> HistoryKeyResult {
        match action {
            MouseAction::ScrollUp => self.scroll_rows(false),
            MouseAction::ScrollDown => self.scroll_rows(true),
            MouseAction::Click(position) => self.click(position),
        }
        HistoryKeyResult::Consumed
    }

    fn click(&mut self, position: Position) {
        if self.gallery.overlay().is_some() {
            if !self.overlay_rect.is_some_and(|r| r.contains(position)) {
                self.close_overlay();
            }
            return;
        }
        let hit = self
            .card_rects
            .iter()
            .find(|(_, rect)| rect.contains(position))
            .map(|(index, _)| *index);
        if let Some(index) = hit {
            self.gallery.select(index);
            if self.gallery.open_overlay(index) {
                self.sync_overlay_image();
            }
        }
    }

    fn scroll_rows(&mut self, down: bool) {
        if self.gallery.scroll_gate().is_locked() {
            return;
        }
        let total_rows = self.thumbs.len().div_ceil(self.columns.max(1));
        if down {
            if self.row_offset + 1 < total_rows {
                self.row_offset += 1;
            }
        } else {
            self.row_offset = self.row_offset.saturating_sub(1);
        }
    }

    fn keep_selection_visible(&mut self) {
        let Some(selected) = self.gallery.selected() else {
            return;
        };
        let columns = self.columns.max(1);
        let row = selected / columns;
        let visible_rows = self.visible.len().div_ceil(columns).max(1);
        if row < self.row_offset {
            self.row_offset = row;
        } else if row >= self.row_offset + visible_rows {
            self.row_offset = row + 1 - visible_rows;
        }
    }

    fn close_overlay(&mut self) {
        self.gallery.close_overlay();
        self.overlay_image.clear();
        self.overlay_rect = None;
    }

    fn sync_overlay_image(&mut self) {
        let location = self
            .gallery
            .overlay()
            .map(|o| ImageLocation::Remote(o.url().to_string()));
        self.overlay_image.set_location(location);
    }

    /// Returns image loads needed for what is on screen, marking them loading.
    pub fn pending_loads(&mut self) -> Vec<ImageLocation> {
        let end = self.visible.end.min(self.thumbs.len());
        let start = self.visible.start.min(end);
        let mut loads: Vec<ImageLocation> = self.thumbs[start..end]
            .iter_mut()
            .filter_map(ImageSlot::take_pending_load)
            .collect();
        loads.extend(self.overlay_image.take_pending_load());
        loads
    }

    /// Applies a loader result to every slot showing that image.
    pub fn apply_loaded(&mut self, event: &ImageLoadedEvent) -> bool {
        let mut applied = false;
        let slots = self
            .thumbs
            .iter_mut()
            .chain(std::iter::once(&mut self.overlay_image));
        for slot in slots {
            applied |= slot.apply(&event.id, &event.result);
        }
        applied
    }

    /// Returns the slots currently on screen, dropping protocols of the rest.
    pub fn visible_slots_mut(&mut self) -> Vec<&mut ImageSlot> {
        let visible = self.visible.clone();
        let mut slots = Vec::new();
        for (index, slot) in self.thumbs.iter_mut().enumerate() {
            if visible.contains(&index) {
                slots.push(slot);
            } else {
                slot.clear_protocol();
            }
        }
        slots.push(&mut self.overlay_image);
        slots
    }
}

fn thumb_slot(entry: &HistoryEntry) -> ImageSlot {
    match entry.result_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => ImageSlot::with_location(
            ImageLocation::Remote(url.to_string()),
            GALLERY_ERROR_LABEL,
        ),
        None => ImageSlot::new(GALLERY_ERROR_LABEL),
    }
}

fn centered(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(width_percent)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(height_percent)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// History screen widget.
pub struct HistoryScreen;

impl HistoryScreen {
    fn render_message(area: Rect, buf: &mut Buffer, text: &str, color: Color) {
        let [line] = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas(area);
        Paragraph::new(Line::styled(text.to_string(), Style::default().fg(color)))
            .alignment(Alignment::Center)
            .render(line, buf);
    }

    fn render_grid(state: &mut HistoryScreenState, area: Rect, buf: &mut Buffer) {
        let columns = usize::from((area.width / CARD_WIDTH).max(1));
        let rows = usize::from((area.height / CARD_HEIGHT).max(1));
        state.columns = columns;

        let total_rows = state.thumbs.len().div_ceil(columns);
        state.row_offset = state.row_offset.min(total_rows.saturating_sub(1));
        let start = state.row_offset * columns;
        let end = (start + rows * columns).min(state.thumbs.len());
        state.visible = start..end;
        state.card_rects.clear();

        let card_width = area.width / u16::try_from(columns).unwrap_or(1);
        let selected = state.gallery.selected();

        for index in start..end {
            let offset = index - start;
            let column = u16::try_from(offset % columns).unwrap_or(0);
            let row = u16::try_from(offset / columns).unwrap_or(0);
            let rect = Rect::new(
                area.x + column * card_width,
                area.y + row * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT,
            )
            .intersection(area);
            state.card_rects.push((index, rect));

            let Some(entry) = state.gallery.entries().get(index) else {
                continue;
            };
            let time = entry.display_time(&Local, &state.timestamp_format);
            let has_result = entry.has_result();

            let border = if selected == Some(index) {
                Color::Yellow
            } else {
                Color::DarkGray
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border))
                .title_bottom(Line::from(Span::styled(
                    format!(" {time} "),
                    Style::default().fg(Color::Gray),
                )));
            let inner = block.inner(rect);
            block.render(rect, buf);

            let empty = if has_result { "" } else { "No result" };
            ImageView::new()
                .empty_text(empty)
                .previews_enabled(state.previews)
                .render(inner, buf, &mut state.thumbs[index]);
        }
    }

    fn render_overlay(state: &mut HistoryScreenState, area: Rect, buf: &mut Buffer) {
        let popup = centered(area, 80, 85);
        state.overlay_rect = Some(popup);
        Clear.render(popup, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                " Preview ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(" [d] Download  [Esc] Close ").alignment(Alignment::Right));
        ImageView::new()
            .block(block)
            .previews_enabled(state.previews)
            .render(popup, buf, &mut state.overlay_image);
    }
}

impl StatefulWidget for HistoryScreen {
    type State = HistoryScreenState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let count = state.gallery.entries().len();
        let mut title = format!(" History ({count}) ");
        if state.gallery.is_loading() && count > 0 {
            title.push_str("refreshing... ");
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
            .title_top(Line::from(" [r] Refresh ").alignment(Alignment::Right));
        let inner = block.inner(area);
        block.render(area, buf);

        state.card_rects.clear();
        if state.gallery.is_loading() && count == 0 {
            state.visible = 0..0;
            Self::render_message(inner, buf, "Loading history...", Color::Cyan);
        } else if state.gallery.is_empty_state() {
            state.visible = 0..0;
            Self::render_message(inner, buf, EMPTY_MESSAGE, Color::DarkGray);
        } else if count == 0 {
            state.visible = 0..0;
            if let Some(error) = state.gallery.error() {
                let text = format!("Failed to load history: {error}");
                Self::render_message(inner, buf, &text, Color::Red);
            }
        } else {
            Self::render_grid(state, inner, buf);
        }

        if state.gallery.overlay().is_some() {
            Self::render_overlay(state, area, buf);
        } else {
            state.overlay_rect = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::OVERLAY_FILE_NAME;
    use crate::domain::entities::ImageId;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn entries() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry::new("2024-01-01T10:00:00Z", Some("https://x/a.jpg".to_string())),
            HistoryEntry::new("2024-01-02T10:00:00Z", None),
            HistoryEntry::new("2024-01-03T10:00:00Z", Some("https://x/c.jpg".to_string())),
        ]
    }

    fn loaded() -> HistoryScreenState {
        let mut state = HistoryScreenState::new("%Y-%m-%d %H:%M", false);
        assert!(state.begin_fetch());
        state.finish_fetch(Ok(entries()));
        state
    }

    fn render(state: &mut HistoryScreenState) -> String {
        let area = Rect::new(0, 0, 100, 40);
        let mut buf = Buffer::empty(area);
        HistoryScreen.render(area, &mut buf, state);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_empty_listing_shows_empty_state() {
        let mut state = HistoryScreenState::new("%Y-%m-%d", false);
        state.begin_fetch();
        state.finish_fetch(Ok(Vec::new()));

        assert!(render(&mut state).contains("No images found"));
        assert!(state.alert().is_none());
    }

    #[test]
    fn test_loading_indicator() {
        let mut state = HistoryScreenState::new("%Y-%m-%d", false);
        state.begin_fetch();

        assert!(render(&mut state).contains("Loading history..."));
        assert!(!state.begin_fetch());
    }

    #[test]
    fn test_only_visible_thumbnails_with_results_load() {
        let mut state = loaded();
        render(&mut state);

        let loads = state.pending_loads();

        assert_eq!(loads.len(), 2);
        assert!(state.pending_loads().is_empty());
    }

    #[test]
    fn test_overlay_open_download_and_close() {
        let mut state = loaded();
        render(&mut state);

        assert_eq!(state.handle_key(key(KeyCode::Enter)), HistoryKeyResult::Consumed);
        assert!(state.gallery().overlay().is_some());
        assert!(state.gallery().scroll_gate().is_locked());

        match state.handle_key(key(KeyCode::Char('d'))) {
            HistoryKeyResult::Download(request) => {
                assert_eq!(request.url, "https://x/a.jpg");
                assert_eq!(request.file_name, OVERLAY_FILE_NAME);
            }
            other => panic!("expected download, got {other:?}"),
        }

        state.handle_key(key(KeyCode::Esc));
        assert!(state.gallery().overlay().is_none());
        assert!(!state.gallery().scroll_gate().is_locked());
    }

    #[test]
    fn test_null_entry_cannot_open_or_download() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Down));

        state.handle_key(key(KeyCode::Enter));
        assert!(state.gallery().overlay().is_none());
        assert_eq!(
            state.handle_key(key(KeyCode::Char('d'))),
            HistoryKeyResult::Consumed
        );
    }

    #[test]
    fn test_item_download_name_uses_date_and_index() {
        let mut state = loaded();
        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Down));

        assert_eq!(
            state.handle_key(key(KeyCode::Char('d'))),
            HistoryKeyResult::Download(DownloadRequest::new(
                "https://x/c.jpg",
                "faceswap-2024-01-03-2.jpg"
            ))
        );
    }

    #[test]
    fn test_click_opens_card_and_outside_click_closes() {
        let mut state = loaded();
        render(&mut state);
        let (_, first) = state.card_rects[0];

        state.handle_mouse(MouseAction::Click(Position::new(first.x + 2, first.y + 2)));
        assert!(state.gallery().overlay().is_some());

        render(&mut state);
        state.handle_mouse(MouseAction::Click(Position::new(0, 0)));
        assert!(state.gallery().overlay().is_none());
    }

    #[test]
    fn test_wheel_ignored_while_overlay_open() {
        let mut state = HistoryScreenState::new("%Y-%m-%d", false);
        state.begin_fetch();
        let many = (0..20)
            .map(|i| {
                HistoryEntry::new(
                    format!("2024-01-{:02}T10:00:00Z", i + 1),
                    Some(format!("https://x/{i}.jpg")),
                )
            })
            .collect();
        state.finish_fetch(Ok(many));
        render(&mut state);

        state.handle_mouse(MouseAction::ScrollDown);
        assert_eq!(state.row_offset, 1);

        state.handle_key(key(KeyCode::Enter));
        state.handle_mouse(MouseAction::ScrollDown);
        assert_eq!(state.row_offset, 1);
    }

    #[test]
    fn test_unmount_with_open_overlay_releases_scroll_lock() {
        let mut state = loaded();
        let gate = state.gallery().scroll_gate();
        state.handle_key(key(KeyCode::Enter));
        assert!(gate.is_locked());

        drop(state);

        assert!(!gate.is_locked());
    }

    #[test]
    fn test_failed_images_show_placeholders() {
        let mut state = loaded();
        render(&mut state);
        state.pending_loads();
        state.apply_loaded(&ImageLoadedEvent {
            id: ImageId::from_url("https://x/a.jpg"),
            result: Err("404".to_string()),
        });
        assert!(render(&mut state).contains(GALLERY_ERROR_LABEL));

        state.handle_key(key(KeyCode::Enter));
        state.pending_loads();
        state.apply_loaded(&ImageLoadedEvent {
            id: ImageId::from_url("https://x/a.jpg"),
            result: Err("404".to_string()),
        });
        assert!(render(&mut state).contains(OVERLAY_ERROR_LABEL));
    }

    #[test]
    fn test_failed_refresh_keeps_gallery() {
        let mut state = loaded();
        state.begin_fetch();
        state.finish_fetch(Err(HistoryError::Status { status: 500 }));

        assert_eq!(state.gallery().entries().len(), 3);
        assert_eq!(state.thumbs.len(), 3);
        assert!(state.alert().is_some());
    }
}
