//! Image slots and their terminal rendering.

use std::sync::Arc;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget},
};
use ratatui_image::picker::{Capability, Picker, ProtocolType};
use ratatui_image::protocol::StatefulProtocol;
use ratatui_image::{Resize, StatefulImage};

use crate::domain::entities::{ImageId, ImageStatus, LoadedImage};
use crate::infrastructure::image::ImageLocation;

/// Placeholder label for gallery thumbnails.
pub const GALLERY_ERROR_LABEL: &str = "Image Error";
/// Placeholder label for the enlarged overlay image.
pub const OVERLAY_ERROR_LABEL: &str = "Image Load Error";
/// Placeholder label for previews and templates.
pub const PREVIEW_ERROR_LABEL: &str = "Image Error";

/// One displayable image and its loading state.
pub struct ImageSlot {
    location: Option<ImageLocation>,
    id: Option<ImageId>,
    image: Option<Arc<image::DynamicImage>>,
    protocol: Option<StatefulProtocol>,
    status: ImageStatus,
    error_label: &'static str,
}

impl ImageSlot {
    /// Creates an empty slot showing `error_label` when loading fails.
    #[must_use]
    pub const fn new(error_label: &'static str) -> Self {
        Self {
            location: None,
            id: None,
            image: None,
            protocol: None,
            status: ImageStatus::NotStarted,
            error_label,
        }
    }

    /// Creates a slot for `location`.
    #[must_use]
    pub fn with_location(location: ImageLocation, error_label: &'static str) -> Self {
        let mut slot = Self::new(error_label);
        slot.set_location(Some(location));
        slot
    }

    /// Points the slot at a new location. Same location keeps the loaded image.
    pub fn set_location(&mut self, location: Option<ImageLocation>) {
        let id = location.as_ref().map(ImageLocation::id);
        if id == self.id {
            return;
        }
        self.id = id;
        self.location = location;
        self.image = None;
        self.protocol = None;
        self.status = ImageStatus::NotStarted;
    }

    /// Empties the slot.
    pub fn clear(&mut self) {
        self.id = None;
        self.location = None;
        self.image = None;
        self.protocol = None;
        self.status = ImageStatus::NotStarted;
    }

    /// Returns the slot id.
    #[must_use]
    pub const fn id(&self) -> Option<&ImageId> {
        self.id.as_ref()
    }

    /// Returns status.
    #[must_use]
    pub const fn status(&self) -> &ImageStatus {
        &self.status
    }

    /// Returns the location to load and marks the slot as loading.
    pub fn take_pending_load(&mut self) -> Option<ImageLocation> {
        if !self.status.is_not_started() {
            return None;
        }
        let location = self.location.clone()?;
        self.status = ImageStatus::Loading;
        Some(location)
    }

    /// Applies a loader result if it belongs to this slot.
    pub fn apply(&mut self, id: &ImageId, result: &Result<LoadedImage, String>) -> bool {
        if self.id.as_ref() != Some(id) {
            return false;
        }
        match result {
            Ok(loaded) => self.set_image(loaded.image.clone()),
            Err(e) => {
                self.image = None;
                self.protocol = None;
                self.status = ImageStatus::Failed(e.clone());
            }
        }
        true
    }

    /// Shows an already decoded image, such as a camera frame.
    pub fn set_image(&mut self, image: Arc<image::DynamicImage>) {
        self.image = Some(image);
        self.protocol = None;
        self.status = ImageStatus::Ready;
    }

    /// Builds the terminal protocol for a ready image.
    pub fn update_protocol_if_needed(&mut self, picker: &Picker) {
        if self.protocol.is_some() {
            return;
        }
        if let Some(image) = &self.image {
            self.protocol = Some(picker.new_resize_protocol((**image).clone()));
        }
    }

    /// Drops the protocol to free memory for off-screen images.
    pub fn clear_protocol(&mut self) {
        self.protocol = None;
    }
}

impl std::fmt::Debug for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSlot")
            .field("id", &self.id)
            .field("has_image", &self.image.is_some())
            .field("has_protocol", &self.protocol.is_some())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Renders an [`ImageSlot`], falling back to text placeholders.
pub struct ImageView<'a> {
    block: Option<Block<'a>>,
    empty_text: &'a str,
    previews_enabled: bool,
}

impl<'a> ImageView<'a> {
    /// Creates view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block: None,
            empty_text: "",
            previews_enabled: true,
        }
    }

    /// Wraps the image in a block.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Text shown while the slot is empty.
    #[must_use]
    pub const fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    /// Disables inline rendering; a label is shown instead.
    #[must_use]
    pub const fn previews_enabled(mut self, enabled: bool) -> Self {
        self.previews_enabled = enabled;
        self
    }
}

impl Default for ImageView<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn centered_line(area: Rect, buf: &mut Buffer, line: Line<'_>) {
    let [middle] = Layout::vertical([Constraint::Length(1)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(middle, buf);
}

impl StatefulWidget for ImageView<'_> {
    type State = ImageSlot;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.is_empty() {
            return;
        }

        match &state.status {
            ImageStatus::Failed(_) => {
                let placeholder = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Plain)
                    .border_style(Style::default().fg(Color::DarkGray));
                let label_area = placeholder.inner(inner);
                placeholder.render(inner, buf);
                centered_line(
                    label_area,
                    buf,
                    Line::styled(
                        state.error_label,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                );
            }
            ImageStatus::Loading => {
                centered_line(
                    inner,
                    buf,
                    Line::styled("Loading...", Style::default().fg(Color::DarkGray)),
                );
            }
            ImageStatus::Ready if !self.previews_enabled => {
                centered_line(
                    inner,
                    buf,
                    Line::styled("[image]", Style::default().fg(Color::Gray)),
                );
            }
            ImageStatus::Ready => {
                if let Some(protocol) = state.protocol.as_mut() {
                    StatefulImage::default()
                        .resize(Resize::Fit(None))
                        .render(inner, buf, protocol);
                } else {
                    centered_line(
                        inner,
                        buf,
                        Line::styled("Rendering...", Style::default().fg(Color::DarkGray)),
                    );
                }
            }
            ImageStatus::NotStarted => {
                centered_line(
                    inner,
                    buf,
                    Line::styled(self.empty_text, Style::default().fg(Color::DarkGray)),
                );
            }
        }
    }
}

/// Owns the terminal graphics protocol picker.
pub struct ImageManager {
    picker: Picker,
}

impl ImageManager {
    /// Queries the terminal for graphics support, falling back to half blocks.
    #[must_use]
    pub fn new() -> Self {
        let mut picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::halfblocks());

        let caps = picker.capabilities();
        let has_sixel = caps.iter().any(|c| matches!(c, Capability::Sixel));
        let has_kitty = caps.iter().any(|c| matches!(c, Capability::Kitty));

        if has_sixel && !has_kitty && picker.protocol_type() == ProtocolType::Halfblocks {
            picker.set_protocol_type(ProtocolType::Sixel);
        }

        Self { picker }
    }

    /// Half-block renderer without querying the terminal.
    #[must_use]
    pub fn halfblocks() -> Self {
        Self {
            picker: Picker::halfblocks(),
        }
    }

    /// Returns protocol type.
    #[must_use]
    pub fn protocol_type(&self) -> ProtocolType {
        self.picker.protocol_type()
    }

    /// Returns picker.
    #[must_use]
    pub const fn picker(&self) -> &Picker {
        &self.picker
    }

    /// Builds protocols for every given slot.
    pub fn prepare(&self, slots: &mut [&mut ImageSlot]) {
        for slot in slots {
            slot.update_protocol_if_needed(&self.picker);
        }
    }
}

impl Default for ImageManager {
    fn default() -> Self {
        Self::halfblocks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ImageSource;
    use std::path::PathBuf;

    fn loaded(id: &ImageId) -> Result<LoadedImage, String> {
        Ok(LoadedImage {
            id: id.clone(),
            image: Arc::new(image::DynamicImage::new_rgb8(4, 4)),
            source: ImageSource::Network,
        })
    }

    fn render_text(slot: &mut ImageSlot) -> String {
        let area = Rect::new(0, 0, 30, 5);
        let mut buf = Buffer::empty(area);
        ImageView::new().empty_text("No image").render(area, &mut buf, slot);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_slot_loading_flow() {
        let mut slot = ImageSlot::with_location(
            ImageLocation::Remote("https://x/r.jpg".to_string()),
            PREVIEW_ERROR_LABEL,
        );

        assert!(slot.take_pending_load().is_some());
        assert!(slot.take_pending_load().is_none());
        assert!(slot.status().is_loading());

        let id = slot.id().cloned().unwrap();
        assert!(slot.apply(&id, &loaded(&id)));
        assert!(slot.status().is_ready());
    }

    #[test]
    fn test_slot_ignores_foreign_results() {
        let mut slot = ImageSlot::with_location(
            ImageLocation::Local(PathBuf::from("assets/AI_CBI_Male.png")),
            PREVIEW_ERROR_LABEL,
        );
        let other = ImageId::new("other");

        assert!(!slot.apply(&other, &loaded(&other)));
        assert!(slot.status().is_not_started());
    }

    #[test]
    fn test_same_location_keeps_image() {
        let location = ImageLocation::Remote("https://x/a.jpg".to_string());
        let mut slot = ImageSlot::with_location(location.clone(), GALLERY_ERROR_LABEL);
        let id = slot.id().cloned().unwrap();
        slot.apply(&id, &loaded(&id));

        slot.set_location(Some(location));
        assert!(slot.status().is_ready());

        slot.set_location(Some(ImageLocation::Remote("https://x/b.jpg".to_string())));
        assert!(slot.status().is_not_started());
    }

    #[test]
    fn test_failed_slot_renders_placeholder_label() {
        let mut slot = ImageSlot::with_location(
            ImageLocation::Remote("https://x/broken.jpg".to_string()),
            OVERLAY_ERROR_LABEL,
        );
        let id = slot.id().cloned().unwrap();
        slot.apply(&id, &Err("HTTP 404".to_string()));

        assert!(render_text(&mut slot).contains(OVERLAY_ERROR_LABEL));
    }

    #[test]
    fn test_empty_slot_renders_empty_text() {
        let mut slot = ImageSlot::new(PREVIEW_ERROR_LABEL);
        assert!(render_text(&mut slot).contains("No image"));
    }
}
