//! Status bar widget: alert region plus key hints.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Status bar severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    /// Informational.
    Info,
    /// Success.
    Success,
    /// Error.
    Error,
}

impl StatusLevel {
    /// Returns color for level.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Info => Color::Cyan,
            Self::Success => Color::Green,
            Self::Error => Color::Red,
        }
    }
}

/// One-line message shown at the bottom of every screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Text.
    pub text: String,
    /// Severity.
    pub level: StatusLevel,
}

impl StatusMessage {
    /// Creates info message.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
        }
    }

    /// Creates success message.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Success,
        }
    }

    /// Creates error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
        }
    }
}

/// Status bar widget.
#[derive(Debug, Clone, Default)]
pub struct StatusBar<'a> {
    message: Option<&'a StatusMessage>,
    hints: &'a str,
}

impl<'a> StatusBar<'a> {
    /// Creates status bar with key hints on the right.
    #[must_use]
    pub const fn new(hints: &'a str) -> Self {
        Self {
            message: None,
            hints,
        }
    }

    /// Sets the message on the left.
    #[must_use]
    pub const fn message(mut self, message: Option<&'a StatusMessage>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width as usize;
        let hints_width = self.hints.width();

        let mut spans = Vec::new();
        let mut used = 0;

        if let Some(message) = self.message {
            let style = Style::default()
                .fg(message.level.color())
                .add_modifier(Modifier::BOLD);
            used = message.text.width();
            spans.push(Span::styled(message.text.as_str(), style));
        }

        if used + 1 + hints_width <= width {
            let padding = width - used - hints_width;
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(self.hints, Style::default().fg(Color::DarkGray)));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(bar: StatusBar<'_>, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_message_and_hints() {
        let message = StatusMessage::error("too many faces");
        let line = render(StatusBar::new("[q] Quit").message(Some(&message)), 40);

        assert!(line.starts_with("too many faces"));
        assert!(line.trim_end().ends_with("[q] Quit"));
    }

    #[test]
    fn test_hints_dropped_when_narrow() {
        let message = StatusMessage::info("Loading history...");
        let line = render(StatusBar::new("[r] Refresh [q] Quit").message(Some(&message)), 24);

        assert!(line.starts_with("Loading history..."));
        assert!(!line.contains("Refresh"));
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(StatusMessage::success("saved").level.color(), Color::Green);
        assert_eq!(StatusMessage::error("x").level.color(), Color::Red);
    }
}
