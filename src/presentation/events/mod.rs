//! Event handling.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

/// Result of event handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// Continue processing.
    Continue,
    /// Exit application.
    Exit,
    /// Switch to the other screen.
    SwitchScreen,
}

/// Mouse input the screens react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    /// Wheel up.
    ScrollUp,
    /// Wheel down.
    ScrollDown,
    /// Left button pressed at a cell.
    Click(Position),
}

/// Terminal event classification.
pub struct EventHandler;

impl EventHandler {
    /// Returns true for presses and repeats; releases are ignored.
    #[must_use]
    pub fn is_actionable(key: &KeyEvent) -> bool {
        key.kind != KeyEventKind::Release
    }

    /// Checks if key is a quit event.
    #[must_use]
    pub fn is_quit_event(key: &KeyEvent) -> bool {
        matches!(
            key,
            KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::NONE,
                ..
            } | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
        )
    }

    /// Checks for Ctrl-C, which quits even from inside dialogs.
    #[must_use]
    pub fn is_force_quit(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::CONTROL) && Self::is_quit_event(key)
    }

    /// Checks if key switches between the capture and history screens.
    #[must_use]
    pub fn is_switch_event(key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Tab | KeyCode::BackTab)
    }

    /// Maps a mouse event to the actions the screens handle.
    #[must_use]
    pub fn mouse_action(event: &MouseEvent) -> Option<MouseAction> {
        match event.kind {
            MouseEventKind::ScrollUp => Some(MouseAction::ScrollUp),
            MouseEventKind::ScrollDown => Some(MouseAction::ScrollDown),
            MouseEventKind::Down(MouseButton::Left) => {
                Some(MouseAction::Click(Position::new(event.column, event.row)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn make_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test_case(KeyCode::Char('q'), KeyModifiers::NONE, true ; "q quits")]
    #[test_case(KeyCode::Char('c'), KeyModifiers::CONTROL, true ; "ctrl c quits")]
    #[test_case(KeyCode::Esc, KeyModifiers::NONE, false ; "esc closes things instead")]
    #[test_case(KeyCode::Char('a'), KeyModifiers::NONE, false ; "plain letter")]
    fn test_quit_events(code: KeyCode, modifiers: KeyModifiers, expected: bool) {
        assert_eq!(
            EventHandler::is_quit_event(&make_key_event(code, modifiers)),
            expected
        );
    }

    #[test_case(KeyCode::Tab, true ; "tab")]
    #[test_case(KeyCode::BackTab, true ; "back tab")]
    #[test_case(KeyCode::Enter, false ; "enter")]
    fn test_switch_events(code: KeyCode, expected: bool) {
        assert_eq!(
            EventHandler::is_switch_event(&make_key_event(code, KeyModifiers::NONE)),
            expected
        );
    }

    #[test]
    fn test_force_quit() {
        assert!(EventHandler::is_force_quit(&make_key_event(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!EventHandler::is_force_quit(&make_key_event(
            KeyCode::Char('q'),
            KeyModifiers::NONE
        )));
    }

    #[test]
    fn test_release_is_not_actionable() {
        let release =
            KeyEvent::new_with_kind(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
        assert!(!EventHandler::is_actionable(&release));
    }

    #[test]
    fn test_mouse_actions() {
        assert_eq!(
            EventHandler::mouse_action(&mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(MouseAction::Click(Position::new(7, 3)))
        );
        assert_eq!(
            EventHandler::mouse_action(&mouse(MouseEventKind::ScrollDown)),
            Some(MouseAction::ScrollDown)
        );
        assert_eq!(
            EventHandler::mouse_action(&mouse(MouseEventKind::Moved)),
            None
        );
    }
}
