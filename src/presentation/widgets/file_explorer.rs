use crossterm::event::{KeyCode, KeyEvent};
use image::ImageFormat;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, StatefulWidget, Widget},
};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

/// What the explorer wants its owner to do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileExplorerAction {
    /// A file was chosen.
    SelectFile(PathBuf),
    /// The popup should close without a choice.
    Close,
    /// Nothing to do.
    None,
}

#[derive(Debug, Clone)]
struct FileEntry {
    path: PathBuf,
    is_dir: bool,
    name: String,
}

/// Returns true when the extension names an image format.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(ImageFormat::from_extension)
        .is_some()
}

/// Popup for picking a photo from disk.
pub struct FileExplorerComponent {
    title: String,
    current_dir: PathBuf,
    entries: Vec<FileEntry>,
    state: ListState,
    show_hidden: bool,
    images_only: bool,
}

impl FileExplorerComponent {
    /// Creates an explorer listing `start_dir`.
    pub fn new(title: impl Into<String>, start_dir: &Path) -> Self {
        let mut component = Self {
            title: title.into(),
            current_dir: start_dir.to_path_buf(),
            entries: Vec::new(),
            state: ListState::default(),
            show_hidden: false,
            images_only: true,
        };
        component.load_entries(start_dir);
        component
    }

    /// Opens in the user's pictures dir, or home, or `/`.
    pub fn in_pictures(title: impl Into<String>) -> Self {
        let start = directories::UserDirs::new()
            .and_then(|dirs| {
                dirs.picture_dir()
                    .map(Path::to_path_buf)
                    .or_else(|| Some(dirs.home_dir().to_path_buf()))
            })
            .unwrap_or_else(|| PathBuf::from("/"));
        Self::new(title, &start)
    }


    fn load_entries(&mut self, path: &Path) {
        let selected_name = self.selected_entry().map(|e| e.name.clone());

        self.entries.clear();

        if let Some(parent) = path.parent() {
            self.entries.push(FileEntry {
                path: parent.to_path_buf(),
                is_dir: true,
                name: "..".to_string(),
            });
        }

        if let Ok(read_dir) = fs::read_dir(path) {
            let mut entries: Vec<FileEntry> = read_dir
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    let is_dir = path.is_dir();
                    let name = path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    FileEntry { path, is_dir, name }
                })
                .filter(|entry| self.show_hidden || !entry.name.starts_with('.'))
                .filter(|entry| !self.images_only || entry.is_dir || is_image_path(&entry.path))
                .collect();

            entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.name.cmp(&b.name),
            });

            self.entries.extend(entries);
        }

        let index = selected_name
            .and_then(|name| self.entries.iter().position(|e| e.name == name))
            .or(if self.entries.is_empty() { None } else { Some(0) });
        self.state.select(index);
    }

    fn reload(&mut self) {
        let path = self.current_dir.clone();
        self.load_entries(&path);
    }

    fn enter_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
        self.state.select(None);
        self.reload();
    }

    fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.reload();
    }

    fn toggle_images_only(&mut self) {
        self.images_only = !self.images_only;
        self.reload();
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.current_dir.parent().map(PathBuf::from) {
            self.enter_dir(parent);
        }
    }

    fn activate_selected(&mut self, allow_parent: bool) -> FileExplorerAction {
        let Some(selected) = self.selected_entry().cloned() else {
            return FileExplorerAction::None;
        };
        if selected.name == ".." {
            if allow_parent {
                self.go_up();
            }
            FileExplorerAction::None
        } else if selected.is_dir {
            self.enter_dir(selected.path);
            FileExplorerAction::None
        } else {
            FileExplorerAction::SelectFile(selected.path)
        }
    }

    /// Moves the selection or opens the highlighted entry.
    pub fn handle_key(&mut self, key: KeyEvent) -> FileExplorerAction {
        match key.code {
            KeyCode::Esc => FileExplorerAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                FileExplorerAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                FileExplorerAction::None
            }
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => {
                self.go_up();
                FileExplorerAction::None
            }
            KeyCode::Right | KeyCode::Char('l') => self.activate_selected(false),
            KeyCode::Enter => self.activate_selected(true),
            KeyCode::Char('.') => {
                self.toggle_hidden();
                FileExplorerAction::None
            }
            KeyCode::Char('a') => {
                self.toggle_images_only();
                FileExplorerAction::None
            }
            _ => FileExplorerAction::None,
        }
    }

    fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) if i < self.entries.len().saturating_sub(1) => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(0) | None => self.entries.len().saturating_sub(1),
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn selected_entry(&self) -> Option<&FileEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Draws the popup over whatever is below it.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let filter = if self.images_only { "images" } else { "all files" };
        let title = format!(" {} ({filter}) ", self.title);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().add_modifier(Modifier::BOLD));

        let inner_area = block.inner(area);

        let [path_area, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner_area);

        block.render(area, buf);

        Line::styled(
            self.current_dir.display().to_string(),
            Style::default().fg(Color::DarkGray),
        )
        .render(path_area, buf);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let icon = if entry.is_dir { "  " } else { "  " };
                let color = if entry.is_dir {
                    Color::Blue
                } else if is_image_path(&entry.path) {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(format!("{icon}{}", entry.name)).style(Style::default().fg(color))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        StatefulWidget::render(list, list_area, buf, &mut self.state);

        let footer = Line::from(vec![
            Span::raw(" [Esc] Cancel | [Enter] Select | "),
            Span::raw("[a] All files | [.] Hidden "),
        ])
        .style(Style::default().fg(Color::Gray));

        Widget::render(footer, footer_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn names(explorer: &FileExplorerComponent) -> Vec<String> {
        explorer.entries.iter().map(|e| e.name.clone()).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("album")).unwrap();
        fs::write(dir.path().join("me.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join(".hidden.png"), b"x").unwrap();
        dir
    }

    #[test]
    fn test_lists_dirs_first_and_images_only() {
        let dir = fixture();
        let explorer = FileExplorerComponent::new("Source", dir.path());

        assert_eq!(names(&explorer), vec!["..", "album", "me.jpg"]);
    }

    #[test]
    fn test_toggles_reveal_other_files() {
        let dir = fixture();
        let mut explorer = FileExplorerComponent::new("Source", dir.path());

        explorer.handle_key(key(KeyCode::Char('a')));
        assert!(names(&explorer).contains(&"notes.txt".to_string()));

        explorer.handle_key(key(KeyCode::Char('.')));
        assert!(names(&explorer).contains(&".hidden.png".to_string()));
    }

    #[test]
    fn test_select_file_and_navigate() {
        let dir = fixture();
        let mut explorer = FileExplorerComponent::new("Source", dir.path());

        explorer.handle_key(key(KeyCode::Down));
        explorer.handle_key(key(KeyCode::Down));
        assert_eq!(
            explorer.handle_key(key(KeyCode::Enter)),
            FileExplorerAction::SelectFile(dir.path().join("me.jpg"))
        );

        explorer.handle_key(key(KeyCode::Up));
        explorer.handle_key(key(KeyCode::Enter));
        assert_eq!(explorer.current_dir, dir.path().join("album"));

        explorer.handle_key(key(KeyCode::Char('h')));
        assert_eq!(explorer.current_dir, dir.path());
        assert_eq!(explorer.handle_key(key(KeyCode::Esc)), FileExplorerAction::Close);
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("a.PNG")));
        assert!(is_image_path(Path::new("a.jpeg")));
        assert!(!is_image_path(Path::new("a.pdf")));
        assert!(!is_image_path(Path::new("noext")));
    }
}
