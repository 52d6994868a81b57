//! History gallery state.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error};

use crate::application::dto::{DownloadRequest, OVERLAY_FILE_NAME};
use crate::domain::entities::HistoryEntry;
use crate::domain::errors::HistoryError;

/// Shared scroll switch of the gallery viewport.
///
/// Scrolling is allowed while no [`ScrollLock`] is alive.
#[derive(Debug, Clone, Default)]
pub struct ScrollGate {
    holders: Arc<AtomicUsize>,
}

impl ScrollGate {
    /// Creates an unlocked gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while at least one lock is held.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }

    /// Suspends scrolling until the returned guard is dropped.
    #[must_use]
    pub fn lock(&self) -> ScrollLock {
        self.holders.fetch_add(1, Ordering::SeqCst);
        ScrollLock {
            holders: self.holders.clone(),
        }
    }
}

/// Guard suspending gallery scrolling.
#[derive(Debug)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Full-screen preview of one result.
#[derive(Debug)]
pub struct Overlay {
    url: String,
    index: usize,
    _scroll_lock: ScrollLock,
}

impl Overlay {
    /// Returns the previewed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the gallery index it was opened from.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Fetch status of the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryStatus {
    /// Nothing requested yet.
    Idle,
    /// Request in flight.
    Loading,
    /// Last request succeeded.
    Loaded,
    /// Last request failed.
    Failed(String),
}

/// Gallery of previously generated results.
#[derive(Debug)]
pub struct HistoryGallery {
    entries: Vec<HistoryEntry>,
    status: GalleryStatus,
    selected: Option<usize>,
    overlay: Option<Overlay>,
    scroll: ScrollGate,
}

impl HistoryGallery {
    /// Creates an empty gallery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            status: GalleryStatus::Idle,
            selected: None,
            overlay: None,
            scroll: ScrollGate::new(),
        }
    }

    /// Returns entries.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Returns status.
    #[must_use]
    pub const fn status(&self) -> &GalleryStatus {
        &self.status
    }

    /// Returns selected index.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Returns the open overlay.
    #[must_use]
    pub const fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Returns the viewport scroll gate.
    #[must_use]
    pub fn scroll_gate(&self) -> ScrollGate {
        self.scroll.clone()
    }

    /// Returns true while fetching.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == GalleryStatus::Loading
    }

    /// Returns error message of the last fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            GalleryStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Returns true when the "no images found" state applies.
    #[must_use]
    pub fn is_empty_state(&self) -> bool {
        self.status == GalleryStatus::Loaded && self.entries.is_empty()
    }

    /// Marks a fetch as started. Returns false if one is already in flight.
    pub fn begin_fetch(&mut self) -> bool {
        if self.is_loading() {
            debug!("History fetch already in flight");
            return false;
        }
        self.status = GalleryStatus::Loading;
        true
    }

    /// Applies a fetch outcome.
    ///
    /// Success replaces the whole gallery; failure keeps the previous entries.
    pub fn finish_fetch(&mut self, outcome: Result<Vec<HistoryEntry>, HistoryError>) {
        match outcome {
            Ok(entries) => {
                self.overlay = None;
                self.selected = if entries.is_empty() { None } else { Some(0) };
                self.entries = entries;
                self.status = GalleryStatus::Loaded;
            }
            Err(e) => {
                self.status = GalleryStatus::Failed(e.to_string());
            }
        }
    }

    /// Moves the selection down. Ignored while scrolling is suspended.
    pub fn select_next(&mut self) {
        if self.scroll.is_locked() || self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
    }

    /// Moves the selection up. Ignored while scrolling is suspended.
    pub fn select_previous(&mut self) {
        if self.scroll.is_locked() || self.entries.is_empty() {
            return;
        }
        self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Selects an entry directly, e.g. from a mouse click.
    pub fn select(&mut self, index: usize) {
        if self.scroll.is_locked() || index >= self.entries.len() {
            return;
        }
        self.selected = Some(index);
    }

    /// Opens the overlay for `index` if it has a result.
    pub fn open_overlay(&mut self, index: usize) -> bool {
        let Some(url) = self
            .entries
            .get(index)
            .filter(|e| e.has_result())
            .and_then(|e| e.result_url.clone())
        else {
            return false;
        };

        let lock = self.scroll.lock();
        self.overlay = Some(Overlay {
            url,
            index,
            _scroll_lock: lock,
        });
        debug!(index, "Overlay opened");
        true
    }

    /// Opens the overlay for the selected entry.
    pub fn open_selected(&mut self) -> bool {
        self.selected.is_some_and(|i| self.open_overlay(i))
    }

    /// Closes the overlay, restoring scrolling.
    pub fn close_overlay(&mut self) {
        if self.overlay.take().is_some() {
            debug!("Overlay closed");
        }
    }

    /// Returns the download for entry `index`.
    ///
    /// Entries without a result yield nothing and log an error.
    #[must_use]
    pub fn download_request(&self, index: usize) -> Option<DownloadRequest> {
        let entry = self.entries.get(index)?;
        match entry.result_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => Some(DownloadRequest::new(url, entry.download_file_name(index))),
            None => {
                error!(index, "Cannot download: ResultUrl is null or empty");
                None
            }
        }
    }

    /// Returns the download for the selected entry.
    #[must_use]
    pub fn download_selected(&self) -> Option<DownloadRequest> {
        self.selected.and_then(|i| self.download_request(i))
    }

    /// Returns the download for the overlay image.
    #[must_use]
    pub fn overlay_download(&self) -> Option<DownloadRequest> {
        self.overlay
            .as_ref()
            .map(|o| DownloadRequest::new(o.url(), OVERLAY_FILE_NAME))
    }
}

impl Default for HistoryGallery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_gallery() -> HistoryGallery {
        let mut gallery = HistoryGallery::new();
        assert!(gallery.begin_fetch());
        gallery.finish_fetch(Ok(vec![
            HistoryEntry::new("2024-01-01T10:00:00Z", Some("https://x/a.jpg".to_string())),
            HistoryEntry::new("2024-01-02T10:00:00Z", None),
            HistoryEntry::new("2024-01-03T10:00:00Z", Some("https://x/c.jpg".to_string())),
        ]));
        gallery
    }

    #[test]
    fn test_fetch_gate() {
        let mut gallery = HistoryGallery::new();
        assert!(gallery.begin_fetch());
        assert!(!gallery.begin_fetch());
        gallery.finish_fetch(Ok(Vec::new()));
        assert!(gallery.is_empty_state());
        assert!(gallery.begin_fetch());
    }

    #[test]
    fn test_failure_keeps_entries() {
        let mut gallery = loaded_gallery();
        gallery.begin_fetch();
        gallery.finish_fetch(Err(HistoryError::Status { status: 500 }));

        assert_eq!(gallery.entries().len(), 3);
        assert_eq!(gallery.error(), Some("API request failed with status 500"));
        assert!(!gallery.is_empty_state());
    }

    #[test]
    fn test_overlay_locks_scrolling() {
        let mut gallery = loaded_gallery();
        let gate = gallery.scroll_gate();

        assert!(gallery.open_overlay(0));
        assert!(gate.is_locked());

        gallery.select_next();
        assert_eq!(gallery.selected(), Some(0));

        gallery.close_overlay();
        assert!(!gate.is_locked());
        gallery.select_next();
        assert_eq!(gallery.selected(), Some(1));
    }

    #[test]
    fn test_unmount_with_open_overlay_restores_scrolling() {
        let mut gallery = loaded_gallery();
        let gate = gallery.scroll_gate();
        assert!(gallery.open_overlay(2));

        drop(gallery);

        assert!(!gate.is_locked());
    }

    #[test]
    fn test_refresh_closes_overlay() {
        let mut gallery = loaded_gallery();
        let gate = gallery.scroll_gate();
        gallery.open_overlay(0);

        gallery.begin_fetch();
        gallery.finish_fetch(Ok(Vec::new()));

        assert!(gallery.overlay().is_none());
        assert!(!gate.is_locked());
    }

    #[test]
    fn test_reopening_overlay_keeps_single_lock() {
        let mut gallery = loaded_gallery();
        let gate = gallery.scroll_gate();

        gallery.open_overlay(0);
        gallery.open_overlay(2);
        assert!(gate.is_locked());
        assert_eq!(gallery.overlay().map(Overlay::index), Some(2));

        gallery.close_overlay();
        assert!(!gate.is_locked());
    }

    #[test]
    fn test_null_result_cannot_open_or_download() {
        let mut gallery = loaded_gallery();

        assert!(!gallery.open_overlay(1));
        assert!(gallery.download_request(1).is_none());
        assert!(!gallery.scroll_gate().is_locked());
    }

    #[test]
    fn test_download_names() {
        let mut gallery = loaded_gallery();

        let item = gallery.download_request(2).unwrap();
        assert_eq!(item.file_name, "faceswap-2024-01-03-2.jpg");

        gallery.open_overlay(0);
        let overlay = gallery.overlay_download().unwrap();
        assert_eq!(overlay.url, "https://x/a.jpg");
        assert_eq!(overlay.file_name, OVERLAY_FILE_NAME);
    }

    #[test]
    fn test_selection_bounds() {
        let mut gallery = loaded_gallery();
        gallery.select_previous();
        assert_eq!(gallery.selected(), Some(0));
        for _ in 0..5 {
            gallery.select_next();
        }
        assert_eq!(gallery.selected(), Some(2));
    }
}
