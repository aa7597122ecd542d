// src/player/playlist.rs

use crate::host::MediaKind;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    /// File path or URL handed to mpv.
    pub location: String,
    /// `None` when the item is not a recognizable audio/video source.
    pub kind: Option<MediaKind>,
}

impl PlaylistItem {
    pub fn new(location: impl Into<String>, kind_override: Option<MediaKind>) -> Self {
        let location = location.into();
        let kind = kind_override.or_else(|| MediaKind::detect(&location));
        Self { location, kind }
    }

    /// Last path segment, or the whole location for bare names.
    pub fn display_title(&self) -> String {
        let trimmed = self.location.trim_end_matches('/');
        trimmed
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(trimmed)
            .to_string()
    }
}

/// Ordered list of media given on the command line, with a cursor on the
/// item currently loaded.
#[derive(Debug, Default)]
pub struct Playlist {
    items: Vec<PlaylistItem>,
    current_index: Option<usize>,
}

impl Playlist {
    pub fn new(items: Vec<PlaylistItem>) -> Self {
        let current_index = if items.is_empty() { None } else { Some(0) };
        Self {
            items,
            current_index,
        }
    }

    pub fn current(&self) -> Option<&PlaylistItem> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    /// Advance to the next item. Returns it if there is one.
    pub fn advance(&mut self) -> Option<&PlaylistItem> {
        let i = self.current_index?;
        if i + 1 < self.items.len() {
            self.current_index = Some(i + 1);
            return self.items.get(i + 1);
        }
        None
    }

    /// Step back to the previous item.
    pub fn prev(&mut self) -> Option<&PlaylistItem> {
        let i = self.current_index?;
        if i > 0 {
            self.current_index = Some(i - 1);
            return self.items.get(i - 1);
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }
}
