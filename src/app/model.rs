//! Application model: the library view, selection and playback mirror.
//!
//! The `App` struct holds the listed media items, the favorite set, the
//! current view (songs or videos, optionally favorites-only) and the
//! runtime's picture of what is playing. The playlist position lives here,
//! not in the playback engine.

use crate::favorites::FavoriteSet;
use crate::library::{MediaItem, MediaKind};
use crate::player::PlaybackState;

/// The main application model.
pub struct App {
    pub items: Vec<MediaItem>,
    pub favorites: FavoriteSet,
    pub selected: usize,

    /// Which folder is being browsed.
    pub view_kind: MediaKind,
    /// Restrict the view to favorited items.
    pub favorites_only: bool,

    /// Mirror of the player's last reported state.
    pub playback: PlaybackState,
    /// Library index of the item the runtime last started, if any.
    pub playing: Option<usize>,
}

impl App {
    /// Create a new `App` over `items` with the provided favorite set.
    pub fn new(items: Vec<MediaItem>, favorites: FavoriteSet) -> Self {
        Self {
            items,
            favorites,
            selected: 0,
            view_kind: MediaKind::Song,
            favorites_only: false,
            playback: PlaybackState::Idle,
            playing: None,
        }
    }

    /// Indices of the items visible in the current view, in list order.
    pub fn display_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.kind == self.view_kind)
            .filter(|(_, item)| !self.favorites_only || self.favorites.is_favorite(&item.path))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_visible(&self) -> bool {
        !self.display_indices().is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// The item the playlist currently points at, only while a session is
    /// (or is about to be) live.
    pub fn now_playing(&self) -> Option<usize> {
        if self.playback.is_active() {
            self.playing
        } else {
            None
        }
    }

    /// Replace the listed items, keeping selection inside the view and
    /// re-resolving the playing item by path.
    pub fn set_items(&mut self, items: Vec<MediaItem>) {
        let playing_path = self
            .playing
            .and_then(|i| self.items.get(i))
            .map(|item| item.path.clone());
        self.items = items;
        self.playing =
            playing_path.and_then(|p| self.items.iter().position(|item| item.path == p));
        self.ensure_selected_visible();
    }

    /// Set the selected library index and ensure it is visible.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move selection to the next visible item, wrapping around.
    pub fn select_next(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        let pos = display.iter().position(|&i| i == self.selected);
        self.selected = match pos {
            Some(p) => display[(p + 1) % display.len()],
            None => display[0],
        };
    }

    /// Move selection to the previous visible item, wrapping around.
    pub fn select_prev(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            return;
        }
        let pos = display.iter().position(|&i| i == self.selected);
        self.selected = match pos {
            Some(0) | None => display[display.len() - 1],
            Some(p) => display[p - 1],
        };
    }

    /// Next visible item after `current` in list order, without wrapping.
    /// This is the playlist-advance rule: the last item has no successor.
    pub fn next_after(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        let pos = display.iter().position(|&i| i == current)?;
        display.get(pos + 1).copied()
    }

    /// Previous visible item before `current`, without wrapping.
    pub fn prev_before(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        let pos = display.iter().position(|&i| i == current)?;
        pos.checked_sub(1).map(|p| display[p])
    }

    /// Flip favorite state of the selected item; returns the new state.
    pub fn toggle_favorite_selected(&mut self) -> Option<bool> {
        let path = self.items.get(self.selected)?.path.clone();
        let state = self.favorites.toggle(&path);
        // In favorites-only view an unfavorited item vanishes.
        if self.favorites_only {
            self.ensure_selected_visible();
        }
        Some(state)
    }

    pub fn toggle_favorites_only(&mut self) {
        self.favorites_only = !self.favorites_only;
        self.ensure_selected_visible();
    }

    /// Switch between the Songs and Video folders.
    pub fn toggle_view_kind(&mut self) {
        self.view_kind = match self.view_kind {
            MediaKind::Song => MediaKind::Video,
            MediaKind::Video => MediaKind::Song,
        };
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current view, otherwise move
    /// selection to the first visible item.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }
        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }
}
