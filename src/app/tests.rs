use std::path::PathBuf;

use super::*;
use crate::favorites::FavoriteSet;
use crate::library::{MediaItem, MediaKind};
use crate::player::PlaybackState;

fn item(name: &str, kind: MediaKind) -> MediaItem {
    MediaItem {
        path: PathBuf::from(format!("/media/{name}")),
        kind,
        title: name.to_string(),
        artist: None,
        album: None,
        duration: None,
        display: name.to_string(),
    }
}

fn app() -> App {
    App::new(
        vec![
            item("a.mp3", MediaKind::Song),
            item("b.mp3", MediaKind::Song),
            item("c.mp4", MediaKind::Video),
            item("d.mp3", MediaKind::Song),
        ],
        FavoriteSet::new(),
    )
}

#[test]
fn display_indices_filter_by_view_kind() {
    let mut app = app();
    assert_eq!(app.display_indices(), vec![0, 1, 3]);

    app.toggle_view_kind();
    assert_eq!(app.display_indices(), vec![2]);
    // Selection snapped into the new view.
    assert_eq!(app.selected, 2);

    app.toggle_view_kind();
    assert_eq!(app.display_indices(), vec![0, 1, 3]);
}

#[test]
fn favorites_only_view_narrows_and_empties() {
    let mut app = app();
    app.favorites.toggle(&PathBuf::from("/media/b.mp3"));

    app.toggle_favorites_only();
    assert_eq!(app.display_indices(), vec![1]);
    assert_eq!(app.selected, 1);

    // Unfavoriting the selected item empties the view.
    app.toggle_favorite_selected();
    assert!(!app.has_visible());

    app.toggle_favorites_only();
    assert!(app.has_visible());
}

#[test]
fn selection_wraps_in_both_directions() {
    let mut app = app();
    assert_eq!(app.selected, 0);

    app.select_next();
    assert_eq!(app.selected, 1);
    app.select_next();
    assert_eq!(app.selected, 3);
    app.select_next();
    assert_eq!(app.selected, 0);

    app.select_prev();
    assert_eq!(app.selected, 3);
}

#[test]
fn playlist_advance_does_not_wrap() {
    let app = app();
    assert_eq!(app.next_after(0), Some(1));
    assert_eq!(app.next_after(1), Some(3));
    assert_eq!(app.next_after(3), None);

    assert_eq!(app.prev_before(3), Some(1));
    assert_eq!(app.prev_before(0), None);
    // Items outside the current view have no neighbors.
    assert_eq!(app.next_after(2), None);
}

#[test]
fn toggle_favorite_selected_is_its_own_inverse() {
    let mut app = app();
    app.set_selected(1);

    assert_eq!(app.toggle_favorite_selected(), Some(true));
    assert!(app.favorites.is_favorite(&PathBuf::from("/media/b.mp3")));
    assert_eq!(app.toggle_favorite_selected(), Some(false));
    assert!(!app.favorites.is_favorite(&PathBuf::from("/media/b.mp3")));
}

#[test]
fn now_playing_is_masked_while_idle() {
    let mut app = app();
    app.playing = Some(1);

    app.playback = PlaybackState::Idle;
    assert_eq!(app.now_playing(), None);

    app.playback = PlaybackState::Playing;
    assert_eq!(app.now_playing(), Some(1));

    app.playback = PlaybackState::Paused;
    assert_eq!(app.now_playing(), Some(1));
}

#[test]
fn set_items_remaps_playing_by_path() {
    let mut app = app();
    app.set_selected(3);
    app.playing = Some(3);

    // The playing file survives the rescan at a new position.
    app.set_items(vec![
        item("z.mp3", MediaKind::Song),
        item("d.mp3", MediaKind::Song),
    ]);
    assert_eq!(app.playing, Some(1));

    // A rescan that drops the playing file clears it.
    app.set_items(vec![item("z.mp3", MediaKind::Song)]);
    assert_eq!(app.playing, None);
    assert_eq!(app.selected, 0);
}
