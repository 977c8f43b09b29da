use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crate::library::{MediaItem, MediaKind};

fn make_item() -> MediaItem {
    MediaItem {
        path: PathBuf::from("/tmp/music/test.mp3"),
        kind: MediaKind::Song,
        title: "Test Title".to_string(),
        artist: Some("Test Artist".to_string()),
        album: Some("Test Album".to_string()),
        duration: Some(Duration::from_micros(1_234_567)),
        display: "Test Artist - Test Title".to_string(),
    }
}

fn make_handle() -> (MprisHandle, Arc<Mutex<SharedState>>, mpsc::Receiver<()>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };
    (handle, state, notify_rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state, _notify_rx) = make_handle();

    let item = make_item();
    handle.set_track_metadata(Some(7), Some(&item));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn art_url_survives_same_track_but_not_a_switch() {
    let (handle, state, _notify_rx) = make_handle();

    let item = make_item();
    handle.set_track_metadata(Some(0), Some(&item));
    handle.set_art_url(Some("file:///tmp/cache/test.jpg".to_string()));

    // Re-publishing the same track (e.g. refreshed duration) keeps the art.
    handle.set_track_metadata(Some(0), Some(&item));
    assert!(state.lock().unwrap().art_url.is_some());

    let mut other = make_item();
    other.path = PathBuf::from("/tmp/music/other.mp3");
    handle.set_track_metadata(Some(1), Some(&other));
    assert!(state.lock().unwrap().art_url.is_none());
}

#[test]
fn playback_status_maps_state_to_spec_strings() {
    let (_, state, _notify_rx) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    for (playback, expected) in [
        (PlaybackState::Idle, "Stopped"),
        (PlaybackState::Loading, "Stopped"),
        (PlaybackState::Playing, "Playing"),
        (PlaybackState::Paused, "Paused"),
    ] {
        state.lock().unwrap().playback = playback;
        assert_eq!(iface.playback_status(), expected);
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state, _notify_rx) = make_handle();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    handle.set_track_metadata(Some(1), Some(&make_item()));
    handle.set_art_url(Some("file:///tmp/cache/test.jpg".to_string()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:length",
        "mpris:artUrl",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }

    handle.set_track_metadata(None, None);
    assert!(iface.metadata().is_empty());
}

#[test]
fn set_position_updates_state_without_waking_the_emitter() {
    let (handle, state, notify_rx) = make_handle();

    handle.set_playback(PlaybackState::Playing);
    assert!(notify_rx.try_recv().is_ok());

    handle.set_position(Duration::from_secs(3));
    assert_eq!(state.lock().unwrap().position_micros, 3_000_000);
    assert!(notify_rx.try_recv().is_err());
}

#[test]
fn remote_set_position_requires_matching_track_id() {
    let (handle, state, _notify_rx) = make_handle();
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    handle.set_track_metadata(Some(2), Some(&make_item()));

    let wrong = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/9").unwrap();
    iface.set_position(wrong, 1_000_000);
    assert!(rx.try_recv().is_err());

    let right = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/2").unwrap();
    iface.set_position(right, 1_000_000);
    assert_eq!(rx.try_recv().unwrap(), ControlCmd::SeekTo(1_000_000));
}
