//! MPRIS integration: publishes now-playing metadata/status on the session
//! bus and feeds external transport commands back into the runtime.
//!
//! The D-Bus service lives on its own thread. The runtime pushes state in
//! through `MprisHandle`; a change notification wakes the service so it can
//! emit `PropertiesChanged` for desktops that listen for it.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::library::MediaItem;
use crate::player::PlaybackState;

/// Transport commands arriving from outside the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// Relative seek, microseconds (positive or negative).
    SeekBy(i64),
    /// Absolute seek, microseconds.
    SeekTo(i64),
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    position_micros: i64,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
        let _ = self.notify.send(());
    }

    /// Publish (or clear) the current track's metadata.
    pub fn set_track_metadata(&self, index: Option<usize>, item: Option<&MediaItem>) {
        if let Ok(mut s) = self.state.lock() {
            match item {
                Some(item) => {
                    let url = format!("file://{}", item.path.display());
                    if s.url.as_deref() != Some(url.as_str()) {
                        // New track: stale artwork must not linger on the
                        // lock screen while the fresh one resolves.
                        s.art_url = None;
                    }
                    s.title = Some(item.title.clone());
                    s.artist = item.artist.iter().cloned().collect();
                    s.album = item.album.clone();
                    s.url = Some(url);
                    s.length_micros = item.duration.map(|d| d.as_micros() as i64);
                    s.track_id = index.and_then(|i| {
                        ObjectPath::try_from(format!("/org/mpris/MediaPlayer2/track/{i}"))
                            .ok()
                            .map(OwnedObjectPath::from)
                    });
                }
                None => {
                    s.title = None;
                    s.artist.clear();
                    s.album = None;
                    s.url = None;
                    s.art_url = None;
                    s.length_micros = None;
                    s.track_id = None;
                }
            }
        }
        let _ = self.notify.send(());
    }

    pub fn set_art_url(&self, art_url: Option<String>) {
        if let Ok(mut s) = self.state.lock() {
            s.art_url = art_url;
        }
        let _ = self.notify.send(());
    }

    /// Update the reported position. Positions change on every poll tick, so
    /// this deliberately does not wake the `PropertiesChanged` emitter.
    pub fn set_position(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = position.as_micros() as i64;
        }
    }
}

fn status_str(playback: PlaybackState) -> &'static str {
    match playback {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        // Loading has no audible session yet.
        PlaybackState::Idle | PlaybackState::Loading => "Stopped",
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for a terminal app.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "Echo Play"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(v) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), v);
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::SeekBy(offset));
    }

    fn set_position(&self, track_id: ObjectPath<'_>, position: i64) {
        // Stale SetPosition calls name a track that is no longer current.
        let current = self
            .state
            .lock()
            .ok()
            .and_then(|s| s.track_id.clone());
        match current {
            Some(current) if current.as_str() == track_id.as_str() => {
                let _ = self.tx.send(ControlCmd::SeekTo(position.max(0)));
            }
            _ => {}
        }
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        status_str(s.playback)
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(track_id) = &s.track_id {
            let path: ObjectPath<'static> = track_id.clone().into();
            insert_value(&mut map, "mpris:trackid", Value::ObjectPath(path));
        }
        if let Some(title) = &s.title {
            insert_value(&mut map, "xesam:title", Value::from(title.clone()));
        }
        if !s.artist.is_empty() {
            insert_value(&mut map, "xesam:artist", Value::from(s.artist.clone()));
        }
        if let Some(album) = &s.album {
            insert_value(&mut map, "xesam:album", Value::from(album.clone()));
        }
        if let Some(url) = &s.url {
            insert_value(&mut map, "xesam:url", Value::from(url.clone()));
        }
        if let Some(art_url) = &s.art_url {
            insert_value(&mut map, "mpris:artUrl", Value::from(art_url.clone()));
        }
        if let Some(length) = s.length_micros {
            insert_value(&mut map, "mpris:length", Value::from(length));
        }

        map
    }
}

/// Start the MPRIS service thread. Commands from the desktop land on `tx`.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = std::sync::mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(serve(tx, state_for_thread, notify_rx));
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

async fn serve(tx: Sender<ControlCmd>, state: Arc<Mutex<SharedState>>, notify_rx: Receiver<()>) {
    let path = "/org/mpris/MediaPlayer2";

    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "MPRIS: failed to connect to session bus");
            return;
        }
    };

    if let Err(e) = connection
        .request_name("org.mpris.MediaPlayer2.echo_play")
        .await
    {
        warn!(error = %e, "MPRIS: failed to acquire name");
        return;
    }

    let object_server = connection.object_server();

    if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
        warn!(error = %e, "MPRIS: failed to register root iface");
        return;
    }

    if let Err(e) = object_server
        .at(
            path,
            PlayerIface {
                tx,
                state: state.clone(),
            },
        )
        .await
    {
        warn!(error = %e, "MPRIS: failed to register player iface");
        return;
    }

    let iface_ref = match object_server.interface::<_, PlayerIface>(path).await {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "MPRIS: failed to look up player iface");
            return;
        }
    };

    // Relay state pushes as PropertiesChanged signals.
    loop {
        Timer::after(Duration::from_millis(200)).await;

        let mut changed = false;
        loop {
            match notify_rx.try_recv() {
                Ok(()) => changed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }
        if !changed {
            continue;
        }

        let iface = iface_ref.get().await;
        let emitter = iface_ref.signal_emitter();
        if let Err(e) = iface.playback_status_changed(emitter).await {
            warn!(error = %e, "MPRIS: failed to signal status change");
        }
        if let Err(e) = iface.metadata_changed(emitter).await {
            warn!(error = %e, "MPRIS: failed to signal metadata change");
        }
    }
}

#[cfg(test)]
mod tests;
