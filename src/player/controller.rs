use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::PlayerSettings;
use crate::library::MediaItem;

use super::thread::spawn_player_thread;
use super::types::{PlaybackHandle, PlaybackInfo, PlaybackState, PlayerCmd, PlayerEvent};

/// Single authority over "what is currently playing".
///
/// Owns the player thread and, through it, at most one live session. All
/// operations are fire-and-forget commands; queries read the shared snapshot
/// the thread maintains. Constructed explicitly and passed by reference to
/// whatever needs it.
pub struct PlaybackController {
    tx: Sender<PlayerCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackController {
    /// Spawn the player thread. The returned receiver is the single consumer
    /// of playback events (state changes, progress ticks, completion).
    pub fn new(settings: PlayerSettings) -> (Self, Receiver<PlayerEvent>) {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let (event_tx, event_rx) = mpsc::channel::<PlayerEvent>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_player_thread(rx, playback.clone(), event_tx, settings);

        (
            Self {
                tx,
                playback,
                join: Mutex::new(Some(join)),
            },
            event_rx,
        )
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    fn send(&self, cmd: PlayerCmd) {
        // A dead player thread means we are shutting down; nothing to do.
        let _ = self.tx.send(cmd);
    }

    /// Tear down any current session and start playing `item`.
    ///
    /// Failures (unreadable file, no output device) are logged by the player
    /// thread; afterwards no session exists and `is_playing` reports false.
    pub fn load_and_play(&self, item: MediaItem) {
        self.send(PlayerCmd::Load(item));
    }

    /// Resume the current session. No-op without one.
    pub fn play(&self) {
        self.send(PlayerCmd::Play);
    }

    /// Suspend the current session. No-op without one.
    pub fn pause(&self) {
        self.send(PlayerCmd::Pause);
    }

    /// Release the current session. Idempotent.
    pub fn stop(&self) {
        self.send(PlayerCmd::Stop);
    }

    /// Absolute seek, clamped to the known duration.
    pub fn seek_to(&self, position: Duration) {
        self.send(PlayerCmd::SeekTo(position));
    }

    pub fn set_muted(&self, muted: bool) {
        self.send(PlayerCmd::SetMuted(muted));
    }

    pub fn toggle_mute(&self) {
        self.send(PlayerCmd::SetMuted(!self.is_muted()));
    }

    /// External audio interruption: stop unconditionally, no resume policy.
    pub fn interrupt(&self) {
        self.send(PlayerCmd::Interrupt);
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> PlaybackState {
        self.snapshot().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn is_muted(&self) -> bool {
        self.snapshot().muted
    }

    /// Elapsed time of the current session; zero without one.
    pub fn current_time(&self) -> Duration {
        self.snapshot().elapsed
    }

    /// Duration of the current item; zero without a session or when unknown.
    pub fn duration(&self) -> Duration {
        self.snapshot().duration
    }

    /// Stop with a fade-out and join the player thread.
    pub fn shutdown(&self, fade_out: Duration) {
        self.send(PlayerCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
