//! Playback-related small types and handles.
//!
//! This module defines the state machine, commands, events and shared
//! playback info used by the playback engine.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::library::MediaItem;

/// Lifecycle of the (at most one) playback session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session.
    Idle,
    /// A session is being opened; no audio yet.
    Loading,
    /// Session exists and audio is rendering.
    Playing,
    /// Session exists, suspended.
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Idle
    }
}

impl PlaybackState {
    /// True while a session is (or is about to be) live.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Replace any current session with one for this item and start it.
    Load(MediaItem),
    /// Resume the current session, if any.
    Play,
    /// Suspend the current session, if any.
    Pause,
    /// Tear the current session down.
    Stop,
    /// Absolute seek within the current session.
    SeekTo(Duration),
    /// Output volume 0.0 or 1.0 without touching playback.
    SetMuted(bool),
    /// External audio interruption: unconditional stop.
    Interrupt,
    /// Quit the player thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications emitted by the player thread. Single consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    StateChanged(PlaybackState),
    /// Periodic position update while a session exists.
    Progress { elapsed: Duration },
    /// The session ran to its natural end (distinct from `Stop`).
    Completed,
}

/// Runtime playback snapshot shared with observers.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    pub state: PlaybackState,
    /// Elapsed playback time for the current session, zero without one.
    pub elapsed: Duration,
    /// Duration of the current item, zero when unknown or without a session.
    pub duration: Duration,
    pub muted: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("no audio output available: {0}")]
    Output(#[from] rodio::StreamError),
}
