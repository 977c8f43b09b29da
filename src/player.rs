//! Playback engine: a player thread owning at most one session, a command
//! channel in, and an event channel out.

mod controller;
mod session;
mod thread;
mod types;

pub use controller::PlaybackController;
pub use types::{PlaybackHandle, PlaybackInfo, PlaybackState, PlayerError, PlayerEvent};
