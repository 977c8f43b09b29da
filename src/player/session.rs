//! The live binding between the player thread and one media file.
//!
//! A `Session` owns a decoded `rodio` sink plus the wall-clock position
//! bookkeeping. Sessions are replaced wholesale: the player thread drops the
//! old one (stopping its sink) before opening the next.

use std::fs::File;
use std::io::BufReader;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::MediaItem;

use super::types::PlayerError;

/// Elapsed-time tracking across pause/resume/seek.
///
/// `rodio` sinks do not report their position, so the session keeps its own
/// clock: accumulated time plus the instant playback last resumed.
#[derive(Debug)]
pub(super) struct PositionClock {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl PositionClock {
    pub fn running_at(position: Duration) -> Self {
        Self {
            accumulated: position,
            started_at: Some(Instant::now()),
        }
    }

    pub fn paused_at(position: Duration) -> Self {
        Self {
            accumulated: position,
            started_at: None,
        }
    }

    pub fn pause(&mut self) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
    }

    pub fn resume(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}

/// Clamp a seek target to the known duration. Targets are unsigned, so the
/// lower bound is already zero; unknown durations pass through unchanged.
pub(super) fn clamp_seek(target: Duration, duration: Option<Duration>) -> Duration {
    match duration {
        Some(d) => target.min(d),
        None => target,
    }
}

/// Claim the default audio output.
pub(super) fn open_output_stream() -> Result<OutputStream, PlayerError> {
    let mut stream = rodio::OutputStreamBuilder::open_default_stream()?;
    // rodio logs to stderr when an OutputStream is dropped; noisy for a
    // TUI app.
    stream.log_on_drop(false);
    Ok(stream)
}

pub(super) struct Session {
    pub item: MediaItem,
    sink: Sink,
    pub clock: PositionClock,
    pub duration: Option<Duration>,
}

impl Session {
    /// Open `item` at `start_at` on the given output stream.
    ///
    /// The sink starts paused or playing according to `paused`; `skip_duration`
    /// is the seeking primitive (works for the common formats).
    pub fn open(
        stream: &OutputStream,
        item: MediaItem,
        start_at: Duration,
        muted: bool,
        paused: bool,
    ) -> Result<Self, PlayerError> {
        let file = File::open(&item.path).map_err(|source| PlayerError::Open {
            path: item.path.clone(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file)).map_err(|source| PlayerError::Decode {
            path: item.path.clone(),
            source,
        })?;

        let duration = item.duration.or_else(|| source.total_duration());
        let source = source.skip_duration(start_at);

        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);
        sink.set_volume(if muted { 0.0 } else { 1.0 });

        let clock = if paused {
            sink.pause();
            PositionClock::paused_at(start_at)
        } else {
            sink.play();
            PositionClock::running_at(start_at)
        };

        Ok(Self {
            item,
            sink,
            clock,
            duration,
        })
    }

    pub fn pause(&mut self) {
        self.sink.pause();
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.sink.play();
        self.clock.resume();
    }

    pub fn stop(&self) {
        self.sink.stop();
    }

    pub fn set_muted(&self, muted: bool) {
        self.sink.set_volume(if muted { 0.0 } else { 1.0 });
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }

    /// True once the sink has drained all queued audio.
    pub fn finished(&self) -> bool {
        self.sink.empty()
    }
}
