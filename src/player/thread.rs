use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::OutputStream;
use tracing::{info, warn};

use crate::config::PlayerSettings;

use super::session::{Session, clamp_seek, open_output_stream};
use super::types::{PlaybackHandle, PlaybackState, PlayerCmd, PlayerEvent};

fn emit_state(info: &PlaybackHandle, events: &Sender<PlayerEvent>, state: PlaybackState) {
    if let Ok(mut i) = info.lock() {
        i.state = state;
    }
    let _ = events.send(PlayerEvent::StateChanged(state));
}

fn publish_session(info: &PlaybackHandle, session: &Session) {
    if let Ok(mut i) = info.lock() {
        i.elapsed = session.clock.elapsed();
        i.duration = session.duration.unwrap_or(Duration::ZERO);
    }
}

fn do_stop(
    session: &mut Option<Session>,
    paused: &mut bool,
    info: &PlaybackHandle,
    events: &Sender<PlayerEvent>,
) {
    let had_session = session.is_some();
    if let Some(s) = session.take() {
        s.stop();
    }
    *paused = false;
    if let Ok(mut i) = info.lock() {
        i.elapsed = Duration::ZERO;
        i.duration = Duration::ZERO;
        i.state = PlaybackState::Idle;
    }
    if had_session {
        let _ = events.send(PlayerEvent::StateChanged(PlaybackState::Idle));
    }
}

fn fade_out_session(session: &Session, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        session.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        session.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    session.set_volume(0.0);
}

pub(super) fn spawn_player_thread(
    rx: Receiver<PlayerCmd>,
    info: PlaybackHandle,
    events: Sender<PlayerEvent>,
    settings: PlayerSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let poll = Duration::from_millis(settings.poll_interval_ms.max(10));

        // The output stream is claimed lazily: nothing touches the audio
        // device until something actually plays.
        let mut stream: Option<OutputStream> = None;
        let mut session: Option<Session> = None;
        let mut paused = false;
        let mut muted = false;

        loop {
            match rx.recv_timeout(poll) {
                Ok(cmd) => match cmd {
                    PlayerCmd::Load(item) => {
                        // Replace wholesale: the old session is fully gone
                        // before the new one exists.
                        do_stop(&mut session, &mut paused, &info, &events);
                        emit_state(&info, &events, PlaybackState::Loading);

                        if stream.is_none() {
                            match open_output_stream() {
                                Ok(s) => stream = Some(s),
                                Err(e) => {
                                    warn!(error = %e, "audio output unavailable");
                                    emit_state(&info, &events, PlaybackState::Idle);
                                    continue;
                                }
                            }
                        }
                        let Some(stream_ref) = stream.as_ref() else {
                            continue;
                        };

                        match Session::open(stream_ref, item, Duration::ZERO, muted, false) {
                            Ok(s) => {
                                publish_session(&info, &s);
                                session = Some(s);
                                paused = false;
                                emit_state(&info, &events, PlaybackState::Playing);
                            }
                            Err(e) => {
                                // Playback silently does not start; the UI keeps
                                // whatever it was showing.
                                warn!(error = %e, "cannot start playback");
                                emit_state(&info, &events, PlaybackState::Idle);
                            }
                        }
                    }

                    PlayerCmd::Play => {
                        if let Some(s) = session.as_mut() {
                            if paused {
                                s.resume();
                                paused = false;
                                emit_state(&info, &events, PlaybackState::Playing);
                            }
                        }
                    }

                    PlayerCmd::Pause => {
                        if let Some(s) = session.as_mut() {
                            if !paused {
                                s.pause();
                                paused = true;
                                emit_state(&info, &events, PlaybackState::Paused);
                            }
                        }
                    }

                    PlayerCmd::Stop => {
                        do_stop(&mut session, &mut paused, &info, &events);
                    }

                    PlayerCmd::SeekTo(target) => {
                        // Scrubbing rebuilds the sink and skips into the file;
                        // the target is clamped to the known duration.
                        if session.is_none() {
                            continue;
                        }
                        let Some(stream_ref) = stream.as_ref() else {
                            continue;
                        };
                        let Some(old) = session.take() else {
                            continue;
                        };

                        let target = clamp_seek(target, old.duration);
                        old.stop();

                        match Session::open(stream_ref, old.item.clone(), target, muted, paused) {
                            Ok(s) => {
                                publish_session(&info, &s);
                                session = Some(s);
                                let _ = events.send(PlayerEvent::Progress { elapsed: target });
                            }
                            Err(e) => {
                                warn!(error = %e, "seek failed, stopping");
                                do_stop(&mut session, &mut paused, &info, &events);
                            }
                        }
                    }

                    PlayerCmd::SetMuted(m) => {
                        muted = m;
                        if let Some(s) = session.as_ref() {
                            s.set_muted(m);
                        }
                        if let Ok(mut i) = info.lock() {
                            i.muted = m;
                        }
                    }

                    PlayerCmd::Interrupt => {
                        // Another output claimed the device: stop, no resume.
                        if session.is_some() {
                            info!("audio interruption, stopping playback");
                        }
                        do_stop(&mut session, &mut paused, &info, &events);
                    }

                    PlayerCmd::Quit { fade_out_ms } => {
                        if let Some(s) = session.as_ref() {
                            if !paused {
                                fade_out_session(s, fade_out_ms);
                            }
                            s.stop();
                        }
                        if let Ok(mut i) = info.lock() {
                            i.state = PlaybackState::Idle;
                        }
                        break;
                    }
                },

                Err(RecvTimeoutError::Timeout) => {
                    // Poll tick: progress update and completion detection.
                    let Some(s) = session.as_ref() else {
                        continue;
                    };
                    if paused {
                        continue;
                    }

                    if s.finished() {
                        // Natural end of the file: distinct from Stop.
                        do_stop(&mut session, &mut paused, &info, &events);
                        let _ = events.send(PlayerEvent::Completed);
                        continue;
                    }

                    let mut elapsed = s.clock.elapsed();
                    if let Some(d) = s.duration {
                        elapsed = elapsed.min(d);
                    }
                    if let Ok(mut i) = info.lock() {
                        i.elapsed = elapsed;
                    }
                    let _ = events.send(PlayerEvent::Progress { elapsed });
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
