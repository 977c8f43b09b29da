use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::app::App;
use crate::config;
use crate::library::{MediaStore, artwork};
use crate::metadata::{MetadataLoader, MetadataResult, RequestToken};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{PlaybackController, PlaybackState, PlayerEvent};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Cancellation token for the in-flight metadata request, if any.
    pub metadata_token: Option<RequestToken>,
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            metadata_token: None,
            pending_gg: false,
        }
    }
}

/// Everything the event loop needs, bundled to keep signatures readable.
pub struct Context<'a> {
    pub settings: &'a config::Settings,
    pub store: &'a MediaStore,
    pub player: &'a PlaybackController,
    pub loader: &'a MetadataLoader,
    pub mpris: &'a MprisHandle,
    pub control_tx: &'a Sender<ControlCmd>,
    pub control_rx: &'a Receiver<ControlCmd>,
    pub player_events: &'a Receiver<PlayerEvent>,
    pub metadata_results: &'a Receiver<MetadataResult>,
}

/// Main terminal event loop: handles input, UI drawing, playback events,
/// metadata results and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &Context<'_>,
    app: &mut App,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = ctx.player_events.try_recv() {
            handle_player_event(ev, ctx, app, state);
        }

        while let Ok(result) = ctx.metadata_results.try_recv() {
            apply_metadata_result(result, ctx, app);
        }

        while let Ok(cmd) = ctx.control_rx.try_recv() {
            if handle_control_cmd(cmd, ctx, app, state) {
                return Ok(());
            }
        }

        let display = app.display_indices();
        let info = ctx.player.snapshot();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                &display,
                &info,
                &ctx.settings.ui,
                ctx.settings.player.scrub_seconds,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, ctx, app, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Start playback of the library item at `index` and kick off background
/// metadata resolution for it, cancelling any request still in flight.
fn start_playback(index: usize, ctx: &Context<'_>, app: &mut App, state: &mut EventLoopState) {
    let Some(item) = app.item(index).cloned() else {
        return;
    };

    if let Some(token) = state.metadata_token.take() {
        token.cancel();
    }

    app.playing = Some(index);
    ctx.player.load_and_play(item.clone());
    state.metadata_token = Some(ctx.loader.request(item.path));
    update_mpris(ctx.mpris, app, ctx.player);
}

fn handle_player_event(
    ev: PlayerEvent,
    ctx: &Context<'_>,
    app: &mut App,
    state: &mut EventLoopState,
) {
    match ev {
        PlayerEvent::StateChanged(s) => {
            app.playback = s;
            update_mpris(ctx.mpris, app, ctx.player);
        }
        PlayerEvent::Progress { elapsed } => {
            ctx.mpris.set_position(elapsed);
        }
        PlayerEvent::Completed => {
            // The session ended on its own; move the playlist forward, or
            // fall silent after the last item.
            let next = app.playing.and_then(|cur| app.next_after(cur));
            match next {
                Some(next) => start_playback(next, ctx, app, state),
                None => {
                    app.playing = None;
                    update_mpris(ctx.mpris, app, ctx.player);
                }
            }
        }
    }
}

fn apply_metadata_result(result: MetadataResult, ctx: &Context<'_>, app: &mut App) {
    // Stale result: the owner moved on to another item.
    if result.token.is_cancelled() {
        return;
    }
    let Some(index) = app.playing else {
        return;
    };
    let Some(item) = app.items.get_mut(index) else {
        return;
    };

    if item.duration.is_none() {
        item.duration = result.loaded.duration;
    }

    if let Some(art) = result.loaded.artwork {
        if let Some(cache_dir) = artwork::default_cache_dir() {
            match artwork::cache_art_url(&cache_dir, &result.loaded.path, &art) {
                Ok(url) => ctx.mpris.set_art_url(Some(url)),
                Err(e) => warn!(error = %e, "cannot cache artwork"),
            }
        }
    }

    update_mpris(ctx.mpris, app, ctx.player);
}

fn handle_control_cmd(
    cmd: ControlCmd,
    ctx: &Context<'_>,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            ctx.player.shutdown(Duration::from_millis(
                ctx.settings.player.quit_fade_out_ms,
            ));
            return true;
        }
        ControlCmd::Play => match app.playback {
            PlaybackState::Paused => ctx.player.play(),
            PlaybackState::Playing | PlaybackState::Loading => {}
            PlaybackState::Idle => {
                if app.has_visible() {
                    start_playback(app.selected, ctx, app, state);
                }
            }
        },
        ControlCmd::Pause => {
            if app.playback == PlaybackState::Playing {
                ctx.player.pause();
            }
        }
        ControlCmd::PlayPause => match app.playback {
            PlaybackState::Playing => ctx.player.pause(),
            PlaybackState::Paused => ctx.player.play(),
            PlaybackState::Loading => {}
            PlaybackState::Idle => {
                if app.has_visible() {
                    start_playback(app.selected, ctx, app, state);
                }
            }
        },
        ControlCmd::Stop => {
            ctx.player.stop();
            app.playing = None;
            update_mpris(ctx.mpris, app, ctx.player);
        }
        ControlCmd::Next => {
            let base = app.playing.unwrap_or(app.selected);
            if let Some(next) = app.next_after(base) {
                start_playback(next, ctx, app, state);
            }
        }
        ControlCmd::Prev => {
            let base = app.playing.unwrap_or(app.selected);
            if let Some(prev) = app.prev_before(base) {
                start_playback(prev, ctx, app, state);
            }
        }
        ControlCmd::SeekBy(offset_micros) => {
            let current = ctx.player.current_time().as_micros() as i64;
            let target = (current + offset_micros).max(0) as u64;
            ctx.player.seek_to(Duration::from_micros(target));
        }
        ControlCmd::SeekTo(position_micros) => {
            ctx.player
                .seek_to(Duration::from_micros(position_micros.max(0) as u64));
        }
    }

    false
}

fn handle_key_event(
    key: KeyEvent,
    ctx: &Context<'_>,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            ctx.player.shutdown(Duration::from_millis(
                ctx.settings.player.quit_fade_out_ms,
            ));
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.select_prev();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let display = app.display_indices();
                if let Some(&first) = display.first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            let display = app.display_indices();
            if let Some(&last) = display.last() {
                app.set_selected(last);
            }
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if app.has_visible() {
                start_playback(app.selected, ctx, app, state);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            let _ = ctx.control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('s') => {
            state.pending_gg = false;
            let _ = ctx.control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = ctx.control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = ctx.control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let micros = (ctx.settings.player.scrub_seconds as i64) * 1_000_000;
            let _ = ctx.control_tx.send(ControlCmd::SeekBy(micros));
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let micros = (ctx.settings.player.scrub_seconds as i64) * 1_000_000;
            let _ = ctx.control_tx.send(ControlCmd::SeekBy(-micros));
        }
        KeyCode::Char('m') => {
            state.pending_gg = false;
            ctx.player.toggle_mute();
        }
        KeyCode::Char('f') => {
            state.pending_gg = false;
            app.toggle_favorite_selected();
        }
        KeyCode::Char('F') => {
            state.pending_gg = false;
            app.toggle_favorites_only();
        }
        KeyCode::Char('v') => {
            state.pending_gg = false;
            app.toggle_view_kind();
        }
        KeyCode::Char('R') => {
            state.pending_gg = false;
            app.set_items(ctx.store.list_all());
            update_mpris(ctx.mpris, app, ctx.player);
        }
        KeyCode::Char(_) => {
            // A pending `g` clears on any other printable character.
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
