use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::config;
use crate::favorites::FavoriteSet;
use crate::library::MediaStore;
use crate::metadata::MetadataLoader;
use crate::mpris::ControlCmd;
use crate::player::PlaybackController;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::init();

    let root = settings
        .library
        .root
        .clone()
        .or_else(config::default_data_root)
        .unwrap_or_else(|| PathBuf::from("echo-play"));
    let store = MediaStore::new(root, settings.library.clone());

    // Folder-creation failure is logged and otherwise ignored: the app still
    // starts, just with an empty library.
    if let Err(e) = store.ensure_folders() {
        warn!(error = %e, "cannot prepare media folders");
    }
    info!(root = %store.root().display(), "media store ready");

    // Any paths on the command line are copied into the store up front.
    for arg in env::args().skip(1) {
        match store.import(Path::new(&arg)) {
            Ok(dest) => info!(dest = %dest.display(), "imported media file"),
            Err(e) => warn!(error = %e, file = %arg, "import failed"),
        }
    }

    let mut app = App::new(store.list_all(), FavoriteSet::new());

    let (player, player_events) = PlaybackController::new(settings.player.clone());
    let (loader, metadata_results) = MetadataLoader::new();
    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    mpris_sync::update_mpris(&mpris, &app, &player);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let ctx = event_loop::Context {
            settings: &settings,
            store: &store,
            player: &player,
            loader: &loader,
            mpris: &mpris,
            control_tx: &control_tx,
            control_rx: &control_rx,
            player_events: &player_events,
            metadata_results: &metadata_results,
        };
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(&mut terminal, &ctx, &mut app, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
