use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Initialize file-based logging.
///
/// Logs go to `$XDG_STATE_HOME/echo-play/echo-play.log` (or
/// `~/.local/state/...`) so the terminal UI stays clean. The filter is read
/// from `ECHO_PLAY_LOG` (default `info`). Any failure here leaves logging
/// disabled; the app works fine without it.
pub fn init() {
    let Some(path) = log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("ECHO_PLAY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn log_file_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("state")
    } else {
        return None;
    };
    Some(state_home.join("echo-play").join("echo-play.log"))
}
