use std::path::PathBuf;

use serde::Deserialize;

use crate::library::MediaKind;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/echo-play/config.toml` or
/// `~/.config/echo-play/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ECHO_PLAY__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerSettings,
    pub library: LibrarySettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Progress poll period (milliseconds). The player has no push events for
    /// position, so progress and completion are detected on this tick.
    pub poll_interval_ms: u64,
    /// Fade-out duration when quitting (milliseconds). 0 stops immediately.
    pub quit_fade_out_ms: u64,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            quit_fade_out_ms: 500,
            scrub_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Store root. Defaults to `$XDG_DATA_HOME/echo-play` when unset.
    pub root: Option<PathBuf>,
    /// File extensions listed in the `Songs` folder (case-insensitive, no dot).
    pub song_extensions: Vec<String>,
    /// File extensions listed in the `Video` folder.
    pub video_extensions: Vec<String>,
}

impl LibrarySettings {
    pub fn extensions_for(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Song => &self.song_extensions,
            MediaKind::Video => &self.video_extensions,
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            song_extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            video_extensions: vec!["mp4".into(), "m4v".into(), "mov".into(), "mkv".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Echo Play ~ ".to_string(),
        }
    }
}
