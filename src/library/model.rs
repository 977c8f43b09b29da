use std::path::PathBuf;
use std::time::Duration;

/// Which app-managed folder a media file belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Song,
    Video,
}

impl MediaKind {
    /// Name of the folder holding this kind of media under the store root.
    pub fn folder_name(self) -> &'static str {
        match self {
            MediaKind::Song => "Songs",
            MediaKind::Video => "Video",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Song => "Songs",
            MediaKind::Video => "Videos",
        }
    }
}

/// One playable (or at least listable) media file.
///
/// Identity is the file path. Tag-derived fields are best-effort: a file with
/// unreadable tags still gets a title from its filename.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
}

/// Fallback title used when neither tags nor the filename yield one.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

pub(crate) fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}
