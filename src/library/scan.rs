use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{MediaItem, MediaKind, UNKNOWN_TITLE, make_display};

/// Tag fields read from a media file, with fallbacks already applied.
#[derive(Debug, Clone, Default)]
pub struct TagInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}

/// Read title/artist/album/duration from `path`.
///
/// Unreadable files produce an empty `TagInfo` rather than an error; callers
/// fall back to filename-derived display values.
pub fn read_tags(path: &Path) -> TagInfo {
    let mut info = TagInfo::default();

    if let Ok(tagged) = lofty::read_from_path(path) {
        info.duration = Some(tagged.properties().duration());

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                let v = v.trim();
                if !v.is_empty() {
                    info.title = Some(v.to_string());
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                let v = v.trim();
                if !v.is_empty() {
                    info.artist = Some(v.to_string());
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                let v = v.trim();
                if !v.is_empty() {
                    info.album = Some(v.to_string());
                }
            }
        }
    }

    info
}

fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

fn title_from_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Build a `MediaItem` for a single file, reading tags with filename fallback.
pub fn item_from_path(path: &Path, kind: MediaKind) -> MediaItem {
    let tags = read_tags(path);
    let title = tags.title.unwrap_or_else(|| title_from_stem(path));
    let display = make_display(&title, tags.artist.as_deref());

    MediaItem {
        path: path.to_path_buf(),
        kind,
        title,
        artist: tags.artist,
        album: tags.album,
        duration: tags.duration,
        display,
    }
}

/// List the media files directly inside `dir` (flat, non-recursive).
///
/// The store folders are flat by construction; anything nested or with an
/// unexpected extension is ignored. Results are sorted case-insensitively by
/// display text.
pub fn list_folder(dir: &Path, kind: MediaKind, settings: &LibrarySettings) -> Vec<MediaItem> {
    let exts = settings.extensions_for(kind);

    let mut items: Vec<MediaItem> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && has_extension(e.path(), exts))
        .map(|e| item_from_path(e.path(), kind))
        .collect();

    items.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn has_extension_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        let songs = settings.extensions_for(MediaKind::Song);
        assert!(has_extension(Path::new("/tmp/a.mp3"), songs));
        assert!(has_extension(Path::new("/tmp/a.MP3"), songs));
        assert!(has_extension(Path::new("/tmp/a.flac"), songs));
        assert!(!has_extension(Path::new("/tmp/a.txt"), songs));
        assert!(!has_extension(Path::new("/tmp/a"), songs));

        let videos = settings.extensions_for(MediaKind::Video);
        assert!(has_extension(Path::new("/tmp/a.mp4"), videos));
        assert!(!has_extension(Path::new("/tmp/a.mp3"), videos));
    }

    #[test]
    fn list_folder_filters_non_media_and_sorts_by_display_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let items = list_folder(dir.path(), MediaKind::Song, &LibrarySettings::default());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[1].title, "b");
        assert!(items.iter().all(|i| i.kind == MediaKind::Song));
    }

    #[test]
    fn list_folder_is_not_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let items = list_folder(dir.path(), MediaKind::Song, &LibrarySettings::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "root");
    }

    #[test]
    fn item_from_path_falls_back_to_filename_title() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("My Tune.mp3");
        fs::write(&path, b"not a real mp3").unwrap();

        let item = item_from_path(&path, MediaKind::Song);
        assert_eq!(item.title, "My Tune");
        assert_eq!(item.display, "My Tune");
        assert_eq!(item.artist, None);
    }
}
