use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lofty::picture::PictureType;
use lofty::prelude::*;

/// Embedded artwork pulled out of a media file's tags.
#[derive(Debug, Clone)]
pub struct Artwork {
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

// Oversized embedded images are skipped rather than pushed at the
// now-playing surface.
const MAX_ARTWORK_BYTES: usize = 5 * 1024 * 1024;

/// Extract the front-cover picture (or the first picture) from `path`.
///
/// Returns `None` when the file has no usable artwork; unreadable files also
/// count as "no artwork" since artwork is purely decorative.
pub fn extract(path: &Path) -> Option<Artwork> {
    let tagged = lofty::read_from_path(path).ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;

    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures.first())?;

    let data = picture.data();
    if data.is_empty() || data.len() > MAX_ARTWORK_BYTES {
        return None;
    }

    Some(Artwork {
        data: data.to_vec(),
        mime: picture.mime_type().map(|m| m.as_str().to_string()),
    })
}

impl Artwork {
    fn file_extension(&self) -> &'static str {
        match self.mime.as_deref() {
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/bmp") => "bmp",
            _ => "jpg",
        }
    }
}

/// Default artwork cache directory: `$XDG_CACHE_HOME/echo-play/artwork` or
/// `~/.cache/echo-play/artwork`.
pub fn default_cache_dir() -> Option<PathBuf> {
    let cache_home = if let Some(xdg) = env::var_os("XDG_CACHE_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".cache")
    } else {
        return None;
    };
    Some(cache_home.join("echo-play").join("artwork"))
}

/// Write `artwork` for `media_path` into `cache_dir` and return a `file://`
/// URL for it. Re-caching the same artwork reuses the existing file.
pub fn cache_art_url(cache_dir: &Path, media_path: &Path, artwork: &Artwork) -> io::Result<String> {
    fs::create_dir_all(cache_dir)?;

    let stem = media_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artwork");
    // Data length in the name keeps stale cache entries from shadowing
    // re-tagged files with the same stem.
    let name = format!("{stem}-{}.{}", artwork.data.len(), artwork.file_extension());
    let dest = cache_dir.join(name);

    if !dest.is_file() {
        fs::write(&dest, &artwork.data)?;
    }

    Ok(format!("file://{}", dest.display()))
}
