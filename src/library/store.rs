use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::LibrarySettings;

use super::model::{MediaItem, MediaKind};
use super::scan;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create folder {}: {source}", path.display())]
    CreateFolder { path: PathBuf, source: io::Error },
    #[error("cannot copy {} to {}: {source}", src.display(), dest.display())]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },
    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedExtension(PathBuf),
}

/// The app-private media tree: a root directory containing one flat folder
/// per `MediaKind`. Files are only ever copied in, never moved or deleted.
pub struct MediaStore {
    root: PathBuf,
    settings: LibrarySettings,
}

impl MediaStore {
    pub fn new(root: PathBuf, settings: LibrarySettings) -> Self {
        Self { root, settings }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.folder_name())
    }

    /// Create the `Songs` and `Video` folders. Idempotent.
    pub fn ensure_folders(&self) -> Result<(), StoreError> {
        for kind in [MediaKind::Song, MediaKind::Video] {
            let folder = self.folder(kind);
            if !folder.is_dir() {
                fs::create_dir_all(&folder).map_err(|source| StoreError::CreateFolder {
                    path: folder.clone(),
                    source,
                })?;
                info!(folder = %folder.display(), "created media folder");
            }
        }
        Ok(())
    }

    /// List one folder's contents as media items, sorted for display.
    pub fn list(&self, kind: MediaKind) -> Vec<MediaItem> {
        scan::list_folder(&self.folder(kind), kind, &self.settings)
    }

    /// List songs followed by videos.
    pub fn list_all(&self) -> Vec<MediaItem> {
        let mut items = self.list(MediaKind::Song);
        items.extend(self.list(MediaKind::Video));
        items
    }

    /// Decide which folder a file belongs in, by extension.
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let matches = |exts: &[String]| {
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| e == ext)
        };
        if matches(self.settings.extensions_for(MediaKind::Song)) {
            Some(MediaKind::Song)
        } else if matches(self.settings.extensions_for(MediaKind::Video)) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Copy `src` into the matching folder and return the destination path.
    ///
    /// An occupied destination name is never overwritten: the name is probed
    /// with numeric suffixes (`name_1.ext`, `name_2.ext`, ...) until a free
    /// one is found.
    pub fn import(&self, src: &Path) -> Result<PathBuf, StoreError> {
        if !src.is_file() {
            return Err(StoreError::NotAFile(src.to_path_buf()));
        }
        let kind = self
            .classify(src)
            .ok_or_else(|| StoreError::UnsupportedExtension(src.to_path_buf()))?;

        self.ensure_folders()?;

        let folder = self.folder(kind);
        let dest = free_destination(&folder, src);

        fs::copy(src, &dest).map_err(|source| StoreError::Copy {
            src: src.to_path_buf(),
            dest: dest.clone(),
            source,
        })?;

        debug!(src = %src.display(), dest = %dest.display(), "imported media file");
        Ok(dest)
    }
}

/// Pick a destination path inside `folder` for `src`, suffixing the file stem
/// with `_1`, `_2`, ... while the name is taken.
fn free_destination(folder: &Path, src: &Path) -> PathBuf {
    let file_name = src
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("import");
    let stem = src
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import");
    let ext = src.extension().and_then(|s| s.to_str());

    let mut dest = folder.join(file_name);
    let mut index = 1u32;
    while dest.exists() {
        let name = match ext {
            Some(ext) => format!("{stem}_{index}.{ext}"),
            None => format!("{stem}_{index}"),
        };
        dest = folder.join(name);
        index += 1;
    }
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn store(root: &Path) -> MediaStore {
        MediaStore::new(root.to_path_buf(), LibrarySettings::default())
    }

    #[test]
    fn ensure_folders_creates_both_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.ensure_folders().unwrap();
        assert!(dir.path().join("Songs").is_dir());
        assert!(dir.path().join("Video").is_dir());

        store.ensure_folders().unwrap();
    }

    #[test]
    fn import_copies_into_matching_folder() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let src_dir = tempdir().unwrap();
        let song = src_dir.path().join("tune.mp3");
        fs::write(&song, b"song bytes").unwrap();
        let video = src_dir.path().join("clip.mp4");
        fs::write(&video, b"video bytes").unwrap();

        let dest = store.import(&song).unwrap();
        assert_eq!(dest, dir.path().join("Songs").join("tune.mp3"));
        assert_eq!(fs::read(&dest).unwrap(), b"song bytes");

        let dest = store.import(&video).unwrap();
        assert_eq!(dest, dir.path().join("Video").join("clip.mp4"));
    }

    #[test]
    fn import_collision_appends_numeric_suffix_and_keeps_existing() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let src_dir = tempdir().unwrap();
        let first = src_dir.path().join("tune.mp3");
        fs::write(&first, b"first").unwrap();
        let second = src_dir.path().join("tune.mp3");
        // Same name, different content: overwrite would lose "first".
        store.import(&first).unwrap();
        fs::write(&second, b"second").unwrap();

        let dest2 = store.import(&second).unwrap();
        assert_eq!(dest2, dir.path().join("Songs").join("tune_1.mp3"));

        fs::write(&second, b"third").unwrap();
        let dest3 = store.import(&second).unwrap();
        assert_eq!(dest3, dir.path().join("Songs").join("tune_2.mp3"));

        // The original copy is untouched.
        let original = fs::read(dir.path().join("Songs").join("tune.mp3")).unwrap();
        assert_eq!(original, b"first");
        assert_eq!(fs::read(dest2).unwrap(), b"second");
        assert_eq!(fs::read(dest3).unwrap(), b"third");
    }

    #[test]
    fn import_rejects_unknown_extensions_and_missing_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let src_dir = tempdir().unwrap();
        let text = src_dir.path().join("notes.txt");
        fs::write(&text, b"hello").unwrap();

        assert!(matches!(
            store.import(&text),
            Err(StoreError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            store.import(&src_dir.path().join("missing.mp3")),
            Err(StoreError::NotAFile(_))
        ));
    }

    #[test]
    fn list_reads_back_imported_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let src_dir = tempdir().unwrap();
        let song = src_dir.path().join("b side.mp3");
        fs::write(&song, b"x").unwrap();
        store.import(&song).unwrap();
        let song = src_dir.path().join("a side.mp3");
        fs::write(&song, b"x").unwrap();
        store.import(&song).unwrap();

        let items = store.list(MediaKind::Song);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "a side");
        assert_eq!(items[1].title, "b side");
        assert!(store.list(MediaKind::Video).is_empty());
    }
}
