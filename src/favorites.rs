//! In-memory favorite set keyed by media file path.
//!
//! Process-lifetime only; constructed once at startup and passed by
//! reference to whatever needs it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, Default)]
pub struct FavoriteSet {
    paths: HashSet<PathBuf>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Flip membership for `path` and return the new state.
    pub fn toggle(&mut self, path: &Path) -> bool {
        if self.paths.remove(path) {
            debug!(path = %path.display(), total = self.paths.len(), "removed favorite");
            false
        } else {
            self.paths.insert(path.to_path_buf());
            debug!(path = %path.display(), total = self.paths.len(), "added favorite");
            true
        }
    }

    pub fn all(&self) -> Vec<PathBuf> {
        self.paths.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut favorites = FavoriteSet::new();
        let path = Path::new("/music/a.mp3");

        assert!(!favorites.is_favorite(path));
        assert!(favorites.toggle(path));
        assert!(favorites.is_favorite(path));
        assert!(!favorites.toggle(path));
        assert!(!favorites.is_favorite(path));
    }

    #[test]
    fn all_enumerates_current_members() {
        let mut favorites = FavoriteSet::new();
        favorites.toggle(Path::new("/music/a.mp3"));
        favorites.toggle(Path::new("/music/b.mp3"));
        favorites.toggle(Path::new("/music/a.mp3"));

        let all = favorites.all();
        assert_eq!(all, vec![PathBuf::from("/music/b.mp3")]);
        assert_eq!(favorites.len(), 1);
        assert!(!favorites.is_empty());
    }
}
