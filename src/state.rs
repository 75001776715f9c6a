//! Single-slot persistence of the last notified episode title.
//!
//! The file holds the title verbatim with nothing around it. Writes replace
//! the file in place, so a crash mid-write can leave it truncated.
//!
//! `load` does not trim: whatever `save` wrote comes back byte for byte. The
//! cost is that a hand-edited file with a trailing newline no longer equals
//! the page title, and that episode is announced once more.

use crate::error::WatchError;
use std::path::PathBuf;

pub trait MarkerStore: Send {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, WatchError>;
    fn save(&mut self, title: &str) -> Result<(), WatchError>;
}

pub struct FileMarkerStore {
    path: PathBuf,
}

impl FileMarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> WatchError {
        WatchError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

impl MarkerStore for FileMarkerStore {
    fn load(&self) -> Result<Option<String>, WatchError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, title: &str) -> Result<(), WatchError> {
        std::fs::write(&self.path, title).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(name: &str) -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let n = SEQ.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "episode-watch-{}-{}-{}.txt",
            name,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let store = FileMarkerStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_exact() {
        let path = temp_path("roundtrip");
        let mut store = FileMarkerStore::new(&path);
        for title in ["Episode 5", "  padded  ", "Capítulo 3: «Ñ»", "line\nbreak"] {
            store.save(title).unwrap();
            assert_eq!(store.load().unwrap().as_deref(), Some(title));
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_load_keeps_trailing_newline() {
        let path = temp_path("newline");
        std::fs::write(&path, "Episode 5\n").unwrap();
        let store = FileMarkerStore::new(&path);
        assert_eq!(store.load().unwrap().as_deref(), Some("Episode 5\n"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_save_overwrites_previous_value() {
        let path = temp_path("overwrite");
        let mut store = FileMarkerStore::new(&path);
        store.save("A much longer first title").unwrap();
        store.save("B").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("B"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_unwritable_path_is_persistence_error() {
        let path = temp_path("nodir").join("nested").join("latest.txt");
        let mut store = FileMarkerStore::new(&path);
        let err = store.save("Episode 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_directory_path_load_is_persistence_error() {
        let store = FileMarkerStore::new(std::env::temp_dir());
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }
}
