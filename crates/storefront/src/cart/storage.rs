use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::CartError;

/// Synchronous key-value persistence for the cart, the equivalent of a
/// browser's local storage.
///
/// Implementations give no cross-writer coordination: two carts over the same
/// key overwrite each other and the last write wins.
pub trait CartStorage {
    /// Reads the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, CartError>;

    /// Replaces the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), CartError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CartError>;
}

/// Process-local storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartError> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CartError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CartError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Storage keeping one JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStorage for FileCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CartError> {
        std::fs::create_dir_all(&self.dir)?;
        // Replaced atomically via rename.
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CartError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_clones_share_entries() {
        let a = MemoryCartStorage::new();
        let b = a.clone();

        a.save("cart", "[]").unwrap();

        assert_eq!(b.load("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCartStorage::new(dir.path().join("nested"));

        assert_eq!(storage.load("cart").unwrap(), None);

        storage.save("cart", r#"[{"id":1}]"#).unwrap();
        assert_eq!(
            storage.load("cart").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );

        storage.remove("cart").unwrap();
        assert_eq!(storage.load("cart").unwrap(), None);
        storage.remove("cart").unwrap();
    }
}
