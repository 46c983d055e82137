//! File-backed storage under the client data directory.

use crate::{ProfileStorage, StorageError, StorageResult};
use std::path::PathBuf;

/// Durable storage that keeps one file per key under a base directory.
///
/// Keys are short identifiers from [`crate::StorageKeys`], never
/// user-supplied strings.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`, creating the directory if needed.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ProfileStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to read {}: {}",
                key, e
            ))),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to delete {}: {}",
                key, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("session_profile", "{\"id\":\"1\"}").unwrap();
        assert_eq!(
            storage.get("session_profile").unwrap(),
            Some("{\"id\":\"1\"}".to_string())
        );
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        assert_eq!(storage.get("nothing_here").unwrap(), None);
        assert!(!storage.has("nothing_here").unwrap());
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("key", "value").unwrap();
        assert!(storage.delete("key").unwrap());
        assert!(!storage.delete("key").unwrap());
        assert_eq!(storage.get("key").unwrap(), None);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set("key", "first").unwrap();
        storage.set("key", "second").unwrap();
        assert_eq!(storage.get("key").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();

        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            storage.set("key", "persisted").unwrap();
        }

        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("key").unwrap(), Some("persisted".to_string()));
    }

    #[test]
    fn test_new_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let storage = FileStorage::new(nested.clone()).unwrap();
        storage.set("key", "value").unwrap();
        assert!(nested.is_dir());
    }
}
