//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk. Every write rewrites the whole
//! file through a sibling temp file and a rename, so a crash mid-write leaves
//! the previous contents intact. Reads go to disk each time; there is no
//! in-process cache to drift from the file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use preforma_core::storage::{KeyValueStore, StorageError, StorageResult};

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted as a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or prepare to create) the store at `path`.
    ///
    /// The file itself is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the parent directory cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| backend(parent, &e))?;
        }
        tracing::debug!(path = %path.display(), "file store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    fn read_entries(&self) -> StorageResult<Entries> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(backend(&self.path, &e)),
        }
    }

    fn write_entries(&self, entries: &Entries) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| backend(&tmp, &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| backend(&self.path, &e))?;
        Ok(())
    }

    /// Read-modify-write under the write lock.
    ///
    /// A file that no longer parses is started over from an empty map, the
    /// same way reads of it degrade to an empty catalog.
    fn update(&self, apply: impl FnOnce(&mut Entries)) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Backend("file store lock poisoned".to_string()))?;
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(error)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "data file unreadable, replacing it"
                );
                Entries::new()
            }
            Err(e) => return Err(e),
        };
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

fn backend(path: &Path, err: &io::Error) -> StorageError {
    StorageError::Backend(format!("{}: {err}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
