//! Key/value media for history snapshots: file-backed and in-memory
//!
//! `FileStore` keeps each key in `<dir>/<key>.json` and writes atomically
//! (unique temp file + rename) so a crash mid-write never leaves a half-written snapshot.
//! Read-modify-write cycles run under [`KeyValueStore::with_lock`], which for files is an
//! advisory lock on `<dir>/<key>.lock` shared by every process using the directory.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;

/// Per-value size limit, matching what browsers give local storage
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const SNAPSHOT_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

/// Minimal string key/value medium the history store persists into
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete the key entirely. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Run `f` as the only writer of `key`.
    ///
    /// Writers of the same key on clones of this store, or in other processes sharing
    /// the medium, block until `f` returns. `f` should re-read the key before writing.
    fn with_lock<T, F>(&mut self, key: &str, f: F) -> Result<T, StorageError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> T;
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid { Ok(()) } else { Err(StorageError::InvalidKey { key: key.to_string() }) }
}

fn check_quota(key: &str, value: &str, quota: usize) -> Result<(), StorageError> {
    if value.len() > quota {
        return Err(StorageError::QuotaExceeded {
            key: key.to_string(),
            size: value.len(),
            quota,
        });
    }
    Ok(())
}

/// Directory of JSON files, one per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: usize,
}

impl FileStore {
    /// Open (creating if missing) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir, quota: DEFAULT_QUOTA_BYTES })
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, SNAPSHOT_EXTENSION)))
    }

    fn lock_path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, LOCK_EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        check_quota(key, value, self.quota)?;

        // Each writer gets its own temp file; it is deleted on drop if never persisted
        let io_err = |source| StorageError::Io { key: key.to_string(), source };
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp.write_all(value.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn with_lock<T, F>(&mut self, key: &str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Self) -> T,
    {
        let lock_path = self.lock_path_for(key)?;
        let io_err = |source| StorageError::Io { key: key.to_string(), source };

        let lock_file: File = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_err)?;
        lock_file.lock_exclusive().map_err(io_err)?;
        debug!(key, "Acquired history lock");

        let result = f(self);

        // Closing the handle releases the lock
        drop(lock_file);
        Ok(result)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-process store; clones share the same map.
///
/// Supports a quota and fault injection so callers can exercise the
/// persistence-unavailable paths without touching the filesystem.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    writer: Arc<Mutex<()>>,
    quota: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            writer: Arc::new(Mutex::new(())),
            quota: DEFAULT_QUOTA_BYTES,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Make every subsequent `set`/`remove` fail
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make every subsequent `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Raw stored value, bypassing fault injection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().values.contains_key(key)
    }

    /// Seed a raw value, bypassing quota and fault injection
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().values.insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned map is still a usable map
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.lock();
        if state.fail_reads {
            return Err(StorageError::Unavailable { message: "reads disabled".to_string() });
        }
        Ok(state.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(key, value, self.quota)?;
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable { message: "writes disabled".to_string() });
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable { message: "writes disabled".to_string() });
        }
        state.values.remove(key);
        Ok(())
    }

    /// One writer lock for all keys; clones share it
    fn with_lock<T, F>(&mut self, _key: &str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Self) -> T,
    {
        let writer = Arc::clone(&self.writer);
        let _guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(self))
    }
}
