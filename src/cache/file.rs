//! File Backend Module
//!
//! One file per key at `<dir>/<prefix>-<key>`. Each file holds a JSON 2-tuple
//! of the payload and its optional expiry instant. Writes go to a temporary
//! file in the same directory and are renamed into place, so readers never
//! see a partially written entry.
//!
//! Several instances pointed at the same directory and prefix share state.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::cache::{CacheEntry, Clock, Diagnostics, StorageBackend, SystemClock};
use crate::error::{CacheError, Result};

/// Default file name prefix.
pub const DEFAULT_PREFIX: &str = "cache";

// == File Config ==
/// Options for [`FileBackend`]. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Directory holding the cache files
    pub dir: PathBuf,
    /// File name prefix separating this cache from others in `dir`
    pub prefix: String,
}

impl FileConfig {
    /// Creates a config for `dir` with the default prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Sets the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

// == File Backend ==
/// Filesystem-backed cache storage with lazy TTL expiry.
#[derive(Debug)]
pub struct FileBackend {
    config: FileConfig,
    clock: Arc<dyn Clock>,
    diagnostics: Diagnostics,
}

impl FileBackend {
    // == Constructor ==
    /// Creates a file backend using the system clock.
    pub fn new(config: FileConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a file backend using `clock` for expiry.
    pub fn with_clock(config: FileConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replaces the diagnostics, e.g. to install an error hook.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    /// Path of the file that stores `key`.
    pub fn file_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.config.dir.join(self.file_name(key)))
    }

    fn file_name(&self, key: &str) -> String {
        format!("{}-{}", self.config.prefix, key)
    }

    /// Key encoded in a directory entry name, if it belongs to this cache.
    fn key_from_file_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.config.prefix.as_str())?
            .strip_prefix('-')
    }

    // == Persistence ==
    fn write_entry(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let path = self.file_path(key)?;
        let bytes = serde_json::to_vec(&(&entry.value, entry.expires_at))?;

        let dir = &self.config.dir;
        fs::create_dir_all(dir).map_err(|e| CacheError::io(dir, e))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| CacheError::io(dir, e))?;
        temp.write_all(&bytes)
            .map_err(|e| CacheError::io(temp.path(), e))?;
        temp.persist(&path).map_err(|e| CacheError::io(&path, e.error))?;
        Ok(())
    }

    /// Reads the stored entry. A missing file is `Ok(None)`.
    fn read_entry(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.file_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        let (value, expires_at): (Vec<u8>, Option<DateTime<Utc>>) =
            serde_json::from_slice(&bytes)?;
        Ok(Some(CacheEntry { value, expires_at }))
    }

    fn remove_entry(&self, key: &str) -> Result<()> {
        let path = self.file_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Keys of every cache file currently in the directory.
    fn stored_keys(&self) -> Result<Vec<String>> {
        let dir = &self.config.dir;
        let listing = fs::read_dir(dir).map_err(|e| CacheError::io(dir, e))?;

        let mut keys = Vec::new();
        for dir_entry in listing {
            let dir_entry = dir_entry.map_err(|e| CacheError::io(dir, e))?;
            let is_file = dir_entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = dir_entry.file_name();
            if let Some(key) = name.to_str().and_then(|n| self.key_from_file_name(n)) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}

/// Rejects keys that would resolve outside the cache directory.
fn validate_key(key: &str) -> Result<()> {
    let escapes = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || Path::new(key).is_absolute();
    if escapes {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl StorageBackend for FileBackend {
    // == Set ==
    fn set(&self, key: &str, value: Vec<u8>, ttl: u64) {
        let entry = CacheEntry::new(value, ttl, self.clock.now());
        if self
            .diagnostics
            .absorb("set", key, self.write_entry(key, &entry))
            .is_some()
        {
            debug!(key, ttl, "file cache set");
        }
    }

    // == Get ==
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let value = self
            .diagnostics
            .absorb("get", key, self.read_entry(key))
            .flatten()
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value);
        self.diagnostics.record_lookup(&value);
        value
    }

    // == Delete ==
    fn delete(&self, key: &str) {
        self.diagnostics.absorb("delete", key, self.remove_entry(key));
    }

    /// Pure existence check: an expired file still counts.
    fn contains(&self, key: &str) -> bool {
        self.file_path(key).map(|path| path.exists()).unwrap_or(false)
    }

    fn expired(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.diagnostics
            .absorb("expired", key, self.read_entry(key))
            .flatten()
            .is_some_and(|entry| entry.is_expired_at(now))
    }

    // == Flush ==
    fn flush(&self) -> bool {
        let keys = match self.stored_keys() {
            Ok(keys) => keys,
            Err(err) => {
                self.diagnostics.record_error("flush", "*", &err);
                return false;
            }
        };
        for key in &keys {
            self.delete(key);
        }
        debug!(removed = keys.len(), dir = %self.config.dir.display(), "file cache flushed");
        true
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl fmt::Display for FileBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<FileBackend dir:{}>", self.config.dir.display())
    }
}
