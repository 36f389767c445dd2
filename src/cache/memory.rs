//! Memory Backend Module
//!
//! Process-local storage: a HashMap of entries guarded by an RwLock.
//! Expired entries are filtered out at read time and stay in the map until a
//! write, delete or flush touches them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, Clock, Diagnostics, StorageBackend, SystemClock};

// == Memory Backend ==
/// In-process cache storage with lazy TTL expiry.
#[derive(Debug)]
pub struct MemoryBackend {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
    /// Hit/miss counters
    diagnostics: Diagnostics,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty memory backend using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty memory backend using `clock` for expiry.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Replaces the diagnostics, e.g. to install an error hook.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns remaining TTL in seconds for a live entry with an expiry.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    // == Set ==
    fn set(&self, key: &str, value: Vec<u8>, ttl: u64) {
        let entry = CacheEntry::new(value, ttl, self.clock.now());
        self.entries.write().insert(key.to_string(), entry);
        debug!(key, ttl, "memory cache set");
    }

    // == Get ==
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        let value = self
            .entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone());
        self.diagnostics.record_lookup(&value);
        value
    }

    // == Delete ==
    fn delete(&self, key: &str) {
        if self.entries.write().remove(key).is_some() {
            debug!(key, "memory cache delete");
        }
    }

    fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    fn expired(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now))
    }

    // == Flush ==
    fn flush(&self) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        debug!(removed, "memory cache flushed");
        true
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl fmt::Display for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<MemoryBackend>")
    }
}
