//! Cache Statistics Module
//!
//! Tracks hits, misses and swallowed failures, and carries the optional
//! error hook through which operators can observe fail-open errors.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{CacheError, Result};

// == Cache Stats ==
/// Point-in-time snapshot of backend counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing (absent, expired or failed)
    pub misses: u64,
    /// Number of internal failures swallowed at the backend boundary
    pub errors: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Callback invoked with every error a backend swallows.
pub type ErrorHook = Arc<dyn Fn(&CacheError) + Send + Sync>;

// == Diagnostics ==
/// Shared counters plus the optional error hook for one backend.
#[derive(Default)]
pub struct Diagnostics {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    hook: Option<ErrorHook>,
}

impl Diagnostics {
    /// Creates diagnostics with no hook installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates diagnostics that forward every swallowed error to `hook`.
    pub fn with_hook(hook: ErrorHook) -> Self {
        Self {
            hook: Some(hook),
            ..Self::default()
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of a read.
    pub fn record_lookup<T>(&self, found: &Option<T>) {
        if found.is_some() {
            self.record_hit();
        } else {
            self.record_miss();
        }
    }

    // == Record Error ==
    /// Logs and counts a swallowed failure, then hands it to the hook.
    pub fn record_error(&self, op: &'static str, key: &str, err: &CacheError) {
        warn!(op, key, error = %err, "cache operation failed, treating as miss");
        self.errors.fetch_add(1, Ordering::Relaxed);
        if let Some(hook) = &self.hook {
            hook(err);
        }
    }

    /// Converts a fallible step into an `Option`, absorbing the error.
    pub fn absorb<T>(&self, op: &'static str, key: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.record_error(op, key, &err);
                None
            }
        }
    }

    // == Snapshot ==
    /// Returns the current counter values.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("stats", &self.snapshot())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let diagnostics = Diagnostics::new();
        diagnostics.record_hit();
        diagnostics.record_miss();
        assert_eq!(diagnostics.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_record_lookup() {
        let diagnostics = Diagnostics::new();
        diagnostics.record_lookup(&Some(1));
        diagnostics.record_lookup::<i32>(&None);
        diagnostics.record_lookup::<i32>(&None);

        let stats = diagnostics.snapshot();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_absorb_passes_success_through() {
        let diagnostics = Diagnostics::new();
        assert_eq!(diagnostics.absorb("get", "k", Ok(7)), Some(7));
        assert_eq!(diagnostics.snapshot().errors, 0);
    }

    #[test]
    fn test_absorb_counts_and_forwards_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let diagnostics = Diagnostics::with_hook(Arc::new(move |err: &CacheError| {
            sink.lock().push(err.to_string());
        }));

        let result: Option<()> =
            diagnostics.absorb("set", "k", Err(CacheError::Client("down".to_string())));

        assert!(result.is_none());
        assert_eq!(diagnostics.snapshot().errors, 1);
        assert_eq!(*seen.lock(), vec!["Client error: down".to_string()]);
    }
}
