//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// A stored value together with its optional expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Vec<u8>,
    /// Expiry instant, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped against `now`.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl_seconds` - Lifetime in seconds; 0 means the entry never expires
    /// * `now` - Current time from the backend's clock
    pub fn new(value: Vec<u8>, ttl_seconds: u64, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: expiry_for(ttl_seconds, now),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// An entry is expired only once its expiry instant lies strictly in the
    /// past. Entries without an expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => expires < now,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in whole seconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_seconds)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at.map(|expires| {
            let remaining = expires.signed_duration_since(now).num_seconds();
            remaining.max(0) as u64
        })
    }
}

// == Utility Functions ==
/// Computes the expiry instant for a TTL; 0 yields None.
///
/// TTLs too large to represent are clamped to "never expires".
pub fn expiry_for(ttl_seconds: u64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if ttl_seconds == 0 {
        return None;
    }
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
}
