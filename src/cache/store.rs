//! Cache Store Module
//!
//! Main cache engine: HashMap storage with a single store-wide TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats};
use crate::error::{ClientError, Result};

/// Store handle shared between the client and the reaper task.
pub type SharedCache<V = Vec<u8>> = Arc<RwLock<CacheStore<V>>>;

// == Cache Store ==
/// Key-value storage where every entry expires `ttl` after it was written.
///
/// The store itself is not synchronized; share it as a [`SharedCache`] and
/// keep each lock scoped to a single call.
#[derive(Debug)]
pub struct CacheStore<V = Vec<u8>> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Lifetime of every entry
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given TTL.
    ///
    /// A zero TTL would turn every lookup into a miss, so it is rejected.
    pub fn new(ttl: Duration) -> Result<Self> {
        if ttl.is_zero() {
            return Err(ClientError::Config(
                "cache TTL must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl,
        })
    }

    /// Wraps the store for sharing across tasks.
    pub fn into_shared(self) -> SharedCache<V> {
        Arc::new(RwLock::new(self))
    }

    // == Put ==
    /// Stores a value, overwriting any previous entry and resetting its age.
    pub fn put(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), CacheEntry::new(value));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a clone of the value if it is present and younger than the TTL.
    ///
    /// Stale entries are left in place for the reaper.
    pub fn get(&mut self, key: &str) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Reap Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn reap_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - self.entries.len();

        self.stats.record_sweep(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including stale ones not yet reaped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
