//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their age check.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A stored value together with the instant it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write time (monotonic, follows the tokio clock)
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry is stale for the given TTL.
    ///
    /// Boundary condition: an entry is fresh only while its age is strictly
    /// less than the TTL, so at exactly `ttl` it is already expired.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    // == Age ==
    /// Time elapsed since the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}
