//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeSet, HashMap};

// == Recency ==
/// Ordering key for eviction: oldest access first, then earliest expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Recency {
    /// Logical access clock value at the last touch
    tick: u64,
    /// Expiration timestamp of the entry (Unix milliseconds)
    expires_at: u64,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch stamps the key with the next value of a logical clock. The
/// eviction candidate is the key with the smallest stamp; on equal stamps the
/// key whose entry expires first goes.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Logical access clock
    clock: u64,
    /// Current recency of every tracked key
    by_key: HashMap<String, Recency>,
    /// Keys ordered from least to most recently used
    order: BTreeSet<(Recency, String)>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str, expires_at: u64) {
        self.remove(key);
        self.clock += 1;
        let recency = Recency {
            tick: self.clock,
            expires_at,
        };
        self.by_key.insert(key.to_string(), recency);
        self.order.insert((recency, key.to_string()));
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns true if it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.by_key.remove(key) {
            Some(recency) => self.order.remove(&(recency, key.to_string())),
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.by_key.remove(&key);
        Some(key)
    }
}
