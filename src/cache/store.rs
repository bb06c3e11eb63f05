//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL expiration
//! and generation-checked removal for the reaper.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::cache::{
    current_timestamp_ms, CacheEntry, CacheStats, ExpiryNotice, ListedEntry, LruTracker,
    ReapOutcome, MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// The store itself is not synchronized; callers share it behind a single
/// lock (see [`crate::cache::Cache`]).
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Every entry's expiry time, earliest first
    deadlines: BTreeSet<(u64, String)>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Last generation handed out by `set`
    last_generation: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            deadlines: BTreeSet::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            last_generation: 0,
        }
    }

    // == Set ==
    /// Stores a key-value pair that expires `ttl` from now.
    ///
    /// An existing entry under the same key is replaced along with its expiry
    /// and generation. Inserting a new key into a full cache first drops
    /// expired entries, then evicts the least recently used one if needed.
    ///
    /// Returns the expiry notice the reaper should be handed.
    pub fn set(&mut self, key: String, value: Value, ttl: Duration) -> Result<ExpiryNotice> {
        validate_key(&key)?;
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "TTL must be greater than zero".to_string(),
            ));
        }

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            self.make_room()?;
        }

        self.last_generation += 1;
        let entry = CacheEntry::new(value, ttl, self.last_generation);
        let notice = ExpiryNotice::for_entry(&key, &entry);

        if let Some(previous) = self.entries.get(&key) {
            self.deadlines.remove(&(previous.expires_at, key.clone()));
        }
        self.lru.touch(&key, entry.expires_at);
        self.deadlines.insert((entry.expires_at, key.clone()));
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());

        Ok(notice)
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is absent or its entry has expired. Expired
    /// entries found here are removed on the spot.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = current_timestamp_ms();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(now) {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        let value = entry.value.clone();
        let expires_at = entry.expires_at;
        self.lru.touch(key, expires_at);
        self.stats.record_hit();
        Some(value)
    }

    // == Delete ==
    /// Removes an entry by key. Deleting an absent key is a no-op.
    ///
    /// Returns true if an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == List ==
    /// Returns a snapshot of every live entry, sorted by key.
    ///
    /// Expired entries awaiting removal are left out, matching `get`. Listing
    /// does not count as access for LRU purposes.
    pub fn list(&self) -> Vec<ListedEntry> {
        let now = current_timestamp_ms();
        let mut listed: Vec<ListedEntry> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| ListedEntry {
                key: key.clone(),
                value: entry.value.clone(),
                expires_at: entry.expires_at,
            })
            .collect();
        listed.sort_by(|a, b| a.key.cmp(&b.key));
        listed
    }

    // == Reap ==
    /// Applies a fired expiry notice.
    ///
    /// The entry is removed only if it is still the generation the notice was
    /// armed for and it has expired.
    pub fn reap(&mut self, notice: &ExpiryNotice) -> ReapOutcome {
        let now = current_timestamp_ms();
        let is_current = self.entries.get(&notice.key).is_some_and(|entry| {
            entry.generation == notice.generation && entry.is_expired_at(now)
        });

        if !is_current {
            return ReapOutcome::Superseded;
        }

        self.remove_entry(&notice.key);
        self.stats.record_expirations(1);
        ReapOutcome::Applied
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Only the expired entries are visited. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let mut removed = 0;

        while self
            .deadlines
            .first()
            .is_some_and(|(expires_at, _)| *expires_at <= now)
        {
            let Some((_, key)) = self.deadlines.pop_first() else {
                break;
            };
            if self.remove_entry(&key) {
                removed += 1;
            }
        }

        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        self.lru.remove(key);
        self.deadlines.remove(&(entry.expires_at, key.to_string()));
        self.stats.set_total_entries(self.entries.len());
        true
    }

    fn make_room(&mut self) -> Result<()> {
        let purged = self.purge_expired();
        if purged > 0 {
            debug!(purged, "Dropped expired entries to make room");
        }
        if self.entries.len() < self.max_entries {
            return Ok(());
        }

        let Some(evicted) = self.lru.evict_oldest() else {
            error!(
                entries = self.entries.len(),
                "LRU tracker is empty while the cache is full"
            );
            return Err(CacheError::Internal(
                "LRU tracker out of sync with cache entries".to_string(),
            ));
        };

        if !self.remove_entry(&evicted) {
            error!(key = %evicted, "LRU tracker referenced a key missing from the cache");
            return Err(CacheError::Internal(
                "LRU tracker out of sync with cache entries".to_string(),
            ));
        }

        self.stats.record_eviction();
        debug!(key = %evicted, "Evicted least recently used entry");
        Ok(())
    }
}

// == Key Rules ==
/// Returns why `key` cannot be stored, or None if it is acceptable.
///
/// Keys must contain a non-whitespace character and fit in
/// [`MAX_KEY_LENGTH`] bytes.
pub fn key_rejection(key: &str) -> Option<String> {
    if key.trim().is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_key(key: &str) -> Result<()> {
    match key_rejection(key) {
        Some(reason) => Err(CacheError::InvalidArgument(reason)),
        None => Ok(()),
    }
}
