//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and generation tags.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value, opaque to the cache
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Distinguishes successive entries stored under the same key
    pub generation: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    ///
    /// The deadline is the exact instant `now + ttl` rounded up to the next
    /// millisecond, so an entry never expires before its full TTL has elapsed.
    pub fn new(value: Value, ttl: Duration, generation: u64) -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Self {
            value,
            expires_at: duration_to_ms(since_epoch.saturating_add(ttl)),
            generation,
        }
    }

    // == Is Expired ==
    /// Checks expiry against a clock reading from [`current_timestamp_ms`].
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// the expiration time.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Listed Entry ==
/// Snapshot of a live entry as returned by a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEntry {
    pub key: String,
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

// == Utility Functions ==
/// Returns current Unix timestamp in whole milliseconds, rounded down.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_epoch| u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Converts a duration to whole milliseconds, rounding up.
fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Instant;

    #[test]
    fn test_entry_creation() {
        let before = current_timestamp_ms();
        let entry = CacheEntry::new(json!("test_value"), Duration::from_secs(60), 1);
        let after = current_timestamp_ms();

        assert_eq!(entry.value, json!("test_value"));
        assert_eq!(entry.generation, 1);
        assert!(entry.expires_at >= before + 60_000);
        assert!(entry.expires_at <= after + 60_001);
        assert!(!entry.is_expired_at(after));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!({"nested": [1, 2, 3]}), Duration::from_millis(50), 1);

        assert!(!entry.is_expired_at(current_timestamp_ms()));

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: json!("test"),
            expires_at: now,
            generation: 1,
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }

    #[test]
    fn test_short_ttl_never_expires_early() {
        let ttl = Duration::from_millis(2);

        for _ in 0..50 {
            let started = Instant::now();
            let entry = CacheEntry::new(json!(1), ttl, 1);
            while !entry.is_expired_at(current_timestamp_ms()) {}
            assert!(
                started.elapsed() >= ttl,
                "expired after {:?}, before its {:?} TTL",
                started.elapsed(),
                ttl
            );
        }
    }

    #[test]
    fn test_sub_millisecond_ttl_rounds_up() {
        assert_eq!(duration_to_ms(Duration::from_micros(1)), 1);
        assert_eq!(duration_to_ms(Duration::from_micros(1500)), 2);
        assert_eq!(duration_to_ms(Duration::from_millis(7)), 7);
        assert_eq!(duration_to_ms(Duration::MAX), u64::MAX);
    }
}
