//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, LRU eviction and
//! generation-tagged expiry notices for the background reaper.

mod entry;
mod expiry;
mod handle;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, ListedEntry};
pub use expiry::{ExpiryNotice, ExpiryQueue, ReapOutcome};
pub use handle::{Cache, NoticeReceiver, SharedStore};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{key_rejection, CacheStore};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
