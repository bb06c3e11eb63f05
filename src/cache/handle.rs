//! Shared Cache Handle
//!
//! Cloneable handle that serializes access to one [`CacheStore`] and forwards
//! expiry notices to the reaper.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, ExpiryNotice, ListedEntry};
use crate::error::Result;

/// Store shared between the handle and the reaper.
pub type SharedStore = Arc<RwLock<CacheStore>>;

/// Receiving end of the expiry notice channel, consumed by the reaper.
pub type NoticeReceiver = mpsc::UnboundedReceiver<ExpiryNotice>;

// == Cache ==
/// Thread-safe handle to a cache instance.
///
/// Every operation holds the store lock for one synchronous store call and
/// never across an await point.
#[derive(Debug, Clone)]
pub struct Cache {
    store: SharedStore,
    notices: mpsc::UnboundedSender<ExpiryNotice>,
}

impl Cache {
    /// Wraps a store, returning the handle and the receiver the reaper
    /// should be started with.
    pub fn new(store: CacheStore) -> (Self, NoticeReceiver) {
        let (notices, receiver) = mpsc::unbounded_channel();
        let cache = Self {
            store: Arc::new(RwLock::new(store)),
            notices,
        };
        (cache, receiver)
    }

    /// Returns the underlying shared store.
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.write().await.get(key)
    }

    /// Stores `value` under `key` for `ttl` and schedules its removal.
    pub async fn set(&self, key: String, value: Value, ttl: Duration) -> Result<ExpiryNotice> {
        let notice = self.store.write().await.set(key, value, ttl)?;

        // Without a reaper the entry is still masked on read once expired
        if self.notices.send(notice.clone()).is_err() {
            debug!(key = %notice.key, "Reaper not running, expiry notice dropped");
        }

        Ok(notice)
    }

    /// Removes `key` if present. Returns true if an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    pub async fn list(&self) -> Vec<ListedEntry> {
        self.store.read().await.list()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}
