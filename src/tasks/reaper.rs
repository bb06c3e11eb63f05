//! Expiry Reaper Task
//!
//! Background task that physically removes entries once their TTL elapses.
//!
//! Notices arrive over a channel, one per SET, and are kept in a min-heap
//! ordered by expiry. The task sleeps until the earliest deadline, then asks
//! the store to remove each due entry if it is still the generation the notice
//! was armed for. Reads mask expired entries on their own, so the reaper only
//! bounds how long stale entries occupy memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{
    current_timestamp_ms, ExpiryNotice, ExpiryQueue, NoticeReceiver, ReapOutcome, SharedStore,
};

/// Spawns the reaper for `store`, fed by `notices`.
///
/// The task runs until every [`crate::cache::Cache`] handle sending on the
/// channel is dropped, or until the returned handle is aborted. Pending
/// notices are abandoned in either case.
///
/// # Example
/// ```ignore
/// let (cache, notices) = Cache::new(CacheStore::new(1000));
/// let reaper_handle = spawn_reaper(cache.store(), notices);
/// // Later, during shutdown:
/// reaper_handle.abort();
/// ```
pub fn spawn_reaper(store: SharedStore, mut notices: NoticeReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry reaper");

        let mut queue = ExpiryQueue::new();

        loop {
            let wait = queue
                .next_deadline()
                .map(|deadline| Duration::from_millis(deadline.saturating_sub(current_timestamp_ms())));

            tokio::select! {
                received = notices.recv() => match received {
                    Some(notice) => queue.push(notice),
                    None => break,
                },
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {
                    let due = queue.pop_due(current_timestamp_ms());
                    if !due.is_empty() {
                        reap_due(&store, &due).await;
                    }
                }
            }
        }

        info!(
            pending = queue.pending_keys(),
            "Expiry reaper stopped, pending notices abandoned"
        );
    })
}

/// Applies a batch of fired notices under a single write lock.
async fn reap_due(store: &SharedStore, due: &[ExpiryNotice]) {
    let mut applied = 0usize;
    let mut superseded = 0usize;

    {
        let mut store = store.write().await;
        for notice in due {
            match store.reap(notice) {
                ReapOutcome::Applied => {
                    applied += 1;
                    debug!(key = %notice.key, generation = notice.generation, "Expired entry removed");
                }
                ReapOutcome::Superseded => {
                    superseded += 1;
                    debug!(key = %notice.key, generation = notice.generation, "Expiry notice superseded");
                }
            }
        }
    }

    if applied > 0 {
        info!("Reaper: removed {} expired entries", applied);
    }
    debug!(applied, superseded, "Reaper pass complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Cache, CacheStore};
    use serde_json::json;

    const SHORT: Duration = Duration::from_millis(50);
    const LONG: Duration = Duration::from_secs(60);

    fn start(capacity: usize) -> (Cache, JoinHandle<()>) {
        let (cache, notices) = Cache::new(CacheStore::new(capacity));
        let handle = spawn_reaper(cache.store(), notices);
        (cache, handle)
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let (cache, handle) = start(100);

        cache
            .set("expire_soon".to_string(), json!("value"), SHORT)
            .await
            .unwrap();
        assert_eq!(cache.store().read().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(250)).await;

        // Physically gone without any read touching it
        let store = cache.store();
        let guard = store.read().await;
        assert!(guard.is_empty(), "Expired entry should have been reaped");
        assert_eq!(guard.stats().expirations, 1);
        drop(guard);

        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let (cache, handle) = start(100);

        cache
            .set("long_lived".to_string(), json!("value"), LONG)
            .await
            .unwrap();
        cache
            .set("short_lived".to_string(), json!("value"), SHORT)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.store().read().await.len(), 1);
        assert_eq!(cache.get("long_lived").await, Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_stale_notice_does_not_remove_refreshed_entry() {
        let (cache, handle) = start(100);

        cache.set("key".to_string(), json!("v1"), SHORT).await.unwrap();
        cache.set("key".to_string(), json!("v2"), LONG).await.unwrap();

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get("key").await, Some(json!("v2")));
        assert_eq!(cache.stats().await.expirations, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_delete_then_reset_survives_old_notice() {
        let (cache, handle) = start(100);

        cache.set("key".to_string(), json!("v1"), SHORT).await.unwrap();
        assert!(cache.delete("key").await);
        cache.set("key".to_string(), json!("v2"), LONG).await.unwrap();

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.get("key").await, Some(json!("v2")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_handles_many_notices_for_one_key() {
        let (cache, handle) = start(100);

        for i in 0..20 {
            cache.set("hot".to_string(), json!(i), SHORT).await.unwrap();
        }

        tokio::time::sleep(Duration::from_millis(300)).await;

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_stops_when_cache_dropped() {
        let (cache, handle) = start(100);
        cache.set("key".to_string(), json!(1), LONG).await.unwrap();

        drop(cache);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should exit once all handles are gone")
            .unwrap();
    }

    #[tokio::test]
    async fn test_reaper_can_be_aborted() {
        let (_cache, handle) = start(100);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
