//! Expiry Scheduling Module
//!
//! Notices armed by each SET and the min-heap the reaper drains them from.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::cache::CacheEntry;

// == Expiry Notice ==
/// A scheduled removal of one specific entry generation.
///
/// Field order matters: notices sort by expiry time first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpiryNotice {
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Generation of the entry this notice was armed for
    pub generation: u64,
    pub key: String,
}

impl ExpiryNotice {
    /// Arms a notice for the given entry stored under `key`.
    pub fn for_entry(key: &str, entry: &CacheEntry) -> Self {
        Self {
            expires_at: entry.expires_at,
            generation: entry.generation,
            key: key.to_string(),
        }
    }
}

// == Reap Outcome ==
/// What happened when a fired notice was applied to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// The scheduled entry was still current and has been removed
    Applied,
    /// The key was deleted or re-set since the notice was armed
    Superseded,
}

// == Expiry Queue ==
/// Heap sizes below this are never compacted.
const COMPACT_FLOOR: usize = 64;

/// Min-heap of pending notices keyed by expiry time.
///
/// Holds at most one live notice per key: a newer generation replaces the
/// pending one, and an older generation arriving late is dropped. Replaced
/// notices linger in the heap until it is compacted, which happens once they
/// outnumber the live ones, so the heap stays within twice the number of
/// pending keys.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<ExpiryNotice>>,
    /// Generation of the live notice for every pending key
    latest: HashMap<String, u64>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `notice`, replacing any older notice for the same key.
    pub fn push(&mut self, notice: ExpiryNotice) {
        if self
            .latest
            .get(&notice.key)
            .is_some_and(|&generation| generation >= notice.generation)
        {
            return;
        }

        self.latest.insert(notice.key.clone(), notice.generation);
        self.heap.push(Reverse(notice));

        if self.heap.len() > COMPACT_FLOOR && self.heap.len() > 2 * self.latest.len() {
            self.compact();
        }
        self.discard_replaced_head();
    }

    /// Returns the earliest pending expiry time, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(notice)| notice.expires_at)
    }

    /// Removes and returns every live notice due at `now_ms`, earliest first.
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<ExpiryNotice> {
        let mut due = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|Reverse(notice)| notice.expires_at <= now_ms)
        {
            let Some(Reverse(notice)) = self.heap.pop() else {
                break;
            };
            if self.is_live(&notice) {
                self.latest.remove(&notice.key);
                due.push(notice);
            }
        }
        self.discard_replaced_head();
        due
    }

    /// Number of keys with a live notice pending.
    pub fn pending_keys(&self) -> usize {
        self.latest.len()
    }

    fn is_live(&self, notice: &ExpiryNotice) -> bool {
        self.latest.get(&notice.key) == Some(&notice.generation)
    }

    fn discard_replaced_head(&mut self) {
        while self
            .heap
            .peek()
            .is_some_and(|Reverse(notice)| !self.is_live(notice))
        {
            self.heap.pop();
        }
    }

    fn compact(&mut self) {
        let latest = &self.latest;
        self.heap
            .retain(|Reverse(notice)| latest.get(&notice.key) == Some(&notice.generation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(key: &str, generation: u64, expires_at: u64) -> ExpiryNotice {
        ExpiryNotice {
            expires_at,
            generation,
            key: key.to_string(),
        }
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = ExpiryQueue::new();
        assert_eq!(queue.pending_keys(), 0);
        assert_eq!(queue.next_deadline(), None);
        assert!(queue.pop_due(u64::MAX).is_empty());
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut queue = ExpiryQueue::new();
        queue.push(notice("c", 3, 300));
        queue.push(notice("a", 1, 100));
        queue.push(notice("b", 2, 200));

        assert_eq!(queue.pending_keys(), 3);
        assert_eq!(queue.next_deadline(), Some(100));
    }

    #[test]
    fn test_pop_due_only_returns_elapsed_notices() {
        let mut queue = ExpiryQueue::new();
        queue.push(notice("late", 1, 500));
        queue.push(notice("b", 3, 200));
        queue.push(notice("a", 2, 100));

        let due = queue.pop_due(200);
        let keys: Vec<&str> = due.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(queue.pending_keys(), 1);
        assert_eq!(queue.next_deadline(), Some(500));
    }

    #[test]
    fn test_newer_notice_replaces_pending_one() {
        let mut queue = ExpiryQueue::new();
        queue.push(notice("k", 1, 100));
        queue.push(notice("k", 2, 400));

        assert_eq!(queue.pending_keys(), 1);
        assert_eq!(queue.next_deadline(), Some(400));
        assert!(queue.pop_due(300).is_empty());

        let due = queue.pop_due(400);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].generation, 2);
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_late_older_notice_is_dropped() {
        let mut queue = ExpiryQueue::new();
        queue.push(notice("k", 5, 900));
        queue.push(notice("k", 4, 100));

        assert!(queue.pop_due(500).is_empty());
        assert_eq!(queue.pop_due(900)[0].generation, 5);
    }

    #[test]
    fn test_rewriting_one_key_keeps_heap_bounded() {
        let mut queue = ExpiryQueue::new();
        for generation in 1..=10_000u64 {
            queue.push(notice("hot", generation, 86_400_000 + generation % 7));
        }

        assert_eq!(queue.pending_keys(), 1);
        assert!(queue.heap.len() <= COMPACT_FLOOR + 1);

        let due = queue.pop_due(u64::MAX);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].generation, 10_000);
    }

    #[test]
    fn test_heap_stays_within_twice_the_pending_keys() {
        let mut queue = ExpiryQueue::new();
        for round in 0..50u64 {
            for (i, key) in ["a", "b", "c", "d", "e"].iter().enumerate() {
                let generation = round * 5 + i as u64 + 1;
                queue.push(notice(key, generation, 1_000 + generation));
            }
            assert!(queue.heap.len() <= (2 * queue.pending_keys()).max(COMPACT_FLOOR + 1));
        }
        assert_eq!(queue.pending_keys(), 5);
    }
}
