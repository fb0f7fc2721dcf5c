//! LRU Tracker Module
//!
//! Least-recently-used bookkeeping for the capacity bound of the memory store.

use std::collections::HashMap;

// == LRU Tracker ==
/// Records a monotonically increasing access tick per key; the key with
/// the smallest tick is the eviction candidate.
#[derive(Debug, Default)]
pub struct LruTracker {
    ticks: HashMap<String, u64>,
    clock: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        match self.ticks.get_mut(key) {
            Some(tick) => *tick = self.clock,
            None => {
                self.ticks.insert(key.to_string(), self.clock);
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.ticks.remove(key);
    }

    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self
            .ticks
            .iter()
            .min_by_key(|(_, tick)| **tick)
            .map(|(key, _)| key.clone())?;
        self.ticks.remove(&oldest);
        Some(oldest)
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let mut lru = LruTracker::new();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_evicts_in_insertion_order() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_touch_refreshes_key() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");

        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), Some("c".to_string()));
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove_and_clear() {
        let mut lru = LruTracker::new();
        lru.touch("a");
        lru.touch("b");
        lru.remove("a");
        lru.remove("missing");
        lru.touch("c");
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));

        lru.clear();
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_repeated_touch_tracks_once() {
        let mut lru = LruTracker::new();
        lru.touch("k");
        lru.touch("k");
        lru.touch("k");
        assert_eq!(lru.evict_oldest(), Some("k".to_string()));
        assert_eq!(lru.evict_oldest(), None);
    }
}
