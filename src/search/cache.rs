//! Bounded message-embedding cache.
//!
//! Keyed by message `ts` (messages are immutable once fetched, so entries
//! never go stale). Bounded LRU instead of an unbounded map: long-lived
//! server processes would otherwise grow without limit.

use std::num::NonZeroUsize;

use lru::LruCache;

pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

pub struct EmbeddingCache {
    entries: LruCache<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).expect("nonzero"));
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, ts: &str) -> Option<Vec<f32>> {
        self.entries.get(ts).cloned()
    }

    pub fn insert(&mut self, ts: String, embedding: Vec<f32>) {
        self.entries.put(ts, embedding);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut cache = EmbeddingCache::new(8);
        assert!(cache.get("1.0").is_none());
        cache.insert("1.0".to_string(), vec![0.5, 0.5]);
        assert_eq!(cache.get("1.0"), Some(vec![0.5, 0.5]));
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let mut cache = EmbeddingCache::new(2);
        cache.insert("a".to_string(), vec![1.0]);
        cache.insert("b".to_string(), vec![2.0]);
        cache.get("a");
        cache.insert("c".to_string(), vec![3.0]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let cache = EmbeddingCache::new(0);
        assert!(cache.is_empty());
    }
}
