use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use serde::{Serialize, Deserialize};
use crate::core::config::Config;

/// Results of previous searches, keyed by query string.
///
/// Entries are a record of what a search returned when it ran; later cache
/// writes do not update them. Least recently used queries are dropped once
/// `capacity` is reached.
pub struct SearchHistory {
    entries: Mutex<LruCache<String, Vec<String>>>,
    capacity: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SearchHistory {
            entries: Mutex::new(LruCache::new(cap)),
            capacity: cap.get(),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.history_capacity)
    }

    pub fn record(&self, query: impl Into<String>, results: Vec<String>) {
        self.entries.lock().put(query.into(), results);
    }

    pub fn get(&self, query: &str) -> Option<Vec<String>> {
        let mut entries = self.entries.lock();
        if let Some(results) = entries.get(query) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(results.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn remove(&self, query: &str) -> Option<Vec<String>> {
        self.entries.lock().pop(query)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl HistoryStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let history = SearchHistory::new(4);
        history.record("apple", vec!["red apple".to_string()]);

        assert_eq!(history.get("apple"), Some(vec!["red apple".to_string()]));
        assert_eq!(history.get("pear"), None);

        let stats = history.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_least_recent_query_is_dropped() {
        let history = SearchHistory::new(2);
        history.record("a", vec![]);
        history.record("b", vec![]);
        history.get("a");
        history.record("c", vec![]);

        assert!(history.get("a").is_some());
        assert!(history.get("b").is_none());
        assert!(history.get("c").is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let history = SearchHistory::new(8);
        history.record("a", vec!["x".to_string()]);
        history.record("b", vec![]);

        assert_eq!(history.remove("a"), Some(vec!["x".to_string()]));
        assert_eq!(history.len(), 1);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_capacity_comes_from_config() {
        assert_eq!(SearchHistory::from_config(&Config::default()).stats().capacity, 128);

        let history = SearchHistory::from_config(&Config::new().with_history_capacity(2));
        assert_eq!(history.stats().capacity, 2);
        history.record("a", vec![]);
        history.record("b", vec![]);
        history.record("c", vec![]);

        assert_eq!(history.len(), 2);
        assert!(history.get("a").is_none());
        assert!(history.get("c").is_some());
    }

    #[test]
    fn test_zero_capacity_holds_one_query() {
        let history = SearchHistory::new(0);
        assert_eq!(history.stats().capacity, 1);
        history.record("a", vec![]);
        history.record("b", vec![]);
        assert_eq!(history.len(), 1);
    }
}
