use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::CacheStore;
use crate::error::CacheError;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expiry: Instant,
}

/// Process-local TTL cache. Expired entries are dropped lazily on read, and
/// writes sweep the whole map at most once per sweep interval.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    store: Arc<DashMap<String, CacheEntry>>,
    sweep_interval: Duration,
    last_sweep: Arc<Mutex<Instant>>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::with_sweep_interval(CACHE_SWEEP_INTERVAL)
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            sweep_interval,
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before_count = self.store.len();
        self.store.retain(|_, entry| entry.expiry > now);
        let removed = before_count.saturating_sub(self.store.len());
        if removed > 0 {
            debug!("🧹 Invoice cache cleanup: removed {} expired entries", removed);
        }
        removed
    }

    fn sweep_if_due(&self) {
        let due = {
            let mut last_sweep = self.last_sweep.lock();
            if last_sweep.elapsed() >= self.sweep_interval {
                *last_sweep = Instant::now();
                true
            } else {
                false
            }
        };
        if due {
            self.cleanup_expired();
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(entry) = self.store.get(key) {
            if entry.expiry > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }

        // Expired. A concurrent writer may have refreshed it meanwhile.
        let now = Instant::now();
        self.store.remove_if(key, |_, entry| entry.expiry <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            expiry: Instant::now() + ttl,
        };
        self.sweep_if_due();
        self.store.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_live_entries() {
        let cache = InMemoryCacheStore::new();
        cache.set("a", "1".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(cache.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_read() {
        let cache = InMemoryCacheStore::new();
        cache.set("a", "1".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_writes_sweep_expired_entries_of_other_keys() {
        let cache = InMemoryCacheStore::with_sweep_interval(Duration::ZERO);
        for i in 0..1000 {
            cache.set(&format!("page_{i}"), "x".to_string(), Duration::ZERO).await.unwrap();
        }
        assert!(cache.len() <= 1);

        cache.set("live", "y".to_string(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("live").await.unwrap().as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn test_sweep_waits_for_interval() {
        let cache = InMemoryCacheStore::new();
        cache.set("a", "1".to_string(), Duration::ZERO).await.unwrap();
        cache.set("b", "2".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_expired_keeps_live_entries() {
        let cache = InMemoryCacheStore::new();
        cache.set("old", "1".to_string(), Duration::ZERO).await.unwrap();
        cache.set("new", "2".to_string(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
