//! Shared TTL cache boundary.
//!
//! Plain get/set on string values. Entries only ever leave through TTL
//! expiry; concurrent writers to the same key may race and the last write
//! wins, which is acceptable for search results.

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryCacheStore;
pub use redis_store::RedisCacheStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::observability::{record_cache_hit, record_cache_miss};

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Read-through lookup: serve `key` from the cache, otherwise run `load`,
/// store its result for `ttl` and return it.
///
/// Cache problems (unreachable backend, undecodable entry) degrade to a miss
/// and are only logged; errors from `load` are returned untouched.
pub async fn fetch<T, E, F, Fut>(
    cache: &dyn CacheStore,
    cache_name: &str,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(hit) = read(cache, cache_name, key).await {
        return Ok(hit);
    }

    let value = load().await?;
    write(cache, key, &value, ttl).await;
    Ok(value)
}

/// Cached value for `key`, if present and decodable. Records hit/miss.
pub async fn read<T: DeserializeOwned>(cache: &dyn CacheStore, cache_name: &str, key: &str) -> Option<T> {
    let cached = match cache.get(key).await {
        Ok(cached) => cached,
        Err(e) => {
            warn!(cache_key = %key, "Cache read failed, falling back to store: {}", e);
            None
        }
    };

    let decoded = cached.and_then(|raw| match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(cache_key = %key, "Discarding undecodable cache entry: {}", e);
            None
        }
    });

    match decoded {
        Some(value) => {
            debug!(cache_key = %key, "🎯 Cache hit");
            record_cache_hit(cache_name);
            Some(value)
        }
        None => {
            record_cache_miss(cache_name);
            None
        }
    }
}

/// Best-effort store; failures are logged and swallowed.
pub async fn write<T: Serialize>(cache: &dyn CacheStore, key: &str, value: &T, ttl: Duration) {
    let serialized = match serde_json::to_string(value) {
        Ok(serialized) => serialized,
        Err(e) => {
            warn!(cache_key = %key, "Failed to serialize cache entry: {}", e);
            return;
        }
    };

    match cache.set(key, serialized, ttl).await {
        Ok(()) => debug!(cache_key = %key, ttl = ttl.as_secs(), "🔑 Cache entry stored"),
        Err(e) => warn!(cache_key = %key, "Cache write failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Serialization(serde_json::from_str::<u8>("x").unwrap_err()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Serialization(serde_json::from_str::<u8>("x").unwrap_err()))
        }
    }

    #[tokio::test]
    async fn test_fetch_loads_once_then_serves_from_cache() {
        let cache = InMemoryCacheStore::new();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Vec<i64>, ()> = fetch(&cache, "test", "k", Duration::from_secs(60), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(vec![1, 2, 3])
            })
            .await;
            assert_eq!(value, Ok(vec![1, 2, 3]));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_broken_cache_degrades_to_loader() {
        let value: Result<i64, ()> =
            fetch(&BrokenCache, "test", "k", Duration::from_secs(60), || async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_treated_as_miss() {
        let cache = InMemoryCacheStore::new();
        cache
            .set("k", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Result<i64, ()> = fetch(&cache, "test", "k", Duration::from_secs(60), || async { Ok(9) }).await;
        assert_eq!(value, Ok(9));
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_loader_errors_are_not_cached() {
        let cache = InMemoryCacheStore::new();
        let value: Result<i64, &str> =
            fetch(&cache, "test", "k", Duration::from_secs(60), || async { Err("boom") }).await;
        assert_eq!(value, Err("boom"));
        assert!(cache.get("k").await.unwrap().is_none());
    }
}
