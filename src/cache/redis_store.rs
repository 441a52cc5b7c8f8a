use async_trait::async_trait;
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, error};

use super::CacheStore;
use crate::error::CacheError;

/// Redis-backed cache shared by every process of the service.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
    namespace: String,
}

impl RedisCacheStore {
    pub fn new(pool: Pool) -> Self {
        Self::with_namespace(pool, "invoices")
    }

    /// Keys are stored as `<namespace>:<key>`.
    pub fn with_namespace(pool: Pool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            CacheError::from(e)
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        // SETEX rejects 0; anything below a second is rounded up
        let ttl_seconds = ttl.as_secs().max(1);
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(self.namespaced(key), value, ttl_seconds)
            .await?;

        debug!(key = %key, ttl = ttl_seconds, "🔑 Redis key set with TTL");
        Ok(())
    }
}
