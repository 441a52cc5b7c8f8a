use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::{DatabaseConfig, RedisConfig};

/// Crea el pool de conexiones a Postgres para la tabla de facturas
pub async fn create_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!("🔧 Creating database pool with {} max connections", config.max_connections);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Duration::from_secs(600)) // 10 minutos
        .max_lifetime(Duration::from_secs(1800)) // 30 minutos
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    tracing::info!("✅ Database pool created successfully");
    Ok(pool)
}

/// Verifica la salud de la conexión
pub async fn check_db_health(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}

pub fn create_redis_pool(config: &RedisConfig) -> anyhow::Result<deadpool_redis::Pool> {
    deadpool_redis::Config::from_url(&config.url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .map_err(|e| anyhow::anyhow!("Failed to create Redis pool: {}", e))
}
