//! Process configuration read from the environment (and `.env` via dotenvy).

use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

use crate::cache_ttl::CacheTtls;
use crate::services::top_selling_days::TOP_SELLING_DAYS_LIMIT;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379/1";
pub const DEFAULT_REPORT_CRON: &str = "0 0 8 * * *";
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Without a recipient the report is computed but not sent.
    pub recipient: Option<String>,
    pub cron: String,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

impl SmtpConfig {
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub report: ReportConfig,
    pub smtp: SmtpConfig,
    pub cache_ttls: CacheTtls,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").map_err(|e| anyhow!("DATABASE_URL must be set: {}", e))?;

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20),
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 2),
                acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECONDS", 5)),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            },
            report: ReportConfig {
                recipient: non_empty_var("TOP_SELLING_DAYS_RECIPIENT"),
                cron: env::var("TOP_SELLING_DAYS_CRON").unwrap_or_else(|_| DEFAULT_REPORT_CRON.to_string()),
                limit: parse_or("TOP_SELLING_DAYS_LIMIT", TOP_SELLING_DAYS_LIMIT),
            },
            smtp: SmtpConfig {
                server: env::var("SMTP_SERVER").unwrap_or_else(|_| DEFAULT_SMTP_SERVER.to_string()),
                username: non_empty_var("SMTP_USERNAME"),
                password: non_empty_var("SMTP_PASSWORD"),
                from: non_empty_var("SMTP_FROM"),
            },
            cache_ttls: CacheTtls::from_env(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
