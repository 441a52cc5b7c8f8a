//! Centralized TTL constants for caching
//!
//! This module provides consistent cache time-to-live values
//! across the application with environment variable overrides.

use std::env;
use std::time::Duration;

use crate::models::InvoiceCriteria;

// Default TTL constants (in seconds)
pub const TTL_INVOICE_SEARCH: u64 = 900; // 15 minutes
pub const TTL_INVOICE_ALL: u64 = 1800; // 30 minutes
pub const TTL_INVOICE_STATUS: u64 = 1800; // 30 minutes
pub const TTL_INVOICE_NUMBER: u64 = 3600; // 1 hour
pub const TTL_INVOICE_COUNT: u64 = 300; // 5 minutes
pub const TTL_INVOICE_PERIOD: u64 = 3600; // 1 hour (month / year lookups)

/// Get TTL with environment variable override
pub fn ttl_with_env(env_key: &str, default_ttl: u64) -> u64 {
    env::var(env_key)
        .map(|val| val.parse::<u64>().unwrap_or(default_ttl))
        .unwrap_or(default_ttl)
}

/// TTLs used by the invoice repository, one per kind of cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub search: Duration,
    pub all: Duration,
    pub status: Duration,
    pub invoice_number: Duration,
    pub count: Duration,
    pub period: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(TTL_INVOICE_SEARCH),
            all: Duration::from_secs(TTL_INVOICE_ALL),
            status: Duration::from_secs(TTL_INVOICE_STATUS),
            invoice_number: Duration::from_secs(TTL_INVOICE_NUMBER),
            count: Duration::from_secs(TTL_INVOICE_COUNT),
            period: Duration::from_secs(TTL_INVOICE_PERIOD),
        }
    }
}

impl CacheTtls {
    pub fn from_env() -> Self {
        Self {
            search: secs("TTL_INVOICE_SEARCH_SECONDS", TTL_INVOICE_SEARCH),
            all: secs("TTL_INVOICE_ALL_SECONDS", TTL_INVOICE_ALL),
            status: secs("TTL_INVOICE_STATUS_SECONDS", TTL_INVOICE_STATUS),
            invoice_number: secs("TTL_INVOICE_NUMBER_SECONDS", TTL_INVOICE_NUMBER),
            count: secs("TTL_INVOICE_COUNT_SECONDS", TTL_INVOICE_COUNT),
            period: secs("TTL_INVOICE_PERIOD_SECONDS", TTL_INVOICE_PERIOD),
        }
    }

    /// Same TTL for everything. Handy in tests.
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            search: ttl,
            all: ttl,
            status: ttl,
            invoice_number: ttl,
            count: ttl,
            period: ttl,
        }
    }

    /// TTL for a search result: unfiltered listings and status-only lookups
    /// live longer than arbitrary filter combinations.
    pub fn for_criteria(&self, criteria: &InvoiceCriteria) -> Duration {
        if criteria.is_empty() {
            self.all
        } else if criteria.is_status_only() {
            self.status
        } else {
            self.search
        }
    }
}

fn secs(env_key: &str, default_ttl: u64) -> Duration {
    Duration::from_secs(ttl_with_env(env_key, default_ttl))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_with_env_falls_back_on_garbage() {
        env::set_var("TTL_TEST_GARBAGE_SECONDS", "soon");
        assert_eq!(ttl_with_env("TTL_TEST_GARBAGE_SECONDS", 42), 42);
        env::set_var("TTL_TEST_VALID_SECONDS", "7");
        assert_eq!(ttl_with_env("TTL_TEST_VALID_SECONDS", 42), 7);
        assert_eq!(ttl_with_env("TTL_TEST_MISSING_SECONDS", 42), 42);
    }

    #[test]
    fn test_for_criteria_picks_ttl_by_shape() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.for_criteria(&InvoiceCriteria::new()), Duration::from_secs(1800));
        assert_eq!(
            ttls.for_criteria(&InvoiceCriteria::new().with_status("Vigente")),
            Duration::from_secs(1800)
        );
        assert_eq!(
            ttls.for_criteria(&InvoiceCriteria::new().with_status("Vigente").with_active(true)),
            Duration::from_secs(900)
        );
    }
}
