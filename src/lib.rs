//! Invoice search, cache and reporting engine.
//!
//! Filter criteria are turned into a pure query descriptor, resolved through a
//! TTL cache against the invoice store, and served as full lists, pages or a
//! streamed CSV export. A scheduled job ranks the top selling days and mails
//! the result on a best-effort basis.

pub mod models;
pub mod error;
pub mod query;
pub mod store;
pub mod cache;
pub mod cache_key;
pub mod cache_ttl;
pub mod repository;
pub mod pagination;
pub mod export;
pub mod services;
pub mod tasks;

// Ambient stack
pub mod config;
pub mod db;
pub mod observability;
pub mod state;

pub use error::{InvoiceError, Result};
pub use models::{ActiveFilter, DailyAggregate, Invoice, InvoiceCriteria, SearchParams};
pub use pagination::{Page, PageRequest, PaginationMeta};
pub use repository::InvoiceRepository;
