//! Persistent store boundary.
//!
//! The engine only needs conjunctive filtering, date+id ordering,
//! offset/limit and keyset windows, and a grouped-by-day aggregate.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryInvoiceStore;
pub use postgres::PgInvoiceStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::{DailySales, Invoice};
use crate::query::{Cursor, InvoiceQuery};

/// Offset/limit slice of an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Matching rows ordered by date desc, id desc; the whole set when
    /// `window` is `None`.
    async fn fetch(&self, query: &InvoiceQuery, window: Option<Window>) -> Result<Vec<Invoice>, StoreError>;

    /// Up to `limit` matching rows that sort after `after`.
    async fn fetch_after(
        &self,
        query: &InvoiceQuery,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Invoice>, StoreError>;

    async fn count(&self, query: &InvoiceQuery) -> Result<i64, StoreError>;

    async fn sum_total(&self, query: &InvoiceQuery) -> Result<Decimal, StoreError>;

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError>;

    /// Count and total per `invoice_date` over the whole table.
    async fn daily_sales(&self) -> Result<Vec<DailySales>, StoreError>;
}
