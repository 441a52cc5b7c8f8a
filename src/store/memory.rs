use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{InvoiceStore, Window};
use crate::error::StoreError;
use crate::models::{DailySales, Invoice};
use crate::query::{recent_first, Cursor, InvoiceQuery};
use crate::services::top_selling_days::group_by_day;

/// Vec-backed store for tests and local runs. Can be switched into a failing
/// mode to exercise store-error paths.
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    invoices: RwLock<Vec<Invoice>>,
    unavailable: AtomicBool,
}

impl InMemoryInvoiceStore {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices: RwLock::new(invoices),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn insert(&self, invoice: Invoice) {
        self.invoices.write().push(invoice);
    }

    pub fn len(&self) -> usize {
        self.invoices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("in-memory store switched off"))
        } else {
            Ok(())
        }
    }

    fn matching(&self, query: &InvoiceQuery) -> Vec<Invoice> {
        let mut rows: Vec<Invoice> = self
            .invoices
            .read()
            .iter()
            .filter(|invoice| query.matches(invoice))
            .cloned()
            .collect();
        rows.sort_by(recent_first);
        rows
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn fetch(&self, query: &InvoiceQuery, window: Option<Window>) -> Result<Vec<Invoice>, StoreError> {
        self.check_available()?;
        let rows = self.matching(query);
        Ok(match window {
            Some(window) => rows
                .into_iter()
                .skip(window.offset.max(0) as usize)
                .take(window.limit.max(0) as usize)
                .collect(),
            None => rows,
        })
    }

    async fn fetch_after(
        &self,
        query: &InvoiceQuery,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Invoice>, StoreError> {
        self.check_available()?;
        Ok(self
            .matching(query)
            .into_iter()
            .filter(|invoice| after.map_or(true, |cursor| cursor.precedes(invoice)))
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, query: &InvoiceQuery) -> Result<i64, StoreError> {
        self.check_available()?;
        let count = self
            .invoices
            .read()
            .iter()
            .filter(|invoice| query.matches(invoice))
            .count();
        Ok(count as i64)
    }

    async fn sum_total(&self, query: &InvoiceQuery) -> Result<Decimal, StoreError> {
        self.check_available()?;
        Ok(self
            .invoices
            .read()
            .iter()
            .filter(|invoice| query.matches(invoice))
            .map(|invoice| invoice.total)
            .sum())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError> {
        self.check_available()?;
        Ok(self
            .invoices
            .read()
            .iter()
            .find(|invoice| invoice.invoice_number == number)
            .cloned())
    }

    async fn daily_sales(&self) -> Result<Vec<DailySales>, StoreError> {
        self.check_available()?;
        Ok(group_by_day(&self.invoices.read()))
    }
}
