//! Invoice repository: criteria → query → (cache | store).
//!
//! Every read goes through the TTL cache first. There is no invalidation on
//! write; entries only age out.

use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::cache::{self, CacheStore};
use crate::cache_key;
use crate::cache_ttl::CacheTtls;
use crate::error::StoreError;
use crate::models::invoice::STATUS_VIGENTE;
use crate::models::{Invoice, InvoiceCriteria};
use crate::pagination::PageRequest;
use crate::query::{Cursor, InvoiceQuery, Predicate};
use crate::store::{InvoiceStore, Window};

/// Rows per keyset batch when streaming.
pub const STREAM_BATCH_SIZE: i64 = 1000;

/// Totals above this are high value; at or below it, low value.
pub const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Clone)]
pub struct InvoiceRepository {
    store: Arc<dyn InvoiceStore>,
    cache: Arc<dyn CacheStore>,
    ttl: CacheTtls,
}

impl InvoiceRepository {
    pub fn new(store: Arc<dyn InvoiceStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttls(store, cache, CacheTtls::default())
    }

    pub fn with_ttls(store: Arc<dyn InvoiceStore>, cache: Arc<dyn CacheStore>, ttl: CacheTtls) -> Self {
        Self { store, cache, ttl }
    }

    pub fn store(&self) -> &Arc<dyn InvoiceStore> {
        &self.store
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.ttl
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Invoices matching every present criterion, newest first (date desc,
    /// id desc).
    pub async fn search(&self, criteria: &InvoiceCriteria) -> Result<Vec<Invoice>, StoreError> {
        if criteria.is_empty() {
            return self.all().await;
        }

        let key = cache_key::invoice_search(criteria);
        let ttl = self.ttl.for_criteria(criteria);
        self.cached_fetch("invoice_search", &key, ttl, criteria).await
    }

    pub async fn all(&self) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_all();
        self.cached_fetch("invoices_all", &key, self.ttl.all, &InvoiceCriteria::new())
            .await
    }

    /// One page of `search(criteria)`, cached per (criteria, page, per_page).
    pub async fn page(&self, criteria: &InvoiceCriteria, request: PageRequest) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoice_page(criteria, request.page(), request.per_page());
        let ttl = self.ttl.for_criteria(criteria);
        let query = InvoiceQuery::from_criteria(criteria);
        let window = Window {
            offset: request.offset(),
            limit: request.per_page(),
        };

        cache::fetch(self.cache.as_ref(), "invoice_page", &key, ttl, || {
            self.store.fetch(&query, Some(window))
        })
        .await
    }

    /// Number of invoices `search(criteria)` would return, counted by the store.
    pub async fn count_matching(&self, criteria: &InvoiceCriteria) -> Result<i64, StoreError> {
        let key = cache_key::invoice_count(criteria);
        let query = InvoiceQuery::from_criteria(criteria);

        cache::fetch(self.cache.as_ref(), "invoice_count", &key, self.ttl.count, || {
            self.store.count(&query)
        })
        .await
    }

    /// Exact-number lookup. Only hits are cached, so an invoice that shows up
    /// later is found on the next call.
    pub async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError> {
        let number = number.trim();
        if number.is_empty() {
            return Ok(None);
        }

        let key = cache_key::invoice_number(number);
        if let Some(invoice) = cache::read::<Invoice>(self.cache.as_ref(), "invoice_number", &key).await {
            return Ok(Some(invoice));
        }

        let found = self.store.find_by_number(number).await?;
        match &found {
            Some(invoice) => {
                cache::write(self.cache.as_ref(), &key, invoice, self.ttl.invoice_number).await;
            }
            None => debug!(invoice_number = %number, "Invoice not found"),
        }
        Ok(found)
    }

    // ========================================================================
    // STREAMING
    // ========================================================================

    /// Lazily pages through `search(criteria)` in keyset batches of
    /// [`STREAM_BATCH_SIZE`]. Bypasses the cache.
    pub fn stream(&self, criteria: &InvoiceCriteria) -> BoxStream<'static, Result<Invoice, StoreError>> {
        self.stream_batched(criteria, STREAM_BATCH_SIZE)
    }

    /// Like [`stream`](Self::stream) with an explicit batch size. The next
    /// batch is requested only once the previous one has been consumed.
    pub fn stream_batched(
        &self,
        criteria: &InvoiceCriteria,
        batch_size: i64,
    ) -> BoxStream<'static, Result<Invoice, StoreError>> {
        let store = Arc::clone(&self.store);
        let query = Arc::new(InvoiceQuery::from_criteria(criteria));
        let batch_size = batch_size.max(1);

        // state: Some(cursor) while there may be more rows, None once drained
        stream::try_unfold(Some(None::<Cursor>), move |state| {
            let store = Arc::clone(&store);
            let query = Arc::clone(&query);
            async move {
                let Some(after) = state else {
                    return Ok::<_, StoreError>(None);
                };

                let batch = store.fetch_after(&query, after, batch_size).await?;
                if batch.is_empty() {
                    return Ok(None);
                }
                debug!(rows = batch.len(), "📦 Streaming invoice batch");

                let next = if (batch.len() as i64) < batch_size {
                    None
                } else {
                    batch.last().map(|last| Some(Cursor::after(last)))
                };
                let rows = stream::iter(batch.into_iter().map(Ok::<Invoice, StoreError>));
                Ok(Some((rows, next)))
            }
        })
        .try_flatten()
        .boxed()
    }

    // ========================================================================
    // CONVENIENCE LOOKUPS
    // ========================================================================

    pub async fn by_status(&self, status: &str) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_status(status);
        let criteria = InvoiceCriteria::new().with_status(status);
        self.cached_fetch("invoices_status", &key, self.ttl.status, &criteria)
            .await
    }

    pub async fn vigente(&self) -> Result<Vec<Invoice>, StoreError> {
        self.by_status(STATUS_VIGENTE).await
    }

    /// Inclusive on both ends.
    pub async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_date_range(start, end);
        let criteria = InvoiceCriteria::new().with_date_from(start).with_date_to(end);
        self.cached_fetch("invoices_date_range", &key, self.ttl.search, &criteria)
            .await
    }

    /// Invoices of one calendar month. An invalid month yields nothing.
    pub async fn by_month(&self, year: i32, month: u32) -> Result<Vec<Invoice>, StoreError> {
        let Some((start, end)) = month_bounds(year, month) else {
            return Ok(Vec::new());
        };
        let key = cache_key::invoices_month(year, month);
        let criteria = InvoiceCriteria::new().with_date_from(start).with_date_to(end);
        self.cached_fetch("invoices_month", &key, self.ttl.period, &criteria)
            .await
    }

    pub async fn by_year(&self, year: i32) -> Result<Vec<Invoice>, StoreError> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Ok(Vec::new());
        };
        let key = cache_key::invoices_year(year);
        let criteria = InvoiceCriteria::new().with_date_from(start).with_date_to(end);
        self.cached_fetch("invoices_year", &key, self.ttl.period, &criteria)
            .await
    }

    pub async fn active(&self) -> Result<Vec<Invoice>, StoreError> {
        self.by_active(true).await
    }

    pub async fn inactive(&self) -> Result<Vec<Invoice>, StoreError> {
        self.by_active(false).await
    }

    async fn by_active(&self, active: bool) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_active(active);
        let criteria = InvoiceCriteria::new().with_active(active);
        self.cached_fetch("invoices_active", &key, self.ttl.all, &criteria)
            .await
    }

    /// Invoices with a total strictly above [`HIGH_VALUE_THRESHOLD`].
    pub async fn high_value(&self) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_high_value();
        let query = InvoiceQuery::from_predicates(vec![Predicate::AmountAbove(HIGH_VALUE_THRESHOLD)]);
        self.cached_query("invoices_high_value", &key, self.ttl.status, query)
            .await
    }

    /// Invoices with a total at or below [`HIGH_VALUE_THRESHOLD`].
    pub async fn low_value(&self) -> Result<Vec<Invoice>, StoreError> {
        let key = cache_key::invoices_low_value();
        let query = InvoiceQuery::from_predicates(vec![Predicate::MaxAmount(HIGH_VALUE_THRESHOLD)]);
        self.cached_query("invoices_low_value", &key, self.ttl.status, query)
            .await
    }

    // ========================================================================
    // STORE-WIDE AGGREGATES
    // ========================================================================

    pub async fn count_all(&self) -> Result<i64, StoreError> {
        let key = cache_key::invoices_count_all();
        let query = InvoiceQuery::all();
        cache::fetch(self.cache.as_ref(), "invoices_count", &key, self.ttl.count, || {
            self.store.count(&query)
        })
        .await
    }

    /// Sum of every invoice total.
    pub async fn total_amount(&self) -> Result<Decimal, StoreError> {
        let key = cache_key::invoices_total_amount();
        let query = InvoiceQuery::all();
        cache::fetch(self.cache.as_ref(), "invoices_total_amount", &key, self.ttl.count, || {
            self.store.sum_total(&query)
        })
        .await
    }

    async fn cached_fetch(
        &self,
        cache_name: &str,
        key: &str,
        ttl: Duration,
        criteria: &InvoiceCriteria,
    ) -> Result<Vec<Invoice>, StoreError> {
        self.cached_query(cache_name, key, ttl, InvoiceQuery::from_criteria(criteria))
            .await
    }

    async fn cached_query(
        &self,
        cache_name: &str,
        key: &str,
        ttl: Duration,
        query: InvoiceQuery,
    ) -> Result<Vec<Invoice>, StoreError> {
        let invoices = cache::fetch(self.cache.as_ref(), cache_name, key, ttl, || {
            self.store.fetch(&query, None)
        })
        .await?;

        info!(cache_key = %key, count = invoices.len(), "🔍 Invoice search resolved");
        Ok(invoices)
    }
}

/// First and last day of `year-month`.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let end = next.pred_opt()?;
    Some((start, end))
}
