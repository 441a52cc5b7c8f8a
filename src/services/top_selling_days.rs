// ============================================================================
// TOP SELLING DAYS - Agregado diario de ventas
// ============================================================================

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::error::StoreError;
use crate::models::{DailyAggregate, DailySales, Invoice};
use crate::store::InvoiceStore;

pub const TOP_SELLING_DAYS_LIMIT: usize = 10;

/// Count and total per `invoice_date`, earliest day first.
pub fn group_by_day(invoices: &[Invoice]) -> Vec<DailySales> {
    let mut days: BTreeMap<_, (i64, Decimal)> = BTreeMap::new();
    for invoice in invoices {
        let entry = days.entry(invoice.invoice_date).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += invoice.total;
    }

    days.into_iter()
        .map(|(day, (invoices_count, total_amount))| DailySales {
            day,
            invoices_count,
            total_amount,
        })
        .collect()
}

/// Highest `total_amount` first; equal totals keep the earlier day first.
pub fn rank_top_days(sales: Vec<DailySales>, limit: usize) -> Vec<DailyAggregate> {
    let mut ranked: Vec<DailyAggregate> = sales.into_iter().map(DailyAggregate::from_sales).collect();
    ranked.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.day.cmp(&b.day))
    });
    ranked.truncate(limit);
    ranked
}

/// Scans the whole invoice table; no criteria apply.
pub struct TopSellingDaysService {
    store: Arc<dyn InvoiceStore>,
    limit: usize,
}

impl TopSellingDaysService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self::with_limit(store, TOP_SELLING_DAYS_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn InvoiceStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn call(&self) -> Result<Vec<DailyAggregate>, StoreError> {
        info!("📊 Fetching top selling days");
        let sales = self.store.daily_sales().await?;
        Ok(rank_top_days(sales, self.limit))
    }
}
