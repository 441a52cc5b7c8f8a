use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error};

use super::{InvoiceStore, Window};
use crate::error::StoreError;
use crate::models::{DailySales, Invoice};
use crate::observability::record_store_query;
use crate::query::{Cursor, InvoiceQuery, ORDER_BY_RECENT};

const SELECT_INVOICES: &str =
    "SELECT id, invoice_number, total, invoice_date, status, active FROM public.invoices";

const COUNT_INVOICES: &str = "SELECT COUNT(*) FROM public.invoices";

const SUM_INVOICES: &str = "SELECT COALESCE(SUM(total), 0) FROM public.invoices";

const FIND_BY_NUMBER: &str = r#"
    SELECT id, invoice_number, total, invoice_date, status, active
    FROM public.invoices
    WHERE invoice_number = $1
    LIMIT 1
"#;

const DAILY_SALES: &str = r#"
    SELECT
        invoice_date AS day,
        COUNT(*) AS invoices_count,
        SUM(total) AS total_amount
    FROM public.invoices
    GROUP BY invoice_date
"#;

/// Postgres-backed store. Queries are composed with `QueryBuilder` so every
/// filter value is a bind parameter.
#[derive(Clone)]
pub struct PgInvoiceStore {
    pool: PgPool,
}

impl PgInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn track<T>(query_type: &str, result: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    record_store_query(query_type, result.is_ok());
    result.map_err(|e| {
        error!(query_type, "Invoice store query failed: {}", e);
        StoreError::from(e)
    })
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn fetch(&self, query: &InvoiceQuery, window: Option<Window>) -> Result<Vec<Invoice>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_INVOICES);
        query.push_where(&mut qb);
        qb.push(ORDER_BY_RECENT);
        if let Some(window) = window {
            qb.push(" LIMIT ")
                .push_bind(window.limit)
                .push(" OFFSET ")
                .push_bind(window.offset);
        }

        debug!(sql = qb.sql(), "Executing invoice fetch");
        let rows = qb.build_query_as::<Invoice>().fetch_all(&self.pool).await;
        track("fetch", rows)
    }

    async fn fetch_after(
        &self,
        query: &InvoiceQuery,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Invoice>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_INVOICES);
        query.push_where(&mut qb);
        if let Some(cursor) = after {
            cursor.push_sql(&mut qb);
        }
        qb.push(ORDER_BY_RECENT).push(" LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<Invoice>().fetch_all(&self.pool).await;
        track("fetch_after", rows)
    }

    async fn count(&self, query: &InvoiceQuery) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(COUNT_INVOICES);
        query.push_where(&mut qb);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await;
        track("count", count)
    }

    async fn sum_total(&self, query: &InvoiceQuery) -> Result<Decimal, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SUM_INVOICES);
        query.push_where(&mut qb);

        let total = qb.build_query_scalar::<Decimal>().fetch_one(&self.pool).await;
        track("sum_total", total)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError> {
        let row = sqlx::query_as::<_, Invoice>(FIND_BY_NUMBER)
            .bind(number)
            .fetch_optional(&self.pool)
            .await;
        track("find_by_number", row)
    }

    async fn daily_sales(&self) -> Result<Vec<DailySales>, StoreError> {
        let rows = sqlx::query_as::<_, DailySales>(DAILY_SALES)
            .fetch_all(&self.pool)
            .await;
        track("daily_sales", rows)
    }
}
