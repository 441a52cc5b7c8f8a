//! Aggregation and best-effort notification of the top selling days report.

use async_trait::async_trait;
use chrono::NaiveDate;
use invoice_search_ws::error::{NotificationError, StoreError};
use invoice_search_ws::models::{DailyAggregate, Invoice};
use invoice_search_ws::services::{NotificationOutcome, ReportNotifier, TopSellingDaysReport, TopSellingDaysService};
use invoice_search_ws::store::InMemoryInvoiceStore;
use invoice_search_ws::tasks::execute_report;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn invoice(id: i64, d: u32, total: Decimal) -> Invoice {
    Invoice {
        id,
        invoice_number: format!("C{:05}", 30000 + id),
        total,
        invoice_date: day(d),
        status: "Vigente".to_string(),
        active: true,
    }
}

struct FailingNotifier;

#[async_trait]
impl ReportNotifier for FailingNotifier {
    async fn send_top_selling_days(&self, _recipient: &str, _days: &[DailyAggregate]) -> Result<(), NotificationError> {
        Err(NotificationError::delivery("SMTP relay refused the message"))
    }
}

#[derive(Default)]
struct CapturingNotifier {
    received: Mutex<Vec<DailyAggregate>>,
}

#[async_trait]
impl ReportNotifier for CapturingNotifier {
    async fn send_top_selling_days(&self, _recipient: &str, days: &[DailyAggregate]) -> Result<(), NotificationError> {
        self.received.lock().extend_from_slice(days);
        Ok(())
    }
}

fn d1_d2_store() -> Arc<InMemoryInvoiceStore> {
    Arc::new(InMemoryInvoiceStore::new(vec![
        invoice(1, 1, Decimal::new(10, 0)),
        invoice(2, 1, Decimal::new(20, 0)),
        invoice(3, 2, Decimal::new(5, 0)),
    ]))
}

fn report_with(store: Arc<InMemoryInvoiceStore>, notifier: Arc<dyn ReportNotifier>) -> TopSellingDaysReport {
    TopSellingDaysReport::new(
        Arc::new(TopSellingDaysService::new(store)),
        Some(notifier),
        Some("reportes@example.com".to_string()),
    )
}

#[tokio::test]
async fn busiest_day_comes_first_with_count_total_and_average() {
    let top = TopSellingDaysService::new(d1_d2_store()).call().await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].day, day(1));
    assert_eq!(top[0].invoices_count, 2);
    assert_eq!(top[0].total_amount, Decimal::new(30, 0));
    assert_eq!(top[0].average_invoice_value, Decimal::new(15, 0));
    assert_eq!(top[1].day, day(2));
    assert_eq!(top[1].invoices_count, 1);
    assert_eq!(top[1].total_amount, Decimal::new(5, 0));
}

#[tokio::test]
async fn at_most_ten_days_ranked_by_total() {
    let invoices: Vec<Invoice> = (1..=25)
        .map(|d| invoice(d as i64, d, Decimal::new(((d * 7) % 13) as i64 * 100, 0)))
        .collect();
    let top = TopSellingDaysService::new(Arc::new(InMemoryInvoiceStore::new(invoices)))
        .call()
        .await
        .unwrap();

    assert_eq!(top.len(), 10);
    for pair in top.windows(2) {
        let ordered = pair[0].total_amount > pair[1].total_amount
            || (pair[0].total_amount == pair[1].total_amount && pair[0].day < pair[1].day);
        assert!(ordered, "{:?} before {:?}", pair[0].day, pair[1].day);
    }
}

#[tokio::test]
async fn empty_store_yields_empty_report() {
    let top = TopSellingDaysService::new(Arc::new(InMemoryInvoiceStore::default()))
        .call()
        .await
        .unwrap();
    assert!(top.is_empty());
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_run() {
    let expected = TopSellingDaysService::new(d1_d2_store()).call().await.unwrap();
    let report = report_with(d1_d2_store(), Arc::new(FailingNotifier));

    let days = report.run().await.unwrap();
    assert_eq!(days, expected);

    let run = report.run_with_outcome().await.unwrap();
    assert_eq!(run.days, expected);
    assert!(matches!(run.notification, NotificationOutcome::Failed(ref msg) if msg.contains("refused")));
}

#[tokio::test]
async fn notifier_receives_the_ranked_days() {
    let notifier = Arc::new(CapturingNotifier::default());
    let report = report_with(d1_d2_store(), notifier.clone());

    let days = report.run().await.unwrap();
    assert_eq!(*notifier.received.lock(), days);
}

#[tokio::test]
async fn missing_recipient_skips_notification() {
    let notifier = Arc::new(CapturingNotifier::default());
    let report = TopSellingDaysReport::new(Arc::new(TopSellingDaysService::new(d1_d2_store())), Some(notifier.clone()), None);

    let run = report.run_with_outcome().await.unwrap();
    assert_eq!(run.notification, NotificationOutcome::Skipped);
    assert_eq!(run.days.len(), 2);
    assert!(notifier.received.lock().is_empty());
}

#[tokio::test]
async fn store_failure_is_propagated() {
    let store = d1_d2_store();
    store.set_unavailable(true);
    let notifier = Arc::new(CapturingNotifier::default());
    let report = report_with(store, notifier.clone());

    assert!(matches!(report.run().await, Err(StoreError::Unavailable { .. })));
    assert!(notifier.received.lock().is_empty());

    // the scheduled wrapper only logs
    execute_report(&report).await;
}
