// ============================================================================
// TOP SELLING DAYS REPORT - Cálculo + notificación best-effort
// ============================================================================

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::invoice::round_cents;
use crate::models::DailyAggregate;
use crate::observability::{record_report_notification, record_report_run};
use crate::services::notifier::ReportNotifier;
use crate::services::top_selling_days::TopSellingDaysService;

/// What happened to the notification step of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Delivered,
    /// No recipient or no notifier configured.
    Skipped,
    Failed(String),
}

impl NotificationOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            NotificationOutcome::Delivered => "delivered",
            NotificationOutcome::Skipped => "skipped",
            NotificationOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRun {
    pub run_id: Uuid,
    pub days: Vec<DailyAggregate>,
    pub notification: NotificationOutcome,
}

/// Computes the ranking, then hands it to the notifier. Notification
/// failures are logged and counted, never returned.
#[derive(Clone)]
pub struct TopSellingDaysReport {
    aggregator: Arc<TopSellingDaysService>,
    notifier: Option<Arc<dyn ReportNotifier>>,
    recipient: Option<String>,
}

impl TopSellingDaysReport {
    pub fn new(
        aggregator: Arc<TopSellingDaysService>,
        notifier: Option<Arc<dyn ReportNotifier>>,
        recipient: Option<String>,
    ) -> Self {
        Self {
            aggregator,
            notifier,
            recipient: recipient.filter(|r| !r.trim().is_empty()),
        }
    }

    pub async fn run(&self) -> Result<Vec<DailyAggregate>, StoreError> {
        Ok(self.run_with_outcome().await?.days)
    }

    pub async fn run_with_outcome(&self) -> Result<ReportRun, StoreError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, "🚀 Top selling days report started at {} (UTC)", chrono::Utc::now());

        let days = match self.aggregator.call().await {
            Ok(days) => days,
            Err(e) => {
                error!(%run_id, "❌ Top selling days report failed: {}", e);
                record_report_run("error");
                return Err(e);
            }
        };
        record_report_run("success");
        info!(%run_id, count = days.len(), "✅ Found {} top selling days", days.len());
        log_top_days(run_id, &days);

        let notification = self.notify(run_id, &days).await;
        record_report_notification(notification.as_label());

        Ok(ReportRun {
            run_id,
            days,
            notification,
        })
    }

    /// Second step of a run, kept apart so its failure never touches the
    /// aggregate.
    pub async fn notify(&self, run_id: Uuid, days: &[DailyAggregate]) -> NotificationOutcome {
        let (Some(notifier), Some(recipient)) = (&self.notifier, &self.recipient) else {
            warn!(%run_id, "📭 No report recipient or notifier configured, skipping notification");
            return NotificationOutcome::Skipped;
        };

        match notifier.send_top_selling_days(recipient, days).await {
            Ok(()) => {
                info!(%run_id, recipient = %recipient, "📧 Top selling days report delivered");
                NotificationOutcome::Delivered
            }
            Err(e) => {
                error!(%run_id, recipient = %recipient, "❌ Failed to deliver top selling days report: {}", e);
                NotificationOutcome::Failed(e.to_string())
            }
        }
    }
}

fn log_top_days(run_id: Uuid, days: &[DailyAggregate]) {
    for (index, day) in days.iter().take(3).enumerate() {
        info!(
            %run_id,
            "📈 Top {}: {} - {} invoices, Total: ${:.2}",
            index + 1,
            day.day,
            day.invoices_count,
            round_cents(day.total_amount)
        );
    }
}
