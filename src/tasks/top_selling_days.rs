use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::TopSellingDaysReport;

/// Registra el job del reporte de días con mayor venta y arranca el scheduler.
/// `cron` usa el formato de 6 campos (con segundos), p. ej. `0 0 8 * * *`.
pub async fn start_top_selling_days_scheduler(report: Arc<TopSellingDaysReport>, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = {
        let report = Arc::clone(&report);

        Job::new_async(cron, move |_uuid, _lock| {
            let report = Arc::clone(&report);

            Box::pin(async move {
                tracing::info!("⏰ Executing scheduled top selling days report");
                execute_report(&report).await;
            })
        })?
    };

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("✅ Top selling days scheduler started ({})", cron);
    Ok(scheduler)
}

/// Una ejecución del reporte. Los errores se registran; el próximo disparo
/// del cron es el reintento.
pub async fn execute_report(report: &TopSellingDaysReport) {
    match report.run_with_outcome().await {
        Ok(run) => {
            tracing::info!(
                run_id = %run.run_id,
                days = run.days.len(),
                notification = run.notification.as_label(),
                "✅ Top selling days report finished"
            );
        }
        Err(e) => {
            tracing::error!("❌ Top selling days report failed: {}", e);
        }
    }
}
