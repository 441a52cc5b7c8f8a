use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheStore, RedisCacheStore};
use crate::config::{Config, ReportConfig, SmtpConfig};
use crate::db::{check_db_health, create_db_pool, create_redis_pool};
use crate::repository::InvoiceRepository;
use crate::services::{
    InvoiceExportService, InvoiceSearchService, ReportNotifier, SmtpReportNotifier, TopSellingDaysReport,
    TopSellingDaysService,
};
use crate::store::{InvoiceStore, PgInvoiceStore};

/// Estado compartido de la aplicación.
/// Contiene los pools de Postgres y Redis y los servicios construidos sobre ellos.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: deadpool_redis::Pool,
    pub repository: InvoiceRepository,
    pub search_service: InvoiceSearchService,
    pub export_service: InvoiceExportService,
    pub report: Arc<TopSellingDaysReport>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = create_db_pool(&config.database).await?;
        if !check_db_health(&db_pool).await {
            warn!("⚠️ Database health check failed right after connecting");
        }
        let redis_pool = create_redis_pool(&config.redis)?;

        let store: Arc<dyn InvoiceStore> = Arc::new(PgInvoiceStore::new(db_pool.clone()));
        let cache: Arc<dyn CacheStore> = Arc::new(RedisCacheStore::new(redis_pool.clone()));

        let repository = InvoiceRepository::with_ttls(store.clone(), cache, config.cache_ttls);
        let search_service = InvoiceSearchService::new(repository.clone());
        let export_service = InvoiceExportService::new(search_service.clone());
        let report = Arc::new(build_report(store, &config.report, &config.smtp));

        info!("✅ Application state initialized");
        Ok(AppState {
            db_pool,
            redis_pool,
            repository,
            search_service,
            export_service,
            report,
        })
    }
}

/// Reporting trigger over `store`. Missing SMTP credentials leave it without
/// a notifier; the report still runs.
pub fn build_report(store: Arc<dyn InvoiceStore>, report: &ReportConfig, smtp: &SmtpConfig) -> TopSellingDaysReport {
    let aggregator = Arc::new(TopSellingDaysService::with_limit(store, report.limit));

    let notifier: Option<Arc<dyn ReportNotifier>> = if smtp.has_credentials() {
        match SmtpReportNotifier::from_config(smtp) {
            Ok(notifier) => Some(Arc::new(notifier)),
            Err(e) => {
                warn!("⚠️ SMTP notifier disabled: {}", e);
                None
            }
        }
    } else {
        warn!("⚠️ SMTP credentials not configured. Top selling days report will not be emailed.");
        None
    };

    TopSellingDaysReport::new(aggregator, notifier, report.recipient.clone())
}
