// ============================================================================
// PROMETHEUS METRICS
// ============================================================================
// Contadores del motor de búsqueda, cache y reporte diario
// ============================================================================

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    // ========================================================================
    // CACHE METRICS
    // ========================================================================

    pub static ref INVOICE_CACHE_HITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "invoice_cache_hits_total",
        "Total number of invoice cache hits",
        &["cache_name"]
    )
    .unwrap();

    pub static ref INVOICE_CACHE_MISSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "invoice_cache_misses_total",
        "Total number of invoice cache misses",
        &["cache_name"]
    )
    .unwrap();

    // ========================================================================
    // STORE METRICS
    // ========================================================================

    pub static ref INVOICE_STORE_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "invoice_store_queries_total",
        "Total number of invoice store queries",
        &["query_type", "status"]
    )
    .unwrap();

    // ========================================================================
    // REPORT METRICS
    // ========================================================================

    pub static ref TOP_SELLING_DAYS_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "top_selling_days_runs_total",
        "Top selling days aggregation runs",
        &["status"]
    )
    .unwrap();

    pub static ref REPORT_NOTIFICATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "report_notifications_total",
        "Top selling days report deliveries",
        &["status"]
    )
    .unwrap();
}

pub fn record_cache_hit(cache_name: &str) {
    INVOICE_CACHE_HITS_TOTAL.with_label_values(&[cache_name]).inc();
}

pub fn record_cache_miss(cache_name: &str) {
    INVOICE_CACHE_MISSES_TOTAL.with_label_values(&[cache_name]).inc();
}

pub fn record_store_query(query_type: &str, success: bool) {
    let status = if success { "ok" } else { "error" };
    INVOICE_STORE_QUERIES_TOTAL
        .with_label_values(&[query_type, status])
        .inc();
}

pub fn record_report_run(status: &str) {
    TOP_SELLING_DAYS_RUNS_TOTAL.with_label_values(&[status]).inc();
}

pub fn record_report_notification(status: &str) {
    REPORT_NOTIFICATIONS_TOTAL.with_label_values(&[status]).inc();
}

/// Text exposition of every registered metric.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_are_exposed() {
        record_cache_hit("metrics_test");
        record_store_query("metrics_test", true);

        let text = gather_metrics().unwrap();
        assert!(text.contains("invoice_cache_hits_total"));
        assert!(text.contains("invoice_store_queries_total"));
    }
}
