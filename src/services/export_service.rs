// ============================================================================
// INVOICE EXPORT SERVICE - CSV
// ============================================================================

use bytes::Bytes;
use chrono::NaiveDate;
use futures::Stream;
use tracing::info;

use crate::error::{ExportError, Result};
use crate::export::InvoiceCsvExporter;
use crate::models::SearchParams;
use crate::services::search_service::InvoiceSearchService;

pub const CONTENT_TYPE: &str = "text/csv";

/// `invoices_20240131.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("invoices_{}.csv", date.format("%Y%m%d"))
}

#[derive(Clone)]
pub struct InvoiceExportService {
    search: InvoiceSearchService,
    exporter: InvoiceCsvExporter,
}

impl InvoiceExportService {
    pub fn new(search: InvoiceSearchService) -> Self {
        Self::with_exporter(search, InvoiceCsvExporter::new())
    }

    pub fn with_exporter(search: InvoiceSearchService, exporter: InvoiceCsvExporter) -> Self {
        Self { search, exporter }
    }

    /// Buffered export. No filters means the whole table.
    pub async fn export_to_csv(&self, params: &SearchParams) -> Result<Vec<u8>> {
        let criteria = self.search.validated_criteria(params)?;
        let repository = self.search.repository();

        let invoices = if params.has_no_filters() {
            repository.all().await?
        } else {
            repository.search(&criteria).await?
        };

        info!(rows = invoices.len(), "📤 Exporting invoices to CSV");
        Ok(self.exporter.export(&invoices)?)
    }

    /// Streamed export read from the store in keyset batches. Validation
    /// happens up front; store errors surface as stream items.
    pub fn stream_csv(
        &self,
        params: &SearchParams,
    ) -> Result<impl Stream<Item = std::result::Result<Bytes, ExportError>> + Send + 'static> {
        let criteria = self.search.validated_criteria(params)?;
        info!("📤 Streaming invoices to CSV");
        let rows = self.search.repository().stream(&criteria);
        Ok(self.exporter.export_stream(rows))
    }
}
