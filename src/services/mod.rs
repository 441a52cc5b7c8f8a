// ============================================================================
// INVOICE SEARCH & REPORTING SERVICES
// ============================================================================
pub mod validation;
pub mod search_service;
pub mod export_service;

// ============================================================================
// TOP SELLING DAYS REPORT
// ============================================================================
pub mod top_selling_days;
pub mod notifier;
pub mod report_service;

pub use validation::InvoiceSearchValidator;
pub use search_service::InvoiceSearchService;
pub use export_service::{export_filename, InvoiceExportService};
pub use top_selling_days::TopSellingDaysService;
pub use notifier::{ReportNotifier, SmtpReportNotifier};
pub use report_service::{NotificationOutcome, ReportRun, TopSellingDaysReport};
