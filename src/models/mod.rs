pub mod criteria;
pub mod invoice;
pub mod report;

pub use criteria::{ActiveFilter, InvoiceCriteria, SearchParams};
pub use invoice::Invoice;
pub use report::{DailyAggregate, DailySales};
